use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use trace_state_studio::event::read_events;
use trace_state_studio::utils::error::ParseError;
use trace_state_studio::FieldValue;

fn write_events(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_read_object_with_aliases() {
    let file = write_events(
        r#"{ "trace": [
            { "type": "sched_wakeup", "ts": 5, "source": 2, "fields": { "tid": 9 } },
            { "event": "irq_handler_entry", "time": 6, "fields": { "irq": 11 } }
        ] }"#,
    );

    let events = read_events(file.path()).unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "sched_wakeup");
    assert_eq!(events[0].timestamp, 5);
    assert_eq!(events[0].source, Some(2));
    assert_eq!(events[1].source, None);
    assert_eq!(events[1].field("irq"), Some(&FieldValue::Int(11)));
}

#[test]
fn test_malformed_events_and_fields_are_skipped() {
    let file = write_events(
        r#"[
            { "name": "ok", "timestamp": 1,
              "fields": { "big": 5000000000, "ratio": 0.5, "comm": "bash" } },
            { "name": "no_timestamp" },
            { "timestamp": 3 }
        ]"#,
    );

    let events = read_events(file.path()).unwrap();

    assert_eq!(events.len(), 1);
    let fields: Vec<(&str, &FieldValue)> = events[0]
        .fields
        .iter()
        .map(|(name, value)| (name.as_str(), value))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("big", &FieldValue::Long(5_000_000_000)),
            ("comm", &FieldValue::Str("bash".to_string()))
        ]
    );
}

#[test]
fn test_all_malformed_is_an_error() {
    let file = write_events(r#"{ "events": [ { "name": 1 }, { "timestamp": "x" } ] }"#);
    let err = read_events(file.path()).unwrap_err();
    assert!(matches!(err, ParseError::InvalidFormat(_)));
}

#[test]
fn test_unrecognised_document_shape() {
    let file = write_events(r#"{ "rows": [] }"#);
    assert!(matches!(
        read_events(file.path()).unwrap_err(),
        ParseError::InvalidFormat(_)
    ));

    let file = write_events("not json");
    assert!(matches!(
        read_events(file.path()).unwrap_err(),
        ParseError::JsonError(_)
    ));
}

#[test]
fn test_empty_event_list_is_valid() {
    let file = write_events(r#"{ "records": [] }"#);
    assert!(read_events(file.path()).unwrap().is_empty());
}
