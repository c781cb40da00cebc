use std::collections::BTreeMap;
use std::path::Path;
use tempfile::NamedTempFile;
use trace_state_studio::output::{
    read_dump, validate_output_path, write_dump, AttributeDump, FailureRecord, StateDump,
};
use trace_state_studio::store::StateInterval;
use trace_state_studio::TypedValue;

fn create_test_dump() -> StateDump {
    StateDump {
        version: "1.0.0".to_string(),
        generated_at: "2024-01-01T00:00:00Z".to_string(),
        events_processed: 3,
        end_time: Some(30),
        failure_counts: BTreeMap::from([("out_of_order".to_string(), 1)]),
        failures: vec![FailureRecord {
            event: "sched_switch".to_string(),
            timestamp: 5,
            handler: "sched_*".to_string(),
            index: 0,
            kind: "out_of_order".to_string(),
            message: "Event at 5 is behind the current time 30".to_string(),
        }],
        attributes: vec![AttributeDump {
            path: "Threads/42/Status".to_string(),
            ongoing: TypedValue::Int(1),
            ongoing_since: Some(30),
            intervals: vec![StateInterval {
                start: 10,
                end: 30,
                value: TypedValue::Int(2),
            }],
        }],
    }
}

#[test]
fn test_write_and_read_dump() {
    let dump = create_test_dump();
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    write_dump(&dump, path).unwrap();
    let loaded = read_dump(path).unwrap();

    assert_eq!(loaded.version, dump.version);
    assert_eq!(loaded.end_time, Some(30));
    assert_eq!(loaded.failures, dump.failures);
    assert_eq!(loaded.attributes, dump.attributes);
    assert_eq!(loaded.failure_counts.get("out_of_order"), Some(&1));
}

#[test]
fn test_typed_values_are_tagged_in_json() {
    let dump = create_test_dump();
    let temp_file = NamedTempFile::new().unwrap();

    write_dump(&dump, temp_file.path()).unwrap();
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp_file.path()).unwrap()).unwrap();

    assert_eq!(raw["attributes"][0]["ongoing"], serde_json::json!({ "int": 1 }));
    assert_eq!(
        raw["attributes"][0]["intervals"][0],
        serde_json::json!({ "start": 10, "end": 30, "value": { "int": 2 } })
    );
}

#[test]
fn test_validate_output_path_empty() {
    assert!(validate_output_path(Path::new("")).is_err());
}

#[test]
fn test_validate_output_path_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    assert!(validate_output_path(temp_dir.path()).is_err());
}

#[test]
fn test_write_creates_parent_dirs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested = temp_dir.path().join("a").join("b").join("state.json");

    write_dump(&create_test_dump(), &nested).unwrap();
    assert!(nested.exists());
}
