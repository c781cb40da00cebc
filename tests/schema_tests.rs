use pretty_assertions::assert_eq;
use std::path::PathBuf;
use trace_state_studio::schema::{
    load_schema, AttributeLocator, Condition, EventHandler, Location, StateChange, StateSchema,
    StateValue, ValueSpec,
};
use trace_state_studio::utils::error::SchemaError;
use trace_state_studio::TypedValue;

fn demo_schema() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("kernel_schema.json")
}

fn single_change(change: &str) -> String {
    format!(
        r#"{{ "handlers": [ {{ "event": "e", "state_changes": [ {} ] }} ] }}"#,
        change
    )
}

#[test]
fn test_load_demo_schema() {
    let schema = load_schema(demo_schema()).unwrap();

    let patterns: Vec<String> = schema
        .handlers()
        .iter()
        .map(|h| h.pattern.to_string())
        .collect();
    assert_eq!(
        patterns,
        vec![
            "sched_*",
            "sched_switch",
            "exec_runtime",
            "irq_handler_entry",
            "irq_handler_exit",
            "sched_process_exit"
        ]
    );
    assert_eq!(schema.locations().len(), 2);
    assert_eq!(schema.state_change_count(), 10);
}

#[test]
fn test_defined_values_are_substituted() {
    let schema = load_schema(demo_schema()).unwrap();

    let current = schema.locations().get("CurrentThread").unwrap();
    assert_eq!(current.path[0], AttributeLocator::constant("Threads"));

    let switch = &schema.handlers()[1];
    match &switch.state_changes[2] {
        StateChange::Assign { value, .. } => assert_eq!(
            value.value,
            ValueSpec::Literal {
                value: TypedValue::Int(2)
            }
        ),
        other => panic!("unexpected state change: {:?}", other),
    }
}

#[test]
fn test_unknown_defined_value() {
    let json = single_change(
        r#"{ "type": "assign",
             "path": [ { "type": "constant", "name": "$MISSING" } ],
             "value": { "value": { "type": "event_name" } } }"#,
    );
    let err = StateSchema::from_json_str(&json).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownDefinedValue(name) if name == "MISSING"));
}

#[test]
fn test_malformed_json_is_a_schema_error() {
    let err = StateSchema::from_json_str(r#"{ "handlers": [ { "event": 3 } ] }"#).unwrap_err();
    assert!(matches!(err, SchemaError::JsonError(_)));

    let err = StateSchema::from_json_str(&single_change(
        r#"{ "type": "assign", "path": [ { "type": "bogus" } ],
             "value": { "value": { "type": "event_name" } } }"#,
    ))
    .unwrap_err();
    assert!(matches!(err, SchemaError::JsonError(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_schema("/nonexistent/schema.json").unwrap_err();
    assert!(matches!(err, SchemaError::IoError(_)));
}

#[test]
fn test_invalid_state_changes_rejected() {
    let cases = vec![
        // Increment of a non-Int literal
        single_change(
            r#"{ "type": "assign", "path": [ { "type": "constant", "name": "A" } ],
                 "value": { "value": { "type": "literal", "value": { "string": "x" } },
                            "increment": true } }"#,
        ),
        // Increment combined with a stack action
        single_change(
            r#"{ "type": "assign", "path": [ { "type": "constant", "name": "A" } ],
                 "value": { "value": { "type": "event_field", "name": "n" },
                            "increment": true, "stack": "push" } }"#,
        ),
        // Empty target path
        single_change(
            r#"{ "type": "assign", "path": [],
                 "value": { "value": { "type": "event_name" } } }"#,
        ),
        // Conditional with no branch
        single_change(
            r#"{ "type": "conditional",
                 "condition": { "type": "and", "conditions": [] } }"#,
        ),
        // Logical operator without operands
        single_change(
            r#"{ "type": "conditional",
                 "condition": { "type": "or", "conditions": [] },
                 "then": { "type": "assign", "path": [ { "type": "constant", "name": "A" } ],
                           "value": { "value": { "type": "event_name" } } } }"#,
        ),
    ];

    for json in cases {
        let err = StateSchema::from_json_str(&json).unwrap_err();
        assert!(
            matches!(err, SchemaError::Invalid(_)),
            "expected invalid schema for {}, got {:?}",
            json,
            err
        );
    }
}

#[test]
fn test_location_cycle_rejected() {
    let locations = vec![
        Location::new("A", vec![AttributeLocator::location("B")]),
        Location::new("B", vec![AttributeLocator::location("A")]),
    ];
    let err = StateSchema::new(vec![], locations.into_iter().collect()).unwrap_err();
    assert!(matches!(err, SchemaError::Invalid(_)));
}

#[test]
fn test_unknown_location_in_condition() {
    let handler = EventHandler::new(
        "e",
        vec![StateChange::conditional(
            Condition::attribute_equals(
                vec![AttributeLocator::location("Ghost")],
                StateValue::literal(1),
            ),
            Some(StateChange::assign(
                vec![AttributeLocator::constant("A")],
                StateValue::literal(1),
            )),
            None,
        )],
    );
    let err = StateSchema::new(vec![handler], Default::default()).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownLocation(name) if name == "Ghost"));
}

#[test]
fn test_schema_round_trips_through_json() {
    let handler = EventHandler::new(
        "irq_*",
        vec![StateChange::assign(
            vec![
                AttributeLocator::constant("CPUs"),
                AttributeLocator::event_field("cpu"),
            ],
            StateValue::event_name(),
        )],
    );

    let json = serde_json::json!({ "handlers": [handler.clone()] }).to_string();
    let schema = StateSchema::from_json_str(&json).unwrap();
    assert_eq!(schema.handlers(), &[handler]);
}
