use crate::schema::load_schema;
use crate::utils::config::{DUMP_VERSION, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a state schema file
pub fn validate_schema_file(file_path: PathBuf) -> Result<()> {
    println!("Validating schema: {}", file_path.display());

    let schema = load_schema(&file_path).context("Schema is invalid")?;

    println!("✓ Valid state schema");
    println!("  Handlers:      {}", schema.handlers().len());
    println!("  Locations:     {}", schema.locations().len());
    println!("  State changes: {}", schema.state_change_count());
    for handler in schema.handlers() {
        println!(
            "    {:<30} {} state changes",
            handler.pattern.to_string(),
            handler.state_changes.len()
        );
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Trace State Studio Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  defined_values: object     - Named values, referenced as \"$NAME\"");
        println!("  locations: array           - Named attribute paths");
        println!("    name: string");
        println!("    path: array<locator>");
        println!("  handlers: array");
        println!("    event: string            - Event name, trailing '*' for a prefix");
        println!("    state_changes: array     - Applied in order");
        println!();
        println!("Locators (type):  constant{{name}} | event_field{{name}} | query{{path}} | location{{name}}");
        println!("Values (type):    literal{{value}} | event_field{{name, forced_type?}} | query{{path}}");
        println!("                  | event_name | delete");
        println!("  modifiers:      increment: bool, stack: none | push | pop | peek");
        println!("Conditions:       leaf{{operand, expected}} | not{{condition}} | and{{conditions}} | or{{conditions}}");
        println!("State changes:    assign{{path, value}} | conditional{{condition, then?, else?}}");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Trace State Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Schema: v{}", SCHEMA_VERSION);
    println!("State dump: v{}", DUMP_VERSION);
    println!();
    println!("Declarative state-change interpreter for trace events.");
}
