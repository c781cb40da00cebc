//! Run command implementation.
//!
//! The run command:
//! 1. Loads and validates the state schema
//! 2. Reads the trace events
//! 3. Feeds every event through the interpreter
//! 4. Writes the resulting state dump

use super::models::RunArgs;
use crate::event::read_events;
use crate::output::{write_dump, StateDump};
use crate::schema::{load_schema, StateProvider};
use crate::store::InMemoryStateSystem;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Execute the run command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Invalid schema (the only failure raised before events are processed)
/// * Unreadable event file
/// * File write errors
/// * Any state change failure, when `fail_on_error` is set
pub fn execute_run(args: RunArgs) -> Result<StateDump> {
    let start_time = Instant::now();

    info!("Step 1/4: Loading schema from {}...", args.schema.display());
    let schema = load_schema(&args.schema).context("Failed to load state schema")?;
    let provider = StateProvider::new(schema);

    info!("Step 2/4: Reading events from {}...", args.events.display());
    let events = read_events(&args.events).context("Failed to read trace events")?;
    debug!("Read {} events", events.len());

    info!("Step 3/4: Applying {} events...", events.len());
    let mut store = InMemoryStateSystem::new();
    let report = provider.run(&events, &mut store);
    info!("{}", report.summary());

    let dump = StateDump::capture(&store, &report);

    if let Some(output) = &args.output {
        info!("Step 4/4: Writing state dump...");
        write_dump(&dump, output).context("Failed to write state dump")?;
        info!("✓ State dump written to: {}", output.display());
    } else {
        info!("Step 4/4: Skipping state dump (no output requested)");
    }

    if args.print_summary {
        println!("{}", render_summary(&dump));
    }

    let elapsed = start_time.elapsed();
    info!("Run completed in {:.2}s", elapsed.as_secs_f64());

    if args.fail_on_error && !report.is_clean() {
        anyhow::bail!(
            "{} state changes failed (first: {})",
            report.failures.len(),
            report.failures[0].error
        );
    }

    Ok(dump)
}

/// Validate run arguments
///
/// **Public** - can be called before execute_run for early validation
pub fn validate_args(args: &RunArgs) -> Result<()> {
    if args.schema.as_os_str().is_empty() {
        anyhow::bail!("Schema path cannot be empty");
    }

    if !args.schema.is_file() {
        anyhow::bail!("Schema file not found: {}", args.schema.display());
    }

    if args.events.as_os_str().is_empty() {
        anyhow::bail!("Events path cannot be empty");
    }

    if !args.events.is_file() {
        anyhow::bail!("Events file not found: {}", args.events.display());
    }

    if let Some(output) = &args.output {
        if output == &args.schema || output == &args.events {
            anyhow::bail!("Output path would overwrite an input file");
        }
    }

    Ok(())
}

/// Render a text summary of a state dump
pub fn render_summary(dump: &StateDump) -> String {
    let mut lines = vec![
        "=".repeat(80),
        "STATE SUMMARY".to_string(),
        "=".repeat(80),
        format!("Events processed: {}", dump.events_processed),
        format!("Attributes:       {}", dump.attributes.len()),
        format!("Failures:         {}", dump.failures.len()),
    ];

    for (kind, count) in &dump.failure_counts {
        lines.push(format!("  {:<20} {}", kind, count));
    }

    lines.push(String::new());
    for attribute in dump.attributes.iter().filter(|a| !a.ongoing.is_null()) {
        lines.push(format!("{:<50} {}", attribute.path, attribute.ongoing));
    }
    lines.push("=".repeat(80));

    lines.join("\n")
}
