//! JSON state dump writer.
//!
//! Captures the final content of an in-memory state system, plus the
//! failures seen while building it, as a versioned JSON document.

use crate::schema::RunReport;
use crate::store::{AttributeStore, InMemoryStateSystem, StateInterval};
use crate::utils::config::DUMP_VERSION;
use crate::utils::error::OutputError;
use crate::value::TypedValue;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Top-level dump structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDump {
    /// Dump format version for compatibility checking
    pub version: String,

    /// Timestamp when the dump was generated
    pub generated_at: String,

    pub events_processed: usize,

    /// Latest timestamp applied to the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,

    /// Failure count per error kind
    pub failure_counts: BTreeMap<String, usize>,

    pub failures: Vec<FailureRecord>,

    pub attributes: Vec<AttributeDump>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub event: String,
    pub timestamp: i64,
    pub handler: String,
    pub index: usize,
    pub kind: String,
    pub message: String,
}

/// One attribute with its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDump {
    /// Full path, e.g. "Threads/42/Status"
    pub path: String,

    pub ongoing: TypedValue,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ongoing_since: Option<i64>,

    pub intervals: Vec<StateInterval>,
}

impl StateDump {
    /// Build a dump from a store and the report of the run that filled it
    pub fn capture(store: &InMemoryStateSystem, report: &RunReport) -> Self {
        use chrono::Utc;

        let mut attributes: Vec<AttributeDump> = store
            .tree()
            .quarks()
            .map(|quark| AttributeDump {
                path: store.attribute_path(quark),
                ongoing: store.ongoing_value(quark),
                ongoing_since: store.ongoing_since(quark),
                intervals: store.intervals(quark).to_vec(),
            })
            .collect();
        attributes.sort_by(|a, b| a.path.cmp(&b.path));

        let failures = report
            .failures
            .iter()
            .map(|f| FailureRecord {
                event: f.event.clone(),
                timestamp: f.timestamp,
                handler: f.handler.clone(),
                index: f.index,
                kind: f.error.kind().to_string(),
                message: f.error.to_string(),
            })
            .collect();

        Self {
            version: DUMP_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            events_processed: report.events_processed,
            end_time: store.current_time(),
            failure_counts: report
                .failure_counts()
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), count))
                .collect(),
            failures,
            attributes,
        }
    }

    pub fn attribute(&self, path: &str) -> Option<&AttributeDump> {
        self.attributes.iter().find(|a| a.path == path)
    }
}

/// Write a dump to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_dump(dump: &StateDump, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing state dump to: {}", output_path.display());

    validate_output_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, dump).map_err(OutputError::SerializationFailed)?;

    info!(
        "State dump written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Read a dump back from a JSON file
pub fn read_dump(input_path: impl AsRef<Path>) -> Result<StateDump, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading state dump from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let dump: StateDump =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!(
        "State dump loaded: version {}, {} attributes",
        dump.version,
        dump.attributes.len()
    );

    Ok(dump)
}

/// Validate that output path is writable
pub fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
