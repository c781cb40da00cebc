//! Output writers for interpreter results.
//!
//! This module handles writing the final attribute store content to disk
//! as a JSON state dump.

pub mod json;

// Re-export main functions
pub use json::{
    read_dump, validate_output_path, write_dump, AttributeDump, FailureRecord, StateDump,
};
