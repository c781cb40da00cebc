//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod models;
pub mod run;
pub mod utils;

// Re-export main command functions
pub use models::RunArgs;
pub use run::{execute_run, render_summary, validate_args};
pub use utils::{display_schema, display_version, validate_schema_file};
