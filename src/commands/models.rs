use std::path::PathBuf;

/// Arguments for the run command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Path to the JSON state schema
    pub schema: PathBuf,

    /// Path to the JSON trace events
    pub events: PathBuf,

    /// Output path for the JSON state dump (optional)
    pub output: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Return an error if any state change failed
    pub fail_on_error: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            schema: PathBuf::from("schema.json"),
            events: PathBuf::from("events.json"),
            output: Some(PathBuf::from("state.json")),
            print_summary: false,
            fail_on_error: false,
        }
    }
}
