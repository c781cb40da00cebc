//! Trace State Studio CLI
//!
//! Runs a declarative state schema over a trace event file and writes the
//! resulting attribute store as a JSON state dump.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trace_state_studio::commands::{
    display_schema, display_version, execute_run, validate_args, validate_schema_file, RunArgs,
};
use trace_state_studio::utils::config::{EVENTS_ENV, SCHEMA_ENV};

/// Trace State Studio - declarative state-change interpreter
#[derive(Parser, Debug)]
#[command(name = "trace-state")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a state schema to a trace event file
    Run {
        /// Path to the JSON state schema
        #[arg(short, long, env = SCHEMA_ENV)]
        schema: PathBuf,

        /// Path to the JSON trace events
        #[arg(short, long, env = EVENTS_ENV)]
        events: PathBuf,

        /// Output path for the JSON state dump
        #[arg(short, long, default_value = "state.json")]
        output: PathBuf,

        /// Do not write a state dump
        #[arg(long)]
        no_output: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Exit with an error if any state change failed
        #[arg(long)]
        fail_on_error: bool,
    },

    /// Validate a state schema file
    Validate {
        /// Path to the JSON state schema
        #[arg(short, long, env = SCHEMA_ENV)]
        schema: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Run {
            schema,
            events,
            output,
            no_output,
            summary,
            fail_on_error,
        } => {
            let args = RunArgs {
                schema,
                events,
                output: if no_output { None } else { Some(output) },
                print_summary: summary,
                fail_on_error,
            };

            validate_args(&args)?;
            execute_run(args)?;
        }

        Commands::Validate { schema } => {
            validate_schema_file(schema)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
