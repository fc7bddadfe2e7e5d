//! CLI module
//!
//! Provides:
//! - Argument parsing
//! - Session replay from a JSON-lines outcome log, ending in enrichment

pub mod args;
pub mod dispatch;

// Re-exports
pub use args::{parse_args, Args, OutcomeSource};
pub use dispatch::{read_outcomes, run_cli, ExitCode};

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;
