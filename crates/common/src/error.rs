//! Error types for Sentinel

use thiserror::Error;

/// Result type alias using the Sentinel Error
pub type Result<T> = std::result::Result<T, Error>;

/// Sentinel error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Runner failed to start: {0}")]
    RunnerStartup(String),

    #[error("Runner produced no result aggregate: {0}")]
    RunnerOutput(String),

    #[error("Run timed out after {seconds}s")]
    RunTimeout { seconds: u64 },

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
