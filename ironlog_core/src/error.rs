//! Error types for the ironlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ironlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plan payload could not be normalized, or a day is missing
    #[error("Plan error: {0}")]
    Plan(String),

    /// A command was given input it cannot accept (e.g. non-positive reps)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A command was issued in a phase that does not accept it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Journal store error
    #[error("Store error: {0}")]
    Store(String),
}
