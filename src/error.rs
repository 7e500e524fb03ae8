//! Error types for the field engine
//!
//! The engine itself is a closed numeric simulation, so most of these only
//! surface at setup time (host wiring) or while reading config and trace
//! files.

use thiserror::Error;

/// A failure reported by the host surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("host error: {0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors that can occur while loading or validating a [`crate::FieldConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration text could not be parsed
    #[error("config parse error: {0}")]
    Parse(String),

    /// A field holds a value the engine cannot run with
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The config file extension is not one we read
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Reading the config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while recording, saving or loading a trace
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace format error: {0}")]
    Format(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Top-level engine error
#[derive(Error, Debug)]
pub enum FieldError {
    /// The drawable surface or its 2D context was not available at mount
    #[error("drawing surface unavailable: {0}")]
    SetupUnavailable(String),

    /// The host refused a listener
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result type for engine operations
pub type FieldResult<T> = Result<T, FieldError>;
