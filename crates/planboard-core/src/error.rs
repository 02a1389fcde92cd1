//! Core error types for planboard-core.
//!
//! Input anomalies (stale drop targets, missing drag handles) never surface
//! here: the drag layer degrades them to a cancelled drag. What remains are
//! domain errors the caller can recover from and persistence failures.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for planboard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Schedule projection errors
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when applying a move to the task board.
///
/// All of these leave the in-memory board unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// The task was deleted (or never existed) by the time the move landed.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Rollover instances are display-only and cannot be rescheduled.
    #[error("Task '{0}' is a rollover reminder and cannot be moved")]
    VirtualItem(String),

    /// The drop container does not name a day or week bucket.
    #[error("Container '{0}' is not a schedulable bucket")]
    UnknownBucket(String),

    /// Source and destination buckets are of different kinds.
    #[error("Cannot move from '{from}' to '{to}': bucket kinds differ")]
    MixedBuckets { from: String, to: String },

    /// A date computation left the representable range.
    #[error("Date out of range while moving '{0}'")]
    DateOutOfRange(String),
}

/// Persistence collaborator errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing storage could not be read or written
    #[error("Storage unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be decoded
    #[error("Corrupt task data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Remote side rejected the write
    #[error("Save rejected for task '{task_id}': {message}")]
    Rejected { task_id: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be resolved or created
    #[error("Config directory unavailable: {0}")]
    DataDir(String),
}

/// Raised by a drop region whose backing element can no longer be measured.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HitTestError {
    /// Container was unmounted while a drag was in flight.
    #[error("Drop region '{0}' is stale")]
    Stale(String),

    /// Region reported bounds that cannot be hit-tested (e.g. NaN).
    #[error("Drop region '{0}' has invalid bounds")]
    InvalidBounds(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_error_converts_into_core_error() {
        let err: CoreError = ProjectionError::TaskNotFound("t9".into()).into();
        assert!(matches!(err, CoreError::Projection(_)));
        assert_eq!(err.to_string(), "Projection error: Task not found: t9");
    }

    #[test]
    fn mixed_bucket_message_names_both_containers() {
        let err = ProjectionError::MixedBuckets {
            from: "week-2".into(),
            to: "day-2025-05-14".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("week-2"));
        assert!(msg.contains("day-2025-05-14"));
    }
}
