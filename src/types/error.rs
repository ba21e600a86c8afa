use std::fmt;

use anyhow::Error;
use thiserror::Error as ThisError;

use crate::types::ObjectDeleteFailure;

/// Application-level error types for s3purge-rs.
///
/// Only [`PurgeError::InvalidConfig`] fails a whole run; every storage-level
/// problem is caught at the per-bucket boundary and converted to log output.
///
/// ## Exit codes
///
/// Each variant maps to a process exit code (via `exit_code()`):
/// - 1: General errors (Prompt, BatchDelete)
/// - 2: Configuration errors (InvalidConfig)
#[derive(ThisError, Debug, PartialEq)]
pub enum PurgeError {
    /// Neither bucket list was supplied, or another configuration value is
    /// unusable. Raised before any network activity.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The interactive confirmation prompt could not be read.
    #[error("confirmation prompt failed: {0}")]
    Prompt(String),

    /// One or more objects in a bucket's deletion batches failed to delete.
    #[error("{0}")]
    BatchDelete(BatchDeleteFailures),
}

/// Every per-object failure collected across a bucket's deletion batches,
/// in listing order.
///
/// The display form leads with the first failure so a single log line
/// identifies at least one offending object; the full set stays available
/// for callers that want it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDeleteFailures(pub Vec<ObjectDeleteFailure>);

impl fmt::Display for BatchDeleteFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.first() {
            None => write!(f, "Error: no failures recorded"),
            Some(first) => {
                write!(f, "Error: {} - {}", first.key, first.message)?;
                if self.0.len() > 1 {
                    write!(f, " ({} more failures)", self.0.len() - 1)?;
                }
                Ok(())
            }
        }
    }
}

impl PurgeError {
    /// Get the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PurgeError::InvalidConfig(_) => 2,
            _ => 1,
        }
    }
}

/// Check if an anyhow::Error wraps a configuration error.
pub fn is_invalid_config_error(e: &Error) -> bool {
    matches!(
        e.downcast_ref::<PurgeError>(),
        Some(PurgeError::InvalidConfig(_))
    )
}

/// Extract the exit code from an anyhow::Error, defaulting to 1.
pub fn exit_code_from_error(e: &Error) -> i32 {
    if let Some(err) = e.downcast_ref::<PurgeError>() {
        return err.exit_code();
    }
    1
}
