//! Persistence error types.
//!
//! Persistence errors are the only class surfaced to the user; they are
//! always recoverable locally (edits are never rolled back, only left
//! unsynced) and never treated as fatal. Aggregation errors do not
//! exist: pricing resolves every edge case to a defined zero value.

use thiserror::Error;

use poolq_model::ResourceKind;

/// Remote store transport failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A save was requested before the project has a persisted id.
    /// Surfaced immediately; no network call is issued.
    #[error("project has no persisted id yet")]
    MissingOwner { kind: ResourceKind },

    /// Required selection fields are absent; blocks scheduling a write.
    #[error("invalid save payload: {reason}")]
    Validation { kind: ResourceKind, reason: String },

    /// The upsert or status read failed in transport. Local edits and
    /// the in-memory snapshot are retained unchanged.
    #[error("failed to {operation} {table}")]
    Transport {
        operation: &'static str,
        table: &'static str,
        #[source]
        source: StoreError,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingOwner { kind } => {
                format!(
                    "The {kind} details can't be saved until the project itself has been created."
                )
            }
            Self::Validation { kind, reason } => {
                format!("The {kind} details are incomplete: {reason}")
            }
            Self::Transport { operation, table, .. } => {
                format!(
                    "Could not {operation} the {table} record. Your changes are kept locally \
                    and will be retried on the next edit."
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingOwner { .. } => {
                Some("Save the project overview first, then retry.".into())
            }
            Self::Validation { .. } => {
                Some("Fill in the required fields before saving.".into())
            }
            Self::Transport { .. } => {
                Some("Check your connection; editing again will retry the save.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
