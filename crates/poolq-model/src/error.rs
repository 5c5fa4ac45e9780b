use thiserror::Error;

use crate::ResourceKind;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },
    #[error("invalid {kind} row: {reason}")]
    InvalidRow { kind: ResourceKind, reason: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
