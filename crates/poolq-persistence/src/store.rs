//! The narrow remote-store contract.
//!
//! The core is agnostic to the transport behind this trait; it only
//! assumes that calls complete synchronously from its point of view and
//! that the store is the system of record. Nothing here is
//! transactional: check-then-write races with concurrent writers and
//! last write wins.

use std::fmt;

use serde_json::Value;

use poolq_model::ProjectStatus;

use crate::error::StoreError;

/// Opaque remote record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of an upsert resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub record_id: RecordId,
    /// True when the write was routed through `insert`.
    pub created: bool,
}

/// Read/write access to the remote table store.
pub trait TableStore {
    /// Find an existing record by foreign key, if any.
    fn check_exists(
        &self,
        table: &str,
        fk_column: &str,
        fk_value: &str,
    ) -> std::result::Result<Option<RecordId>, StoreError>;

    /// Read a full record by id.
    fn fetch(
        &self,
        table: &str,
        id: &RecordId,
    ) -> std::result::Result<Option<Value>, StoreError>;

    /// Insert a new record, returning its id.
    fn insert(&mut self, table: &str, payload: Value) -> std::result::Result<RecordId, StoreError>;

    /// Replace an existing record.
    fn update(
        &mut self,
        table: &str,
        id: &RecordId,
        payload: Value,
    ) -> std::result::Result<(), StoreError>;

    /// Read the owning project's lifecycle status.
    fn read_project_status(
        &self,
        project_id: &str,
    ) -> std::result::Result<ProjectStatus, StoreError>;
}
