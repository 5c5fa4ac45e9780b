//! In-memory table store.
//!
//! Backs the controller and session tests. Supports injectable write
//! failure so transport-error paths can be exercised.

use std::collections::HashMap;

use serde_json::Value;

use poolq_model::ProjectStatus;

use crate::error::StoreError;
use crate::store::{RecordId, TableStore};

/// A logged store operation, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Insert { table: String },
    Update { table: String },
}

/// HashMap-backed `TableStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, HashMap<String, Value>>,
    statuses: HashMap<String, ProjectStatus>,
    next_id: u64,
    fail_next_write: bool,
    fail_status_reads: bool,
    write_log: Vec<StoreOp>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lifecycle status returned for a project.
    pub fn set_project_status(&mut self, project_id: impl Into<String>, status: ProjectStatus) {
        self.statuses.insert(project_id.into(), status);
    }

    /// Make the next insert/update fail with a transport error.
    pub fn fail_next_write(&mut self) {
        self.fail_next_write = true;
    }

    /// Make all status reads fail with a transport error.
    pub fn fail_status_reads(&mut self, fail: bool) {
        self.fail_status_reads = fail;
    }

    /// All writes issued so far, in order.
    pub fn write_log(&self) -> &[StoreOp] {
        &self.write_log
    }

    /// Number of writes issued against one table.
    pub fn write_count(&self, table: &str) -> usize {
        self.write_log
            .iter()
            .filter(|op| match op {
                StoreOp::Insert { table: t } | StoreOp::Update { table: t } => t == table,
            })
            .count()
    }

    /// All rows currently in a table.
    pub fn rows(&self, table: &str) -> Vec<&Value> {
        self.tables
            .get(table)
            .map(|rows| rows.values().collect())
            .unwrap_or_default()
    }

    /// One row by id, if present.
    pub fn row(&self, table: &str, id: &RecordId) -> Option<&Value> {
        self.tables.get(table)?.get(id.as_str())
    }

    fn take_write_failure(&mut self) -> Result<(), StoreError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(StoreError::new("injected write failure"));
        }
        Ok(())
    }
}

impl TableStore for MemoryStore {
    fn check_exists(
        &self,
        table: &str,
        fk_column: &str,
        fk_value: &str,
    ) -> Result<Option<RecordId>, StoreError> {
        let Some(rows) = self.tables.get(table) else {
            return Ok(None);
        };
        Ok(rows
            .iter()
            .find(|(_, row)| row.get(fk_column).and_then(Value::as_str) == Some(fk_value))
            .map(|(id, _)| RecordId::new(id.clone())))
    }

    fn fetch(&self, table: &str, id: &RecordId) -> Result<Option<Value>, StoreError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|rows| rows.get(id.as_str()))
            .cloned())
    }

    fn insert(&mut self, table: &str, payload: Value) -> Result<RecordId, StoreError> {
        self.take_write_failure()?;
        self.next_id += 1;
        let id = format!("rec-{}", self.next_id);
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(id.clone(), payload);
        self.write_log.push(StoreOp::Insert {
            table: table.to_string(),
        });
        Ok(RecordId::new(id))
    }

    fn update(&mut self, table: &str, id: &RecordId, payload: Value) -> Result<(), StoreError> {
        self.take_write_failure()?;
        let row = self
            .tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id.as_str()))
            .ok_or_else(|| StoreError::new(format!("no record {id} in {table}")))?;
        *row = payload;
        self.write_log.push(StoreOp::Update {
            table: table.to_string(),
        });
        Ok(())
    }

    fn read_project_status(&self, project_id: &str) -> Result<ProjectStatus, StoreError> {
        if self.fail_status_reads {
            return Err(StoreError::new("injected status read failure"));
        }
        Ok(self
            .statuses
            .get(project_id)
            .copied()
            .unwrap_or(ProjectStatus::Draft))
    }
}
