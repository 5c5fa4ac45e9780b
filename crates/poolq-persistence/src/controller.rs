//! Guarded, debounced mutation control for one project slice.
//!
//! Every write to the remote store goes through a
//! [`GuardedMutationController`], one per `(project, resource kind)`
//! key. The controller enforces:
//!
//! - **trailing-edge debounce** of rapid edits,
//! - **single-flight**: at most one write in flight per key,
//! - a **lifecycle guard** that blocks silent overwrites of a project
//!   that has been sent or approved,
//! - **upsert resolution** against the foreign key, with
//!   field-preserving updates (read-merge-write, so a backend without
//!   column-level patch semantics never nulls untouched columns),
//! - best-effort **slug-to-id remapping** against the catalog,
//! - **typed-row validation**: the candidate row must deserialize as
//!   its kind's [`ResourceRecord`] before it is written.
//!
//! The controller is a sans-IO state machine: `poll` decides when a
//! flight is due, `drive` executes it synchronously against the store
//! trait. An in-flight write cannot be cancelled, only superseded by
//! the next scheduled cycle once it resolves. Failed writes are not
//! retried automatically; the next edit's debounce cycle is the retry
//! path.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use poolq_catalog::CostComponentCatalog;
use poolq_model::{ComponentId, ResourceKind, ResourceRecord};

use crate::debounce::{DebounceConfig, EditTracker};
use crate::error::{PersistenceError, Result};
use crate::store::{RecordId, TableStore, UpsertOutcome};

type JsonMap = Map<String, Value>;

/// Externally visible save state for one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    /// Nothing pending.
    #[default]
    Idle,
    /// Edits pending; the debounce timer is running.
    Scheduled,
    /// A write is executing against the store.
    InFlight,
    /// The write is blocked on explicit user confirmation.
    Guarded,
    /// The last write failed; edits are retained locally.
    Failed,
}

/// Outcome of one `drive` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    /// No flight was due.
    Noop,
    /// The write committed. The caller must invalidate any cached
    /// snapshot for the project.
    Committed(UpsertOutcome),
    /// The lifecycle guard blocked the write pending confirmation.
    Guarded,
}

/// A write taken out of the pending buffer for execution.
#[derive(Debug)]
pub struct Flight {
    payload: JsonMap,
    acknowledged: bool,
}

/// Write controller for one `(project, resource kind)` key.
#[derive(Debug)]
pub struct GuardedMutationController {
    kind: ResourceKind,
    project_id: Option<String>,
    config: DebounceConfig,
    tracker: EditTracker,
    pending: Option<JsonMap>,
    state: SaveState,
    force_save: bool,
    guard_acknowledged: bool,
    last_write_at: Option<DateTime<Utc>>,
}

impl GuardedMutationController {
    pub fn new(kind: ResourceKind, config: DebounceConfig) -> Self {
        Self {
            kind,
            project_id: None,
            config,
            tracker: EditTracker::new(),
            pending: None,
            state: SaveState::Idle,
            force_save: false,
            guard_acknowledged: false,
            last_write_at: None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Set the owning project's persisted id. Until this is set every
    /// edit and save request fails with `MissingOwner`.
    pub fn set_project_id(&mut self, project_id: impl Into<String>) {
        self.project_id = Some(project_id.into());
    }

    /// Externally visible save state.
    pub fn save_state(&self) -> SaveState {
        self.state
    }

    /// When the last write committed.
    pub fn last_write_at(&self) -> Option<DateTime<Utc>> {
        self.last_write_at
    }

    /// Record a local edit and (re)start the debounce timer.
    ///
    /// `partial_payload` must be a JSON object; it is merged on top of
    /// any payload already pending. An edit arriving while a write is
    /// in flight does not cancel the flight; it accumulates into the
    /// next scheduled cycle.
    pub fn note_edit(&mut self, partial_payload: Value, now: Instant) -> Result<()> {
        if self.project_id.is_none() {
            return Err(PersistenceError::MissingOwner { kind: self.kind });
        }
        let Value::Object(partial) = partial_payload else {
            return Err(PersistenceError::Validation {
                kind: self.kind,
                reason: "payload must be a JSON object".to_string(),
            });
        };
        if partial.is_empty() {
            return Err(PersistenceError::Validation {
                kind: self.kind,
                reason: "payload is empty".to_string(),
            });
        }

        merge_into(self.pending.get_or_insert_with(JsonMap::new), partial);
        self.tracker.mark_edit(now);

        self.state = match self.state {
            SaveState::Idle | SaveState::Scheduled | SaveState::Failed => SaveState::Scheduled,
            // The flight keeps running; the new edit waits for the next cycle.
            SaveState::InFlight => SaveState::InFlight,
            // The confirmation prompt is still outstanding.
            SaveState::Guarded => SaveState::Guarded,
        };
        Ok(())
    }

    /// Request an immediate save of the pending payload, bypassing the
    /// debounce wait (but not the single-flight or guard rules).
    pub fn request_save(&mut self, _now: Instant) -> Result<()> {
        if self.project_id.is_none() {
            return Err(PersistenceError::MissingOwner { kind: self.kind });
        }
        if self.pending.is_none() {
            return Ok(());
        }
        match self.state {
            SaveState::InFlight | SaveState::Guarded => {}
            _ => self.state = SaveState::Scheduled,
        }
        self.force_save = true;
        Ok(())
    }

    /// Acknowledge the lifecycle guard and re-arm the blocked write.
    ///
    /// The acknowledgement covers exactly one flight.
    pub fn confirm_guarded_save(&mut self, _now: Instant) {
        if self.state != SaveState::Guarded {
            return;
        }
        self.guard_acknowledged = true;
        self.force_save = true;
        self.state = SaveState::Scheduled;
    }

    /// Drop the guarded write entirely.
    pub fn cancel_guarded_save(&mut self) {
        if self.state != SaveState::Guarded {
            return;
        }
        self.pending = None;
        self.guard_acknowledged = false;
        self.force_save = false;
        self.tracker = EditTracker::new();
        self.state = SaveState::Idle;
    }

    /// Whether a flight is due at `now`.
    pub fn poll(&self, now: Instant) -> bool {
        self.state == SaveState::Scheduled
            && !self.tracker.is_saving()
            && self.pending.is_some()
            && (self.force_save || self.tracker.should_fire(&self.config, now))
    }

    /// Take the pending payload into a flight, entering `InFlight`.
    ///
    /// Returns `None` when no flight is due. Building block of `drive`;
    /// exposed so callers with their own transport loop can split the
    /// start and completion of a write.
    pub fn begin_flight(&mut self, now: Instant) -> Option<Flight> {
        if !self.poll(now) {
            return None;
        }
        let payload = self.pending.take()?;
        self.tracker.start_save();
        self.state = SaveState::InFlight;
        self.force_save = false;
        let acknowledged = std::mem::take(&mut self.guard_acknowledged);
        Some(Flight {
            payload,
            acknowledged,
        })
    }

    /// Record a committed flight.
    pub fn finish_committed(&mut self, committed_at: DateTime<Utc>) {
        self.tracker.save_complete();
        self.last_write_at = Some(committed_at);
        // Edits that arrived during the flight start the next cycle.
        self.state = if self.pending.is_some() {
            SaveState::Scheduled
        } else {
            SaveState::Idle
        };
    }

    /// Record a flight blocked by the lifecycle guard. The payload is
    /// restored under any edits that arrived during the status read.
    pub fn finish_guarded(&mut self, flight: Flight, now: Instant) {
        self.restore_payload(flight.payload);
        self.tracker.save_failed(now);
        self.state = SaveState::Guarded;
    }

    /// Record a failed flight. The payload is restored; the next edit's
    /// debounce cycle retries.
    pub fn finish_failed(&mut self, flight: Flight, now: Instant) {
        self.restore_payload(flight.payload);
        self.tracker.save_failed(now);
        self.state = SaveState::Failed;
    }

    fn restore_payload(&mut self, flight_payload: JsonMap) {
        // Newer edits win over the restored flight payload.
        let newer = self.pending.take();
        let mut restored = flight_payload;
        if let Some(newer) = newer {
            merge_into(&mut restored, newer);
        }
        self.pending = Some(restored);
    }

    /// Execute a due flight against the store, if any.
    ///
    /// Synchronous from the caller's point of view; the store calls are
    /// the only suspension points in the system.
    pub fn drive(
        &mut self,
        store: &mut dyn TableStore,
        catalog: &CostComponentCatalog,
        now: Instant,
    ) -> Result<DriveOutcome> {
        let Some(flight) = self.begin_flight(now) else {
            return Ok(DriveOutcome::Noop);
        };
        let Some(project_id) = self.project_id.clone() else {
            // note_edit refuses payloads without an owner, so a flight
            // without one cannot normally exist.
            self.finish_failed(flight, now);
            return Err(PersistenceError::MissingOwner { kind: self.kind });
        };

        // Lifecycle guard: resolve the project's current status before
        // the write. Re-checked every flight, not cached per session,
        // so a project approved mid-session still triggers the guard.
        if self.kind.is_session_protected() && !flight.acknowledged {
            let status = match store.read_project_status(&project_id) {
                Ok(status) => status,
                Err(source) => {
                    self.finish_failed(flight, now);
                    return Err(PersistenceError::Transport {
                        operation: "read status of",
                        table: ResourceKind::PoolShell.table().table,
                        source,
                    });
                }
            };
            if status.is_write_protected() {
                tracing::info!(
                    kind = %self.kind,
                    project_id = %project_id,
                    %status,
                    "write blocked by lifecycle guard, confirmation required"
                );
                self.finish_guarded(flight, now);
                return Ok(DriveOutcome::Guarded);
            }
        }

        let mut payload = flight.payload.clone();
        remap_slugs(catalog, self.kind, &mut payload);

        let spec = self.kind.table();
        let transport = |operation: &'static str, source| {
            PersistenceError::Transport {
                operation,
                table: spec.table,
                source,
            }
        };

        let existing = match store.check_exists(spec.table, spec.fk_column, &project_id) {
            Ok(existing) => existing,
            Err(source) => {
                self.finish_failed(flight, now);
                return Err(transport("look up", source));
            }
        };

        let outcome = match existing {
            Some(record_id) => {
                // Field-preserving update: read the full record and merge
                // the partial payload on top of it.
                let base = match store.fetch(spec.table, &record_id) {
                    Ok(row) => row,
                    Err(source) => {
                        self.finish_failed(flight, now);
                        return Err(transport("read", source));
                    }
                };
                let mut merged = match base {
                    Some(Value::Object(map)) => map,
                    _ => JsonMap::new(),
                };
                merge_into(&mut merged, payload);
                merged.insert(
                    spec.fk_column.to_string(),
                    Value::String(project_id.clone()),
                );
                if let Err(error) = validate_row(self.kind, &merged) {
                    self.finish_failed(flight, now);
                    return Err(error);
                }
                if let Err(source) = store.update(spec.table, &record_id, Value::Object(merged)) {
                    self.finish_failed(flight, now);
                    return Err(transport("update", source));
                }
                UpsertOutcome {
                    record_id,
                    created: false,
                }
            }
            None => {
                payload.insert(
                    spec.fk_column.to_string(),
                    Value::String(project_id.clone()),
                );
                if let Err(error) = validate_row(self.kind, &payload) {
                    self.finish_failed(flight, now);
                    return Err(error);
                }
                match store.insert(spec.table, Value::Object(payload)) {
                    Ok(record_id) => UpsertOutcome {
                        record_id,
                        created: true,
                    },
                    Err(source) => {
                        self.finish_failed(flight, now);
                        return Err(transport("create", source));
                    }
                }
            }
        };

        tracing::debug!(
            kind = %self.kind,
            project_id = %project_id,
            record_id = %outcome.record_id,
            created = outcome.created,
            "write committed"
        );
        self.finish_committed(Utc::now());
        Ok(DriveOutcome::Committed(outcome))
    }
}

/// Boundary check: the candidate row must deserialize as its kind's
/// typed record. The untyped map is still what gets written, so fields
/// the type does not know about survive an update untouched.
fn validate_row(kind: ResourceKind, row: &JsonMap) -> Result<()> {
    ResourceRecord::from_row(kind, Value::Object(row.clone()))
        .map(drop)
        .map_err(|error| PersistenceError::Validation {
            kind,
            reason: error.to_string(),
        })
}

/// Shallow merge: `overlay` keys win over `base`.
fn merge_into(base: &mut JsonMap, overlay: JsonMap) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}

/// Replace slug-valued fields with canonical catalog ids, best-effort.
///
/// A value that already is a canonical id is left alone; a slug that
/// cannot be resolved passes through with a warning rather than
/// aborting the write.
fn remap_slugs(catalog: &CostComponentCatalog, kind: ResourceKind, payload: &mut JsonMap) {
    for field in kind.slug_fields() {
        let Some(Value::String(value)) = payload.get(*field) else {
            continue;
        };
        if catalog.get(&ComponentId::new(value.clone())).is_some() {
            continue;
        }
        match catalog.resolve_slug(value) {
            Some(id) => {
                tracing::debug!(kind = %kind, field, slug = %value, id = %id, "slug remapped");
                let id = Value::String(id.as_str().to_string());
                payload.insert((*field).to_string(), id);
            }
            None => {
                tracing::warn!(
                    kind = %kind,
                    field,
                    value = %value,
                    "unresolvable slug, writing value as-is"
                );
            }
        }
    }
}
