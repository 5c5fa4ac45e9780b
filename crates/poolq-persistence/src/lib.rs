//! Guarded persistence for the pool quoting core.
//!
//! Every write to the remote table store goes through a
//! [`GuardedMutationController`]: edits are debounced, at most one
//! write is in flight per `(project, resource kind)` key, and a project
//! that has been sent or approved is never silently overwritten. After
//! a committed write the [`SnapshotStore`] marks the project's cached
//! cost snapshot stale.
//!
//! The remote store is consumed through the narrow [`TableStore`]
//! trait; the core is agnostic to the transport behind it.

mod controller;
mod debounce;
mod error;
mod invalidator;
mod memory;
mod store;

pub use controller::{DriveOutcome, Flight, GuardedMutationController, SaveState};
pub use debounce::{DebounceConfig, EditTracker};
pub use error::{PersistenceError, Result, StoreError};
pub use invalidator::SnapshotStore;
pub use memory::{MemoryStore, StoreOp};
pub use store::{RecordId, TableStore, UpsertOutcome};
