//! Session event fan-out.
//!
//! An explicit subscribe/notify service object, decoupled from any
//! particular UI rendering model. The UI layer subscribes once and
//! reacts to events; the session never calls into UI code directly.

use poolq_model::ResourceKind;
use poolq_persistence::SaveState;

/// Events emitted by a [`QuoteSession`](crate::QuoteSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The cost snapshot was recomputed.
    SnapshotChanged,
    /// The save state for one resource kind changed.
    SaveStateChanged { kind: ResourceKind, state: SaveState },
    /// A write is blocked pending explicit user confirmation.
    GuardRequired { kind: ResourceKind },
    /// A write failed; edits are retained locally.
    SaveFailed { kind: ResourceKind, message: String },
}

/// Handle for unsubscribing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback = Box<dyn FnMut(&SessionEvent)>;

/// Subscriber registry.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriberId, Callback)>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SessionEvent) + 'static) -> SubscriberId {
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        self.entries.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    pub fn notify(&mut self, event: &SessionEvent) {
        for (_, callback) in &mut self.entries {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
