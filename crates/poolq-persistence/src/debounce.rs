//! Debounce timing for scheduled writes.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Configuration for debounced saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Whether debounced scheduling is enabled. When disabled, only
    /// explicit `request_save` calls fire writes.
    pub enabled: bool,

    /// Trailing-edge debounce delay in milliseconds.
    ///
    /// After an edit, the controller waits this long before writing.
    /// Additional edits reset the timer.
    pub debounce_ms: u64,

    /// Maximum delay before forcing a write.
    ///
    /// If edits keep coming, write after this many milliseconds since
    /// the first unsaved edit.
    pub max_delay_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 800,     // observed window across editors: 500 ms - 1.5 s
            max_delay_ms: 10_000, // force a write under continuous editing
        }
    }
}

impl DebounceConfig {
    /// Create a disabled config (explicit saves only).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Check if a write should fire given the time since the last edit
    /// and the time since the first unsaved edit.
    pub fn should_save(&self, since_last_edit_ms: u64, since_first_unsaved_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }
        if since_last_edit_ms >= self.debounce_ms {
            return true;
        }
        if since_first_unsaved_ms >= self.max_delay_ms {
            return true;
        }
        false
    }
}

/// Tracks unsaved edits for one `(project, resource)` key.
///
/// All timing methods take an explicit `now` so debounce behaviour is
/// deterministic under test; callers pass `Instant::now()` in
/// production.
#[derive(Debug, Clone, Default)]
pub struct EditTracker {
    dirty: bool,
    saving: bool,
    last_edit: Option<Instant>,
    first_unsaved: Option<Instant>,
}

impl EditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there are unsaved edits.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a write is currently in flight.
    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Record an edit, (re)starting the debounce timer.
    pub fn mark_edit(&mut self, now: Instant) {
        self.dirty = true;
        self.last_edit = Some(now);
        if self.first_unsaved.is_none() {
            self.first_unsaved = Some(now);
        }
    }

    /// Mark that a write has started.
    pub fn start_save(&mut self) {
        self.saving = true;
        // Edits arriving from here on belong to the next cycle.
        self.dirty = false;
        self.first_unsaved = None;
    }

    /// Mark that the write committed.
    pub fn save_complete(&mut self) {
        self.saving = false;
    }

    /// Mark that the write failed. Unsaved edits are restored by the
    /// controller; the tracker only clears the in-flight flag.
    pub fn save_failed(&mut self, now: Instant) {
        self.saving = false;
        self.dirty = true;
        if self.last_edit.is_none() {
            self.last_edit = Some(now);
        }
        if self.first_unsaved.is_none() {
            self.first_unsaved = Some(now);
        }
    }

    /// Whether the debounce window has elapsed and a write should fire.
    pub fn should_fire(&self, config: &DebounceConfig, now: Instant) -> bool {
        if !self.dirty || self.saving {
            return false;
        }
        match (self.last_edit, self.first_unsaved) {
            (Some(last), Some(first)) => config.should_save(
                now.saturating_duration_since(last).as_millis() as u64,
                now.saturating_duration_since(first).as_millis() as u64,
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn default_config() {
        let config = DebounceConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce_ms, 800);
    }

    #[test]
    fn disabled_config_never_fires() {
        let config = DebounceConfig::disabled();
        assert!(!config.should_save(10_000, 60_000));
    }

    #[test]
    fn trailing_edge_debounce() {
        let config = DebounceConfig::default();
        let mut tracker = EditTracker::new();
        let t0 = Instant::now();

        tracker.mark_edit(t0);
        assert!(!tracker.should_fire(&config, t0 + ms(100)));

        // Further edits reset the timer.
        tracker.mark_edit(t0 + ms(600));
        assert!(!tracker.should_fire(&config, t0 + ms(1000)));

        // Quiet period elapses after the LAST edit.
        assert!(tracker.should_fire(&config, t0 + ms(1500)));
    }

    #[test]
    fn max_delay_forces_fire_under_continuous_editing() {
        let config = DebounceConfig {
            enabled: true,
            debounce_ms: 800,
            max_delay_ms: 5000,
        };
        let mut tracker = EditTracker::new();
        let t0 = Instant::now();

        // Edit every 500 ms; the debounce window never elapses.
        let mut t = t0;
        while t < t0 + ms(5200) {
            tracker.mark_edit(t);
            t += ms(500);
        }
        assert!(tracker.should_fire(&config, t));
    }

    #[test]
    fn no_fire_while_saving() {
        let config = DebounceConfig::default();
        let mut tracker = EditTracker::new();
        let t0 = Instant::now();

        tracker.mark_edit(t0);
        tracker.start_save();
        assert!(!tracker.should_fire(&config, t0 + ms(2000)));

        tracker.save_complete();
        // The flight consumed the dirty state; nothing new to write.
        assert!(!tracker.should_fire(&config, t0 + ms(3000)));
    }

    #[test]
    fn edit_during_save_belongs_to_next_cycle() {
        let config = DebounceConfig::default();
        let mut tracker = EditTracker::new();
        let t0 = Instant::now();

        tracker.mark_edit(t0);
        tracker.start_save();
        tracker.mark_edit(t0 + ms(100));
        tracker.save_complete();

        assert!(tracker.is_dirty());
        assert!(!tracker.should_fire(&config, t0 + ms(200)));
        assert!(tracker.should_fire(&config, t0 + ms(1000)));
    }

    #[test]
    fn failed_save_keeps_tracker_dirty() {
        let config = DebounceConfig::default();
        let mut tracker = EditTracker::new();
        let t0 = Instant::now();

        tracker.mark_edit(t0);
        tracker.start_save();
        tracker.save_failed(t0 + ms(100));

        assert!(tracker.is_dirty());
        assert!(tracker.should_fire(&config, t0 + ms(1000)));
    }
}
