//! The project editing session.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::{Value, json};

use poolq_catalog::{CostComponentCatalog, RateCache};
use poolq_model::{
    Category, ComponentId, ProjectCostSnapshot, ResourceKind, Selection,
};
use poolq_persistence::{
    DebounceConfig, DriveOutcome, GuardedMutationController, PersistenceError, Result, SaveState,
    SnapshotStore, TableStore,
};
use poolq_pricing::aggregate;

use crate::observer::{SessionEvent, SubscriberId, Subscribers};

/// Editing session for one project.
///
/// Owns the selections and the snapshot exclusively; the catalog is
/// shared read-only; the remote store remains the system of record and
/// is mutated only through the per-kind controllers. Aggregation is
/// synchronous; store access happens only inside [`QuoteSession::drive`].
pub struct QuoteSession {
    catalog: Arc<CostComponentCatalog>,
    config: DebounceConfig,
    project_id: Option<String>,
    selections: BTreeMap<ComponentId, Selection>,
    margin_pct: f64,
    snapshot: ProjectCostSnapshot,
    rates: RateCache,
    controllers: BTreeMap<ResourceKind, GuardedMutationController>,
    subscribers: Subscribers,
}

impl QuoteSession {
    pub fn new(catalog: Arc<CostComponentCatalog>, config: DebounceConfig) -> Self {
        Self {
            catalog,
            config,
            project_id: None,
            selections: BTreeMap::new(),
            margin_pct: 0.0,
            snapshot: ProjectCostSnapshot::default(),
            rates: RateCache::new(),
            controllers: BTreeMap::new(),
            subscribers: Subscribers::new(),
        }
    }

    /// Attach the persisted project id. Saves are disabled until this
    /// is called; local editing and aggregation work regardless.
    pub fn set_project_id(&mut self, project_id: impl Into<String>) {
        let project_id = project_id.into();
        for controller in self.controllers.values_mut() {
            controller.set_project_id(project_id.clone());
        }
        self.project_id = Some(project_id);
    }

    /// The current cost snapshot. Recomputed synchronously on every
    /// selection or margin change; this is the only entity the UI reads.
    pub fn snapshot(&self) -> &ProjectCostSnapshot {
        &self.snapshot
    }

    /// Composite-rate quote for an area-priced component.
    ///
    /// Material plus wastage plus margin per unit, multiplied by the
    /// area. This is what the paving and concrete editors display, and
    /// what gets persisted as `quoted_price` next to the raw area.
    /// Unknown ids quote 0.
    pub fn priced_area(&mut self, component_id: &ComponentId, area: f64) -> f64 {
        poolq_catalog::priced_area(&mut self.rates, &self.catalog, component_id, area)
    }

    /// Save state for one resource kind.
    pub fn save_state(&self, kind: ResourceKind) -> SaveState {
        self.controllers
            .get(&kind)
            .map(GuardedMutationController::save_state)
            .unwrap_or_default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SessionEvent) + 'static) -> SubscriberId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.unsubscribe(id);
    }

    /// Apply a selection edit: upsert the selection (or remove it when
    /// quantity drops to zero or below), recompute the snapshot, and
    /// schedule a write for the category's resource kind. Area-priced
    /// categories carry their composite-rate quote in the payload.
    pub fn on_selection_changed(&mut self, selection: Selection, now: Instant) -> Result<()> {
        let kind = selection.category.resource_kind();
        selection.validate().map_err(|e| PersistenceError::Validation {
            kind,
            reason: e.to_string(),
        })?;

        let mut payload = selection_payload(&selection);
        if let Category::Paving | Category::Concrete = selection.category {
            let quoted = selection
                .is_active()
                .then(|| self.priced_area(&selection.component_id, selection.quantity));
            if let Some(map) = payload.as_object_mut() {
                map.insert("quoted_price".to_string(), json!(quoted));
            }
        }
        if selection.is_active() {
            self.selections
                .insert(selection.component_id.clone(), selection);
        } else {
            self.selections.remove(&selection.component_id);
        }
        self.recompute_snapshot();
        self.schedule_write(kind, payload, now);
        Ok(())
    }

    /// Apply a margin percentage edit and schedule the project-level write.
    pub fn on_margin_pct_changed(&mut self, pct: f64, now: Instant) {
        self.margin_pct = if pct.is_finite() { pct.max(0.0) } else { 0.0 };
        self.recompute_snapshot();
        self.schedule_write(
            ResourceKind::PoolShell,
            json!({ "margin_pct": self.margin_pct }),
            now,
        );
    }

    /// Request an immediate save for one resource kind.
    ///
    /// Fails with `MissingOwner` before the project has a persisted id;
    /// no network call is issued in that case.
    pub fn request_save(&mut self, kind: ResourceKind, now: Instant) -> Result<()> {
        if self.project_id.is_none() {
            return Err(PersistenceError::MissingOwner { kind });
        }
        let result = self.controller_mut(kind).request_save(now);
        self.emit_state(kind);
        result
    }

    /// Acknowledge a guarded write and re-arm it.
    pub fn confirm_guarded_save(&mut self, kind: ResourceKind, now: Instant) {
        self.controller_mut(kind).confirm_guarded_save(now);
        self.emit_state(kind);
    }

    /// Drop a guarded write.
    pub fn cancel_guarded_save(&mut self, kind: ResourceKind) {
        self.controller_mut(kind).cancel_guarded_save();
        self.emit_state(kind);
    }

    /// Execute every due write against the store.
    ///
    /// Commits invalidate the project's cached snapshot; guard hits and
    /// failures are surfaced as events. Failures for one kind have no
    /// effect on siblings, and there is no cross-kind ordering
    /// guarantee.
    pub fn drive(
        &mut self,
        store: &mut dyn TableStore,
        snapshots: &mut SnapshotStore,
        now: Instant,
    ) {
        let kinds: Vec<ResourceKind> = self.controllers.keys().copied().collect();
        for kind in kinds {
            let before = self.save_state(kind);
            let outcome = self
                .controllers
                .get_mut(&kind)
                .map(|c| c.drive(store, &self.catalog, now));
            match outcome {
                None | Some(Ok(DriveOutcome::Noop)) => {}
                Some(Ok(DriveOutcome::Committed(_))) => {
                    if let Some(project_id) = &self.project_id {
                        snapshots.on_write_committed(project_id);
                    }
                }
                Some(Ok(DriveOutcome::Guarded)) => {
                    self.subscribers.notify(&SessionEvent::GuardRequired { kind });
                }
                Some(Err(error)) => {
                    tracing::warn!(kind = %kind, error = %error, "save failed");
                    self.subscribers.notify(&SessionEvent::SaveFailed {
                        kind,
                        message: error.user_message(),
                    });
                }
            }
            let after = self.save_state(kind);
            if before != after {
                self.subscribers
                    .notify(&SessionEvent::SaveStateChanged { kind, state: after });
            }
        }
    }

    fn emit_state(&mut self, kind: ResourceKind) {
        let state = self.save_state(kind);
        self.subscribers
            .notify(&SessionEvent::SaveStateChanged { kind, state });
    }

    fn controller_mut(&mut self, kind: ResourceKind) -> &mut GuardedMutationController {
        let config = self.config.clone();
        let project_id = self.project_id.clone();
        self.controllers.entry(kind).or_insert_with(|| {
            let mut controller = GuardedMutationController::new(kind, config);
            if let Some(project_id) = project_id {
                controller.set_project_id(project_id);
            }
            controller
        })
    }

    fn recompute_snapshot(&mut self) {
        let selections: Vec<Selection> = self.selections.values().cloned().collect();
        self.snapshot = aggregate(&self.catalog, &selections, self.margin_pct);
        self.subscribers.notify(&SessionEvent::SnapshotChanged);
    }

    /// Schedule a debounced write, when the project is persisted.
    /// Before that, edits stay local; the save surface is disabled at
    /// the source.
    fn schedule_write(&mut self, kind: ResourceKind, payload: Value, now: Instant) {
        if self.project_id.is_none() {
            tracing::debug!(kind = %kind, "project not persisted yet, edit kept local");
            return;
        }
        let before = self.save_state(kind);
        if let Err(error) = self.controller_mut(kind).note_edit(payload, now) {
            tracing::warn!(kind = %kind, error = %error, "edit not scheduled");
            return;
        }
        let after = self.save_state(kind);
        if before != after {
            self.subscribers
                .notify(&SessionEvent::SaveStateChanged { kind, state: after });
        }
    }
}

/// Build the partial write payload for one selection.
///
/// Each category maps to the columns its editor owns. Component
/// references are written by id; the persistence layer remaps any
/// slug-valued fields before the write.
fn selection_payload(selection: &Selection) -> Value {
    let id = if selection.is_active() {
        Value::String(selection.component_id.as_str().to_string())
    } else {
        Value::Null
    };
    let quantity = selection.quantity.max(0.0);

    match selection.category {
        Category::PoolShell => json!({ "pool_model": id }),
        Category::FiltrationPackage => json!({ "package": id, "pump_count": quantity }),
        Category::Excavation => json!({ "excavation_type": id, "depth_meters": quantity }),
        Category::Crane => json!({ "crane_id": id }),
        Category::Paving => json!({ "paving_category": id, "area_m2": quantity }),
        Category::Concrete => json!({ "concrete_type": id, "area_m2": quantity }),
        Category::WaterFeature => json!({ "feature_size": id }),
        Category::LedBlade => json!({ "blade_count": quantity }),
        Category::Electrical => json!({ "supply_runs": quantity }),
        Category::Heating => json!({ "heat_pump": id }),
        Category::Fencing => json!({ "fencing_meters": quantity }),
        Category::Extras => json!({ "extra_items": [id] }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolq_model::{CostComponent, UnitKind};

    fn catalog() -> Arc<CostComponentCatalog> {
        let mut catalog = CostComponentCatalog::new();
        catalog.upsert(CostComponent {
            id: ComponentId::new("cop-001"),
            slug: "travertine-coping".to_string(),
            category: Category::Paving,
            base_cost: 40.0,
            margin: 12.0,
            unit_kind: UnitKind::PerMeter,
        });
        Arc::new(catalog)
    }

    #[test]
    fn selection_updates_snapshot_synchronously() {
        let mut session = QuoteSession::new(catalog(), DebounceConfig::default());
        session
            .on_selection_changed(
                Selection::new("cop-001", Category::Paving, 25.0),
                Instant::now(),
            )
            .unwrap();

        let paving = session.snapshot().by_category[&Category::Paving];
        assert_eq!(paving.cost, 1000.0);
        assert_eq!(paving.margin, 300.0);
        assert_eq!(paving.price, 1300.0);
    }

    #[test]
    fn priced_area_quotes_composite_rate() {
        let mut session = QuoteSession::new(catalog(), DebounceConfig::default());

        // 40 material + 4 wastage + 12 margin per unit, times 25.
        assert_eq!(session.priced_area(&ComponentId::new("cop-001"), 25.0), 1400.0);
        assert_eq!(session.priced_area(&ComponentId::new("ghost"), 25.0), 0.0);
    }

    #[test]
    fn zero_quantity_removes_selection() {
        let mut session = QuoteSession::new(catalog(), DebounceConfig::default());
        let now = Instant::now();
        session
            .on_selection_changed(Selection::new("cop-001", Category::Paving, 25.0), now)
            .unwrap();
        session
            .on_selection_changed(Selection::new("cop-001", Category::Paving, 0.0), now)
            .unwrap();

        assert_eq!(session.snapshot().total_cost, 0.0);
    }

    #[test]
    fn margin_change_recomputes_rrp() {
        let mut session = QuoteSession::new(catalog(), DebounceConfig::default());
        let now = Instant::now();
        session
            .on_selection_changed(Selection::new("cop-001", Category::Paving, 25.0), now)
            .unwrap();
        session.on_margin_pct_changed(20.0, now);
        assert_eq!(session.snapshot().recommended_retail_price, 1250.0);

        session.on_margin_pct_changed(100.0, now);
        assert_eq!(session.snapshot().recommended_retail_price, 0.0);
    }

    #[test]
    fn request_save_without_project_is_missing_owner() {
        let mut session = QuoteSession::new(catalog(), DebounceConfig::default());
        let error = session
            .request_save(ResourceKind::Paving, Instant::now())
            .unwrap_err();
        assert!(matches!(error, PersistenceError::MissingOwner { .. }));
    }

    #[test]
    fn local_edits_work_without_project_id() {
        let mut session = QuoteSession::new(catalog(), DebounceConfig::default());
        session
            .on_selection_changed(
                Selection::new("cop-001", Category::Paving, 10.0),
                Instant::now(),
            )
            .unwrap();
        assert!(session.snapshot().total_cost > 0.0);
        assert_eq!(session.save_state(ResourceKind::Paving), SaveState::Idle);
    }

    #[test]
    fn invalid_selection_is_rejected() {
        let mut session = QuoteSession::new(catalog(), DebounceConfig::default());
        let error = session
            .on_selection_changed(
                Selection::new("  ", Category::Paving, 5.0),
                Instant::now(),
            )
            .unwrap_err();
        assert!(matches!(error, PersistenceError::Validation { .. }));
    }
}
