//! End-to-end session flows against the in-memory store.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use poolq_catalog::CostComponentCatalog;
use poolq_model::{Category, ComponentId, CostComponent, ProjectStatus, ResourceKind, Selection, UnitKind};
use poolq_persistence::{DebounceConfig, MemoryStore, SaveState, SnapshotStore};
use poolq_session::{QuoteSession, SessionEvent};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn demo_catalog() -> Arc<CostComponentCatalog> {
    let mut catalog = CostComponentCatalog::new();
    for (id, slug, category, base_cost, margin, unit_kind) in [
        (
            "pav-001",
            "travertine-silver",
            Category::Paving,
            85.0,
            20.0,
            UnitKind::PerSquareMeter,
        ),
        (
            "crn-001",
            "franna-20t",
            Category::Crane,
            700.0,
            140.0,
            UnitKind::PerItem,
        ),
        (
            "flt-001",
            "viron-p320",
            Category::FiltrationPackage,
            1850.0,
            450.0,
            UnitKind::PerItem,
        ),
    ] {
        catalog.upsert(CostComponent {
            id: ComponentId::new(id),
            slug: slug.to_string(),
            category,
            base_cost,
            margin,
            unit_kind,
        });
    }
    Arc::new(catalog)
}

fn session_with_project() -> QuoteSession {
    let mut session = QuoteSession::new(demo_catalog(), DebounceConfig::default());
    session.set_project_id("proj-1");
    session
}

#[test]
fn rapid_edits_flush_as_one_write_per_kind() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    for i in 0..4u64 {
        session
            .on_selection_changed(
                Selection::new("pav-001", Category::Paving, 30.0 + i as f64),
                t0 + ms(i * 100),
            )
            .unwrap();
    }
    session.drive(&mut store, &mut snapshots, t0 + ms(400));
    assert_eq!(store.write_count("pool_paving"), 0); // window still open

    session.drive(&mut store, &mut snapshots, t0 + ms(1400));
    assert_eq!(store.write_count("pool_paving"), 1);
    assert_eq!(store.rows("pool_paving")[0]["area_m2"], 33.0);
}

#[test]
fn kinds_flush_independently() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 30.0), t0)
        .unwrap();
    session
        .on_selection_changed(Selection::new("crn-001", Category::Crane, 1.0), t0)
        .unwrap();

    // A failure in one kind has no effect on siblings.
    store.fail_next_write();
    session.drive(&mut store, &mut snapshots, t0 + ms(1000));

    let written = store.write_count("pool_paving") + store.write_count("pool_crane");
    assert_eq!(written, 1); // one kind failed, the sibling committed

    // The failed kind retries on its next cycle.
    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 31.0), t0 + ms(2000))
        .unwrap();
    session
        .on_selection_changed(Selection::new("crn-001", Category::Crane, 2.0), t0 + ms(2000))
        .unwrap();
    session.drive(&mut store, &mut snapshots, t0 + ms(3000));
    assert!(store.write_count("pool_paving") >= 1);
    assert!(store.write_count("pool_crane") >= 1);
}

#[test]
fn committed_write_invalidates_cached_snapshot() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    snapshots.insert("proj-1", session.snapshot().clone());
    assert!(snapshots.get("proj-1").is_some());

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 30.0), t0)
        .unwrap();
    session.drive(&mut store, &mut snapshots, t0 + ms(1000));

    // The paving editor committed; any other editor must now recompute
    // instead of reading the stale cached totals.
    assert!(snapshots.get("proj-1").is_none());
    assert!(snapshots.is_stale("proj-1"));
}

#[test]
fn approved_project_requires_confirmation_then_writes_once() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    store.set_project_status("proj-1", ProjectStatus::Approved);
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    let events: Rc<RefCell<Vec<SessionEvent>>> = Rc::default();
    let events_clone = Rc::clone(&events);
    session.subscribe(move |event| events_clone.borrow_mut().push(event.clone()));

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 30.0), t0)
        .unwrap();
    session.request_save(ResourceKind::Paving, t0).unwrap();
    session.drive(&mut store, &mut snapshots, t0);

    assert_eq!(session.save_state(ResourceKind::Paving), SaveState::Guarded);
    assert_eq!(store.write_count("pool_paving"), 0);
    assert!(events
        .borrow()
        .iter()
        .any(|e| matches!(e, SessionEvent::GuardRequired { kind: ResourceKind::Paving })));

    session.confirm_guarded_save(ResourceKind::Paving, t0);
    session.drive(&mut store, &mut snapshots, t0);
    assert_eq!(store.write_count("pool_paving"), 1);
    assert_eq!(session.save_state(ResourceKind::Paving), SaveState::Idle);
}

#[test]
fn cancelled_guard_drops_the_write() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    store.set_project_status("proj-1", ProjectStatus::Sent);
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 30.0), t0)
        .unwrap();
    session.request_save(ResourceKind::Paving, t0).unwrap();
    session.drive(&mut store, &mut snapshots, t0);
    assert_eq!(session.save_state(ResourceKind::Paving), SaveState::Guarded);

    session.cancel_guarded_save(ResourceKind::Paving);
    session.drive(&mut store, &mut snapshots, t0 + ms(10_000));
    assert_eq!(store.write_count("pool_paving"), 0);
    assert_eq!(session.save_state(ResourceKind::Paving), SaveState::Idle);
}

#[test]
fn transport_failure_surfaces_event_and_keeps_snapshot() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    let failures: Rc<RefCell<Vec<String>>> = Rc::default();
    let failures_clone = Rc::clone(&failures);
    session.subscribe(move |event| {
        if let SessionEvent::SaveFailed { message, .. } = event {
            failures_clone.borrow_mut().push(message.clone());
        }
    });

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 30.0), t0)
        .unwrap();
    let total_before = session.snapshot().total_cost;

    store.fail_next_write();
    session.drive(&mut store, &mut snapshots, t0 + ms(1000));

    assert_eq!(session.save_state(ResourceKind::Paving), SaveState::Failed);
    assert_eq!(failures.borrow().len(), 1);
    // Local state is retained unchanged; nothing is rolled back.
    assert_eq!(session.snapshot().total_cost, total_before);
}

#[test]
fn second_save_routes_through_update() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 30.0), t0)
        .unwrap();
    session.drive(&mut store, &mut snapshots, t0 + ms(1000));

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 45.0), t0 + ms(2000))
        .unwrap();
    session.drive(&mut store, &mut snapshots, t0 + ms(3000));

    // Exactly one record for the foreign key after two saves.
    assert_eq!(store.rows("pool_paving").len(), 1);
    assert_eq!(store.rows("pool_paving")[0]["area_m2"], 45.0);
}

#[test]
fn paving_write_carries_composite_area_quote() {
    let mut session = session_with_project();
    let mut store = MemoryStore::new();
    let mut snapshots = SnapshotStore::new();
    let t0 = Instant::now();

    session
        .on_selection_changed(Selection::new("pav-001", Category::Paving, 30.0), t0)
        .unwrap();
    session.drive(&mut store, &mut snapshots, t0 + ms(1000));

    // 85 material + 8.5 wastage + 20 margin per m², times 30 m².
    let row = store.rows("pool_paving")[0];
    assert_eq!(row["area_m2"], 30.0);
    assert_eq!(row["quoted_price"], 3405.0);
}

#[test]
fn snapshot_events_fire_on_every_recompute() {
    let mut session = session_with_project();
    let t0 = Instant::now();

    let count = Rc::new(RefCell::new(0u32));
    let count_clone = Rc::clone(&count);
    session.subscribe(move |event| {
        if matches!(event, SessionEvent::SnapshotChanged) {
            *count_clone.borrow_mut() += 1;
        }
    });

    session
        .on_selection_changed(Selection::new("flt-001", Category::FiltrationPackage, 1.0), t0)
        .unwrap();
    session.on_margin_pct_changed(25.0, t0);

    assert_eq!(*count.borrow(), 2);
    assert_eq!(session.snapshot().total_cost, 1850.0);
    // RRP view: 1850 / 0.75; line-margin view: 1850 + 450. Both stand.
    assert!((session.snapshot().recommended_retail_price - 2466.67).abs() < 0.01);
    assert_eq!(session.snapshot().total_margin, 450.0);
}
