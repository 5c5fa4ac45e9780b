//! Project-level aggregation.

use std::collections::BTreeMap;

use poolq_catalog::CostComponentCatalog;
use poolq_model::{CategorySubtotal, ProjectCostSnapshot, Selection};

use crate::resolver::resolve;

/// Recommended retail price from total cost and a target margin
/// percentage: `total_cost / (1 - pct/100)`.
///
/// Guarded at `pct >= 100` (division by zero or negative denominator)
/// and for non-finite input; both resolve to 0 rather than erroring.
/// This is the single margin formula used project-wide for the overall
/// RRP. It is distinct from, and never reconciled against, the sum of
/// line-level margins; the two are complementary views and may
/// legitimately disagree.
pub fn recommended_retail_price(total_cost: f64, margin_pct: f64) -> f64 {
    if !margin_pct.is_finite() || margin_pct >= 100.0 {
        return 0.0;
    }
    let pct = margin_pct.max(0.0);
    total_cost / (1.0 - pct / 100.0)
}

/// Combine all selections into a priced breakdown.
///
/// Groups resolved lines by category, sums per-category subtotals in
/// full precision, and rounds currency outputs once at snapshot
/// construction. Selections with `quantity <= 0` contribute nothing.
/// Synchronous and infallible: every lookup and division edge case
/// resolves to a defined zero value.
pub fn aggregate(
    catalog: &CostComponentCatalog,
    selections: &[Selection],
    margin_pct: f64,
) -> ProjectCostSnapshot {
    let mut by_category: BTreeMap<_, CategorySubtotal> = BTreeMap::new();

    for selection in selections {
        let line = resolve(catalog, &selection.component_id, selection.quantity);
        by_category
            .entry(selection.category)
            .or_default()
            .accumulate(line);
    }

    let total_cost: f64 = by_category.values().map(|s| s.cost).sum();
    let rrp = recommended_retail_price(total_cost, margin_pct);

    ProjectCostSnapshot::from_accumulated(by_category, margin_pct, rrp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolq_model::{Category, ComponentId, CostComponent, UnitKind};
    use proptest::prelude::*;

    fn demo_catalog() -> CostComponentCatalog {
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
                "cop-001",
                "travertine-coping",
                Category::Paving,
                40.0,
                12.0,
                UnitKind::PerMeter,
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
        catalog
    }

    #[test]
    fn groups_by_category_and_sums() {
        let catalog = demo_catalog();
        let selections = vec![
            Selection::new("pav-001", Category::Paving, 10.0),
            Selection::new("cop-001", Category::Paving, 25.0),
            Selection::new("crn-001", Category::Crane, 1.0),
        ];

        let snapshot = aggregate(&catalog, &selections, 20.0);

        let paving = snapshot.by_category[&Category::Paving];
        assert_eq!(paving.cost, 1850.0); // 850 + 1000
        assert_eq!(paving.margin, 500.0); // 200 + 300
        assert_eq!(paving.price, 2350.0);

        let crane = snapshot.by_category[&Category::Crane];
        assert_eq!(crane.cost, 700.0);

        assert_eq!(snapshot.total_cost, 2550.0);
        assert_eq!(snapshot.total_margin, 640.0);
    }

    #[test]
    fn rrp_worked_example() {
        // totalCost = 1000, marginPct = 20 => 1000 / 0.8 = 1250
        assert_eq!(recommended_retail_price(1000.0, 20.0), 1250.0);
    }

    #[test]
    fn rrp_guard_at_and_above_100() {
        assert_eq!(recommended_retail_price(1000.0, 100.0), 0.0);
        assert_eq!(recommended_retail_price(1000.0, 250.0), 0.0);
        assert_eq!(recommended_retail_price(1000.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn rrp_negative_pct_clamped() {
        assert_eq!(recommended_retail_price(1000.0, -10.0), 1000.0);
    }

    #[test]
    fn zero_and_negative_quantities_contribute_nothing() {
        let catalog = demo_catalog();
        let selections = vec![
            Selection::new("crn-001", Category::Crane, -3.0),
            Selection::new("flt-001", Category::FiltrationPackage, 0.0),
        ];
        let snapshot = aggregate(&catalog, &selections, 20.0);
        assert_eq!(snapshot.by_category[&Category::Crane].cost, 0.0);
        assert_eq!(snapshot.total_cost, 0.0);
        assert_eq!(snapshot.recommended_retail_price, 0.0);
    }

    #[test]
    fn stale_reference_does_not_block_breakdown() {
        let catalog = demo_catalog();
        let selections = vec![
            Selection::new("deleted-id", Category::Paving, 10.0),
            Selection::new("crn-001", Category::Crane, 1.0),
        ];
        let snapshot = aggregate(&catalog, &selections, 0.0);
        assert_eq!(snapshot.by_category[&Category::Paving].cost, 0.0);
        assert_eq!(snapshot.by_category[&Category::Crane].cost, 700.0);
        assert_eq!(snapshot.total_cost, 700.0);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let catalog = demo_catalog();
        let selections = vec![
            Selection::new("pav-001", Category::Paving, 32.5),
            Selection::new("flt-001", Category::FiltrationPackage, 1.0),
        ];
        let first = aggregate(&catalog, &selections, 22.5);
        let second = aggregate(&catalog, &selections, 22.5);
        assert_eq!(first, second);
    }

    #[test]
    fn rounding_happens_once_at_the_boundary() {
        let mut catalog = CostComponentCatalog::new();
        catalog.upsert(CostComponent {
            id: ComponentId::new("tile-001"),
            slug: "mosaic".to_string(),
            category: Category::Extras,
            base_cost: 0.333,
            margin: 0.111,
            unit_kind: UnitKind::PerItem,
        });
        // 30 lines of 0.333 accumulate to 9.99 exactly; rounding each
        // line first (0.33) would yield 9.90.
        let selections: Vec<Selection> = (0..30)
            .map(|_| Selection::new("tile-001", Category::Extras, 1.0))
            .collect();
        let snapshot = aggregate(&catalog, &selections, 0.0);
        assert_eq!(snapshot.total_cost, 9.99);
    }

    proptest! {
        #[test]
        fn totals_equal_category_sums(
            quantities in proptest::collection::vec(0.0f64..500.0, 1..20),
            margin_pct in 0.0f64..99.0,
        ) {
            let catalog = demo_catalog();
            let ids = ["pav-001", "cop-001", "crn-001", "flt-001"];
            let categories = [
                Category::Paving,
                Category::Paving,
                Category::Crane,
                Category::FiltrationPackage,
            ];
            let selections: Vec<Selection> = quantities
                .iter()
                .enumerate()
                .map(|(i, &q)| Selection::new(ids[i % 4], categories[i % 4], q))
                .collect();

            let snapshot = aggregate(&catalog, &selections, margin_pct);

            let cost_sum: f64 = snapshot.by_category.values().map(|s| s.cost).sum();
            let margin_sum: f64 = snapshot.by_category.values().map(|s| s.margin).sum();
            prop_assert!((snapshot.total_cost - cost_sum).abs() <= 0.01);
            prop_assert!((snapshot.total_margin - margin_sum).abs() <= 0.01);

            // total_cost is rounded at the boundary; the division
            // amplifies that rounding by up to 1/(1 - pct/100).
            let expected_rrp = snapshot.total_cost / (1.0 - margin_pct / 100.0);
            let tolerance = 0.02 / (1.0 - margin_pct / 100.0);
            prop_assert!((snapshot.recommended_retail_price - expected_rrp).abs() <= tolerance);
        }
    }
}
