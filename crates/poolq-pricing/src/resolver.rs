//! Line-level rate resolution.

use poolq_catalog::CostComponentCatalog;
use poolq_model::{ComponentId, ResolvedLine};

/// Resolve one selection into an absolute cost/margin line.
///
/// Cost and margin are additive: `margin` here is a currency amount per
/// unit, never a percentage of cost. Percentage-based margin only
/// applies at the whole-project RRP step.
///
/// A stale or unknown id resolves to the zero line rather than failing,
/// so one bad reference never blocks the rest of the breakdown.
/// Negative or non-finite quantities are treated as zero.
pub fn resolve(
    catalog: &CostComponentCatalog,
    component_id: &ComponentId,
    quantity: f64,
) -> ResolvedLine {
    let quantity = if quantity.is_finite() {
        quantity.max(0.0)
    } else {
        0.0
    };

    match catalog.get(component_id) {
        Some(component) => ResolvedLine::new(
            component.base_cost * quantity,
            component.margin * quantity,
        ),
        None => {
            tracing::debug!(component_id = %component_id, "stale catalog reference, pricing as zero");
            ResolvedLine::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolq_model::{Category, CostComponent, UnitKind};

    fn catalog_with(base_cost: f64, margin: f64, unit_kind: UnitKind) -> CostComponentCatalog {
        let mut catalog = CostComponentCatalog::new();
        catalog.upsert(CostComponent {
            id: ComponentId::new("cop-001"),
            slug: "travertine-coping".to_string(),
            category: Category::Paving,
            base_cost,
            margin,
            unit_kind,
        });
        catalog
    }

    #[test]
    fn per_meter_example() {
        // {baseCost: 40, margin: 12, perMeter} x 25 => {1000, 300, 1300}
        let catalog = catalog_with(40.0, 12.0, UnitKind::PerMeter);
        let line = resolve(&catalog, &ComponentId::new("cop-001"), 25.0);
        assert_eq!(line.cost, 1000.0);
        assert_eq!(line.margin, 300.0);
        assert_eq!(line.price, 1300.0);
    }

    #[test]
    fn negative_quantity_clamped_to_zero() {
        let catalog = catalog_with(40.0, 12.0, UnitKind::PerMeter);
        let line = resolve(&catalog, &ComponentId::new("cop-001"), -3.0);
        assert_eq!(line, ResolvedLine::ZERO);
    }

    #[test]
    fn nan_quantity_treated_as_zero() {
        let catalog = catalog_with(40.0, 12.0, UnitKind::PerMeter);
        let line = resolve(&catalog, &ComponentId::new("cop-001"), f64::NAN);
        assert_eq!(line, ResolvedLine::ZERO);
    }

    #[test]
    fn unknown_id_resolves_to_zero() {
        let catalog = catalog_with(40.0, 12.0, UnitKind::PerMeter);
        let line = resolve(&catalog, &ComponentId::new("deleted-component"), 10.0);
        assert_eq!(line, ResolvedLine::ZERO);
    }

    #[test]
    fn fractional_quantity_for_area_units() {
        let catalog = catalog_with(80.0, 16.0, UnitKind::PerSquareMeter);
        let line = resolve(&catalog, &ComponentId::new("cop-001"), 2.5);
        assert_eq!(line.cost, 200.0);
        assert_eq!(line.margin, 40.0);
    }
}
