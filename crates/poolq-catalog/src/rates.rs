//! Composite category rates.
//!
//! Area-priced categories (paving, concrete) quote a composite per-unit
//! rate: material plus wastage plus margin. The composite is cached per
//! category and recomputed whenever the underlying catalog moves.

use std::collections::HashMap;

use poolq_model::{ComponentId, round2};

use crate::CostComponentCatalog;

/// Wastage allowance applied to area-priced materials.
const WASTAGE_FRACTION: f64 = 0.10;

/// Composite per-unit rate for one category component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryRate {
    /// Material cost per unit.
    pub paver_cost: f64,
    /// Wastage allowance per unit.
    pub wastage_cost: f64,
    /// Margin per unit.
    pub margin_cost: f64,
}

impl CategoryRate {
    /// The composite rate: material + wastage + margin.
    pub fn per_unit(&self) -> f64 {
        self.paver_cost + self.wastage_cost + self.margin_cost
    }

    /// Price an area at this rate, rounded at the boundary.
    pub fn price_area(&self, area: f64) -> f64 {
        round2(self.per_unit() * area.max(0.0))
    }
}

/// Per-component cache of composite rates, keyed by catalog generation.
///
/// A cached entry is valid only for the generation it was computed at;
/// any catalog mutation invalidates the whole cache on the next lookup.
#[derive(Debug, Default)]
pub struct RateCache {
    generation: u64,
    rates: HashMap<ComponentId, CategoryRate>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite rate for a component, computing and caching on miss.
    ///
    /// Returns `None` for unknown ids (stale references price as zero
    /// upstream, they are not cached).
    pub fn rate(
        &mut self,
        catalog: &CostComponentCatalog,
        component_id: &ComponentId,
    ) -> Option<CategoryRate> {
        if self.generation != catalog.generation() {
            self.rates.clear();
            self.generation = catalog.generation();
        }
        if let Some(rate) = self.rates.get(component_id) {
            return Some(*rate);
        }
        let component = catalog.get(component_id)?;
        let rate = CategoryRate {
            paver_cost: component.base_cost,
            wastage_cost: component.base_cost * WASTAGE_FRACTION,
            margin_cost: component.margin,
        };
        self.rates.insert(component_id.clone(), rate);
        Some(rate)
    }

    /// Number of cached entries (for tests and diagnostics).
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Convenience: price an area for a category component in one call.
pub fn priced_area(
    cache: &mut RateCache,
    catalog: &CostComponentCatalog,
    component_id: &ComponentId,
    area: f64,
) -> f64 {
    cache
        .rate(catalog, component_id)
        .map_or(0.0, |rate| rate.price_area(area))
}
