//! In-memory component catalog.

use std::collections::HashMap;

use poolq_model::{Category, ComponentId, CostComponent};

/// Read-only reference data for pricing.
///
/// Owned by the process and shared read-only with every editing
/// session. The `generation` counter moves on every mutation so
/// derived caches (category rates) know when to recompute.
#[derive(Debug, Default)]
pub struct CostComponentCatalog {
    components: HashMap<ComponentId, CostComponent>,
    by_slug: HashMap<String, ComponentId>,
    generation: u64,
}

impl CostComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mutation generation. Derived caches key on this.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Look up a component by canonical id.
    pub fn get(&self, id: &ComponentId) -> Option<&CostComponent> {
        self.components.get(id)
    }

    /// Resolve a human-readable slug to a canonical id.
    ///
    /// Tries an exact match first, then case-insensitive.
    pub fn resolve_slug(&self, slug: &str) -> Option<&ComponentId> {
        if let Some(id) = self.by_slug.get(slug) {
            return Some(id);
        }
        let lowered = slug.to_lowercase();
        self.by_slug
            .iter()
            .find(|(key, _)| key.to_lowercase() == lowered)
            .map(|(_, id)| id)
    }

    /// Iterate the components of one category.
    pub fn components_in(&self, category: Category) -> impl Iterator<Item = &CostComponent> {
        self.components
            .values()
            .filter(move |c| c.category == category)
    }

    /// Insert or replace a component, bumping the generation.
    pub fn upsert(&mut self, component: CostComponent) {
        self.index(component);
        self.generation += 1;
    }

    /// Merge a loaded batch into the catalog.
    pub fn extend(&mut self, components: Vec<CostComponent>) {
        let count = components.len();
        for component in components {
            self.index(component);
        }
        if count > 0 {
            self.generation += 1;
        }
        tracing::debug!(count, generation = self.generation, "catalog batch merged");
    }

    /// Store a component and maintain the slug index. A re-slugged
    /// component retires its previous slug, unless another component
    /// has since claimed it.
    fn index(&mut self, component: CostComponent) {
        if let Some(existing) = self.components.get(&component.id) {
            if existing.slug != component.slug
                && self.by_slug.get(&existing.slug) == Some(&component.id)
            {
                let retired = existing.slug.clone();
                self.by_slug.remove(&retired);
            }
        }
        self.by_slug
            .insert(component.slug.clone(), component.id.clone());
        self.components.insert(component.id.clone(), component);
    }
}
