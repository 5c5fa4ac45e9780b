//! User selections: one chosen component with a quantity.

use serde::{Deserialize, Serialize};

use crate::{Category, ComponentId, ModelError};

/// A user's choice of one catalog component with a quantity.
///
/// Quantity may be fractional for area and length units. A quantity of
/// zero or less is legal input (toggle-style deselect) but the line
/// contributes nothing to any subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Catalog component being selected.
    pub component_id: ComponentId,

    /// Category the component belongs to. Carried on the selection so
    /// that a stale catalog reference still lands in the right subtotal
    /// bucket (as a zero line).
    pub category: Category,

    /// Units selected; clamped to >= 0 at pricing time.
    pub quantity: f64,
}

impl Selection {
    pub fn new(component_id: impl Into<ComponentId>, category: Category, quantity: f64) -> Self {
        Self {
            component_id: component_id.into(),
            category,
            quantity,
        }
    }

    /// Check the fields required before this selection may be persisted.
    ///
    /// Pricing tolerates anything (bad lines resolve to zero); persistence
    /// refuses to schedule a write for an unusable selection.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.component_id.as_str().trim().is_empty() {
            return Err(ModelError::InvalidSelection {
                reason: "component id is empty".to_string(),
            });
        }
        if !self.quantity.is_finite() {
            return Err(ModelError::InvalidSelection {
                reason: format!("quantity is not finite: {}", self.quantity),
            });
        }
        Ok(())
    }

    /// True when this selection still contributes to the breakdown.
    pub fn is_active(&self) -> bool {
        self.quantity > 0.0
    }
}
