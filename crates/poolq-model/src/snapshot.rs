//! The computed cost/margin breakdown for a project.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Category;

/// Round a currency amount to 2 decimal places.
///
/// Applied once at snapshot construction; accumulation happens in full
/// precision so rounding error never compounds across line items.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One resolved line: absolute cost, absolute margin, and their sum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub cost: f64,
    pub margin: f64,
    pub price: f64,
}

impl ResolvedLine {
    /// The zero line, used for stale catalog references.
    pub const ZERO: ResolvedLine = ResolvedLine {
        cost: 0.0,
        margin: 0.0,
        price: 0.0,
    };

    pub fn new(cost: f64, margin: f64) -> Self {
        Self {
            cost,
            margin,
            price: cost + margin,
        }
    }
}

/// Per-category subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategorySubtotal {
    pub cost: f64,
    pub margin: f64,
    pub price: f64,
}

impl CategorySubtotal {
    pub fn accumulate(&mut self, line: ResolvedLine) {
        self.cost += line.cost;
        self.margin += line.margin;
        self.price += line.price;
    }

    fn rounded(self) -> Self {
        Self {
            cost: round2(self.cost),
            margin: round2(self.margin),
            price: round2(self.price),
        }
    }
}

/// Point-in-time cost/margin breakdown for a project.
///
/// This is the only entity the UI layer reads. `margin_pct` is the
/// stored project-level percentage, not derived from the line margins;
/// `recommended_retail_price` uses it and may legitimately disagree
/// with `total_cost + total_margin`. The two are complementary views
/// (cost-plus-margin breakdown vs. target-margin pricing).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCostSnapshot {
    /// Subtotals per category, sorted for deterministic output.
    pub by_category: BTreeMap<Category, CategorySubtotal>,

    /// Sum of all category costs.
    pub total_cost: f64,

    /// Sum of all category margins.
    pub total_margin: f64,

    /// Stored project-level margin percentage.
    pub margin_pct: f64,

    /// `total_cost / (1 - margin_pct/100)`, or 0 when `margin_pct >= 100`.
    pub recommended_retail_price: f64,
}

impl ProjectCostSnapshot {
    /// Build a snapshot from full-precision accumulators, rounding each
    /// currency output once.
    pub fn from_accumulated(
        by_category: BTreeMap<Category, CategorySubtotal>,
        margin_pct: f64,
        recommended_retail_price: f64,
    ) -> Self {
        let total_cost: f64 = by_category.values().map(|s| s.cost).sum();
        let total_margin: f64 = by_category.values().map(|s| s.margin).sum();
        Self {
            by_category: by_category
                .into_iter()
                .map(|(category, subtotal)| (category, subtotal.rounded()))
                .collect(),
            total_cost: round2(total_cost),
            total_margin: round2(total_margin),
            margin_pct,
            recommended_retail_price: round2(recommended_retail_price),
        }
    }

    /// Sum of all category prices (cost + margin view of the total).
    pub fn total_price(&self) -> f64 {
        round2(self.by_category.values().map(|s| s.price).sum())
    }
}
