//! Cost component reference data.
//!
//! A `CostComponent` is one immutable row of the pricing catalog: a
//! selectable item (a paver, a filtration package, an LED blade) with a
//! per-unit cost and per-unit margin. Components are loaded once per
//! session and never mutated by the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a component's quantity is measured.
///
/// Determines what a quantity of `1.0` means: one item, one linear
/// meter, or one square meter. Fractional quantities are legal for the
/// length and area kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitKind {
    /// Priced per item (crane hire, filtration package, LED blade).
    PerItem,
    /// Priced per linear meter (coping, fencing).
    PerMeter,
    /// Priced per square meter (paving, concrete).
    PerSquareMeter,
}

impl UnitKind {
    /// Canonical name as stored in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::PerItem => "perItem",
            UnitKind::PerMeter => "perMeter",
            UnitKind::PerSquareMeter => "perSquareMeter",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = String;

    /// Parse a unit kind string.
    /// Handles the spellings found across catalog exports (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['_', '-', ' '], "");

        match normalized.as_str() {
            "PERITEM" | "ITEM" | "EACH" => Ok(UnitKind::PerItem),
            "PERMETER" | "METER" | "LM" => Ok(UnitKind::PerMeter),
            "PERSQUAREMETER" | "SQUAREMETER" | "M2" | "SQM" => Ok(UnitKind::PerSquareMeter),
            _ => Err(format!("Unknown unit kind: {s}")),
        }
    }
}

/// Selectable component category.
///
/// Each category belongs to exactly one editor surface and is persisted
/// through the [`ResourceKind`](crate::ResourceKind) returned by
/// [`Category::resource_kind`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    PoolShell,
    FiltrationPackage,
    Excavation,
    Crane,
    Paving,
    Concrete,
    WaterFeature,
    LedBlade,
    Electrical,
    Heating,
    Fencing,
    Extras,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 12] = [
        Category::PoolShell,
        Category::FiltrationPackage,
        Category::Excavation,
        Category::Crane,
        Category::Paving,
        Category::Concrete,
        Category::WaterFeature,
        Category::LedBlade,
        Category::Electrical,
        Category::Heating,
        Category::Fencing,
        Category::Extras,
    ];

    /// Canonical name as stored in catalog files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PoolShell => "poolShell",
            Category::FiltrationPackage => "filtrationPackage",
            Category::Excavation => "excavation",
            Category::Crane => "crane",
            Category::Paving => "paving",
            Category::Concrete => "concrete",
            Category::WaterFeature => "waterFeature",
            Category::LedBlade => "ledBlade",
            Category::Electrical => "electrical",
            Category::Heating => "heating",
            Category::Fencing => "fencing",
            Category::Extras => "extras",
        }
    }

    /// The resource kind whose remote table persists this category.
    pub fn resource_kind(&self) -> crate::ResourceKind {
        use crate::ResourceKind;
        match self {
            Category::PoolShell => ResourceKind::PoolShell,
            Category::FiltrationPackage => ResourceKind::Filtration,
            Category::Excavation => ResourceKind::Excavation,
            Category::Crane => ResourceKind::Crane,
            Category::Paving => ResourceKind::Paving,
            Category::Concrete => ResourceKind::Concrete,
            Category::WaterFeature | Category::LedBlade => ResourceKind::WaterFeatures,
            Category::Electrical | Category::Heating => ResourceKind::Electrical,
            Category::Fencing | Category::Extras => ResourceKind::Extras,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Parse a category string (case-insensitive, separator-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['_', '-', ' '], "");

        match normalized.as_str() {
            "POOLSHELL" => Ok(Category::PoolShell),
            "FILTRATIONPACKAGE" | "FILTRATION" => Ok(Category::FiltrationPackage),
            "EXCAVATION" => Ok(Category::Excavation),
            "CRANE" => Ok(Category::Crane),
            "PAVING" => Ok(Category::Paving),
            "CONCRETE" | "CONCRETING" => Ok(Category::Concrete),
            "WATERFEATURE" => Ok(Category::WaterFeature),
            "LEDBLADE" | "BLADE" => Ok(Category::LedBlade),
            "ELECTRICAL" => Ok(Category::Electrical),
            "HEATING" => Ok(Category::Heating),
            "FENCING" => Ok(Category::Fencing),
            "EXTRAS" | "ADDON" | "ADDONS" => Ok(Category::Extras),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}

/// Opaque catalog component identifier.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One immutable catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComponent {
    /// Canonical identifier, stable across sessions.
    pub id: ComponentId,

    /// Human-readable lookup key ("travertine-silver", "viron-p320").
    /// Remote rows sometimes carry slugs where ids are expected; the
    /// persistence layer remaps them before writing.
    pub slug: String,

    /// Category this component is selectable under.
    pub category: Category,

    /// Cost per unit, in currency units.
    pub base_cost: f64,

    /// Margin per unit, in currency units (absolute, not a percentage).
    pub margin: f64,

    /// How quantity is measured for this component.
    pub unit_kind: UnitKind,
}
