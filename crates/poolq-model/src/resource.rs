//! Persisted resource kinds and their table metadata.
//!
//! Every editor surface writes its slice of a project to one remote
//! table. The table and foreign-key column names are fixed per kind at
//! compile time; nothing in the core branches on a table-name string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Static table metadata for one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Remote table name.
    pub table: &'static str,
    /// Column holding the owning project's id.
    pub fk_column: &'static str,
}

/// One independently persisted slice of a project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    PoolShell,
    Filtration,
    Excavation,
    Crane,
    Paving,
    Concrete,
    WaterFeatures,
    Electrical,
    Extras,
}

impl ResourceKind {
    /// All kinds, in editor order.
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::PoolShell,
        ResourceKind::Filtration,
        ResourceKind::Excavation,
        ResourceKind::Crane,
        ResourceKind::Paving,
        ResourceKind::Concrete,
        ResourceKind::WaterFeatures,
        ResourceKind::Electrical,
        ResourceKind::Extras,
    ];

    /// Canonical name as used in save-state reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::PoolShell => "poolShell",
            ResourceKind::Filtration => "filtration",
            ResourceKind::Excavation => "excavation",
            ResourceKind::Crane => "crane",
            ResourceKind::Paving => "paving",
            ResourceKind::Concrete => "concrete",
            ResourceKind::WaterFeatures => "waterFeatures",
            ResourceKind::Electrical => "electrical",
            ResourceKind::Extras => "extras",
        }
    }

    /// Remote table and foreign-key column for this kind.
    pub fn table(&self) -> TableSpec {
        match self {
            ResourceKind::PoolShell => TableSpec {
                table: "pool_projects",
                fk_column: "project_id",
            },
            ResourceKind::Filtration => TableSpec {
                table: "pool_filtration",
                fk_column: "pool_project_id",
            },
            ResourceKind::Excavation => TableSpec {
                table: "pool_excavation",
                fk_column: "pool_project_id",
            },
            ResourceKind::Crane => TableSpec {
                table: "pool_crane",
                fk_column: "pool_project_id",
            },
            ResourceKind::Paving => TableSpec {
                table: "pool_paving",
                fk_column: "pool_project_id",
            },
            ResourceKind::Concrete => TableSpec {
                table: "pool_concrete",
                fk_column: "pool_project_id",
            },
            ResourceKind::WaterFeatures => TableSpec {
                table: "pool_water_features",
                fk_column: "pool_project_id",
            },
            ResourceKind::Electrical => TableSpec {
                table: "pool_electrical",
                fk_column: "pool_project_id",
            },
            ResourceKind::Extras => TableSpec {
                table: "pool_extras",
                fk_column: "pool_project_id",
            },
        }
    }

    /// Whether writes for this kind must pass the lifecycle guard.
    ///
    /// All project slices are session-protected: a project that has been
    /// sent or approved must not be silently overwritten from any editor.
    pub fn is_session_protected(&self) -> bool {
        true
    }

    /// Payload fields that may arrive as catalog slugs instead of ids.
    ///
    /// The persistence layer remaps these to canonical ids before the
    /// write, best-effort.
    pub fn slug_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Paving => &["paving_category", "coping_category"],
            ResourceKind::Concrete => &["concrete_type"],
            ResourceKind::Filtration => &["package"],
            ResourceKind::Excavation => &["excavation_type"],
            _ => &[],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['_', '-', ' '], "");

        match normalized.as_str() {
            "POOLSHELL" => Ok(ResourceKind::PoolShell),
            "FILTRATION" => Ok(ResourceKind::Filtration),
            "EXCAVATION" => Ok(ResourceKind::Excavation),
            "CRANE" => Ok(ResourceKind::Crane),
            "PAVING" => Ok(ResourceKind::Paving),
            "CONCRETE" => Ok(ResourceKind::Concrete),
            "WATERFEATURES" => Ok(ResourceKind::WaterFeatures),
            "ELECTRICAL" => Ok(ResourceKind::Electrical),
            "EXTRAS" => Ok(ResourceKind::Extras),
            _ => Err(format!("Unknown resource kind: {s}")),
        }
    }
}
