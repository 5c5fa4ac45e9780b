//! Typed remote rows, one struct per resource kind.
//!
//! The table store speaks `serde_json::Value`; these structs are the
//! validated view of those rows. `from_row` is the boundary check: a
//! row that does not deserialize for its kind is rejected before any
//! field of it is used.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ModelError, ProjectStatus, ResourceKind};

/// Project root row (`pool_projects`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub margin_pct: f64,
    #[serde(default)]
    pub pool_model: Option<String>,
}

/// Filtration slice (`pool_filtration`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FiltrationRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub pump_count: Option<f64>,
}

/// Excavation slice (`pool_excavation`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExcavationRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub excavation_type: Option<String>,
    #[serde(default)]
    pub depth_meters: Option<f64>,
}

/// Crane slice (`pool_crane`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CraneRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub crane_id: Option<String>,
}

/// Paving slice (`pool_paving`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PavingRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub paving_category: Option<String>,
    #[serde(default)]
    pub coping_category: Option<String>,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub coping_meters: Option<f64>,
    /// Composite-rate quote for the area, written by the paving editor.
    #[serde(default)]
    pub quoted_price: Option<f64>,
}

/// Concrete slice (`pool_concrete`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConcreteRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub concrete_type: Option<String>,
    #[serde(default)]
    pub area_m2: Option<f64>,
    #[serde(default)]
    pub quoted_price: Option<f64>,
}

/// Water features slice (`pool_water_features`), LED blades included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaterFeaturesRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub feature_size: Option<String>,
    #[serde(default)]
    pub blade_count: Option<f64>,
}

/// Electrical slice (`pool_electrical`), heating included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElectricalRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub supply_runs: Option<f64>,
    #[serde(default)]
    pub heat_pump: Option<String>,
}

/// Add-ons slice (`pool_extras`), fencing included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtrasRecord {
    pub pool_project_id: String,
    #[serde(default)]
    pub fencing_meters: Option<f64>,
    #[serde(default)]
    pub extra_items: Option<Vec<String>>,
}

/// A validated remote row of any resource kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceRecord {
    Project(ProjectRecord),
    Filtration(FiltrationRecord),
    Excavation(ExcavationRecord),
    Crane(CraneRecord),
    Paving(PavingRecord),
    Concrete(ConcreteRecord),
    WaterFeatures(WaterFeaturesRecord),
    Electrical(ElectricalRecord),
    Extras(ExtrasRecord),
}

impl ResourceRecord {
    /// Validate an untyped store row for the given kind.
    pub fn from_row(kind: ResourceKind, row: Value) -> Result<Self, ModelError> {
        fn parse<T: serde::de::DeserializeOwned>(
            kind: ResourceKind,
            row: Value,
        ) -> Result<T, ModelError> {
            serde_json::from_value(row).map_err(|e| ModelError::InvalidRow {
                kind,
                reason: e.to_string(),
            })
        }

        Ok(match kind {
            ResourceKind::PoolShell => ResourceRecord::Project(parse(kind, row)?),
            ResourceKind::Filtration => ResourceRecord::Filtration(parse(kind, row)?),
            ResourceKind::Excavation => ResourceRecord::Excavation(parse(kind, row)?),
            ResourceKind::Crane => ResourceRecord::Crane(parse(kind, row)?),
            ResourceKind::Paving => ResourceRecord::Paving(parse(kind, row)?),
            ResourceKind::Concrete => ResourceRecord::Concrete(parse(kind, row)?),
            ResourceKind::WaterFeatures => ResourceRecord::WaterFeatures(parse(kind, row)?),
            ResourceKind::Electrical => ResourceRecord::Electrical(parse(kind, row)?),
            ResourceKind::Extras => ResourceRecord::Extras(parse(kind, row)?),
        })
    }

    /// The kind this record belongs to.
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRecord::Project(_) => ResourceKind::PoolShell,
            ResourceRecord::Filtration(_) => ResourceKind::Filtration,
            ResourceRecord::Excavation(_) => ResourceKind::Excavation,
            ResourceRecord::Crane(_) => ResourceKind::Crane,
            ResourceRecord::Paving(_) => ResourceKind::Paving,
            ResourceRecord::Concrete(_) => ResourceKind::Concrete,
            ResourceRecord::WaterFeatures(_) => ResourceKind::WaterFeatures,
            ResourceRecord::Electrical(_) => ResourceKind::Electrical,
            ResourceRecord::Extras(_) => ResourceKind::Extras,
        }
    }

    /// Serialize back into a wire row.
    pub fn to_row(&self) -> Result<Value, ModelError> {
        let value = match self {
            ResourceRecord::Project(r) => serde_json::to_value(r),
            ResourceRecord::Filtration(r) => serde_json::to_value(r),
            ResourceRecord::Excavation(r) => serde_json::to_value(r),
            ResourceRecord::Crane(r) => serde_json::to_value(r),
            ResourceRecord::Paving(r) => serde_json::to_value(r),
            ResourceRecord::Concrete(r) => serde_json::to_value(r),
            ResourceRecord::WaterFeatures(r) => serde_json::to_value(r),
            ResourceRecord::Electrical(r) => serde_json::to_value(r),
            ResourceRecord::Extras(r) => serde_json::to_value(r),
        };
        value.map_err(|e| ModelError::InvalidRow {
            kind: self.kind(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paving_row_round_trip() {
        let row = json!({
            "pool_project_id": "proj-42",
            "paving_category": "pav-001",
            "area_m2": 32.5
        });
        let record = ResourceRecord::from_row(ResourceKind::Paving, row).unwrap();
        assert_eq!(record.kind(), ResourceKind::Paving);
        let back = record.to_row().unwrap();
        assert_eq!(back["pool_project_id"], "proj-42");
        assert_eq!(back["area_m2"], 32.5);
    }

    #[test]
    fn missing_foreign_key_rejected() {
        let row = json!({ "area_m2": 32.5 });
        assert!(ResourceRecord::from_row(ResourceKind::Paving, row).is_err());
    }

    #[test]
    fn project_row_parses_status() {
        let row = json!({ "project_id": "proj-42", "status": "approved" });
        let record = ResourceRecord::from_row(ResourceKind::PoolShell, row).unwrap();
        let ResourceRecord::Project(project) = record else {
            panic!("expected project record");
        };
        assert_eq!(project.status, ProjectStatus::Approved);
    }
}
