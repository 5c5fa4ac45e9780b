pub mod component;
pub mod error;
pub mod records;
pub mod resource;
pub mod selection;
pub mod snapshot;
pub mod status;

pub use component::{Category, ComponentId, CostComponent, UnitKind};
pub use error::{ModelError, Result};
pub use records::{
    ConcreteRecord, CraneRecord, ElectricalRecord, ExcavationRecord, ExtrasRecord,
    FiltrationRecord, PavingRecord, ProjectRecord, ResourceRecord, WaterFeaturesRecord,
};
pub use resource::{ResourceKind, TableSpec};
pub use selection::Selection;
pub use snapshot::{CategorySubtotal, ProjectCostSnapshot, ResolvedLine, round2};
pub use status::ProjectStatus;
