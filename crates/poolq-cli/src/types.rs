//! Input and output shapes for the quoting commands.

use serde::{Deserialize, Serialize};

use poolq_model::{ProjectCostSnapshot, Selection};

/// A project file as exported by the editor surfaces: the chosen
/// selections plus the project-level margin percentage.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteFile {
    /// Persisted project id, absent for unsaved projects.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Project-level margin percentage driving the RRP.
    #[serde(default)]
    pub margin_pct: f64,

    #[serde(default)]
    pub selections: Vec<Selection>,
}

/// Aggregated quote, ready for table or JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub project_id: Option<String>,
    pub selection_count: usize,
    pub snapshot: ProjectCostSnapshot,
}
