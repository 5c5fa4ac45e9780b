//! Project lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a quoted project.
///
/// `Locked` means "editable but flagged" and does NOT protect the
/// project from writes; only `Sent` and `Approved` do.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStatus {
    /// Freely editable.
    #[default]
    Draft,
    /// Flagged by an estimator; still editable.
    Locked,
    /// Quote sent to the customer; edits require confirmation.
    Sent,
    /// Quote approved; edits require confirmation.
    Approved,
}

impl ProjectStatus {
    /// Canonical name as stored in the remote project row.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Locked => "locked",
            ProjectStatus::Sent => "sent",
            ProjectStatus::Approved => "approved",
        }
    }

    /// True when writes must be explicitly confirmed by the user.
    pub fn is_write_protected(&self) -> bool {
        matches!(self, ProjectStatus::Sent | ProjectStatus::Approved)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Ok(ProjectStatus::Draft),
            "LOCKED" => Ok(ProjectStatus::Locked),
            "SENT" => Ok(ProjectStatus::Sent),
            "APPROVED" => Ok(ProjectStatus::Approved),
            _ => Err(format!("Unknown project status: {s}")),
        }
    }
}
