use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use putaway_core::{DecisionId, ItemId, ZoneId};

use crate::category::ConflictWarning;
use crate::constraint::Constraint;

/// Provenance of a decision's zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// Mandatory constraints left exactly one zone.
    Rule,
    /// The reasoning service chose a validated candidate.
    Ai,
    /// Deterministic fallback (service failure, invalid answer, or infeasible placement).
    Fallback,
}

impl core::fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            DecisionSource::Rule => "rule",
            DecisionSource::Ai => "ai",
            DecisionSource::Fallback => "fallback",
        })
    }
}

/// A zone that was ruled out, with every reason it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRejection {
    pub zone: ZoneId,
    pub reasons: Vec<String>,
}

/// Finalized put-away decision. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub item_id: ItemId,
    /// `None` only for infeasible placements.
    pub zone: Option<ZoneId>,
    pub confidence: f64,
    pub reasoning: String,
    pub constraints: Vec<Constraint>,
    pub source: DecisionSource,
    #[serde(default)]
    pub warnings: Vec<ConflictWarning>,
    #[serde(default)]
    pub rejected: Vec<ZoneRejection>,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    pub fn is_infeasible(&self) -> bool {
        self.zone.is_none()
    }

    /// Constraint summaries in evaluation order.
    pub fn constraints_applied(&self) -> Vec<String> {
        self.constraints.iter().map(Constraint::summary).collect()
    }

    /// Mandatory constraints this decision carried that `zone` would break.
    pub fn violations_for(&self, zone: &ZoneId) -> Vec<String> {
        self.constraints
            .iter()
            .filter(|c| c.mandatory && !c.allows(zone))
            .map(|c| format!("{}: {}", c.kind, c.reason))
            .collect()
    }
}
