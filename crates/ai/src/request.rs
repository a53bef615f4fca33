//! Structured request sent to the reasoning service.
//!
//! These are snapshots owned by this crate: callers map their domain types
//! into them, so the AI boundary never depends on warehouse internals.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttributes {
    pub id: String,
    pub name: String,
    pub category: String,
    pub weight_kg: f64,
    pub hazmat: bool,
    pub flammable: bool,
    /// `[min, max]` in °C; absent for ambient items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_requirement: Option<[f64; 2]>,
    pub turnover_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateZone {
    pub id: String,
    pub name: String,
    pub capabilities: Vec<String>,
    pub max_weight: f64,
    /// `[min, max]` in °C.
    pub temp_range: [f64; 2],
    pub dispatch_distance_m: u32,
    pub rack_type: String,
    pub equipment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryHint {
    pub kind: String,
    pub reason: String,
    pub preferred_zones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub item_attributes: ItemAttributes,
    /// Zones left after the mandatory-constraint intersection.
    pub candidate_zones: Vec<CandidateZone>,
    pub advisory_constraints: Vec<AdvisoryHint>,
}

impl RecommendationRequest {
    pub fn is_candidate(&self, zone_id: &str) -> bool {
        self.candidate_zones.iter().any(|z| z.id == zone_id)
    }
}
