use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use putaway_infra::{AuditEntry, AuditRecord, RecordedDecision};
use putaway_infra::audit::OverrideRecord;
use putaway_warehouse::{
    Capability, ConflictWarning, Constraint, Decision, DecisionSource, ProductPreset, Zone, ZoneRejection,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub zone_id: String,
    pub operator: String,
    #[serde(default)]
    pub reason: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDto {
    pub decision_id: String,
    pub item_id: String,
    pub zone_id: Option<String>,
    pub confidence: f64,
    pub reasoning_text: String,
    pub constraints_applied: Vec<String>,
    pub source: DecisionSource,
    pub timestamp: DateTime<Utc>,
    pub constraints: Vec<Constraint>,
    pub warnings: Vec<ConflictWarning>,
    pub rejected_zones: Vec<ZoneRejection>,
}

impl From<&Decision> for DecisionDto {
    fn from(d: &Decision) -> Self {
        Self {
            decision_id: d.id.to_string(),
            item_id: d.item_id.to_string(),
            zone_id: d.zone.as_ref().map(|z| z.to_string()),
            confidence: d.confidence,
            reasoning_text: d.reasoning.clone(),
            constraints_applied: d.constraints_applied(),
            source: d.source,
            timestamp: d.decided_at,
            constraints: d.constraints.clone(),
            warnings: d.warnings.clone(),
            rejected_zones: d.rejected.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedDecisionDto {
    pub entry_id: String,
    pub decision: DecisionDto,
}

impl From<&RecordedDecision> for RecordedDecisionDto {
    fn from(r: &RecordedDecision) -> Self {
        Self {
            entry_id: r.entry_id.to_string(),
            decision: DecisionDto::from(&r.decision),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryDto {
    pub entry_id: String,
    pub sequence_number: u64,
    pub recorded_at: DateTime<Utc>,
    pub decision_id: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<DecisionDto>,
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_record: Option<OverrideRecord>,
}

impl From<&AuditEntry> for AuditEntryDto {
    fn from(e: &AuditEntry) -> Self {
        let (kind, decision, override_record) = match &e.record {
            AuditRecord::Decision(d) => ("decision", Some(DecisionDto::from(d)), None),
            AuditRecord::Override(o) => ("override", None, Some(o.clone())),
        };
        Self {
            entry_id: e.entry_id.to_string(),
            sequence_number: e.sequence_number,
            recorded_at: e.recorded_at,
            decision_id: e.decision_id.to_string(),
            kind,
            decision,
            override_record,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDto {
    pub id: String,
    pub name: String,
    pub zone_type: putaway_warehouse::ZoneType,
    pub max_weight_kg: f64,
    pub temp_range: [f64; 2],
    pub specialization: putaway_warehouse::Specialization,
    pub capabilities: Vec<Capability>,
    pub dispatch_distance_m: u32,
    pub rack_type: String,
    pub equipment: String,
}

impl From<&Zone> for ZoneDto {
    fn from(z: &Zone) -> Self {
        Self {
            id: z.id.to_string(),
            name: z.name.clone(),
            zone_type: z.zone_type,
            max_weight_kg: z.max_weight_kg,
            temp_range: [z.temperature.min_c, z.temperature.max_c],
            specialization: z.specialization,
            capabilities: z.capabilities.iter().copied().collect(),
            dispatch_distance_m: z.dispatch_distance_m,
            rack_type: z.rack_type.clone(),
            equipment: z.equipment.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDto {
    pub name: &'static str,
    pub category: putaway_warehouse::Category,
    pub weight_kg: f64,
    pub hazmat: bool,
    pub flammable: bool,
    pub temperature_requirement: putaway_warehouse::TemperatureLabel,
    pub turnover_class: putaway_warehouse::TurnoverClass,
}

impl From<&ProductPreset> for PresetDto {
    fn from(p: &ProductPreset) -> Self {
        Self {
            name: p.name,
            category: p.category,
            weight_kg: p.weight_kg,
            hazmat: p.hazmat,
            flammable: p.flammable,
            temperature_requirement: p.temperature,
            turnover_class: p.turnover,
        }
    }
}
