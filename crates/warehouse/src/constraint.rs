//! Safety constraints: the deterministic rules that bound where an item may go.
//!
//! Rules run in a fixed order (hazmat → cold-chain → weight → fire-safety →
//! turnover) and the order is visible in reasoning text, so it must not change.
//! Mandatory constraints compose by intersection; advisory ones only inform
//! optimization and fallback.

use serde::{Deserialize, Serialize};

use putaway_core::ZoneId;

use crate::catalog::ZoneCatalog;
use crate::item::{Item, TurnoverClass};
use crate::zone::Capability;

/// Requirements whose upper bound lies below this temperature are cold-chain.
pub const DEFAULT_AMBIENT_THRESHOLD_C: f64 = 10.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintKind {
    Hazmat,
    ColdChain,
    Weight,
    FireSafety,
    Turnover,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintKind::Hazmat => "hazmat",
            ConstraintKind::ColdChain => "cold-chain",
            ConstraintKind::Weight => "weight",
            ConstraintKind::FireSafety => "fire-safety",
            ConstraintKind::Turnover => "turnover",
        }
    }
}

impl core::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A zone restriction produced for one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub mandatory: bool,
    /// Allowed (or, for advisory constraints, preferred) zones in registration order.
    pub allowed: Vec<ZoneId>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
}

impl Constraint {
    pub fn allows(&self, zone: &ZoneId) -> bool {
        self.allowed.contains(zone)
    }

    /// One-line rendering used in decision records, e.g.
    /// `hazmat (mandatory): hazardous material must be stored in a fire-safe zone [C]`.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} [{}]",
            self.kind,
            if self.mandatory { "mandatory" } else { "advisory" },
            self.reason,
            join_ids(&self.allowed)
        )
    }
}

/// Result of intersecting all mandatory constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feasibility {
    /// Zones allowed by every mandatory constraint, in registration order (non-empty).
    Feasible(Vec<ZoneId>),
    /// Mandatory constraints admit no common zone.
    Infeasible,
}

/// Ordered constraints for one item plus their mandatory intersection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    feasibility: Feasibility,
}

impl ConstraintSet {
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn into_constraints(self) -> Vec<Constraint> {
        self.constraints
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.mandatory)
    }

    pub fn advisory(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| !c.mandatory)
    }

    pub fn feasibility(&self) -> &Feasibility {
        &self.feasibility
    }

    /// Zones allowed by every mandatory constraint; `None` when infeasible.
    pub fn allowed_zones(&self) -> Option<&[ZoneId]> {
        match &self.feasibility {
            Feasibility::Feasible(zones) => Some(zones),
            Feasibility::Infeasible => None,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        self.feasibility == Feasibility::Infeasible
    }

    /// Number of advisory constraints that prefer `zone`.
    pub fn advisory_score(&self, zone: &ZoneId) -> usize {
        self.advisory().filter(|c| c.allows(zone)).count()
    }

    /// Reasons every mandatory constraint rejects `zone`.
    pub fn violations_for(&self, zone: &ZoneId) -> Vec<String> {
        self.mandatory()
            .filter(|c| !c.allows(zone))
            .map(|c| format!("{}: {}", c.kind, c.reason))
            .collect()
    }

    /// Explanation of why the mandatory constraints cannot be met together.
    ///
    /// Only constraints that actually narrow the catalog are cited.
    pub fn conflict_explanation(&self, catalog_size: usize) -> String {
        let narrowing: Vec<&Constraint> = self
            .mandatory()
            .filter(|c| c.allowed.len() < catalog_size)
            .collect();

        let kinds: Vec<&str> = narrowing.iter().map(|c| c.kind.as_str()).collect();
        let details: Vec<String> = narrowing
            .iter()
            .map(|c| {
                if c.allowed.is_empty() {
                    format!("{} allows no zone ({})", c.kind, c.reason)
                } else {
                    format!("{} allows only [{}] ({})", c.kind, join_ids(&c.allowed), c.reason)
                }
            })
            .collect();

        format!(
            "Infeasible placement: no zone satisfies the {} constraints together. {}.",
            kinds.join(" + "),
            details.join("; ")
        )
    }
}

fn join_ids(ids: &[ZoneId]) -> String {
    ids.iter().map(ZoneId::as_str).collect::<Vec<_>>().join(", ")
}

/// Computes the mandatory and advisory constraints for a resolved item.
///
/// Pure and total: the output depends only on the item and the catalog.
#[derive(Debug, Copy, Clone)]
pub struct SafetyConstraintEvaluator<'a> {
    catalog: &'a ZoneCatalog,
    ambient_threshold_c: f64,
}

impl<'a> SafetyConstraintEvaluator<'a> {
    pub fn new(catalog: &'a ZoneCatalog) -> Self {
        Self {
            catalog,
            ambient_threshold_c: DEFAULT_AMBIENT_THRESHOLD_C,
        }
    }

    pub fn with_ambient_threshold(mut self, ambient_threshold_c: f64) -> Self {
        self.ambient_threshold_c = ambient_threshold_c;
        self
    }

    pub fn evaluate(&self, item: &Item) -> ConstraintSet {
        let constraints: Vec<Constraint> = [
            self.hazmat(item),
            self.cold_chain(item),
            Some(self.weight(item)),
            self.fire_safety(item),
            self.turnover(item),
        ]
        .into_iter()
        .flatten()
        .collect();

        let allowed = self.catalog.ids_where(|zone| {
            constraints
                .iter()
                .filter(|c| c.mandatory)
                .all(|c| c.allows(&zone.id))
        });

        let feasibility = if allowed.is_empty() {
            Feasibility::Infeasible
        } else {
            Feasibility::Feasible(allowed)
        };

        ConstraintSet {
            constraints,
            feasibility,
        }
    }

    fn hazmat(&self, item: &Item) -> Option<Constraint> {
        if !item.is_hazmat() {
            return None;
        }
        Some(Constraint {
            kind: ConstraintKind::Hazmat,
            mandatory: true,
            allowed: self.catalog.ids_where(|z| z.has(Capability::FireSafe)),
            reason: "hazardous material must be stored in a fire-safe zone".to_string(),
            regulation: Some("OSHA 1910.106 / EPA 40 CFR".to_string()),
        })
    }

    fn cold_chain(&self, item: &Item) -> Option<Constraint> {
        let required = item.temperature()?;
        if required.max_c >= self.ambient_threshold_c {
            return None;
        }
        Some(Constraint {
            kind: ConstraintKind::ColdChain,
            mandatory: true,
            allowed: self.catalog.ids_where(|z| z.temperature.contains(required)),
            reason: format!("cold chain requires a zone holding {required}"),
            regulation: Some("FDA 21 CFR 110 / HACCP".to_string()),
        })
    }

    fn weight(&self, item: &Item) -> Constraint {
        let weight = item.weight_kg();
        Constraint {
            kind: ConstraintKind::Weight,
            mandatory: true,
            allowed: self.catalog.ids_where(|z| z.max_weight_kg >= weight),
            reason: format!("zone must carry {weight}kg"),
            regulation: Some("Rack capacity spec".to_string()),
        }
    }

    fn fire_safety(&self, item: &Item) -> Option<Constraint> {
        if !item.is_flammable() || item.is_hazmat() {
            return None;
        }
        Some(Constraint {
            kind: ConstraintKind::FireSafety,
            mandatory: false,
            allowed: self.catalog.ids_where(|z| z.has(Capability::FireSafe)),
            reason: "flammable item not classified hazmat; fire-safe storage preferred".to_string(),
            regulation: None,
        })
    }

    fn turnover(&self, item: &Item) -> Option<Constraint> {
        if item.turnover() != TurnoverClass::High {
            return None;
        }
        let weight = item.weight_kg();
        Some(Constraint {
            kind: ConstraintKind::Turnover,
            mandatory: false,
            allowed: self
                .catalog
                .ids_where(|z| z.has(Capability::FastPick) && z.max_weight_kg >= weight),
            reason: "high-velocity item; fast-pick placement near dispatch preferred".to_string(),
            regulation: None,
        })
    }
}
