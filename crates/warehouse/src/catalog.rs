//! Read-only registry of configured zones and their acceptance checks.

use std::collections::HashMap;

use putaway_core::{DomainError, DomainResult, ZoneId};

use crate::item::Item;
use crate::zone::{Capability, Zone, ZoneTable};

/// Outcome of checking one zone against one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneValidation {
    pub accepted: bool,
    pub violations: Vec<String>,
}

impl ZoneValidation {
    fn from_violations(violations: Vec<String>) -> Self {
        Self {
            accepted: violations.is_empty(),
            violations,
        }
    }
}

/// Zone registry built once from an explicit [`ZoneTable`].
///
/// Registration order is preserved; every "first zone" or tie-break in the
/// engine refers to it.
#[derive(Debug, Clone)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
    index: HashMap<ZoneId, usize>,
}

impl ZoneCatalog {
    /// Validate the table and build the catalog.
    pub fn new(table: ZoneTable) -> DomainResult<Self> {
        if table.zones.is_empty() {
            return Err(DomainError::invariant("zone table cannot be empty"));
        }

        let mut index = HashMap::with_capacity(table.zones.len());
        for (position, zone) in table.zones.iter().enumerate() {
            if zone.name.trim().is_empty() {
                return Err(DomainError::invariant(format!("zone {} has no name", zone.id)));
            }
            if !(zone.max_weight_kg.is_finite() && zone.max_weight_kg > 0.0) {
                return Err(DomainError::invariant(format!(
                    "zone {} max weight must be a positive number",
                    zone.id
                )));
            }
            zone.temperature
                .ensure_well_formed()
                .map_err(|e| DomainError::invariant(format!("zone {}: {e}", zone.id)))?;
            if index.insert(zone.id.clone(), position).is_some() {
                return Err(DomainError::invariant(format!("duplicate zone id {}", zone.id)));
            }
        }

        Ok(Self {
            zones: table.zones,
            index,
        })
    }

    /// All zones in registration order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get(&self, id: &ZoneId) -> Option<&Zone> {
        self.index.get(id).map(|&i| &self.zones[i])
    }

    pub fn contains(&self, id: &ZoneId) -> bool {
        self.index.contains_key(id)
    }

    /// Registration position of a zone.
    pub fn position(&self, id: &ZoneId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Ids of zones matching `predicate`, in registration order.
    pub fn ids_where(&self, predicate: impl Fn(&Zone) -> bool) -> Vec<ZoneId> {
        self.zones
            .iter()
            .filter(|z| predicate(z))
            .map(|z| z.id.clone())
            .collect()
    }

    /// Every zone whose weight/temperature/capability envelope accepts the item.
    pub fn zones_satisfying(&self, item: &Item) -> Vec<&Zone> {
        self.zones
            .iter()
            .filter(|z| envelope_violations(z, item).is_empty())
            .collect()
    }

    /// Check a single zone against the item's envelope.
    pub fn validate(&self, zone_id: &ZoneId, item: &Item) -> ZoneValidation {
        match self.get(zone_id) {
            Some(zone) => ZoneValidation::from_violations(envelope_violations(zone, item)),
            None => ZoneValidation::from_violations(vec![format!("unknown zone {zone_id}")]),
        }
    }
}

fn envelope_violations(zone: &Zone, item: &Item) -> Vec<String> {
    let mut violations = Vec::new();

    if item.weight_kg() > zone.max_weight_kg {
        violations.push(format!(
            "exceeds {}kg limit (item: {}kg)",
            zone.max_weight_kg,
            item.weight_kg()
        ));
    }

    if let Some(required) = item.temperature() {
        if !zone.temperature.contains(required) {
            violations.push(format!(
                "temperature range {} does not cover required {}",
                zone.temperature, required
            ));
        }
    }

    if item.is_hazmat() && !zone.has(Capability::FireSafe) {
        violations.push("not certified for hazardous materials".to_string());
    }

    violations
}
