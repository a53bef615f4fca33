use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use putaway_core::ZoneId;

use crate::item::TemperatureRange;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneType {
    Ambient,
    Refrigerated,
    #[serde(alias = "fire_safe")]
    FireSafe,
    Reinforced,
}

/// Certified handling capability of a zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    FireSafe,
    ColdChainCertified,
    Reinforced,
    FastPick,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::FireSafe => "fire-safe",
            Capability::ColdChainCertified => "cold-chain-certified",
            Capability::Reinforced => "reinforced",
            Capability::FastPick => "fast-pick",
        }
    }
}

/// What kind of goods a zone is laid out for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Specialization {
    General,
    ColdChain,
    Hazmat,
    FastPick,
    Heavy,
}

/// Storage zone definition (configuration data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub zone_type: ZoneType,
    pub max_weight_kg: f64,
    pub temperature: TemperatureRange,
    pub specialization: Specialization,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
    /// Distance to the dispatch area in meters.
    #[serde(default)]
    pub dispatch_distance_m: u32,
    #[serde(default)]
    pub rack_type: String,
    #[serde(default)]
    pub equipment: String,
}

impl Zone {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Display label, e.g. `Hazmat Area (C)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

/// Immutable zone configuration handed to [`crate::ZoneCatalog::new`].
///
/// Zone order is registration order and is significant for tie-breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    pub zones: Vec<Zone>,
}

impl ZoneTable {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// The reference five-zone warehouse layout.
    pub fn standard() -> Self {
        #[allow(clippy::too_many_arguments)]
        fn zone(
            id: &'static str,
            name: &str,
            zone_type: ZoneType,
            max_weight_kg: f64,
            (min_c, max_c): (f64, f64),
            specialization: Specialization,
            capabilities: &[Capability],
            dispatch_distance_m: u32,
            rack_type: &str,
            equipment: &str,
        ) -> Zone {
            Zone {
                id: ZoneId::from_static(id),
                name: name.to_string(),
                zone_type,
                max_weight_kg,
                temperature: TemperatureRange { min_c, max_c },
                specialization,
                capabilities: capabilities.iter().copied().collect(),
                dispatch_distance_m,
                rack_type: rack_type.to_string(),
                equipment: equipment.to_string(),
            }
        }

        Self::new(vec![
            zone(
                "A",
                "General Storage",
                ZoneType::Ambient,
                500.0,
                (15.0, 25.0),
                Specialization::General,
                &[],
                50,
                "Selective Pallet Rack",
                "Forklift, Pallet Jack",
            ),
            zone(
                "B",
                "Cold Storage",
                ZoneType::Refrigerated,
                300.0,
                (-25.0, 4.0),
                Specialization::ColdChain,
                &[Capability::ColdChainCertified],
                80,
                "Drive-In Rack",
                "Cold-rated Forklift",
            ),
            zone(
                "C",
                "Hazmat Area",
                ZoneType::FireSafe,
                400.0,
                (15.0, 20.0),
                Specialization::Hazmat,
                &[Capability::FireSafe],
                120,
                "Containment Pallet Rack",
                "Explosion-proof Forklift",
            ),
            zone(
                "D",
                "Fast-Pick Zone",
                ZoneType::Ambient,
                50.0,
                (18.0, 22.0),
                Specialization::FastPick,
                &[Capability::FastPick],
                15,
                "Carton Flow Rack",
                "Pick Cart, Conveyor",
            ),
            zone(
                "E",
                "Bulk & Heavy",
                ZoneType::Reinforced,
                2500.0,
                (10.0, 30.0),
                Specialization::Heavy,
                &[Capability::Reinforced],
                90,
                "Heavy-Duty Cantilever",
                "Heavy Forklift, Crane",
            ),
        ])
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::standard()
    }
}
