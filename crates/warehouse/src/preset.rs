//! Predefined products offered to operators for quick selection.

use serde::Serialize;

use crate::category::Category;
use crate::item::{ItemSubmission, TemperatureLabel, TemperatureRequirement, TurnoverClass};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPreset {
    pub name: &'static str,
    pub category: Category,
    pub weight_kg: f64,
    pub hazmat: bool,
    pub flammable: bool,
    pub temperature: TemperatureLabel,
    pub turnover: TurnoverClass,
}

impl ProductPreset {
    /// Submission with every attribute explicit, as if typed in by an operator.
    pub fn to_submission(&self, id: impl Into<String>) -> ItemSubmission {
        ItemSubmission::new(id, self.name, self.category, self.weight_kg)
            .with_hazmat(self.hazmat)
            .with_flammable(self.flammable)
            .with_temperature(TemperatureRequirement::Label(self.temperature))
            .with_turnover(self.turnover)
    }
}

const fn preset(
    name: &'static str,
    category: Category,
    weight_kg: f64,
    (hazmat, flammable): (bool, bool),
    temperature: TemperatureLabel,
    turnover: TurnoverClass,
) -> ProductPreset {
    ProductPreset {
        name,
        category,
        weight_kg,
        hazmat,
        flammable,
        temperature,
        turnover,
    }
}

const SAFE: (bool, bool) = (false, false);
const HAZMAT: (bool, bool) = (true, false);
const HAZMAT_FLAMMABLE: (bool, bool) = (true, true);

use Category::*;
use TemperatureLabel::{Ambient, Chilled, Controlled, Frozen};
use TurnoverClass::{High, Low, Medium};

pub static PRODUCT_PRESETS: [ProductPreset; 20] = [
    preset("Industrial Solvent (Flammable)", Chemical, 25.0, HAZMAT_FLAMMABLE, Ambient, Medium),
    preset("Frozen Vegetables - 20kg Case", FrozenFood, 20.0, SAFE, Frozen, High),
    preset("Smartphone - iPhone 15 Pro", Electronics, 2.5, SAFE, Ambient, High),
    preset("Industrial Motor - 800kg", Machinery, 800.0, SAFE, Ambient, Low),
    preset("Laptop - Dell XPS 13", Electronics, 3.0, SAFE, Ambient, High),
    preset("Frozen Pizza - Bulk Pack", FrozenFood, 15.0, SAFE, Frozen, High),
    preset("Hydrochloric Acid 5L", Chemical, 6.5, HAZMAT, Ambient, Low),
    preset("Insulin Vials - Refrigerated", Pharmaceutical, 1.2, SAFE, Chilled, Medium),
    preset("Cotton T-Shirts - 100pc Carton", Textiles, 25.0, SAFE, Ambient, Medium),
    preset("Car Engine Block - V6", Automotive, 180.0, SAFE, Ambient, Low),
    preset("Lithium Battery Pack - Industrial", Electronics, 45.0, HAZMAT_FLAMMABLE, Ambient, Medium),
    preset("Steel Beams - 2500kg Pallet", Machinery, 2500.0, SAFE, Ambient, Low),
    preset("Frozen Seafood - Premium Pack", FrozenFood, 30.0, SAFE, Frozen, Medium),
    preset("Medical Equipment - Sterile", Pharmaceutical, 8.0, SAFE, Controlled, Medium),
    preset("Paint Thinner - 25L Drum", Chemical, 22.0, HAZMAT_FLAMMABLE, Ambient, Low),
    preset("Gaming Console - PS5", Electronics, 4.5, SAFE, Ambient, High),
    preset("Winter Jackets - 50pc Box", Textiles, 35.0, SAFE, Ambient, Medium),
    preset("Brake Pads - Assorted Set", Automotive, 12.0, SAFE, Ambient, High),
    preset("Ammonia Solution - 10L", Chemical, 11.0, HAZMAT, Ambient, Low),
    preset("Industrial Forklift Battery", Machinery, 650.0, SAFE, Ambient, Low),
];

pub fn find_preset(name: &str) -> Option<&'static ProductPreset> {
    PRODUCT_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryRuleResolver;

    #[test]
    fn every_preset_is_a_valid_submission() {
        for (i, preset) in PRODUCT_PRESETS.iter().enumerate() {
            let draft = preset.to_submission(format!("PRESET-{i}")).validate();
            assert!(draft.is_ok(), "{} should validate", preset.name);
        }
    }

    #[test]
    fn presets_never_conflict_with_their_category() {
        let resolver = CategoryRuleResolver::default();
        for preset in &PRODUCT_PRESETS {
            let draft = preset.to_submission("P").validate().unwrap();
            let resolution = resolver.resolve(&draft);
            assert!(resolution.warnings.is_empty(), "{} warned", preset.name);
            assert!(resolution.item.defaulted().is_empty());
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let preset = find_preset("laptop - dell xps 13").unwrap();
        assert_eq!(preset.category, Category::Electronics);
    }
}
