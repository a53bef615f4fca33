//! Category rules: default attributes per product category and detection of
//! explicit attributes that contradict them.

use serde::{Deserialize, Serialize};

use crate::item::{Attribute, Item, ItemDraft, TemperatureLabel, TemperatureRange, TurnoverClass};
use crate::zone::Specialization;

/// Product category (closed set; every category has an explicit default record).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[serde(alias = "frozen_food", alias = "Frozen Food")]
    FrozenFood,
    #[serde(alias = "chemicals", alias = "Chemicals")]
    Chemical,
    #[serde(alias = "pharmaceuticals", alias = "Pharmaceuticals")]
    Pharmaceutical,
    #[serde(alias = "Electronics")]
    Electronics,
    #[serde(alias = "Machinery")]
    Machinery,
    #[serde(alias = "Textiles")]
    Textiles,
    #[serde(alias = "Automotive")]
    Automotive,
    #[serde(alias = "general_goods", alias = "General Goods")]
    GeneralGoods,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::FrozenFood,
        Category::Chemical,
        Category::Pharmaceutical,
        Category::Electronics,
        Category::Machinery,
        Category::Textiles,
        Category::Automotive,
        Category::GeneralGoods,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::FrozenFood => "frozen-food",
            Category::Chemical => "chemical",
            Category::Pharmaceutical => "pharmaceutical",
            Category::Electronics => "electronics",
            Category::Machinery => "machinery",
            Category::Textiles => "textiles",
            Category::Automotive => "automotive",
            Category::GeneralGoods => "general-goods",
        }
    }

    /// Default attributes for the category.
    pub fn defaults(self) -> CategoryDefaults {
        match self {
            Category::FrozenFood => CategoryDefaults {
                hazmat: false,
                flammable: false,
                temperature: TemperatureLabel::Frozen,
                turnover: TurnoverClass::High,
                specialization: Some(Specialization::ColdChain),
                description: "Perishable food requiring -18°C storage",
            },
            Category::Chemical => CategoryDefaults {
                hazmat: true,
                flammable: true,
                temperature: TemperatureLabel::Ambient,
                turnover: TurnoverClass::Low,
                specialization: Some(Specialization::Hazmat),
                description: "May contain hazardous substances",
            },
            Category::Pharmaceutical => CategoryDefaults {
                hazmat: false,
                flammable: false,
                temperature: TemperatureLabel::Controlled,
                turnover: TurnoverClass::Medium,
                specialization: None,
                description: "Temperature-sensitive medical products",
            },
            Category::Electronics => CategoryDefaults {
                hazmat: false,
                flammable: false,
                temperature: TemperatureLabel::Ambient,
                turnover: TurnoverClass::Medium,
                specialization: None,
                description: "Standard electronics goods",
            },
            Category::Machinery => CategoryDefaults {
                hazmat: false,
                flammable: false,
                temperature: TemperatureLabel::Ambient,
                turnover: TurnoverClass::Low,
                specialization: Some(Specialization::Heavy),
                description: "Heavy industrial equipment",
            },
            Category::Textiles => CategoryDefaults {
                hazmat: false,
                flammable: false,
                temperature: TemperatureLabel::Ambient,
                turnover: TurnoverClass::Medium,
                specialization: Some(Specialization::General),
                description: "Fabric and clothing items",
            },
            Category::Automotive => CategoryDefaults {
                hazmat: false,
                flammable: false,
                temperature: TemperatureLabel::Ambient,
                turnover: TurnoverClass::Medium,
                specialization: Some(Specialization::General),
                description: "Auto parts and components",
            },
            Category::GeneralGoods => CategoryDefaults {
                hazmat: false,
                flammable: false,
                temperature: TemperatureLabel::Ambient,
                turnover: TurnoverClass::Medium,
                specialization: Some(Specialization::General),
                description: "Standard merchandise",
            },
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default attribute record for a category.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CategoryDefaults {
    pub hazmat: bool,
    pub flammable: bool,
    /// Also the category's temperature expectation used for conflict detection.
    pub temperature: TemperatureLabel,
    pub turnover: TurnoverClass,
    /// Zone specialization preferred by the fallback policy.
    pub specialization: Option<Specialization>,
    pub description: &'static str,
}

/// How strongly a conflict should be surfaced to the operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Notice,
    Warning,
    Critical,
}

/// Non-fatal contradiction between an explicit attribute and the category's expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictWarning {
    pub attribute: Attribute,
    pub severity: WarningSeverity,
    pub message: String,
}

/// Output of the resolver: the populated item plus any conflict warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub item: Item,
    pub warnings: Vec<ConflictWarning>,
}

/// Fills unset item attributes from category defaults.
///
/// Pure and deterministic: the default table is compiled in and the resolver
/// holds only the cold-chain threshold used to judge temperature conflicts.
#[derive(Debug, Copy, Clone)]
pub struct CategoryRuleResolver {
    ambient_threshold_c: f64,
}

impl Default for CategoryRuleResolver {
    fn default() -> Self {
        Self::new(crate::constraint::DEFAULT_AMBIENT_THRESHOLD_C)
    }
}

impl CategoryRuleResolver {
    pub fn new(ambient_threshold_c: f64) -> Self {
        Self { ambient_threshold_c }
    }

    pub fn resolve(&self, draft: &ItemDraft) -> Resolution {
        let defaults = draft.category.defaults();
        let explicit = &draft.explicit;
        let mut defaulted = Vec::new();

        let hazmat = explicit.hazmat.unwrap_or_else(|| {
            defaulted.push(Attribute::Hazmat);
            defaults.hazmat
        });
        let flammable = explicit.flammable.unwrap_or_else(|| {
            defaulted.push(Attribute::Flammable);
            defaults.flammable
        });
        let temperature = match &explicit.temperature_requirement {
            Some(requirement) => requirement.range(),
            None => {
                defaulted.push(Attribute::Temperature);
                defaults.temperature.range()
            }
        };
        let turnover = explicit.turnover_class.unwrap_or_else(|| {
            defaulted.push(Attribute::Turnover);
            defaults.turnover
        });

        let warnings = self.conflicts(draft, &defaults, temperature.as_ref());

        Resolution {
            item: Item {
                id: draft.id.clone(),
                name: draft.name.clone(),
                category: draft.category,
                weight_kg: draft.weight_kg,
                hazmat,
                flammable,
                temperature,
                turnover,
                defaulted,
            },
            warnings,
        }
    }

    fn conflicts(
        &self,
        draft: &ItemDraft,
        defaults: &CategoryDefaults,
        temperature: Option<&TemperatureRange>,
    ) -> Vec<ConflictWarning> {
        let category = draft.category;
        let explicit = &draft.explicit;
        let mut warnings = Vec::new();

        if explicit.temperature_requirement.is_some() {
            let cold_chain = temperature.is_some_and(|t| t.max_c < self.ambient_threshold_c);
            match defaults.temperature {
                TemperatureLabel::Frozen | TemperatureLabel::Chilled if !cold_chain => {
                    warnings.push(ConflictWarning {
                        attribute: Attribute::Temperature,
                        severity: WarningSeverity::Critical,
                        message: format!(
                            "'{category}' typically requires frozen/cold storage, but {} was specified",
                            describe_temperature(temperature)
                        ),
                    });
                }
                TemperatureLabel::Controlled if temperature.is_none() => {
                    warnings.push(ConflictWarning {
                        attribute: Attribute::Temperature,
                        severity: WarningSeverity::Notice,
                        message: format!(
                            "'{category}' may need controlled temperature, but ambient was specified"
                        ),
                    });
                }
                _ => {}
            }
        }

        if defaults.hazmat && explicit.hazmat == Some(false) {
            warnings.push(ConflictWarning {
                attribute: Attribute::Hazmat,
                severity: WarningSeverity::Warning,
                message: format!(
                    "'{category}' may contain hazardous materials; review the hazard classification"
                ),
            });
        }

        warnings
    }
}

fn describe_temperature(temperature: Option<&TemperatureRange>) -> String {
    match temperature {
        Some(range) => format!("a {range} requirement"),
        None => "ambient".to_string(),
    }
}
