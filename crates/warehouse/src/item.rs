use serde::{Deserialize, Serialize};

use putaway_core::{DomainError, DomainResult, ItemId};

use crate::category::Category;

/// Closed temperature interval in degrees Celsius.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min_c: f64,
    pub max_c: f64,
}

impl TemperatureRange {
    /// Build a range, rejecting non-finite or inverted bounds.
    pub fn new(min_c: f64, max_c: f64) -> DomainResult<Self> {
        let range = Self { min_c, max_c };
        range.ensure_well_formed()?;
        Ok(range)
    }

    pub fn ensure_well_formed(&self) -> DomainResult<()> {
        if !(self.min_c.is_finite() && self.max_c.is_finite()) {
            return Err(DomainError::validation("temperature bounds must be finite"));
        }
        if self.min_c > self.max_c {
            return Err(DomainError::validation(format!(
                "temperature range is inverted ({} > {})",
                self.min_c, self.max_c
            )));
        }
        Ok(())
    }

    /// Full containment: every temperature in `other` is also in `self`.
    pub fn contains(&self, other: &TemperatureRange) -> bool {
        self.min_c <= other.min_c && other.max_c <= self.max_c
    }
}

impl core::fmt::Display for TemperatureRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..{}°C", self.min_c, self.max_c)
    }
}

/// Named storage temperature classes accepted from data-entry forms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureLabel {
    Ambient,
    Controlled,
    #[serde(alias = "cold")]
    Chilled,
    Frozen,
}

impl TemperatureLabel {
    /// Concrete range for the label; `Ambient` carries no requirement.
    pub fn range(self) -> Option<TemperatureRange> {
        match self {
            TemperatureLabel::Ambient => None,
            TemperatureLabel::Controlled => Some(TemperatureRange { min_c: 15.0, max_c: 25.0 }),
            TemperatureLabel::Chilled => Some(TemperatureRange { min_c: 0.0, max_c: 4.0 }),
            TemperatureLabel::Frozen => Some(TemperatureRange { min_c: -25.0, max_c: -18.0 }),
        }
    }
}

/// Inbound temperature requirement: a label or an explicit `[min, max]` pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemperatureRequirement {
    Label(TemperatureLabel),
    Range([f64; 2]),
}

impl TemperatureRequirement {
    pub fn range(&self) -> Option<TemperatureRange> {
        match self {
            TemperatureRequirement::Label(label) => label.range(),
            TemperatureRequirement::Range([min_c, max_c]) => Some(TemperatureRange {
                min_c: *min_c,
                max_c: *max_c,
            }),
        }
    }

    fn validate(&self) -> DomainResult<()> {
        match self.range() {
            Some(range) => range.ensure_well_formed(),
            None => Ok(()),
        }
    }
}

/// Expected pick frequency.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnoverClass {
    High,
    Medium,
    Low,
}

impl core::fmt::Display for TurnoverClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            TurnoverClass::High => "high",
            TurnoverClass::Medium => "medium",
            TurnoverClass::Low => "low",
        })
    }
}

/// Attribute values set explicitly by the operator, overriding category defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeOverrides {
    #[serde(default, alias = "hazmatFlag")]
    pub hazmat: Option<bool>,
    #[serde(default)]
    pub flammable: Option<bool>,
    #[serde(default)]
    pub temperature_requirement: Option<TemperatureRequirement>,
    #[serde(default)]
    pub turnover_class: Option<TurnoverClass>,
}

impl AttributeOverrides {
    /// Attributes set on `self` win over those set on `fallback`.
    fn or(self, fallback: AttributeOverrides) -> AttributeOverrides {
        AttributeOverrides {
            hazmat: self.hazmat.or(fallback.hazmat),
            flammable: self.flammable.or(fallback.flammable),
            temperature_requirement: self
                .temperature_requirement
                .or(fallback.temperature_requirement),
            turnover_class: self.turnover_class.or(fallback.turnover_class),
        }
    }
}

/// Raw item attributes as supplied by the surrounding application.
///
/// Nothing here is trusted: [`ItemSubmission::validate`] turns it into an
/// [`ItemDraft`] or rejects it before any decision work starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSubmission {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(alias = "weight")]
    pub weight_kg: f64,
    #[serde(default, alias = "hazmatFlag")]
    pub hazmat: Option<bool>,
    #[serde(default)]
    pub flammable: Option<bool>,
    #[serde(default)]
    pub temperature_requirement: Option<TemperatureRequirement>,
    #[serde(default)]
    pub turnover_class: Option<TurnoverClass>,
    #[serde(default)]
    pub explicit_overrides: Option<AttributeOverrides>,
}

impl ItemSubmission {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        weight_kg: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            weight_kg,
            hazmat: None,
            flammable: None,
            temperature_requirement: None,
            turnover_class: None,
            explicit_overrides: None,
        }
    }

    pub fn with_hazmat(mut self, hazmat: bool) -> Self {
        self.hazmat = Some(hazmat);
        self
    }

    pub fn with_flammable(mut self, flammable: bool) -> Self {
        self.flammable = Some(flammable);
        self
    }

    pub fn with_temperature(mut self, requirement: TemperatureRequirement) -> Self {
        self.temperature_requirement = Some(requirement);
        self
    }

    pub fn with_turnover(mut self, turnover: TurnoverClass) -> Self {
        self.turnover_class = Some(turnover);
        self
    }

    pub fn with_overrides(mut self, overrides: AttributeOverrides) -> Self {
        self.explicit_overrides = Some(overrides);
        self
    }

    /// Reject malformed submissions; on success the explicit attributes are
    /// merged (`explicitOverrides` wins over top-level fields).
    pub fn validate(self) -> DomainResult<ItemDraft> {
        let id = ItemId::new(self.id).map_err(|e| DomainError::validation(e.to_string()))?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(DomainError::validation(format!(
                "weight must be a positive number of kilograms (got {})",
                self.weight_kg
            )));
        }

        let top_level = AttributeOverrides {
            hazmat: self.hazmat,
            flammable: self.flammable,
            temperature_requirement: self.temperature_requirement,
            turnover_class: self.turnover_class,
        };
        let explicit = self.explicit_overrides.unwrap_or_default().or(top_level);

        if let Some(requirement) = &explicit.temperature_requirement {
            requirement.validate()?;
        }

        Ok(ItemDraft {
            id,
            name: name.to_string(),
            category: self.category,
            weight_kg: self.weight_kg,
            explicit,
        })
    }
}

/// A validated submission whose unset attributes are still pending category defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) category: Category,
    pub(crate) weight_kg: f64,
    pub(crate) explicit: AttributeOverrides,
}

impl ItemDraft {
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn explicit(&self) -> &AttributeOverrides {
        &self.explicit
    }
}

/// Attributes that can be filled from category defaults.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Hazmat,
    Flammable,
    Temperature,
    Turnover,
}

/// Fully-populated item. Built only by the category resolver and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) category: Category,
    pub(crate) weight_kg: f64,
    pub(crate) hazmat: bool,
    pub(crate) flammable: bool,
    pub(crate) temperature: Option<TemperatureRange>,
    pub(crate) turnover: TurnoverClass,
    pub(crate) defaulted: Vec<Attribute>,
}

impl Item {
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn is_hazmat(&self) -> bool {
        self.hazmat
    }

    pub fn is_flammable(&self) -> bool {
        self.flammable
    }

    pub fn temperature(&self) -> Option<&TemperatureRange> {
        self.temperature.as_ref()
    }

    pub fn turnover(&self) -> TurnoverClass {
        self.turnover
    }

    /// Attributes that took their category default.
    pub fn defaulted(&self) -> &[Attribute] {
        &self.defaulted
    }
}
