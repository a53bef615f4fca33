//! Warehouse put-away domain module.
//!
//! This crate contains the deterministic placement rules (category defaults,
//! zone catalog, safety constraints) and the decision record, implemented as
//! pure domain logic (no IO, no HTTP, no storage).

pub mod catalog;
pub mod category;
pub mod constraint;
pub mod decision;
pub mod item;
pub mod preset;
pub mod zone;

pub use catalog::{ZoneCatalog, ZoneValidation};
pub use category::{
    Category, CategoryDefaults, CategoryRuleResolver, ConflictWarning, Resolution, WarningSeverity,
};
pub use constraint::{
    Constraint, ConstraintKind, ConstraintSet, DEFAULT_AMBIENT_THRESHOLD_C, Feasibility,
    SafetyConstraintEvaluator,
};
pub use decision::{Decision, DecisionSource, ZoneRejection};
pub use item::{
    Attribute, AttributeOverrides, Item, ItemDraft, ItemSubmission, TemperatureLabel,
    TemperatureRange, TemperatureRequirement, TurnoverClass,
};
pub use preset::{PRODUCT_PRESETS, ProductPreset, find_preset};
pub use zone::{Capability, Specialization, Zone, ZoneTable, ZoneType};
