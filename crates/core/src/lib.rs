//! `putaway-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model shared by every layer and the strongly-typed identifiers
//! that tie items, zones, decisions and audit entries together.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AuditEntryId, DecisionId, ItemId, ZoneId};
