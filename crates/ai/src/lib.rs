//! `putaway-ai`
//!
//! **Responsibility:** boundary to the external reasoning service.
//!
//! This crate is intentionally **not** part of the warehouse model:
//! - It must not depend on warehouse domain types.
//! - It carries no safety-constraint logic.
//! - It emits **recommendations**, not decisions.

pub mod client;
pub mod http;
pub mod request;
pub mod result;
pub mod retry;
pub mod scripted;
pub mod service;

pub use client::{DEFAULT_ATTEMPT_TIMEOUT, ReasoningServiceClient};
pub use http::{ChatCompletionsConfig, ChatCompletionsService};
pub use request::{AdvisoryHint, CandidateZone, ItemAttributes, RecommendationRequest};
pub use result::{RawRecommendation, Recommendation, ServiceError};
pub use retry::RetryPolicy;
pub use scripted::{ScriptedReasoningService, ScriptedReply};
pub use service::ReasoningService;
