use serde::{Deserialize, Serialize};
use thiserror::Error;

use putaway_core::ZoneId;

/// Response exactly as decoded from the reasoning service.
///
/// Every field is optional here; [`crate::ReasoningServiceClient`] enforces the
/// schema before anything reaches the decision engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecommendation {
    #[serde(default, alias = "zone", alias = "zone_id")]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default, alias = "reasoning", alias = "reasoning_text")]
    pub reasoning_text: Option<String>,
}

impl RawRecommendation {
    pub fn new(zone_id: impl Into<String>, confidence: f64, reasoning_text: impl Into<String>) -> Self {
        Self {
            zone_id: Some(zone_id.into()),
            confidence: Some(confidence),
            reasoning_text: Some(reasoning_text.into()),
        }
    }
}

/// Schema-checked recommendation.
///
/// This is an insight, not a decision: the orchestrator still decides
/// whether to accept it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub zone_id: ZoneId,

    /// Confidence in \[0, 1\] (enforced).
    pub confidence: f64,

    pub reasoning: String,

    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// Terminal or per-attempt failure of the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("reasoning service unavailable: {0}")]
    Unavailable(String),

    #[error("reasoning service timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("malformed reasoning response: {0}")]
    MalformedResponse(String),

    #[error("reasoning service chose invalid zone '{0}'")]
    InvalidZone(String),
}

impl ServiceError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Short machine-readable tag, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unavailable(_) => "unavailable",
            ServiceError::Timeout { .. } => "timeout",
            ServiceError::MalformedResponse(_) => "malformed_response",
            ServiceError::InvalidZone(_) => "invalid_zone",
        }
    }
}
