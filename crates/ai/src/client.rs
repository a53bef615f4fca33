//! Timeout, retry and schema validation around a [`ReasoningService`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use putaway_core::ZoneId;

use crate::request::RecommendationRequest;
use crate::result::{RawRecommendation, Recommendation, ServiceError};
use crate::retry::RetryPolicy;
use crate::service::ReasoningService;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client used by the decision engine.
///
/// Holds no constraint logic: it bounds each call, retries failures, and
/// rejects any answer that does not match the response schema or names a
/// zone outside the candidate set.
#[derive(Clone)]
pub struct ReasoningServiceClient {
    service: Arc<dyn ReasoningService>,
    attempt_timeout: Duration,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ReasoningServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningServiceClient")
            .field("service", &self.service.describe())
            .field("attempt_timeout", &self.attempt_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ReasoningServiceClient {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self {
            service,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn describe(&self) -> String {
        self.service.describe()
    }

    /// Ask the service for a zone among `request.candidate_zones`.
    ///
    /// Returns the last error once the retry budget is spent.
    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation, ServiceError> {
        let item_id = request.item_attributes.id.as_str();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(self.attempt_timeout, self.service.complete(request)).await {
                Ok(Ok(raw)) => validate_response(raw, request, attempt),
                Ok(Err(err)) => Err(err),
                Err(_) => Err(ServiceError::Timeout {
                    after_ms: self.attempt_timeout.as_millis() as u64,
                }),
            };

            match outcome {
                Ok(recommendation) => {
                    debug!(item_id, attempt, zone_id = %recommendation.zone_id, "reasoning service answered");
                    return Ok(recommendation);
                }
                Err(err) if self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        item_id,
                        attempt,
                        error_kind = err.kind(),
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "reasoning attempt failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    warn!(item_id, attempt, error_kind = err.kind(), error = %err, "reasoning retries exhausted");
                    return Err(err);
                }
            }
        }
    }
}

/// Schema check for one raw answer.
pub fn validate_response(
    raw: RawRecommendation,
    request: &RecommendationRequest,
    attempts: u32,
) -> Result<Recommendation, ServiceError> {
    let zone = raw
        .zone_id
        .map(|z| z.trim().to_string())
        .filter(|z| !z.is_empty())
        .ok_or_else(|| ServiceError::malformed("missing zoneId"))?;

    let confidence = raw
        .confidence
        .ok_or_else(|| ServiceError::malformed("missing confidence"))?;
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(ServiceError::malformed(format!("confidence {confidence} outside [0, 1]")));
    }

    let reasoning = raw
        .reasoning_text
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ServiceError::malformed("missing reasoningText"))?;

    if !request.is_candidate(&zone) {
        return Err(ServiceError::InvalidZone(zone));
    }
    let zone_id = ZoneId::new(zone.as_str()).map_err(|_| ServiceError::InvalidZone(zone))?;

    Ok(Recommendation {
        zone_id,
        confidence,
        reasoning,
        attempts,
    })
}
