use std::sync::Arc;

use async_trait::async_trait;

use crate::request::RecommendationRequest;
use crate::result::{RawRecommendation, ServiceError};

/// Transport to an external reasoning service (one attempt, no retries).
///
/// Implementations only move bytes and decode them; schema checks, timeouts
/// and retries live in [`crate::ReasoningServiceClient`].
#[async_trait]
pub trait ReasoningService: Send + Sync + 'static {
    /// Short backend description for logs (e.g. `openrouter:phi-3-mini`).
    fn describe(&self) -> String;

    async fn complete(&self, request: &RecommendationRequest) -> Result<RawRecommendation, ServiceError>;
}

#[async_trait]
impl<S> ReasoningService for Arc<S>
where
    S: ReasoningService + ?Sized,
{
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn complete(&self, request: &RecommendationRequest) -> Result<RawRecommendation, ServiceError> {
        (**self).complete(request).await
    }
}
