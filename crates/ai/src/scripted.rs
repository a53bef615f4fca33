//! Scripted reasoning service.
//!
//! Replays a fixed list of replies in order. Intended for tests/dev and for
//! running the engine without network access.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::request::RecommendationRequest;
use crate::result::{RawRecommendation, ServiceError};
use crate::service::ReasoningService;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedReply {
    Answer(RawRecommendation),
    Fail(ServiceError),
    /// Never completes; the client's timeout has to fire.
    Stall,
}

impl ScriptedReply {
    pub fn answer(zone_id: &str, confidence: f64, reasoning: &str) -> Self {
        Self::Answer(RawRecommendation::new(zone_id, confidence, reasoning))
    }
}

#[derive(Debug, Default)]
pub struct ScriptedReasoningService {
    replies: Mutex<VecDeque<ScriptedReply>>,
    /// Served once `replies` is drained.
    then: Option<ScriptedReply>,
    calls: AtomicU32,
    requests: Mutex<Vec<RecommendationRequest>>,
}

impl ScriptedReasoningService {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Serves `reply` on every call.
    pub fn repeating(reply: ScriptedReply) -> Self {
        Self {
            then: Some(reply),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<RecommendationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        let queued = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        queued.or_else(|| self.then.clone())
    }
}

#[async_trait]
impl ReasoningService for ScriptedReasoningService {
    fn describe(&self) -> String {
        "scripted".to_string()
    }

    async fn complete(&self, request: &RecommendationRequest) -> Result<RawRecommendation, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.next_reply() {
            Some(ScriptedReply::Answer(raw)) => Ok(raw),
            Some(ScriptedReply::Fail(err)) => Err(err),
            Some(ScriptedReply::Stall) => {
                std::future::pending::<()>().await;
                Err(ServiceError::unavailable("stalled call resumed"))
            }
            None => Err(ServiceError::unavailable("script exhausted")),
        }
    }
}
