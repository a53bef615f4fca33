use putaway_infra::DecisionOrchestrator;

/// State shared by every handler.
///
/// The orchestrator is cheap to clone and internally synchronized, so no
/// extra locking happens here.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub engine: DecisionOrchestrator,
}

impl AppServices {
    pub fn new(engine: DecisionOrchestrator) -> Self {
        Self { engine }
    }
}
