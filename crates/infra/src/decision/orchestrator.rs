//! Per-request decision state machine.
//!
//! `Draft → Defaulted → ConstraintsResolved → {AiConsulted | Skipped} → Finalized`
//!
//! Resolver, evaluator and catalog are pure and shared without locks. The
//! reasoning call is the only suspension point; the audit append is the only
//! shared mutable resource.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use putaway_ai::{
    AdvisoryHint, CandidateZone, ChatCompletionsService, ItemAttributes, RecommendationRequest,
    ReasoningServiceClient,
};
use putaway_core::{AuditEntryId, DecisionId, DomainError, ZoneId};
use putaway_warehouse::{
    CategoryRuleResolver, ConstraintSet, Decision, DecisionSource, Item, ItemDraft, ItemSubmission,
    Resolution, SafetyConstraintEvaluator, Zone, ZoneCatalog, ZoneRejection,
};

use super::fallback::{self, FallbackChoice};
use super::{EngineError, RecordedDecision};
use crate::audit::{AuditEntry, AuditRecorder, JsonlAuditLog};
use crate::config::EngineConfig;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DecisionStage {
    Draft,
    Defaulted,
    ConstraintsResolved,
    AiConsulted,
    Skipped,
    Finalized,
}

impl DecisionStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionStage::Draft => "draft",
            DecisionStage::Defaulted => "defaulted",
            DecisionStage::ConstraintsResolved => "constraints_resolved",
            DecisionStage::AiConsulted => "ai_consulted",
            DecisionStage::Skipped => "skipped",
            DecisionStage::Finalized => "finalized",
        }
    }
}

/// State carried from `ConstraintsResolved` onwards.
struct Resolved {
    id: DecisionId,
    resolution: Resolution,
    constraints: ConstraintSet,
    candidates: Vec<ZoneId>,
    rejected: Vec<ZoneRejection>,
}

/// How the zone was settled once constraints are known.
enum Outcome {
    Infeasible(String),
    Chosen {
        zone: ZoneId,
        confidence: f64,
        reasoning: String,
        source: DecisionSource,
    },
}

#[derive(Clone)]
pub struct DecisionOrchestrator {
    catalog: Arc<ZoneCatalog>,
    resolver: CategoryRuleResolver,
    ambient_threshold_c: f64,
    reasoning: Option<ReasoningServiceClient>,
    audit: AuditRecorder,
}

impl std::fmt::Debug for DecisionOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionOrchestrator")
            .field("zones", &self.catalog.zones().len())
            .field("ambient_threshold_c", &self.ambient_threshold_c)
            .field("reasoning", &self.reasoning)
            .finish_non_exhaustive()
    }
}

impl DecisionOrchestrator {
    /// `reasoning: None` disables the external service; every multi-candidate
    /// decision then goes straight to the fallback policy.
    pub fn new(catalog: ZoneCatalog, reasoning: Option<ReasoningServiceClient>, audit: AuditRecorder) -> Self {
        let resolver = CategoryRuleResolver::default();
        Self {
            catalog: Arc::new(catalog),
            ambient_threshold_c: putaway_warehouse::DEFAULT_AMBIENT_THRESHOLD_C,
            resolver,
            reasoning,
            audit,
        }
    }

    pub fn with_ambient_threshold(mut self, ambient_threshold_c: f64) -> Self {
        self.ambient_threshold_c = ambient_threshold_c;
        self.resolver = CategoryRuleResolver::new(ambient_threshold_c);
        self
    }

    /// Wire catalog, audit storage and reasoning transport from configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let catalog = config.zone_catalog()?;

        let audit = match &config.audit_log_path {
            Some(path) => AuditRecorder::new(Arc::new(JsonlAuditLog::open(path)?)),
            None => AuditRecorder::in_memory(),
        };

        let reasoning = if config.reasoning.enabled {
            let service = ChatCompletionsService::new(config.reasoning.chat_completions())
                .map_err(crate::config::ConfigError::from)?;
            Some(
                ReasoningServiceClient::new(Arc::new(service))
                    .with_timeout(config.reasoning.attempt_timeout)
                    .with_retry(config.reasoning.retry_policy()),
            )
        } else {
            None
        };

        info!(
            zones = catalog.zones().len(),
            reasoning = %reasoning.as_ref().map(|r| r.describe()).unwrap_or_else(|| "disabled".to_string()),
            audit_log = ?config.audit_log_path,
            "decision engine configured"
        );
        Ok(Self::new(catalog, reasoning, audit).with_ambient_threshold(config.ambient_threshold_c))
    }

    pub fn catalog(&self) -> &ZoneCatalog {
        &self.catalog
    }

    pub fn audit(&self) -> &AuditRecorder {
        &self.audit
    }

    pub fn reasoning_enabled(&self) -> bool {
        self.reasoning.is_some()
    }

    /// Validate, decide and record one submission.
    ///
    /// Validation failures return before anything is recorded. Every valid
    /// submission yields a recorded decision, infeasible ones included.
    pub async fn decide(&self, submission: ItemSubmission) -> Result<RecordedDecision, EngineError> {
        let draft = submission.validate()?;
        self.decide_draft(draft).await
    }

    /// Start a decision as a background task that can be cancelled.
    pub fn spawn_decision(&self, submission: ItemSubmission) -> Result<PendingDecision, EngineError> {
        let draft = submission.validate()?;
        let engine = self.clone();
        let handle = tokio::spawn(async move { engine.decide_draft(draft).await });
        Ok(PendingDecision { handle })
    }

    async fn decide_draft(&self, draft: ItemDraft) -> Result<RecordedDecision, EngineError> {
        let decision = self.evaluate(draft).await;
        // No await between finalization and the append: a cancelled task
        // either never finalized or has already been recorded.
        let entry_id = self.audit.record(&decision)?;
        Ok(RecordedDecision { entry_id, decision })
    }

    /// Run the state machine without recording the result.
    pub async fn evaluate(&self, draft: ItemDraft) -> Decision {
        let id = DecisionId::new();
        let span = info_span!("decision", decision_id = %id, item_id = %draft.id());
        async move {
            debug!(stage = DecisionStage::Draft.as_str(), category = %draft.category(), "decision started");
            let resolved = self.resolve(id, &draft);

            let (outcome, stage) = match resolved.candidates.as_slice() {
                [] => {
                    let reason = self.infeasible_reason(&resolved);
                    warn!(stage = DecisionStage::ConstraintsResolved.as_str(), reason = %reason, "infeasible placement");
                    (Outcome::Infeasible(reason), DecisionStage::ConstraintsResolved)
                }
                [only] => {
                    debug!(stage = DecisionStage::Skipped.as_str(), zone_id = %only, "single candidate; reasoning skipped");
                    (self.single_candidate(&resolved, only), DecisionStage::Skipped)
                }
                _ => (self.consult(&resolved).await, DecisionStage::AiConsulted),
            };

            let decision = finalize(resolved, outcome);
            info!(
                stage = DecisionStage::Finalized.as_str(),
                from = stage.as_str(),
                source = %decision.source,
                zone_id = decision.zone.as_ref().map(ZoneId::as_str).unwrap_or("none"),
                confidence = decision.confidence,
                "decision finalized"
            );
            decision
        }
        .instrument(span)
        .await
    }

    /// Draft → Defaulted → ConstraintsResolved.
    fn resolve(&self, id: DecisionId, draft: &ItemDraft) -> Resolved {
        let resolution = self.resolver.resolve(draft);
        debug!(
            stage = DecisionStage::Defaulted.as_str(),
            defaulted = ?resolution.item.defaulted(),
            warnings = resolution.warnings.len(),
            "category defaults applied"
        );

        let item = &resolution.item;
        let constraints = SafetyConstraintEvaluator::new(&self.catalog)
            .with_ambient_threshold(self.ambient_threshold_c)
            .evaluate(item);

        let envelope: Vec<&ZoneId> = self.catalog.zones_satisfying(item).into_iter().map(|z| &z.id).collect();
        let candidates: Vec<ZoneId> = constraints
            .allowed_zones()
            .unwrap_or_default()
            .iter()
            .filter(|id| envelope.contains(id))
            .cloned()
            .collect();

        let rejected = self.rejections(item, &constraints, &candidates);
        debug!(
            stage = DecisionStage::ConstraintsResolved.as_str(),
            constraints = constraints.constraints().len(),
            candidates = ?candidates.iter().map(ZoneId::as_str).collect::<Vec<_>>(),
            "constraints resolved"
        );

        Resolved {
            id,
            resolution,
            constraints,
            candidates,
            rejected,
        }
    }

    fn rejections(&self, item: &Item, constraints: &ConstraintSet, candidates: &[ZoneId]) -> Vec<ZoneRejection> {
        self.catalog
            .zones()
            .iter()
            .filter(|z| !candidates.contains(&z.id))
            .map(|z| {
                let mut reasons = constraints.violations_for(&z.id);
                if reasons.is_empty() {
                    reasons = self.catalog.validate(&z.id, item).violations;
                }
                ZoneRejection {
                    zone: z.id.clone(),
                    reasons,
                }
            })
            .collect()
    }

    fn infeasible_reason(&self, resolved: &Resolved) -> String {
        if resolved.constraints.is_infeasible() {
            return resolved.constraints.conflict_explanation(self.catalog.zones().len());
        }
        let details: Vec<String> = resolved
            .rejected
            .iter()
            .map(|r| format!("{}: {}", r.zone, r.reasons.join(", ")))
            .collect();
        format!(
            "Infeasible placement: no zone's weight, temperature and capability envelope accepts the item. {}.",
            details.join("; ")
        )
    }

    fn single_candidate(&self, resolved: &Resolved, zone: &ZoneId) -> Outcome {
        let summaries: Vec<String> = resolved.constraints.mandatory().map(|c| c.summary()).collect();
        Outcome::Chosen {
            zone: zone.clone(),
            confidence: 1.0,
            reasoning: format!(
                "{} is the only zone satisfying every mandatory constraint: {}.",
                self.zone_label(zone),
                summaries.join("; ")
            ),
            source: DecisionSource::Rule,
        }
    }

    /// ConstraintsResolved → AiConsulted, falling back on any failure.
    async fn consult(&self, resolved: &Resolved) -> Outcome {
        let Some(client) = &self.reasoning else {
            return self.fallback(resolved, "reasoning service disabled");
        };

        let request = self.recommendation_request(resolved);
        match client.recommend(&request).await {
            Ok(rec) if resolved.candidates.contains(&rec.zone_id) => {
                debug!(
                    stage = DecisionStage::AiConsulted.as_str(),
                    zone_id = %rec.zone_id,
                    attempts = rec.attempts,
                    "recommendation accepted"
                );
                Outcome::Chosen {
                    zone: rec.zone_id,
                    confidence: rec.confidence,
                    reasoning: rec.reasoning,
                    source: DecisionSource::Ai,
                }
            }
            Ok(rec) => self.fallback(resolved, &format!("reasoning service chose non-candidate zone {}", rec.zone_id)),
            Err(err) => self.fallback(resolved, &err.to_string()),
        }
    }

    fn fallback(&self, resolved: &Resolved, cause: &str) -> Outcome {
        let specialization = resolved.resolution.item.category().defaults().specialization;
        let choice = fallback::choose(&self.catalog, &resolved.candidates, specialization, &resolved.constraints);

        match choice {
            Some(FallbackChoice { zone, rule }) => {
                warn!(
                    stage = DecisionStage::AiConsulted.as_str(),
                    cause,
                    zone_id = %zone,
                    rule = ?rule,
                    "fallback policy applied"
                );
                Outcome::Chosen {
                    reasoning: format!(
                        "Fallback ({cause}): {} {}.",
                        self.zone_label(&zone),
                        rule.describe()
                    ),
                    zone,
                    confidence: rule.confidence(),
                    source: DecisionSource::Fallback,
                }
            }
            None => Outcome::Infeasible(self.infeasible_reason(resolved)),
        }
    }

    fn recommendation_request(&self, resolved: &Resolved) -> RecommendationRequest {
        let item = &resolved.resolution.item;
        RecommendationRequest {
            item_attributes: ItemAttributes {
                id: item.id().to_string(),
                name: item.name().to_string(),
                category: item.category().as_str().to_string(),
                weight_kg: item.weight_kg(),
                hazmat: item.is_hazmat(),
                flammable: item.is_flammable(),
                temperature_requirement: item.temperature().map(|t| [t.min_c, t.max_c]),
                turnover_class: item.turnover().to_string(),
            },
            candidate_zones: resolved
                .candidates
                .iter()
                .filter_map(|id| self.catalog.get(id))
                .map(candidate_zone)
                .collect(),
            advisory_constraints: resolved
                .constraints
                .advisory()
                .map(|c| AdvisoryHint {
                    kind: c.kind.to_string(),
                    reason: c.reason.clone(),
                    preferred_zones: c.allowed.iter().map(ZoneId::to_string).collect(),
                })
                .collect(),
        }
    }

    fn zone_label(&self, zone: &ZoneId) -> String {
        self.catalog.get(zone).map(Zone::label).unwrap_or_else(|| zone.to_string())
    }

    /// Record an operator override of a finalized decision.
    ///
    /// The zone must exist; breaking the decision's mandatory constraints is
    /// allowed and noted on the override record.
    pub fn override_decision(
        &self,
        entry_id: AuditEntryId,
        new_zone: ZoneId,
        operator: &str,
        reason: &str,
    ) -> Result<AuditEntry, EngineError> {
        if !self.catalog.contains(&new_zone) {
            return Err(DomainError::validation(format!("unknown zone {new_zone}")).into());
        }
        if operator.trim().is_empty() {
            return Err(DomainError::validation("operator cannot be blank").into());
        }

        let target = self.audit.get(entry_id)?.ok_or(EngineError::EntryNotFound(entry_id))?;
        let violations = self
            .audit
            .decision(target.decision_id)?
            .map(|d| d.violations_for(&new_zone))
            .unwrap_or_default();
        if !violations.is_empty() {
            warn!(
                entry_id = %entry_id,
                decision_id = %target.decision_id,
                zone_id = %new_zone,
                violations = ?violations,
                "override breaks mandatory constraints"
            );
        }

        Ok(self.audit.record_override(entry_id, new_zone, operator, reason, violations)?)
    }
}

fn candidate_zone(zone: &Zone) -> CandidateZone {
    CandidateZone {
        id: zone.id.to_string(),
        name: zone.name.clone(),
        capabilities: zone.capabilities.iter().map(|c| c.as_str().to_string()).collect(),
        max_weight: zone.max_weight_kg,
        temp_range: [zone.temperature.min_c, zone.temperature.max_c],
        dispatch_distance_m: zone.dispatch_distance_m,
        rack_type: zone.rack_type.clone(),
        equipment: zone.equipment.clone(),
    }
}

/// {AiConsulted | Skipped | infeasible} → Finalized.
fn finalize(resolved: Resolved, outcome: Outcome) -> Decision {
    let Resolved {
        id,
        resolution,
        constraints,
        rejected,
        ..
    } = resolved;

    let (zone, confidence, reasoning, source) = match outcome {
        Outcome::Infeasible(reason) => (None, 0.0, reason, DecisionSource::Fallback),
        Outcome::Chosen {
            zone,
            confidence,
            reasoning,
            source,
        } => (Some(zone), confidence, reasoning, source),
    };

    Decision {
        id,
        item_id: resolution.item.id().clone(),
        zone,
        confidence,
        reasoning,
        constraints: constraints.into_constraints(),
        source,
        warnings: resolution.warnings,
        rejected,
        decided_at: Utc::now(),
    }
}

/// A decision running as a background task.
#[derive(Debug)]
pub struct PendingDecision {
    handle: JoinHandle<Result<RecordedDecision, EngineError>>,
}

impl PendingDecision {
    /// Abort the decision. No-op once it has been finalized and recorded.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<RecordedDecision, EngineError> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(EngineError::Cancelled),
            Err(err) => Err(EngineError::TaskFailed(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use proptest::prelude::*;
    use putaway_ai::{ScriptedReasoningService, ScriptedReply, ServiceError};
    use putaway_warehouse::{
        Attribute, Capability, Category, TemperatureLabel, TemperatureRequirement, TurnoverClass, WarningSeverity,
        ZoneTable,
    };

    fn engine(service: Option<Arc<ScriptedReasoningService>>) -> DecisionOrchestrator {
        let catalog = ZoneCatalog::new(ZoneTable::standard()).unwrap();
        let client = service.map(|s| ReasoningServiceClient::new(s));
        DecisionOrchestrator::new(catalog, client, AuditRecorder::in_memory())
    }

    fn laptop() -> ItemSubmission {
        ItemSubmission::new("SKU-1", "Laptop", Category::Electronics, 3.0).with_turnover(TurnoverClass::High)
    }

    #[tokio::test(start_paused = true)]
    async fn validation_errors_record_nothing() {
        let engine = engine(None);
        let err = engine
            .decide(ItemSubmission::new("SKU-1", "Laptop", Category::Electronics, -1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert!(engine.audit().entries().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn single_candidate_skips_reasoning() {
        let service = Arc::new(ScriptedReasoningService::repeating(ScriptedReply::answer("A", 0.9, "x")));
        let engine = engine(Some(service.clone()));

        let recorded = engine
            .decide(ItemSubmission::new("M-1", "Motor", Category::Machinery, 800.0))
            .await
            .unwrap();

        assert_eq!(recorded.decision.zone.as_ref().unwrap().as_str(), "E");
        assert_eq!(recorded.decision.source, DecisionSource::Rule);
        assert_eq!(recorded.decision.confidence, 1.0);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn request_carries_candidates_and_advisories() {
        let service = Arc::new(ScriptedReasoningService::new(vec![ScriptedReply::answer("D", 0.85, "fast pick")]));
        let engine = engine(Some(service.clone()));

        let recorded = engine.decide(laptop()).await.unwrap();

        assert_eq!(recorded.decision.source, DecisionSource::Ai);
        let requests = service.requests();
        let ids: Vec<&str> = requests[0].candidate_zones.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(requests[0].advisory_constraints[0].kind, "turnover");
        assert_eq!(requests[0].advisory_constraints[0].preferred_zones, vec!["D".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn service_failure_falls_back_with_cause() {
        let service = Arc::new(ScriptedReasoningService::repeating(ScriptedReply::Fail(ServiceError::unavailable(
            "connection refused",
        ))));
        let engine = engine(Some(service.clone()));

        let recorded = engine.decide(laptop()).await.unwrap();

        assert_eq!(recorded.decision.source, DecisionSource::Fallback);
        assert_eq!(recorded.decision.zone.as_ref().unwrap().as_str(), "D");
        assert!(recorded.decision.reasoning.contains("connection refused"));
        assert_eq!(service.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_reasoning_uses_fallback_directly() {
        let engine = engine(None);

        let recorded = engine
            .decide(ItemSubmission::new("C-1", "Engine block", Category::Automotive, 180.0))
            .await
            .unwrap();

        assert_eq!(recorded.decision.source, DecisionSource::Fallback);
        assert_eq!(recorded.decision.zone.as_ref().unwrap().as_str(), "A");
        assert!(recorded.decision.reasoning.contains("reasoning service disabled"));
    }

    #[tokio::test(start_paused = true)]
    async fn category_conflict_is_attached_to_recorded_decision() {
        let engine = engine(None);

        let recorded = engine
            .decide(
                ItemSubmission::new("FRZ-2", "Ice Cream", Category::FrozenFood, 20.0)
                    .with_temperature(TemperatureRequirement::Label(TemperatureLabel::Ambient)),
            )
            .await
            .unwrap();

        let warnings = &recorded.decision.warnings;
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].attribute, Attribute::Temperature);
        assert_eq!(warnings[0].severity, WarningSeverity::Critical);
        assert!(recorded.decision.zone.is_some());

        let stored = engine.audit().get(recorded.entry_id).unwrap().unwrap();
        assert_eq!(stored.as_decision().unwrap().warnings, *warnings);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_zones_list_reasons() {
        let engine = engine(None);

        let recorded = engine
            .decide(ItemSubmission::new("CH-1", "Solvent", Category::Chemical, 20.0))
            .await
            .unwrap();

        let rejected: Vec<&str> = recorded.decision.rejected.iter().map(|r| r.zone.as_str()).collect();
        assert_eq!(rejected, vec!["A", "B", "D", "E"]);
        assert!(recorded.decision.rejected.iter().all(|r| !r.reasons.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_decision_records_nothing() {
        let service = Arc::new(ScriptedReasoningService::repeating(ScriptedReply::Stall));
        let engine = engine(Some(service.clone()));

        let pending = engine.spawn_decision(laptop()).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        pending.cancel();

        assert!(matches!(pending.wait().await, Err(EngineError::Cancelled)));
        assert!(engine.audit().entries().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_finalization_is_a_no_op() {
        let engine = engine(None);

        let pending = engine.spawn_decision(laptop()).unwrap();
        while !pending.is_finished() {
            tokio::task::yield_now().await;
        }
        pending.cancel();

        let recorded = pending.wait().await.unwrap();
        assert_eq!(engine.audit().entries().unwrap()[0].entry_id, recorded.entry_id);
    }

    #[tokio::test(start_paused = true)]
    async fn override_records_violations_but_is_accepted() {
        let engine = engine(None);
        let recorded = engine
            .decide(ItemSubmission::new("CH-1", "Solvent", Category::Chemical, 20.0))
            .await
            .unwrap();

        let entry = engine
            .override_decision(recorded.entry_id, ZoneId::new("A").unwrap(), "alice", "hazmat area full")
            .unwrap();

        let record = entry.as_override().unwrap();
        assert!(record.violations.iter().any(|v| v.starts_with("hazmat")));
        assert_eq!(
            engine.audit().effective_zone(recorded.decision.id).unwrap(),
            Some(ZoneId::new("A").unwrap())
        );
        assert_eq!(engine.audit().entries().unwrap()[0].as_decision(), Some(&recorded.decision));
    }

    #[tokio::test(start_paused = true)]
    async fn override_rejects_unknown_zone_and_entry() {
        let engine = engine(None);
        let recorded = engine.decide(laptop()).await.unwrap();

        let err = engine
            .override_decision(recorded.entry_id, ZoneId::new("Z").unwrap(), "alice", "")
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = engine
            .override_decision(AuditEntryId::new(), ZoneId::new("A").unwrap(), "alice", "")
            .unwrap_err();
        assert!(matches!(err, EngineError::EntryNotFound(_)));
    }

    fn arb_category() -> impl Strategy<Value = Category> {
        proptest::sample::select(Category::ALL.to_vec())
    }

    fn arb_submission() -> impl Strategy<Value = ItemSubmission> {
        (
            arb_category(),
            1.0f64..3000.0,
            proptest::option::of(any::<bool>()),
            proptest::option::of((-30.0f64..30.0, 0.0f64..20.0)),
            proptest::option::of(proptest::sample::select(vec![
                TurnoverClass::High,
                TurnoverClass::Medium,
                TurnoverClass::Low,
            ])),
        )
            .prop_map(|(category, weight, hazmat, temp, turnover)| {
                let mut s = ItemSubmission::new("P-1", "Generated", category, weight);
                if let Some(h) = hazmat {
                    s = s.with_hazmat(h);
                }
                if let Some((min, span)) = temp {
                    s = s.with_temperature(TemperatureRequirement::Range([min, min + span]));
                }
                if let Some(t) = turnover {
                    s = s.with_turnover(t);
                }
                s
            })
    }

    fn arb_reply() -> impl Strategy<Value = ScriptedReply> {
        prop_oneof![
            proptest::sample::select(vec!["A", "B", "C", "D", "E", "Z"])
                .prop_map(|z| ScriptedReply::answer(z, 0.7, "generated")),
            Just(ScriptedReply::Fail(ServiceError::unavailable("down"))),
            Just(ScriptedReply::Fail(ServiceError::malformed("garbage"))),
            Just(ScriptedReply::Stall),
        ]
    }

    fn run<F: std::future::Future>(fut: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
            .block_on(fut)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            .. ProptestConfig::default()
        })]

        #[test]
        fn finalized_zone_honours_safety_envelope(submission in arb_submission(), replies in proptest::collection::vec(arb_reply(), 0..4)) {
            let service = Arc::new(ScriptedReasoningService::new(replies));
            let engine = engine(Some(service));
            let draft = submission.validate().unwrap();
            let item = CategoryRuleResolver::default().resolve(&draft).item;

            let decision = run(engine.evaluate(draft));

            prop_assert!((0.0..=1.0).contains(&decision.confidence));
            if let Some(zone_id) = &decision.zone {
                let zone = engine.catalog().get(zone_id).unwrap();
                prop_assert!(zone.max_weight_kg >= item.weight_kg());
                if item.is_hazmat() {
                    prop_assert!(zone.has(Capability::FireSafe));
                }
                if let Some(required) = item.temperature() {
                    prop_assert!(zone.temperature.contains(required));
                }
            } else {
                prop_assert_eq!(decision.source, DecisionSource::Fallback);
                prop_assert_eq!(decision.confidence, 0.0);
            }
        }
    }
}
