//! `HealthPlanner`: threads each request through the pipeline stages.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};

use healthplan_analyze::RuleEngine;
use healthplan_core::{Error, HealthPlanConfig, HealthRecord, Outcome, Result};
use healthplan_extract::{
    document_fingerprint, validate_record, ExtractionRequest, ExtractionRequester,
    PatternExtractor,
};
use healthplan_generate::TextGenerator;
use healthplan_goals::{synthesize_goal, GoalRequester};
use healthplan_limits::{Action, RateLimiter};
use healthplan_nutrition::{aggregate_week, WeeklyNutritionSummary};

use crate::types::{AggregationRequest, ExtractionResponse, GoalRequest, GoalResponse};

/// Caller-facing pipeline. Stateless apart from the injected rate limiter.
pub struct HealthPlanner {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    limiter: Arc<RateLimiter>,
    patterns: PatternExtractor,
}

impl HealthPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>, config: &HealthPlanConfig) -> Self {
        Self {
            generator,
            timeout: config.generation_timeout(),
            limiter: Arc::new(RateLimiter::new(config.rate_limits)),
            patterns: PatternExtractor::new(),
        }
    }

    /// Share a limiter across planners.
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Extraction entrypoint: document text in, validated record out.
    ///
    /// Fails only on missing input or an exhausted upload quota. Any
    /// generation failure falls back to pattern extraction.
    pub async fn extract_document(
        &self,
        user_id: &str,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("extract", request_id = %request_id, user = %user_id);

        async {
            request.validate()?;
            let rate_limit = self.limiter.check(user_id, Action::DocumentUpload)?;

            let requester = ExtractionRequester::new(self.generator.as_ref(), self.timeout);
            let outcome = Outcome::resolve(requester.extract(request).await, |e| {
                warn!("Extraction fell back to pattern matching: {}", e);
                self.patterns.extract(&request.document_text)
            });
            let used_fallback = outcome.used_fallback();
            let fallback_reason = outcome.fallback_reason().map(str::to_string);
            let candidate = outcome.into_result()?;

            let validated = validate_record(candidate);
            let warnings = validated.warnings();
            info!(
                "Extracted {} metrics (fallback: {}, rejected: {})",
                validated.record.metrics.count_present(),
                used_fallback,
                warnings.len()
            );

            Ok::<_, Error>(ExtractionResponse {
                request_id: request_id.clone(),
                record: validated.record,
                used_fallback,
                fallback_reason,
                warnings,
                document_fingerprint: document_fingerprint(&request.document_text),
                rate_limit,
            })
        }
        .instrument(span)
        .await
    }

    /// Goal-suggestion entrypoint over one or more stored records.
    ///
    /// Records are re-validated before analysis. A failed or unusable
    /// suggestion falls back to rule-based synthesis.
    pub async fn suggest_goal(&self, user_id: &str, request: &GoalRequest) -> Result<GoalResponse> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("suggest", request_id = %request_id, user = %user_id);

        async {
            if request.health_records.is_empty() {
                return Err(Error::InputMissing("healthRecords".into()));
            }
            let rate_limit = self.limiter.check(user_id, Action::Generation)?;

            let records: Vec<HealthRecord> = request
                .health_records
                .iter()
                .cloned()
                .map(|record| validate_record(record).record)
                .collect();
            let profile = request.user_profile.as_ref();
            let analysis = RuleEngine::new()
                .with_sex(profile.and_then(|p| p.sex()))
                .analyze(&records);

            let requester = GoalRequester::new(self.generator.as_ref(), self.timeout);
            let result = requester.suggest(&records, &analysis, profile).await;
            let outcome = Outcome::resolve(result, |e| {
                warn!("Goal suggestion fell back to rule-based synthesis: {}", e);
                synthesize_goal(&records, &analysis)
            });
            let used_fallback = outcome.used_fallback();
            let fallback_reason = outcome.fallback_reason().map(str::to_string);
            let suggestion = outcome.into_result()?;

            info!(
                "Suggested {} goal from {} documents (fallback: {}, confidence {})",
                suggestion.goal_type,
                records.len(),
                used_fallback,
                suggestion.confidence
            );

            Ok(GoalResponse {
                request_id: request_id.clone(),
                suggestion,
                health_analysis: analysis,
                documents_analyzed: records.len(),
                used_fallback,
                fallback_reason,
                rate_limit,
            })
        }
        .instrument(span)
        .await
    }

    /// Nutrition-aggregation entrypoint. Pure; not rate limited.
    pub fn aggregate_week(&self, request: &AggregationRequest) -> WeeklyNutritionSummary {
        aggregate_week(&request.week_meals, request.goal.as_ref())
    }
}
