//! Entrypoint request and response types.

use serde::{Deserialize, Serialize};

use healthplan_analyze::HealthAnalysis;
use healthplan_core::HealthRecord;
use healthplan_goals::{GoalSuggestion, UserProfile};
use healthplan_limits::RateStatus;
use healthplan_nutrition::WeekPlan;

pub use healthplan_extract::ExtractionRequest;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub record: HealthRecord,
    #[serde(rename = "usedFallback")]
    pub used_fallback: bool,
    #[serde(rename = "fallbackReason", skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// Values discarded by validation.
    pub warnings: Vec<String>,
    #[serde(rename = "documentFingerprint")]
    pub document_fingerprint: String,
    #[serde(rename = "rateLimit")]
    pub rate_limit: RateStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalRequest {
    #[serde(default, rename = "healthRecords")]
    pub health_records: Vec<HealthRecord>,
    #[serde(default, rename = "userProfile")]
    pub user_profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub suggestion: GoalSuggestion,
    #[serde(rename = "healthAnalysis")]
    pub health_analysis: HealthAnalysis,
    #[serde(rename = "documentsAnalyzed")]
    pub documents_analyzed: usize,
    #[serde(rename = "usedFallback")]
    pub used_fallback: bool,
    #[serde(rename = "fallbackReason", skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(rename = "rateLimit")]
    pub rate_limit: RateStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregationRequest {
    #[serde(default, rename = "weekMeals")]
    pub week_meals: WeekPlan,
    #[serde(default)]
    pub goal: Option<GoalSuggestion>,
}
