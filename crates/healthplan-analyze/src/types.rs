//! Analysis output types.

use healthplan_core::MetricKind;
use serde::{Deserialize, Serialize};

/// Classification of one metric value against its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Optimal,
    Normal,
    Elevated,
    Low,
    Concerning,
}

impl std::fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Normal => write!(f, "normal"),
            Self::Elevated => write!(f, "elevated"),
            Self::Low => write!(f, "low"),
            Self::Concerning => write!(f, "concerning"),
        }
    }
}

/// One classified metric from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricAssessment {
    pub metric: MetricKind,
    pub value: f64,
    pub status: MetricStatus,
    #[serde(rename = "documentIndex")]
    pub document_index: usize,
}

/// Aggregated findings across one or more health records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthAnalysis {
    pub concerns: Vec<String>,
    pub positives: Vec<String>,
    #[serde(rename = "recommendedRestrictions")]
    pub recommended_restrictions: Vec<String>,
    #[serde(rename = "avoidIngredients")]
    pub avoid_ingredients: Vec<String>,
    #[serde(rename = "recommendIngredients")]
    pub recommend_ingredients: Vec<String>,
    #[serde(rename = "macroModifications")]
    pub macro_modifications: Vec<String>,
    #[serde(rename = "supplementSuggestions")]
    pub supplement_suggestions: Vec<String>,
    #[serde(rename = "reasoningPoints")]
    pub reasoning_points: Vec<String>,
    pub assessments: Vec<MetricAssessment>,
}

impl HealthAnalysis {
    pub fn has_findings(&self) -> bool {
        !self.concerns.is_empty() || !self.recommended_restrictions.is_empty()
    }
}
