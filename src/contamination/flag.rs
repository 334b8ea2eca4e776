use serde::{Deserialize, Serialize};

use crate::core::types::{ContaminationType, Severity};

/// A suspected contamination event for one ASV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContaminationFlag {
    pub asv_id: String,

    #[serde(rename = "type")]
    pub contamination_type: ContaminationType,

    pub severity: Severity,

    /// 0-100
    pub confidence: u8,

    pub reason: String,
    pub recommendation: String,
}

impl ContaminationFlag {
    pub fn new(
        asv_id: impl Into<String>,
        contamination_type: ContaminationType,
        severity: Severity,
        confidence: u8,
    ) -> Self {
        Self {
            asv_id: asv_id.into(),
            contamination_type,
            severity,
            confidence: confidence.min(100),
            reason: String::new(),
            recommendation: String::new(),
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    #[must_use]
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    /// Whether this flag is at or above `min_severity`
    #[must_use]
    pub fn is_at_least(&self, min_severity: Severity) -> bool {
        self.severity >= min_severity
    }
}
