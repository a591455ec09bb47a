use serde::{Deserialize, Serialize};

use super::recommendation::recommendation_for;

/// Number of inputs the classifier consumes.
pub const FEATURE_COUNT: usize = 5;

/// Display names of the model inputs, in column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Age",
    "BMI",
    "BP Systolic",
    "BP Diastolic",
    "Family History",
];

const MEDIUM_RISK_THRESHOLD: f64 = 0.4;
const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Health measurements scored by the risk model.
///
/// Values are taken as given; range checks belong to whoever collected them.
/// Extreme inputs produce extreme but finite scores since the model is linear in
/// the standardized features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    pub age: u32,
    pub bmi: f64,
    pub systolic_bp: i32,
    pub diastolic_bp: i32,
    pub has_family_history: bool,
}

impl PatientFeatures {
    pub fn as_row(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.age),
            self.bmi,
            f64::from(self.systolic_bp),
            f64::from(self.diastolic_bp),
            if self.has_family_history { 1.0 } else { 0.0 },
        ]
    }
}

/// Coarse bucketing of the predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            RiskTier::High
        } else if score >= MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        recommendation_for(*self)
    }
}

/// Scored result handed back to the record-keeping system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_tier: RiskTier,
    pub risk_score: f64,
    pub recommendation_text: String,
    pub model_version: String,
}

impl RiskAssessment {
    pub(crate) fn from_probability(probability: f64, model_version: &str) -> Self {
        let risk_score = round_score(probability);
        let risk_tier = RiskTier::from_score(risk_score);
        Self {
            risk_tier,
            risk_score,
            recommendation_text: risk_tier.recommendation().to_string(),
            model_version: model_version.to_string(),
        }
    }

    pub fn summary(&self) -> String {
        format!("{} ({:.4})", self.risk_tier.label(), self.risk_score)
    }
}

/// Rounds to the four decimal places stored alongside a prediction.
pub fn round_score(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 10_000.0
}
