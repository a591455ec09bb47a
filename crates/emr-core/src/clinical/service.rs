use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::risk::{
    ModelStore, PatientFeatures, RiskAssessment, RiskModelError, RiskScorer, TrainedModel,
    TrainingPolicy,
};
use super::safety::{
    ActivePrescription, PrescriptionAlerts, PrescriptionCandidate, SafetyCheckEngine,
};

/// Service composing the risk scorer and the prescription safety checks.
pub struct ClinicalDecisionService<S> {
    scorer: RiskScorer<S>,
    safety: SafetyCheckEngine,
}

impl<S> ClinicalDecisionService<S>
where
    S: ModelStore + 'static,
{
    pub fn new(store: Arc<S>, policy: TrainingPolicy, safety: SafetyCheckEngine) -> Self {
        Self {
            scorer: RiskScorer::with_policy(store, policy),
            safety,
        }
    }

    pub fn scorer(&self) -> &RiskScorer<S> {
        &self.scorer
    }

    pub fn safety(&self) -> &SafetyCheckEngine {
        &self.safety
    }

    pub fn assess_risk(
        &self,
        features: &PatientFeatures,
    ) -> Result<RiskAssessment, RiskModelError> {
        self.scorer.predict(features)
    }

    /// Retrain and persist, returning a summary of the installed model.
    pub fn retrain(&self) -> Result<ModelSummary, RiskModelError> {
        let model = self.scorer.train()?;
        Ok(ModelSummary::from(model.as_ref()))
    }

    pub fn feature_importance(&self) -> Result<BTreeMap<String, f64>, RiskModelError> {
        self.scorer.feature_importance()
    }

    pub fn review_prescription(&self, request: &SafetyCheckRequest) -> PrescriptionAlerts {
        self.safety.review(
            &request.candidate,
            request.allergies.as_deref(),
            &request.prescriptions,
        )
    }
}

/// Body for a prescription safety check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyCheckRequest {
    pub candidate: PrescriptionCandidate,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub prescriptions: Vec<ActivePrescription>,
}

/// Public description of an installed model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub version: String,
    pub training_accuracy: f64,
    pub training_samples: usize,
    pub iterations: usize,
}

impl From<&TrainedModel> for ModelSummary {
    fn from(model: &TrainedModel) -> Self {
        Self {
            version: model.version.clone(),
            training_accuracy: model.training_accuracy,
            training_samples: model.training_samples,
            iterations: model.iterations,
        }
    }
}
