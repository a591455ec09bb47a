//! Clinical decision support run when a prescription or risk assessment is
//! recorded: diabetes risk scoring and prescription safety checks.

pub mod intake;
pub mod risk;
pub mod router;
pub mod safety;
pub mod service;

#[cfg(test)]
mod tests;

pub use intake::{IntakeError, PatientChart, VisitVitals};
pub use risk::{
    PatientFeatures, RiskAssessment, RiskModelError, RiskScorer, RiskTier, TrainedModel,
    TrainingPolicy,
};
pub use router::clinical_router;
pub use safety::{
    ActivePrescription, PrescriptionAlerts, PrescriptionCandidate, SafetyAlert, SafetyCheckEngine,
};
pub use service::{ClinicalDecisionService, ModelSummary, SafetyCheckRequest};
