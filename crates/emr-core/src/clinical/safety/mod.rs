//! Prescription safety checks.
//!
//! Matching is deliberately permissive: an allergy matches when either name
//! contains the other, and a conflict only looks from the new medication towards
//! the existing ones. Alerts are advisory and never block a prescription.

mod domain;
mod rules;

pub use domain::{
    ActivePrescription, PrescriptionAlerts, PrescriptionCandidate, PrescriptionId, SafetyAlert,
};
pub use rules::{ConflictRule, ConflictTable};

use tracing::warn;

/// Stateless checker applying the allergy and interaction rules.
#[derive(Debug, Clone, Default)]
pub struct SafetyCheckEngine {
    table: ConflictTable,
}

impl SafetyCheckEngine {
    pub fn new(table: ConflictTable) -> Self {
        Self { table }
    }

    pub fn conflict_table(&self) -> &ConflictTable {
        &self.table
    }

    /// Flags the first comma-separated allergy that overlaps the medication name.
    pub fn check_allergy_alert(
        &self,
        medication_name: &str,
        patient_allergies: Option<&str>,
    ) -> SafetyAlert {
        rules::allergy_alert(medication_name, patient_allergies)
    }

    /// Flags active prescriptions the medication is listed as conflicting with.
    /// Callers drop the candidate's own record from `others` beforehand;
    /// [`SafetyCheckEngine::review`] does that for them.
    pub fn check_conflicts(
        &self,
        medication_name: &str,
        others: &[ActivePrescription],
    ) -> SafetyAlert {
        rules::conflict_alert(&self.table, medication_name, others)
    }

    /// Runs both checks for a new prescription against the patient's profile.
    pub fn review(
        &self,
        candidate: &PrescriptionCandidate,
        patient_allergies: Option<&str>,
        prescriptions: &[ActivePrescription],
    ) -> PrescriptionAlerts {
        let others: Vec<ActivePrescription> = prescriptions
            .iter()
            .filter(|prescription| prescription.is_active)
            .filter(|prescription| {
                candidate.id.is_none() || prescription.id.as_ref() != candidate.id.as_ref()
            })
            .cloned()
            .collect();

        let alerts = PrescriptionAlerts {
            allergy: self.check_allergy_alert(&candidate.medication_name, patient_allergies),
            conflict: self.check_conflicts(&candidate.medication_name, &others),
        };

        for message in alerts.messages() {
            warn!(medication = %candidate.medication_name, "{message}");
        }

        alerts
    }
}
