use serde::{Deserialize, Serialize};

/// Identifier assigned to a prescription by the record-keeping system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrescriptionId(pub String);

/// Medication about to be prescribed. `id` is set when the record already exists,
/// e.g. when an existing prescription is re-saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionCandidate {
    #[serde(default)]
    pub id: Option<PrescriptionId>,
    pub medication_name: String,
}

impl PrescriptionCandidate {
    pub fn new(medication_name: impl Into<String>) -> Self {
        Self {
            id: None,
            medication_name: medication_name.into(),
        }
    }
}

/// One of the patient's existing prescriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePrescription {
    #[serde(default)]
    pub id: Option<PrescriptionId>,
    pub medication_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ActivePrescription {
    pub fn active(medication_name: impl Into<String>) -> Self {
        Self {
            id: None,
            medication_name: medication_name.into(),
            is_active: true,
        }
    }

    pub fn inactive(medication_name: impl Into<String>) -> Self {
        Self {
            is_active: false,
            ..Self::active(medication_name)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(PrescriptionId(id.into()));
        self
    }
}

/// Advisory flag attached to a prescription. The message is non-empty exactly
/// when the alert is raised.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SafetyAlert {
    has_alert: bool,
    message: String,
    matches: Vec<String>,
}

impl SafetyAlert {
    pub fn clear() -> Self {
        Self::default()
    }

    pub(crate) fn raised(message: String, matches: Vec<String>) -> Self {
        debug_assert!(!message.is_empty());
        Self {
            has_alert: true,
            message,
            matches,
        }
    }

    pub fn has_alert(&self) -> bool {
        self.has_alert
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The matched allergy, or the conflicting prescriptions, behind the alert.
    pub fn matches(&self) -> &[String] {
        &self.matches
    }

    /// Message as stored on the prescription record, `None` when clear.
    pub fn stored_message(&self) -> Option<&str> {
        self.has_alert.then_some(self.message.as_str())
    }
}

/// Both independent checks run for a new prescription.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PrescriptionAlerts {
    pub allergy: SafetyAlert,
    pub conflict: SafetyAlert,
}

impl PrescriptionAlerts {
    pub fn any(&self) -> bool {
        self.allergy.has_alert() || self.conflict.has_alert()
    }

    /// Raised alert messages in display order: allergy first, then conflict.
    pub fn messages(&self) -> Vec<&str> {
        [&self.allergy, &self.conflict]
            .into_iter()
            .filter_map(SafetyAlert::stored_message)
            .collect()
    }
}
