//! Derives scoring inputs from the patient chart and latest visit.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::risk::PatientFeatures;

const FAMILY_HISTORY_MARKER: &str = "diabetes";

/// Chart fields the risk inputs are derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientChart {
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub family_history: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
}

/// Blood pressure captured at a visit; either reading may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisitVitals {
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("date of birth {0} is after the assessment date")]
    BornInFuture(NaiveDate),
    #[error("height and weight are required to compute BMI")]
    MissingBodyMeasurements,
    #[error("no visit with a recorded blood pressure")]
    MissingBloodPressure,
}

/// Completed years between `date_of_birth` and `on`.
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    if date_of_birth > on {
        return None;
    }
    let mut years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Body-mass index rounded to two decimals.
pub fn body_mass_index(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some((weight_kg / (height_m * height_m) * 100.0).round() / 100.0)
}

pub fn mentions_diabetes(family_history: Option<&str>) -> bool {
    family_history
        .map(|text| text.to_lowercase().contains(FAMILY_HISTORY_MARKER))
        .unwrap_or(false)
}

impl PatientChart {
    pub fn bmi(&self) -> Option<f64> {
        body_mass_index(self.height_cm?, self.weight_kg?)
    }
}

impl PatientFeatures {
    /// Builds scoring inputs the same way the prediction form pre-fills them.
    pub fn from_records(
        chart: &PatientChart,
        latest_visit: Option<&VisitVitals>,
        on: NaiveDate,
    ) -> Result<Self, IntakeError> {
        let age = age_on(chart.date_of_birth, on)
            .ok_or(IntakeError::BornInFuture(chart.date_of_birth))?;
        let bmi = chart.bmi().ok_or(IntakeError::MissingBodyMeasurements)?;
        let (systolic_bp, diastolic_bp) = latest_visit
            .and_then(|vitals| Some((vitals.systolic_bp?, vitals.diastolic_bp?)))
            .ok_or(IntakeError::MissingBloodPressure)?;

        Ok(Self {
            age,
            bmi,
            systolic_bp,
            diastolic_bp,
            has_family_history: mentions_diabetes(chart.family_history.as_deref()),
        })
    }
}
