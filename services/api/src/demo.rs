use crate::commands::{render_alerts, render_assessment, render_importance};
use chrono::{Local, NaiveDate};
use clap::Args;
use emr_core::clinical::risk::{InMemoryModelStore, TrainingPolicy};
use emr_core::clinical::{
    ActivePrescription, ClinicalDecisionService, PatientChart, PatientFeatures,
    PrescriptionCandidate, SafetyCheckEngine, SafetyCheckRequest, VisitVitals,
};
use emr_core::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Assessment date (YYYY-MM-DD) for the sample patient's age. Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Medication to run through the safety review.
    #[arg(long, default_value = "Warfarin 5mg")]
    pub(crate) medication: String,
    /// Skip the prescription review portion of the demo.
    #[arg(long)]
    pub(crate) skip_safety: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        medication,
        skip_safety,
    } = args;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());

    // In-memory store so the demo never touches the persisted model.
    let service = ClinicalDecisionService::new(
        Arc::new(InMemoryModelStore::default()),
        TrainingPolicy::Allowed,
        SafetyCheckEngine::default(),
    );

    println!("Clinical decision support demo");
    let chart = demo_chart();
    let vitals = VisitVitals {
        systolic_bp: Some(148),
        diastolic_bp: Some(94),
    };
    let features = PatientFeatures::from_records(&chart, Some(&vitals), as_of)?;
    println!(
        "Sample patient as of {as_of}: age {} | BMI {:.2} | BP {}/{} | family history: {}",
        features.age,
        features.bmi,
        features.systolic_bp,
        features.diastolic_bp,
        if features.has_family_history { "yes" } else { "no" }
    );

    let summary = service.retrain()?;
    println!(
        "\nModel {} fitted on {} synthetic patients ({:.1}% training accuracy)",
        summary.version,
        summary.training_samples,
        summary.training_accuracy * 100.0
    );

    println!();
    render_assessment(&service.assess_risk(&features)?);

    println!();
    render_importance(&service.feature_importance()?);

    if skip_safety {
        return Ok(());
    }

    let request = SafetyCheckRequest {
        candidate: PrescriptionCandidate::new(medication),
        allergies: chart.allergies.clone(),
        prescriptions: vec![
            ActivePrescription::active("Metformin 500mg").with_id("rx-1"),
            ActivePrescription::active("Aspirin 81mg").with_id("rx-2"),
            ActivePrescription::inactive("Ibuprofen 400mg").with_id("rx-3"),
        ],
    };
    println!();
    render_alerts(
        &request.candidate.medication_name,
        &service.review_prescription(&request),
    );

    Ok(())
}

fn demo_chart() -> PatientChart {
    PatientChart {
        date_of_birth: NaiveDate::from_ymd_opt(1962, 4, 18).unwrap_or(NaiveDate::MIN),
        height_cm: Some(172.0),
        weight_kg: Some(94.5),
        family_history: Some("Father: type 2 diabetes; mother: hypertension".to_string()),
        allergies: Some("penicillin, sulfa".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_without_touching_disk() {
        let args = DemoArgs {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 15),
            medication: "Warfarin 5mg".to_string(),
            skip_safety: false,
        };

        run_demo(args).expect("demo completes");
    }

    #[test]
    fn demo_chart_yields_complete_features() {
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        let vitals = VisitVitals {
            systolic_bp: Some(148),
            diastolic_bp: Some(94),
        };

        let features =
            PatientFeatures::from_records(&demo_chart(), Some(&vitals), as_of).expect("features");

        assert_eq!(features.age, 62);
        assert!(features.has_family_history);
        assert!((features.bmi - 31.94).abs() < 1e-9);
    }
}
