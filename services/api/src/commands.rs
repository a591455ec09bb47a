use crate::infra::disk_backed_service;
use clap::Args;
use emr_core::clinical::{
    ActivePrescription, PatientFeatures, PrescriptionAlerts, PrescriptionCandidate,
    RiskAssessment, SafetyAlert, SafetyCheckEngine,
};
use emr_core::config::AppConfig;
use emr_core::error::AppError;
use std::collections::BTreeMap;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Age in completed years
    #[arg(long)]
    pub(crate) age: u32,
    /// Body-mass index (kg/m^2)
    #[arg(long)]
    pub(crate) bmi: f64,
    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    pub(crate) systolic: i32,
    /// Diastolic blood pressure (mmHg)
    #[arg(long)]
    pub(crate) diastolic: i32,
    /// A first-degree relative has diabetes
    #[arg(long)]
    pub(crate) family_history: bool,
}

impl PredictArgs {
    pub(crate) fn features(&self) -> PatientFeatures {
        PatientFeatures {
            age: self.age,
            bmi: self.bmi,
            systolic_bp: self.systolic,
            diastolic_bp: self.diastolic,
            has_family_history: self.family_history,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct SafetyCheckArgs {
    /// Name of the medication being prescribed
    #[arg(long)]
    pub(crate) medication: String,
    /// Comma-separated allergy list from the patient chart
    #[arg(long)]
    pub(crate) allergies: Option<String>,
    /// An active prescription the patient already takes (repeatable)
    #[arg(long = "current")]
    pub(crate) current: Vec<String>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = disk_backed_service(&config.model);

    let assessment = service.assess_risk(&args.features())?;
    render_assessment(&assessment);
    Ok(())
}

pub(crate) fn run_train() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = disk_backed_service(&config.model);

    let summary = service.retrain()?;
    println!("Risk model {} trained", summary.version);
    println!(
        "- {} samples | {} iterations | {:.1}% training accuracy",
        summary.training_samples,
        summary.iterations,
        summary.training_accuracy * 100.0
    );
    println!("- persisted to {}", config.model.path.display());
    Ok(())
}

pub(crate) fn run_importance() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = disk_backed_service(&config.model);

    let importance = service.feature_importance()?;
    render_importance(&importance);
    Ok(())
}

pub(crate) fn run_safety_check(args: SafetyCheckArgs) -> Result<(), AppError> {
    let candidate = PrescriptionCandidate::new(args.medication);
    let prescriptions: Vec<ActivePrescription> = args
        .current
        .into_iter()
        .map(ActivePrescription::active)
        .collect();

    let alerts =
        SafetyCheckEngine::default().review(&candidate, args.allergies.as_deref(), &prescriptions);
    render_alerts(&candidate.medication_name, &alerts);
    Ok(())
}

pub(crate) fn render_assessment(assessment: &RiskAssessment) {
    println!(
        "Risk tier: {} (score {:.2}, model {})",
        assessment.risk_tier.label(),
        assessment.risk_score,
        assessment.model_version
    );
    println!("{}", assessment.recommendation_text);
}

pub(crate) fn render_importance(importance: &BTreeMap<String, f64>) {
    println!("Feature importance (standardized coefficients)");
    let mut ranked: Vec<_> = importance.iter().collect();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    for (name, coefficient) in ranked {
        println!("  - {name}: {coefficient:+.4}");
    }
}

pub(crate) fn render_alerts(medication: &str, alerts: &PrescriptionAlerts) {
    println!("Safety check for {medication}");
    render_alert("Allergy", &alerts.allergy);
    render_alert("Drug conflict", &alerts.conflict);
}

fn render_alert(label: &str, alert: &SafetyAlert) {
    if alert.has_alert() {
        println!("  {label}: {}", alert.message());
    } else {
        println!("  {label}: none");
    }
}
