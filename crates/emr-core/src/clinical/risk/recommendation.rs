use super::domain::RiskTier;

const HIGH_RISK_GUIDANCE: &str = "HIGH RISK RECOMMENDATIONS:
- Schedule immediate consultation with endocrinologist
- Regular blood glucose monitoring (fasting and post-meal)
- Adopt low-carb, high-fiber diet
- Engage in at least 150 minutes of moderate exercise per week
- Weight management program
- Regular follow-up every 3 months";

const MEDIUM_RISK_GUIDANCE: &str = "MEDIUM RISK RECOMMENDATIONS:
- Annual diabetes screening
- Maintain healthy diet with reduced sugar intake
- Regular physical activity (at least 30 minutes daily)
- Monitor weight and BMI
- Follow-up every 6 months";

const LOW_RISK_GUIDANCE: &str = "LOW RISK RECOMMENDATIONS:
- Continue healthy lifestyle habits
- Annual health check-up
- Maintain balanced diet and regular exercise
- Monitor any changes in health status";

/// Guidance text keyed only by tier.
pub fn recommendation_for(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => LOW_RISK_GUIDANCE,
        RiskTier::Medium => MEDIUM_RISK_GUIDANCE,
        RiskTier::High => HIGH_RISK_GUIDANCE,
    }
}
