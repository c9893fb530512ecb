//! Natural-language explanation generation
//!
//! Turns an attribution and a coverage analysis into categorized, ranked
//! reason lists via fixed template sentences. Deterministic: identical
//! inputs always produce identical explanations.

use super::attribution::Attribution;
use super::ExplanationConfig;
use crate::analysis::CoverageAnalysis;
use crate::catalog::RiskSet;
use serde::Serialize;

/// Confidence classification of a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfidenceLevel {
    /// At or above the primary threshold.
    High,
    /// Between the alternate and primary thresholds.
    Medium,
    /// Below the alternate threshold.
    Low,
}

impl ConfidenceLevel {
    pub fn classify(score: f64, config: &ExplanationConfig) -> ConfidenceLevel {
        if score >= config.primary_threshold {
            ConfidenceLevel::High
        } else if score >= config.alternate_threshold {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Structured explanation for one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub primary_reasons: Vec<String>,
    pub supporting_factors: Vec<String>,
    pub concerns: Vec<String>,
}

/// Generate the explanation for one candidate.
///
/// The top `top_n_reasons` positive contributions become primary reasons,
/// the remaining material positives become supporting factors, and material
/// negatives become concerns. `fills_gaps` lists coverage gaps this
/// candidate closes; unfilled gaps in `coverage` surface as concerns.
pub fn generate(
    attribution: &Attribution,
    coverage: &CoverageAnalysis,
    fills_gaps: &RiskSet,
    config: &ExplanationConfig,
) -> Explanation {
    let mut primary_reasons = Vec::new();
    let mut supporting_factors = Vec::new();
    let mut concerns = Vec::new();

    let positives: Vec<_> = attribution
        .positive_factors()
        .filter(|c| c.contribution >= config.materiality)
        .collect();

    for (rank, entry) in positives.iter().enumerate() {
        let sentence = positive_sentence(&entry.feature);
        if rank < config.top_n_reasons {
            primary_reasons.push(sentence);
        } else {
            supporting_factors.push(sentence);
        }
    }

    if !fills_gaps.is_empty() {
        primary_reasons.push(format!(
            "Fills coverage gap: {}",
            risk_names(fills_gaps)
        ));
    }

    for entry in attribution.negative_factors() {
        if entry.contribution <= -config.materiality {
            concerns.push(concern_sentence(&entry.feature));
        }
    }

    if !coverage.gaps.is_empty() {
        concerns.push(format!(
            "Coverage gaps remain: {}",
            risk_names(&coverage.gaps)
        ));
    }

    Explanation {
        confidence: attribution.final_score,
        confidence_level: ConfidenceLevel::classify(attribution.final_score, config),
        primary_reasons,
        supporting_factors,
        concerns,
    }
}

fn risk_names(risks: &RiskSet) -> String {
    risks
        .iter()
        .map(|r| r.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Template sentence for a feature pushing the score up.
fn positive_sentence(label: &str) -> String {
    match label {
        "goal_alignment" => "Matches the stated insurance goal".to_string(),
        "age_fit" => "Age sits well within the product's issue range".to_string(),
        "income_fit" => "Designed for this income bracket".to_string(),
        "employment_fit" => "Suitable for the declared employment type".to_string(),
        "medical_eligibility" => "Accepts the declared medical risk profile".to_string(),
        "semantic_similarity" => {
            "Strong semantic alignment between the profile and the product description".to_string()
        }
        "affordability" => "Estimated premium is comfortably affordable".to_string(),
        "trigger_match" => "The profile activates this rider's trigger conditions".to_string(),
        "medical_relevance" => "Medically relevant given the health profile".to_string(),
        "family_relevance" => "Provides important family protection benefits".to_string(),
        "dependents" => "Dependents in the household need protection".to_string(),
        "married" => "Provides coverage for the spouse".to_string(),
        "hazardous_job" => "The occupation involves hazardous work".to_string(),
        "hazardous_activities" => "Declared work activities carry elevated risk".to_string(),
        "any_medical" => "Medical history indicates need for additional coverage".to_string(),
        "age_above_40" => "Age-related health risks increase after 40".to_string(),
        "age_above_45" => "An important coverage milestone at this age".to_string(),
        "smoker" => "Smoking increases health risks significantly".to_string(),
        "chronic" => "Chronic conditions require ongoing coverage".to_string(),
        "cardio" => "Cardiovascular issues need specialized protection".to_string(),
        "cancer" => "Cancer history requires comprehensive coverage".to_string(),
        "bmi_high" => "Elevated BMI increases health risk factors".to_string(),
        "female_childbearing_age" => "Relevant for family planning at this age".to_string(),
        "group_policy" => "Available through the employer's group scheme".to_string(),
        "frequent_travel" => "Provides coverage for international travel".to_string(),
        "low_income" => "Affordable option for budget-conscious planning".to_string(),
        "high_income" => "Premium coverage suited to the income level".to_string(),
        "retirement_goal" => "Supports the stated retirement planning goal".to_string(),
        other => format!("{other} works in favour of this recommendation"),
    }
}

/// Template sentence for a feature dragging the score down.
fn concern_sentence(label: &str) -> String {
    match label {
        "medical_eligibility" => {
            "May require additional medical underwriting due to health conditions".to_string()
        }
        "affordability" => "Estimated premium may sit at the higher end of the budget".to_string(),
        "age_fit" => {
            "Age is outside the optimal range and may raise premiums or limit coverage".to_string()
        }
        "goal_alignment" => "Does not align closely with the stated goals".to_string(),
        "income_fit" => "Aimed at a different income bracket".to_string(),
        "employment_fit" => "Not designed for the declared employment type".to_string(),
        "trigger_match" => {
            "Few of this rider's trigger conditions apply to the profile".to_string()
        }
        "semantic_similarity" => {
            "Weak semantic match between the profile and the product description".to_string()
        }
        other => format!("{other} weighs against this recommendation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CoverageAnalysis;
    use crate::catalog::{Risk, RiskSet};
    use crate::explain::attribution::{Attribution, FeatureContribution};

    fn attribution(final_score: f64, contributions: &[(&str, f64)]) -> Attribution {
        Attribution {
            baseline: 0.5,
            final_score,
            contributions: contributions
                .iter()
                .map(|(feature, contribution)| FeatureContribution {
                    feature: feature.to_string(),
                    contribution: *contribution,
                })
                .collect(),
        }
    }

    fn no_gaps() -> CoverageAnalysis {
        let risks: RiskSet = [Risk::Death].into_iter().collect();
        CoverageAnalysis::new(risks.clone(), &risks)
    }

    #[test]
    fn test_confidence_thresholds() {
        let config = ExplanationConfig::default();
        assert_eq!(ConfidenceLevel::classify(0.7525, &config), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::classify(0.65, &config), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::classify(0.6499, &config), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::classify(0.45, &config), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::classify(0.4499, &config), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::classify(0.0, &config), ConfidenceLevel::Low);
    }

    #[test]
    fn test_top_n_split() {
        let config = ExplanationConfig::default();
        let attribution = attribution(
            0.75,
            &[
                ("goal_alignment", 0.15),
                ("semantic_similarity", 0.10),
                ("age_fit", 0.05),
                ("affordability", -0.05),
                ("income_fit", 0.001), // below materiality
            ],
        );

        let explanation = generate(&attribution, &no_gaps(), &RiskSet::new(), &config);

        assert_eq!(
            explanation.primary_reasons,
            vec![
                positive_sentence("goal_alignment"),
                positive_sentence("semantic_similarity"),
            ]
        );
        assert_eq!(
            explanation.supporting_factors,
            vec![positive_sentence("age_fit")]
        );
        assert_eq!(explanation.concerns, vec![concern_sentence("affordability")]);
    }

    #[test]
    fn test_gap_sentences() {
        let config = ExplanationConfig::default();
        let attribution = attribution(0.7, &[("trigger_match", 0.2)]);

        let user_risks: RiskSet = [Risk::Death, Risk::CriticalIllness].into_iter().collect();
        let covered: RiskSet = [Risk::Death].into_iter().collect();
        let coverage = CoverageAnalysis::new(user_risks, &covered);

        let fills: RiskSet = [Risk::CriticalIllness].into_iter().collect();
        let explanation = generate(&attribution, &coverage, &fills, &config);

        assert!(explanation
            .primary_reasons
            .iter()
            .any(|r| r.contains("Fills coverage gap")));
        assert!(explanation
            .concerns
            .iter()
            .any(|c| c.contains("Coverage gaps remain")));
    }

    #[test]
    fn test_generation_deterministic() {
        let config = ExplanationConfig::default();
        let attribution = attribution(
            0.6,
            &[("goal_alignment", 0.08), ("affordability", -0.04)],
        );
        let a = generate(&attribution, &no_gaps(), &RiskSet::new(), &config);
        let b = generate(&attribution, &no_gaps(), &RiskSet::new(), &config);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
