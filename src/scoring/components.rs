//! Component-level scorers
//!
//! Each scorer returns a value in [0, 1] plus a labeled breakdown. Scorers
//! are pure, never fail on missing optional features, and degrade to the
//! neutral defaults documented on each check.

use super::{BreakdownPart, ScoreBreakdown};
use crate::catalog::{MedicalUnderwriting, PolicyDef, RiderDef};
use crate::error::RecommendError;
use crate::features::{FeatureVector, MedicalRisk};

// Internal rule weights for policies.
const W_AGE_FIT: f64 = 0.25;
const W_INCOME_FIT: f64 = 0.20;
const W_GOAL_ALIGNMENT: f64 = 0.35;
const W_EMPLOYMENT_FIT: f64 = 0.10;
const W_MEDICAL_ELIGIBILITY: f64 = 0.10;

// Internal rule weights for riders.
const W_TRIGGER_MATCH: f64 = 0.60;
const W_MEDICAL_RELEVANCE: f64 = 0.25;
const W_FAMILY_RELEVANCE: f64 = 0.15;

/// Affordability threshold: premium at this fraction of income scores zero.
pub const AFFORDABILITY_THRESHOLD: f64 = 0.15;

fn part(label: &str, weight: f64, score: f64) -> BreakdownPart {
    BreakdownPart {
        label: label.to_string(),
        weight,
        score,
    }
}

/// Rule-based score for a policy: weighted fit checks against the policy's
/// eligibility data.
pub fn rule_score_policy(fv: &FeatureVector, policy: &PolicyDef) -> ScoreBreakdown {
    // Age fit: full credit at the center of the issue-age range, up to a 30%
    // penalty at the edges, zero outside.
    let (min_age, max_age) = policy.age_range;
    let age_fit = if (min_age..=max_age).contains(&fv.age) {
        let half_width = (max_age - min_age) as f64 / 2.0;
        if half_width == 0.0 {
            1.0
        } else {
            let midpoint = (min_age + max_age) as f64 / 2.0;
            let distance = (fv.age as f64 - midpoint).abs();
            1.0 - (distance / half_width) * 0.3
        }
    } else {
        0.0
    };

    // Income fit: exact band 1.0, adjacent band 0.7, otherwise 0.3.
    let income_fit = if policy.income_bands.contains(&fv.income_band) {
        1.0
    } else {
        let user = fv.income_band.ordinal();
        let min_distance = policy
            .income_bands
            .iter()
            .map(|band| (band.ordinal() - user).abs())
            .min()
            .unwrap_or(2);
        if min_distance == 1 {
            0.7
        } else {
            0.3
        }
    };

    // Goal alignment: primary 1.0, secondary 0.5, none 0.1.
    let goal_alignment = if policy.goals.iter().any(|g| *g == fv.primary_goal) {
        1.0
    } else if fv
        .secondary_goal
        .as_ref()
        .is_some_and(|sg| policy.goals.iter().any(|g| g == sg))
    {
        0.5
    } else {
        0.1
    };

    // Employment fit: empty list accepts any.
    let employment_fit = if policy.employment_types.is_empty()
        || policy.employment_types.contains(&fv.employment_type)
    {
        1.0
    } else {
        0.2
    };

    let medical_eligibility = medical_eligibility_score(policy.medical_underwriting, fv.medical_risk);

    ScoreBreakdown::from_parts(vec![
        part("age_fit", W_AGE_FIT, age_fit),
        part("income_fit", W_INCOME_FIT, income_fit),
        part("goal_alignment", W_GOAL_ALIGNMENT, goal_alignment),
        part("employment_fit", W_EMPLOYMENT_FIT, employment_fit),
        part("medical_eligibility", W_MEDICAL_ELIGIBILITY, medical_eligibility),
    ])
}

fn medical_eligibility_score(underwriting: MedicalUnderwriting, risk: MedicalRisk) -> f64 {
    match underwriting {
        MedicalUnderwriting::LowRiskOnly => {
            if risk == MedicalRisk::Low {
                1.0
            } else {
                0.0
            }
        }
        MedicalUnderwriting::ExcludeVeryHigh => match risk {
            MedicalRisk::VeryHigh => 0.0,
            MedicalRisk::High => 0.5,
            _ => 1.0,
        },
        MedicalUnderwriting::Standard => match risk {
            MedicalRisk::Low => 1.0,
            MedicalRisk::Medium => 0.9,
            MedicalRisk::High => 0.7,
            MedicalRisk::VeryHigh => 0.5,
        },
    }
}

/// Rule-based score for a rider: trigger match plus medical/family relevance.
pub fn rule_score_rider(fv: &FeatureVector, rider: &RiderDef) -> ScoreBreakdown {
    let trigger_match = if rider.triggers.is_empty() {
        // No triggers means generally applicable
        0.5
    } else {
        rider
            .triggers
            .iter()
            .map(|t| t.satisfaction(fv))
            .sum::<f64>()
            / rider.triggers.len() as f64
    };

    let medical_relevance = if rider.health_related {
        if fv.any_medical || fv.age_above_40 {
            1.0
        } else {
            0.5
        }
    } else {
        0.8
    };

    let family_relevance = if rider.family_related {
        if fv.dependents || fv.married {
            1.0
        } else {
            0.3
        }
    } else {
        0.8
    };

    ScoreBreakdown::from_parts(vec![
        part("trigger_match", W_TRIGGER_MATCH, trigger_match),
        part("medical_relevance", W_MEDICAL_RELEVANCE, medical_relevance),
        part("family_relevance", W_FAMILY_RELEVANCE, family_relevance),
    ])
}

/// Trigger-strength score: arithmetic mean of the graded satisfaction of
/// every trigger condition on the rider. No triggers scores neutral 0.5.
pub fn trigger_strength_score(fv: &FeatureVector, rider: &RiderDef) -> ScoreBreakdown {
    if rider.triggers.is_empty() {
        return ScoreBreakdown::single("no_triggers", 0.5);
    }

    let weight = 1.0 / rider.triggers.len() as f64;
    let parts = rider
        .triggers
        .iter()
        .map(|t| part(t.label(), weight, t.satisfaction(fv)))
        .collect();

    ScoreBreakdown::from_parts(parts)
}

/// Affordability score: monotonically decreasing in premium / income,
/// reaching zero at `AFFORDABILITY_THRESHOLD`. Zero or unknown income
/// degrades to a zero score rather than failing.
pub fn financial_fit_score(monthly_income: f64, estimated_premium: f64) -> ScoreBreakdown {
    let score = if monthly_income > 0.0 && estimated_premium.is_finite() {
        let ratio = (estimated_premium.max(0.0)) / monthly_income;
        (1.0 - ratio / AFFORDABILITY_THRESHOLD).clamp(0.0, 1.0)
    } else {
        0.0
    };

    ScoreBreakdown::single("affordability", score)
}

/// Pass-through for the externally computed semantic similarity. The only
/// component that can fail: the collaborator's output must be in [0, 1].
pub fn similarity_score(similarity: f64) -> Result<ScoreBreakdown, RecommendError> {
    RecommendError::check_unit_range("similarity", similarity)?;
    Ok(ScoreBreakdown::single("semantic_similarity", similarity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::features::extract;
    use crate::profile::Profile;
    use approx::assert_relative_eq;

    fn fv(json: &str) -> FeatureVector {
        let profile: Profile = serde_json::from_str(json).unwrap();
        extract(&profile).unwrap()
    }

    fn family_fv() -> FeatureVector {
        fv(r#"{"age": 45, "monthly_income": 120000.0, "marital_status": "Married",
               "dependents_count": 2, "primary_goal": "Family protection"}"#)
    }

    #[test]
    fn test_policy_rule_score_centered_age() {
        let catalog = Catalog::builtin();
        let policy = catalog.policy("life_plus").unwrap();
        let breakdown = rule_score_policy(&family_fv(), policy);

        // age 45 vs range (18, 65): midpoint 41.5, half width 23.5
        let age_fit = 1.0 - (3.5 / 23.5) * 0.3;
        let expected = 0.25 * age_fit + 0.20 * 1.0 + 0.35 * 1.0 + 0.10 * 1.0 + 0.10 * 1.0;
        assert_relative_eq!(breakdown.value, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_policy_rule_score_out_of_range_age() {
        let catalog = Catalog::builtin();
        let policy = catalog.policy("click_life").unwrap(); // ages 18..=40
        let breakdown = rule_score_policy(&family_fv(), policy);

        let age_part = breakdown
            .parts
            .iter()
            .find(|p| p.label == "age_fit")
            .unwrap();
        assert_relative_eq!(age_part.score, 0.0);
    }

    #[test]
    fn test_secondary_goal_half_credit() {
        let catalog = Catalog::builtin();
        let policy = catalog.policy("flex_life").unwrap();
        let fv = fv(
            r#"{"age": 35, "monthly_income": 200000.0, "primary_goal": "Family protection",
                "secondary_goal": "Savings"}"#,
        );

        let breakdown = rule_score_policy(&fv, policy);
        let goal = breakdown
            .parts
            .iter()
            .find(|p| p.label == "goal_alignment")
            .unwrap();
        assert_relative_eq!(goal.score, 0.5);
    }

    #[test]
    fn test_rider_rule_score_all_relevant() {
        let catalog = Catalog::builtin();
        let rider = catalog.rider("child_health").unwrap();
        let breakdown = rule_score_rider(&family_fv(), rider);

        // Single trigger (dependents) fully satisfied; health rider with
        // age_above_40; family rider with dependents.
        assert_relative_eq!(breakdown.value, 0.6 * 1.0 + 0.25 * 1.0 + 0.15 * 1.0);
    }

    #[test]
    fn test_trigger_strength_mean_aggregation() {
        let catalog = Catalog::builtin();
        let rider = catalog.rider("critical_illness").unwrap();
        // Triggers: cardio, smoker, bmi_high, age_above_40. Age 45 satisfies
        // one of four fully.
        let breakdown = trigger_strength_score(&family_fv(), rider);
        assert_relative_eq!(breakdown.value, 0.25, epsilon = 1e-12);
        assert_eq!(breakdown.parts.len(), 4);
    }

    #[test]
    fn test_financial_fit_monotone_curve() {
        // 5% of income -> 1 - 0.05/0.15 = 2/3
        let breakdown = financial_fit_score(100_000.0, 5_000.0);
        assert_relative_eq!(breakdown.value, 2.0 / 3.0, epsilon = 1e-12);

        // Free cover scores 1.0, threshold cover scores 0.0
        assert_relative_eq!(financial_fit_score(100_000.0, 0.0).value, 1.0);
        assert_relative_eq!(financial_fit_score(100_000.0, 15_000.0).value, 0.0);
        assert_relative_eq!(financial_fit_score(100_000.0, 50_000.0).value, 0.0);

        // Degraded input never raises
        assert_relative_eq!(financial_fit_score(0.0, 5_000.0).value, 0.0);
    }

    #[test]
    fn test_similarity_pass_through_validates() {
        assert_relative_eq!(similarity_score(0.8).unwrap().value, 0.8);
        assert!(similarity_score(1.2).is_err());
        assert!(similarity_score(-0.1).is_err());
        assert!(similarity_score(f64::NAN).is_err());
    }
}
