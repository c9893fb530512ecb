//! Weighted ensemble combination
//!
//! Fuses the component scores into a single confidence per candidate.
//! Weight sets are configuration, not code: the defaults below can be
//! replaced by caller-supplied sets validated by the same rules.

use super::components::{
    financial_fit_score, rule_score_policy, rule_score_rider, similarity_score,
    trigger_strength_score,
};
use super::premium::PremiumEstimator;
use super::{Component, ScoreBreakdown};
use crate::catalog::{PolicyDef, RiderDef};
use crate::error::RecommendError;
use crate::features::FeatureVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance for the weights-sum-to-one check.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Ordered component -> weight mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSet(BTreeMap<Component, f64>);

impl WeightSet {
    /// Default weights for base policies.
    pub fn policy_default() -> WeightSet {
        WeightSet(BTreeMap::from([
            (Component::Rule, 0.35),
            (Component::Nlp, 0.35),
            (Component::Financial, 0.30),
        ]))
    }

    /// Default weights for riders.
    pub fn rider_default() -> WeightSet {
        WeightSet(BTreeMap::from([
            (Component::Rule, 0.30),
            (Component::Nlp, 0.35),
            (Component::Trigger, 0.25),
            (Component::Financial, 0.10),
        ]))
    }

    pub fn from_pairs(pairs: &[(Component, f64)]) -> WeightSet {
        WeightSet(pairs.iter().copied().collect())
    }

    pub fn get(&self, component: Component) -> Option<f64> {
        self.0.get(&component).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, f64)> + '_ {
        self.0.iter().map(|(c, w)| (*c, *w))
    }

    /// Weights must be finite, non-negative, and sum to 1 within epsilon.
    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.0.is_empty() {
            return Err(RecommendError::InvalidWeights("empty weight set".to_string()));
        }
        for (component, weight) in &self.0 {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(RecommendError::InvalidWeights(format!(
                    "weight '{}' = {weight}",
                    component.label()
                )));
            }
        }
        let sum: f64 = self.0.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(RecommendError::InvalidWeights(format!(
                "weights sum to {sum}, expected 1"
            )));
        }
        Ok(())
    }
}

/// Combine component scores with their weights into a final score.
///
/// Validates key-set equality, the weight invariants, and the [0, 1] range
/// of every component value; the result is clamped to [0, 1].
pub fn combine(
    component_scores: &BTreeMap<Component, f64>,
    weights: &WeightSet,
) -> Result<f64, RecommendError> {
    let score_keys: Vec<Component> = component_scores.keys().copied().collect();
    let weight_keys: Vec<Component> = weights.0.keys().copied().collect();
    if score_keys != weight_keys {
        return Err(RecommendError::WeightMismatch(format!(
            "weights {:?} vs components {:?}",
            weight_keys.iter().map(|c| c.label()).collect::<Vec<_>>(),
            score_keys.iter().map(|c| c.label()).collect::<Vec<_>>(),
        )));
    }

    weights.validate()?;

    for (component, value) in component_scores {
        RecommendError::check_unit_range(component.label(), *value)?;
    }

    let final_score: f64 = component_scores
        .iter()
        .map(|(component, value)| weights.0[component] * value)
        .sum();

    Ok(final_score.clamp(0.0, 1.0))
}

/// Ensemble result for one candidate.
#[derive(Debug, Clone, Serialize)]
pub struct EnsembleResult {
    pub candidate_id: String,
    /// Weighted final score in [0, 1].
    pub final_score: f64,
    /// Weights actually used.
    pub weights: WeightSet,
    /// Per-component scores.
    pub components: BTreeMap<Component, f64>,
    /// Per-component labeled decompositions, feeds attribution.
    pub breakdowns: BTreeMap<Component, ScoreBreakdown>,
}

/// Score one policy. `similarity` is the externally computed semantic score.
pub fn score_policy(
    fv: &FeatureVector,
    policy: &PolicyDef,
    similarity: f64,
    estimator: &dyn PremiumEstimator,
    weights: Option<&WeightSet>,
) -> Result<EnsembleResult, RecommendError> {
    let weights = weights.cloned().unwrap_or_else(WeightSet::policy_default);

    let rule = rule_score_policy(fv, policy);
    let nlp = similarity_score(similarity)?;
    let premium = estimator.policy_premium(fv, policy);
    let financial = financial_fit_score(fv.monthly_income, premium);

    assemble(
        &policy.id,
        weights,
        [
            (Component::Rule, rule),
            (Component::Nlp, nlp),
            (Component::Financial, financial),
        ]
        .into_iter()
        .collect(),
    )
}

/// Score one rider. Riders add the trigger-strength component.
pub fn score_rider(
    fv: &FeatureVector,
    rider: &RiderDef,
    similarity: f64,
    estimator: &dyn PremiumEstimator,
    weights: Option<&WeightSet>,
) -> Result<EnsembleResult, RecommendError> {
    let weights = weights.cloned().unwrap_or_else(WeightSet::rider_default);

    let rule = rule_score_rider(fv, rider);
    let nlp = similarity_score(similarity)?;
    let trigger = trigger_strength_score(fv, rider);
    let premium = estimator.rider_premium(fv, rider);
    let financial = financial_fit_score(fv.monthly_income, premium);

    assemble(
        &rider.id,
        weights,
        [
            (Component::Rule, rule),
            (Component::Nlp, nlp),
            (Component::Trigger, trigger),
            (Component::Financial, financial),
        ]
        .into_iter()
        .collect(),
    )
}

fn assemble(
    candidate_id: &str,
    weights: WeightSet,
    breakdowns: BTreeMap<Component, ScoreBreakdown>,
) -> Result<EnsembleResult, RecommendError> {
    let components: BTreeMap<Component, f64> = breakdowns
        .iter()
        .map(|(component, breakdown)| (*component, breakdown.value))
        .collect();

    let final_score = combine(&components, &weights)?;

    Ok(EnsembleResult {
        candidate_id: candidate_id.to_string(),
        final_score,
        weights,
        components,
        breakdowns,
    })
}

/// A candidate that failed to score, reported alongside the successes.
#[derive(Debug, Serialize)]
pub struct CandidateFailure {
    pub candidate_id: String,
    pub error: String,
}

/// Batch scoring outcome: per-candidate failures never abort the batch.
#[derive(Debug, Serialize)]
pub struct BatchScores {
    pub results: Vec<EnsembleResult>,
    pub failures: Vec<CandidateFailure>,
}

impl BatchScores {
    fn partition(outcomes: Vec<(String, Result<EnsembleResult, RecommendError>)>) -> BatchScores {
        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (candidate_id, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(error) => failures.push(CandidateFailure {
                    candidate_id,
                    error: error.to_string(),
                }),
            }
        }
        BatchScores { results, failures }
    }
}

/// Score a set of policies in parallel. `similarities` maps candidate id to
/// the externally computed semantic score; absent entries fail that
/// candidate only.
pub fn batch_score_policies(
    fv: &FeatureVector,
    policies: &[&PolicyDef],
    similarities: &BTreeMap<String, f64>,
    estimator: &dyn PremiumEstimator,
    weights: Option<&WeightSet>,
) -> BatchScores {
    let outcomes: Vec<_> = policies
        .par_iter()
        .map(|policy| {
            let outcome = similarities
                .get(&policy.id)
                .copied()
                .ok_or_else(|| {
                    RecommendError::UnknownCandidate(format!(
                        "no similarity score for '{}'",
                        policy.id
                    ))
                })
                .and_then(|sim| score_policy(fv, policy, sim, estimator, weights));
            (policy.id.clone(), outcome)
        })
        .collect();

    BatchScores::partition(outcomes)
}

/// Score a set of riders in parallel.
pub fn batch_score_riders(
    fv: &FeatureVector,
    riders: &[&RiderDef],
    similarities: &BTreeMap<String, f64>,
    estimator: &dyn PremiumEstimator,
    weights: Option<&WeightSet>,
) -> BatchScores {
    let outcomes: Vec<_> = riders
        .par_iter()
        .map(|rider| {
            let outcome = similarities
                .get(&rider.id)
                .copied()
                .ok_or_else(|| {
                    RecommendError::UnknownCandidate(format!(
                        "no similarity score for '{}'",
                        rider.id
                    ))
                })
                .and_then(|sim| score_rider(fv, rider, sim, estimator, weights));
            (rider.id.clone(), outcome)
        })
        .collect();

    BatchScores::partition(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::features::extract;
    use crate::profile::Profile;
    use crate::scoring::StandardPremiumTable;
    use approx::assert_relative_eq;

    fn scores(pairs: &[(Component, f64)]) -> BTreeMap<Component, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_combine_weighted_sum() {
        // Scenario from the affordability review sheet: rule 0.75, nlp 0.8,
        // financial 0.7 under default policy weights.
        let weights = WeightSet::policy_default();
        let final_score = combine(
            &scores(&[
                (Component::Rule, 0.75),
                (Component::Nlp, 0.8),
                (Component::Financial, 0.7),
            ]),
            &weights,
        )
        .unwrap();
        assert_relative_eq!(final_score, 0.7525, epsilon = 1e-12);
    }

    #[test]
    fn test_combine_all_zero() {
        let final_score = combine(
            &scores(&[
                (Component::Rule, 0.0),
                (Component::Nlp, 0.0),
                (Component::Financial, 0.0),
            ]),
            &WeightSet::policy_default(),
        )
        .unwrap();
        assert_relative_eq!(final_score, 0.0);
    }

    #[test]
    fn test_combine_bounded() {
        let weights = WeightSet::rider_default();
        for step in 0..=10 {
            let v = step as f64 / 10.0;
            let final_score = combine(
                &scores(&[
                    (Component::Rule, v),
                    (Component::Nlp, 1.0 - v),
                    (Component::Trigger, v / 2.0),
                    (Component::Financial, 1.0),
                ]),
                &weights,
            )
            .unwrap();
            assert!((0.0..=1.0).contains(&final_score));
        }
    }

    #[test]
    fn test_combine_monotone_in_each_component() {
        let weights = WeightSet::rider_default();
        let base = scores(&[
            (Component::Rule, 0.4),
            (Component::Nlp, 0.5),
            (Component::Trigger, 0.3),
            (Component::Financial, 0.6),
        ]);
        let base_score = combine(&base, &weights).unwrap();

        for component in [
            Component::Rule,
            Component::Nlp,
            Component::Trigger,
            Component::Financial,
        ] {
            let mut bumped = base.clone();
            bumped.insert(component, bumped[&component] + 0.2);
            let bumped_score = combine(&bumped, &weights).unwrap();
            assert!(
                bumped_score >= base_score,
                "raising {component:?} lowered the score"
            );
        }
    }

    #[test]
    fn test_weight_mismatch_detected() {
        // Missing financial weight while the component scores carry it.
        let weights = WeightSet::from_pairs(&[(Component::Rule, 0.5), (Component::Nlp, 0.5)]);
        let result = combine(
            &scores(&[
                (Component::Rule, 0.5),
                (Component::Nlp, 0.5),
                (Component::Financial, 0.5),
            ]),
            &weights,
        );
        assert!(matches!(result, Err(RecommendError::WeightMismatch(_))));
    }

    #[test]
    fn test_invalid_weights_detected() {
        let weights = WeightSet::from_pairs(&[(Component::Rule, 0.5), (Component::Nlp, 0.3)]);
        let result = combine(
            &scores(&[(Component::Rule, 0.5), (Component::Nlp, 0.5)]),
            &weights,
        );
        assert!(matches!(result, Err(RecommendError::InvalidWeights(_))));

        let negative =
            WeightSet::from_pairs(&[(Component::Rule, 1.5), (Component::Nlp, -0.5)]);
        let result = combine(
            &scores(&[(Component::Rule, 0.5), (Component::Nlp, 0.5)]),
            &negative,
        );
        assert!(matches!(result, Err(RecommendError::InvalidWeights(_))));
    }

    #[test]
    fn test_out_of_range_component_detected() {
        let result = combine(
            &scores(&[
                (Component::Rule, 1.2),
                (Component::Nlp, 0.5),
                (Component::Financial, 0.5),
            ]),
            &WeightSet::policy_default(),
        );
        assert!(matches!(result, Err(RecommendError::OutOfRangeScore { .. })));
    }

    #[test]
    fn test_score_policy_idempotent() {
        let catalog = Catalog::builtin();
        let policy = catalog.policy("life_plus").unwrap();
        let profile: Profile = serde_json::from_str(
            r#"{"age": 45, "monthly_income": 120000.0, "dependents_count": 2,
                "marital_status": "Married", "primary_goal": "Family protection"}"#,
        )
        .unwrap();
        let fv = extract(&profile).unwrap();

        let a = score_policy(&fv, policy, 0.8, &StandardPremiumTable, None).unwrap();
        let b = score_policy(&fv, policy, 0.8, &StandardPremiumTable, None).unwrap();

        assert_eq!(a.final_score.to_bits(), b.final_score.to_bits());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_batch_isolates_failures() {
        let catalog = Catalog::builtin();
        let policies: Vec<&crate::catalog::PolicyDef> = catalog.policies.iter().collect();
        let profile: Profile =
            serde_json::from_str(r#"{"age": 35, "monthly_income": 100000.0}"#).unwrap();
        let fv = extract(&profile).unwrap();

        // One candidate gets a poisoned similarity, one gets none at all.
        let mut similarities = BTreeMap::new();
        for policy in &policies {
            similarities.insert(policy.id.clone(), 0.7);
        }
        similarities.insert("flex_life".to_string(), 1.7);
        similarities.remove("click_life");

        let batch = batch_score_policies(&fv, &policies, &similarities, &StandardPremiumTable, None);

        assert_eq!(batch.results.len(), policies.len() - 2);
        assert_eq!(batch.failures.len(), 2);
        let failed: Vec<&str> = batch.failures.iter().map(|f| f.candidate_id.as_str()).collect();
        assert!(failed.contains(&"flex_life"));
        assert!(failed.contains(&"click_life"));
    }
}
