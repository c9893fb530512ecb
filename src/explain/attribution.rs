//! Additive feature attribution
//!
//! Decomposes a final ensemble score into per-feature signed contributions
//! relative to a fixed baseline. This is a manually defined additive
//! decomposition over the labeled score breakdowns, deliberately simpler
//! than true Shapley values: each breakdown part's deviation from the
//! baseline is scaled by its component's ensemble weight.

use crate::error::RecommendError;
use crate::scoring::EnsembleResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Tolerance for the reconciliation invariant.
const RECONCILIATION_EPSILON: f64 = 1e-3;

/// Signed contribution of one feature label.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

/// Attribution of a final score against a baseline.
///
/// Invariant: the contributions sum to `final_score - baseline` within
/// `1e-3`; `explain` refuses to return an attribution that does not.
#[derive(Debug, Clone, Serialize)]
pub struct Attribution {
    pub baseline: f64,
    pub final_score: f64,
    /// All contributions, largest first (ties broken by feature label).
    pub contributions: Vec<FeatureContribution>,
}

impl Attribution {
    /// Contributions pushing the score above the baseline, largest first.
    pub fn positive_factors(&self) -> impl Iterator<Item = &FeatureContribution> {
        self.contributions.iter().filter(|c| c.contribution > 0.0)
    }

    /// Contributions dragging the score down, most negative first.
    pub fn negative_factors(&self) -> Vec<&FeatureContribution> {
        let mut negatives: Vec<&FeatureContribution> = self
            .contributions
            .iter()
            .filter(|c| c.contribution < 0.0)
            .collect();
        negatives.sort_by(|a, b| {
            a.contribution
                .total_cmp(&b.contribution)
                .then_with(|| a.feature.cmp(&b.feature))
        });
        negatives
    }
}

/// Decompose an ensemble result into feature contributions.
///
/// For every labeled part of every component breakdown, the contribution is
/// `ensemble_weight * part_weight * (part_score - baseline)`; duplicate
/// labels across components are summed. The baseline defaults to 0.5 and
/// must lie in [0, 1].
pub fn explain(
    result: &EnsembleResult,
    baseline: Option<f64>,
) -> Result<Attribution, RecommendError> {
    let baseline = baseline.unwrap_or(0.5);
    RecommendError::check_unit_range("baseline", baseline)?;

    let mut grouped: BTreeMap<String, f64> = BTreeMap::new();
    for (component, breakdown) in &result.breakdowns {
        let ensemble_weight = result.weights.get(*component).ok_or_else(|| {
            RecommendError::WeightMismatch(format!(
                "no weight for component '{}'",
                component.label()
            ))
        })?;
        for part in &breakdown.parts {
            let contribution = ensemble_weight * part.weight * (part.score - baseline);
            *grouped.entry(part.label.clone()).or_insert(0.0) += contribution;
        }
    }

    let contribution_sum: f64 = grouped.values().sum();
    let expected = result.final_score - baseline;
    if (contribution_sum - expected).abs() > RECONCILIATION_EPSILON {
        return Err(RecommendError::AttributionMismatch {
            contribution_sum,
            expected,
            final_score: result.final_score,
            baseline,
        });
    }

    let mut contributions: Vec<FeatureContribution> = grouped
        .into_iter()
        .map(|(feature, contribution)| FeatureContribution {
            feature,
            contribution,
        })
        .collect();
    contributions.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.feature.cmp(&b.feature))
    });

    Ok(Attribution {
        baseline,
        final_score: result.final_score,
        contributions,
    })
}
