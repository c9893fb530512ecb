//! Candidate scoring: component scorers and the weighted ensemble

pub mod components;
pub mod ensemble;
pub mod premium;

pub use components::{
    financial_fit_score, rule_score_policy, rule_score_rider, similarity_score,
    trigger_strength_score,
};
pub use ensemble::{
    batch_score_policies, batch_score_riders, combine, score_policy, score_rider, BatchScores,
    CandidateFailure, EnsembleResult, WeightSet,
};
pub use premium::{PremiumEstimator, StandardPremiumTable};

use serde::{Deserialize, Serialize};

/// Scoring component of the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Rule-based heuristics
    Rule,
    /// Semantic similarity supplied by the embedding collaborator
    Nlp,
    /// Trigger-condition match strength (riders only)
    Trigger,
    /// Affordability of the estimated premium
    Financial,
}

impl Component {
    pub fn label(self) -> &'static str {
        match self {
            Component::Rule => "rule",
            Component::Nlp => "nlp",
            Component::Trigger => "trigger",
            Component::Financial => "financial",
        }
    }
}

/// One labeled part of a component score.
///
/// Parts form a convex combination: within a breakdown the weights sum to 1
/// and `value = Σ weight · score`. The signed sub-contribution of a part
/// relative to a baseline `b` is `weight · (score − b)`; summed over a
/// breakdown this is exactly `value − b`, which is what lets attribution
/// reconcile against the final score for any baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownPart {
    pub label: String,
    pub weight: f64,
    pub score: f64,
}

/// Score of one component for one candidate, with its labeled decomposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Component score in [0, 1].
    pub value: f64,
    /// Ordered, deterministic decomposition of `value`.
    pub parts: Vec<BreakdownPart>,
}

impl ScoreBreakdown {
    /// Single-part breakdown for scalar components (nlp, financial).
    pub fn single(label: &str, score: f64) -> ScoreBreakdown {
        ScoreBreakdown {
            value: score,
            parts: vec![BreakdownPart {
                label: label.to_string(),
                weight: 1.0,
                score,
            }],
        }
    }

    /// Build from weighted parts; `value` is the weighted sum.
    pub fn from_parts(parts: Vec<BreakdownPart>) -> ScoreBreakdown {
        let value = parts.iter().map(|p| p.weight * p.score).sum();
        ScoreBreakdown { value, parts }
    }
}
