//! Error taxonomy for the recommendation engine
//!
//! Every variant marks a caller or programmer error at a component boundary.
//! None of these are transient; nothing in the engine retries.

use thiserror::Error;

/// Errors raised by the scoring and explanation pipeline.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// A required profile field is missing or outside its domain.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// A component score left the [0, 1] range.
    #[error("component score '{name}' = {value} is outside [0, 1]")]
    OutOfRangeScore { name: String, value: f64 },

    /// Weights are negative, non-finite, or do not sum to 1.
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// Weight keys and component-score keys disagree.
    #[error("weight keys do not match component keys: {0}")]
    WeightMismatch(String),

    /// Attribution failed to reconcile against the final score.
    /// Signals an internal bug, never expected in correct operation.
    #[error(
        "attribution mismatch: contributions sum to {contribution_sum}, \
         expected {expected} (final {final_score} - baseline {baseline})"
    )]
    AttributionMismatch {
        contribution_sum: f64,
        expected: f64,
        final_score: f64,
        baseline: f64,
    },

    /// Catalog reference data could not be loaded or is inconsistent.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// An unknown candidate id was requested from the catalog.
    #[error("unknown candidate: {0}")]
    UnknownCandidate(String),
}

impl RecommendError {
    /// Range check shared by every component scorer.
    pub fn check_unit_range(name: &str, value: f64) -> Result<(), RecommendError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(RecommendError::OutOfRangeScore {
                name: name.to_string(),
                value,
            });
        }
        Ok(())
    }
}
