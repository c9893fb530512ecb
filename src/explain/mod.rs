//! Explainability: additive attribution and natural-language reasons

pub mod attribution;
pub mod generator;

pub use attribution::{explain, Attribution, FeatureContribution};
pub use generator::{generate, ConfidenceLevel, Explanation};

use serde::{Deserialize, Serialize};

/// Explanation thresholds and knobs.
///
/// Externally supplied configuration; every field has the documented default
/// so partial JSON overrides work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationConfig {
    /// Final score at or above which a candidate is primary / "high".
    #[serde(default = "default_primary_threshold")]
    pub primary_threshold: f64,

    /// Final score at or above which a candidate is alternate / "medium".
    #[serde(default = "default_alternate_threshold")]
    pub alternate_threshold: f64,

    /// Attribution baseline: the fixed "no information" score.
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Number of top positive contributions rendered as primary reasons.
    #[serde(default = "default_top_n_reasons")]
    pub top_n_reasons: usize,

    /// Minimum |contribution| for an entry to be worth mentioning.
    #[serde(default = "default_materiality")]
    pub materiality: f64,
}

fn default_primary_threshold() -> f64 {
    0.65
}
fn default_alternate_threshold() -> f64 {
    0.45
}
fn default_baseline() -> f64 {
    0.5
}
fn default_top_n_reasons() -> usize {
    2
}
fn default_materiality() -> f64 {
    0.01
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            primary_threshold: default_primary_threshold(),
            alternate_threshold: default_alternate_threshold(),
            baseline: default_baseline(),
            top_n_reasons: default_top_n_reasons(),
            materiality: default_materiality(),
        }
    }
}
