//! Ensemble scoring and explanation engine for insurance recommendations
//!
//! Recommends a base policy and supporting riders for a user profile and
//! explains why. The pipeline is a pure, synchronous computation:
//!
//! profile -> feature extraction -> {component scorers, gap analysis}
//!         -> weighted ensemble -> attribution -> explanations
//!
//! The catalog is read-only reference data loaded once and shared across
//! concurrent requests; candidate scoring is embarrassingly parallel.
//! Embedding similarity and premium estimation are external collaborators
//! behind the `Similarity` and `PremiumEstimator` traits.

pub mod analysis;
pub mod catalog;
pub mod error;
pub mod explain;
pub mod features;
pub mod nlp;
pub mod profile;
pub mod recommend;
pub mod scoring;

pub use catalog::{Catalog, PolicyDef, RiderDef, Risk, RiskSet, Trigger};
pub use error::RecommendError;
pub use explain::{Attribution, ConfidenceLevel, Explanation, ExplanationConfig};
pub use features::{extract, FeatureVector};
pub use profile::Profile;
pub use recommend::{EngineConfig, Recommendation, RecommendationEngine};
pub use scoring::{EnsembleResult, PremiumEstimator, StandardPremiumTable, WeightSet};
