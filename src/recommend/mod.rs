//! Recommendation pipeline
//!
//! Orchestrates the full flow: feature extraction, eligibility filtering,
//! parallel ensemble scoring, coverage gap analysis, rider re-prioritization
//! and explanation generation. The pipeline is a pure function of
//! (profile, catalog, weights, thresholds); any state is scoped to one run.

use crate::analysis::{self, CoverageAnalysis, GapPriority};
use crate::catalog::{filter, Catalog, RiskSet};
use crate::error::RecommendError;
use crate::explain::{self, Attribution, Explanation, ExplanationConfig};
use crate::features;
use crate::nlp::{build_user_text, Similarity};
use crate::profile::Profile;
use crate::scoring::{
    ensemble, CandidateFailure, EnsembleResult, PremiumEstimator, StandardPremiumTable, WeightSet,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engine configuration: weight sets, thresholds, list caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "WeightSet::policy_default")]
    pub policy_weights: WeightSet,

    #[serde(default = "WeightSet::rider_default")]
    pub rider_weights: WeightSet,

    #[serde(default)]
    pub explanation: ExplanationConfig,

    /// Maximum riders returned per priority tier.
    #[serde(default = "default_top_riders")]
    pub top_riders: usize,
}

fn default_top_riders() -> usize {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy_weights: WeightSet::policy_default(),
            rider_weights: WeightSet::rider_default(),
            explanation: ExplanationConfig::default(),
            top_riders: default_top_riders(),
        }
    }
}

/// The recommended policy with its attribution and explanation.
#[derive(Debug, Serialize)]
pub struct RecommendedPolicy {
    pub result: EnsembleResult,
    pub attribution: Attribution,
    pub explanation: Explanation,
}

/// A recommended rider: ensemble result plus gap-filling adjustment.
#[derive(Debug, Serialize)]
pub struct RiderRecommendation {
    pub result: EnsembleResult,
    /// Final score after the gap-filling boost, used for ranking and tiers.
    pub score: f64,
    pub fills_gaps: RiskSet,
    pub explanation: Explanation,
}

/// Full recommendation response, serializable for any caller.
#[derive(Debug, Serialize)]
pub struct Recommendation {
    /// Best policy, absent when no candidate passed eligibility.
    pub policy: Option<RecommendedPolicy>,
    /// Whether the goal test had to be relaxed to find candidates.
    pub relaxed_eligibility: bool,
    /// Every scored policy, best first.
    pub all_policy_scores: Vec<EnsembleResult>,
    /// Riders at or above the primary threshold, best first.
    pub primary_riders: Vec<RiderRecommendation>,
    /// Riders between the alternate and primary thresholds, best first.
    pub alternate_riders: Vec<RiderRecommendation>,
    /// Coverage analysis for the recommended policy plus primary riders.
    pub coverage: Option<CoverageAnalysis>,
    /// Risks identified for the user, present even when nothing is eligible.
    pub user_risks: RiskSet,
    /// Candidates that failed scoring; failures never abort the run.
    pub failures: Vec<CandidateFailure>,
}

/// Coverage report returned by `analyze_coverage`.
#[derive(Debug, Serialize)]
pub struct CoverageReport {
    pub analysis: CoverageAnalysis,
    pub prioritized_riders: Vec<GapPriority>,
}

/// Recommendation engine over a read-only catalog.
///
/// Safe to share across threads: the catalog is never mutated and every
/// scoring call is pure.
pub struct RecommendationEngine {
    catalog: Catalog,
    config: EngineConfig,
    estimator: Box<dyn PremiumEstimator>,
}

impl RecommendationEngine {
    pub fn new(catalog: Catalog, config: EngineConfig) -> RecommendationEngine {
        RecommendationEngine {
            catalog,
            config,
            estimator: Box::new(StandardPremiumTable),
        }
    }

    /// Replace the premium estimation collaborator.
    pub fn with_estimator(mut self, estimator: Box<dyn PremiumEstimator>) -> RecommendationEngine {
        self.estimator = estimator;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Score one policy against a profile. `similarity` is the externally
    /// computed semantic score for this candidate.
    pub fn score_policy(
        &self,
        profile: &Profile,
        policy_id: &str,
        similarity: f64,
        weights: Option<&WeightSet>,
    ) -> Result<EnsembleResult, RecommendError> {
        let fv = features::extract(profile)?;
        let policy = self.catalog.policy(policy_id)?;
        ensemble::score_policy(
            &fv,
            policy,
            similarity,
            self.estimator.as_ref(),
            Some(weights.unwrap_or(&self.config.policy_weights)),
        )
    }

    /// Score one rider against a profile.
    pub fn score_rider(
        &self,
        profile: &Profile,
        rider_id: &str,
        similarity: f64,
        weights: Option<&WeightSet>,
    ) -> Result<EnsembleResult, RecommendError> {
        let fv = features::extract(profile)?;
        let rider = self.catalog.rider(rider_id)?;
        ensemble::score_rider(
            &fv,
            rider,
            similarity,
            self.estimator.as_ref(),
            Some(weights.unwrap_or(&self.config.rider_weights)),
        )
    }

    /// Attribute an ensemble result to feature contributions.
    pub fn explain(
        &self,
        result: &EnsembleResult,
        baseline: Option<f64>,
    ) -> Result<Attribution, RecommendError> {
        explain::explain(
            result,
            Some(baseline.unwrap_or(self.config.explanation.baseline)),
        )
    }

    /// Coverage analysis for a selected policy and candidate riders.
    ///
    /// `candidate_riders` pairs each rider id with its base ensemble score,
    /// which drives the gap-priority tie-break.
    pub fn analyze_coverage(
        &self,
        profile: &Profile,
        policy_id: &str,
        candidate_riders: &[(String, f64)],
    ) -> Result<CoverageReport, RecommendError> {
        let fv = features::extract(profile)?;
        let policy = self.catalog.policy(policy_id)?;

        let user_risks = analysis::identify_risks(&fv);
        let analysis = CoverageAnalysis::new(user_risks, &policy.coverage);

        let mut scored = Vec::with_capacity(candidate_riders.len());
        for (rider_id, base_score) in candidate_riders {
            scored.push((self.catalog.rider(rider_id)?, *base_score));
        }
        let prioritized_riders = analysis::prioritize_for_gaps(&scored, &analysis.gaps);

        Ok(CoverageReport {
            analysis,
            prioritized_riders,
        })
    }

    /// Run the full recommendation pipeline.
    pub fn recommend(
        &self,
        profile: &Profile,
        similarity: &dyn Similarity,
    ) -> Result<Recommendation, RecommendError> {
        let fv = features::extract(profile)?;
        let user_text = build_user_text(&fv);
        let user_risks = analysis::identify_risks(&fv);

        // Eligibility
        let candidates = filter::filter_policies(&self.catalog, &fv);
        if candidates.policies.is_empty() {
            info!("no eligible policies for profile");
            return Ok(Recommendation {
                policy: None,
                relaxed_eligibility: true,
                all_policy_scores: Vec::new(),
                primary_riders: Vec::new(),
                alternate_riders: Vec::new(),
                coverage: None,
                user_risks,
                failures: Vec::new(),
            });
        }
        debug!(
            "{} candidate policies (relaxed: {})",
            candidates.policies.len(),
            candidates.relaxed
        );

        // Policy scoring
        let policy_sims: BTreeMap<String, f64> = candidates
            .policies
            .iter()
            .map(|p| (p.id.clone(), similarity.similarity(&user_text, &p.text)))
            .collect();
        let mut policy_batch = ensemble::batch_score_policies(
            &fv,
            &candidates.policies,
            &policy_sims,
            self.estimator.as_ref(),
            Some(&self.config.policy_weights),
        );
        let mut failures = std::mem::take(&mut policy_batch.failures);

        let mut all_policy_scores = policy_batch.results;
        all_policy_scores.sort_by(|a, b| {
            b.final_score
                .total_cmp(&a.final_score)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });

        let Some(best) = all_policy_scores.first() else {
            return Ok(Recommendation {
                policy: None,
                relaxed_eligibility: candidates.relaxed,
                all_policy_scores,
                primary_riders: Vec::new(),
                alternate_riders: Vec::new(),
                coverage: None,
                user_risks,
                failures,
            });
        };
        let best_policy = self.catalog.policy(&best.candidate_id)?;
        info!(
            "best policy '{}' scored {:.4}",
            best_policy.id, best.final_score
        );

        // Gaps against the bare policy drive rider prioritization.
        let policy_gaps = analysis::find_gaps(&user_risks, &best_policy.coverage);

        // Rider scoring
        let eligible_riders = filter::filter_riders(&self.catalog, best_policy, &fv);
        let rider_sims: BTreeMap<String, f64> = eligible_riders
            .iter()
            .map(|r| (r.id.clone(), similarity.similarity(&user_text, &r.text)))
            .collect();
        let mut rider_batch = ensemble::batch_score_riders(
            &fv,
            &eligible_riders,
            &rider_sims,
            self.estimator.as_ref(),
            Some(&self.config.rider_weights),
        );
        failures.append(&mut rider_batch.failures);

        // Gap-filling boost and re-prioritization
        let scored_defs: Vec<(&crate::catalog::RiderDef, f64)> = rider_batch
            .results
            .iter()
            .filter_map(|r| {
                self.catalog
                    .rider(&r.candidate_id)
                    .ok()
                    .map(|def| (def, r.final_score))
            })
            .collect();
        let priorities = analysis::prioritize_for_gaps(&scored_defs, &policy_gaps);
        let boost_by_id: BTreeMap<&str, &GapPriority> = priorities
            .iter()
            .map(|p| (p.rider_id.as_str(), p))
            .collect();

        let mut ranked_riders: Vec<(EnsembleResult, f64, RiskSet)> = rider_batch
            .results
            .into_iter()
            .map(|result| {
                let (boost, fills) = boost_by_id
                    .get(result.candidate_id.as_str())
                    .map(|p| (p.boost(), p.filled_gaps.clone()))
                    .unwrap_or((0.0, RiskSet::new()));
                let score = (result.final_score + boost).min(1.0);
                (result, score, fills)
            })
            .collect();
        ranked_riders.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| a.0.candidate_id.cmp(&b.0.candidate_id))
        });

        // Tier split on boosted scores
        let thresholds = &self.config.explanation;
        let mut primary_riders = Vec::new();
        let mut alternate_riders = Vec::new();
        for (result, score, fills) in ranked_riders {
            let tier = if score >= thresholds.primary_threshold {
                &mut primary_riders
            } else if score >= thresholds.alternate_threshold {
                &mut alternate_riders
            } else {
                continue;
            };
            if tier.len() < self.config.top_riders {
                tier.push((result, score, fills));
            }
        }

        // Coverage analysis over the policy plus primary riders
        let primary_ids: Vec<String> = primary_riders
            .iter()
            .map(|(r, _, _)| r.candidate_id.clone())
            .collect();
        let combined = self.catalog.combined_coverage(best_policy, &primary_ids);
        let coverage = CoverageAnalysis::new(user_risks.clone(), &combined);

        // Explanations
        let baseline = Some(thresholds.baseline);
        let best_attribution = explain::explain(best, baseline)?;
        let best_explanation = explain::generate(
            &best_attribution,
            &coverage,
            &RiskSet::new(),
            thresholds,
        );

        let build_rider = |(result, score, fills): (EnsembleResult, f64, RiskSet)| -> Result<RiderRecommendation, RecommendError> {
            let attribution = explain::explain(&result, baseline)?;
            let explanation = explain::generate(&attribution, &coverage, &fills, thresholds);
            Ok(RiderRecommendation {
                result,
                score,
                fills_gaps: fills,
                explanation,
            })
        };
        let primary_riders = primary_riders
            .into_iter()
            .map(build_rider)
            .collect::<Result<Vec<_>, _>>()?;
        let alternate_riders = alternate_riders
            .into_iter()
            .map(build_rider)
            .collect::<Result<Vec<_>, _>>()?;

        let policy = RecommendedPolicy {
            result: all_policy_scores[0].clone(),
            attribution: best_attribution,
            explanation: best_explanation,
        };

        Ok(Recommendation {
            policy: Some(policy),
            relaxed_eligibility: candidates.relaxed,
            all_policy_scores,
            primary_riders,
            alternate_riders,
            coverage: Some(coverage),
            user_risks,
            failures,
        })
    }

    /// Legacy two-tuple entry point: best policy id and ranked rider scores.
    /// Thin adapter over `recommend`; no separate scoring path.
    pub fn recommend_simple(
        &self,
        profile: &Profile,
        similarity: &dyn Similarity,
    ) -> Result<(Option<String>, Vec<(String, f64)>), RecommendError> {
        let recommendation = self.recommend(profile, similarity)?;

        let policy_id = recommendation
            .policy
            .as_ref()
            .map(|p| p.result.candidate_id.clone());

        let riders = recommendation
            .primary_riders
            .iter()
            .chain(recommendation.alternate_riders.iter())
            .map(|r| (r.result.candidate_id.clone(), r.score))
            .collect();

        Ok((policy_id, riders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::LexicalSimilarity;

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(Catalog::builtin(), EngineConfig::default())
    }

    fn family_profile() -> Profile {
        serde_json::from_str(
            r#"{"age": 45, "monthly_income": 120000.0, "dependents_count": 2,
                "marital_status": "Married", "primary_goal": "Family protection",
                "occupation": "Accountant"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_full_pipeline_family_profile() {
        let engine = engine();
        let recommendation = engine
            .recommend(&family_profile(), &LexicalSimilarity)
            .unwrap();

        let policy = recommendation.policy.expect("family profile must match a policy");
        assert_eq!(policy.result.candidate_id, "life_plus");
        assert!(!recommendation.relaxed_eligibility);
        assert!(recommendation.failures.is_empty());

        // Attribution reconciles against the returned score.
        let sum: f64 = policy
            .attribution
            .contributions
            .iter()
            .map(|c| c.contribution)
            .sum();
        assert!((sum - (policy.result.final_score - 0.5)).abs() < 1e-3);

        // Riders are tiered and ranked best-first.
        for pair in recommendation.primary_riders.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for rider in &recommendation.primary_riders {
            assert!(rider.score >= 0.65);
        }
        for rider in &recommendation.alternate_riders {
            assert!((0.45..0.65).contains(&rider.score));
        }

        let coverage = recommendation.coverage.unwrap();
        assert!((0.0..=1.0).contains(&coverage.completeness));
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let engine = engine();
        let profile = family_profile();
        let a = engine.recommend(&profile, &LexicalSimilarity).unwrap();
        let b = engine.recommend(&profile, &LexicalSimilarity).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_no_eligible_policy_reports_risks() {
        let engine = engine();
        // Unemployed, outside every permanent/self-employed shelf with an
        // unmatched goal and no group scheme.
        let profile: Profile = serde_json::from_str(
            r#"{"age": 70, "monthly_income": 20000.0, "employment_type": "Unemployed",
                "primary_goal": "Simple life cover", "existing_insurance": true}"#,
        )
        .unwrap();

        let recommendation = engine.recommend(&profile, &LexicalSimilarity).unwrap();
        assert!(recommendation.policy.is_none());
        assert!(recommendation.user_risks.contains(&crate::catalog::Risk::Death));
    }

    #[test]
    fn test_gap_filling_rider_boosted() {
        let engine = engine();
        let recommendation = engine
            .recommend(&family_profile(), &LexicalSimilarity)
            .unwrap();

        // life_plus leaves critical_illness (age >= 40) uncovered; any
        // boosted rider filling it must carry the gap in its record.
        let boosted: Vec<_> = recommendation
            .primary_riders
            .iter()
            .chain(recommendation.alternate_riders.iter())
            .filter(|r| !r.fills_gaps.is_empty())
            .collect();
        assert!(!boosted.is_empty());
        for rider in boosted {
            assert!(rider.score >= rider.result.final_score);
            assert!(rider.score <= 1.0);
        }
    }

    #[test]
    fn test_score_policy_override_weights_validated() {
        let engine = engine();
        let profile = family_profile();

        // Rider-shaped weights against a policy's components must mismatch.
        let wrong = WeightSet::rider_default();
        let result = engine.score_policy(&profile, "life_plus", 0.8, Some(&wrong));
        assert!(matches!(result, Err(RecommendError::WeightMismatch(_))));
    }

    #[test]
    fn test_analyze_coverage_report() {
        let engine = engine();
        let report = engine
            .analyze_coverage(
                &family_profile(),
                "life_plus",
                &[
                    ("critical_illness".to_string(), 0.7),
                    ("spouse_benefit".to_string(), 0.7),
                ],
            )
            .unwrap();

        assert!(report.analysis.gaps.contains(&crate::catalog::Risk::CriticalIllness));
        // Only the gap filler is prioritized.
        assert_eq!(report.prioritized_riders.len(), 1);
        assert_eq!(report.prioritized_riders[0].rider_id, "critical_illness");
    }

    #[test]
    fn test_legacy_adapter_matches_pipeline() {
        let engine = engine();
        let profile = family_profile();

        let full = engine.recommend(&profile, &LexicalSimilarity).unwrap();
        let (policy_id, riders) = engine.recommend_simple(&profile, &LexicalSimilarity).unwrap();

        assert_eq!(
            policy_id.as_deref(),
            full.policy.as_ref().map(|p| p.result.candidate_id.as_str())
        );
        assert_eq!(
            riders.len(),
            full.primary_riders.len() + full.alternate_riders.len()
        );
    }
}
