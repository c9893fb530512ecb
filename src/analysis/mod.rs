//! Coverage gap analysis
//!
//! Maps user features to the risks they face, compares against what the
//! selected candidates cover, and ranks riders by gap-filling value.

use crate::catalog::{RiderDef, Risk, RiskSet};
use crate::features::FeatureVector;
use serde::Serialize;

/// Identify the risks a user faces from their feature vector.
///
/// Fixed predicate table; every mapping is deterministic so the same vector
/// always yields the same risk set.
pub fn identify_risks(fv: &FeatureVector) -> RiskSet {
    let mut risks = RiskSet::new();

    // Everyone needs death coverage
    risks.insert(Risk::Death);

    if fv.dependents || fv.married {
        risks.insert(Risk::FamilyProtection);
    }

    if fv.dependents || fv.family_responsibility {
        risks.insert(Risk::Disability);
    }

    if fv.any_medical {
        risks.insert(Risk::Hospitalization);
        risks.insert(Risk::Surgery);
    }

    if fv.chronic {
        risks.insert(Risk::ChronicCare);
        risks.insert(Risk::Outpatient);
    }

    if fv.age_above_40 {
        risks.insert(Risk::CriticalIllness);
        risks.insert(Risk::Hospitalization);
    }

    if fv.cardio || fv.cancer || fv.smoker || fv.bmi_high {
        risks.insert(Risk::CriticalIllness);
    }

    if fv.hazardous_job || fv.hazardous_activities {
        risks.insert(Risk::Accident);
        risks.insert(Risk::Disability);
    }

    if fv.goal_retirement || fv.age_above_45 {
        risks.insert(Risk::Retirement);
    }

    if fv.female_childbearing_age {
        risks.insert(Risk::Maternity);
    }

    if fv.dependents {
        risks.insert(Risk::ChildHealth);
    }

    if fv.frequent_travel || fv.dual_citizenship {
        risks.insert(Risk::OverseasMedical);
    }

    if fv.low_income && fv.dependents {
        risks.insert(Risk::Funeral);
    }

    risks
}

/// Gap set: risks the user faces that the covered tags do not address.
pub fn find_gaps(user_risks: &RiskSet, covered: &RiskSet) -> RiskSet {
    user_risks.difference(covered).copied().collect()
}

/// Coverage completeness in [0, 1]; defined as 1.0 on an empty risk set.
pub fn completeness(user_risks: &RiskSet, covered: &RiskSet) -> f64 {
    if user_risks.is_empty() {
        return 1.0;
    }
    user_risks.intersection(covered).count() as f64 / user_risks.len() as f64
}

/// A rider ranked by the coverage gaps it fills.
#[derive(Debug, Clone, Serialize)]
pub struct GapPriority {
    pub rider_id: String,
    /// Gap risks this rider addresses.
    pub filled_gaps: RiskSet,
    /// Base ensemble score used for tie-breaking.
    pub base_score: f64,
}

impl GapPriority {
    /// Score boost earned by filling these gaps: criticality-weighted,
    /// capped at 0.15.
    pub fn boost(&self) -> f64 {
        let criticality: f64 = self.filled_gaps.iter().map(|r| r.criticality()).sum();
        (criticality * 0.05).min(0.15)
    }
}

/// Rank gap-filling riders.
///
/// Ordering: gaps-filled count descending, then base ensemble score
/// descending, then rider id ascending. Riders filling no gap are omitted.
pub fn prioritize_for_gaps(
    candidates: &[(&RiderDef, f64)],
    gaps: &RiskSet,
) -> Vec<GapPriority> {
    let mut priorities: Vec<GapPriority> = candidates
        .iter()
        .filter_map(|(rider, base_score)| {
            let filled_gaps: RiskSet = rider.coverage.intersection(gaps).copied().collect();
            if filled_gaps.is_empty() {
                None
            } else {
                Some(GapPriority {
                    rider_id: rider.id.clone(),
                    filled_gaps,
                    base_score: *base_score,
                })
            }
        })
        .collect();

    priorities.sort_by(|a, b| {
        b.filled_gaps
            .len()
            .cmp(&a.filled_gaps.len())
            .then_with(|| b.base_score.total_cmp(&a.base_score))
            .then_with(|| a.rider_id.cmp(&b.rider_id))
    });

    priorities
}

/// Full coverage analysis for one policy + rider selection.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageAnalysis {
    pub user_risks: RiskSet,
    pub covered_risks: RiskSet,
    pub gaps: RiskSet,
    pub completeness: f64,
}

impl CoverageAnalysis {
    pub fn new(user_risks: RiskSet, covered: &RiskSet) -> CoverageAnalysis {
        let covered_risks: RiskSet = user_risks.intersection(covered).copied().collect();
        let gaps = find_gaps(&user_risks, covered);
        let completeness = completeness(&user_risks, covered);
        CoverageAnalysis {
            user_risks,
            covered_risks,
            gaps,
            completeness,
        }
    }
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

    #[test]
    fn test_identify_risks_family_profile() {
        let fv = fv(
            r#"{"age": 45, "monthly_income": 120000.0, "marital_status": "Married",
                "dependents_count": 2, "primary_goal": "Family protection"}"#,
        );
        let risks = identify_risks(&fv);

        assert!(risks.contains(&Risk::Death));
        assert!(risks.contains(&Risk::FamilyProtection));
        assert!(risks.contains(&Risk::Disability));
        assert!(risks.contains(&Risk::ChildHealth));
        assert!(risks.contains(&Risk::CriticalIllness)); // age >= 40
        assert!(risks.contains(&Risk::Retirement)); // age >= 45
        assert!(!risks.contains(&Risk::Maternity));
        assert!(!risks.contains(&Risk::Funeral)); // not low income
    }

    #[test]
    fn test_completeness_bounds() {
        let empty = RiskSet::new();
        assert_relative_eq!(completeness(&empty, &empty), 1.0);

        let risks: RiskSet = [Risk::Death, Risk::Disability].into_iter().collect();
        let covered: RiskSet = [Risk::Death].into_iter().collect();
        let ratio = completeness(&risks, &covered);
        assert!((0.0..=1.0).contains(&ratio));
        assert_relative_eq!(ratio, 0.5);

        // Full coverage -> no gaps -> completeness 1.0
        assert!(find_gaps(&risks, &risks).is_empty());
        assert_relative_eq!(completeness(&risks, &risks), 1.0);
    }

    #[test]
    fn test_prioritize_gap_filler_ranks_first() {
        let catalog = Catalog::builtin();
        let critical = catalog.rider("critical_illness").unwrap();
        let spouse = catalog.rider("spouse_benefit").unwrap();
        let gaps: RiskSet = [Risk::CriticalIllness].into_iter().collect();

        // Equal base scores: only the gap filler appears, so it leads.
        let ranked = prioritize_for_gaps(&[(spouse, 0.6), (critical, 0.6)], &gaps);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rider_id, "critical_illness");
    }

    #[test]
    fn test_prioritize_tie_breaks() {
        let catalog = Catalog::builtin();
        // Both cover critical_illness (one gap each).
        let critical = catalog.rider("critical_illness").unwrap();
        let group_ci = catalog.rider("group_critical_illness").unwrap();
        let gaps: RiskSet = [Risk::CriticalIllness].into_iter().collect();

        // Higher base score wins.
        let ranked = prioritize_for_gaps(&[(critical, 0.5), (group_ci, 0.7)], &gaps);
        assert_eq!(ranked[0].rider_id, "group_critical_illness");

        // Equal base scores: ascending id wins.
        let ranked = prioritize_for_gaps(&[(group_ci, 0.5), (critical, 0.5)], &gaps);
        assert_eq!(ranked[0].rider_id, "critical_illness");

        // Determinism on repeated calls.
        let again = prioritize_for_gaps(&[(group_ci, 0.5), (critical, 0.5)], &gaps);
        let ids: Vec<_> = ranked.iter().map(|p| &p.rider_id).collect();
        let ids_again: Vec<_> = again.iter().map(|p| &p.rider_id).collect();
        assert_eq!(ids, ids_again);
    }

    #[test]
    fn test_gap_boost_capped() {
        let heavy = GapPriority {
            rider_id: "x".to_string(),
            filled_gaps: [Risk::Death, Risk::CriticalIllness, Risk::Disability, Risk::Funeral]
                .into_iter()
                .collect(),
            base_score: 0.5,
        };
        assert_relative_eq!(heavy.boost(), 0.15);

        let light = GapPriority {
            rider_id: "y".to_string(),
            filled_gaps: [Risk::Funeral].into_iter().collect(),
            base_score: 0.5,
        };
        assert_relative_eq!(light.boost(), 0.3 * 0.05);
    }
}
