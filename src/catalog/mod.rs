//! Candidate reference data: policies, riders, risk types, trigger conditions
//!
//! The catalog is process-wide, read-only reference data. Load it once at
//! start (built-in tables or a JSON file) and share it across concurrent
//! requests; nothing in the engine mutates it.

mod data;
pub mod filter;

use crate::error::RecommendError;
use crate::features::{FeatureVector, IncomeBand, MedicalRisk};
use crate::profile::EmploymentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Set of risk identifiers, ordered for deterministic iteration.
pub type RiskSet = BTreeSet<Risk>;

/// Insurance risk a user may face and a candidate may cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Death,
    CriticalIllness,
    Disability,
    Hospitalization,
    Surgery,
    ChronicCare,
    FamilyProtection,
    Retirement,
    Outpatient,
    Maternity,
    Accident,
    OverseasMedical,
    OrganTransplant,
    ChildHealth,
    Funeral,
}

impl Risk {
    /// Human-readable name used in reports and explanations.
    pub fn display_name(self) -> &'static str {
        match self {
            Risk::Death => "Death benefit / Life cover",
            Risk::CriticalIllness => "Critical illness coverage",
            Risk::Disability => "Disability income protection",
            Risk::Hospitalization => "Hospital expenses",
            Risk::Surgery => "Surgical procedures",
            Risk::ChronicCare => "Chronic disease management",
            Risk::FamilyProtection => "Family income protection",
            Risk::Retirement => "Retirement income",
            Risk::Outpatient => "Outpatient medical care",
            Risk::Maternity => "Maternity and childbirth",
            Risk::Accident => "Accidental death/injury",
            Risk::OverseasMedical => "Overseas medical treatment",
            Risk::OrganTransplant => "Organ transplant support",
            Risk::ChildHealth => "Children healthcare",
            Risk::Funeral => "Funeral expenses",
        }
    }

    /// Criticality weight driving the gap-filling score boost.
    /// Higher means the uncovered risk matters more.
    pub fn criticality(self) -> f64 {
        match self {
            Risk::Death => 1.0,
            Risk::CriticalIllness => 0.95,
            Risk::Disability => 0.9,
            Risk::FamilyProtection => 0.9,
            Risk::Hospitalization => 0.85,
            Risk::ChronicCare => 0.8,
            Risk::Surgery => 0.75,
            Risk::Accident => 0.7,
            Risk::Retirement => 0.7,
            Risk::Maternity => 0.65,
            Risk::ChildHealth => 0.6,
            Risk::Outpatient => 0.5,
            Risk::OverseasMedical => 0.4,
            Risk::OrganTransplant => 0.4,
            Risk::Funeral => 0.3,
        }
    }
}

/// Trigger condition: a predicate over the feature vector that activates a
/// rider's relevance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Dependents,
    Married,
    HazardousJob,
    HazardousActivities,
    AnyMedical,
    AgeAbove40,
    AgeAbove45,
    Smoker,
    Chronic,
    Cardio,
    Cancer,
    BmiHigh,
    FemaleChildbearingAge,
    GroupPolicy,
    FrequentTravel,
    DualCitizenship,
    LowIncome,
    HighIncome,
    RetirementGoal,
    MedicalRisk,
    SevereOrganCondition,
    FamilyCancerRisk,
}

/// Width of the linear partial-credit ramp below age thresholds, in years.
const AGE_RAMP_YEARS: f64 = 5.0;

impl Trigger {
    /// Graded satisfaction of this trigger in [0, 1].
    ///
    /// Boolean triggers score 1.0 or 0.0. Age thresholds earn linear partial
    /// credit over the five years below the threshold. `MedicalRisk` grades
    /// the risk class directly. Triggers with no profile source
    /// (`SevereOrganCondition`, `FamilyCancerRisk`) score 0.0.
    pub fn satisfaction(self, fv: &FeatureVector) -> f64 {
        match self {
            Trigger::Dependents => bool_score(fv.dependents),
            Trigger::Married => bool_score(fv.married),
            Trigger::HazardousJob => bool_score(fv.hazardous_job),
            Trigger::HazardousActivities => bool_score(fv.hazardous_activities),
            Trigger::AnyMedical => bool_score(fv.any_medical),
            Trigger::AgeAbove40 => age_ramp(fv.age, 40),
            Trigger::AgeAbove45 => age_ramp(fv.age, 45),
            Trigger::Smoker => bool_score(fv.smoker),
            Trigger::Chronic => bool_score(fv.chronic),
            Trigger::Cardio => bool_score(fv.cardio),
            Trigger::Cancer => bool_score(fv.cancer),
            Trigger::BmiHigh => bool_score(fv.bmi_high),
            Trigger::FemaleChildbearingAge => bool_score(fv.female_childbearing_age),
            Trigger::GroupPolicy => bool_score(fv.group_policy),
            Trigger::FrequentTravel => bool_score(fv.frequent_travel),
            Trigger::DualCitizenship => bool_score(fv.dual_citizenship),
            Trigger::LowIncome => bool_score(fv.low_income),
            Trigger::HighIncome => bool_score(fv.high_income),
            Trigger::RetirementGoal => bool_score(fv.goal_retirement),
            Trigger::MedicalRisk => match fv.medical_risk {
                MedicalRisk::Low => 0.0,
                MedicalRisk::Medium => 0.5,
                MedicalRisk::High => 0.75,
                MedicalRisk::VeryHigh => 1.0,
            },
            Trigger::SevereOrganCondition | Trigger::FamilyCancerRisk => 0.0,
        }
    }

    /// Whether the trigger fires at all, used by eligibility filtering.
    pub fn fires(self, fv: &FeatureVector) -> bool {
        self.satisfaction(fv) > 0.0
    }

    /// Label used in breakdowns and attribution grouping.
    pub fn label(self) -> &'static str {
        match self {
            Trigger::Dependents => "dependents",
            Trigger::Married => "married",
            Trigger::HazardousJob => "hazardous_job",
            Trigger::HazardousActivities => "hazardous_activities",
            Trigger::AnyMedical => "any_medical",
            Trigger::AgeAbove40 => "age_above_40",
            Trigger::AgeAbove45 => "age_above_45",
            Trigger::Smoker => "smoker",
            Trigger::Chronic => "chronic",
            Trigger::Cardio => "cardio",
            Trigger::Cancer => "cancer",
            Trigger::BmiHigh => "bmi_high",
            Trigger::FemaleChildbearingAge => "female_childbearing_age",
            Trigger::GroupPolicy => "group_policy",
            Trigger::FrequentTravel => "frequent_travel",
            Trigger::DualCitizenship => "dual_citizenship",
            Trigger::LowIncome => "low_income",
            Trigger::HighIncome => "high_income",
            Trigger::RetirementGoal => "retirement_goal",
            Trigger::MedicalRisk => "medical_risk",
            Trigger::SevereOrganCondition => "severe_organ_condition",
            Trigger::FamilyCancerRisk => "family_cancer_risk",
        }
    }
}

fn bool_score(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

/// Linear partial credit for age thresholds: full credit at or above the
/// threshold, ramping down to zero over `AGE_RAMP_YEARS` below it.
fn age_ramp(age: i32, threshold: i32) -> f64 {
    if age >= threshold {
        return 1.0;
    }
    let shortfall = (threshold - age) as f64;
    (1.0 - shortfall / AGE_RAMP_YEARS).max(0.0)
}

/// Medical underwriting rule attached to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MedicalUnderwriting {
    /// Accepts all risk classes with graded acceptance.
    #[default]
    Standard,
    /// Simplified issue, low-risk applicants only.
    LowRiskOnly,
    /// Declines very-high-risk applicants, rates high-risk ones.
    ExcludeVeryHigh,
}

/// Static policy definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDef {
    pub id: String,
    pub name: String,
    /// Marketing description, feeds the similarity collaborator.
    pub text: String,
    pub age_range: (i32, i32),
    pub income_bands: Vec<IncomeBand>,
    pub goals: Vec<String>,
    /// Empty means any employment type is accepted.
    #[serde(default)]
    pub employment_types: Vec<EmploymentType>,
    #[serde(default)]
    pub medical_underwriting: MedicalUnderwriting,
    #[serde(default)]
    pub requires_employer: bool,
    pub attachable_riders: Vec<String>,
    pub coverage: RiskSet,
    /// Base monthly premium as a percentage of monthly income.
    pub base_premium_pct: f64,
}

/// Static rider definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderDef {
    pub id: String,
    pub name: String,
    pub text: String,
    /// Standalone riders attach to any policy.
    pub standalone: bool,
    pub triggers: Vec<Trigger>,
    pub coverage: RiskSet,
    /// Additional monthly premium as a percentage of monthly income.
    pub premium_pct: f64,
    /// Health-related rider (drives the medical-relevance rule check).
    #[serde(default)]
    pub health_related: bool,
    /// Family-related rider (drives the family-relevance rule check).
    #[serde(default)]
    pub family_related: bool,
}

/// Read-only candidate catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub policies: Vec<PolicyDef>,
    pub riders: Vec<RiderDef>,
}

impl Catalog {
    /// Built-in product shelf.
    pub fn builtin() -> Catalog {
        Catalog {
            policies: data::builtin_policies(),
            riders: data::builtin_riders(),
        }
    }

    /// Load an externally supplied catalog from JSON.
    pub fn from_json_file(path: &Path) -> Result<Catalog, RecommendError> {
        let file = File::open(path)
            .map_err(|e| RecommendError::Catalog(format!("{}: {e}", path.display())))?;
        let catalog: Catalog = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| RecommendError::Catalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Sanity checks over reference data, run once at load time.
    pub fn validate(&self) -> Result<(), RecommendError> {
        let mut seen = BTreeSet::new();
        for policy in &self.policies {
            if !seen.insert(policy.id.as_str()) {
                return Err(RecommendError::Catalog(format!(
                    "duplicate policy id '{}'",
                    policy.id
                )));
            }
            if policy.age_range.0 > policy.age_range.1 {
                return Err(RecommendError::Catalog(format!(
                    "policy '{}' has inverted age range",
                    policy.id
                )));
            }
            if policy.base_premium_pct < 0.0 {
                return Err(RecommendError::Catalog(format!(
                    "policy '{}' has negative premium rate",
                    policy.id
                )));
            }
        }
        let rider_ids: BTreeSet<&str> = self.riders.iter().map(|r| r.id.as_str()).collect();
        if rider_ids.len() != self.riders.len() {
            return Err(RecommendError::Catalog("duplicate rider id".to_string()));
        }
        for policy in &self.policies {
            for rider_id in &policy.attachable_riders {
                if !rider_ids.contains(rider_id.as_str()) {
                    return Err(RecommendError::Catalog(format!(
                        "policy '{}' references unknown rider '{}'",
                        policy.id, rider_id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn policy(&self, id: &str) -> Result<&PolicyDef, RecommendError> {
        self.policies
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| RecommendError::UnknownCandidate(id.to_string()))
    }

    pub fn rider(&self, id: &str) -> Result<&RiderDef, RecommendError> {
        self.riders
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| RecommendError::UnknownCandidate(id.to_string()))
    }

    /// Combined coverage of a policy plus a set of riders.
    pub fn combined_coverage(&self, policy: &PolicyDef, rider_ids: &[String]) -> RiskSet {
        let mut coverage = policy.coverage.clone();
        for id in rider_ids {
            if let Ok(rider) = self.rider(id) {
                coverage.extend(rider.coverage.iter().copied());
            }
        }
        coverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract;
    use crate::profile::Profile;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_catalog_validates() {
        let catalog = Catalog::builtin();
        catalog.validate().expect("builtin catalog must be consistent");
        assert_eq!(catalog.policies.len(), 6);
        assert_eq!(catalog.riders.len(), 22);
    }

    #[test]
    fn test_age_ramp_partial_credit() {
        assert_relative_eq!(age_ramp(40, 40), 1.0);
        assert_relative_eq!(age_ramp(38, 40), 0.6);
        assert_relative_eq!(age_ramp(35, 40), 0.0);
        assert_relative_eq!(age_ramp(20, 40), 0.0);
    }

    #[test]
    fn test_trigger_satisfaction_graded() {
        let profile: Profile = serde_json::from_str(
            r#"{"age": 43, "monthly_income": 30000.0, "dependents_count": 1,
                "chronic_disease": true}"#,
        )
        .unwrap();
        let fv = extract(&profile).unwrap();

        assert_relative_eq!(Trigger::Dependents.satisfaction(&fv), 1.0);
        assert_relative_eq!(Trigger::Married.satisfaction(&fv), 0.0);
        assert_relative_eq!(Trigger::AgeAbove40.satisfaction(&fv), 1.0);
        // 43 is two years short of 45: 1 - 2/5
        assert_relative_eq!(Trigger::AgeAbove45.satisfaction(&fv), 0.6);
        // chronic only -> High risk class
        assert_relative_eq!(Trigger::MedicalRisk.satisfaction(&fv), 0.75);
        assert_relative_eq!(Trigger::SevereOrganCondition.satisfaction(&fv), 0.0);
    }

    #[test]
    fn test_combined_coverage_unions_riders() {
        let catalog = Catalog::builtin();
        let policy = catalog.policy("click_life").unwrap();
        assert!(!policy.coverage.contains(&Risk::CriticalIllness));

        let combined =
            catalog.combined_coverage(policy, &["cancer_care".to_string()]);
        assert!(combined.contains(&Risk::Death));
        assert!(combined.contains(&Risk::CriticalIllness));
    }
}
