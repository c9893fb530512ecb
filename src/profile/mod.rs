//! User profile record and loading
//!
//! The profile is a closed record: required age and income, everything else
//! optional with documented defaults. Immutable for the duration of one
//! recommendation run.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Gender as captured on the proposal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

/// Marital status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MaritalStatus {
    #[default]
    Single,
    Married,
    Divorced,
    Widowed,
}

/// Employment type used for eligibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmploymentType {
    #[default]
    Permanent,
    SelfEmployed,
    Contract,
    Unemployed,
    Retired,
}

/// Occupational hazard level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HazardLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Raw user profile as supplied by the caller.
///
/// `age` and `monthly_income` are required; every other field defaults to the
/// neutral value noted on it. Unknown fields are rejected so typos surface at
/// the boundary instead of silently scoring as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Age nearest birthday
    pub age: i32,

    /// Gross monthly income
    pub monthly_income: f64,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default)]
    pub marital_status: MaritalStatus,

    #[serde(default)]
    pub employment_type: EmploymentType,

    /// Occupation label, free text (feeds the user-text builder only)
    #[serde(default)]
    pub occupation: String,

    #[serde(default)]
    pub hazardous_level: HazardLevel,

    /// Any hazardous work activities declared
    #[serde(default)]
    pub hazardous_activities: bool,

    #[serde(default)]
    pub dependents_count: u32,

    /// Primary goal, e.g. "Family protection" (default: empty, no goal)
    #[serde(default)]
    pub primary_goal: String,

    #[serde(default)]
    pub secondary_goal: Option<String>,

    // Medical condition flags, all default false
    #[serde(default)]
    pub chronic_disease: bool,
    #[serde(default)]
    pub cardiovascular_issue: bool,
    #[serde(default)]
    pub cancer_or_tumors: bool,
    #[serde(default)]
    pub respiratory_conditions: bool,
    #[serde(default)]
    pub neurological_or_mental: bool,
    #[serde(default)]
    pub gastrointestinal_conditions: bool,
    #[serde(default)]
    pub musculoskeletal_conditions: bool,
    #[serde(default)]
    pub infectious_conditions: bool,

    /// Body mass index (default 22.0, mid-healthy band)
    #[serde(default = "default_bmi")]
    pub bmi: f64,

    #[serde(default)]
    pub smoker: bool,

    #[serde(default)]
    pub alcohol_consumer: bool,

    #[serde(default)]
    pub travel_high_risk_countries: bool,

    #[serde(default)]
    pub dual_citizenship: bool,

    #[serde(default)]
    pub existing_insurance: bool,

    #[serde(default)]
    pub insurance_history_issues: bool,

    /// Member of an employer-sponsored group scheme
    #[serde(default)]
    pub employer_scheme: bool,
}

fn default_bmi() -> f64 {
    22.0
}

impl Profile {
    /// Load a single profile from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Profile, std::io::Error> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_profile_defaults() {
        let profile: Profile =
            serde_json::from_str(r#"{"age": 35, "monthly_income": 200000.0}"#).unwrap();

        assert_eq!(profile.age, 35);
        assert_eq!(profile.dependents_count, 0);
        assert_eq!(profile.gender, Gender::Unspecified);
        assert_eq!(profile.employment_type, EmploymentType::Permanent);
        assert!(!profile.smoker);
        assert!((profile.bmi - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let result: Result<Profile, _> = serde_json::from_str(r#"{"age": 35}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Profile, _> = serde_json::from_str(
            r#"{"age": 35, "monthly_income": 1000.0, "agee": 40}"#,
        );
        assert!(result.is_err());
    }
}
