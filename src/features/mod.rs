//! Feature extraction from the raw profile
//!
//! Derives the normalized feature vector every scorer and the explainer read.
//! Extraction is pure and deterministic: the same profile always produces the
//! same vector, which is what makes attribution reproducible.

use crate::error::RecommendError;
use crate::profile::{EmploymentType, Gender, HazardLevel, MaritalStatus, Profile};
use serde::{Deserialize, Serialize};

/// Income band boundaries (monthly income).
pub const MID_INCOME_FLOOR: f64 = 50_000.0;
pub const HIGH_INCOME_FLOOR: f64 = 150_000.0;

/// Income bracket derived from monthly income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncomeBand {
    Low,
    Mid,
    High,
}

impl IncomeBand {
    /// Ordinal position used for adjacency checks in the rule scorer.
    pub fn ordinal(self) -> i32 {
        match self {
            IncomeBand::Low => 0,
            IncomeBand::Mid => 1,
            IncomeBand::High => 2,
        }
    }
}

/// Medical underwriting risk class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MedicalRisk {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Normalized feature mapping derived once per recommendation run.
///
/// Downstream components must read this instance rather than re-deriving
/// anything from the raw profile.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    // Age & life stage
    pub age: i32,
    pub age_above_40: bool,
    pub age_above_45: bool,
    pub young: bool,
    pub senior: bool,

    // Income & financial
    pub monthly_income: f64,
    pub income_band: IncomeBand,
    pub low_income: bool,
    pub high_income: bool,

    // Family & demographic
    pub dependents: bool,
    pub dependents_count: u32,
    pub married: bool,
    pub family_responsibility: bool,

    // Occupation & work
    pub employment_type: EmploymentType,
    pub hazardous_job: bool,
    pub hazardous_activities: bool,
    pub group_policy: bool,

    // Medical conditions
    pub chronic: bool,
    pub cardio: bool,
    pub cancer: bool,
    pub respiratory: bool,
    pub any_medical: bool,
    pub medical_risk: MedicalRisk,

    // Lifestyle
    pub bmi: f64,
    pub bmi_high: bool,
    pub underweight: bool,
    pub smoker: bool,
    pub alcohol_consumer: bool,

    // Gender-specific
    pub female: bool,
    pub female_childbearing_age: bool,

    // Goals
    pub primary_goal: String,
    pub secondary_goal: Option<String>,
    pub goal_retirement: bool,
    pub goal_medical: bool,

    // Travel & regulatory
    pub frequent_travel: bool,
    pub dual_citizenship: bool,

    // Insurance history
    pub existing_insurance: bool,
}

/// Derive the feature vector from a profile.
///
/// Fails with `InvalidProfile` when age or income are outside their domain
/// (age 0..=120, income >= 0, finite numerics). Optional fields never fail;
/// they degrade to the defaults documented on `Profile`.
pub fn extract(profile: &Profile) -> Result<FeatureVector, RecommendError> {
    if !(0..=120).contains(&profile.age) {
        return Err(RecommendError::InvalidProfile(format!(
            "age {} is outside 0..=120",
            profile.age
        )));
    }
    if !profile.monthly_income.is_finite() || profile.monthly_income < 0.0 {
        return Err(RecommendError::InvalidProfile(format!(
            "monthly_income {} must be finite and >= 0",
            profile.monthly_income
        )));
    }
    if !profile.bmi.is_finite() || profile.bmi <= 0.0 {
        return Err(RecommendError::InvalidProfile(format!(
            "bmi {} must be finite and > 0",
            profile.bmi
        )));
    }

    let age = profile.age;
    let income = profile.monthly_income;

    let income_band = if income < MID_INCOME_FLOOR {
        IncomeBand::Low
    } else if income < HIGH_INCOME_FLOOR {
        IncomeBand::Mid
    } else {
        IncomeBand::High
    };

    let dependents = profile.dependents_count > 0;
    let married = profile.marital_status == MaritalStatus::Married;

    let hazardous_job = matches!(profile.hazardous_level, HazardLevel::Medium | HazardLevel::High);

    let any_medical = profile.chronic_disease
        || profile.cardiovascular_issue
        || profile.cancer_or_tumors
        || profile.respiratory_conditions
        || profile.neurological_or_mental
        || profile.gastrointestinal_conditions
        || profile.musculoskeletal_conditions
        || profile.infectious_conditions;

    let medical_risk = if profile.cancer_or_tumors || profile.cardiovascular_issue {
        MedicalRisk::VeryHigh
    } else if profile.chronic_disease || profile.respiratory_conditions {
        MedicalRisk::High
    } else if any_medical {
        MedicalRisk::Medium
    } else {
        MedicalRisk::Low
    };

    let female = profile.gender == Gender::Female;

    Ok(FeatureVector {
        age,
        age_above_40: age >= 40,
        age_above_45: age >= 45,
        young: age < 35,
        senior: age >= 60,

        monthly_income: income,
        income_band,
        low_income: income_band == IncomeBand::Low,
        high_income: income_band == IncomeBand::High,

        dependents,
        dependents_count: profile.dependents_count,
        married,
        family_responsibility: married || dependents,

        employment_type: profile.employment_type,
        hazardous_job,
        hazardous_activities: profile.hazardous_activities,
        group_policy: profile.employment_type == EmploymentType::Permanent
            && profile.employer_scheme,

        chronic: profile.chronic_disease,
        cardio: profile.cardiovascular_issue,
        cancer: profile.cancer_or_tumors,
        respiratory: profile.respiratory_conditions,
        any_medical,
        medical_risk,

        bmi: profile.bmi,
        bmi_high: profile.bmi >= 30.0,
        underweight: profile.bmi < 18.5,
        smoker: profile.smoker,
        alcohol_consumer: profile.alcohol_consumer,

        female,
        female_childbearing_age: female && (22..=42).contains(&age),

        primary_goal: profile.primary_goal.clone(),
        secondary_goal: profile.secondary_goal.clone(),
        goal_retirement: profile.primary_goal == "Retirement",
        goal_medical: profile.primary_goal == "Medical coverage",

        frequent_travel: profile.travel_high_risk_countries,
        dual_citizenship: profile.dual_citizenship,

        existing_insurance: profile.existing_insurance,
    })
}
