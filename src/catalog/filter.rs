//! Eligibility filtering for policies and riders
//!
//! The strict pass enforces every eligibility predicate. When it yields no
//! candidates, a relaxed pass drops only the goal test so that users whose
//! stated goal maps poorly onto the shelf (e.g. high medical risk with a
//! savings goal) still receive hard-constraint-compliant candidates.

use super::{Catalog, MedicalUnderwriting, PolicyDef, RiderDef};
use crate::features::{FeatureVector, MedicalRisk};

/// Outcome of policy filtering, recording whether the goal test was relaxed.
#[derive(Debug, Clone)]
pub struct PolicyCandidates<'a> {
    pub policies: Vec<&'a PolicyDef>,
    pub relaxed: bool,
}

/// Filter policies the user is eligible for.
pub fn filter_policies<'a>(catalog: &'a Catalog, fv: &FeatureVector) -> PolicyCandidates<'a> {
    let strict: Vec<&PolicyDef> = catalog
        .policies
        .iter()
        .filter(|p| policy_eligible(p, fv, false))
        .collect();

    if !strict.is_empty() {
        return PolicyCandidates {
            policies: strict,
            relaxed: false,
        };
    }

    let relaxed: Vec<&PolicyDef> = catalog
        .policies
        .iter()
        .filter(|p| policy_eligible(p, fv, true))
        .collect();

    PolicyCandidates {
        policies: relaxed,
        relaxed: true,
    }
}

fn policy_eligible(policy: &PolicyDef, fv: &FeatureVector, skip_goals: bool) -> bool {
    // Age eligibility
    let (min_age, max_age) = policy.age_range;
    if !(min_age..=max_age).contains(&fv.age) {
        return false;
    }

    // Income band
    if !policy.income_bands.contains(&fv.income_band) {
        return false;
    }

    // Employment type; empty list accepts any
    if !policy.employment_types.is_empty()
        && !policy.employment_types.contains(&fv.employment_type)
    {
        return false;
    }

    // Goal matching (dropped in the relaxed pass)
    if !skip_goals && !policy.goals.iter().any(|g| *g == fv.primary_goal) {
        return false;
    }

    // Medical underwriting
    match policy.medical_underwriting {
        MedicalUnderwriting::LowRiskOnly if fv.medical_risk != MedicalRisk::Low => return false,
        MedicalUnderwriting::ExcludeVeryHigh if fv.medical_risk == MedicalRisk::VeryHigh => {
            return false
        }
        _ => {}
    }

    // Family-protection products need a family to protect
    if policy
        .coverage
        .contains(&super::Risk::FamilyProtection)
        && policy.goals.iter().any(|g| g == "Family protection")
        && !fv.family_responsibility
    {
        return false;
    }

    // Retirement products only for retirement goals or approaching ages
    if policy.goals.iter().any(|g| g == "Retirement")
        && !fv.goal_retirement
        && !fv.age_above_45
    {
        return false;
    }

    // Employer-sponsored products require the group scheme
    if policy.requires_employer && !fv.group_policy {
        return false;
    }

    // Pure medical products are redundant for already-insured users
    // without a medical goal
    if policy.goals.iter().any(|g| g == "Medical coverage")
        && !fv.goal_medical
        && fv.existing_insurance
    {
        return false;
    }

    true
}

/// Filter riders attachable to the selected policy with at least one firing
/// trigger. Standalone riders bypass the attachment check.
pub fn filter_riders<'a>(
    catalog: &'a Catalog,
    policy: &PolicyDef,
    fv: &FeatureVector,
) -> Vec<&'a RiderDef> {
    catalog
        .riders
        .iter()
        .filter(|rider| rider.standalone || policy.attachable_riders.contains(&rider.id))
        .filter(|rider| rider.triggers.iter().any(|t| t.fires(fv)))
        .collect()
}
