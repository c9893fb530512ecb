//! Premium estimation collaborator
//!
//! The engine treats premium estimation as a pluggable dependency: anything
//! implementing `PremiumEstimator` can stand in for the real actuarial
//! calculation. `StandardPremiumTable` is the built-in approximation based on
//! rate tables and load multipliers.

use crate::catalog::{PolicyDef, RiderDef};
use crate::features::{FeatureVector, MedicalRisk};

/// Estimates a monthly premium for a candidate given the user's features.
/// Implementations must be pure and must return a value >= 0.
pub trait PremiumEstimator: Send + Sync {
    /// Estimated monthly premium for a base policy.
    fn policy_premium(&self, fv: &FeatureVector, policy: &PolicyDef) -> f64;

    /// Estimated additional monthly premium for a rider.
    fn rider_premium(&self, fv: &FeatureVector, rider: &RiderDef) -> f64;
}

/// Premium rate cap as a percentage of monthly income.
const MAX_PREMIUM_PCT: f64 = 20.0;

/// Table-driven premium approximation.
///
/// Starts from the candidate's base rate (% of monthly income) and applies
/// age, medical-risk, smoker and hazardous-occupation loadings. Riders skip
/// the loadings: their base rates already price the trigger populations.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPremiumTable;

impl StandardPremiumTable {
    fn age_multiplier(age: i32) -> f64 {
        if age > 50 {
            1.4
        } else if age > 40 {
            1.2
        } else if age < 30 {
            0.8
        } else {
            1.0
        }
    }

    fn medical_multiplier(risk: MedicalRisk) -> f64 {
        match risk {
            MedicalRisk::Low => 1.0,
            MedicalRisk::Medium => 1.2,
            MedicalRisk::High => 1.5,
            MedicalRisk::VeryHigh => 2.0,
        }
    }
}

impl PremiumEstimator for StandardPremiumTable {
    fn policy_premium(&self, fv: &FeatureVector, policy: &PolicyDef) -> f64 {
        let mut rate = policy.base_premium_pct;

        rate *= Self::age_multiplier(fv.age);
        rate *= Self::medical_multiplier(fv.medical_risk);
        if fv.smoker {
            rate *= 1.3;
        }
        if fv.hazardous_job {
            rate *= 1.2;
        }

        rate.min(MAX_PREMIUM_PCT) / 100.0 * fv.monthly_income
    }

    fn rider_premium(&self, fv: &FeatureVector, rider: &RiderDef) -> f64 {
        rider.premium_pct / 100.0 * fv.monthly_income
    }
}
