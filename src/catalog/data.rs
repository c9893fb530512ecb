//! Built-in product shelf
//!
//! Six base policies and twenty-two riders with their eligibility data,
//! trigger conditions, coverage sets and base premium rates. Premium rates
//! are monthly premium as a percentage of monthly income.

use super::{MedicalUnderwriting, PolicyDef, RiderDef, Risk, RiskSet, Trigger};
use crate::features::IncomeBand;
use crate::profile::EmploymentType;

fn risks(items: &[Risk]) -> RiskSet {
    items.iter().copied().collect()
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn builtin_policies() -> Vec<PolicyDef> {
    use EmploymentType::*;
    use IncomeBand::*;

    vec![
        PolicyDef {
            id: "flex_life".to_string(),
            name: "FlexLife".to_string(),
            text: "Hybrid life insurance combining investment and protection. \
                   Short premium payment terms with long coverage. Provides \
                   liquidity through partial withdrawals and top-ups. Suitable \
                   for stable income earners seeking savings and flexibility."
                .to_string(),
            age_range: (25, 60),
            income_bands: vec![Mid, High],
            goals: ids(&["Savings", "Stable income", "Retirement with liquidity"]),
            employment_types: vec![Permanent, SelfEmployed],
            medical_underwriting: MedicalUnderwriting::ExcludeVeryHigh,
            requires_employer: false,
            attachable_riders: ids(&[
                "hospitalisation",
                "critical_illness",
                "tpd",
                "adb",
                "spouse_benefit",
                "child_health",
                "income_protection",
                "premium_waiver",
            ]),
            coverage: risks(&[Risk::Death, Risk::Retirement, Risk::FamilyProtection]),
            base_premium_pct: 7.0,
        },
        PolicyDef {
            id: "life_plus".to_string(),
            name: "Life+".to_string(),
            text: "Protection-focused life insurance. Designed for family \
                   protection and income replacement. Highly customizable with \
                   a wide range of riders."
                .to_string(),
            age_range: (18, 65),
            income_bands: vec![Low, Mid, High],
            goals: ids(&["Family protection", "Income replacement"]),
            employment_types: vec![Permanent, SelfEmployed, Contract],
            medical_underwriting: MedicalUnderwriting::Standard,
            requires_employer: false,
            attachable_riders: ids(&[
                "hospital_cash",
                "critical_illness",
                "surgery_benefit",
                "disability_income",
                "adb",
                "child_health",
                "spouse_benefit",
                "funeral_benefit",
            ]),
            coverage: risks(&[Risk::Death, Risk::FamilyProtection]),
            base_premium_pct: 5.0,
        },
        PolicyDef {
            id: "health_360".to_string(),
            name: "Health360".to_string(),
            text: "Comprehensive health insurance with high annual limits. \
                   Covers hospitalization, surgery, ICU, and overseas \
                   treatment. Suitable for individuals and families with \
                   medical risk."
                .to_string(),
            age_range: (0, 80),
            income_bands: vec![Low, Mid, High],
            goals: ids(&["Medical coverage"]),
            employment_types: vec![],
            medical_underwriting: MedicalUnderwriting::Standard,
            requires_employer: false,
            attachable_riders: ids(&[
                "opd",
                "maternity",
                "organ_transplant",
                "overseas_treatment",
                "chronic_medication",
            ]),
            coverage: risks(&[
                Risk::Hospitalization,
                Risk::Surgery,
                Risk::ChronicCare,
                Risk::CriticalIllness,
                Risk::FamilyProtection,
            ]),
            base_premium_pct: 6.0,
        },
        PolicyDef {
            id: "pension_advantage".to_string(),
            name: "Pension Advantage".to_string(),
            text: "Retirement-focused pension plan. Accumulates retirement \
                   income with premium waiver on disability. Can integrate \
                   health coverage during accumulation phase."
                .to_string(),
            age_range: (40, 65),
            income_bands: vec![Mid, High],
            goals: ids(&["Retirement"]),
            employment_types: vec![Permanent, SelfEmployed],
            medical_underwriting: MedicalUnderwriting::Standard,
            requires_employer: false,
            attachable_riders: ids(&["critical_illness", "premium_waiver"]),
            coverage: risks(&[Risk::Retirement, Risk::Death, Risk::Disability]),
            base_premium_pct: 8.0,
        },
        PolicyDef {
            id: "click_life".to_string(),
            name: "ClickLife".to_string(),
            text: "Simple digital life insurance. Paperless onboarding with \
                   quick approval. Designed for young and healthy individuals."
                .to_string(),
            age_range: (18, 40),
            income_bands: vec![Low, Mid],
            goals: ids(&["Simple life cover", "Cheap & quick"]),
            employment_types: vec![],
            medical_underwriting: MedicalUnderwriting::LowRiskOnly,
            requires_employer: false,
            attachable_riders: ids(&["adb", "cancer_care"]),
            coverage: risks(&[Risk::Death]),
            base_premium_pct: 3.0,
        },
        PolicyDef {
            id: "union_protect".to_string(),
            name: "Union Protect".to_string(),
            text: "Group life insurance scheme for employees or members. \
                   Employer-sponsored master policy with simplified \
                   underwriting. Provides affordable base life cover with \
                   optional group riders."
                .to_string(),
            age_range: (18, 65),
            income_bands: vec![Low, Mid, High],
            goals: ids(&["Employer benefits", "Group coverage"]),
            employment_types: vec![Permanent],
            medical_underwriting: MedicalUnderwriting::Standard,
            requires_employer: true,
            attachable_riders: ids(&[
                "group_adb",
                "group_disability",
                "group_critical_illness",
                "group_hospital_cash",
            ]),
            coverage: risks(&[Risk::Death, Risk::FamilyProtection]),
            // Employer-subsidized
            base_premium_pct: 2.0,
        },
    ]
}

pub(super) fn builtin_riders() -> Vec<RiderDef> {
    use Trigger::*;

    // (id, name, text, standalone, triggers, coverage, premium_pct, health, family)
    let rows: Vec<(
        &str,
        &str,
        &str,
        bool,
        Vec<Trigger>,
        RiskSet,
        f64,
        bool,
        bool,
    )> = vec![
        // Medical / health
        (
            "hospitalisation",
            "Hospitalisation",
            "Covers inpatient hospital expenses including surgery and ICU.",
            false,
            vec![AnyMedical, Dependents],
            risks(&[Risk::Hospitalization, Risk::Surgery]),
            1.8,
            true,
            false,
        ),
        (
            "opd",
            "OPD",
            "Covers outpatient consultations and diagnostics.",
            true,
            vec![Chronic],
            risks(&[Risk::Outpatient]),
            1.2,
            true,
            false,
        ),
        (
            "chronic_medication",
            "Chronic Medication",
            "Covers long-term medication for chronic diseases.",
            true,
            vec![Chronic],
            risks(&[Risk::ChronicCare]),
            1.5,
            true,
            false,
        ),
        (
            "maternity",
            "Maternity",
            "Covers maternity and newborn expenses.",
            false,
            vec![FemaleChildbearingAge],
            risks(&[Risk::Maternity]),
            1.0,
            true,
            true,
        ),
        (
            "organ_transplant",
            "Organ Transplant",
            "Provides financial support for organ transplant procedures.",
            true,
            vec![SevereOrganCondition],
            risks(&[Risk::OrganTransplant]),
            1.0,
            true,
            false,
        ),
        (
            "overseas_treatment",
            "Overseas Treatment",
            "Extends coverage for overseas medical treatment.",
            true,
            vec![FrequentTravel, DualCitizenship],
            risks(&[Risk::OverseasMedical]),
            0.8,
            true,
            false,
        ),
        // Life / protection
        (
            "critical_illness",
            "Critical Illness",
            "Pays lump sum on diagnosis of major critical illnesses.",
            false,
            vec![Cardio, Smoker, BmiHigh, AgeAbove40],
            risks(&[Risk::CriticalIllness]),
            1.5,
            true,
            false,
        ),
        (
            "cancer_care",
            "Cancer Care",
            "Stage-based payout on cancer diagnosis with income support.",
            true,
            vec![Cancer, AgeAbove40, FamilyCancerRisk],
            risks(&[Risk::CriticalIllness, Risk::ChronicCare]),
            1.5,
            true,
            false,
        ),
        (
            "adb",
            "ADB",
            "Provides additional payout in case of accidental death.",
            false,
            vec![HazardousJob, HazardousActivities],
            risks(&[Risk::Accident, Risk::Death]),
            0.5,
            false,
            false,
        ),
        (
            "tpd",
            "TPD",
            "Pays lump sum upon total permanent disability.",
            false,
            vec![HazardousJob, Dependents],
            risks(&[Risk::Disability]),
            1.2,
            false,
            false,
        ),
        (
            "disability_income",
            "Disability Income",
            "Pays monthly income if unable to work due to disability.",
            true,
            vec![Dependents, HighIncome],
            risks(&[Risk::Disability, Risk::FamilyProtection]),
            2.0,
            false,
            true,
        ),
        (
            "income_protection",
            "Income Protection",
            "Ensures income replacement during disability.",
            true,
            vec![Dependents, HighIncome],
            risks(&[Risk::Disability, Risk::FamilyProtection]),
            2.0,
            false,
            true,
        ),
        (
            "premium_waiver",
            "Premium Waiver",
            "Waives future premiums in case of disability or death.",
            false,
            vec![Dependents, RetirementGoal],
            risks(&[Risk::Disability]),
            0.5,
            false,
            false,
        ),
        // Family
        (
            "child_health",
            "Child Health",
            "Provides health coverage specifically for children.",
            false,
            vec![Dependents],
            risks(&[Risk::ChildHealth, Risk::FamilyProtection]),
            1.0,
            true,
            true,
        ),
        (
            "spouse_benefit",
            "Spouse Benefit",
            "Provides coverage or benefit for spouse.",
            false,
            vec![Married],
            risks(&[Risk::FamilyProtection]),
            1.0,
            false,
            true,
        ),
        (
            "funeral_benefit",
            "Funeral Benefit",
            "Provides lump sum to cover funeral expenses.",
            true,
            vec![LowIncome, Dependents],
            risks(&[Risk::Funeral, Risk::FamilyProtection]),
            0.3,
            false,
            true,
        ),
        // Cash / daily benefits
        (
            "hospital_cash",
            "Hospital Cash",
            "Pays a fixed daily cash amount for hospital stays.",
            true,
            vec![LowIncome, MedicalRisk],
            risks(&[Risk::Hospitalization]),
            0.8,
            true,
            false,
        ),
        (
            "surgery_benefit",
            "Surgery Benefit",
            "Pays a lump sum benefit for scheduled surgical procedures.",
            false,
            vec![AnyMedical],
            risks(&[Risk::Surgery]),
            1.0,
            true,
            false,
        ),
        // Group riders
        (
            "group_adb",
            "Group ADB",
            "Accidental death benefit under group policy.",
            false,
            vec![GroupPolicy],
            risks(&[Risk::Accident, Risk::Death]),
            0.3,
            false,
            false,
        ),
        (
            "group_disability",
            "Group Disability",
            "Disability benefit under employer-sponsored policy.",
            false,
            vec![GroupPolicy],
            risks(&[Risk::Disability]),
            0.8,
            false,
            false,
        ),
        (
            "group_critical_illness",
            "Group Critical Illness",
            "Critical illness coverage under group scheme.",
            false,
            vec![GroupPolicy],
            risks(&[Risk::CriticalIllness]),
            1.0,
            true,
            false,
        ),
        (
            "group_hospital_cash",
            "Group Hospital Cash",
            "Hospital cash benefit for group policy members.",
            false,
            vec![GroupPolicy],
            risks(&[Risk::Hospitalization]),
            0.5,
            true,
            false,
        ),
    ];

    rows.into_iter()
        .map(
            |(id, name, text, standalone, triggers, coverage, premium_pct, health, family)| {
                RiderDef {
                    id: id.to_string(),
                    name: name.to_string(),
                    text: text.to_string(),
                    standalone,
                    triggers,
                    coverage,
                    premium_pct,
                    health_related: health,
                    family_related: family,
                }
            },
        )
        .collect()
}
