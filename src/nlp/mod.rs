//! Profile text and the similarity collaborator
//!
//! The scoring core never computes similarity itself; it consumes a score in
//! [0, 1] from a collaborator behind the `Similarity` trait. A real
//! deployment plugs in an embedding model. `LexicalSimilarity` is the
//! built-in stand-in: deterministic token overlap, good enough to exercise
//! the pipeline end to end.

use crate::features::{FeatureVector, IncomeBand, MedicalRisk};
use std::collections::BTreeSet;

/// Similarity collaborator: scores how well a candidate's description
/// matches the user's profile text. Must return a value in [0, 1].
pub trait Similarity: Send + Sync {
    fn similarity(&self, user_text: &str, candidate_text: &str) -> f64;
}

/// Build the natural-language profile description that feeds the similarity
/// collaborator. Deterministic for a given feature vector.
pub fn build_user_text(fv: &FeatureVector) -> String {
    let mut text = format!(
        "{} year old person with {} income seeking insurance. Primary goal: {}.",
        fv.age,
        match fv.income_band {
            IncomeBand::Low => "low",
            IncomeBand::Mid => "mid",
            IncomeBand::High => "high",
        },
        if fv.primary_goal.is_empty() {
            "general protection"
        } else {
            &fv.primary_goal
        },
    );

    if let Some(secondary) = &fv.secondary_goal {
        text.push_str(&format!(" Secondary goal: {secondary}."));
    }

    if fv.dependents {
        text.push_str(&format!(
            " Has {} dependents requiring family protection.",
            fv.dependents_count
        ));
    }
    if fv.married {
        text.push_str(" Married with family responsibilities and spouse coverage needs.");
    }

    if fv.any_medical {
        text.push_str(" Has medical conditions");
        let mut conditions = Vec::new();
        if fv.chronic {
            conditions.push("chronic disease");
        }
        if fv.cardio {
            conditions.push("cardiovascular issues");
        }
        if fv.cancer {
            conditions.push("cancer history");
        }
        if !conditions.is_empty() {
            text.push_str(&format!(" including {}", conditions.join(", ")));
        }
        text.push_str(&format!(
            ". Medical risk level: {}.",
            match fv.medical_risk {
                MedicalRisk::Low => "low",
                MedicalRisk::Medium => "medium",
                MedicalRisk::High => "high",
                MedicalRisk::VeryHigh => "very high",
            }
        ));
        text.push_str(" Needs hospitalization and surgery coverage.");
    }

    if fv.smoker {
        text.push_str(" Smoker with elevated health risks.");
    }
    if fv.bmi_high {
        text.push_str(" Elevated BMI indicating health risk factors.");
    }
    if fv.hazardous_job || fv.hazardous_activities {
        text.push_str(" Works in a hazardous occupation with accident risk.");
    }

    if fv.age_above_45 {
        text.push_str(
            " At an age where retirement planning and critical illness coverage become important.",
        );
    } else if fv.age_above_40 {
        text.push_str(" Age-related health risks require consideration.");
    } else if fv.young {
        text.push_str(" Young with opportunity for long-term savings and affordable protection.");
    }

    if fv.existing_insurance {
        text.push_str(" Has existing insurance coverage.");
    }
    if fv.group_policy {
        text.push_str(" Eligible for employer-sponsored group insurance benefits.");
    }
    if fv.frequent_travel || fv.dual_citizenship {
        text.push_str(" Travels internationally and may need overseas treatment.");
    }

    text
}

/// Deterministic token-overlap similarity (Jaccard over lowercase word sets).
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

impl Similarity for LexicalSimilarity {
    fn similarity(&self, user_text: &str, candidate_text: &str) -> f64 {
        let user = tokens(user_text);
        let candidate = tokens(candidate_text);
        if user.is_empty() || candidate.is_empty() {
            return 0.0;
        }
        let overlap = user.intersection(&candidate).count() as f64;
        let union = user.union(&candidate).count() as f64;
        overlap / union
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract;
    use crate::profile::Profile;

    #[test]
    fn test_similarity_in_unit_range_and_deterministic() {
        let sim = LexicalSimilarity;
        let a = "family protection and income replacement for dependents";
        let b = "protection focused life insurance for family income replacement";

        let s1 = sim.similarity(a, b);
        let s2 = sim.similarity(a, b);
        assert!((0.0..=1.0).contains(&s1));
        assert!(s1 > 0.0);
        assert_eq!(s1.to_bits(), s2.to_bits());

        // Disjoint vocabulary scores zero.
        assert_eq!(sim.similarity("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn test_user_text_reflects_profile() {
        let profile: Profile = serde_json::from_str(
            r#"{"age": 45, "monthly_income": 120000.0, "dependents_count": 2,
                "marital_status": "Married", "primary_goal": "Family protection",
                "smoker": true}"#,
        )
        .unwrap();
        let fv = extract(&profile).unwrap();
        let text = build_user_text(&fv);

        assert!(text.contains("Family protection"));
        assert!(text.contains("2 dependents"));
        assert!(text.contains("Smoker"));
        assert!(text.contains("retirement planning"));
    }
}
