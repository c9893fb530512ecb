//! Generate a recommendation report for a user profile
//!
//! Reads a profile JSON file, runs the full pipeline against the built-in
//! (or a supplied) catalog, and prints a sectioned report.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use policy_recommender::nlp::LexicalSimilarity;
use policy_recommender::{Catalog, EngineConfig, Profile, RecommendationEngine};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Recommend an insurance policy and riders for a profile")]
struct Args {
    /// Path to the profile JSON file
    profile: PathBuf,

    /// Optional catalog JSON file (defaults to the built-in shelf)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Optional engine configuration JSON (weights, thresholds)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit the raw recommendation document as JSON instead of a report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let profile = Profile::from_json_file(&args.profile)
        .with_context(|| format!("loading profile {}", args.profile.display()))?;

    let catalog = match &args.catalog {
        Some(path) => Catalog::from_json_file(path)?,
        None => Catalog::builtin(),
    };

    let config: EngineConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("loading config {}", path.display()))?;
            serde_json::from_str(&text).context("parsing engine config")?
        }
        None => EngineConfig::default(),
    };

    let engine = RecommendationEngine::new(catalog, config);
    let recommendation = engine.recommend(&profile, &LexicalSimilarity)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    println!("{}", "=".repeat(70));
    println!("INSURANCE RECOMMENDATION  ({})", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    println!("{}", "=".repeat(70));

    let Some(policy) = &recommendation.policy else {
        println!("\nNo eligible policies found for this profile.");
        println!("\nIdentified risks:");
        for risk in &recommendation.user_risks {
            println!("  - {}", risk.display_name());
        }
        return Ok(());
    };

    println!("\nRecommended policy: {}", policy.result.candidate_id);
    println!(
        "Confidence: {:.1}% ({:?})",
        policy.result.final_score * 100.0,
        policy.explanation.confidence_level
    );
    if recommendation.relaxed_eligibility {
        println!("Note: goal matching was relaxed to find eligible policies.");
    }

    if !policy.explanation.primary_reasons.is_empty() {
        println!("\nWhy this policy:");
        for (i, reason) in policy.explanation.primary_reasons.iter().enumerate() {
            println!("  {}. {reason}", i + 1);
        }
    }
    if !policy.explanation.supporting_factors.is_empty() {
        println!("\nSupporting factors:");
        for factor in &policy.explanation.supporting_factors {
            println!("  - {factor}");
        }
    }
    if !policy.explanation.concerns.is_empty() {
        println!("\nConsiderations:");
        for concern in &policy.explanation.concerns {
            println!("  ! {concern}");
        }
    }

    println!("\nComponent scores:");
    for (component, value) in &policy.result.components {
        println!("  {:<12} {:.1}%", component.label(), value * 100.0);
    }

    if let Some(coverage) = &recommendation.coverage {
        println!("\n{}", "-".repeat(70));
        println!("Coverage completeness: {:.1}%", coverage.completeness * 100.0);
        if !coverage.gaps.is_empty() {
            println!("Remaining gaps:");
            for gap in &coverage.gaps {
                println!("  ! {}", gap.display_name());
            }
        }
    }

    if !recommendation.primary_riders.is_empty() {
        println!("\n{}", "-".repeat(70));
        println!("Primary riders:");
        for rider in &recommendation.primary_riders {
            println!(
                "  {:<24} {:.1}%{}",
                rider.result.candidate_id,
                rider.score * 100.0,
                if rider.fills_gaps.is_empty() {
                    String::new()
                } else {
                    format!(
                        "  (fills: {})",
                        rider
                            .fills_gaps
                            .iter()
                            .map(|g| g.display_name())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                }
            );
        }
    }

    if !recommendation.alternate_riders.is_empty() {
        println!("\nAlternate riders:");
        for rider in &recommendation.alternate_riders {
            println!("  {:<24} {:.1}%", rider.result.candidate_id, rider.score * 100.0);
        }
    }

    println!("\n{}", "-".repeat(70));
    println!("Feature contribution analysis:");
    println!(
        "  Baseline {:.3} -> final {:.3} (net {:+.3})",
        policy.attribution.baseline,
        policy.attribution.final_score,
        policy.attribution.final_score - policy.attribution.baseline
    );
    for entry in &policy.attribution.contributions {
        if entry.contribution.abs() >= 0.005 {
            println!("  {:+.3}  {}", entry.contribution, entry.feature);
        }
    }

    if !recommendation.failures.is_empty() {
        println!("\nCandidates that failed scoring:");
        for failure in &recommendation.failures {
            println!("  {}: {}", failure.candidate_id, failure.error);
        }
    }

    Ok(())
}
