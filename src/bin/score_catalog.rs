//! Score every catalog candidate for one profile and write a CSV
//!
//! Skips eligibility filtering on purpose: the output is the full score
//! surface, useful for comparing weight sets and auditing individual
//! component scores.

use anyhow::{Context, Result};
use clap::Parser;
use policy_recommender::nlp::{build_user_text, LexicalSimilarity, Similarity};
use policy_recommender::scoring::{self, StandardPremiumTable};
use policy_recommender::{extract, Catalog, Profile};
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Score all policies and riders for a profile, writing CSV")]
struct Args {
    /// Path to the profile JSON file
    profile: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = "catalog_scores.csv")]
    output: PathBuf,

    /// Optional catalog JSON file (defaults to the built-in shelf)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

struct Row {
    kind: &'static str,
    id: String,
    rule: f64,
    nlp: f64,
    trigger: Option<f64>,
    financial: f64,
    final_score: f64,
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

    let fv = extract(&profile)?;
    let user_text = build_user_text(&fv);
    let estimator = StandardPremiumTable;

    let policy_rows: Vec<Row> = catalog
        .policies
        .par_iter()
        .filter_map(|policy| {
            let sim = LexicalSimilarity.similarity(&user_text, &policy.text);
            scoring::score_policy(&fv, policy, sim, &estimator, None)
                .ok()
                .map(|r| Row {
                    kind: "policy",
                    id: r.candidate_id.clone(),
                    rule: r.components[&scoring::Component::Rule],
                    nlp: r.components[&scoring::Component::Nlp],
                    trigger: None,
                    financial: r.components[&scoring::Component::Financial],
                    final_score: r.final_score,
                })
        })
        .collect();

    let rider_rows: Vec<Row> = catalog
        .riders
        .par_iter()
        .filter_map(|rider| {
            let sim = LexicalSimilarity.similarity(&user_text, &rider.text);
            scoring::score_rider(&fv, rider, sim, &estimator, None)
                .ok()
                .map(|r| Row {
                    kind: "rider",
                    id: r.candidate_id.clone(),
                    rule: r.components[&scoring::Component::Rule],
                    nlp: r.components[&scoring::Component::Nlp],
                    trigger: r.components.get(&scoring::Component::Trigger).copied(),
                    financial: r.components[&scoring::Component::Financial],
                    final_score: r.final_score,
                })
        })
        .collect();

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(["kind", "id", "rule", "nlp", "trigger", "financial", "final"])?;

    let mut rows = policy_rows;
    rows.extend(rider_rows);
    rows.sort_by(|a, b| {
        a.kind
            .cmp(b.kind)
            .then_with(|| b.final_score.total_cmp(&a.final_score))
            .then_with(|| a.id.cmp(&b.id))
    });

    for row in &rows {
        writer.write_record([
            row.kind.to_string(),
            row.id.clone(),
            format!("{:.6}", row.rule),
            format!("{:.6}", row.nlp),
            row.trigger.map_or(String::new(), |t| format!("{t:.6}")),
            format!("{:.6}", row.financial),
            format!("{:.6}", row.final_score),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {} rows to {}", rows.len(), args.output.display());
    Ok(())
}
