use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::assignment::engine::AssignmentEngine;
use crate::assignment::resolver::OfflineResolver;
use crate::cli::{load_asvs, load_catalog, load_config, tsv_field, OutputFormat};
use crate::core::abundance::SampleSet;
use crate::diversity::alpha::{alpha_diversity_all, AlphaDiversity};
use crate::diversity::beta::{pairwise_beta_diversity, BetaDiversity};
use crate::diversity::rarefaction::{rarefaction_curves, RarefactionCurve};

#[derive(Args)]
pub struct DiversityArgs {
    /// ASV table (TSV, CSV, JSON)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Path to custom catalog file
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Analysis options (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Count ASVs as species instead of grouping them by assigned taxon
    #[arg(long)]
    pub by_asv: bool,

    /// Also compute rarefaction curves
    #[arg(long)]
    pub rarefaction: bool,

    /// Number of depths per rarefaction curve
    #[arg(long)]
    pub steps: Option<usize>,

    /// Random subsamples per depth
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Seed for reproducible rarefaction
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Serialize)]
struct DiversityReport {
    alpha: Vec<AlphaDiversity>,
    beta: Vec<BetaDiversity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rarefaction: Vec<RarefactionCurve>,
}

/// Execute diversity subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be read or the options are invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DiversityArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(steps) = args.steps {
        config.rarefaction.steps = steps;
    }
    if let Some(iterations) = args.iterations {
        config.rarefaction.iterations = iterations;
    }
    config.rarefaction.validate()?;

    let asvs = load_asvs(&args.input)?;

    let assignments = if args.by_asv {
        HashMap::new()
    } else {
        let catalog = load_catalog(args.catalog.as_deref())?;
        let engine = AssignmentEngine::with_config(&catalog, &OfflineResolver, config.assignment)?;
        // Labels only; the offline resolver never suspends
        let batch = super::block_on(engine.assign_batch(&asvs))?;
        batch
            .assignments
            .into_iter()
            .map(|a| (a.asv_id.clone(), a))
            .collect()
    };

    let samples = SampleSet::from_asvs(&asvs, &assignments);
    if verbose {
        eprintln!("Built abundance tables for {} samples", samples.len());
    }

    let rarefaction = if args.rarefaction {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        rarefaction_curves(&samples, &config.rarefaction, &mut rng)?
    } else {
        Vec::new()
    };

    let report = DiversityReport {
        alpha: alpha_diversity_all(&samples),
        beta: pairwise_beta_diversity(&samples),
        rarefaction,
    };

    match format {
        OutputFormat::Text => print_text_results(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Tsv => print_tsv_results(&report),
    }

    Ok(())
}

fn print_text_results(report: &DiversityReport) {
    println!("Alpha Diversity ({} samples)\n", report.alpha.len());
    println!(
        "{:<16} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "Sample", "Richness", "Shannon", "Simpson", "InvSimp", "Evenness", "Dominance", "Chao1", "Reads"
    );
    for a in &report.alpha {
        println!(
            "{:<16} {:>8} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.1} {:>10}",
            a.sample_id,
            a.richness,
            a.shannon,
            a.simpson,
            a.inverse_simpson,
            a.evenness,
            a.dominance,
            a.chao1,
            a.total_reads
        );
    }

    if !report.beta.is_empty() {
        println!("\nBeta Diversity ({} pairs)\n", report.beta.len());
        println!(
            "{:<16} {:<16} {:>11} {:>8} {:>8} {:>7}",
            "Sample 1", "Sample 2", "Bray-Curtis", "Jaccard", "Sorensen", "Shared"
        );
        for b in &report.beta {
            println!(
                "{:<16} {:<16} {:>11.3} {:>8.3} {:>8.3} {:>7}",
                b.sample1, b.sample2, b.bray_curtis, b.jaccard, b.sorensen, b.shared_species
            );
        }
    }

    for curve in &report.rarefaction {
        let status = if curve.saturation_reached {
            "saturated"
        } else {
            "not saturated"
        };
        println!(
            "\nRarefaction {} (Chao1 {:.1}, {status})",
            curve.sample_id, curve.estimated_richness
        );
        for p in &curve.points {
            println!(
                "   depth {:>8}: {:>8.2} ± {:.2}",
                p.depth, p.mean_richness, p.std_error
            );
        }
    }
}

fn print_tsv_results(report: &DiversityReport) {
    println!("sample_id\trichness\tshannon\tsimpson\tinverse_simpson\tevenness\tdominance\tchao1\ttotal_reads");
    for a in &report.alpha {
        println!(
            "{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{:.6}\t{}",
            tsv_field(&a.sample_id),
            a.richness,
            a.shannon,
            a.simpson,
            a.inverse_simpson,
            a.evenness,
            a.dominance,
            a.chao1,
            a.total_reads
        );
    }

    if !report.beta.is_empty() {
        println!();
        println!("sample1\tsample2\tbray_curtis\tjaccard\tsorensen\tshared_species\tunique_to_sample1\tunique_to_sample2");
        for b in &report.beta {
            println!(
                "{}\t{}\t{:.6}\t{:.6}\t{:.6}\t{}\t{}\t{}",
                tsv_field(&b.sample1),
                tsv_field(&b.sample2),
                b.bray_curtis,
                b.jaccard,
                b.sorensen,
                b.shared_species,
                b.unique_to_sample1,
                b.unique_to_sample2
            );
        }
    }

    if !report.rarefaction.is_empty() {
        println!();
        println!("sample_id\tdepth\tmean_richness\tstd_error\testimated_richness\tsaturation_reached");
        for curve in &report.rarefaction {
            for p in &curve.points {
                println!(
                    "{}\t{}\t{:.2}\t{:.6}\t{:.6}\t{}",
                    tsv_field(&curve.sample_id),
                    p.depth,
                    p.mean_richness,
                    p.std_error,
                    curve.estimated_richness,
                    curve.saturation_reached
                );
            }
        }
    }
}
