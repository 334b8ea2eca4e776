use std::collections::HashMap;
use std::path::PathBuf;

use clap::Args;

use crate::assignment::engine::AssignmentEngine;
use crate::cli::{block_on, load_asvs, load_catalog, load_config, load_resolver, tsv_field, OutputFormat};
use crate::contamination::report::ContaminationReport;
use crate::contamination::screener::{remove_contaminants, ContaminationScreener};
use crate::core::types::{ContaminationType, Environment, Severity};
use crate::parsing::fasta::parse_fasta_sequences;

#[derive(Args)]
pub struct ScreenArgs {
    /// ASV table (TSV, CSV, JSON)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Path to custom catalog file
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Analysis options (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Species habitat table (JSON object of species -> is_marine)
    #[arg(long)]
    pub habitats: Option<PathBuf>,

    /// Expected environment (marine, freshwater, terrestrial)
    #[arg(long)]
    pub environment: Option<Environment>,

    /// FASTA of sequences observed in negative controls (may be gzipped)
    #[arg(long)]
    pub negative_controls: Option<PathBuf>,

    /// Minimum severity for removal (low, medium, high)
    #[arg(long)]
    pub min_severity: Option<Severity>,

    /// Write the ASVs that survive removal to this JSON file
    #[arg(long)]
    pub cleaned: Option<PathBuf>,
}

/// Execute screen subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be read or the options are invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ScreenArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(environment) = args.environment {
        config.contamination.expected_environment = environment;
    }
    if let Some(min_severity) = args.min_severity {
        config.contamination.min_severity = min_severity;
    }
    if let Some(path) = &args.negative_controls {
        let sequences = parse_fasta_sequences(path)?;
        if verbose {
            eprintln!("Loaded {} negative-control sequences", sequences.len());
        }
        config.contamination.negative_control_sequences.extend(sequences);
    }

    let catalog = load_catalog(args.catalog.as_deref())?;
    let asvs = load_asvs(&args.input)?;
    let resolver = load_resolver(args.habitats.as_deref())?;

    // Lab-contaminant and habitat checks need the assignments
    let engine = AssignmentEngine::with_config(&catalog, resolver.as_ref(), config.assignment)?;
    let batch = block_on(engine.assign_batch(&asvs))?;
    let assignments: HashMap<_, _> = batch
        .assignments
        .into_iter()
        .map(|a| (a.asv_id.clone(), a))
        .collect();

    let screener = ContaminationScreener::with_config(&config.contamination)?;
    let reports = screener.screen_samples(&asvs, &assignments);

    if verbose {
        eprintln!("Screened {} samples", reports.len());
    }

    match format {
        OutputFormat::Text => print_text_results(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Tsv => print_tsv_results(&reports),
    }

    if let Some(output) = &args.cleaned {
        let flags = screener.detect_all(&asvs, &assignments);
        let removal = remove_contaminants(&asvs, &flags, screener.min_severity());
        std::fs::write(output, serde_json::to_string_pretty(&removal.cleaned)?)?;
        eprintln!(
            "Removed {} ASVs ({}); wrote {} to {}",
            removal.removed.len(),
            if removal.removed.is_empty() {
                "none".to_string()
            } else {
                removal.removed.join(", ")
            },
            removal.cleaned.len(),
            output.display()
        );
    }

    Ok(())
}

fn print_text_results(reports: &[ContaminationReport]) {
    if reports.is_empty() {
        println!("No samples found.");
        return;
    }

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let status = if report.is_clean { "CLEAN" } else { "FLAGGED" };
        println!(
            "Sample {} ({status}, score {})",
            report.sample_id, report.contamination_score
        );
        println!(
            "   ASVs: {} observed, {} flagged",
            report.total_asvs, report.flagged_asvs
        );

        for flag in &report.flags {
            println!(
                "   [{:<6}] {:<16} {:<12} {}",
                flag.severity.to_string(),
                flag.contamination_type.to_string(),
                flag.asv_id,
                flag.reason
            );
            if !flag.recommendation.is_empty() {
                println!("            -> {}", flag.recommendation);
            }
        }
    }
}

fn print_tsv_results(reports: &[ContaminationReport]) {
    println!(
        "sample_id\ttotal_asvs\tflagged_asvs\thigh\tmedium\tlow\tlab_contaminant\tnegative_control\tunexpected_taxa\tindex_bleed\tscore\tis_clean"
    );
    for r in reports {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            tsv_field(&r.sample_id),
            r.total_asvs,
            r.flagged_asvs,
            r.severity_count(Severity::High),
            r.severity_count(Severity::Medium),
            r.severity_count(Severity::Low),
            r.type_count(ContaminationType::LabContaminant),
            r.type_count(ContaminationType::NegativeControl),
            r.type_count(ContaminationType::UnexpectedTaxa),
            r.type_count(ContaminationType::IndexBleed),
            r.contamination_score,
            r.is_clean
        );
    }
}
