use std::path::PathBuf;

use clap::Args;

use crate::assignment::engine::AssignmentEngine;
use crate::assignment::summary::{filter_by_confidence, BatchAssignment};
use crate::catalog::store::ReferenceCatalog;
use crate::cli::{block_on, load_asvs, load_catalog, load_config, load_resolver, tsv_field, OutputFormat};
use crate::core::asv::Asv;
use crate::core::lineage::TaxonomicAssignment;
use crate::matching::engine::MatchingEngine;

#[derive(Args)]
pub struct AssignArgs {
    /// ASV table (TSV, CSV, JSON) or FASTA file
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

    /// Minimum k-mer similarity for a reference match (0-1)
    #[arg(long)]
    pub min_identity: Option<f64>,

    /// Timeout for one habitat lookup, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Use the LCA of all near-best hits instead of the single best hit
    #[arg(long)]
    pub consensus: bool,

    /// Also list this many candidate hits per ASV (text output)
    #[arg(short = 'n', long, default_value = "0")]
    pub candidates: usize,
}

/// Execute assign subcommand
///
/// # Errors
///
/// Returns an error if the inputs cannot be read or the options are invalid.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: AssignArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(min_identity) = args.min_identity {
        config.assignment.min_identity = min_identity;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.assignment.resolver_timeout_ms = timeout_ms;
    }

    let catalog = load_catalog(args.catalog.as_deref())?;
    let asvs = load_asvs(&args.input)?;
    let resolver = load_resolver(args.habitats.as_deref())?;

    if verbose {
        eprintln!(
            "Loaded {} ASVs and {} reference sequences",
            asvs.len(),
            catalog.len()
        );
    }

    if catalog.is_empty() {
        eprintln!("Warning: Catalog is empty, every ASV will be unassigned.");
    }

    let threshold = config.assignment.high_confidence_threshold;
    let engine = AssignmentEngine::with_config(&catalog, resolver.as_ref(), config.assignment)?;
    let batch = if args.consensus {
        BatchAssignment::new(asvs.iter().map(|a| engine.consensus_assignment(a)).collect())
    } else {
        block_on(engine.assign_batch(&asvs))?
    };

    match format {
        OutputFormat::Text => {
            print_text_results(&batch, threshold);
            if args.candidates > 0 {
                print_candidates(&catalog, &asvs, args.candidates, engine.config().min_identity);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&batch)?),
        OutputFormat::Tsv => print_tsv_results(&batch.assignments),
    }

    Ok(())
}

fn print_text_results(batch: &BatchAssignment, threshold: u8) {
    let summary = &batch.summary;
    let id_width = batch
        .assignments
        .iter()
        .map(|a| a.asv_id.len())
        .max()
        .unwrap_or(3)
        .max(3);

    println!(
        "Taxonomic Assignment ({}/{} ASVs assigned)\n",
        summary.assigned_count, summary.total
    );
    println!(
        "{:<id_w$} {:>5} {:<30} {:<10} {:<6}",
        "ASV",
        "Conf",
        "Taxon",
        "Reference",
        "Marine",
        id_w = id_width
    );
    println!("{}", "-".repeat(id_width + 56));

    for assignment in &batch.assignments {
        let taxon = if assignment.is_assigned() {
            assignment.label()
        } else {
            "(unassigned)"
        };
        let marine = match assignment.is_marine {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        println!(
            "{:<id_w$} {:>5} {:<30} {:<10} {:<6}",
            assignment.asv_id,
            assignment.confidence,
            taxon,
            assignment.reference_id.as_deref().unwrap_or("-"),
            marine,
            id_w = id_width
        );
    }

    let buckets = filter_by_confidence(&batch.assignments, threshold);
    println!(
        "\nMean confidence: {:.1}  (high >= {threshold}: {}, low: {}, unassigned: {})",
        summary.mean_confidence,
        buckets.high.len(),
        buckets.low.len(),
        summary.unassigned_count
    );

    if !summary.phylum_counts.is_empty() {
        println!("\nPhyla:");
        for (phylum, count) in &summary.phylum_counts {
            println!("   {phylum}: {count}");
        }
    }
}

fn print_candidates(catalog: &ReferenceCatalog, asvs: &[Asv], limit: usize, min_identity: f64) {
    let matcher = MatchingEngine::new(catalog);
    println!("\nCandidate hits (similarity >= {min_identity:.2}):");
    for asv in asvs {
        let hits = matcher.rank_hits(&asv.representative_sequence, min_identity);
        if hits.is_empty() {
            continue;
        }
        println!("   {}", asv.id);
        for hit in hits.iter().take(limit) {
            println!(
                "      {:<10} {:>6.1}%  {}",
                hit.entry.id,
                hit.similarity * 100.0,
                hit.entry.lineage.to_path()
            );
        }
    }
}

fn print_tsv_results(assignments: &[TaxonomicAssignment]) {
    println!(
        "asv_id\tconfidence\tmethod\tkingdom\tphylum\tclass\torder\tfamily\tgenus\tspecies\treference_id\tis_marine"
    );
    for a in assignments {
        let lineage = &a.lineage;
        let ranks: Vec<String> = crate::core::types::Rank::ALL
            .iter()
            .map(|&rank| tsv_field(lineage.get(rank).unwrap_or("")))
            .collect();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            tsv_field(&a.asv_id),
            a.confidence,
            a.method,
            ranks.join("\t"),
            a.reference_id.as_deref().unwrap_or(""),
            a.is_marine.map_or(String::new(), |m| m.to_string())
        );
    }
}
