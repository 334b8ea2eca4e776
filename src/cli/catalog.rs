use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::store::{ReferenceCatalog, ReferenceEntry};
use crate::cli::{load_catalog, tsv_field, OutputFormat};
use crate::matching::engine::MatchingEngine;
use crate::utils::validation::{normalize_sequence, validate_fraction};

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all references in the catalog
    List {
        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Filter by class (e.g., "Actinopterygii")
        #[arg(long)]
        class: Option<String>,

        /// Only list references recorded as marine
        #[arg(long)]
        marine: bool,
    },

    /// Show details of a specific reference
    Show {
        /// Reference ID
        #[arg(required = true)]
        id: String,

        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Export the catalog to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        /// Path to custom catalog file to export (defaults to embedded)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Rank catalog references against a single sequence
    Match {
        /// Query sequence
        #[arg(required = true)]
        sequence: String,

        /// Path to custom catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Minimum k-mer similarity (0-1)
        #[arg(long, default_value = "0.0")]
        min_identity: f64,

        /// Number of hits to show
        #[arg(short = 'n', long, default_value = "5")]
        top: usize,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List {
            catalog,
            class,
            marine,
        } => run_list(catalog, class.as_deref(), marine, format, verbose),
        CatalogCommands::Show { id, catalog } => run_show(&id, catalog, format),
        CatalogCommands::Export { output, catalog } => run_export(output, catalog),
        CatalogCommands::Match {
            sequence,
            catalog,
            min_identity,
            top,
        } => run_match(&sequence, catalog, min_identity, top, format),
    }
}

fn run_list(
    catalog_path: Option<PathBuf>,
    class_filter: Option<&str>,
    marine_only: bool,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref())?;

    if verbose {
        eprintln!("Loaded catalog with {} references", catalog.len());
    }

    let filtered: Vec<&ReferenceEntry> = catalog
        .entries
        .iter()
        .filter(|e| {
            if let Some(class) = class_filter {
                let matches = e
                    .lineage
                    .class
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(class));
                if !matches {
                    return false;
                }
            }
            !marine_only || e.is_marine == Some(true)
        })
        .collect();

    match format {
        OutputFormat::Text => {
            let id_width = filtered
                .iter()
                .map(|e| e.id.len())
                .max()
                .unwrap_or(2)
                .max(2);
            let taxon_width = filtered
                .iter()
                .map(|e| taxon_of(e).len().min(35))
                .max()
                .unwrap_or(5)
                .max(5);
            let class_width = filtered
                .iter()
                .map(|e| e.lineage.class.as_deref().unwrap_or("-").len())
                .max()
                .unwrap_or(5)
                .max(5);

            let total_width = id_width + taxon_width + class_width + 6 + 8 + 4;

            println!("Reference Catalog ({} references)\n", filtered.len());
            println!(
                "{:<id_w$} {:<tax_w$} {:<cls_w$} {:<6} {:>8}",
                "ID",
                "Taxon",
                "Class",
                "Marine",
                "Length",
                id_w = id_width,
                tax_w = taxon_width,
                cls_w = class_width
            );
            println!("{}", "-".repeat(total_width));

            for e in &filtered {
                println!(
                    "{:<id_w$} {:<tax_w$} {:<cls_w$} {:<6} {:>8}",
                    e.id,
                    truncate(taxon_of(e), taxon_width),
                    e.lineage.class.as_deref().unwrap_or("-"),
                    habitat_label(e.is_marine),
                    e.sequence.len(),
                    id_w = id_width,
                    tax_w = taxon_width,
                    cls_w = class_width
                );
                if verbose {
                    println!("  └─ {}", e.lineage.to_path());
                }
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = filtered
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "id": e.id,
                        "taxon": taxon_of(e),
                        "lineage": e.lineage,
                        "is_marine": e.is_marine,
                        "length": e.sequence.len(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\ttaxon\tclass\tis_marine\tlength\tlineage");
            for e in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    e.id,
                    tsv_field(taxon_of(e)),
                    tsv_field(e.lineage.class.as_deref().unwrap_or("")),
                    e.is_marine.map_or(String::new(), |m| m.to_string()),
                    e.sequence.len(),
                    tsv_field(&e.lineage.to_path())
                );
            }
        }
    }

    Ok(())
}

fn run_show(id: &str, catalog_path: Option<PathBuf>, format: OutputFormat) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref())?;

    let entry = catalog
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Reference '{id}' not found"))?;

    match format {
        OutputFormat::Text => {
            println!("Reference: {}\n", entry.id);
            println!("Taxon:    {}", taxon_of(entry));
            println!("Lineage:  {}", entry.lineage.to_path());
            println!("Marine:   {}", habitat_label(entry.is_marine));
            println!("Length:   {} bp", entry.sequence.len());
            println!("k-mers:   {}", entry.kmers.len());
            println!("\nSequence:");
            for line in entry.sequence.as_bytes().chunks(60) {
                println!("   {}", String::from_utf8_lossy(line));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entry)?);
        }
        OutputFormat::Tsv => {
            println!("rank\tname");
            for rank in crate::core::types::Rank::ALL {
                if let Some(name) = entry.lineage.get(rank) {
                    println!("{rank}\t{}", tsv_field(name));
                }
            }
        }
    }

    Ok(())
}

fn run_export(output: PathBuf, catalog_path: Option<PathBuf>) -> anyhow::Result<()> {
    let catalog = load_catalog(catalog_path.as_deref())?;

    let json = catalog.to_json()?;
    std::fs::write(&output, json)?;

    println!(
        "Exported {} references to {}",
        catalog.len(),
        output.display()
    );

    Ok(())
}

fn run_match(
    sequence: &str,
    catalog_path: Option<PathBuf>,
    min_identity: f64,
    top: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    validate_fraction("min_identity", min_identity)?;
    let catalog: ReferenceCatalog = load_catalog(catalog_path.as_deref())?;
    let query = normalize_sequence(sequence);

    let engine = MatchingEngine::new(&catalog);
    let hits: Vec<_> = engine
        .rank_hits(&query, min_identity)
        .into_iter()
        .take(top)
        .collect();

    match format {
        OutputFormat::Text => {
            if hits.is_empty() {
                println!("No references with similarity >= {min_identity:.2}");
                return Ok(());
            }
            println!("Top {} hits\n", hits.len());
            for (i, hit) in hits.iter().enumerate() {
                println!(
                    "#{} {:<10} {:>6.1}%  {}",
                    i + 1,
                    hit.entry.id,
                    hit.similarity * 100.0,
                    hit.entry.lineage.to_path()
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = hits
                .iter()
                .map(|h| {
                    serde_json::json!({
                        "reference_id": h.entry.id,
                        "similarity": h.similarity,
                        "lineage": h.entry.lineage,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("rank\treference_id\tsimilarity\tlineage");
            for (i, hit) in hits.iter().enumerate() {
                println!(
                    "{}\t{}\t{:.6}\t{}",
                    i + 1,
                    hit.entry.id,
                    hit.similarity,
                    tsv_field(&hit.entry.lineage.to_path())
                );
            }
        }
    }

    Ok(())
}

/// Most specific named rank of a reference
fn taxon_of(entry: &ReferenceEntry) -> &str {
    entry.lineage.most_specific().map_or("-", |(_, name)| name)
}

fn habitat_label(is_marine: Option<bool>) -> &'static str {
    match is_marine {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
