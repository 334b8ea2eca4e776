//! Command-line interface for edna-core.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **assign**: Assign taxonomy to the ASVs of a table or FASTA file
//! - **screen**: Flag contamination per sample and optionally drop contaminants
//! - **diversity**: Alpha, beta and rarefaction statistics per sample
//! - **catalog**: List, show, or export the reference catalog
//!
//! ## Usage
//!
//! ```text
//! # Assign taxonomy with the embedded catalog
//! edna-core assign asvs.tsv
//!
//! # JSON output for scripting
//! edna-core assign asvs.tsv --format json
//!
//! # Screen a freshwater survey against extraction blanks
//! edna-core screen asvs.tsv --environment freshwater --negative-controls blanks.fa.gz
//!
//! # Reproducible rarefaction curves
//! edna-core diversity asvs.tsv --rarefaction --seed 42
//! ```

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::assignment::resolver::{OfflineResolver, StaticResolver, TaxonResolver};
use crate::catalog::store::ReferenceCatalog;
use crate::config::AnalysisConfig;
use crate::core::asv::Asv;
use crate::parsing;

pub mod assign;
pub mod catalog;
pub mod diversity;
pub mod screen;

#[derive(Parser)]
#[command(name = "edna-core")]
#[command(version)]
#[command(about = "Taxonomy, contamination and diversity for eDNA surveys")]
#[command(
    long_about = "edna-core turns denoised ASVs from eDNA water samples into report-ready results.\n\nIt provides:\n- Taxonomic assignment by k-mer matching against a curated reference catalog\n- Contamination screening (lab contaminants, adapters, negative controls, unexpected taxa, index bleed)\n- Alpha and beta diversity plus rarefaction curves"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assign taxonomy to ASVs
    Assign(assign::AssignArgs),

    /// Screen samples for contamination
    Screen(screen::ScreenArgs),

    /// Compute diversity statistics
    Diversity(diversity::DiversityArgs),

    /// Inspect the reference catalog
    Catalog(catalog::CatalogArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Load a catalog from `path`, or the embedded one
fn load_catalog(path: Option<&Path>) -> anyhow::Result<ReferenceCatalog> {
    let catalog = match path {
        Some(path) => ReferenceCatalog::load_from_file(path)?,
        None => ReferenceCatalog::load_embedded()?,
    };
    Ok(catalog)
}

/// Load options from a JSON file, or the defaults
fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    let config = match path {
        Some(path) => AnalysisConfig::load_from_file(path)?,
        None => AnalysisConfig::default(),
    };
    Ok(config)
}

/// Read ASVs from a FASTA file or an ASV table
fn load_asvs(path: &Path) -> anyhow::Result<Vec<Asv>> {
    let asvs = if parsing::fasta::is_fasta_file(path) {
        parsing::fasta::parse_fasta_asvs(path)?
    } else {
        parsing::asv_table::parse_asv_table_file(path)?
    };
    Ok(asvs)
}

/// Static habitat table when given, otherwise no habitat verification
fn load_resolver(habitats: Option<&Path>) -> anyhow::Result<Box<dyn TaxonResolver>> {
    let resolver: Box<dyn TaxonResolver> = match habitats {
        Some(path) => Box::new(StaticResolver::load_from_file(path)?),
        None => Box::new(OfflineResolver),
    };
    Ok(resolver)
}

/// Run an async batch on a fresh runtime
fn block_on<F: std::future::Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new()?;
    Ok(runtime.block_on(future))
}

/// Escape a field for TSV output
fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n'], " ")
}
