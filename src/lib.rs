//! # edna-core
//!
//! The analytic core of an environmental DNA (eDNA) survey pipeline.
//!
//! Water samples are sequenced for a barcode marker and denoised into
//! amplicon sequence variants (ASVs), each with read counts per sample.
//! `edna-core` takes those ASVs and produces the three results a survey
//! report is built from: what each ASV is, which ASVs are contamination,
//! and how diverse each sample is.
//!
//! ## Features
//!
//! - **Taxonomic assignment**: k-mer matching against a curated reference
//!   catalog, with habitat verification through a pluggable resolver
//! - **Consensus assignment**: lowest common ancestor of near-best hits
//! - **Contamination screening**: lab contaminants, adapter read-through,
//!   negative-control matches, unexpected taxa and index bleed
//! - **Diversity**: Shannon, Simpson, Chao1, Bray-Curtis, Jaccard and
//!   seeded rarefaction curves
//!
//! ## Example
//!
//! ```rust,no_run
//! use edna_core::{MatchingEngine, ReferenceCatalog};
//! use edna_core::parsing::asv_table::parse_asv_table_text;
//!
//! // Load the embedded catalog of reference barcodes
//! let catalog = ReferenceCatalog::load_embedded().unwrap();
//!
//! // Parse an ASV table
//! let table = "asv_id\tsequence\tS1\nASV_1\tACGTACGTACGTACGTACGT\t120\n";
//! let asvs = parse_asv_table_text(table, '\t').unwrap();
//!
//! // Rank references for each ASV
//! let engine = MatchingEngine::new(&catalog);
//! for asv in &asvs {
//!     for hit in engine.rank_hits(&asv.representative_sequence, 0.8) {
//!         println!("{}: {} {:.1}%", asv.id, hit.entry.id, hit.similarity * 100.0);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`assignment`]: Assignment engine, taxonomy resolver seam and LCA
//! - [`catalog`]: Reference barcode catalog storage
//! - [`contamination`]: Detectors, per-sample reports and removal
//! - [`diversity`]: Alpha, beta and rarefaction statistics
//! - [`core`]: ASVs, lineages, abundance tables and shared enums
//! - [`matching`]: k-mer similarity and hit ranking
//! - [`parsing`]: ASV table and FASTA readers
//! - [`config`]: Analysis options loaded from JSON
//! - [`cli`]: Command-line interface implementation

pub mod assignment;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod contamination;
pub mod core;
pub mod diversity;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use assignment::engine::{AssignmentConfig, AssignmentEngine};
pub use assignment::resolver::{OfflineResolver, StaticResolver, TaxonResolver};
pub use catalog::store::{ReferenceCatalog, ReferenceEntry};
pub use config::AnalysisConfig;
pub use contamination::flag::ContaminationFlag;
pub use contamination::report::ContaminationReport;
pub use contamination::screener::ContaminationScreener;
pub use core::abundance::{AbundanceData, SampleSet};
pub use core::asv::Asv;
pub use core::lineage::{Lineage, TaxonomicAssignment};
pub use core::types::*;
pub use matching::engine::{MatchingEngine, ReferenceHit};
