//! Readers for the files the command line consumes.
//!
//! - **ASV tables**: TSV/CSV with an `asv_id, sequence, <sample>...` header, or a JSON array of ASVs
//! - **FASTA files**: negative-control sequences, plain or gzip compressed
//!
//! ## Example
//!
//! ```rust,no_run
//! use edna_core::parsing::asv_table::parse_asv_table_file;
//! use edna_core::parsing::fasta::parse_fasta_sequences;
//! use std::path::Path;
//!
//! let asvs = parse_asv_table_file(Path::new("asvs.tsv")).unwrap();
//! let controls = parse_fasta_sequences(Path::new("blanks.fa.gz")).unwrap();
//! ```
//!
//! ## ASV table layout
//!
//! | Column | Description | Required |
//! |--------|-------------|----------|
//! | asv_id | Unique ASV identifier | Yes |
//! | sequence | Representative sequence | Yes |
//! | *sample* | Read count in that sample, one column per sample | No |
//!
//! Blank count cells read as 0. Negative or non-integer counts are rejected.

pub mod asv_table;
pub mod fasta;

use crate::utils::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Too many ASVs: {0} exceeds maximum allowed (1000000)")]
    TooManyAsvs(usize),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
