//! FASTA reader built on noodles.
//!
//! Used for negative-control sequences and for ad-hoc query sequences.
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::core::asv::Asv;
use crate::parsing::ParseError;
use crate::utils::validation::{check_asv_limit, normalize_sequence, validate_asvs};

/// One FASTA record with a normalized (uppercase) sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaSequence {
    pub name: String,
    pub sequence: String,
}

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Compressed FASTA
    if [".fa", ".fasta", ".fna"].iter().any(|ext| {
        path_str.ends_with(&format!("{ext}.gz")) || path_str.ends_with(&format!("{ext}.bgz"))
    }) {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read every record of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles`
/// if a record is malformed, or `ParseError::TooManyAsvs` past the limit.
pub fn parse_fasta_file(path: &Path) -> Result<Vec<FastaSequence>, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        let reader = BufReader::new(MultiGzDecoder::new(file));
        parse_fasta_reader(&mut fasta::io::Reader::new(reader))
    } else {
        let reader = BufReader::new(file);
        parse_fasta_reader(&mut fasta::io::Reader::new(reader))
    }
}

/// Sequences of a FASTA file, e.g. the ASVs seen in extraction blanks
///
/// # Errors
///
/// Same as [`parse_fasta_file`].
pub fn parse_fasta_sequences(path: &Path) -> Result<Vec<String>, ParseError> {
    Ok(parse_fasta_file(path)?
        .into_iter()
        .map(|record| record.sequence)
        .filter(|sequence| !sequence.is_empty())
        .collect())
}

/// Records as ASVs without abundance, named by their FASTA ids
///
/// # Errors
///
/// Same as [`parse_fasta_file`], plus `ParseError::Validation` for duplicate
/// names or non-nucleotide sequences.
pub fn parse_fasta_asvs(path: &Path) -> Result<Vec<Asv>, ParseError> {
    let asvs: Vec<Asv> = parse_fasta_file(path)?
        .into_iter()
        .map(|record| Asv::new(record.name, record.sequence))
        .collect();
    validate_asvs(&asvs)?;
    Ok(asvs)
}

/// Parse from a noodles FASTA reader
///
/// # Errors
///
/// Returns `ParseError::Noodles` if a record is malformed or
/// `ParseError::TooManyAsvs` past the limit.
pub fn parse_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<FastaSequence>, ParseError> {
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if check_asv_limit(records.len()).is_some() {
            return Err(ParseError::TooManyAsvs(records.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence = normalize_sequence(&String::from_utf8_lossy(record.sequence().as_ref()));
        records.push(FastaSequence { name, sequence });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FASTA: &[u8] = b">blank_1 extraction blank\nacgtacgtac\ngtacgt\n>blank_2\nTTTTGGGGCCCC\n";

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("controls.fa")));
        assert!(is_fasta_file(Path::new("controls.FASTA")));
        assert!(is_fasta_file(Path::new("controls.fna.gz")));
        assert!(is_fasta_file(Path::new("controls.fa.bgz")));
        assert!(!is_fasta_file(Path::new("controls.tsv")));
        assert!(!is_fasta_file(Path::new("controls.gz")));
    }

    #[test]
    fn test_parse_fasta_file() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(FASTA).unwrap();
        temp.flush().unwrap();

        let records = parse_fasta_file(temp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "blank_1");
        assert_eq!(records[0].sequence, "ACGTACGTACGTACGT");
        assert_eq!(records[1].sequence, "TTTTGGGGCCCC");
    }

    #[test]
    fn test_parse_gzipped_fasta() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(FASTA).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        temp.write_all(&compressed).unwrap();
        temp.flush().unwrap();

        let sequences = parse_fasta_sequences(temp.path()).unwrap();
        assert_eq!(sequences, vec!["ACGTACGTACGTACGT", "TTTTGGGGCCCC"]);
    }

    #[test]
    fn test_parse_fasta_asvs() {
        let mut temp = NamedTempFile::with_suffix(".fasta").unwrap();
        temp.write_all(FASTA).unwrap();
        temp.flush().unwrap();

        let asvs = parse_fasta_asvs(temp.path()).unwrap();
        assert_eq!(asvs[1].id, "blank_2");
        assert!(asvs[1].abundance.is_empty());
    }

    #[test]
    fn test_empty_file_has_no_records() {
        let temp = NamedTempFile::with_suffix(".fa").unwrap();
        assert!(parse_fasta_file(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse_fasta_file(Path::new("/nonexistent/controls.fa")),
            Err(ParseError::Io(_))
        ));
    }
}
