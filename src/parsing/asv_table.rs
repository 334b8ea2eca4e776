use std::ffi::OsStr;
use std::path::Path;

use crate::core::asv::Asv;
use crate::parsing::ParseError;
use crate::utils::validation::{
    check_asv_limit, normalize_sequence, parse_count, validate_asvs, MAX_SAMPLES,
};

/// Parse an ASV table, choosing the format from the file extension.
///
/// `.csv` is comma separated, `.json` is a JSON array of ASVs, and `.tsv`,
/// `.txt` or no extension are tab separated.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read,
/// `ParseError::UnsupportedFormat` for unknown extensions, or any error from
/// the format-specific parsers.
pub fn parse_asv_table_file(path: &Path) -> Result<Vec<Asv>, ParseError> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("json") => parse_asv_json(&std::fs::read_to_string(path)?),
        Some("csv") => parse_asv_table_text(&std::fs::read_to_string(path)?, ','),
        Some("tsv" | "txt") | None => parse_asv_table_text(&std::fs::read_to_string(path)?, '\t'),
        Some(ext) => Err(ParseError::UnsupportedFormat(ext.to_string())),
    }
}

/// Parse a delimited ASV table.
///
/// The first non-empty, non-comment line is the header: `asv_id`, `sequence`,
/// then one column per sample. Sequences are uppercased.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for a missing or malformed header or
/// short rows, `ParseError::Validation` for bad counts, duplicate ids or
/// non-nucleotide sequences, and `ParseError::TooManyAsvs` past the limit.
pub fn parse_asv_table_text(text: &str, delimiter: char) -> Result<Vec<Asv>, ParseError> {
    let mut samples: Option<Vec<String>> = None;
    let mut asvs = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based
        let line_num = i + 1;
        let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

        if samples.is_none() {
            samples = Some(parse_header(&fields, line_num)?);
            continue;
        }
        let sample_names = samples.as_deref().unwrap_or_default();

        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 2 fields"
            )));
        }
        if fields.len() > sample_names.len() + 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has {} fields but the header names {}",
                fields.len(),
                sample_names.len() + 2
            )));
        }

        if check_asv_limit(asvs.len()).is_some() {
            return Err(ParseError::TooManyAsvs(asvs.len()));
        }

        let id = fields[0];
        let mut asv = Asv::new(id, normalize_sequence(fields[1]));
        for (sample, cell) in sample_names.iter().zip(&fields[2..]) {
            let count = parse_count(id, sample, cell)?;
            asv.abundance.insert(sample.clone(), count);
        }
        asvs.push(asv);
    }

    if samples.is_none() {
        return Err(ParseError::InvalidFormat(
            "No header found in ASV table".to_string(),
        ));
    }

    validate_asvs(&asvs)?;
    Ok(asvs)
}

fn parse_header(fields: &[&str], line_num: usize) -> Result<Vec<String>, ParseError> {
    let first = fields.first().map(|f| f.to_lowercase()).unwrap_or_default();
    let second = fields.get(1).map(|f| f.to_lowercase()).unwrap_or_default();

    if !matches!(first.as_str(), "asv_id" | "id" | "asv") || !second.starts_with("seq") {
        return Err(ParseError::InvalidFormat(format!(
            "Line {line_num}: expected header 'asv_id<sep>sequence<sep><samples...>'"
        )));
    }

    let samples: Vec<String> = fields[2..].iter().map(ToString::to_string).collect();
    if samples.len() > MAX_SAMPLES {
        return Err(ParseError::InvalidFormat(format!(
            "Too many sample columns: {} exceeds maximum allowed ({MAX_SAMPLES})",
            samples.len()
        )));
    }
    if let Some(empty) = samples.iter().position(String::is_empty) {
        return Err(ParseError::InvalidFormat(format!(
            "Line {line_num}: sample column {} has no name",
            empty + 3
        )));
    }

    Ok(samples)
}

/// Parse a JSON array of ASVs.
///
/// Counts must be non-negative integers; the deserializer rejects anything else.
///
/// # Errors
///
/// Returns `ParseError::Json` for malformed JSON or bad counts,
/// `ParseError::Validation` for duplicate ids or non-nucleotide sequences,
/// and `ParseError::TooManyAsvs` past the limit.
pub fn parse_asv_json(text: &str) -> Result<Vec<Asv>, ParseError> {
    let mut asvs: Vec<Asv> = serde_json::from_str(text)?;
    if asvs.len() > crate::utils::validation::MAX_ASVS {
        return Err(ParseError::TooManyAsvs(asvs.len()));
    }

    for asv in &mut asvs {
        asv.representative_sequence = normalize_sequence(&asv.representative_sequence);
    }
    validate_asvs(&asvs)?;
    Ok(asvs)
}
