//! Centralized validation and helper functions.

use std::collections::{HashMap, HashSet};

use crate::core::asv::Asv;

/// Maximum number of ASVs accepted from a single table
pub const MAX_ASVS: usize = 1_000_000;

/// Maximum number of sample columns accepted from a single table
pub const MAX_SAMPLES: usize = 10_000;

/// Maximum reads accepted for one sample, summed over its ASVs
pub const MAX_READS_PER_SAMPLE: u64 = 10_000_000;

/// Validation error types for caller-supplied input
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("ASV at position {0} has an empty id")]
    EmptyAsvId(usize),
    #[error("Duplicate ASV id '{0}'")]
    DuplicateAsvId(String),
    #[error("ASV '{asv_id}' has a sequence with non-nucleotide character '{character}'")]
    InvalidSequence { asv_id: String, character: char },
    #[error("ASV '{asv_id}' has a negative read count ({value}) for sample '{sample}'")]
    NegativeCount {
        asv_id: String,
        sample: String,
        value: i64,
    },
    #[error("ASV '{asv_id}' has an unparseable read count '{value}' for sample '{sample}'")]
    InvalidCount {
        asv_id: String,
        sample: String,
        value: String,
    },
    #[error(
        "Sample '{sample}' has {total} reads, exceeding the maximum allowed ({})",
        MAX_READS_PER_SAMPLE
    )]
    TooManyReads { sample: String, total: u64 },
    #[error("Option '{name}' is out of range: {value} (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Check if a character is an IUPAC nucleotide code (case-insensitive).
///
/// # Examples
///
/// ```
/// use edna_core::utils::validation::is_nucleotide;
///
/// assert!(is_nucleotide('a'));
/// assert!(is_nucleotide('N'));
/// assert!(!is_nucleotide('X'));
/// ```
#[must_use]
pub fn is_nucleotide(c: char) -> bool {
    matches!(
        c.to_ascii_uppercase(),
        'A' | 'C'
            | 'G'
            | 'T'
            | 'U'
            | 'R'
            | 'Y'
            | 'S'
            | 'W'
            | 'K'
            | 'M'
            | 'B'
            | 'D'
            | 'H'
            | 'V'
            | 'N'
            | '-'
    )
}

/// Uppercase a sequence and strip surrounding whitespace
#[must_use]
pub fn normalize_sequence(sequence: &str) -> String {
    sequence.trim().to_ascii_uppercase()
}

/// Check if adding another ASV would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new ASV.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_asv_limit(count: usize) -> Option<String> {
    if count >= MAX_ASVS {
        Some(format!(
            "Too many ASVs: adding another would exceed maximum of {MAX_ASVS}"
        ))
    } else {
        None
    }
}

/// Validate ASVs handed over by the clustering step.
///
/// Empty sequences and empty abundance maps are accepted; they yield
/// zero-valued results downstream.
///
/// # Errors
///
/// Returns `ValidationError::EmptyAsvId` for blank ids,
/// `ValidationError::DuplicateAsvId` when an id repeats,
/// `ValidationError::InvalidSequence` for non-IUPAC characters, or
/// `ValidationError::TooManyReads` when a sample sums past
/// [`MAX_READS_PER_SAMPLE`].
pub fn validate_asvs(asvs: &[Asv]) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(asvs.len());
    let mut totals: HashMap<&str, u64> = HashMap::new();

    for (i, asv) in asvs.iter().enumerate() {
        if asv.id.trim().is_empty() {
            return Err(ValidationError::EmptyAsvId(i));
        }
        if !seen.insert(asv.id.as_str()) {
            return Err(ValidationError::DuplicateAsvId(asv.id.clone()));
        }
        if let Some(character) = asv.representative_sequence.chars().find(|&c| !is_nucleotide(c))
        {
            return Err(ValidationError::InvalidSequence {
                asv_id: asv.id.clone(),
                character,
            });
        }
        for (sample, &count) in &asv.abundance {
            let total = totals.entry(sample.as_str()).or_insert(0);
            *total = total.saturating_add(count);
            if *total > MAX_READS_PER_SAMPLE {
                return Err(ValidationError::TooManyReads {
                    sample: sample.clone(),
                    total: *total,
                });
            }
        }
    }

    Ok(())
}

/// Parse a read count from a table cell.
///
/// # Errors
///
/// Returns `ValidationError::NegativeCount` for values below zero,
/// `ValidationError::TooManyReads` above [`MAX_READS_PER_SAMPLE`], and
/// `ValidationError::InvalidCount` for anything that is not an integer.
pub fn parse_count(asv_id: &str, sample: &str, cell: &str) -> Result<u64, ValidationError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0);
    }

    match cell.parse::<i64>() {
        Ok(value) if value < 0 => Err(ValidationError::NegativeCount {
            asv_id: asv_id.to_string(),
            sample: sample.to_string(),
            value,
        }),
        Ok(value) if value.unsigned_abs() > MAX_READS_PER_SAMPLE => {
            Err(ValidationError::TooManyReads {
                sample: sample.to_string(),
                total: value.unsigned_abs(),
            })
        }
        Ok(value) => Ok(value.unsigned_abs()),
        Err(_) => Err(ValidationError::InvalidCount {
            asv_id: asv_id.to_string(),
            sample: sample.to_string(),
            value: cell.to_string(),
        }),
    }
}

/// Require `value` to lie in [0, 1].
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` otherwise (including NaN).
pub fn validate_fraction(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            name,
            value: value.to_string(),
            expected: "a fraction between 0 and 1",
        })
    }
}

/// Require a positive count.
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` when `value` is 0.
pub fn validate_positive(name: &'static str, value: usize) -> Result<usize, ValidationError> {
    if value == 0 {
        Err(ValidationError::OutOfRange {
            name,
            value: value.to_string(),
            expected: "at least 1",
        })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sequence() {
        assert_eq!(normalize_sequence("  acgtn\n"), "ACGTN");
    }

    #[test]
    fn test_check_asv_limit() {
        assert!(check_asv_limit(0).is_none());
        assert!(check_asv_limit(MAX_ASVS - 1).is_none());
        assert!(check_asv_limit(MAX_ASVS).is_some());
    }

    #[test]
    fn test_validate_asvs_accepts_empty_sequence() {
        let asvs = vec![Asv::new("ASV_1", ""), Asv::new("ASV_2", "acgtRYN")];
        assert!(validate_asvs(&asvs).is_ok());
    }

    #[test]
    fn test_validate_asvs_rejects_bad_input() {
        let duplicate = vec![Asv::new("ASV_1", "ACGT"), Asv::new("ASV_1", "ACGA")];
        assert_eq!(
            validate_asvs(&duplicate),
            Err(ValidationError::DuplicateAsvId("ASV_1".to_string()))
        );

        let blank = vec![Asv::new("  ", "ACGT")];
        assert_eq!(validate_asvs(&blank), Err(ValidationError::EmptyAsvId(0)));

        let invalid = vec![Asv::new("ASV_1", "ACGTXACGT")];
        assert!(matches!(
            validate_asvs(&invalid),
            Err(ValidationError::InvalidSequence { character: 'X', .. })
        ));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("A", "S1", "42"), Ok(42));
        assert_eq!(parse_count("A", "S1", ""), Ok(0));
        assert!(matches!(
            parse_count("A", "S1", "-3"),
            Err(ValidationError::NegativeCount { value: -3, .. })
        ));
        assert!(matches!(
            parse_count("A", "S1", "1.5"),
            Err(ValidationError::InvalidCount { .. })
        ));
    }

    #[test]
    fn test_parse_count_rejects_huge_counts() {
        assert_eq!(
            parse_count("A", "S1", &MAX_READS_PER_SAMPLE.to_string()),
            Ok(MAX_READS_PER_SAMPLE)
        );
        assert_eq!(
            parse_count("A", "S1", "9223372036854775807"),
            Err(ValidationError::TooManyReads {
                sample: "S1".to_string(),
                total: 9_223_372_036_854_775_807,
            })
        );
    }

    #[test]
    fn test_validate_asvs_bounds_sample_totals() {
        let half = MAX_READS_PER_SAMPLE / 2;
        let at_limit = vec![
            Asv::new("ASV_1", "ACGT").with_count("S1", half),
            Asv::new("ASV_2", "ACGA").with_count("S1", MAX_READS_PER_SAMPLE - half),
            Asv::new("ASV_3", "ACGG").with_count("S2", half),
        ];
        assert!(validate_asvs(&at_limit).is_ok());

        let over = vec![
            Asv::new("ASV_1", "ACGT").with_count("S1", u64::MAX),
            Asv::new("ASV_2", "ACGA").with_count("S1", u64::MAX),
        ];
        assert_eq!(
            validate_asvs(&over),
            Err(ValidationError::TooManyReads {
                sample: "S1".to_string(),
                total: u64::MAX,
            })
        );

        let summed = vec![
            Asv::new("ASV_1", "ACGT").with_count("S1", half),
            Asv::new("ASV_2", "ACGA").with_count("S1", half),
            Asv::new("ASV_3", "ACGG").with_count("S1", 1),
        ];
        assert!(matches!(
            validate_asvs(&summed),
            Err(ValidationError::TooManyReads { .. })
        ));
    }

    #[test]
    fn test_validate_fraction() {
        assert_eq!(validate_fraction("min_identity", 0.8), Ok(0.8));
        assert!(validate_fraction("min_identity", 1.2).is_err());
        assert!(validate_fraction("min_identity", f64::NAN).is_err());
        assert!(validate_positive("steps", 0).is_err());
        assert_eq!(validate_positive("steps", 20), Ok(20));
    }
}
