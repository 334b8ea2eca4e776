use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::SampleId;

/// An amplicon sequence variant as produced by the upstream denoising step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asv {
    /// Identifier, unique within a pipeline run
    pub id: String,

    /// Representative nucleotide sequence
    pub representative_sequence: String,

    /// Read count per sample
    #[serde(default)]
    pub abundance: BTreeMap<SampleId, u64>,
}

impl Asv {
    pub fn new(id: impl Into<String>, representative_sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            representative_sequence: representative_sequence.into(),
            abundance: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_count(mut self, sample: impl Into<SampleId>, count: u64) -> Self {
        self.abundance.insert(sample.into(), count);
        self
    }

    /// Read count in `sample`, 0 when the sample is absent
    #[must_use]
    pub fn count_in(&self, sample: &str) -> u64 {
        self.abundance.get(sample).copied().unwrap_or(0)
    }

    /// Whether the ASV has at least one read in `sample`
    #[must_use]
    pub fn is_present_in(&self, sample: &str) -> bool {
        self.count_in(sample) > 0
    }

    /// Largest per-sample read count
    #[must_use]
    pub fn max_abundance(&self) -> u64 {
        self.abundance.values().copied().max().unwrap_or(0)
    }

    /// Total reads across all samples, saturating at `u64::MAX`
    #[must_use]
    pub fn total_abundance(&self) -> u64 {
        self.abundance
            .values()
            .fold(0u64, |sum, &count| sum.saturating_add(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abundance_helpers() {
        let asv = Asv::new("ASV_1", "ACGT")
            .with_count("S1", 250)
            .with_count("S2", 0)
            .with_count("S3", 12);

        assert_eq!(asv.count_in("S1"), 250);
        assert_eq!(asv.count_in("missing"), 0);
        assert!(asv.is_present_in("S3"));
        assert!(!asv.is_present_in("S2"));
        assert_eq!(asv.max_abundance(), 250);
        assert_eq!(asv.total_abundance(), 262);
    }

    #[test]
    fn test_deserialize_without_abundance() {
        let asv: Asv =
            serde_json::from_str(r#"{"id":"ASV_9","representative_sequence":"ACGTACGT"}"#)
                .unwrap();
        assert!(asv.abundance.is_empty());
        assert_eq!(asv.max_abundance(), 0);
    }

    #[test]
    fn test_negative_count_rejected_by_deserializer() {
        let result: Result<Asv, _> = serde_json::from_str(
            r#"{"id":"ASV_1","representative_sequence":"ACGT","abundance":{"S1":-4}}"#,
        );
        assert!(result.is_err());
    }
}
