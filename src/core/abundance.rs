use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::core::asv::Asv;
use crate::core::lineage::TaxonomicAssignment;
use crate::core::types::SampleId;

/// Read counts per taxon label for a single sample
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbundanceData {
    counts: BTreeMap<String, u64>,
}

impl AbundanceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` reads to `label`, merging with any existing count.
    /// Saturates at `u64::MAX`.
    pub fn add(&mut self, label: impl Into<String>, count: u64) {
        let total = self.counts.entry(label.into()).or_insert(0);
        *total = total.saturating_add(count);
    }

    #[must_use]
    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Iterate over (label, count), including zero counts
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(label, &count)| (label.as_str(), count))
    }

    /// Iterate over labels observed with at least one read
    pub fn observed(&self) -> impl Iterator<Item = (&str, u64)> {
        self.iter().filter(|&(_, count)| count > 0)
    }

    #[must_use]
    pub fn total_reads(&self) -> u64 {
        self.counts.values().fold(0u64, |sum, &count| sum.saturating_add(count))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, u64)> for AbundanceData {
    fn from_iter<I: IntoIterator<Item = (L, u64)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (label, count) in iter {
            data.add(label, count);
        }
        data
    }
}

/// Abundance tables for every sample in a survey, keyed by sample id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleSet {
    samples: BTreeMap<SampleId, AbundanceData>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: impl Into<SampleId>, data: AbundanceData) {
        self.samples.insert(sample.into(), data);
    }

    #[must_use]
    pub fn get(&self, sample: &str) -> Option<&AbundanceData> {
        self.samples.get(sample)
    }

    /// Samples in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbundanceData)> {
        self.samples.iter().map(|(id, data)| (id.as_str(), data))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Build per-sample abundance tables from ASVs.
    ///
    /// Each ASV is labelled with the deepest populated rank of its assignment,
    /// or with its own id when it has no assignment or is unassigned. ASVs that
    /// share a label are summed.
    #[must_use]
    #[allow(clippy::implicit_hasher)]
    pub fn from_asvs(asvs: &[Asv], assignments: &HashMap<String, TaxonomicAssignment>) -> Self {
        let mut set = Self::new();
        for asv in asvs {
            let label = assignments
                .get(&asv.id)
                .map_or(asv.id.as_str(), TaxonomicAssignment::label);

            for (sample, &count) in &asv.abundance {
                set.samples
                    .entry(sample.clone())
                    .or_default()
                    .add(label, count);
            }
        }
        set
    }
}

impl<S: Into<SampleId>> FromIterator<(S, AbundanceData)> for SampleSet {
    fn from_iter<I: IntoIterator<Item = (S, AbundanceData)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (sample, data) in iter {
            set.insert(sample, data);
        }
        set
    }
}
