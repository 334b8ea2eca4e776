use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::contamination::flag::ContaminationFlag;
use crate::core::types::{ContaminationType, SampleId, Severity};

/// Score below which a sample counts as clean
pub const CLEAN_SCORE_THRESHOLD: u32 = 10;

/// Upper bound of the contamination score
pub const MAX_CONTAMINATION_SCORE: u32 = 100;

/// Contamination screening result for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContaminationReport {
    pub sample_id: SampleId,

    pub flags: Vec<ContaminationFlag>,

    /// Flag counts by contamination type
    pub by_type: BTreeMap<ContaminationType, usize>,

    /// Flag counts by severity
    pub by_severity: BTreeMap<Severity, usize>,

    /// ASVs observed in the sample
    pub total_asvs: usize,

    /// Distinct ASVs carrying at least one flag
    pub flagged_asvs: usize,

    /// 0-100
    pub contamination_score: u32,

    pub is_clean: bool,
}

impl ContaminationReport {
    /// Build a report from the flags raised for a sample's ASVs
    pub fn new(
        sample_id: impl Into<SampleId>,
        flags: Vec<ContaminationFlag>,
        total_asvs: usize,
    ) -> Self {
        let mut report = Self {
            sample_id: sample_id.into(),
            flags,
            by_type: BTreeMap::new(),
            by_severity: BTreeMap::new(),
            total_asvs,
            flagged_asvs: 0,
            contamination_score: 0,
            is_clean: true,
        };
        report.recompute();
        report
    }

    /// Add a flag and refresh the summary
    pub fn add_flag(&mut self, flag: ContaminationFlag) {
        self.flags.push(flag);
        self.recompute();
    }

    /// Number of flags with the given severity
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Number of flags of the given type
    pub fn type_count(&self, contamination_type: ContaminationType) -> usize {
        self.by_type.get(&contamination_type).copied().unwrap_or(0)
    }

    fn recompute(&mut self) {
        self.by_type.clear();
        self.by_severity.clear();
        for flag in &self.flags {
            *self.by_type.entry(flag.contamination_type).or_insert(0) += 1;
            *self.by_severity.entry(flag.severity).or_insert(0) += 1;
        }

        self.flagged_asvs = self
            .flags
            .iter()
            .map(|f| f.asv_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        self.contamination_score = contamination_score(&self.flags);
        self.is_clean = self.contamination_score < CLEAN_SCORE_THRESHOLD;
    }
}

/// `min(100, 20 * high + 5 * medium + 1 * low)`
#[must_use]
pub fn contamination_score(flags: &[ContaminationFlag]) -> u32 {
    flags
        .iter()
        .fold(0u32, |score, flag| {
            score.saturating_add(flag.severity.score_weight())
        })
        .min(MAX_CONTAMINATION_SCORE)
}
