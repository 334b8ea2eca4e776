use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

use crate::contamination::detectors::{
    AdapterDetector, Detector, IndexBleedDetector, LabContaminantDetector,
    NegativeControlDetector, UnexpectedTaxaDetector,
};
use crate::contamination::flag::ContaminationFlag;
use crate::contamination::report::ContaminationReport;
use crate::core::asv::Asv;
use crate::core::lineage::TaxonomicAssignment;
use crate::core::types::{Environment, Severity};
use crate::utils::validation::{validate_fraction, ValidationError};

/// Default fraction of an ASV's peak abundance below which presence looks like bleed
pub const DEFAULT_INDEX_BLEED_THRESHOLD: f64 = 0.001;

/// Default peak abundance an ASV must exceed before index bleed is considered
pub const DEFAULT_INDEX_BLEED_MIN_ABUNDANCE: u64 = 100;

/// Options for contamination screening
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContaminationConfig {
    pub expected_environment: Environment,
    pub index_bleed_threshold: f64,
    pub index_bleed_min_abundance: u64,
    pub negative_control_sequences: Vec<String>,

    /// Lowest severity that gets an ASV removed
    pub min_severity: Severity,
}

impl Default for ContaminationConfig {
    fn default() -> Self {
        Self {
            expected_environment: Environment::default(),
            index_bleed_threshold: DEFAULT_INDEX_BLEED_THRESHOLD,
            index_bleed_min_abundance: DEFAULT_INDEX_BLEED_MIN_ABUNDANCE,
            negative_control_sequences: Vec::new(),
            min_severity: Severity::default(),
        }
    }
}

impl ContaminationConfig {
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if `index_bleed_threshold` is
    /// outside [0, 1].
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fraction("index_bleed_threshold", self.index_bleed_threshold)?;
        Ok(())
    }
}

/// ASVs left after contaminant removal and the ids that were dropped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Removal {
    pub cleaned: Vec<Asv>,
    pub removed: Vec<String>,
}

/// Runs the detector battery over ASVs and aggregates per-sample reports
pub struct ContaminationScreener {
    detectors: Vec<Box<dyn Detector>>,
    min_severity: Severity,
}

impl ContaminationScreener {
    /// Screener with the default battery and options
    pub fn new() -> Self {
        Self::from_parts(&ContaminationConfig::default())
    }

    /// # Errors
    ///
    /// Returns a `ValidationError` if the configuration is out of range.
    pub fn with_config(config: &ContaminationConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: &ContaminationConfig) -> Self {
        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(LabContaminantDetector),
            Box::new(AdapterDetector),
            Box::new(NegativeControlDetector::new(
                &config.negative_control_sequences,
            )),
            Box::new(UnexpectedTaxaDetector::new(config.expected_environment)),
            Box::new(IndexBleedDetector::new(
                config.index_bleed_threshold,
                config.index_bleed_min_abundance,
            )),
        ];
        Self {
            detectors,
            min_severity: config.min_severity,
        }
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    /// Every flag the battery raises for one ASV
    pub fn detect(
        &self,
        asv: &Asv,
        assignment: Option<&TaxonomicAssignment>,
    ) -> Vec<ContaminationFlag> {
        self.detectors
            .iter()
            .filter_map(|detector| {
                let flag = detector.detect(asv, assignment)?;
                debug!("{}: flagged by {}", asv.id, detector.name());
                Some(flag)
            })
            .collect()
    }

    /// Every flag for every ASV, in input order
    #[allow(clippy::implicit_hasher)]
    pub fn detect_all(
        &self,
        asvs: &[Asv],
        assignments: &HashMap<String, TaxonomicAssignment>,
    ) -> Vec<ContaminationFlag> {
        asvs.iter()
            .flat_map(|asv| self.detect(asv, assignments.get(&asv.id)))
            .collect()
    }

    /// Screen the ASVs observed in `sample_id` (count > 0)
    #[allow(clippy::implicit_hasher)]
    pub fn screen_sample(
        &self,
        sample_id: &str,
        asvs: &[Asv],
        assignments: &HashMap<String, TaxonomicAssignment>,
    ) -> ContaminationReport {
        let observed: Vec<&Asv> = asvs.iter().filter(|a| a.is_present_in(sample_id)).collect();
        let flags: Vec<ContaminationFlag> = observed
            .iter()
            .flat_map(|asv| self.detect(asv, assignments.get(&asv.id)))
            .collect();

        let report = ContaminationReport::new(sample_id, flags, observed.len());
        info!(
            "Sample {}: {} flags on {}/{} ASVs, score {}",
            report.sample_id,
            report.flags.len(),
            report.flagged_asvs,
            report.total_asvs,
            report.contamination_score
        );
        report
    }

    /// One report per sample id found in the ASVs, sorted by sample id
    #[allow(clippy::implicit_hasher)]
    pub fn screen_samples(
        &self,
        asvs: &[Asv],
        assignments: &HashMap<String, TaxonomicAssignment>,
    ) -> Vec<ContaminationReport> {
        let samples: BTreeSet<&str> = asvs
            .iter()
            .flat_map(|asv| asv.abundance.keys().map(String::as_str))
            .collect();

        samples
            .into_iter()
            .map(|sample| self.screen_sample(sample, asvs, assignments))
            .collect()
    }
}

impl Default for ContaminationScreener {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop every ASV carrying at least one flag at or above `min_severity`.
///
/// `cleaned` keeps input order; `removed` lists the dropped ids in input order.
pub fn remove_contaminants(
    asvs: &[Asv],
    flags: &[ContaminationFlag],
    min_severity: Severity,
) -> Removal {
    let flagged: HashSet<&str> = flags
        .iter()
        .filter(|f| f.is_at_least(min_severity))
        .map(|f| f.asv_id.as_str())
        .collect();

    let mut removal = Removal::default();
    for asv in asvs {
        if flagged.contains(asv.id.as_str()) {
            removal.removed.push(asv.id.clone());
        } else {
            removal.cleaned.push(asv.clone());
        }
    }

    if !removal.removed.is_empty() {
        info!(
            "Removed {} of {} ASVs at severity >= {min_severity}",
            removal.removed.len(),
            asvs.len()
        );
    }
    removal
}
