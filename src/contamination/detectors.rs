use std::collections::HashSet;

use crate::contamination::flag::ContaminationFlag;
use crate::core::asv::Asv;
use crate::core::lineage::TaxonomicAssignment;
use crate::core::types::{ContaminationType, Environment, Rank, Severity};
use crate::utils::validation::normalize_sequence;

/// Taxa routinely introduced during sampling, extraction or PCR
pub const LAB_CONTAMINANTS: &[&str] = &[
    "homo sapiens",
    "escherichia coli",
    "staphylococcus",
    "streptococcus",
    "pseudomonas",
    "bacillus",
    "cutibacterium",
    "propionibacterium",
    "corynebacterium",
    "micrococcus",
    "ralstonia",
    "bradyrhizobium",
    "sphingomonas",
    "delftia",
];

/// Sequencing adapters and amplicon primers that should never survive trimming
pub const ADAPTER_SEQUENCES: &[(&str, &str)] = &[
    ("Illumina TruSeq adapter", "AGATCGGAAGAGC"),
    ("Nextera transposase adapter", "CTGTCTCTTATACACATCT"),
    ("Illumina small RNA adapter", "TGGAATTCTCGG"),
    ("MiFish-U forward primer", "GTCGGTAAAACTCGTGCCAGC"),
    ("MiFish-U reverse primer", "CATAGTGGGGTATCTAATCCCAGTTTG"),
    ("12S-V5 forward primer", "TAGAACAGGCTCCTCTAG"),
];

/// Classes with no marine members worth expecting in a marine survey
pub const NON_MARINE_CLASSES: &[&str] = &[
    "Insecta",
    "Arachnida",
    "Amphibia",
    "Clitellata",
    "Chilopoda",
    "Diplopoda",
];

/// A single contamination heuristic.
///
/// Detectors are independent and stateless per call; each returns at most
/// one flag for a given ASV.
pub trait Detector: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn detect(
        &self,
        asv: &Asv,
        assignment: Option<&TaxonomicAssignment>,
    ) -> Option<ContaminationFlag>;
}

/// Flags assignments whose species or genus names a known lab contaminant
#[derive(Debug, Clone, Copy, Default)]
pub struct LabContaminantDetector;

impl Detector for LabContaminantDetector {
    fn name(&self) -> &'static str {
        "lab-contaminant"
    }

    fn detect(
        &self,
        asv: &Asv,
        assignment: Option<&TaxonomicAssignment>,
    ) -> Option<ContaminationFlag> {
        let lineage = &assignment?.lineage;
        let (taxon, contaminant) = [Rank::Species, Rank::Genus]
            .into_iter()
            .filter_map(|rank| lineage.get(rank))
            .find_map(|taxon| {
                let lower = taxon.to_lowercase();
                LAB_CONTAMINANTS
                    .iter()
                    .find(|&&c| lower.contains(c))
                    .map(|&c| (taxon, c))
            })?;

        Some(
            ContaminationFlag::new(&asv.id, ContaminationType::LabContaminant, Severity::High, 95)
                .with_reason(format!(
                    "{taxon} matches common laboratory contaminant '{contaminant}'"
                ))
                .with_recommendation(
                    "Remove from analysis and review extraction and PCR blanks",
                ),
        )
    }
}

/// Flags sequences that still carry adapter or primer sequence
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterDetector;

impl Detector for AdapterDetector {
    fn name(&self) -> &'static str {
        "adapter"
    }

    fn detect(
        &self,
        asv: &Asv,
        _assignment: Option<&TaxonomicAssignment>,
    ) -> Option<ContaminationFlag> {
        let sequence = asv.representative_sequence.to_ascii_uppercase();
        let (label, _) = ADAPTER_SEQUENCES
            .iter()
            .find(|(_, adapter)| sequence.contains(adapter))?;

        Some(
            ContaminationFlag::new(&asv.id, ContaminationType::LabContaminant, Severity::High, 99)
                .with_reason(format!("Sequence contains {label}"))
                .with_recommendation("Re-run adapter and primer trimming before clustering"),
        )
    }
}

/// Flags ASVs whose sequence was also observed in a negative control
#[derive(Debug, Clone, Default)]
pub struct NegativeControlDetector {
    sequences: HashSet<String>,
}

impl NegativeControlDetector {
    pub fn new<I, S>(sequences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            sequences: sequences
                .into_iter()
                .map(|s| normalize_sequence(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl Detector for NegativeControlDetector {
    fn name(&self) -> &'static str {
        "negative-control"
    }

    fn detect(
        &self,
        asv: &Asv,
        _assignment: Option<&TaxonomicAssignment>,
    ) -> Option<ContaminationFlag> {
        if self.sequences.is_empty() {
            return None;
        }
        let sequence = normalize_sequence(&asv.representative_sequence);
        if !self.sequences.contains(&sequence) {
            return None;
        }

        Some(
            ContaminationFlag::new(&asv.id, ContaminationType::NegativeControl, Severity::High, 90)
                .with_reason("Sequence also observed in a negative control")
                .with_recommendation("Remove from analysis and trace the control contamination"),
        )
    }
}

/// Flags taxa implausible for the surveyed environment
#[derive(Debug, Clone, Copy, Default)]
pub struct UnexpectedTaxaDetector {
    expected_environment: Environment,
}

impl UnexpectedTaxaDetector {
    pub fn new(expected_environment: Environment) -> Self {
        Self {
            expected_environment,
        }
    }
}

impl Detector for UnexpectedTaxaDetector {
    fn name(&self) -> &'static str {
        "unexpected-taxa"
    }

    fn detect(
        &self,
        asv: &Asv,
        assignment: Option<&TaxonomicAssignment>,
    ) -> Option<ContaminationFlag> {
        if self.expected_environment != Environment::Marine {
            return None;
        }
        let assignment = assignment?;

        let (confidence, reason) = match assignment.lineage.get(Rank::Class) {
            Some(class) if NON_MARINE_CLASSES.contains(&class) => {
                (80, format!("Class {class} is not expected in a marine sample"))
            }
            _ if assignment.is_marine == Some(false) => (
                75,
                format!("{} is not a marine taxon", assignment.label()),
            ),
            _ => return None,
        };

        Some(
            ContaminationFlag::new(&asv.id, ContaminationType::UnexpectedTaxa, Severity::Medium, confidence)
                .with_reason(reason)
                .with_recommendation(
                    "Check for terrestrial or freshwater input before interpreting",
                ),
        )
    }
}

/// Flags ASVs that trail at very low abundance in several samples.
///
/// Compares each sample's count against the ASV's own maximum: counts above
/// zero but below `threshold * max` in more than one sample trigger the flag,
/// provided the maximum exceeds `min_abundance`.
#[derive(Debug, Clone, Copy)]
pub struct IndexBleedDetector {
    threshold: f64,
    min_abundance: u64,
}

impl IndexBleedDetector {
    pub fn new(threshold: f64, min_abundance: u64) -> Self {
        Self {
            threshold,
            min_abundance,
        }
    }
}

impl Detector for IndexBleedDetector {
    fn name(&self) -> &'static str {
        "index-bleed"
    }

    #[allow(clippy::cast_precision_loss)]
    fn detect(
        &self,
        asv: &Asv,
        _assignment: Option<&TaxonomicAssignment>,
    ) -> Option<ContaminationFlag> {
        let max = asv.max_abundance();
        if max <= self.min_abundance {
            return None;
        }

        let cutoff = self.threshold * max as f64;
        let trailing = asv
            .abundance
            .values()
            .filter(|&&count| count > 0 && (count as f64) < cutoff)
            .count();
        if trailing <= 1 {
            return None;
        }

        Some(
            ContaminationFlag::new(&asv.id, ContaminationType::IndexBleed, Severity::Low, 60)
                .with_reason(format!(
                    "Present below {:.2}% of its peak ({max} reads) in {trailing} samples",
                    self.threshold * 100.0
                ))
                .with_recommendation("Consider a per-sample abundance filter"),
        )
    }
}
