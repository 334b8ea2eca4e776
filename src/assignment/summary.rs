use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::lineage::TaxonomicAssignment;
use crate::core::types::Rank;

/// Default confidence separating high- from low-confidence assignments
pub const DEFAULT_HIGH_CONFIDENCE_THRESHOLD: u8 = 70;

/// Dataset-level aggregates over a batch of assignments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub total: usize,
    pub assigned_count: usize,
    pub unassigned_count: usize,

    /// Mean confidence over assigned ASVs; 0 when nothing was assigned
    pub mean_confidence: f64,

    pub kingdom_counts: BTreeMap<String, usize>,
    pub phylum_counts: BTreeMap<String, usize>,
    pub family_counts: BTreeMap<String, usize>,
    pub species_counts: BTreeMap<String, usize>,
}

impl AssignmentSummary {
    #[must_use]
    pub fn from_assignments(assignments: &[TaxonomicAssignment]) -> Self {
        let assigned: Vec<&TaxonomicAssignment> =
            assignments.iter().filter(|a| a.is_assigned()).collect();

        let mean_confidence = if assigned.is_empty() {
            0.0
        } else {
            let sum: u32 = assigned.iter().map(|a| u32::from(a.confidence)).sum();
            f64::from(sum) / crate::matching::scoring::count_to_f64(assigned.len())
        };

        Self {
            total: assignments.len(),
            assigned_count: assigned.len(),
            unassigned_count: assignments.len() - assigned.len(),
            mean_confidence,
            kingdom_counts: rank_counts(assignments, Rank::Kingdom),
            phylum_counts: rank_counts(assignments, Rank::Phylum),
            family_counts: rank_counts(assignments, Rank::Family),
            species_counts: rank_counts(assignments, Rank::Species),
        }
    }
}

/// Frequency of each value at `rank`, counting only assignments that set it
fn rank_counts(assignments: &[TaxonomicAssignment], rank: Rank) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in assignments.iter().filter_map(|a| a.lineage.get(rank)) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Assignments for a batch of ASVs plus their summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAssignment {
    pub assignments: Vec<TaxonomicAssignment>,
    pub summary: AssignmentSummary,
}

impl BatchAssignment {
    #[must_use]
    pub fn new(assignments: Vec<TaxonomicAssignment>) -> Self {
        let summary = AssignmentSummary::from_assignments(&assignments);
        Self {
            assignments,
            summary,
        }
    }
}

/// Assignments split by confidence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidenceBuckets {
    /// confidence >= threshold
    pub high: Vec<TaxonomicAssignment>,
    /// 0 < confidence < threshold
    pub low: Vec<TaxonomicAssignment>,
}

/// Partition assignments by confidence; unassigned ones land in neither bucket
#[must_use]
pub fn filter_by_confidence(
    assignments: &[TaxonomicAssignment],
    threshold: u8,
) -> ConfidenceBuckets {
    let mut buckets = ConfidenceBuckets::default();
    for assignment in assignments {
        if assignment.confidence == 0 {
            continue;
        }
        if assignment.confidence >= threshold {
            buckets.high.push(assignment.clone());
        } else {
            buckets.low.push(assignment.clone());
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lineage::Lineage;
    use crate::core::types::AssignmentMethod;

    fn assignment(id: &str, phylum: Option<&str>, species: &str, confidence: u8) -> TaxonomicAssignment {
        let mut lineage = Lineage::default();
        lineage.set(Rank::Kingdom, "Animalia");
        if let Some(phylum) = phylum {
            lineage.set(Rank::Phylum, phylum);
        }
        lineage.set(Rank::Species, species);
        TaxonomicAssignment::assigned(id, lineage, confidence, AssignmentMethod::ReferenceMatch)
    }

    #[test]
    fn test_summary_counts() {
        let assignments = vec![
            assignment("A1", Some("Chordata"), "Gadus morhua", 90),
            assignment("A2", None, "Gadus morhua", 80),
            assignment("A3", Some("Arthropoda"), "Chironomus riparius", 70),
            TaxonomicAssignment::unassigned("A4"),
        ];
        let summary = AssignmentSummary::from_assignments(&assignments);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.assigned_count, 3);
        assert_eq!(summary.unassigned_count, 1);
        assert!((summary.mean_confidence - 80.0).abs() < 1e-9);
        assert_eq!(summary.kingdom_counts.get("Animalia"), Some(&3));
        assert_eq!(summary.phylum_counts.len(), 2);
        assert_eq!(summary.phylum_counts.values().sum::<usize>(), 2);
        assert_eq!(summary.species_counts.get("Gadus morhua"), Some(&2));
        assert!(summary.family_counts.is_empty());
    }

    #[test]
    fn test_summary_all_unassigned() {
        let batch = BatchAssignment::new(vec![
            TaxonomicAssignment::unassigned("A1"),
            TaxonomicAssignment::unassigned("A2"),
        ]);
        assert_eq!(batch.summary.assigned_count, 0);
        assert_eq!(batch.summary.unassigned_count, 2);
        assert_eq!(batch.summary.mean_confidence, 0.0);
    }

    #[test]
    fn test_filter_by_confidence() {
        let assignments = vec![
            assignment("A1", None, "s1", 95),
            assignment("A2", None, "s2", 70),
            assignment("A3", None, "s3", 69),
            assignment("A4", None, "s4", 1),
            TaxonomicAssignment::unassigned("A5"),
        ];
        let buckets = filter_by_confidence(&assignments, DEFAULT_HIGH_CONFIDENCE_THRESHOLD);

        let high: Vec<&str> = buckets.high.iter().map(|a| a.asv_id.as_str()).collect();
        let low: Vec<&str> = buckets.low.iter().map(|a| a.asv_id.as_str()).collect();
        assert_eq!(high, vec!["A1", "A2"]);
        assert_eq!(low, vec!["A3", "A4"]);
    }
}
