use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::abundance::{AbundanceData, SampleSet};
use crate::core::types::SampleId;
use crate::diversity::alpha::reads_to_f64;
use crate::matching::scoring::count_to_f64;

/// Between-sample diversity for one pair of samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaDiversity {
    pub sample1: SampleId,
    pub sample2: SampleId,

    /// Bray-Curtis dissimilarity in [0, 1]
    pub bray_curtis: f64,

    /// Jaccard distance over observed species
    pub jaccard: f64,

    /// Sorensen similarity over observed species
    pub sorensen: f64,

    pub shared_species: usize,
    pub unique_to_sample1: usize,
    pub unique_to_sample2: usize,
}

/// Bray-Curtis dissimilarity: `1 - 2 * sum(min(a_i, b_i)) / (sum(a) + sum(b))`.
///
/// 0 = identical, 1 = no shared reads. Two empty samples are identical.
#[must_use]
pub fn bray_curtis(a: &AbundanceData, b: &AbundanceData) -> f64 {
    let denominator = a.total_reads().saturating_add(b.total_reads());
    if denominator == 0 {
        return 0.0;
    }

    let shared = a
        .iter()
        .map(|(label, count)| count.min(b.get(label)))
        .fold(0u64, u64::saturating_add);
    1.0 - 2.0 * reads_to_f64(shared) / reads_to_f64(denominator)
}

fn observed_labels(data: &AbundanceData) -> BTreeSet<&str> {
    data.observed().map(|(label, _)| label).collect()
}

/// Compare two samples
#[must_use]
pub fn beta_diversity(
    sample1: &str,
    a: &AbundanceData,
    sample2: &str,
    b: &AbundanceData,
) -> BetaDiversity {
    let set_a = observed_labels(a);
    let set_b = observed_labels(b);

    let shared = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - shared;

    let jaccard = if union == 0 {
        0.0
    } else {
        1.0 - count_to_f64(shared) / count_to_f64(union)
    };
    let sorensen = if set_a.is_empty() && set_b.is_empty() {
        0.0
    } else {
        2.0 * count_to_f64(shared) / count_to_f64(set_a.len() + set_b.len())
    };

    BetaDiversity {
        sample1: sample1.to_string(),
        sample2: sample2.to_string(),
        bray_curtis: bray_curtis(a, b),
        jaccard,
        sorensen,
        shared_species: shared,
        unique_to_sample1: set_a.len() - shared,
        unique_to_sample2: set_b.len() - shared,
    }
}

/// Every unordered pair of samples, ordered by sample id.
///
/// Fewer than two samples yield an empty list.
#[must_use]
pub fn pairwise_beta_diversity(samples: &SampleSet) -> Vec<BetaDiversity> {
    let samples: Vec<(&str, &AbundanceData)> = samples.iter().collect();
    let mut results = Vec::with_capacity(samples.len() * samples.len().saturating_sub(1) / 2);

    for (i, &(id_a, a)) in samples.iter().enumerate() {
        for &(id_b, b) in &samples[i + 1..] {
            results.push(beta_diversity(id_a, a, id_b, b));
        }
    }
    results
}
