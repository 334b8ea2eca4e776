use serde::{Deserialize, Serialize};

use crate::core::abundance::{AbundanceData, SampleSet};
use crate::core::types::SampleId;
use crate::matching::scoring::count_to_f64;

pub(crate) fn reads_to_f64(reads: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        reads as f64
    }
}

/// Within-sample diversity indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaDiversity {
    pub sample_id: SampleId,

    /// Species with at least one read
    pub richness: usize,

    /// Shannon entropy H' (natural log)
    pub shannon: f64,

    /// Simpson's D = sum of squared proportions
    pub simpson: f64,

    /// 1 / D, or 0 when D is 0
    pub inverse_simpson: f64,

    /// Pielou's J' = H' / ln(S); 0 when S <= 1
    pub evenness: f64,

    /// Berger-Parker: largest proportion
    pub dominance: f64,

    /// Chao1 richness estimate
    pub chao1: f64,

    pub total_reads: u64,
}

/// Shannon entropy: H = -sum(p_i * ln(p_i)) over observed species
#[must_use]
pub fn shannon(abundance: &AbundanceData) -> f64 {
    let total = reads_to_f64(abundance.total_reads());
    if total <= 0.0 {
        return 0.0;
    }

    let mut h = 0.0;
    for (_, count) in abundance.observed() {
        let p = reads_to_f64(count) / total;
        h -= p * p.ln();
    }
    h
}

/// Simpson's index D = sum(p_i^2); 1 means a single species holds every read
#[must_use]
pub fn simpson(abundance: &AbundanceData) -> f64 {
    let total = reads_to_f64(abundance.total_reads());
    if total <= 0.0 {
        return 0.0;
    }

    abundance
        .observed()
        .map(|(_, count)| {
            let p = reads_to_f64(count) / total;
            p * p
        })
        .sum()
}

/// Chao1 richness estimator.
///
/// `S + f1^2 / (2 * f2)` with f1 singletons and f2 doubletons; when there are
/// no doubletons the bias-corrected form `S + f1 * (f1 - 1) / 2` is used.
#[must_use]
pub fn chao1(abundance: &AbundanceData) -> f64 {
    let richness = count_to_f64(abundance.observed().count());
    let f1 = count_to_f64(abundance.observed().filter(|&(_, c)| c == 1).count());
    let f2 = count_to_f64(abundance.observed().filter(|&(_, c)| c == 2).count());

    if f2 > 0.0 {
        richness + (f1 * f1) / (2.0 * f2)
    } else {
        richness + f1 * (f1 - 1.0).max(0.0) / 2.0
    }
}

/// Berger-Parker dominance: max(count) / total
#[must_use]
pub fn dominance(abundance: &AbundanceData) -> f64 {
    let total = abundance.total_reads();
    if total == 0 {
        return 0.0;
    }
    let max = abundance.iter().map(|(_, c)| c).max().unwrap_or(0);
    reads_to_f64(max) / reads_to_f64(total)
}

/// Compute every alpha index for one sample
#[must_use]
pub fn alpha_diversity(sample_id: &str, abundance: &AbundanceData) -> AlphaDiversity {
    let richness = abundance.observed().count();
    let shannon = shannon(abundance);
    let simpson = simpson(abundance);

    let inverse_simpson = if simpson > 0.0 { 1.0 / simpson } else { 0.0 };
    let evenness = if richness > 1 {
        shannon / count_to_f64(richness).ln()
    } else {
        0.0
    };

    AlphaDiversity {
        sample_id: sample_id.to_string(),
        richness,
        shannon,
        simpson,
        inverse_simpson,
        evenness,
        dominance: dominance(abundance),
        chao1: chao1(abundance),
        total_reads: abundance.total_reads(),
    }
}

/// Alpha indices for every sample, ordered by sample id
#[must_use]
pub fn alpha_diversity_all(samples: &SampleSet) -> Vec<AlphaDiversity> {
    samples
        .iter()
        .map(|(sample_id, abundance)| alpha_diversity(sample_id, abundance))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(counts: &[(&str, u64)]) -> AbundanceData {
        counts.iter().map(|&(label, count)| (label, count)).collect()
    }

    #[test]
    fn test_even_community() {
        // 4 equally abundant species: H = ln(4), J' = 1
        let data = sample(&[("a", 25), ("b", 25), ("c", 25), ("d", 25)]);
        let alpha = alpha_diversity("S1", &data);

        assert_eq!(alpha.richness, 4);
        assert!((alpha.shannon - 4.0f64.ln()).abs() < 1e-10);
        assert!((alpha.evenness - 1.0).abs() < 1e-10);
        assert!((alpha.simpson - 0.25).abs() < 1e-10);
        assert!((alpha.inverse_simpson - 4.0).abs() < 1e-10);
        assert!((alpha.dominance - 0.25).abs() < 1e-10);
        assert_eq!(alpha.total_reads, 100);
    }

    #[test]
    fn test_single_species() {
        let data = sample(&[("a", 100), ("b", 0)]);
        let alpha = alpha_diversity("S1", &data);

        assert_eq!(alpha.richness, 1);
        assert_eq!(alpha.shannon, 0.0);
        assert_eq!(alpha.simpson, 1.0);
        assert_eq!(alpha.dominance, 1.0);
        assert_eq!(alpha.evenness, 0.0);
    }

    #[test]
    fn test_empty_sample() {
        let alpha = alpha_diversity("S1", &AbundanceData::new());
        assert_eq!(alpha.richness, 0);
        assert_eq!(alpha.shannon, 0.0);
        assert_eq!(alpha.simpson, 0.0);
        assert_eq!(alpha.inverse_simpson, 0.0);
        assert_eq!(alpha.dominance, 0.0);
        assert_eq!(alpha.chao1, 0.0);

        let zeros = alpha_diversity("S2", &sample(&[("a", 0), ("b", 0)]));
        assert_eq!(zeros.richness, 0);
        assert_eq!(zeros.total_reads, 0);
    }

    #[test]
    fn test_chao1() {
        // No singletons: Chao1 = S
        assert_eq!(chao1(&sample(&[("a", 10), ("b", 20), ("c", 30)])), 3.0);

        // f1 = 2, f2 = 1: 4 + 4 / 2
        let data = sample(&[("a", 1), ("b", 1), ("c", 2), ("d", 9)]);
        assert!((chao1(&data) - 6.0).abs() < 1e-10);

        // f1 = 3, f2 = 0: 4 + 3 * 2 / 2
        let data = sample(&[("a", 1), ("b", 1), ("c", 1), ("d", 9)]);
        assert!((chao1(&data) - 7.0).abs() < 1e-10);

        // A lone singleton adds nothing
        assert_eq!(chao1(&sample(&[("a", 1), ("b", 5)])), 2.0);
    }

    #[test]
    fn test_alpha_diversity_all_sorted() {
        let set: SampleSet = [
            ("S2", sample(&[("a", 5)])),
            ("S1", sample(&[("a", 5), ("b", 5)])),
        ]
        .into_iter()
        .collect();
        let all = alpha_diversity_all(&set);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].sample_id, "S1");
        assert_eq!(all[0].richness, 2);
    }
}
