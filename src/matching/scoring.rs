use std::collections::HashSet;

/// k-mer length used for reference similarity
pub const KMER_SIZE: usize = 8;

/// Safely convert usize to f64 for ratio calculations
///
/// k-mer set sizes are bounded by sequence length and stay well within the
/// exact integer range of an f64 mantissa.
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Distinct k-mers of a sequence, case-insensitive.
///
/// Each k-mer is packed big-endian into a `u64`, which is lossless because
/// `KMER_SIZE` is 8 bytes. Sequences shorter than `KMER_SIZE` have no k-mers.
#[must_use]
pub fn kmer_set(sequence: &str) -> HashSet<u64> {
    let bytes = sequence.as_bytes();
    if bytes.len() < KMER_SIZE {
        return HashSet::new();
    }

    bytes
        .windows(KMER_SIZE)
        .map(|window| {
            window
                .iter()
                .fold(0u64, |acc, &b| (acc << 8) | u64::from(b.to_ascii_uppercase()))
        })
        .collect()
}

/// Jaccard similarity: |A ∩ B| / |A ∪ B|
///
/// Returns 0.0 when both sets are empty.
#[must_use]
pub fn jaccard_similarity<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    // Iterate the smaller set
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|k| large.contains(*k)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        count_to_f64(intersection) / count_to_f64(union)
    }
}

/// k-mer Jaccard similarity between two sequences, in [0, 1].
///
/// Returns 0.0 if either sequence is shorter than `KMER_SIZE`.
///
/// # Examples
///
/// ```
/// use edna_core::matching::scoring::kmer_similarity;
///
/// assert_eq!(kmer_similarity("ACGTACGTAC", "acgtacgtac"), 1.0);
/// assert_eq!(kmer_similarity("ACGT", "ACGTACGTAC"), 0.0);
/// ```
#[must_use]
pub fn kmer_similarity(seq1: &str, seq2: &str) -> f64 {
    if seq1.len() < KMER_SIZE || seq2.len() < KMER_SIZE {
        return 0.0;
    }
    jaccard_similarity(&kmer_set(seq1), &kmer_set(seq2))
}

/// Convert a similarity in [0, 1] into a 0-100 confidence
#[must_use]
pub fn similarity_to_confidence(similarity: f64) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to 0-100
    {
        (similarity * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard_similarity() {
        let a: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let b: HashSet<i32> = [2, 3, 4].into_iter().collect();

        // intersection = {2, 3} = 2, union = {1, 2, 3, 4} = 4
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < 0.001);

        let empty1: HashSet<i32> = HashSet::new();
        let empty2: HashSet<i32> = HashSet::new();
        assert!((jaccard_similarity(&empty1, &empty2) - 0.0).abs() < 0.001);
        assert!((jaccard_similarity(&a, &empty1) - 0.0).abs() < 0.001);

        let c: HashSet<i32> = [1, 2, 3].into_iter().collect();
        assert!((jaccard_similarity(&a, &c) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_kmer_set_counts_distinct_windows() {
        // 10 bases -> 3 windows, all distinct
        assert_eq!(kmer_set("ACGTACGTAC").len(), 3);
        // Homopolymer collapses to a single k-mer
        assert_eq!(kmer_set("AAAAAAAAAAAA").len(), 1);
        assert!(kmer_set("ACGTACG").is_empty());
    }

    #[test]
    fn test_kmer_similarity_case_insensitive() {
        let s = "GGCGGGACGAATGGACAACGACGG";
        assert!((kmer_similarity(s, &s.to_lowercase()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_kmer_similarity_symmetric_and_bounded() {
        let pairs = [
            ("ACGTTGCAACGTAGCTAGCT", "ACGTTGCAACGTAGCTTTTT"),
            ("AAAAAAAACCCCCCCC", "CCCCCCCCAAAAAAAA"),
            ("ACGTACGTACGT", "TTTTGGGGCCCC"),
            ("ACG", "ACGTACGTACGT"),
        ];
        for (a, b) in pairs {
            let ab = kmer_similarity(a, b);
            let ba = kmer_similarity(b, a);
            assert!((ab - ba).abs() < 1e-12, "asymmetric for {a} / {b}");
            assert!((0.0..=1.0).contains(&ab));
        }
    }

    #[test]
    fn test_similarity_to_confidence() {
        assert_eq!(similarity_to_confidence(1.0), 100);
        assert_eq!(similarity_to_confidence(0.804), 80);
        assert_eq!(similarity_to_confidence(0.806), 81);
        assert_eq!(similarity_to_confidence(0.0), 0);
    }
}
