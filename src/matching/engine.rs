use crate::catalog::store::ReferenceCatalog;
use crate::catalog::store::ReferenceEntry;
use crate::matching::scoring::{jaccard_similarity, kmer_set, KMER_SIZE};

/// A catalog entry scored against a query sequence
#[derive(Debug, Clone, Copy)]
pub struct ReferenceHit<'a> {
    /// The matched catalog entry
    pub entry: &'a ReferenceEntry,

    /// k-mer Jaccard similarity in [0, 1]
    pub similarity: f64,
}

/// Scores query sequences against every entry of a reference catalog
pub struct MatchingEngine<'a> {
    catalog: &'a ReferenceCatalog,
}

impl<'a> MatchingEngine<'a> {
    pub fn new(catalog: &'a ReferenceCatalog) -> Self {
        Self { catalog }
    }

    /// Similarity of `sequence` to every catalog entry, in catalog order
    pub fn score_all(&self, sequence: &str) -> Vec<ReferenceHit<'a>> {
        let catalog: &'a ReferenceCatalog = self.catalog;

        // Short queries score 0 against everything
        if sequence.len() < KMER_SIZE {
            return catalog
                .entries
                .iter()
                .map(|entry| ReferenceHit {
                    entry,
                    similarity: 0.0,
                })
                .collect();
        }

        let query = kmer_set(sequence);
        catalog
            .entries
            .iter()
            .map(|entry| ReferenceHit {
                entry,
                similarity: jaccard_similarity(&query, &entry.kmers),
            })
            .collect()
    }

    /// Highest-similarity entry at or above `min_identity`.
    ///
    /// Ties go to the entry that comes first in the catalog.
    pub fn best_hit(&self, sequence: &str, min_identity: f64) -> Option<ReferenceHit<'a>> {
        let mut best: Option<ReferenceHit<'a>> = None;
        for hit in self.score_all(sequence) {
            if hit.similarity < min_identity {
                continue;
            }
            // Strictly greater keeps the first-encountered entry on ties
            if best.map_or(true, |b| hit.similarity > b.similarity) {
                best = Some(hit);
            }
        }
        best
    }

    /// All entries at or above `min_identity`, best first.
    ///
    /// The sort is stable, so equal similarities stay in catalog order.
    pub fn rank_hits(&self, sequence: &str, min_identity: f64) -> Vec<ReferenceHit<'a>> {
        let mut hits: Vec<ReferenceHit<'a>> = self
            .score_all(sequence)
            .into_iter()
            .filter(|hit| hit.similarity >= min_identity)
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lineage::Lineage;
    use crate::core::types::Rank;

    fn lineage(species: &str) -> Lineage {
        let mut lineage = Lineage::default();
        lineage.set(Rank::Kingdom, "Animalia");
        lineage.set(Rank::Species, species);
        lineage
    }

    fn make_test_catalog() -> ReferenceCatalog {
        let mut catalog = ReferenceCatalog::new();
        for (id, seq, species) in [
            ("A", "ACGTTGCAACGTAGCTAGCTAAGG", "Species a"),
            ("B", "ACGTTGCAACGTAGCTAGCTAAGG", "Species b"),
            ("C", "TTTTGGGGCCCCAAAATTTTGGGG", "Species c"),
        ] {
            catalog
                .add_entry(ReferenceEntry::new(id, seq, lineage(species)))
                .unwrap();
        }
        catalog
    }

    #[test]
    fn test_best_hit_exact_match() {
        let catalog = ReferenceCatalog::load_embedded().unwrap();
        let engine = MatchingEngine::new(&catalog);

        let tuna = catalog.get("REF_001").unwrap();
        let hit = engine.best_hit(&tuna.sequence, 0.8).unwrap();
        assert_eq!(hit.entry.id, "REF_001");
        assert!((hit.similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_best_hit_tie_keeps_catalog_order() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let hit = engine.best_hit("ACGTTGCAACGTAGCTAGCTAAGG", 0.8).unwrap();
        assert_eq!(hit.entry.id, "A");
    }

    #[test]
    fn test_best_hit_below_threshold() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        assert!(engine.best_hit("GATTACAGATTACAGATTACA", 0.8).is_none());
        assert!(engine.best_hit("ACGT", 0.0).is_some_and(|h| h.similarity == 0.0));
    }

    #[test]
    fn test_rank_hits_sorted_and_stable() {
        let catalog = make_test_catalog();
        let engine = MatchingEngine::new(&catalog);

        let hits = engine.rank_hits("ACGTTGCAACGTAGCTAGCTAAGG", 0.0);
        let ids: Vec<&str> = hits.iter().map(|h| h.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert!(hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }
}
