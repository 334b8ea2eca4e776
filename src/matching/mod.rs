//! Reference matching by k-mer similarity.
//!
//! - [`MatchingEngine`]: Scores a query sequence against every catalog entry
//! - [`kmer_similarity`]: Jaccard index over the k-mer sets of two sequences
//!
//! ## Scoring
//!
//! Sequences are decomposed into overlapping 8-mers (case-insensitive) and
//! compared with the Jaccard index `|A ∩ B| / |A ∪ B|`. Sequences shorter than
//! eight bases score 0 against everything.
//!
//! ## Example
//!
//! ```rust,no_run
//! use edna_core::{MatchingEngine, ReferenceCatalog};
//!
//! let catalog = ReferenceCatalog::load_embedded().unwrap();
//! let engine = MatchingEngine::new(&catalog);
//!
//! if let Some(hit) = engine.best_hit("GGCGGGACGAATGGACAACGACGG", 0.8) {
//!     println!("{}: {:.1}%", hit.entry.id, hit.similarity * 100.0);
//! }
//! ```
//!
//! [`MatchingEngine`]: engine::MatchingEngine
//! [`kmer_similarity`]: scoring::kmer_similarity

pub mod engine;
pub mod scoring;
