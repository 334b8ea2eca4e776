use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::assignment::lca::lineage_lca;
use crate::assignment::resolver::{ResolverError, TaxonResolver};
use crate::assignment::summary::{BatchAssignment, DEFAULT_HIGH_CONFIDENCE_THRESHOLD};
use crate::catalog::store::{ReferenceCatalog, ReferenceEntry};
use crate::core::asv::Asv;
use crate::core::lineage::TaxonomicAssignment;
use crate::core::types::{AssignmentMethod, Rank};
use crate::matching::engine::MatchingEngine;
use crate::matching::scoring::similarity_to_confidence;
use crate::utils::validation::{validate_fraction, ValidationError};

/// Default minimum k-mer similarity for a reference match
pub const DEFAULT_MIN_IDENTITY: f64 = 0.80;

/// Default time allowed for one taxonomy authority lookup
pub const DEFAULT_RESOLVER_TIMEOUT_MS: u64 = 5_000;

/// Default similarity window below the best hit used for consensus assignment
pub const DEFAULT_CONSENSUS_WINDOW: f64 = 0.02;

/// Configuration for taxonomic assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Minimum k-mer similarity for a reference entry to count as a match
    pub min_identity: f64,
    /// Confidence at or above which an assignment counts as high confidence
    pub high_confidence_threshold: u8,
    /// Upper bound on a single resolver call
    pub resolver_timeout_ms: u64,
    /// Hits within this similarity of the best hit join the consensus
    pub consensus_window: f64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            min_identity: DEFAULT_MIN_IDENTITY,
            high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
            resolver_timeout_ms: DEFAULT_RESOLVER_TIMEOUT_MS,
            consensus_window: DEFAULT_CONSENSUS_WINDOW,
        }
    }
}

impl AssignmentConfig {
    /// Check option ranges
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if `min_identity` or
    /// `consensus_window` is outside [0, 1] or the threshold exceeds 100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fraction("min_identity", self.min_identity)?;
        validate_fraction("consensus_window", self.consensus_window)?;
        if self.high_confidence_threshold > 100 {
            return Err(ValidationError::OutOfRange {
                name: "high_confidence_threshold",
                value: self.high_confidence_threshold.to_string(),
                expected: "a confidence between 0 and 100",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_millis(self.resolver_timeout_ms)
    }
}

/// Assigns taxonomy to ASVs by reference matching plus habitat verification
pub struct AssignmentEngine<'a> {
    matcher: MatchingEngine<'a>,
    resolver: &'a dyn TaxonResolver,
    config: AssignmentConfig,
}

impl<'a> AssignmentEngine<'a> {
    /// Create an engine with default configuration
    pub fn new(catalog: &'a ReferenceCatalog, resolver: &'a dyn TaxonResolver) -> Self {
        Self {
            matcher: MatchingEngine::new(catalog),
            resolver,
            config: AssignmentConfig::default(),
        }
    }

    /// Create an engine with custom configuration
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the configuration is out of range.
    pub fn with_config(
        catalog: &'a ReferenceCatalog,
        resolver: &'a dyn TaxonResolver,
        config: AssignmentConfig,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            matcher: MatchingEngine::new(catalog),
            resolver,
            config,
        })
    }

    pub fn config(&self) -> &AssignmentConfig {
        &self.config
    }

    /// Assign taxonomy to a single ASV.
    ///
    /// Never fails: an ASV without a qualifying reference hit is returned as
    /// unassigned, and resolver failures fall back to the reference habitat.
    pub async fn assign_taxonomy(&self, asv: &Asv) -> TaxonomicAssignment {
        let Some(hit) = self
            .matcher
            .best_hit(&asv.representative_sequence, self.config.min_identity)
        else {
            debug!("{}: no reference above {:.2}", asv.id, self.config.min_identity);
            return TaxonomicAssignment::unassigned(&asv.id);
        };

        let confidence = similarity_to_confidence(hit.similarity);
        let is_marine = match hit.entry.lineage.get(Rank::Species) {
            Some(species) => self.verify_habitat(species, hit.entry).await,
            None => hit.entry.is_marine,
        };

        debug!(
            "{}: {} ({}) similarity {:.3}",
            asv.id,
            hit.entry.id,
            hit.entry.lineage.to_path(),
            hit.similarity
        );

        TaxonomicAssignment::assigned(
            &asv.id,
            hit.entry.lineage.clone(),
            confidence,
            AssignmentMethod::ReferenceMatch,
        )
        .with_reference(&hit.entry.id)
        .with_habitat(is_marine)
    }

    /// Assign taxonomy to every ASV, one resolver call at a time
    pub async fn assign_batch(&self, asvs: &[Asv]) -> BatchAssignment {
        let mut assignments = Vec::with_capacity(asvs.len());
        for asv in asvs {
            assignments.push(self.assign_taxonomy(asv).await);
        }

        let batch = BatchAssignment::new(assignments);
        info!(
            "Assigned {}/{} ASVs (mean confidence {:.1})",
            batch.summary.assigned_count, batch.summary.total, batch.summary.mean_confidence
        );
        batch
    }

    /// Consensus assignment from every reference hit close to the best one.
    ///
    /// Hits within `consensus_window` of the best similarity are reduced to
    /// their lowest common ancestor. Confidence reflects the weakest hit in
    /// the window. No resolver call is made.
    pub fn consensus_assignment(&self, asv: &Asv) -> TaxonomicAssignment {
        let hits = self
            .matcher
            .rank_hits(&asv.representative_sequence, self.config.min_identity);
        let Some(best) = hits.first() else {
            return TaxonomicAssignment::unassigned(&asv.id);
        };

        let floor = best.similarity - self.config.consensus_window;
        let window: Vec<&ReferenceEntry> = hits
            .iter()
            .take_while(|hit| hit.similarity >= floor)
            .map(|hit| hit.entry)
            .collect();
        let weakest = hits
            .iter()
            .take(window.len())
            .map(|hit| hit.similarity)
            .fold(best.similarity, f64::min);

        let lineage = lineage_lca(window.iter().map(|entry| &entry.lineage));
        let habitat = window[0].is_marine;
        let is_marine = if window.iter().all(|entry| entry.is_marine == habitat) {
            habitat
        } else {
            None
        };

        let assignment = TaxonomicAssignment::assigned(
            &asv.id,
            lineage,
            similarity_to_confidence(weakest),
            AssignmentMethod::ReferenceMatch,
        )
        .with_habitat(is_marine);

        match window.as_slice() {
            [single] => assignment.with_reference(&single.id),
            _ => assignment,
        }
    }

    /// Refine the habitat flag through the resolver, falling back to the
    /// catalog entry's recorded flag on any failure
    async fn verify_habitat(&self, species: &str, entry: &ReferenceEntry) -> Option<bool> {
        let timeout = self.config.resolver_timeout();
        let result = match tokio::time::timeout(timeout, self.resolver.resolve_taxon(species)).await
        {
            Ok(result) => result,
            Err(_) => Err(ResolverError::Timeout(timeout)),
        };

        match result {
            Ok(resolved) => match resolved.verified_is_marine() {
                Some(is_marine) => Some(is_marine),
                None => {
                    debug!("No habitat verification for '{species}', using reference flag");
                    entry.is_marine
                }
            },
            Err(e) => {
                warn!("Habitat lookup for '{species}' failed ({e}); using reference flag");
                entry.is_marine
            }
        }
    }
}
