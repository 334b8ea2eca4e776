use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Taxonomy authority unavailable: {0}")]
    Unavailable(String),

    #[error("Taxonomy lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed taxonomy response: {0}")]
    Malformed(String),

    #[error("Failed to load habitat table: {0}")]
    Load(String),
}

/// Habitat information returned by the taxonomy authority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habitat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_marine: Option<bool>,
}

/// Result of resolving a species name against the taxonomy authority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTaxon {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habitat: Option<Habitat>,
}

impl ResolvedTaxon {
    /// A resolved name with a known habitat
    #[must_use]
    pub fn with_habitat(is_marine: bool) -> Self {
        Self {
            success: true,
            habitat: Some(Habitat {
                is_marine: Some(is_marine),
            }),
        }
    }

    /// Name the authority could not resolve
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Verified marine flag, only when the lookup succeeded
    #[must_use]
    pub fn verified_is_marine(&self) -> Option<bool> {
        if !self.success {
            return None;
        }
        self.habitat.as_ref().and_then(|h| h.is_marine)
    }
}

/// External authority that resolves accepted species names.
///
/// Caching and rate limiting belong to the implementation; the assignment
/// engine calls it at most once per assigned ASV and treats every error as
/// "no verification available".
#[async_trait]
pub trait TaxonResolver: Send + Sync {
    async fn resolve_taxon(&self, species_name: &str) -> Result<ResolvedTaxon, ResolverError>;
}

/// Resolver for runs without access to the authority; never verifies anything
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineResolver;

#[async_trait]
impl TaxonResolver for OfflineResolver {
    async fn resolve_taxon(&self, _species_name: &str) -> Result<ResolvedTaxon, ResolverError> {
        Ok(ResolvedTaxon::unresolved())
    }
}

/// Resolver backed by a fixed species -> is_marine table
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    habitats: HashMap<String, bool>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_species(mut self, species_name: impl Into<String>, is_marine: bool) -> Self {
        self.habitats.insert(species_name.into(), is_marine);
        self
    }

    /// Load a JSON object mapping species names to `true`/`false`
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::Load` if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, ResolverError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ResolverError::Load(format!("{}: {e}", path.display())))?;
        let habitats: HashMap<String, bool> = serde_json::from_str(&content)
            .map_err(|e| ResolverError::Load(format!("{}: {e}", path.display())))?;
        Ok(Self { habitats })
    }

    pub fn len(&self) -> usize {
        self.habitats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habitats.is_empty()
    }
}

#[async_trait]
impl TaxonResolver for StaticResolver {
    async fn resolve_taxon(&self, species_name: &str) -> Result<ResolvedTaxon, ResolverError> {
        Ok(self
            .habitats
            .get(species_name.trim())
            .map_or_else(ResolvedTaxon::unresolved, |&is_marine| {
                ResolvedTaxon::with_habitat(is_marine)
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_verified_is_marine_requires_success() {
        let failed = ResolvedTaxon {
            success: false,
            habitat: Some(Habitat {
                is_marine: Some(true),
            }),
        };
        assert_eq!(failed.verified_is_marine(), None);
        assert_eq!(
            ResolvedTaxon::with_habitat(false).verified_is_marine(),
            Some(false)
        );
        let no_habitat = ResolvedTaxon {
            success: true,
            habitat: None,
        };
        assert_eq!(no_habitat.verified_is_marine(), None);
    }

    #[tokio::test]
    async fn test_static_resolver_lookup() {
        let resolver = StaticResolver::new().with_species("Gadus morhua", true);

        let known = resolver.resolve_taxon("Gadus morhua").await.unwrap();
        assert_eq!(known.verified_is_marine(), Some(true));

        let unknown = resolver.resolve_taxon("Rana temporaria").await.unwrap();
        assert!(!unknown.success);
    }

    #[tokio::test]
    async fn test_offline_resolver_never_verifies() {
        let result = OfflineResolver.resolve_taxon("Thunnus albacares").await.unwrap();
        assert_eq!(result, ResolvedTaxon::unresolved());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp = NamedTempFile::with_suffix(".json").unwrap();
        temp.write_all(br#"{"Thunnus albacares": true, "Rana temporaria": false}"#)
            .unwrap();
        temp.flush().unwrap();

        let resolver = StaticResolver::load_from_file(temp.path()).unwrap();
        assert_eq!(resolver.len(), 2);

        let mut bad = NamedTempFile::with_suffix(".json").unwrap();
        bad.write_all(b"[1, 2, 3]").unwrap();
        bad.flush().unwrap();
        assert!(matches!(
            StaticResolver::load_from_file(bad.path()),
            Err(ResolverError::Load(_))
        ));
    }
}
