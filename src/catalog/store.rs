use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::core::lineage::Lineage;
use crate::matching::scoring::kmer_set;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate catalog entry id: {0}")]
    DuplicateEntry(String),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    pub entries: Vec<ReferenceEntry>,
}

/// A curated reference barcode with its known lineage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Unique identifier, e.g. `REF_001`
    pub id: String,

    /// Reference barcode sequence
    pub sequence: String,

    pub lineage: Lineage,

    /// Recorded habitat; used when the taxonomy resolver cannot verify it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_marine: Option<bool>,

    // === Pre-computed for fast matching (populated on load) ===
    /// k-mers of the sequence
    #[serde(skip)]
    pub kmers: HashSet<u64>,
}

impl ReferenceEntry {
    pub fn new(id: impl Into<String>, sequence: impl Into<String>, lineage: Lineage) -> Self {
        let mut entry = Self {
            id: id.into(),
            sequence: sequence.into(),
            lineage,
            is_marine: None,
            kmers: HashSet::new(),
        };
        entry.rebuild_indexes();
        entry
    }

    #[must_use]
    pub fn with_habitat(mut self, is_marine: bool) -> Self {
        self.is_marine = Some(is_marine);
        self
    }

    /// Rebuild the k-mer set after modifying the sequence
    pub fn rebuild_indexes(&mut self) {
        self.kmers = kmer_set(&self.sequence);
    }
}

/// The reference catalog with an id index
#[derive(Debug)]
pub struct ReferenceCatalog {
    /// All entries, in catalog order (the order breaks similarity ties)
    pub entries: Vec<ReferenceEntry>,

    /// Date the catalog was curated
    pub created_at: String,

    /// Index: entry ID -> index in entries vec
    id_to_index: HashMap<String, usize>,
}

impl ReferenceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            created_at: String::new(),
            id_to_index: HashMap::new(),
        }
    }

    /// Load the embedded default catalog
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Embedded at compile time, validated by build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/reference_sequences.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load catalog from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION, data.version
            );
        }

        let mut catalog = Self::new();
        catalog.created_at = data.created_at;
        for mut entry in data.entries {
            entry.rebuild_indexes();
            catalog.add_entry(entry)?;
        }

        Ok(catalog)
    }

    /// Add an entry to the end of the catalog
    pub fn add_entry(&mut self, entry: ReferenceEntry) -> Result<(), CatalogError> {
        if self.id_to_index.contains_key(&entry.id) {
            return Err(CatalogError::DuplicateEntry(entry.id));
        }

        self.id_to_index.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Get an entry by ID
    pub fn get(&self, id: &str) -> Option<&ReferenceEntry> {
        self.id_to_index.get(id).map(|&idx| &self.entries[idx])
    }

    /// Export catalog to JSON
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: self.created_at.clone(),
            entries: self.entries.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of entries in catalog
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
