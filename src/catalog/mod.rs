//! Curated reference barcode catalog.
//!
//! The catalog contains reference sequences for taxa expected in eDNA surveys,
//! each with a full lineage and a recorded habitat flag. An embedded catalog is
//! compiled into the binary, but custom catalogs can also be loaded from JSON
//! files.
//!
//! ## Example
//!
//! ```rust,no_run
//! use edna_core::ReferenceCatalog;
//! use std::path::Path;
//!
//! // Load embedded catalog
//! let catalog = ReferenceCatalog::load_embedded().unwrap();
//! for entry in &catalog.entries {
//!     println!("{}\t{}", entry.id, entry.lineage.to_path());
//! }
//!
//! // Or a site-specific catalog
//! let custom = ReferenceCatalog::load_from_file(Path::new("north_sea.json")).unwrap();
//! ```

pub mod store;
