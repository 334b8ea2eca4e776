//! Core data types for eDNA survey analysis.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Asv`]: An amplicon sequence variant with per-sample read counts
//! - [`Lineage`], [`TaxonomicAssignment`]: The taxonomic identity of an ASV
//! - [`AbundanceData`], [`SampleSet`]: Taxon-by-sample abundance tables
//! - [`Rank`], [`Severity`], [`ContaminationType`], [`Environment`]: Closed vocabularies
//!
//! ## Unassigned ASVs
//!
//! An ASV that matches nothing in the reference catalog still receives an
//! assignment, with a confidence of 0 and an empty lineage:
//!
//! | confidence | lineage | meaning |
//! |------------|---------|---------|
//! | 0          | empty   | unassigned |
//! | 1-69       | set     | low confidence |
//! | 70-100     | set     | high confidence |
//!
//! [`Asv`]: asv::Asv
//! [`Lineage`]: lineage::Lineage
//! [`TaxonomicAssignment`]: lineage::TaxonomicAssignment
//! [`AbundanceData`]: abundance::AbundanceData
//! [`SampleSet`]: abundance::SampleSet
//! [`Rank`]: types::Rank
//! [`Severity`]: types::Severity
//! [`ContaminationType`]: types::ContaminationType
//! [`Environment`]: types::Environment

pub mod abundance;
pub mod asv;
pub mod lineage;
pub mod types;
