//! Taxonomic assignment of ASVs.
//!
//! - [`AssignmentEngine`]: Best reference hit per ASV, habitat refined through a [`TaxonResolver`]
//! - [`BatchAssignment`]: Assignments for a dataset plus rank frequency tables
//! - [`lowest_common_ancestor`]: Consensus lineage of several candidates
//!
//! Resolver failures and timeouts never fail an assignment; the habitat flag
//! recorded in the reference catalog is used instead.
//!
//! [`AssignmentEngine`]: engine::AssignmentEngine
//! [`TaxonResolver`]: resolver::TaxonResolver
//! [`BatchAssignment`]: summary::BatchAssignment
//! [`lowest_common_ancestor`]: lca::lowest_common_ancestor

pub mod engine;
pub mod lca;
pub mod resolver;
pub mod summary;

pub use engine::{AssignmentConfig, AssignmentEngine};
pub use lca::{lineage_lca, lowest_common_ancestor};
pub use resolver::{OfflineResolver, ResolvedTaxon, ResolverError, StaticResolver, TaxonResolver};
pub use summary::{filter_by_confidence, AssignmentSummary, BatchAssignment, ConfidenceBuckets};
