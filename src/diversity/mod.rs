//! Biodiversity statistics from per-sample abundance tables.
//!
//! - [`alpha`]: richness, Shannon, Simpson, Pielou evenness, Berger-Parker, Chao1
//! - [`beta`]: Bray-Curtis, Jaccard, Sorensen and the pairwise sample matrix
//! - [`rarefaction`]: bootstrap richness curves with an injected RNG
//!
//! All functions are pure. Empty samples produce zero-valued indices and
//! empty curves rather than errors.

pub mod alpha;
pub mod beta;
pub mod rarefaction;

pub use alpha::{alpha_diversity, alpha_diversity_all, AlphaDiversity};
pub use beta::{beta_diversity, bray_curtis, pairwise_beta_diversity, BetaDiversity};
pub use rarefaction::{
    rarefaction_curve, rarefaction_curves, RarefactionConfig, RarefactionCurve, RarefactionPoint,
};
