//! Contamination screening.
//!
//! A fixed battery of independent [`Detector`]s looks at each ASV and its
//! assignment. [`ContaminationScreener`] runs the battery over the ASVs
//! observed in a sample and aggregates the flags into a
//! [`ContaminationReport`]:
//!
//! | Detector | Type | Severity | Confidence |
//! |----------|------|----------|------------|
//! | Lab contaminant | lab-contaminant | high | 95 |
//! | Adapter / primer | lab-contaminant | high | 99 |
//! | Negative control | negative-control | high | 90 |
//! | Unexpected taxa (marine surveys) | unexpected-taxa | medium | 80 / 75 |
//! | Index bleed | index-bleed | low | 60 |
//!
//! The score is `min(100, 20 * high + 5 * medium + low)`; a sample is clean
//! when it scores below 10.
//!
//! [`Detector`]: detectors::Detector
//! [`ContaminationScreener`]: screener::ContaminationScreener
//! [`ContaminationReport`]: report::ContaminationReport

pub mod detectors;
pub mod flag;
pub mod report;
pub mod screener;

pub use flag::ContaminationFlag;
pub use report::{contamination_score, ContaminationReport};
pub use screener::{remove_contaminants, ContaminationConfig, ContaminationScreener, Removal};
