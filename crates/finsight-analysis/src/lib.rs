#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Pure analysis over raw financial statements.
//!
//! - [`RatioEngine`] - Named ratios per statement type
//! - [`ChartSeriesBuilder`] - Trend and composition series for charting
//! - [`InsightComposer`] - Per-category narratives assembled into an
//!   [`InsightBundle`](finsight_core::InsightBundle)
//!
//! Nothing here performs I/O except through the
//! [`NarrativeService`](finsight_core::NarrativeService) handed to the composer.

/// Chart series extraction.
pub mod charts;
/// Insight composition.
pub mod composer;
/// Financial ratio computation.
pub mod ratios;

pub use charts::{ChartSeriesBuilder, ChartSpec, Composition, Trend};
pub use composer::{CategoryContext, InsightComposer};
pub use ratios::{DEFAULT_DENOMINATOR_EPSILON, RatioEngine};
