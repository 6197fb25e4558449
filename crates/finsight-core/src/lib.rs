#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for financial statement insights.
//!
//! This crate provides the data model shared by every other `finsight` crate:
//!
//! - [`RawStatement`](statement::RawStatement) - Line items per fiscal period
//! - [`MetricSet`](metrics::MetricSet) - Named ratios computed from a statement
//! - [`ChartSeries`](chart::ChartSeries) - Chart-ready series extracted from a statement
//! - [`InsightBundle`](insight::InsightBundle) - Narratives, metrics and charts for one statement
//!
//! and the collaborator traits the pipeline is written against:
//!
//! - [`StatementProvider`](provider::StatementProvider) - Raw financial statements
//! - [`ReferenceDataProvider`](provider::ReferenceDataProvider) - Company overview and symbol search
//! - [`NewsProvider`](provider::NewsProvider) - News with sentiment scores
//! - [`NarrativeService`](narrative::NarrativeService) - Narrative text generation

/// Chart series types.
pub mod chart;
/// Error types for fetching and composing insights.
pub mod error;
/// Insight categories, selections and bundles.
pub mod insight;
/// Financial metric schema and metric sets.
pub mod metrics;
/// Narrative-generation service trait and request payload.
pub mod narrative;
/// Company overview and news types.
pub mod reference;
/// Provider traits for fetching statement, reference and news data.
pub mod provider;
/// Raw financial statement types.
pub mod statement;
/// Core identifier types (Symbol, StatementType, PeriodType).
pub mod types;

// Re-export commonly used items at crate root
pub use chart::{ChartPoint, ChartSeries, SeriesKind};
pub use error::{InsightError, Result};
pub use insight::{Insight, InsightBundle, InsightCategory, InsightSelection, UnavailableInsight};
pub use metrics::{Metric, MetricFormat, MetricSet, MetricValue};
pub use narrative::{NarrativeRequest, NarrativeService};
pub use provider::{DataProvider, NewsProvider, ReferenceDataProvider, StatementProvider};
pub use reference::{CompanyOverview, NewsArticle, NewsDigest, SentimentClass, SymbolMatch};
pub use statement::{LineItems, RawStatement};
pub use types::{PeriodType, StatementType, Symbol};
