#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial statement insights for a ticker.
//!
//! This crate re-exports the core types, the analysis engines and the
//! provider implementations, and provides an [`InsightPipeline`] that runs
//! the whole "generate insights" action: company overview, statements,
//! ratios, chart series, narratives and news.
//!
//! # Features
//!
//! - `alphavantage` - Alpha Vantage provider for statements, overviews and news
//! - `openai` - OpenAI narrative service
//!
//! # Example
//!
//! ```rust,ignore
//! use finsight::{FinsightConfig, InsightPipeline, InsightSelection, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> finsight::Result<()> {
//!     let config = FinsightConfig::from_env()?;
//!     let pipeline = InsightPipeline::from_config(&config)?;
//!
//!     let report = pipeline.generate(&Symbol::new("MSFT"), &InsightSelection::all()).await?;
//!     if let Some(text) = report.income_statement.as_ref().and_then(|b| b.text("revenue_health")) {
//!         println!("{text}");
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use finsight_core::*;

// Analysis
pub use finsight_analysis::{
    CategoryContext, ChartSeriesBuilder, ChartSpec, Composition, InsightComposer, RatioEngine,
    Trend,
};

// Providers
#[cfg(feature = "alphavantage")]
pub use finsight_alphavantage::AlphaVantageProvider;
#[cfg(feature = "openai")]
pub use finsight_openai::OpenAiNarrator;

mod config;
pub use config::{
    ALPHA_VANTAGE_API_KEY, DEFAULT_NEWS_LIMIT, FINSIGHT_NARRATIVE_CONCURRENCY, FINSIGHT_NEWS_LIMIT,
    FINSIGHT_OPENAI_MODEL, FINSIGHT_PERIOD, FinsightConfig, OPENAI_API_KEY,
};

mod pipeline;
pub use pipeline::{InsightPipeline, Report};
