#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/finsight/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage data provider.
//!
//! This crate implements the finsight-core provider traits for the
//! [Alpha Vantage](https://www.alphavantage.co/) API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use finsight_alphavantage::AlphaVantageProvider;
//! use finsight_core::{PeriodType, StatementProvider, StatementType, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = AlphaVantageProvider::new("your_api_key");
//!
//!     let income = provider
//!         .fetch_statement(&Symbol::new("IBM"), StatementType::IncomeStatement, PeriodType::Annual)
//!         .await?;
//!     println!("{}", income.to_dataframe()?);
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use finsight_core::{
    CompanyOverview, DataProvider, InsightError, NewsDigest, NewsProvider, PeriodType,
    RawStatement, ReferenceDataProvider, Result, StatementProvider, StatementType, Symbol,
    SymbolMatch,
};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use tracing::debug;

mod response;

/// Provider name used in errors and logs.
pub const PROVIDER_NAME: &str = "Alpha Vantage";

/// Base URL for the Alpha Vantage query API.
const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage data provider.
///
/// Provides access to:
/// - Income statements, balance sheets and cash flow statements (annual and quarterly)
/// - Company overviews and symbol search
/// - News articles with sentiment scores
#[derive(Clone)]
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for AlphaVantageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Create a new Alpha Vantage provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }

    /// Point the provider at another query endpoint (e.g. a local mirror).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a query URL for an API function with the API key appended.
    fn url(&self, function: &str, params: &[(&str, &str)]) -> Result<Url> {
        let query = [("function", function)]
            .into_iter()
            .chain(params.iter().copied())
            .chain([("apikey", self.api_key.as_str())]);
        Url::parse_with_params(&self.base_url, query)
            .map_err(|e| InsightError::InvalidParameter(format!("{}: {e}", self.base_url)))
    }

    /// Call an API function and return the JSON payload.
    ///
    /// Throttling notices delivered with HTTP 200 are mapped to
    /// [`InsightError::RateLimited`].
    async fn query(&self, function: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.url(function, params)?;
        debug!(provider = PROVIDER_NAME, function, "Alpha Vantage request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InsightError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let text = response
            .text()
            .await
            .map_err(|e| InsightError::Network(e.to_string()))?;
        let body: Value =
            serde_json::from_str(&text).map_err(|e| InsightError::Parse(format!("{e}: {text}")))?;

        response::check_throttled(&body)?;
        Ok(body)
    }
}

/// Maps a non-success HTTP status to an error.
fn status_error(status: StatusCode, body: &str) -> InsightError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => InsightError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            message: format!("HTTP {status}"),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            InsightError::AuthenticationFailed(PROVIDER_NAME.to_string())
        }
        _ => InsightError::Network(format!("HTTP {status}: {body}")),
    }
}

/// API function name of a statement type.
const fn statement_function(statement_type: StatementType) -> &'static str {
    match statement_type {
        StatementType::IncomeStatement => "INCOME_STATEMENT",
        StatementType::BalanceSheet => "BALANCE_SHEET",
        StatementType::CashFlow => "CASH_FLOW",
    }
}

impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Alpha Vantage - Fundamental data, company overviews and news sentiment"
    }
}

#[async_trait]
impl StatementProvider for AlphaVantageProvider {
    async fn fetch_statement(
        &self,
        symbol: &Symbol,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<RawStatement> {
        let body = self
            .query(statement_function(statement_type), &[("symbol", symbol.as_str())])
            .await?;
        let statement = response::parse_statement(symbol, statement_type, period_type, &body)?;

        debug!(
            provider = PROVIDER_NAME,
            symbol = %symbol,
            statement = %statement_type,
            periods = statement.len(),
            "Fetched statement"
        );
        Ok(statement)
    }
}

#[async_trait]
impl ReferenceDataProvider for AlphaVantageProvider {
    async fn company_overview(&self, symbol: &Symbol) -> Result<CompanyOverview> {
        let body = self.query("OVERVIEW", &[("symbol", symbol.as_str())]).await?;
        response::parse_overview(symbol, &body)
    }

    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return Err(InsightError::InvalidParameter(
                "search keywords must not be empty".to_string(),
            ));
        }
        let body = self.query("SYMBOL_SEARCH", &[("keywords", keywords)]).await?;
        response::parse_search(&body)
    }
}

#[async_trait]
impl NewsProvider for AlphaVantageProvider {
    async fn top_news(&self, symbol: &Symbol, limit: usize) -> Result<NewsDigest> {
        if limit == 0 {
            return Ok(NewsDigest::from_articles(Vec::new()));
        }
        let limit_param = limit.to_string();
        let body = self
            .query(
                "NEWS_SENTIMENT",
                &[
                    ("tickers", symbol.as_str()),
                    ("sort", "LATEST"),
                    ("limit", limit_param.as_str()),
                ],
            )
            .await?;
        response::parse_news(symbol, limit, &body)
    }
}
