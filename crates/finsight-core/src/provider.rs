//! Provider traits for fetching statement, reference and news data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`StatementProvider`] - Raw income statements, balance sheets and cash flows
//! - [`ReferenceDataProvider`] - Company overview and symbol search
//! - [`NewsProvider`] - News articles with sentiment

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{InsightError, Result},
    reference::{CompanyOverview, NewsDigest, SymbolMatch},
    statement::RawStatement,
    types::{PeriodType, StatementType, Symbol},
};

/// Base trait for all data providers.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for raw financial statements.
#[async_trait]
pub trait StatementProvider: DataProvider {
    /// Fetches one statement type for a symbol.
    ///
    /// Returns [`InsightError::DataUnavailable`] or
    /// [`InsightError::SymbolNotFound`] when the provider has no data; a
    /// returned statement always holds at least one period.
    async fn fetch_statement(
        &self,
        symbol: &Symbol,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<RawStatement>;

    /// Fetches a statement, mapping "no data" to `Ok(None)`.
    ///
    /// Other failures (network, rate limiting, parsing) are still returned as errors.
    async fn fetch_statement_opt(
        &self,
        symbol: &Symbol,
        statement_type: StatementType,
        period_type: PeriodType,
    ) -> Result<Option<RawStatement>> {
        match self.fetch_statement(symbol, statement_type, period_type).await {
            Ok(statement) if statement.is_empty() => Ok(None),
            Ok(statement) => Ok(Some(statement)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Provider for reference data.
#[async_trait]
pub trait ReferenceDataProvider: DataProvider {
    /// Fetches the company overview for a symbol.
    async fn company_overview(&self, symbol: &Symbol) -> Result<CompanyOverview>;

    /// Searches symbols by company name or ticker fragment.
    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>>;

    /// Checks if a symbol is known to this provider.
    async fn supports_symbol(&self, symbol: &Symbol) -> Result<bool> {
        match self.company_overview(symbol).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Provider for news with sentiment scores.
#[async_trait]
pub trait NewsProvider: DataProvider {
    /// Fetches up to `limit` recent articles about a symbol.
    async fn top_news(&self, symbol: &Symbol, limit: usize) -> Result<NewsDigest>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::LineItems;
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct FixedProvider {
        outcome: fn(&Symbol) -> Result<RawStatement>,
    }

    impl DataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn description(&self) -> &str {
            "returns a fixed outcome"
        }
    }

    #[async_trait]
    impl StatementProvider for FixedProvider {
        async fn fetch_statement(
            &self,
            symbol: &Symbol,
            _statement_type: StatementType,
            _period_type: PeriodType,
        ) -> Result<RawStatement> {
            (self.outcome)(symbol)
        }
    }

    fn one_period(symbol: &Symbol) -> Result<RawStatement> {
        Ok(RawStatement::new(
            symbol.clone(),
            StatementType::IncomeStatement,
            PeriodType::Annual,
        )
        .with_period(
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            LineItems::new().with("totalRevenue", 1.0),
        ))
    }

    fn not_found(symbol: &Symbol) -> Result<RawStatement> {
        Err(InsightError::SymbolNotFound(symbol.to_string()))
    }

    fn network(_: &Symbol) -> Result<RawStatement> {
        Err(InsightError::Network("connection reset".to_string()))
    }

    #[tokio::test]
    async fn test_fetch_statement_opt_maps_not_found() {
        let symbol = Symbol::new("AAPL");
        let t = StatementType::IncomeStatement;

        let found = FixedProvider { outcome: one_period };
        assert!(found.fetch_statement_opt(&symbol, t, PeriodType::Annual).await.unwrap().is_some());

        let missing = FixedProvider { outcome: not_found };
        assert!(missing.fetch_statement_opt(&symbol, t, PeriodType::Annual).await.unwrap().is_none());

        let broken = FixedProvider { outcome: network };
        assert!(broken.fetch_statement_opt(&symbol, t, PeriodType::Annual).await.is_err());
    }
}
