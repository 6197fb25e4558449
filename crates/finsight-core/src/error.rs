//! Error types for fetching and composing insights.
//!
//! This module defines [`InsightError`] which covers the failures that can occur
//! when fetching statements, reference data or news, and when calling the
//! narrative-generation service.
//!
//! Faults that only affect a single metric or a single insight category are
//! not errors: an undefined metric is a `None` value in its
//! [`MetricSet`](crate::MetricSet), and a missing narrative is recorded as an
//! [`UnavailableInsight`](crate::UnavailableInsight).

use thiserror::Error;

use crate::types::{StatementType, Symbol};

/// Errors that can occur during data and narrative operations.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: {message}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Message returned by the provider.
        message: String,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider returned no data for the symbol and statement type.
    #[error("No {statement} data available for {symbol}")]
    DataUnavailable {
        /// The symbol that was requested.
        symbol: Symbol,
        /// What was requested (a statement type or "company overview").
        statement: String,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Authentication failed for a provider.
    #[error("Authentication failed for provider {0}")]
    AuthenticationFailed(String),

    /// The narrative-generation service failed.
    #[error("Narrative service error: {0}")]
    Narrative(String),

    /// The narrative-generation service returned no text.
    #[error("Narrative service returned empty text")]
    EmptyNarrative,

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl InsightError {
    /// Creates a [`InsightError::DataUnavailable`] for a statement type.
    #[must_use]
    pub fn statement_unavailable(symbol: &Symbol, statement_type: StatementType) -> Self {
        Self::DataUnavailable {
            symbol: symbol.clone(),
            statement: statement_type.title().to_string(),
        }
    }

    /// Returns true when the error means the provider has nothing for the request.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_) | Self::DataUnavailable { .. })
    }
}

/// Result type alias using [`InsightError`].
pub type Result<T> = std::result::Result<T, InsightError>;
