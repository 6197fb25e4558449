//! Configuration for the insight pipeline.

use std::fmt;

use finsight_core::{InsightError, PeriodType, Result};

/// Environment variable holding the Alpha Vantage API key.
pub const ALPHA_VANTAGE_API_KEY: &str = "ALPHA_VANTAGE_API_KEY";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the OpenAI model.
pub const FINSIGHT_OPENAI_MODEL: &str = "FINSIGHT_OPENAI_MODEL";
/// Environment variable selecting annual or quarterly statements.
pub const FINSIGHT_PERIOD: &str = "FINSIGHT_PERIOD";
/// Environment variable with the number of news articles to fetch.
pub const FINSIGHT_NEWS_LIMIT: &str = "FINSIGHT_NEWS_LIMIT";
/// Environment variable with the number of concurrent narrative calls.
pub const FINSIGHT_NARRATIVE_CONCURRENCY: &str = "FINSIGHT_NARRATIVE_CONCURRENCY";

/// Default number of news articles.
pub const DEFAULT_NEWS_LIMIT: usize = 10;

/// Pipeline configuration.
///
/// Credentials are optional here; building a pipeline from a configuration
/// without them fails with [`InsightError::ProviderNotConfigured`].
#[derive(Clone, PartialEq, Eq)]
pub struct FinsightConfig {
    alpha_vantage_api_key: Option<String>,
    openai_api_key: Option<String>,
    /// Chat model override; the narrator's default when `None`.
    pub openai_model: Option<String>,
    /// Statement periodicity.
    pub period_type: PeriodType,
    /// Number of news articles to fetch (0 disables news).
    pub news_limit: usize,
    /// Number of narrative calls in flight at once.
    pub narrative_concurrency: usize,
}

impl fmt::Debug for FinsightConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("FinsightConfig")
            .field("alpha_vantage_api_key", &redacted(&self.alpha_vantage_api_key))
            .field("openai_api_key", &redacted(&self.openai_api_key))
            .field("openai_model", &self.openai_model)
            .field("period_type", &self.period_type)
            .field("news_limit", &self.news_limit)
            .field("narrative_concurrency", &self.narrative_concurrency)
            .finish()
    }
}

impl Default for FinsightConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            openai_api_key: None,
            openai_model: None,
            period_type: PeriodType::Annual,
            news_limit: DEFAULT_NEWS_LIMIT,
            narrative_concurrency: 1,
        }
    }
}

impl FinsightConfig {
    /// Create a configuration with defaults and no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the environment, reading a `.env` file first if present.
    ///
    /// Returns [`InsightError::InvalidParameter`] for malformed values.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self {
            alpha_vantage_api_key: var(ALPHA_VANTAGE_API_KEY),
            openai_api_key: var(OPENAI_API_KEY),
            openai_model: var(FINSIGHT_OPENAI_MODEL),
            ..Self::default()
        };

        if let Some(period) = var(FINSIGHT_PERIOD) {
            config.period_type = period.parse().map_err(|e| match e {
                InsightError::InvalidParameter(message) => {
                    InsightError::InvalidParameter(format!("{FINSIGHT_PERIOD}: {message}"))
                }
                other => other,
            })?;
        }
        if let Some(limit) = var(FINSIGHT_NEWS_LIMIT) {
            config.news_limit = parse_count(FINSIGHT_NEWS_LIMIT, &limit)?;
        }
        if let Some(concurrency) = var(FINSIGHT_NARRATIVE_CONCURRENCY) {
            config.narrative_concurrency = parse_count(FINSIGHT_NARRATIVE_CONCURRENCY, &concurrency)?.max(1);
        }
        Ok(config)
    }

    /// Set the Alpha Vantage API key.
    #[must_use]
    pub fn with_alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI API key.
    #[must_use]
    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI model.
    #[must_use]
    pub fn with_openai_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = Some(model.into());
        self
    }

    /// Set the statement periodicity.
    #[must_use]
    pub fn with_period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = period_type;
        self
    }

    /// Set the number of news articles.
    #[must_use]
    pub fn with_news_limit(mut self, news_limit: usize) -> Self {
        self.news_limit = news_limit;
        self
    }

    /// Set the number of concurrent narrative calls (minimum 1).
    #[must_use]
    pub fn with_narrative_concurrency(mut self, concurrency: usize) -> Self {
        self.narrative_concurrency = concurrency.max(1);
        self
    }

    /// Returns the Alpha Vantage API key.
    pub fn alpha_vantage_api_key(&self) -> Result<&str> {
        self.alpha_vantage_api_key.as_deref().ok_or_else(|| {
            InsightError::ProviderNotConfigured(format!("{ALPHA_VANTAGE_API_KEY} is not set"))
        })
    }

    /// Returns the OpenAI API key.
    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| InsightError::ProviderNotConfigured(format!("{OPENAI_API_KEY} is not set")))
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| InsightError::InvalidParameter(format!("{name}: expected a non-negative integer, got {value:?}")))
}
