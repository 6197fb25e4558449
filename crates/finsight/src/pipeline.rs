//! The "generate insights" action: providers, narrative service and analysis wired together.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use finsight_analysis::{InsightComposer, RatioEngine};
use finsight_core::{
    CompanyOverview, InsightBundle, InsightError, InsightSelection, NarrativeService, NewsDigest,
    NewsProvider, PeriodType, RawStatement, ReferenceDataProvider, Result, StatementProvider,
    StatementType, Symbol, SymbolMatch,
};

/// Statements whose line items feed another statement's ratios.
///
/// Asset turnover needs revenue; the cash-flow margin and debt ratios need
/// revenue and total liabilities.
const fn supporting_statements(statement_type: StatementType) -> &'static [StatementType] {
    match statement_type {
        StatementType::IncomeStatement => &[],
        StatementType::BalanceSheet => &[StatementType::IncomeStatement],
        StatementType::CashFlow => &[StatementType::IncomeStatement, StatementType::BalanceSheet],
    }
}

/// Everything generated for one ticker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Company overview.
    pub overview: CompanyOverview,
    /// Income statement insights, if enabled and available.
    pub income_statement: Option<InsightBundle>,
    /// Balance sheet insights, if enabled and available.
    pub balance_sheet: Option<InsightBundle>,
    /// Cash flow insights, if enabled and available.
    pub cash_flow: Option<InsightBundle>,
    /// Recent news with sentiment, if available.
    pub news: Option<NewsDigest>,
}

impl Report {
    /// Creates a report holding only the overview.
    #[must_use]
    pub const fn new(overview: CompanyOverview) -> Self {
        Self {
            overview,
            income_statement: None,
            balance_sheet: None,
            cash_flow: None,
            news: None,
        }
    }

    /// Returns the bundle of a statement type.
    #[must_use]
    pub const fn bundle(&self, statement_type: StatementType) -> Option<&InsightBundle> {
        match statement_type {
            StatementType::IncomeStatement => self.income_statement.as_ref(),
            StatementType::BalanceSheet => self.balance_sheet.as_ref(),
            StatementType::CashFlow => self.cash_flow.as_ref(),
        }
    }

    fn bundle_mut(&mut self, statement_type: StatementType) -> &mut Option<InsightBundle> {
        match statement_type {
            StatementType::IncomeStatement => &mut self.income_statement,
            StatementType::BalanceSheet => &mut self.balance_sheet,
            StatementType::CashFlow => &mut self.cash_flow,
        }
    }

    /// Returns the bundles present, in statement order.
    pub fn bundles(&self) -> impl Iterator<Item = &InsightBundle> {
        StatementType::ALL.into_iter().filter_map(|t| self.bundle(t))
    }

    /// Returns true when every statement bundle and the news are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        StatementType::ALL.into_iter().all(|t| self.bundle(t).is_some()) && self.news.is_some()
    }
}

/// Pipeline that generates a [`Report`] for a ticker.
///
/// Each provider role may hold several providers; they are tried in
/// registration order until one succeeds.
#[derive(Default)]
pub struct InsightPipeline {
    statement_providers: Vec<Arc<dyn StatementProvider>>,
    reference_providers: Vec<Arc<dyn ReferenceDataProvider>>,
    news_providers: Vec<Arc<dyn NewsProvider>>,
    narrator: Option<Arc<dyn NarrativeService>>,
    engine: RatioEngine,
    composer: InsightComposer,
    period_type: PeriodType,
    news_limit: usize,
}

impl std::fmt::Debug for InsightPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightPipeline")
            .field(
                "statement_providers",
                &self.statement_providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "reference_providers",
                &self.reference_providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "news_providers",
                &self.news_providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("narrator", &self.narrator.as_ref().map(|n| n.name()))
            .field("period_type", &self.period_type)
            .field("news_limit", &self.news_limit)
            .finish()
    }
}

impl InsightPipeline {
    /// Create an empty pipeline (annual statements, 10 news articles).
    #[must_use]
    pub fn new() -> Self {
        Self {
            news_limit: crate::config::DEFAULT_NEWS_LIMIT,
            ..Self::default()
        }
    }

    /// Build a pipeline backed by Alpha Vantage and OpenAI.
    #[cfg(all(feature = "alphavantage", feature = "openai"))]
    pub fn from_config(config: &crate::FinsightConfig) -> Result<Self> {
        let alpha_vantage = Arc::new(finsight_alphavantage::AlphaVantageProvider::new(
            config.alpha_vantage_api_key()?,
        ));

        let mut narrator = finsight_openai::OpenAiNarrator::new(config.openai_api_key()?);
        if let Some(model) = &config.openai_model {
            narrator = narrator.with_model(model);
        }

        Ok(Self::new()
            .with_statement_provider(alpha_vantage.clone())
            .with_reference_provider(alpha_vantage.clone())
            .with_news_provider(alpha_vantage)
            .with_narrator(Arc::new(narrator))
            .with_period_type(config.period_type)
            .with_news_limit(config.news_limit)
            .with_narrative_concurrency(config.narrative_concurrency))
    }

    /// Register a statement provider.
    #[must_use]
    pub fn with_statement_provider(mut self, provider: Arc<dyn StatementProvider>) -> Self {
        debug!(provider = provider.name(), "Registering statement provider");
        self.statement_providers.push(provider);
        self
    }

    /// Register a reference data provider.
    #[must_use]
    pub fn with_reference_provider(mut self, provider: Arc<dyn ReferenceDataProvider>) -> Self {
        debug!(provider = provider.name(), "Registering reference provider");
        self.reference_providers.push(provider);
        self
    }

    /// Register a news provider.
    #[must_use]
    pub fn with_news_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        debug!(provider = provider.name(), "Registering news provider");
        self.news_providers.push(provider);
        self
    }

    /// Set the narrative service.
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn NarrativeService>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    /// Set the ratio engine.
    #[must_use]
    pub fn with_engine(mut self, engine: RatioEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Set the statement periodicity.
    #[must_use]
    pub fn with_period_type(mut self, period_type: PeriodType) -> Self {
        self.period_type = period_type;
        self
    }

    /// Set the number of news articles (0 disables news).
    #[must_use]
    pub fn with_news_limit(mut self, news_limit: usize) -> Self {
        self.news_limit = news_limit;
        self
    }

    /// Set how many narrative calls may run at once.
    #[must_use]
    pub fn with_narrative_concurrency(mut self, concurrency: usize) -> Self {
        self.composer = self.composer.with_concurrency(concurrency);
        self
    }

    /// Fetch the company overview, trying reference providers in order.
    pub async fn company_overview(&self, symbol: &Symbol) -> Result<CompanyOverview> {
        if self.reference_providers.is_empty() {
            return Err(InsightError::ProviderNotConfigured(
                "No reference providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.reference_providers {
            debug!(provider = provider.name(), symbol = %symbol, "Fetching company overview");
            match provider.company_overview(symbol).await {
                Ok(overview) => return Ok(overview),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) if e.is_not_found() => InsightError::DataUnavailable {
                symbol: symbol.clone(),
                statement: "company overview".to_string(),
            },
            Some(e) => e,
            None => InsightError::Other("All providers failed with no error".to_string()),
        })
    }

    /// Search symbols, trying reference providers in order.
    pub async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>> {
        if self.reference_providers.is_empty() {
            return Err(InsightError::ProviderNotConfigured(
                "No reference providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.reference_providers {
            match provider.search_symbols(keywords).await {
                Ok(matches) => return Ok(matches),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| InsightError::Other("All providers failed with no error".to_string())))
    }

    /// Fetch one statement, trying providers in order.
    ///
    /// Returns `Ok(None)` when no provider has data for it.
    pub async fn fetch_statement(
        &self,
        symbol: &Symbol,
        statement_type: StatementType,
    ) -> Result<Option<RawStatement>> {
        if self.statement_providers.is_empty() {
            return Err(InsightError::ProviderNotConfigured(
                "No statement providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.statement_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                statement = %statement_type,
                "Fetching statement"
            );
            match provider.fetch_statement_opt(symbol, statement_type, self.period_type).await {
                Ok(Some(statement)) => return Ok(Some(statement)),
                Ok(None) => {
                    debug!(provider = provider.name(), statement = %statement_type, "No data, trying next");
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        last_error.map_or(Ok(None), Err)
    }

    /// Fetch news, trying providers in order.
    pub async fn top_news(&self, symbol: &Symbol) -> Result<NewsDigest> {
        if self.news_providers.is_empty() {
            return Err(InsightError::ProviderNotConfigured(
                "No news providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.news_providers {
            match provider.top_news(symbol, self.news_limit).await {
                Ok(digest) => return Ok(digest),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| InsightError::Other("All providers failed with no error".to_string())))
    }

    /// Generate the report for `symbol`.
    ///
    /// Only statements with at least one enabled category are analysed, and
    /// every statement is fetched at most once. The overview is the only
    /// required part: statement, narrative and news failures leave their
    /// part of the report empty.
    pub async fn generate(&self, symbol: &Symbol, selection: &InsightSelection) -> Result<Report> {
        if symbol.is_empty() {
            return Err(InsightError::InvalidParameter("symbol must not be empty".to_string()));
        }
        let narrator = self.narrator.as_deref();
        if narrator.is_none() && !selection.is_empty() {
            return Err(InsightError::ProviderNotConfigured(
                "No narrative service registered".to_string(),
            ));
        }

        info!(symbol = %symbol, categories = selection.len(), "Generating insights");
        let overview = self.company_overview(symbol).await?;
        let mut report = Report::new(overview);

        let analysed: Vec<StatementType> = StatementType::ALL
            .into_iter()
            .filter(|t| selection.any_for(*t))
            .collect();

        let mut needed: Vec<StatementType> = Vec::new();
        for statement_type in &analysed {
            for t in supporting_statements(*statement_type).iter().chain([statement_type]) {
                if !needed.contains(t) {
                    needed.push(*t);
                }
            }
        }

        // One upstream request at a time.
        let mut statements: BTreeMap<StatementType, RawStatement> = BTreeMap::new();
        for statement_type in &needed {
            match self.fetch_statement(symbol, *statement_type).await {
                Ok(Some(statement)) => {
                    statements.insert(*statement_type, statement);
                }
                Ok(None) => warn!(
                    symbol = %symbol,
                    statement = %statement_type,
                    "{}",
                    InsightError::statement_unavailable(symbol, *statement_type)
                ),
                Err(e) => warn!(symbol = %symbol, statement = %statement_type, error = %e, "Statement fetch failed"),
            }
        }

        if let Some(narrator) = narrator {
            for statement_type in analysed {
                let Some(statement) = statements.get(&statement_type) else {
                    continue;
                };
                let supporting: Vec<&RawStatement> = supporting_statements(statement_type)
                    .iter()
                    .filter_map(|t| statements.get(t))
                    .collect();

                let metrics = self.engine.compute(statement_type, Some(statement), &supporting);
                let bundle = self.composer.compose(statement, metrics, selection, narrator).await;
                *report.bundle_mut(statement_type) = Some(bundle);
            }
        }

        if self.news_limit > 0 && !self.news_providers.is_empty() {
            match self.top_news(symbol).await {
                Ok(digest) => report.news = Some(digest),
                Err(e) => warn!(symbol = %symbol, error = %e, "News unavailable"),
            }
        }

        info!(
            symbol = %symbol,
            bundles = report.bundles().count(),
            complete = report.is_complete(),
            "Insights generated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supporting_statements() {
        assert!(supporting_statements(StatementType::IncomeStatement).is_empty());
        assert_eq!(
            supporting_statements(StatementType::CashFlow),
            &[StatementType::IncomeStatement, StatementType::BalanceSheet]
        );
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new(CompanyOverview::new(Symbol::new("IBM"), "IBM"));
        assert!(!report.is_complete());
        assert_eq!(report.bundles().count(), 0);
        assert!(report.bundle(StatementType::BalanceSheet).is_none());
    }

    #[test]
    fn test_debug_lists_providers() {
        let pipeline = InsightPipeline::new().with_news_limit(3);
        let debug_str = format!("{pipeline:?}");
        assert!(debug_str.contains("news_limit: 3"));
        assert!(debug_str.contains("narrator: None"));
    }
}
