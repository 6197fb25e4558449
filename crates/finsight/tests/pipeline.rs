//! End-to-end tests of the insight pipeline against in-memory providers.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use approx::assert_relative_eq;
use async_trait::async_trait;
use chrono::NaiveDate;
use finsight::{
    CompanyOverview, DataProvider, InsightCategory, InsightError, InsightPipeline,
    InsightSelection, LineItems, Metric, NarrativeRequest, NarrativeService, NewsArticle,
    NewsDigest, NewsProvider, PeriodType, RawStatement, ReferenceDataProvider, Result,
    StatementProvider, StatementType, Symbol, SymbolMatch,
};

fn date(y: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, 12, 31).unwrap()
}

fn statement(statement_type: StatementType, latest: LineItems) -> RawStatement {
    RawStatement::new(Symbol::new("MSFT"), statement_type, PeriodType::Annual)
        .with_period(date(2022), LineItems::new().with("totalRevenue", 800.0))
        .with_period(date(2023), latest)
}

fn income() -> RawStatement {
    statement(
        StatementType::IncomeStatement,
        LineItems::new()
            .with("totalRevenue", 1000.0)
            .with("grossProfit", 600.0)
            .with("operatingIncome", 300.0)
            .with("netIncome", 200.0)
            .with("interestExpense", 30.0),
    )
}

fn balance() -> RawStatement {
    statement(
        StatementType::BalanceSheet,
        LineItems::new()
            .with("totalAssets", 2000.0)
            .with("totalCurrentAssets", 800.0)
            .with("totalCurrentLiabilities", 400.0)
            .with("inventory", 100.0)
            .with("totalLiabilities", 1200.0)
            .with("totalShareholderEquity", 800.0),
    )
}

fn cash_flow() -> RawStatement {
    statement(
        StatementType::CashFlow,
        LineItems::new()
            .with("operatingCashflow", 400.0)
            .with("capitalExpenditures", 100.0)
            .with("dividendPayout", 50.0)
            .with("cashflowFromInvestment", -150.0)
            .with("cashflowFromFinancing", -90.0),
    )
}

/// In-memory provider that counts statement fetches.
#[derive(Debug, Default)]
struct FakeProvider {
    overview: Option<CompanyOverview>,
    statements: HashMap<StatementType, RawStatement>,
    news_fails: bool,
    fail_statements: bool,
    fail_search: bool,
    matches: Vec<SymbolMatch>,
    latency: Option<Duration>,
    fetches: Mutex<HashMap<StatementType, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeProvider {
    fn complete() -> Self {
        Self {
            overview: Some(CompanyOverview::new(Symbol::new("MSFT"), "Microsoft Corporation")),
            statements: [income(), balance(), cash_flow()]
                .into_iter()
                .map(|s| (s.statement_type, s))
                .collect(),
            ..Default::default()
        }
    }

    fn fetch_count(&self, statement_type: StatementType) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&statement_type)
            .copied()
            .unwrap_or(0)
    }
}

impl DataProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn description(&self) -> &str {
        "in-memory test provider"
    }
}

#[async_trait]
impl StatementProvider for FakeProvider {
    async fn fetch_statement(
        &self,
        symbol: &Symbol,
        statement_type: StatementType,
        _period_type: PeriodType,
    ) -> Result<RawStatement> {
        *self.fetches.lock().unwrap().entry(statement_type).or_default() += 1;
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_statements {
            return Err(InsightError::Network("connection reset".to_string()));
        }
        self.statements
            .get(&statement_type)
            .cloned()
            .ok_or_else(|| InsightError::statement_unavailable(symbol, statement_type))
    }
}

#[async_trait]
impl ReferenceDataProvider for FakeProvider {
    async fn company_overview(&self, symbol: &Symbol) -> Result<CompanyOverview> {
        self.overview
            .clone()
            .ok_or_else(|| InsightError::SymbolNotFound(symbol.to_string()))
    }

    async fn search_symbols(&self, keywords: &str) -> Result<Vec<SymbolMatch>> {
        if self.fail_search {
            return Err(InsightError::Network("connection reset".to_string()));
        }
        let keywords = keywords.to_lowercase();
        Ok(self
            .matches
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&keywords))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NewsProvider for FakeProvider {
    async fn top_news(&self, _symbol: &Symbol, limit: usize) -> Result<NewsDigest> {
        if self.news_fails {
            return Err(InsightError::RateLimited {
                provider: "fake".to_string(),
                message: "slow down".to_string(),
            });
        }
        let articles = [0.4, -0.2]
            .into_iter()
            .take(limit)
            .map(|score| NewsArticle {
                title: "Headline".to_string(),
                url: "https://example.com".to_string(),
                authors: Vec::new(),
                topics: Vec::new(),
                sentiment_score: Some(score),
                sentiment_label: None,
            })
            .collect();
        Ok(NewsDigest::from_articles(articles))
    }
}

/// Narrator echoing the category title, failing for chosen categories.
#[derive(Debug, Default)]
struct FakeNarrator {
    failing: HashSet<InsightCategory>,
    requests: Mutex<Vec<NarrativeRequest>>,
}

#[async_trait]
impl NarrativeService for FakeNarrator {
    fn name(&self) -> &str {
        "fake-narrator"
    }

    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing.contains(&request.category) {
            return Err(InsightError::Narrative("model overloaded".to_string()));
        }
        Ok(format!("{} analysis for {}", request.category.title(), request.symbol))
    }
}

fn pipeline(provider: Arc<FakeProvider>, narrator: Arc<FakeNarrator>) -> InsightPipeline {
    InsightPipeline::new()
        .with_statement_provider(provider.clone())
        .with_reference_provider(provider.clone())
        .with_news_provider(provider)
        .with_narrator(narrator)
}

#[tokio::test]
async fn test_complete_report() {
    let provider = Arc::new(FakeProvider::complete());
    let narrator = Arc::new(FakeNarrator::default());
    let report = pipeline(provider.clone(), narrator.clone())
        .generate(&Symbol::new("msft"), &InsightSelection::all())
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.overview.name, "Microsoft Corporation");

    let income = report.bundle(StatementType::IncomeStatement).unwrap();
    assert_eq!(income.insights.len(), 5);
    assert_relative_eq!(income.metrics.get(Metric::GrossProfitMargin).unwrap(), 0.6);
    assert_relative_eq!(income.metrics.get(Metric::InterestCoverageRatio).unwrap(), 10.0);
    assert_eq!(
        income.text("revenue_health"),
        Some("Revenue Health analysis for MSFT")
    );

    let balance = report.bundle(StatementType::BalanceSheet).unwrap();
    assert_relative_eq!(balance.metrics.get(Metric::CurrentRatio).unwrap(), 2.0);
    assert_relative_eq!(balance.metrics.get(Metric::QuickRatio).unwrap(), 1.75);
    // revenue comes from the income statement
    assert_relative_eq!(balance.metrics.get(Metric::AssetTurnover).unwrap(), 0.5);
    assert_eq!(balance.charts.len(), 3);

    let cash = report.bundle(StatementType::CashFlow).unwrap();
    assert_relative_eq!(cash.metrics.get(Metric::FreeCashFlow).unwrap(), 300.0);
    assert_relative_eq!(cash.metrics.get(Metric::DividendCoverageRatio).unwrap(), 8.0);
    assert_relative_eq!(cash.metrics.get(Metric::OperatingCashFlowMargin).unwrap(), 0.4);
    assert_relative_eq!(cash.metrics.get(Metric::CashFlowToDebtRatio).unwrap(), 400.0 / 1200.0);

    let news = report.news.as_ref().unwrap();
    assert_eq!(news.articles.len(), 2);
    assert_relative_eq!(news.mean_sentiment_score.unwrap(), 0.1);

    // every statement fetched exactly once even though two are also supporting
    for statement_type in StatementType::ALL {
        assert_eq!(provider.fetch_count(statement_type), 1);
    }
    assert_eq!(narrator.requests.lock().unwrap().len(), 15);
}

#[tokio::test]
async fn test_statement_without_enabled_categories_is_skipped() {
    let provider = Arc::new(FakeProvider::complete());
    let narrator = Arc::new(FakeNarrator::default());
    let selection = InsightSelection::none()
        .enable(InsightCategory::RevenueHealth)
        .enable(InsightCategory::ProfitRetention);

    let report = pipeline(provider.clone(), narrator.clone())
        .generate(&Symbol::new("MSFT"), &selection)
        .await
        .unwrap();

    let income = report.income_statement.as_ref().unwrap();
    assert_eq!(income.insights.len(), 2);
    assert!(income.insight(InsightCategory::DebtManagement).is_none());
    assert!(report.balance_sheet.is_none());
    assert!(report.cash_flow.is_none());
    assert!(!report.is_complete());

    assert_eq!(provider.fetch_count(StatementType::IncomeStatement), 1);
    assert_eq!(provider.fetch_count(StatementType::BalanceSheet), 0);
    assert_eq!(provider.fetch_count(StatementType::CashFlow), 0);
    assert_eq!(narrator.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cash_flow_pulls_supporting_statements() {
    let provider = Arc::new(FakeProvider::complete());
    let selection = InsightSelection::none().enable(InsightCategory::DebtServiceCapability);

    let report = pipeline(provider.clone(), Arc::new(FakeNarrator::default()))
        .generate(&Symbol::new("MSFT"), &selection)
        .await
        .unwrap();

    assert!(report.income_statement.is_none());
    assert!(report.balance_sheet.is_none());
    let cash = report.cash_flow.as_ref().unwrap();
    assert_relative_eq!(cash.metrics.get(Metric::CashFlowToDebtRatio).unwrap(), 400.0 / 1200.0);
    assert_eq!(provider.fetch_count(StatementType::IncomeStatement), 1);
    assert_eq!(provider.fetch_count(StatementType::BalanceSheet), 1);
}

#[tokio::test]
async fn test_missing_overview_fails_the_action() {
    let provider = Arc::new(FakeProvider {
        overview: None,
        ..FakeProvider::complete()
    });

    let err = pipeline(provider, Arc::new(FakeNarrator::default()))
        .generate(&Symbol::new("NOPE"), &InsightSelection::all())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightError::DataUnavailable { .. }));
    assert_eq!(err.to_string(), "No company overview data available for NOPE");
}

#[tokio::test]
async fn test_missing_statement_degrades() {
    let mut provider = FakeProvider::complete();
    provider.statements.remove(&StatementType::CashFlow);

    let report = pipeline(Arc::new(provider), Arc::new(FakeNarrator::default()))
        .generate(&Symbol::new("MSFT"), &InsightSelection::all())
        .await
        .unwrap();

    assert!(report.income_statement.is_some());
    assert!(report.balance_sheet.is_some());
    assert!(report.cash_flow.is_none());
    assert!(!report.is_complete());
}

#[tokio::test]
async fn test_failing_statement_provider_falls_back() {
    let broken = Arc::new(FakeProvider {
        fail_statements: true,
        ..FakeProvider::complete()
    });
    let healthy = Arc::new(FakeProvider::complete());
    let selection = InsightSelection::none().enable(InsightCategory::RevenueHealth);

    let report = InsightPipeline::new()
        .with_statement_provider(broken.clone())
        .with_statement_provider(healthy.clone())
        .with_reference_provider(healthy.clone())
        .with_narrator(Arc::new(FakeNarrator::default()))
        .generate(&Symbol::new("MSFT"), &selection)
        .await
        .unwrap();

    assert!(report.income_statement.is_some());
    assert_eq!(broken.fetch_count(StatementType::IncomeStatement), 1);
    assert_eq!(healthy.fetch_count(StatementType::IncomeStatement), 1);
    // no news provider registered
    assert!(report.news.is_none());
}

#[tokio::test]
async fn test_narrative_failure_is_isolated() {
    let narrator = Arc::new(FakeNarrator {
        failing: [InsightCategory::LiquidityPosition].into_iter().collect(),
        ..Default::default()
    });

    let report = pipeline(Arc::new(FakeProvider::complete()), narrator)
        .generate(&Symbol::new("MSFT"), &InsightSelection::all())
        .await
        .unwrap();

    let balance = report.balance_sheet.as_ref().unwrap();
    assert_eq!(balance.insights.len(), 4);
    assert!(balance.text("liquidity_position").is_none());
    assert!(
        balance
            .unavailable_reason(InsightCategory::LiquidityPosition)
            .unwrap()
            .contains("model overloaded")
    );
    // the chart is still attached
    assert!(balance.chart("asset_composition").is_some());
    assert_eq!(report.income_statement.as_ref().unwrap().insights.len(), 5);
}

#[tokio::test]
async fn test_news_failure_degrades() {
    let provider = Arc::new(FakeProvider {
        news_fails: true,
        ..FakeProvider::complete()
    });

    let report = pipeline(provider, Arc::new(FakeNarrator::default()))
        .generate(&Symbol::new("MSFT"), &InsightSelection::all())
        .await
        .unwrap();

    assert!(report.news.is_none());
    assert_eq!(report.bundles().count(), 3);
}

#[tokio::test]
async fn test_news_limit_zero_skips_news() {
    let report = pipeline(Arc::new(FakeProvider::complete()), Arc::new(FakeNarrator::default()))
        .with_news_limit(0)
        .generate(&Symbol::new("MSFT"), &InsightSelection::none())
        .await
        .unwrap();

    assert!(report.news.is_none());
    assert_eq!(report.bundles().count(), 0);
}

#[tokio::test]
async fn test_missing_narrator_is_not_configured() {
    let provider = Arc::new(FakeProvider::complete());
    let err = InsightPipeline::new()
        .with_statement_provider(provider.clone())
        .with_reference_provider(provider)
        .generate(&Symbol::new("MSFT"), &InsightSelection::all())
        .await
        .unwrap_err();

    assert!(matches!(err, InsightError::ProviderNotConfigured(_)));
}

#[tokio::test]
async fn test_report_serializes() {
    let report = pipeline(Arc::new(FakeProvider::complete()), Arc::new(FakeNarrator::default()))
        .generate(&Symbol::new("MSFT"), &InsightSelection::all())
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["overview"]["name"], "Microsoft Corporation");
    assert!(json["income_statement"]["insights"].is_array());
}

#[tokio::test]
async fn test_statements_are_fetched_one_at_a_time() {
    let provider = Arc::new(FakeProvider {
        latency: Some(Duration::from_millis(20)),
        ..FakeProvider::complete()
    });

    let report = pipeline(provider.clone(), Arc::new(FakeNarrator::default()))
        .generate(&Symbol::new("MSFT"), &InsightSelection::all())
        .await
        .unwrap();

    assert_eq!(report.bundles().count(), 3);
    assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 1);
}

fn symbol_match(symbol: &str, name: &str) -> SymbolMatch {
    SymbolMatch {
        symbol: Symbol::new(symbol),
        name: name.to_string(),
        region: "United States".to_string(),
        currency: "USD".to_string(),
        match_score: 1.0,
    }
}

#[tokio::test]
async fn test_search_symbols_falls_back() {
    let broken = Arc::new(FakeProvider {
        fail_search: true,
        ..Default::default()
    });
    let listed = Arc::new(FakeProvider {
        matches: vec![
            symbol_match("MSFT", "Microsoft Corporation"),
            symbol_match("AAPL", "Apple Inc"),
        ],
        ..Default::default()
    });

    let matches = InsightPipeline::new()
        .with_reference_provider(broken.clone())
        .with_reference_provider(listed)
        .search_symbols("Micro")
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].symbol, Symbol::new("MSFT"));

    let err = InsightPipeline::new()
        .with_reference_provider(broken)
        .search_symbols("Micro")
        .await
        .unwrap_err();
    assert!(matches!(err, InsightError::Network(_)));
}

#[tokio::test]
async fn test_search_symbols_without_providers() {
    let err = InsightPipeline::new().search_symbols("micro").await.unwrap_err();
    assert!(matches!(err, InsightError::ProviderNotConfigured(_)));
}

#[tokio::test]
async fn test_supports_symbol() {
    let provider = FakeProvider::complete();
    assert!(provider.supports_symbol(&Symbol::new("MSFT")).await.unwrap());

    let unknown = FakeProvider::default();
    assert!(!unknown.supports_symbol(&Symbol::new("NOPE")).await.unwrap());
}
