//! Alpha Vantage response payloads and their conversion into core types.
//!
//! Alpha Vantage reports every figure as a string and uses `"None"` for
//! unreported values. Statement reports arrive latest-first.

use chrono::NaiveDate;
use finsight_core::{
    CompanyOverview, InsightError, LineItems, NewsArticle, NewsDigest, PeriodType, RawStatement,
    Result, StatementType, Symbol, SymbolMatch,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::PROVIDER_NAME;

/// Report fields that are not line items.
const NON_LINE_ITEM_FIELDS: &[&str] = &["fiscalDateEnding", "reportedCurrency"];

/// Parses a reported amount. `"None"`, blank and unparsable values are `None`.
pub(crate) fn parse_amount(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.trim() {
            "" | "None" | "-" => None,
            s => s.parse::<f64>().ok(),
        },
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Returns a text field, treating `"None"` and blanks as absent.
fn text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "None")
}

/// Maps throttling notices to [`InsightError::RateLimited`].
///
/// Alpha Vantage answers over-quota calls with HTTP 200 and a `Note` or
/// `Information` message instead of data.
pub(crate) fn check_throttled(body: &Value) -> Result<()> {
    for key in ["Note", "Information"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return Err(InsightError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                message: message.to_string(),
            });
        }
    }
    Ok(())
}

/// Returns the `Error Message` of a rejected call.
pub(crate) fn error_message(body: &Value) -> Option<&str> {
    body.get("Error Message").and_then(Value::as_str)
}

/// Returns true for `{}` and other payloads without content.
fn is_blank(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Converts an `INCOME_STATEMENT`, `BALANCE_SHEET` or `CASH_FLOW` payload.
pub(crate) fn parse_statement(
    symbol: &Symbol,
    statement_type: StatementType,
    period_type: PeriodType,
    body: &Value,
) -> Result<RawStatement> {
    if error_message(body).is_some() {
        return Err(InsightError::SymbolNotFound(symbol.to_string()));
    }

    let key = match period_type {
        PeriodType::Annual => "annualReports",
        PeriodType::Quarterly => "quarterlyReports",
    };
    let Some(reports) = body.get(key).and_then(Value::as_array) else {
        return Err(InsightError::statement_unavailable(symbol, statement_type));
    };

    let mut statement = RawStatement::new(symbol.clone(), statement_type, period_type);
    for report in reports {
        let Some(fields) = report.as_object() else {
            continue;
        };

        let fiscal_date = fields.get("fiscalDateEnding").and_then(Value::as_str).unwrap_or("");
        let Ok(period_end) = NaiveDate::parse_from_str(fiscal_date, "%Y-%m-%d") else {
            warn!(
                provider = PROVIDER_NAME,
                symbol = %symbol,
                statement = %statement_type,
                fiscal_date,
                "Skipping report with invalid fiscal date"
            );
            continue;
        };

        let items: LineItems = fields
            .iter()
            .filter(|(name, _)| !NON_LINE_ITEM_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), parse_amount(value)))
            .collect();
        statement.insert_period(period_end, items);
    }

    if statement.is_empty() {
        return Err(InsightError::statement_unavailable(symbol, statement_type));
    }
    Ok(statement)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AvOverview {
    symbol: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    exchange: String,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    sector: String,
    #[serde(default)]
    industry: String,
    #[serde(default)]
    country: String,
    address: Option<String>,
    description: Option<String>,
    fiscal_year_end: Option<String>,
    latest_quarter: Option<String>,
    market_capitalization: Option<String>,
}

/// Converts an `OVERVIEW` payload.
pub(crate) fn parse_overview(symbol: &Symbol, body: &Value) -> Result<CompanyOverview> {
    if error_message(body).is_some() {
        return Err(InsightError::SymbolNotFound(symbol.to_string()));
    }
    let unavailable = || InsightError::DataUnavailable {
        symbol: symbol.clone(),
        statement: "company overview".to_string(),
    };
    if is_blank(body) {
        return Err(unavailable());
    }

    let raw = AvOverview::deserialize(body).map_err(|e| InsightError::Parse(e.to_string()))?;
    let Some(reported_symbol) = text(raw.symbol) else {
        return Err(unavailable());
    };

    Ok(CompanyOverview {
        symbol: Symbol::new(reported_symbol),
        name: raw.name,
        exchange: raw.exchange,
        currency: raw.currency,
        sector: raw.sector,
        industry: raw.industry,
        country: raw.country,
        address: text(raw.address),
        description: text(raw.description),
        fiscal_year_end: text(raw.fiscal_year_end),
        latest_quarter: text(raw.latest_quarter),
        market_capitalization: raw
            .market_capitalization
            .and_then(|v| parse_amount(&Value::String(v))),
    })
}

#[derive(Debug, Deserialize)]
struct AvNewsFeed {
    #[serde(default)]
    feed: Vec<AvArticle>,
}

#[derive(Debug, Deserialize)]
struct AvArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    authors: Vec<String>,
    #[serde(default)]
    topics: Vec<AvTopic>,
    #[serde(default)]
    overall_sentiment_score: Value,
    overall_sentiment_label: Option<String>,
    #[serde(default)]
    ticker_sentiment: Vec<AvTickerSentiment>,
}

#[derive(Debug, Deserialize)]
struct AvTopic {
    topic: String,
}

#[derive(Debug, Deserialize)]
struct AvTickerSentiment {
    ticker: String,
    #[serde(default)]
    ticker_sentiment_score: Value,
    ticker_sentiment_label: Option<String>,
}

impl AvArticle {
    /// Uses the ticker-specific sentiment when the article carries one.
    fn into_article(self, symbol: &Symbol) -> NewsArticle {
        let ticker = self
            .ticker_sentiment
            .iter()
            .find(|t| t.ticker.eq_ignore_ascii_case(symbol.as_str()))
            .and_then(|t| {
                parse_amount(&t.ticker_sentiment_score)
                    .map(|score| (score, t.ticker_sentiment_label.clone()))
            });

        let (sentiment_score, sentiment_label) = match ticker {
            Some((score, label)) => (Some(score), label),
            None => (
                parse_amount(&self.overall_sentiment_score),
                self.overall_sentiment_label,
            ),
        };

        NewsArticle {
            title: self.title,
            url: self.url,
            authors: self.authors,
            topics: self.topics.into_iter().map(|t| t.topic).collect(),
            sentiment_score,
            sentiment_label: text(sentiment_label),
        }
    }
}

/// Converts a `NEWS_SENTIMENT` payload, keeping at most `limit` articles.
pub(crate) fn parse_news(symbol: &Symbol, limit: usize, body: &Value) -> Result<NewsDigest> {
    if let Some(message) = error_message(body) {
        return Err(InsightError::InvalidParameter(message.to_string()));
    }
    let feed = AvNewsFeed::deserialize(body).map_err(|e| InsightError::Parse(e.to_string()))?;

    let articles = feed
        .feed
        .into_iter()
        .take(limit)
        .map(|a| a.into_article(symbol))
        .collect();
    Ok(NewsDigest::from_articles(articles))
}

#[derive(Debug, Deserialize)]
struct AvSearch {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<AvMatch>,
}

#[derive(Debug, Deserialize)]
struct AvMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name", default)]
    name: String,
    #[serde(rename = "4. region", default)]
    region: String,
    #[serde(rename = "8. currency", default)]
    currency: String,
    #[serde(rename = "9. matchScore", default)]
    match_score: Value,
}

/// Converts a `SYMBOL_SEARCH` payload.
pub(crate) fn parse_search(body: &Value) -> Result<Vec<SymbolMatch>> {
    if let Some(message) = error_message(body) {
        return Err(InsightError::InvalidParameter(message.to_string()));
    }
    let search = AvSearch::deserialize(body).map_err(|e| InsightError::Parse(e.to_string()))?;

    Ok(search
        .best_matches
        .into_iter()
        .map(|m| SymbolMatch {
            symbol: Symbol::new(m.symbol),
            name: m.name,
            region: m.region,
            currency: m.currency,
            match_score: parse_amount(&m.match_score).unwrap_or(0.0),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_core::SentimentClass;
    use serde_json::json;

    fn fixture(name: &str) -> Value {
        let text = match name {
            "income_statement" => include_str!("../tests/fixtures/income_statement.json"),
            "overview" => include_str!("../tests/fixtures/overview.json"),
            "news_sentiment" => include_str!("../tests/fixtures/news_sentiment.json"),
            "symbol_search" => include_str!("../tests/fixtures/symbol_search.json"),
            other => panic!("unknown fixture {other}"),
        };
        serde_json::from_str(text).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&json!("61860000000")), Some(61_860_000_000.0));
        assert_eq!(parse_amount(&json!("-1176000000")), Some(-1_176_000_000.0));
        assert_eq!(parse_amount(&json!(0.25)), Some(0.25));
        assert_eq!(parse_amount(&json!("None")), None);
        assert_eq!(parse_amount(&json!("")), None);
        assert_eq!(parse_amount(&json!("n/a")), None);
        assert_eq!(parse_amount(&Value::Null), None);
    }

    #[test]
    fn test_parse_annual_statement() {
        let symbol = Symbol::new("IBM");
        let stmt = parse_statement(
            &symbol,
            StatementType::IncomeStatement,
            PeriodType::Annual,
            &fixture("income_statement"),
        )
        .unwrap();

        // the report with an invalid date is dropped
        assert_eq!(stmt.len(), 2);
        assert_eq!(stmt.latest_period(), Some(date(2023, 12, 31)));

        let (_, latest) = stmt.latest().unwrap();
        assert_eq!(latest.get("totalRevenue"), Some(61_860_000_000.0));
        assert_eq!(latest.get("depreciation"), None);
        assert!(latest.contains("depreciation"));
        assert!(!latest.contains("reportedCurrency"));
        assert!(!latest.contains("fiscalDateEnding"));

        // chronological order even though reports arrive latest-first
        let revenue = stmt.series("totalRevenue");
        assert_eq!(revenue[0], (date(2022, 12, 31), Some(60_530_000_000.0)));
    }

    #[test]
    fn test_parse_quarterly_statement() {
        let stmt = parse_statement(
            &Symbol::new("IBM"),
            StatementType::IncomeStatement,
            PeriodType::Quarterly,
            &fixture("income_statement"),
        )
        .unwrap();
        assert_eq!(stmt.period_type, PeriodType::Quarterly);
        assert_eq!(stmt.latest_period(), Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_parse_statement_without_reports() {
        let symbol = Symbol::new("ZZZZ");
        let err = parse_statement(&symbol, StatementType::CashFlow, PeriodType::Annual, &json!({}))
            .unwrap_err();
        assert!(matches!(err, InsightError::DataUnavailable { .. }));
        assert_eq!(err.to_string(), "No Cash Flow data available for ZZZZ");

        let err = parse_statement(
            &symbol,
            StatementType::CashFlow,
            PeriodType::Annual,
            &json!({ "symbol": "ZZZZ", "annualReports": [] }),
        )
        .unwrap_err();
        assert!(err.is_not_found());

        let err = parse_statement(
            &symbol,
            StatementType::BalanceSheet,
            PeriodType::Annual,
            &json!({ "Error Message": "Invalid API call." }),
        )
        .unwrap_err();
        assert!(matches!(err, InsightError::SymbolNotFound(s) if s == "ZZZZ"));
    }

    #[test]
    fn test_check_throttled() {
        assert!(check_throttled(&fixture("overview")).is_ok());
        let err = check_throttled(&json!({ "Note": "Thank you for using Alpha Vantage!" })).unwrap_err();
        assert!(matches!(err, InsightError::RateLimited { ref provider, .. } if provider == PROVIDER_NAME));
        assert!(check_throttled(&json!({ "Information": "premium endpoint" })).is_err());
    }

    #[test]
    fn test_parse_overview() {
        let overview = parse_overview(&Symbol::new("ibm"), &fixture("overview")).unwrap();
        assert_eq!(overview.symbol, Symbol::new("IBM"));
        assert_eq!(overview.name, "International Business Machines");
        assert_eq!(overview.exchange, "NYSE");
        assert_eq!(overview.sector, "TECHNOLOGY");
        assert_eq!(overview.fiscal_year_end.as_deref(), Some("December"));
        assert_eq!(overview.latest_quarter.as_deref(), Some("2024-03-31"));
        assert_eq!(overview.market_capitalization, Some(174_051_590_000.0));
    }

    #[test]
    fn test_parse_empty_overview() {
        let err = parse_overview(&Symbol::new("NOPE"), &json!({})).unwrap_err();
        assert!(matches!(err, InsightError::DataUnavailable { ref statement, .. } if statement == "company overview"));
    }

    #[test]
    fn test_parse_news_prefers_ticker_sentiment() {
        let digest = parse_news(&Symbol::new("IBM"), 10, &fixture("news_sentiment")).unwrap();
        assert_eq!(digest.articles.len(), 3);

        let first = &digest.articles[0];
        assert_eq!(first.sentiment_score, Some(0.4));
        assert_eq!(first.sentiment_label.as_deref(), Some("Bullish"));
        assert_eq!(first.topics, vec!["Technology", "Earnings"]);

        // no IBM entry: overall score
        assert_eq!(digest.articles[1].sentiment_score, Some(0.2));
        assert_eq!(digest.articles[2].sentiment_score, Some(-0.1));

        let mean = digest.mean_sentiment_score.unwrap();
        assert!((mean - 0.5 / 3.0).abs() < 1e-12);
        assert_eq!(digest.mean_sentiment_class, Some(SentimentClass::SomewhatBullish));
    }

    #[test]
    fn test_parse_news_respects_limit() {
        let digest = parse_news(&Symbol::new("IBM"), 1, &fixture("news_sentiment")).unwrap();
        assert_eq!(digest.articles.len(), 1);
        assert_eq!(digest.mean_sentiment_score, Some(0.4));

        let empty = parse_news(&Symbol::new("IBM"), 10, &json!({ "items": "0", "feed": [] })).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.mean_sentiment_class, None);
    }

    #[test]
    fn test_parse_search() {
        let matches = parse_search(&fixture("symbol_search")).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].symbol, Symbol::new("TSCO.LON"));
        assert_eq!(matches[0].region, "United Kingdom");
        assert_eq!(matches[1].currency, "USD");
        assert!((matches[0].match_score - 0.7273).abs() < 1e-12);

        assert!(parse_search(&json!({ "bestMatches": [] })).unwrap().is_empty());
    }
}
