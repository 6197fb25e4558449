//! Company overview and news types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Symbol;

/// Company reference information shown alongside the statement insights.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Company name.
    pub name: String,
    /// Primary exchange.
    pub exchange: String,
    /// Trading currency.
    pub currency: String,
    /// Business sector.
    pub sector: String,
    /// Industry within the sector.
    pub industry: String,
    /// Country of incorporation.
    pub country: String,
    /// Registered address.
    pub address: Option<String>,
    /// Business description.
    pub description: Option<String>,
    /// Fiscal year end month (e.g. "September").
    pub fiscal_year_end: Option<String>,
    /// Latest reported quarter (ISO date).
    pub latest_quarter: Option<String>,
    /// Market capitalization in `currency`.
    pub market_capitalization: Option<f64>,
}

impl CompanyOverview {
    /// Creates an overview with the required fields.
    #[must_use]
    pub fn new(symbol: Symbol, name: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A ticker matched by a keyword search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// Matched symbol.
    pub symbol: Symbol,
    /// Company name.
    pub name: String,
    /// Listing region.
    pub region: String,
    /// Trading currency.
    pub currency: String,
    /// Provider match score in `[0, 1]`.
    pub match_score: f64,
}

/// Sentiment classification of a score.
///
/// Thresholds follow the news provider's published scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentClass {
    /// score <= -0.35
    Bearish,
    /// -0.35 < score <= -0.15
    SomewhatBearish,
    /// -0.15 < score < 0.15
    Neutral,
    /// 0.15 <= score < 0.35
    SomewhatBullish,
    /// score >= 0.35
    Bullish,
}

impl SentimentClass {
    /// Classifies a sentiment score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score <= -0.35 {
            Self::Bearish
        } else if score <= -0.15 {
            Self::SomewhatBearish
        } else if score < 0.15 {
            Self::Neutral
        } else if score < 0.35 {
            Self::SomewhatBullish
        } else {
            Self::Bullish
        }
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Bearish => "Bearish",
            Self::SomewhatBearish => "Somewhat-Bearish",
            Self::Neutral => "Neutral",
            Self::SomewhatBullish => "Somewhat-Bullish",
            Self::Bullish => "Bullish",
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A news article about a ticker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Headline.
    pub title: String,
    /// Link to the article.
    pub url: String,
    /// Authors.
    pub authors: Vec<String>,
    /// Topics the article was tagged with.
    pub topics: Vec<String>,
    /// Sentiment score for the ticker, in `[-1, 1]`.
    pub sentiment_score: Option<f64>,
    /// Provider sentiment label.
    pub sentiment_label: Option<String>,
}

/// Top news for a ticker with aggregate sentiment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsDigest {
    /// Articles, most relevant first.
    pub articles: Vec<NewsArticle>,
    /// Mean sentiment over articles that carry a score.
    pub mean_sentiment_score: Option<f64>,
    /// Classification of the mean score.
    pub mean_sentiment_class: Option<SentimentClass>,
}

impl NewsDigest {
    /// Builds a digest, computing the mean sentiment of the scored articles.
    #[must_use]
    pub fn from_articles(articles: Vec<NewsArticle>) -> Self {
        let scores: Vec<f64> = articles
            .iter()
            .filter_map(|a| a.sentiment_score)
            .filter(|s| s.is_finite())
            .collect();

        let mean_sentiment_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        Self {
            articles,
            mean_sentiment_score,
            mean_sentiment_class: mean_sentiment_score.map(SentimentClass::from_score),
        }
    }

    /// Returns true if the digest holds no articles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
