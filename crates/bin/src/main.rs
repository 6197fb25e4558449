//! Finsight CLI binary.
//!
//! Provides command-line interface for financial statement insights.

mod render;

use clap::{Parser, Subcommand};
use finsight::{
    AlphaVantageProvider, FinsightConfig, InsightCategory, InsightError, InsightPipeline,
    InsightSelection, PeriodType, StatementType, Symbol,
};
use std::process;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Finsight: financial statement insights for a ticker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate metrics, charts, narratives and news for a ticker
    Insights {
        /// Stock symbol
        ticker: String,

        /// Statement period (annual or quarterly)
        #[arg(long)]
        period: Option<PeriodType>,

        /// Disable an insight category (e.g. `revenue_health` or `balance_sheet.operational_efficiency`)
        #[arg(long, value_name = "KEY")]
        disable: Vec<InsightCategory>,

        /// Enable only these insight categories
        #[arg(long, value_name = "KEY", conflicts_with = "disable")]
        only: Vec<InsightCategory>,

        /// Number of news articles (0 disables news)
        #[arg(long)]
        news: Option<usize>,

        /// Narrative calls in flight at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search symbols by company name or ticker fragment
    Search {
        /// Search keywords
        #[arg(required = true)]
        keywords: Vec<String>,
    },

    /// List insight category keys
    Categories,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Insights {
            ticker,
            period,
            disable,
            only,
            news,
            concurrency,
            json,
        } => {
            let mut config = FinsightConfig::from_env()?;
            if let Some(period) = period {
                config = config.with_period_type(period);
            }
            if let Some(news) = news {
                config = config.with_news_limit(news);
            }
            if let Some(concurrency) = concurrency {
                config = config.with_narrative_concurrency(concurrency);
            }
            let selection = selection(&only, &disable);
            generate_insights(&Symbol::new(ticker), &selection, &config, json).await?;
        }
        Commands::Search { keywords } => {
            let config = FinsightConfig::from_env()?;
            search(&keywords.join(" "), &config).await?;
        }
        Commands::Categories => list_categories(),
    }

    Ok(())
}

/// `--only` wins; otherwise everything except `--disable`.
fn selection(only: &[InsightCategory], disable: &[InsightCategory]) -> InsightSelection {
    if only.is_empty() {
        disable
            .iter()
            .fold(InsightSelection::all(), |s, c| s.disable(*c))
    } else {
        only.iter().copied().collect()
    }
}

async fn generate_insights(
    symbol: &Symbol,
    selection: &InsightSelection,
    config: &FinsightConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if symbol.is_empty() {
        return Err("Please enter a ticker symbol".into());
    }

    let pipeline = InsightPipeline::from_config(config)?;
    info!(symbol = %symbol, period = %config.period_type, "Starting insight generation");

    let report = match pipeline.generate(symbol, selection).await {
        Ok(report) => report,
        Err(InsightError::DataUnavailable { .. }) => return Err("No Data available".into()),
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::ReportView::new(&report, selection));
        if !report.is_complete() {
            eprintln!("\nReport incomplete: some statements or news are unavailable");
        }
    }
    Ok(())
}

async fn search(keywords: &str, config: &FinsightConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = AlphaVantageProvider::new(config.alpha_vantage_api_key()?);
    let pipeline = InsightPipeline::new().with_reference_provider(Arc::new(provider));
    let matches = pipeline.search_symbols(keywords).await?;
    print!("{}", render::MatchesView(&matches));
    Ok(())
}

fn list_categories() {
    for statement_type in StatementType::ALL {
        println!("{}", statement_type.title());
        for category in InsightCategory::for_statement(statement_type) {
            println!("  {:<44}{}", category.to_string(), category.title());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_insights() {
        let cli = Cli::try_parse_from([
            "finsight",
            "insights",
            "msft",
            "--period",
            "quarterly",
            "--disable",
            "revenue_health",
            "--disable",
            "balance_sheet.operational_efficiency",
            "--json",
        ])
        .unwrap();

        let Commands::Insights {
            ticker,
            period,
            disable,
            json,
            ..
        } = cli.command
        else {
            panic!("expected insights command");
        };
        assert_eq!(ticker, "msft");
        assert_eq!(period, Some(PeriodType::Quarterly));
        assert_eq!(
            disable,
            vec![InsightCategory::RevenueHealth, InsightCategory::AssetEfficiency]
        );
        assert!(json);
    }

    #[test]
    fn test_cli_rejects_unknown_category() {
        assert!(Cli::try_parse_from(["finsight", "insights", "MSFT", "--disable", "vibes"]).is_err());
        // ambiguous bare key
        assert!(
            Cli::try_parse_from(["finsight", "insights", "MSFT", "--only", "operational_efficiency"])
                .is_err()
        );
    }

    #[test]
    fn test_selection() {
        let all_but_one = selection(&[], &[InsightCategory::RevenueHealth]);
        assert_eq!(all_but_one.len(), 14);
        assert!(!all_but_one.is_enabled(InsightCategory::RevenueHealth));

        let only = selection(&[InsightCategory::FinancialFlexibility], &[]);
        assert_eq!(only.len(), 1);
        assert!(!only.any_for(StatementType::IncomeStatement));
    }
}
