//! Insight composition.
//!
//! For every enabled category of a statement, [`InsightComposer`] assembles a
//! context payload (the category's metrics and raw line items), calls the
//! narrative service once, and files the text under the category. A failed
//! or empty narrative only removes that category from the bundle.

use futures::stream::{self, StreamExt};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use finsight_core::{
    Insight, InsightBundle, InsightCategory, InsightError, InsightSelection, Metric, MetricSet,
    NarrativeRequest, NarrativeService, RawStatement, Result, UnavailableInsight,
};

use crate::charts::{self, ChartSeriesBuilder};

/// What a category's narrative is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryContext {
    /// What the narrative should assess.
    pub focus: &'static str,
    /// Metrics included in the payload.
    pub metrics: &'static [Metric],
    /// Raw line items included in the payload, every period.
    pub line_items: &'static [&'static str],
    /// Chart series illustrating the category.
    pub chart: Option<&'static str>,
}

impl CategoryContext {
    /// Returns the context definition of a category.
    #[must_use]
    pub const fn of(category: InsightCategory) -> Self {
        use InsightCategory as C;
        use Metric as M;

        match category {
            C::RevenueHealth => Self {
                focus: "Assess the level and trend of revenue across the reported periods \
                        and what the margins say about the quality of that revenue.",
                metrics: &[M::GrossProfitMargin, M::NetProfitMargin],
                line_items: &["totalRevenue", "grossProfit", "costOfRevenue"],
                chart: Some(charts::TOTAL_REVENUE.name),
            },
            C::OperationalEfficiency => Self {
                focus: "Assess how efficiently the company turns revenue into operating \
                        profit given its cost of revenue and overhead.",
                metrics: &[M::OperatingProfitMargin, M::CostEfficiency, M::SgAndAEfficiency],
                line_items: &[
                    "operatingIncome",
                    "operatingExpenses",
                    "costOfRevenue",
                    "sellingGeneralAndAdministrative",
                ],
                chart: None,
            },
            C::RAndDFocus => Self {
                focus: "Assess how much the company invests in research and development \
                        relative to revenue and operating expenses.",
                metrics: &[M::OperatingProfitMargin],
                line_items: &["researchAndDevelopment", "totalRevenue", "operatingExpenses"],
                chart: None,
            },
            C::DebtManagement => Self {
                focus: "Assess the interest burden and how comfortably operating income \
                        covers it.",
                metrics: &[M::InterestCoverageRatio],
                line_items: &["interestExpense", "operatingIncome", "interestAndDebtExpense"],
                chart: Some(charts::INTEREST_EXPENSE.name),
            },
            C::ProfitRetention => Self {
                focus: "Assess how much of revenue is retained as net income and how \
                        profitability has moved over time.",
                metrics: &[M::NetProfitMargin],
                line_items: &["netIncome", "incomeBeforeTax", "incomeTaxExpense"],
                chart: Some(charts::NET_INCOME.name),
            },
            C::LiquidityPosition => Self {
                focus: "Assess the company's ability to meet short-term obligations from \
                        current assets.",
                metrics: &[M::CurrentRatio, M::QuickRatio],
                line_items: &[
                    "totalCurrentAssets",
                    "totalCurrentLiabilities",
                    "cashAndShortTermInvestments",
                    "inventory",
                ],
                chart: Some(charts::ASSET_COMPOSITION.name),
            },
            C::AssetEfficiency => Self {
                focus: "Assess how effectively the asset base generates revenue.",
                metrics: &[M::AssetTurnover],
                line_items: &["totalAssets", "totalCurrentAssets", "totalNonCurrentAssets"],
                chart: None,
            },
            C::CapitalStructure => Self {
                focus: "Assess the mix of liabilities and equity funding the business.",
                metrics: &[M::DebtToEquityRatio, M::EquityMultiplier],
                line_items: &[
                    "totalLiabilities",
                    "totalShareholderEquity",
                    "longTermDebt",
                    "shortTermDebt",
                ],
                chart: Some(charts::LIABILITIES_COMPOSITION.name),
            },
            C::InventoryManagement => Self {
                focus: "Assess inventory levels relative to current assets and what they \
                        imply for liquidity.",
                metrics: &[M::CurrentRatio, M::QuickRatio],
                line_items: &["inventory", "totalCurrentAssets"],
                chart: None,
            },
            C::OverallSolvency => Self {
                focus: "Assess long-term solvency: whether assets and equity comfortably \
                        support total liabilities.",
                metrics: &[M::DebtToEquityRatio, M::EquityMultiplier],
                line_items: &["totalAssets", "totalLiabilities", "totalShareholderEquity"],
                chart: Some(charts::DEBT_STRUCTURE.name),
            },
            C::OperationalCashEfficiency => Self {
                focus: "Assess how much cash operations generate relative to revenue and \
                        reported earnings.",
                metrics: &[M::OperatingCashFlowMargin],
                line_items: &["operatingCashflow", "netIncome"],
                chart: Some(charts::OPERATING_CASH_FLOW.name),
            },
            C::InvestmentCapability => Self {
                focus: "Assess the company's capacity to fund capital expenditure and \
                        other investment from operating cash flow.",
                metrics: &[M::CapitalExpenditureCoverageRatio, M::FreeCashFlow],
                line_items: &["capitalExpenditures", "cashflowFromInvestment"],
                chart: Some(charts::CASH_FLOW_FROM_INVESTMENT.name),
            },
            C::FinancialFlexibility => Self {
                focus: "Assess financing activity and the room free cash flow leaves for \
                        debt repayment, buybacks or new investment.",
                metrics: &[M::FreeCashFlow, M::CashFlowToDebtRatio],
                line_items: &[
                    "cashflowFromFinancing",
                    "proceedsFromRepaymentsOfShortTermDebt",
                    "paymentsForRepurchaseOfCommonStock",
                ],
                chart: Some(charts::CASH_FLOW_FROM_FINANCING.name),
            },
            C::DividendSustainability => Self {
                focus: "Assess whether operating cash flow sustainably covers dividend \
                        payments.",
                metrics: &[M::DividendCoverageRatio, M::FreeCashFlow],
                line_items: &["dividendPayout", "operatingCashflow"],
                chart: None,
            },
            C::DebtServiceCapability => Self {
                focus: "Assess the ability to service debt from operating cash flow.",
                metrics: &[M::CashFlowToDebtRatio],
                line_items: &["operatingCashflow", "cashflowFromFinancing"],
                chart: None,
            },
        }
    }
}

/// Composes insight bundles from statements, metrics and a narrative service.
#[derive(Clone, Copy, Debug)]
pub struct InsightComposer {
    concurrency: usize,
    charts: ChartSeriesBuilder,
}

impl Default for InsightComposer {
    fn default() -> Self {
        Self {
            concurrency: 1,
            charts: ChartSeriesBuilder::new(),
        }
    }
}

impl InsightComposer {
    /// Creates a composer that issues narrative calls one at a time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many narrative calls may be in flight at once (minimum 1).
    ///
    /// Results are identical for any value; only latency changes.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Builds the narrative request for one category.
    #[must_use]
    pub fn request(
        &self,
        statement: &RawStatement,
        metrics: &MetricSet,
        category: InsightCategory,
    ) -> NarrativeRequest {
        let context = CategoryContext::of(category);

        let metric_values: Map<String, Value> = context
            .metrics
            .iter()
            .map(|m| (m.name().to_string(), json!(metrics.get(*m))))
            .collect();

        let line_items: Map<String, Value> = context
            .line_items
            .iter()
            .map(|item| {
                let points: Vec<Value> = statement
                    .series(item)
                    .into_iter()
                    .map(|(period, value)| json!({ "period": period.to_string(), "value": value }))
                    .collect();
                ((*item).to_string(), Value::Array(points))
            })
            .collect();

        NarrativeRequest {
            symbol: statement.symbol.clone(),
            statement_type: statement.statement_type,
            category,
            focus: context.focus.to_string(),
            context: json!({
                "period_type": statement.period_type,
                "latest_period": statement.latest_period().map(|d| d.to_string()),
                "metrics": metric_values,
                "line_items": line_items,
            }),
        }
    }

    /// Composes the bundle for one statement.
    ///
    /// Only categories enabled in `selection` for the statement's type are
    /// requested. Each category is generated independently; failures are
    /// recorded in [`InsightBundle::unavailable`] and never abort the bundle.
    pub async fn compose(
        &self,
        statement: &RawStatement,
        metrics: MetricSet,
        selection: &InsightSelection,
        service: &dyn NarrativeService,
    ) -> InsightBundle {
        let statement_type = statement.statement_type;
        let mut bundle = InsightBundle::new(statement.symbol.clone(), statement_type, metrics);

        for series in self.charts.standard_charts(statement) {
            bundle.charts.insert(series.name.clone(), series);
        }

        let categories = selection.for_statement(statement_type);
        info!(
            symbol = %statement.symbol,
            statement = %statement_type,
            categories = categories.len(),
            service = service.name(),
            "Composing insights"
        );

        let requests: Vec<NarrativeRequest> = categories
            .iter()
            .map(|c| self.request(statement, &bundle.metrics, *c))
            .collect();

        let outcomes: Vec<(InsightCategory, Result<String>)> = stream::iter(requests)
            .map(|request| async move {
                let outcome = generate_one(service, &request).await;
                (request.category, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        for (category, outcome) in outcomes {
            match outcome {
                Ok(text) => {
                    debug!(category = %category, chars = text.len(), "Narrative generated");
                    bundle.insights.push(Insight {
                        category,
                        text,
                        chart: CategoryContext::of(category).chart.map(str::to_string),
                    });
                }
                Err(e) => {
                    warn!(
                        symbol = %statement.symbol,
                        category = %category,
                        error = %e,
                        "Narrative unavailable"
                    );
                    bundle.unavailable.push(UnavailableInsight {
                        category,
                        reason: e.to_string(),
                    });
                }
            }
        }

        bundle
    }
}

async fn generate_one(service: &dyn NarrativeService, request: &NarrativeRequest) -> Result<String> {
    let text = service.generate(request).await?;
    let text = text.trim();
    if text.is_empty() {
        return Err(InsightError::EmptyNarrative);
    }
    Ok(text.to_string())
}
