//! Financial ratio computation.
//!
//! [`RatioEngine`] evaluates the fixed metric schema of a statement type
//! against the most recent period of a [`RawStatement`]. It is a pure
//! function of its inputs: a missing input or a zero denominator yields an
//! undefined metric, never an error and never a silent zero.

use chrono::NaiveDate;
use finsight_core::{LineItems, Metric, MetricSet, RawStatement, StatementType};
use tracing::debug;

/// Denominators with an absolute value below this are treated as zero.
pub const DEFAULT_DENOMINATOR_EPSILON: f64 = 1e-9;

/// Line item names used by the ratio formulas.
pub mod items {
    /// Total revenue.
    pub const TOTAL_REVENUE: &str = "totalRevenue";
    /// Gross profit.
    pub const GROSS_PROFIT: &str = "grossProfit";
    /// Operating income.
    pub const OPERATING_INCOME: &str = "operatingIncome";
    /// Net income.
    pub const NET_INCOME: &str = "netIncome";
    /// Cost of revenue.
    pub const COST_OF_REVENUE: &str = "costOfRevenue";
    /// Selling, general and administrative expense.
    pub const SG_AND_A: &str = "sellingGeneralAndAdministrative";
    /// Interest expense.
    pub const INTEREST_EXPENSE: &str = "interestExpense";
    /// Total current assets.
    pub const TOTAL_CURRENT_ASSETS: &str = "totalCurrentAssets";
    /// Total current liabilities.
    pub const TOTAL_CURRENT_LIABILITIES: &str = "totalCurrentLiabilities";
    /// Total liabilities.
    pub const TOTAL_LIABILITIES: &str = "totalLiabilities";
    /// Total shareholder equity.
    pub const TOTAL_SHAREHOLDER_EQUITY: &str = "totalShareholderEquity";
    /// Inventory.
    pub const INVENTORY: &str = "inventory";
    /// Total assets.
    pub const TOTAL_ASSETS: &str = "totalAssets";
    /// Operating cash flow.
    pub const OPERATING_CASHFLOW: &str = "operatingCashflow";
    /// Capital expenditures.
    pub const CAPITAL_EXPENDITURES: &str = "capitalExpenditures";
    /// Dividend payout.
    pub const DIVIDEND_PAYOUT: &str = "dividendPayout";
}

use items::*;

/// Computes metric sets from raw statements.
#[derive(Clone, Copy, Debug)]
pub struct RatioEngine {
    epsilon: f64,
}

impl Default for RatioEngine {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_DENOMINATOR_EPSILON,
        }
    }
}

impl RatioEngine {
    /// Creates an engine with the default zero-denominator threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the threshold below which a denominator counts as zero.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    /// Computes the metric schema of `statement_type`.
    ///
    /// Inputs are read from the latest period of `statement`. Line items the
    /// statement does not report (e.g. `totalRevenue` for a balance sheet) are
    /// looked up in `supporting`, in order, preferring the same period end and
    /// falling back to each supporting statement's latest period.
    ///
    /// A missing or empty `statement` yields a set with every metric undefined.
    #[must_use]
    pub fn compute(
        &self,
        statement_type: StatementType,
        statement: Option<&RawStatement>,
        supporting: &[&RawStatement],
    ) -> MetricSet {
        let Some((period, latest)) = statement.and_then(RawStatement::latest) else {
            debug!(statement = %statement_type, "No statement data, all metrics undefined");
            return MetricSet::undefined(statement_type);
        };

        let inputs = Inputs::new(period, latest, supporting);
        MetricSet::from_fn(statement_type, |metric| self.evaluate(metric, &inputs))
    }

    /// Computes the metric schema of the statement's own type.
    #[must_use]
    pub fn compute_statement(&self, statement: &RawStatement, supporting: &[&RawStatement]) -> MetricSet {
        self.compute(statement.statement_type, Some(statement), supporting)
    }

    fn evaluate(&self, metric: Metric, inputs: &Inputs<'_>) -> Option<f64> {
        let ratio = |num: &str, den: &str| self.ratio(inputs.get(num), inputs.get(den));

        match metric {
            Metric::GrossProfitMargin => ratio(GROSS_PROFIT, TOTAL_REVENUE),
            Metric::OperatingProfitMargin => ratio(OPERATING_INCOME, TOTAL_REVENUE),
            Metric::NetProfitMargin => ratio(NET_INCOME, TOTAL_REVENUE),
            Metric::CostEfficiency => ratio(COST_OF_REVENUE, TOTAL_REVENUE),
            Metric::SgAndAEfficiency => ratio(SG_AND_A, TOTAL_REVENUE),
            Metric::InterestCoverageRatio => ratio(OPERATING_INCOME, INTEREST_EXPENSE),

            Metric::CurrentRatio => ratio(TOTAL_CURRENT_ASSETS, TOTAL_CURRENT_LIABILITIES),
            Metric::DebtToEquityRatio => ratio(TOTAL_LIABILITIES, TOTAL_SHAREHOLDER_EQUITY),
            Metric::QuickRatio => {
                let quick_assets = difference(inputs.get(TOTAL_CURRENT_ASSETS), inputs.get(INVENTORY));
                self.ratio(quick_assets, inputs.get(TOTAL_CURRENT_LIABILITIES))
            }
            Metric::AssetTurnover => ratio(TOTAL_REVENUE, TOTAL_ASSETS),
            Metric::EquityMultiplier => ratio(TOTAL_ASSETS, TOTAL_SHAREHOLDER_EQUITY),

            Metric::OperatingCashFlowMargin => ratio(OPERATING_CASHFLOW, TOTAL_REVENUE),
            Metric::CapitalExpenditureCoverageRatio => ratio(OPERATING_CASHFLOW, CAPITAL_EXPENDITURES),
            Metric::DividendCoverageRatio => ratio(OPERATING_CASHFLOW, DIVIDEND_PAYOUT),
            Metric::CashFlowToDebtRatio => ratio(OPERATING_CASHFLOW, TOTAL_LIABILITIES),
            Metric::FreeCashFlow => {
                difference(inputs.get(OPERATING_CASHFLOW), inputs.get(CAPITAL_EXPENDITURES))
            }
        }
    }

    fn ratio(&self, numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
        let (num, den) = (numerator?, denominator?);
        if den.abs() < self.epsilon {
            return None;
        }
        Some(num / den).filter(|v| v.is_finite())
    }
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

/// Line item lookup over the primary period and supporting statements.
struct Inputs<'a> {
    sources: Vec<&'a LineItems>,
}

impl<'a> Inputs<'a> {
    fn new(period: NaiveDate, primary: &'a LineItems, supporting: &[&'a RawStatement]) -> Self {
        let mut sources = Vec::with_capacity(supporting.len() + 1);
        sources.push(primary);
        for statement in supporting {
            let items = statement
                .period(period)
                .or_else(|| statement.latest().map(|(_, items)| items));
            if let Some(items) = items {
                sources.push(items);
            }
        }
        Self { sources }
    }

    fn get(&self, name: &str) -> Option<f64> {
        self.sources.iter().find_map(|items| items.get(name))
    }
}
