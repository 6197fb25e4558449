//! Financial metric schema and metric sets.
//!
//! Every statement type has a fixed metric schema (see [`Metric::schema`]).
//! A [`MetricSet`] always carries every metric of its schema; a metric that
//! cannot be computed is present with an undefined (`None`) value.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::InsightError;
use crate::types::StatementType;

/// How a metric value is meant to be displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    /// Dimensionless ratio.
    Ratio,
    /// Amount in the statement's reporting currency.
    Currency,
}

/// A named financial metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    // Income statement
    /// Gross profit / total revenue.
    GrossProfitMargin,
    /// Operating income / total revenue.
    OperatingProfitMargin,
    /// Net income / total revenue.
    NetProfitMargin,
    /// Cost of revenue / total revenue.
    CostEfficiency,
    /// Selling, general and administrative expense / total revenue.
    SgAndAEfficiency,
    /// Operating income / interest expense.
    InterestCoverageRatio,

    // Balance sheet
    /// Total current assets / total current liabilities.
    CurrentRatio,
    /// Total liabilities / total shareholder equity.
    DebtToEquityRatio,
    /// (Total current assets - inventory) / total current liabilities.
    QuickRatio,
    /// Total revenue / total assets.
    AssetTurnover,
    /// Total assets / total shareholder equity.
    EquityMultiplier,

    // Cash flow
    /// Operating cash flow / total revenue.
    OperatingCashFlowMargin,
    /// Operating cash flow / capital expenditures.
    CapitalExpenditureCoverageRatio,
    /// Operating cash flow / dividend payout.
    DividendCoverageRatio,
    /// Operating cash flow / total liabilities.
    CashFlowToDebtRatio,
    /// Operating cash flow - capital expenditures.
    FreeCashFlow,
}

const INCOME_STATEMENT_SCHEMA: &[Metric] = &[
    Metric::GrossProfitMargin,
    Metric::OperatingProfitMargin,
    Metric::NetProfitMargin,
    Metric::CostEfficiency,
    Metric::SgAndAEfficiency,
    Metric::InterestCoverageRatio,
];

const BALANCE_SHEET_SCHEMA: &[Metric] = &[
    Metric::CurrentRatio,
    Metric::DebtToEquityRatio,
    Metric::QuickRatio,
    Metric::AssetTurnover,
    Metric::EquityMultiplier,
];

const CASH_FLOW_SCHEMA: &[Metric] = &[
    Metric::OperatingCashFlowMargin,
    Metric::CapitalExpenditureCoverageRatio,
    Metric::DividendCoverageRatio,
    Metric::CashFlowToDebtRatio,
    Metric::FreeCashFlow,
];

impl Metric {
    /// Returns the fixed metric schema for a statement type, in display order.
    #[must_use]
    pub const fn schema(statement_type: StatementType) -> &'static [Self] {
        match statement_type {
            StatementType::IncomeStatement => INCOME_STATEMENT_SCHEMA,
            StatementType::BalanceSheet => BALANCE_SHEET_SCHEMA,
            StatementType::CashFlow => CASH_FLOW_SCHEMA,
        }
    }

    /// Returns the snake_case metric name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GrossProfitMargin => "gross_profit_margin",
            Self::OperatingProfitMargin => "operating_profit_margin",
            Self::NetProfitMargin => "net_profit_margin",
            Self::CostEfficiency => "cost_efficiency",
            Self::SgAndAEfficiency => "sg_and_a_efficiency",
            Self::InterestCoverageRatio => "interest_coverage_ratio",
            Self::CurrentRatio => "current_ratio",
            Self::DebtToEquityRatio => "debt_to_equity_ratio",
            Self::QuickRatio => "quick_ratio",
            Self::AssetTurnover => "asset_turnover",
            Self::EquityMultiplier => "equity_multiplier",
            Self::OperatingCashFlowMargin => "operating_cash_flow_margin",
            Self::CapitalExpenditureCoverageRatio => "capital_expenditure_coverage_ratio",
            Self::DividendCoverageRatio => "dividend_coverage_ratio",
            Self::CashFlowToDebtRatio => "cash_flow_to_debt_ratio",
            Self::FreeCashFlow => "free_cash_flow",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::GrossProfitMargin => "Gross Profit Margin",
            Self::OperatingProfitMargin => "Operating Profit Margin",
            Self::NetProfitMargin => "Net Profit Margin",
            Self::CostEfficiency => "Cost Efficiency",
            Self::SgAndAEfficiency => "SG&A Efficiency",
            Self::InterestCoverageRatio => "Interest Coverage Ratio",
            Self::CurrentRatio => "Current Ratio",
            Self::DebtToEquityRatio => "Debt to Equity Ratio",
            Self::QuickRatio => "Quick Ratio",
            Self::AssetTurnover => "Asset Turnover",
            Self::EquityMultiplier => "Equity Multiplier",
            Self::OperatingCashFlowMargin => "Operating Cash Flow Margin",
            Self::CapitalExpenditureCoverageRatio => "Capital Expenditure Coverage Ratio",
            Self::DividendCoverageRatio => "Dividend Coverage Ratio",
            Self::CashFlowToDebtRatio => "Cash Flow to Debt Ratio",
            Self::FreeCashFlow => "Free Cash Flow",
        }
    }

    /// Returns the statement type whose schema contains this metric.
    #[must_use]
    pub const fn statement_type(&self) -> StatementType {
        match self {
            Self::GrossProfitMargin
            | Self::OperatingProfitMargin
            | Self::NetProfitMargin
            | Self::CostEfficiency
            | Self::SgAndAEfficiency
            | Self::InterestCoverageRatio => StatementType::IncomeStatement,
            Self::CurrentRatio
            | Self::DebtToEquityRatio
            | Self::QuickRatio
            | Self::AssetTurnover
            | Self::EquityMultiplier => StatementType::BalanceSheet,
            Self::OperatingCashFlowMargin
            | Self::CapitalExpenditureCoverageRatio
            | Self::DividendCoverageRatio
            | Self::CashFlowToDebtRatio
            | Self::FreeCashFlow => StatementType::CashFlow,
        }
    }

    /// Returns how the metric is displayed.
    #[must_use]
    pub const fn format(&self) -> MetricFormat {
        match self {
            Self::FreeCashFlow => MetricFormat::Currency,
            _ => MetricFormat::Ratio,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatementType::ALL
            .iter()
            .flat_map(|t| Self::schema(*t))
            .find(|m| m.name() == s)
            .copied()
            .ok_or_else(|| InsightError::InvalidParameter(format!("Unknown metric: {s}")))
    }
}

/// A single metric and its value, `None` when undefined.
///
/// Serializes as `{ "metric", "label", "value" }`; the label is ignored when
/// deserializing.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct MetricValue {
    /// The metric.
    pub metric: Metric,
    /// The computed value; `None` if inputs were missing or a denominator was zero.
    pub value: Option<f64>,
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MetricValue", 3)?;
        state.serialize_field("metric", &self.metric)?;
        state.serialize_field("label", self.metric.label())?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

/// The complete metric schema of one statement type with computed values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// The statement type whose schema this set covers.
    pub statement_type: StatementType,
    values: Vec<MetricValue>,
}

impl MetricSet {
    /// Creates a set with every metric of the schema undefined.
    #[must_use]
    pub fn undefined(statement_type: StatementType) -> Self {
        Self::from_fn(statement_type, |_| None)
    }

    /// Creates a set by evaluating `compute` for each metric of the schema.
    pub fn from_fn(statement_type: StatementType, mut compute: impl FnMut(Metric) -> Option<f64>) -> Self {
        let values = Metric::schema(statement_type)
            .iter()
            .map(|&metric| MetricValue {
                metric,
                value: compute(metric).filter(|v| v.is_finite()),
            })
            .collect();
        Self {
            statement_type,
            values,
        }
    }

    /// Returns a metric's value, `None` if undefined or not in this schema.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.metric == metric)
            .and_then(|v| v.value)
    }

    /// Returns a metric's value by snake_case name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.metric.name() == name)
            .and_then(|v| v.value)
    }

    /// Returns true if the metric belongs to this set's schema.
    #[must_use]
    pub fn contains(&self, metric: Metric) -> bool {
        self.values.iter().any(|v| v.metric == metric)
    }

    /// Returns an iterator over all metrics in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricValue> {
        self.values.iter()
    }

    /// Returns the number of metrics (always the schema size).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if every metric is undefined, which signals "no data".
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| v.value.is_none())
    }
}
