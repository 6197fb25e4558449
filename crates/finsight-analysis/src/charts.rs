//! Chart series extraction.
//!
//! Trend series carry one point per reported period in chronological order;
//! compositions break the latest period into fixed sub-categories. Missing
//! values stay in the series as `None` so series lengths and category counts
//! never depend on what a provider happened to report.

use finsight_core::{ChartSeries, RawStatement, SeriesKind, StatementType};

/// A trend series definition: one line item over every period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trend {
    /// Series name.
    pub name: &'static str,
    /// Chart title.
    pub title: &'static str,
    /// Source line item.
    pub line_item: &'static str,
}

/// A composition definition: named sub-categories of the latest period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Composition {
    /// Series name.
    pub name: &'static str,
    /// Chart title.
    pub title: &'static str,
    /// `(label, line item)` pairs in display order.
    pub parts: &'static [(&'static str, &'static str)],
}

/// A chart the dashboard shows for a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartSpec {
    /// Bar chart over periods.
    Trend(Trend),
    /// Donut chart of the latest period.
    Composition(Composition),
}

impl ChartSpec {
    /// Returns the series name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Trend(t) => t.name,
            Self::Composition(c) => c.name,
        }
    }
}

/// Revenue per period.
pub const TOTAL_REVENUE: Trend = Trend {
    name: "total_revenue",
    title: "Revenue Growth",
    line_item: "totalRevenue",
};

/// Interest expense per period.
pub const INTEREST_EXPENSE: Trend = Trend {
    name: "interest_expense",
    title: "Debt Service Obligation",
    line_item: "interestExpense",
};

/// Net income per period.
pub const NET_INCOME: Trend = Trend {
    name: "net_income",
    title: "Profitability Trend",
    line_item: "netIncome",
};

/// Operating cash flow per period.
pub const OPERATING_CASH_FLOW: Trend = Trend {
    name: "operating_cash_flow",
    title: "Operating Cash Flow Trend",
    line_item: "operatingCashflow",
};

/// Investing cash flow per period.
pub const CASH_FLOW_FROM_INVESTMENT: Trend = Trend {
    name: "cash_flow_from_investment",
    title: "Investment Capability Trend",
    line_item: "cashflowFromInvestment",
};

/// Financing cash flow per period.
pub const CASH_FLOW_FROM_FINANCING: Trend = Trend {
    name: "cash_flow_from_financing",
    title: "Financial Flexibility Trend",
    line_item: "cashflowFromFinancing",
};

/// Asset mix at the latest period.
pub const ASSET_COMPOSITION: Composition = Composition {
    name: "asset_composition",
    title: "Asset Composition",
    parts: &[
        ("cash_and_short_term_investments", "cashAndShortTermInvestments"),
        ("receivables", "currentNetReceivables"),
        ("inventory", "inventory"),
        ("property_plant_equipment", "propertyPlantEquipment"),
        ("intangible_assets", "intangibleAssets"),
        ("long_term_investments", "longTermInvestments"),
    ],
};

/// Liability mix at the latest period.
pub const LIABILITIES_COMPOSITION: Composition = Composition {
    name: "liabilities_composition",
    title: "Liabilities Composition",
    parts: &[
        ("accounts_payable", "currentAccountsPayable"),
        ("deferred_revenue", "deferredRevenue"),
        ("short_term_debt", "shortTermDebt"),
        ("long_term_debt", "longTermDebt"),
        ("other_current_liabilities", "otherCurrentLiabilities"),
        ("other_non_current_liabilities", "otherNonCurrentLiabilities"),
    ],
};

/// Liabilities against equity at the latest period.
pub const DEBT_STRUCTURE: Composition = Composition {
    name: "debt_structure",
    title: "Debt Structure",
    parts: &[
        ("total_liabilities", "totalLiabilities"),
        ("total_shareholder_equity", "totalShareholderEquity"),
    ],
};

const INCOME_STATEMENT_CHARTS: &[ChartSpec] = &[
    ChartSpec::Trend(TOTAL_REVENUE),
    ChartSpec::Trend(INTEREST_EXPENSE),
    ChartSpec::Trend(NET_INCOME),
];

const BALANCE_SHEET_CHARTS: &[ChartSpec] = &[
    ChartSpec::Composition(ASSET_COMPOSITION),
    ChartSpec::Composition(LIABILITIES_COMPOSITION),
    ChartSpec::Composition(DEBT_STRUCTURE),
];

const CASH_FLOW_CHARTS: &[ChartSpec] = &[
    ChartSpec::Trend(OPERATING_CASH_FLOW),
    ChartSpec::Trend(CASH_FLOW_FROM_INVESTMENT),
    ChartSpec::Trend(CASH_FLOW_FROM_FINANCING),
];

/// Returns the charts shown for a statement type.
#[must_use]
pub const fn standard_charts(statement_type: StatementType) -> &'static [ChartSpec] {
    match statement_type {
        StatementType::IncomeStatement => INCOME_STATEMENT_CHARTS,
        StatementType::BalanceSheet => BALANCE_SHEET_CHARTS,
        StatementType::CashFlow => CASH_FLOW_CHARTS,
    }
}

/// Builds chart series from raw statements.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChartSeriesBuilder;

impl ChartSeriesBuilder {
    /// Creates a builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds a trend series of `line_item` with one point per period.
    #[must_use]
    pub fn trend(&self, statement: &RawStatement, trend: &Trend) -> ChartSeries {
        let mut series = ChartSeries::new(trend.name, trend.title, SeriesKind::Trend);
        for (period, value) in statement.series(trend.line_item) {
            series.push(period, period.to_string(), value);
        }
        series
    }

    /// Builds a composition of the latest period.
    ///
    /// Every part is present; unreported parts have a `None` value. Each
    /// point also carries its share of the positive total. A statement with
    /// no periods yields an empty series.
    #[must_use]
    pub fn composition(&self, statement: &RawStatement, composition: &Composition) -> ChartSeries {
        let mut series = ChartSeries::new(composition.name, composition.title, SeriesKind::Composition);
        if let Some((period, items)) = statement.latest() {
            for (label, line_item) in composition.parts {
                series.push(period, *label, items.get(line_item));
            }
        }
        series.fill_shares();
        series
    }

    /// Builds a series from a chart definition.
    #[must_use]
    pub fn build(&self, statement: &RawStatement, spec: &ChartSpec) -> ChartSeries {
        match spec {
            ChartSpec::Trend(t) => self.trend(statement, t),
            ChartSpec::Composition(c) => self.composition(statement, c),
        }
    }

    /// Builds every standard chart for the statement's type.
    #[must_use]
    pub fn standard_charts(&self, statement: &RawStatement) -> Vec<ChartSeries> {
        standard_charts(statement.statement_type)
            .iter()
            .map(|spec| self.build(statement, spec))
            .collect()
    }
}
