//! Insight categories, selections and bundles.
//!
//! Each statement type has five insight categories. The caller enables a
//! subset through an [`InsightSelection`]; the composer produces an
//! [`InsightBundle`] holding narratives only for categories that were enabled
//! and successfully generated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::chart::ChartSeries;
use crate::error::InsightError;
use crate::metrics::MetricSet;
use crate::types::{StatementType, Symbol};

/// A narrative insight category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    // Income statement
    /// Revenue level and growth.
    RevenueHealth,
    /// Cost structure relative to revenue.
    OperationalEfficiency,
    /// Research and development investment.
    RAndDFocus,
    /// Interest burden and coverage.
    DebtManagement,
    /// Net income retained from revenue.
    ProfitRetention,

    // Balance sheet
    /// Short-term liquidity.
    LiquidityPosition,
    /// Asset utilisation. Keyed `operational_efficiency` within balance sheet bundles.
    AssetEfficiency,
    /// Mix of debt and equity financing.
    CapitalStructure,
    /// Inventory levels relative to current assets.
    InventoryManagement,
    /// Long-term solvency.
    OverallSolvency,

    // Cash flow
    /// Cash generated from operations.
    OperationalCashEfficiency,
    /// Capacity to fund investment.
    InvestmentCapability,
    /// Financing activity and flexibility.
    FinancialFlexibility,
    /// Ability to sustain dividends.
    DividendSustainability,
    /// Ability to service debt from cash flow.
    DebtServiceCapability,
}

const INCOME_STATEMENT_CATEGORIES: &[InsightCategory] = &[
    InsightCategory::RevenueHealth,
    InsightCategory::OperationalEfficiency,
    InsightCategory::RAndDFocus,
    InsightCategory::DebtManagement,
    InsightCategory::ProfitRetention,
];

const BALANCE_SHEET_CATEGORIES: &[InsightCategory] = &[
    InsightCategory::LiquidityPosition,
    InsightCategory::AssetEfficiency,
    InsightCategory::CapitalStructure,
    InsightCategory::InventoryManagement,
    InsightCategory::OverallSolvency,
];

const CASH_FLOW_CATEGORIES: &[InsightCategory] = &[
    InsightCategory::OperationalCashEfficiency,
    InsightCategory::InvestmentCapability,
    InsightCategory::FinancialFlexibility,
    InsightCategory::DividendSustainability,
    InsightCategory::DebtServiceCapability,
];

impl InsightCategory {
    /// Returns the categories of a statement type, in display order.
    #[must_use]
    pub const fn for_statement(statement_type: StatementType) -> &'static [Self] {
        match statement_type {
            StatementType::IncomeStatement => INCOME_STATEMENT_CATEGORIES,
            StatementType::BalanceSheet => BALANCE_SHEET_CATEGORIES,
            StatementType::CashFlow => CASH_FLOW_CATEGORIES,
        }
    }

    /// Returns every category across all statement types.
    pub fn all() -> impl Iterator<Item = Self> {
        StatementType::ALL
            .into_iter()
            .flat_map(|t| Self::for_statement(t).iter().copied())
    }

    /// Returns the category key, unique within its statement type.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::RevenueHealth => "revenue_health",
            Self::OperationalEfficiency | Self::AssetEfficiency => "operational_efficiency",
            Self::RAndDFocus => "r_and_d_focus",
            Self::DebtManagement => "debt_management",
            Self::ProfitRetention => "profit_retention",
            Self::LiquidityPosition => "liquidity_position",
            Self::CapitalStructure => "capital_structure",
            Self::InventoryManagement => "inventory_management",
            Self::OverallSolvency => "overall_solvency",
            Self::OperationalCashEfficiency => "operational_cash_efficiency",
            Self::InvestmentCapability => "investment_capability",
            Self::FinancialFlexibility => "financial_flexibility",
            Self::DividendSustainability => "dividend_sustainability",
            Self::DebtServiceCapability => "debt_service_capability",
        }
    }

    /// Returns the display title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::RevenueHealth => "Revenue Health",
            Self::OperationalEfficiency | Self::AssetEfficiency => "Operational Efficiency",
            Self::RAndDFocus => "R&D Focus",
            Self::DebtManagement => "Debt Management",
            Self::ProfitRetention => "Profit Retention",
            Self::LiquidityPosition => "Liquidity Position",
            Self::CapitalStructure => "Capital Structure",
            Self::InventoryManagement => "Inventory Management",
            Self::OverallSolvency => "Overall Solvency",
            Self::OperationalCashEfficiency => "Operational Cash Efficiency",
            Self::InvestmentCapability => "Investment Capability",
            Self::FinancialFlexibility => "Financial Flexibility",
            Self::DividendSustainability => "Dividend Sustainability",
            Self::DebtServiceCapability => "Debt Service Capability",
        }
    }

    /// Returns the statement type this category belongs to.
    #[must_use]
    pub const fn statement_type(&self) -> StatementType {
        match self {
            Self::RevenueHealth
            | Self::OperationalEfficiency
            | Self::RAndDFocus
            | Self::DebtManagement
            | Self::ProfitRetention => StatementType::IncomeStatement,
            Self::LiquidityPosition
            | Self::AssetEfficiency
            | Self::CapitalStructure
            | Self::InventoryManagement
            | Self::OverallSolvency => StatementType::BalanceSheet,
            Self::OperationalCashEfficiency
            | Self::InvestmentCapability
            | Self::FinancialFlexibility
            | Self::DividendSustainability
            | Self::DebtServiceCapability => StatementType::CashFlow,
        }
    }

    /// Looks up a category by statement type and key.
    #[must_use]
    pub fn from_key(statement_type: StatementType, key: &str) -> Option<Self> {
        Self::for_statement(statement_type)
            .iter()
            .find(|c| c.key() == key)
            .copied()
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.statement_type(), self.key())
    }
}

impl FromStr for InsightCategory {
    type Err = InsightError;

    /// Parses `statement.key` (e.g. `balance_sheet.operational_efficiency`) or
    /// a bare key that is unique across statement types.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((statement, key)) = s.split_once('.') {
            let statement_type: StatementType = statement.parse()?;
            return Self::from_key(statement_type, key).ok_or_else(|| {
                InsightError::InvalidParameter(format!("Unknown {statement_type} insight: {key}"))
            });
        }

        let mut matches = Self::all().filter(|c| c.key() == s);
        match (matches.next(), matches.next()) {
            (Some(category), None) => Ok(category),
            (Some(_), Some(_)) => Err(InsightError::InvalidParameter(format!(
                "Ambiguous insight: {s}. Qualify it with a statement type, e.g. income_statement.{s}"
            ))),
            (None, _) => Err(InsightError::InvalidParameter(format!("Unknown insight: {s}"))),
        }
    }
}

/// The set of insight categories a caller enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSelection(BTreeSet<InsightCategory>);

impl InsightSelection {
    /// Creates a selection with every category enabled.
    #[must_use]
    pub fn all() -> Self {
        Self(InsightCategory::all().collect())
    }

    /// Creates a selection with no category enabled.
    #[must_use]
    pub const fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Enables a category.
    #[must_use]
    pub fn enable(mut self, category: InsightCategory) -> Self {
        self.0.insert(category);
        self
    }

    /// Disables a category.
    #[must_use]
    pub fn disable(mut self, category: InsightCategory) -> Self {
        self.0.remove(&category);
        self
    }

    /// Returns true if the category is enabled.
    #[must_use]
    pub fn is_enabled(&self, category: InsightCategory) -> bool {
        self.0.contains(&category)
    }

    /// Returns the enabled categories of a statement type, in display order.
    #[must_use]
    pub fn for_statement(&self, statement_type: StatementType) -> Vec<InsightCategory> {
        InsightCategory::for_statement(statement_type)
            .iter()
            .filter(|c| self.is_enabled(**c))
            .copied()
            .collect()
    }

    /// Returns true if any category of the statement type is enabled.
    #[must_use]
    pub fn any_for(&self, statement_type: StatementType) -> bool {
        InsightCategory::for_statement(statement_type)
            .iter()
            .any(|c| self.is_enabled(*c))
    }

    /// Returns the number of enabled categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<InsightCategory> for InsightSelection {
    fn from_iter<I: IntoIterator<Item = InsightCategory>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Generated narrative for one category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// The category.
    pub category: InsightCategory,
    /// Narrative text returned by the narrative service.
    pub text: String,
    /// Name of the chart series that illustrates this insight, if any.
    pub chart: Option<String>,
}

/// An enabled category whose narrative could not be generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnavailableInsight {
    /// The category.
    pub category: InsightCategory,
    /// Why generation failed.
    pub reason: String,
}

/// Metrics, charts and narratives for one statement of one ticker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InsightBundle {
    /// Stock symbol.
    pub symbol: Symbol,
    /// The statement this bundle describes.
    pub statement_type: StatementType,
    /// Metrics for the statement.
    pub metrics: MetricSet,
    /// Generated insights, in category display order.
    pub insights: Vec<Insight>,
    /// Chart series by name.
    pub charts: BTreeMap<String, ChartSeries>,
    /// Enabled categories that were not generated, with the cause.
    pub unavailable: Vec<UnavailableInsight>,
}

impl InsightBundle {
    /// Creates a bundle with no insights or charts.
    #[must_use]
    pub const fn new(symbol: Symbol, statement_type: StatementType, metrics: MetricSet) -> Self {
        Self {
            symbol,
            statement_type,
            metrics,
            insights: Vec::new(),
            charts: BTreeMap::new(),
            unavailable: Vec::new(),
        }
    }

    /// Returns the generated insight for a category.
    #[must_use]
    pub fn insight(&self, category: InsightCategory) -> Option<&Insight> {
        self.insights.iter().find(|i| i.category == category)
    }

    /// Returns the narrative text for a category key (e.g. `revenue_health`).
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.insights
            .iter()
            .find(|i| i.category.key() == key)
            .map(|i| i.text.as_str())
    }

    /// Returns a chart series by name.
    #[must_use]
    pub fn chart(&self, name: &str) -> Option<&ChartSeries> {
        self.charts.get(name)
    }

    /// Returns the chart illustrating a category's generated insight.
    #[must_use]
    pub fn chart_for(&self, category: InsightCategory) -> Option<&ChartSeries> {
        self.insight(category)
            .and_then(|i| i.chart.as_deref())
            .and_then(|name| self.chart(name))
    }

    /// Returns the reason a category was not generated, if it failed.
    #[must_use]
    pub fn unavailable_reason(&self, category: InsightCategory) -> Option<&str> {
        self.unavailable
            .iter()
            .find(|u| u.category == category)
            .map(|u| u.reason.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_categories_per_statement() {
        for statement_type in StatementType::ALL {
            let categories = InsightCategory::for_statement(statement_type);
            assert_eq!(categories.len(), 5);
            for c in categories {
                assert_eq!(c.statement_type(), statement_type);
            }
        }
        assert_eq!(InsightCategory::all().count(), 15);
    }

    #[test]
    fn test_keys_unique_within_statement() {
        for statement_type in StatementType::ALL {
            let keys: BTreeSet<&str> = InsightCategory::for_statement(statement_type)
                .iter()
                .map(|c| c.key())
                .collect();
            assert_eq!(keys.len(), 5);
        }
    }

    #[test]
    fn test_parse_qualified_and_bare_keys() {
        assert_eq!(
            "revenue_health".parse::<InsightCategory>().unwrap(),
            InsightCategory::RevenueHealth
        );
        assert_eq!(
            "balance_sheet.operational_efficiency"
                .parse::<InsightCategory>()
                .unwrap(),
            InsightCategory::AssetEfficiency
        );
        assert!("operational_efficiency".parse::<InsightCategory>().is_err());
        assert!("cash_flow.revenue_health".parse::<InsightCategory>().is_err());
    }

    #[test]
    fn test_selection_filters_by_statement() {
        let selection = InsightSelection::none()
            .enable(InsightCategory::DebtManagement)
            .enable(InsightCategory::RevenueHealth)
            .enable(InsightCategory::OverallSolvency);

        assert_eq!(
            selection.for_statement(StatementType::IncomeStatement),
            vec![InsightCategory::RevenueHealth, InsightCategory::DebtManagement]
        );
        assert!(selection.any_for(StatementType::BalanceSheet));
        assert!(!selection.any_for(StatementType::CashFlow));

        let selection = selection.disable(InsightCategory::OverallSolvency);
        assert!(!selection.any_for(StatementType::BalanceSheet));
        assert_eq!(InsightSelection::all().len(), 15);
    }

    #[test]
    fn test_bundle_lookup_is_uniform_across_statements() {
        let mut bundle = InsightBundle::new(
            Symbol::new("IBM"),
            StatementType::BalanceSheet,
            MetricSet::undefined(StatementType::BalanceSheet),
        );
        bundle.insights.push(Insight {
            category: InsightCategory::AssetEfficiency,
            text: "Assets are used efficiently.".to_string(),
            chart: None,
        });

        assert_eq!(bundle.text("operational_efficiency"), Some("Assets are used efficiently."));
        assert!(bundle.insight(InsightCategory::LiquidityPosition).is_none());
        assert!(bundle.chart_for(InsightCategory::AssetEfficiency).is_none());
    }
}
