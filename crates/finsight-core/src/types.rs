//! Core identifier types.
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`StatementType`] - Income statement, balance sheet or cash flow
//! - [`PeriodType`] - Annual or quarterly reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InsightError;

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// The three financial statements a company reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    /// Income statement (revenue, expenses, profit).
    IncomeStatement,
    /// Balance sheet (assets, liabilities, equity).
    BalanceSheet,
    /// Cash flow statement.
    CashFlow,
}

impl StatementType {
    /// All statement types in report order.
    pub const ALL: [Self; 3] = [Self::IncomeStatement, Self::BalanceSheet, Self::CashFlow];

    /// Returns the snake_case identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
        }
    }

    /// Returns the display title.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "Income Statement",
            Self::BalanceSheet => "Balance Sheet",
            Self::CashFlow => "Cash Flow",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "income_statement" | "income" => Ok(Self::IncomeStatement),
            "balance_sheet" | "balance" => Ok(Self::BalanceSheet),
            "cash_flow" | "cashflow" => Ok(Self::CashFlow),
            other => Err(InsightError::InvalidParameter(format!(
                "Unknown statement type: {other}. Supported: income_statement, balance_sheet, cash_flow"
            ))),
        }
    }
}

/// Period type for fundamental financial data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// Annual reporting period.
    #[default]
    Annual,
    /// Quarterly reporting period.
    Quarterly,
}

impl FromStr for PeriodType {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annual" | "yearly" => Ok(Self::Annual),
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            other => Err(InsightError::InvalidParameter(format!(
                "Unknown period type: {other}. Supported: annual, quarterly"
            ))),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual => f.write_str("annual"),
            Self::Quarterly => f.write_str("quarterly"),
        }
    }
}
