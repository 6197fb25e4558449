//! Raw financial statement types.
//!
//! A [`RawStatement`] is the provider's data for one statement type and one
//! ticker: every reported fiscal period, ordered chronologically, mapped to
//! the line items reported for that period. Values are kept exactly as
//! reported, with missing or unparsable figures stored as `None`.

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{InsightError, Result};
use crate::types::{PeriodType, StatementType, Symbol};

/// Line items reported for a single fiscal period.
///
/// Names follow the provider's field names (e.g. `totalRevenue`, `netIncome`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItems(BTreeMap<String, Option<f64>>);

impl LineItems {
    /// Creates an empty set of line items.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a line item value, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.0.insert(name.into(), value);
    }

    /// Sets a line item value, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, Some(value));
        self
    }

    /// Returns the value of a line item.
    ///
    /// Absent items, reported nulls and non-finite values all read as `None`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied().flatten().filter(|v| v.is_finite())
    }

    /// Returns true if the line item is reported for this period, even as null.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the number of reported line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no line items are reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, Option<f64>)> for LineItems {
    fn from_iter<I: IntoIterator<Item = (String, Option<f64>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// All reported periods of one financial statement for one ticker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Which statement this is.
    pub statement_type: StatementType,
    /// Annual or quarterly reporting.
    pub period_type: PeriodType,
    periods: BTreeMap<NaiveDate, LineItems>,
}

impl RawStatement {
    /// Creates an empty statement.
    #[must_use]
    pub const fn new(symbol: Symbol, statement_type: StatementType, period_type: PeriodType) -> Self {
        Self {
            symbol,
            statement_type,
            period_type,
            periods: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) the line items for a period.
    pub fn insert_period(&mut self, period_end: NaiveDate, items: LineItems) {
        self.periods.insert(period_end, items);
    }

    /// Adds the line items for a period, returning `self` for chaining.
    #[must_use]
    pub fn with_period(mut self, period_end: NaiveDate, items: LineItems) -> Self {
        self.insert_period(period_end, items);
        self
    }

    /// Returns the number of reported periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Returns true if no periods are reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Returns an iterator over periods in chronological order.
    pub fn periods(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, &LineItems)> {
        self.periods.iter().map(|(d, items)| (*d, items))
    }

    /// Returns the line items for a specific period end.
    #[must_use]
    pub fn period(&self, period_end: NaiveDate) -> Option<&LineItems> {
        self.periods.get(&period_end)
    }

    /// Returns the most recent period and its line items.
    #[must_use]
    pub fn latest(&self) -> Option<(NaiveDate, &LineItems)> {
        self.periods.iter().next_back().map(|(d, items)| (*d, items))
    }

    /// Returns the most recent period end date.
    #[must_use]
    pub fn latest_period(&self) -> Option<NaiveDate> {
        self.periods.keys().next_back().copied()
    }

    /// Returns a line item's value for every period, in chronological order.
    ///
    /// Periods that do not report the item yield `None`; no period is dropped.
    #[must_use]
    pub fn series(&self, line_item: &str) -> Vec<(NaiveDate, Option<f64>)> {
        self.periods
            .iter()
            .map(|(d, items)| (*d, items.get(line_item)))
            .collect()
    }

    /// Returns the union of line item names across all periods.
    #[must_use]
    pub fn line_item_names(&self) -> BTreeSet<&str> {
        self.periods
            .values()
            .flat_map(|items| items.0.keys().map(String::as_str))
            .collect()
    }

    /// Converts the statement to a DataFrame.
    ///
    /// Columns: `period` (date) followed by one nullable `f64` column per line
    /// item. Rows are in chronological order.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let dates: Vec<NaiveDate> = self.periods.keys().copied().collect();
        let mut columns = vec![Column::new("period".into(), dates)];

        for name in self.line_item_names() {
            let values: Vec<Option<f64>> = self.periods.values().map(|i| i.get(name)).collect();
            columns.push(Column::new(name.into(), values));
        }

        DataFrame::new(columns).map_err(|e| InsightError::Other(e.to_string()))
    }
}
