//! Chart series types.

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};

/// Shape of a chart series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// One point per reported period, in chronological order (bar chart).
    Trend,
    /// Breakdown of a single period into sub-categories (donut chart).
    Composition,
}

/// One point of a chart series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Fiscal period end the value belongs to.
    pub period: NaiveDate,
    /// Point label: the period for trends, the sub-category for compositions.
    pub label: String,
    /// The value, `None` when the provider did not report it.
    pub value: Option<f64>,
    /// Share of the positive total, set on composition points only.
    #[serde(default)]
    pub share: Option<f64>,
}

/// A named, chart-ready series extracted from a statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Series name (e.g. `total_revenue`, `asset_composition`).
    pub name: String,
    /// Chart title.
    pub title: String,
    /// Trend or composition.
    pub kind: SeriesKind,
    /// Points in display order.
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: SeriesKind) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            kind,
            points: Vec::new(),
        }
    }

    /// Appends a point.
    pub fn push(&mut self, period: NaiveDate, label: impl Into<String>, value: Option<f64>) {
        self.points.push(ChartPoint {
            period,
            label: label.into(),
            value,
            share: None,
        });
    }

    /// Sets each point's share of the sum of positive values.
    ///
    /// Missing, zero and negative values get no share; so does every point
    /// when the total is zero.
    pub fn fill_shares(&mut self) {
        let total: f64 = self.points.iter().filter_map(|p| p.value).filter(|v| *v > 0.0).sum();
        for point in &mut self.points {
            point.share = point.value.filter(|v| *v > 0.0 && total > 0.0).map(|v| v / total);
        }
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the values in display order.
    #[must_use]
    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Returns true if at least one point has a value.
    #[must_use]
    pub fn has_values(&self) -> bool {
        self.points.iter().any(|p| p.value.is_some())
    }

    /// Converts the series to a DataFrame with columns `period`, `label`, `value`, `share`.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let periods: Vec<NaiveDate> = self.points.iter().map(|p| p.period).collect();
        let labels: Vec<&str> = self.points.iter().map(|p| p.label.as_str()).collect();
        let shares: Vec<Option<f64>> = self.points.iter().map(|p| p.share).collect();

        DataFrame::new(vec![
            Column::new("period".into(), periods),
            Column::new("label".into(), labels),
            Column::new("value".into(), self.values()),
            Column::new("share".into(), shares),
        ])
        .map_err(|e| InsightError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_to_dataframe_keeps_nulls() {
        let d = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let mut series = ChartSeries::new("debt_structure", "Debt Structure", SeriesKind::Composition);
        series.push(d, "short_term_debt", Some(10.0));
        series.push(d, "long_term_debt", None);

        assert_eq!(series.len(), 2);
        assert!(series.has_values());

        let df = series.to_dataframe().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("value").unwrap().null_count(), 1);
        assert_eq!(df.column("share").unwrap().null_count(), 2);
    }

    #[test]
    fn test_fill_shares() {
        let d = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let mut series = ChartSeries::new("asset_composition", "Asset Composition", SeriesKind::Composition);
        series.push(d, "cash", Some(300.0));
        series.push(d, "inventory", Some(100.0));
        series.push(d, "goodwill", None);
        series.push(d, "writedowns", Some(-50.0));
        series.fill_shares();

        let shares: Vec<Option<f64>> = series.points.iter().map(|p| p.share).collect();
        assert_eq!(shares, vec![Some(0.75), Some(0.25), None, None]);

        let mut zero = ChartSeries::new("debt_structure", "Debt Structure", SeriesKind::Composition);
        zero.push(d, "total_liabilities", Some(0.0));
        zero.fill_shares();
        assert_eq!(zero.points[0].share, None);
    }
}
