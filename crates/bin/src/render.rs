//! Plain-text rendering of reports.

use std::fmt::{self, Write};

use finsight::{
    ChartSeries, CompanyOverview, InsightBundle, InsightSelection, MetricFormat, MetricValue,
    NewsDigest, Report, SeriesKind, StatementType, SymbolMatch,
};

/// Shown in place of an enabled insight without text.
pub(crate) const NOT_GENERATED: &str = "This insight has not been generated";

const RULE: &str = "──────────────────────────────────────────────────────────────";

/// Formats a number with two decimals and thousands separators.
pub(crate) fn format_number(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Formats a metric value: ratios at two decimals, currency amounts with `$`.
pub(crate) fn format_metric(value: &MetricValue) -> String {
    match (value.value, value.metric.format()) {
        (None, _) => "N/A".to_string(),
        (Some(v), MetricFormat::Ratio) => format!("{v:.2}"),
        (Some(v), MetricFormat::Currency) if v < 0.0 => format!("-${}", format_number(-v)),
        (Some(v), MetricFormat::Currency) => format!("${}", format_number(v)),
    }
}

fn header(out: &mut impl Write, title: &str) -> fmt::Result {
    writeln!(out, "\n{RULE}\n {title}\n{RULE}")
}

fn render_overview(out: &mut impl Write, overview: &CompanyOverview) -> fmt::Result {
    header(out, &format!("{} ({})", overview.name, overview.symbol))?;
    let rows = [
        ("Exchange", Some(overview.exchange.as_str())),
        ("Currency", Some(overview.currency.as_str())),
        ("Sector", Some(overview.sector.as_str())),
        ("Industry", Some(overview.industry.as_str())),
        ("Country", Some(overview.country.as_str())),
        ("Address", overview.address.as_deref()),
        ("Fiscal year end", overview.fiscal_year_end.as_deref()),
        ("Latest quarter", overview.latest_quarter.as_deref()),
    ];
    for (label, value) in rows {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            writeln!(out, "  {label:<18}{value}")?;
        }
    }
    if let Some(cap) = overview.market_capitalization {
        writeln!(out, "  {:<18}${}", "Market cap", format_number(cap))?;
    }
    if let Some(description) = &overview.description {
        writeln!(out, "\n  {description}")?;
    }
    Ok(())
}

fn render_chart(out: &mut impl Write, series: &ChartSeries) -> fmt::Result {
    writeln!(out, "  {}", series.title)?;
    if series.is_empty() {
        return writeln!(out, "    (no data)");
    }

    for point in &series.points {
        let value = point.value.map_or_else(|| "N/A".to_string(), format_number);
        match (series.kind, point.share) {
            (SeriesKind::Composition, Some(share)) => {
                writeln!(out, "    {:<32}{value:>22}  {:>6.1}%", point.label, share * 100.0)?;
            }
            _ => writeln!(out, "    {:<32}{value:>22}", point.label)?,
        }
    }
    Ok(())
}

fn render_bundle(out: &mut impl Write, bundle: &InsightBundle, selection: &InsightSelection) -> fmt::Result {
    writeln!(out, "\n  Key metrics")?;
    for value in bundle.metrics.iter() {
        writeln!(out, "    {:<36}{:>20}", value.metric.label(), format_metric(value))?;
    }

    for category in selection.for_statement(bundle.statement_type) {
        writeln!(out, "\n  {}", category.title())?;
        let text = bundle.insight(category).map_or(NOT_GENERATED, |i| i.text.as_str());
        for line in text.lines() {
            writeln!(out, "    {line}")?;
        }
        if let Some(series) = bundle.chart_for(category) {
            writeln!(out)?;
            render_chart(out, series)?;
        }
    }
    Ok(())
}

fn render_news(out: &mut impl Write, news: &NewsDigest) -> fmt::Result {
    header(out, "News")?;
    if news.is_empty() {
        return writeln!(out, "  No recent articles");
    }
    for article in &news.articles {
        let score = article
            .sentiment_score
            .map_or_else(|| "N/A".to_string(), |s| format!("{s:.2}"));
        let label = article.sentiment_label.as_deref().unwrap_or("");
        writeln!(out, "  {score:>6}  {label:<18}{}", article.title)?;
        if !article.url.is_empty() {
            writeln!(out, "  {:>6}  {:<18}{}", "", "", article.url)?;
        }
    }
    match (news.mean_sentiment_score, news.mean_sentiment_class) {
        (Some(score), Some(class)) => writeln!(out, "\n  Mean sentiment: {score:.2} ({class})"),
        _ => writeln!(out, "\n  Mean sentiment: N/A"),
    }
}

/// Text view of a report; statements without enabled categories are omitted.
#[derive(Debug)]
pub(crate) struct ReportView<'a> {
    report: &'a Report,
    selection: &'a InsightSelection,
}

impl<'a> ReportView<'a> {
    pub(crate) const fn new(report: &'a Report, selection: &'a InsightSelection) -> Self {
        Self { report, selection }
    }
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_overview(f, &self.report.overview)?;

        for statement_type in StatementType::ALL {
            if !self.selection.any_for(statement_type) {
                continue;
            }
            header(f, statement_type.title())?;
            match self.report.bundle(statement_type) {
                Some(bundle) => render_bundle(f, bundle, self.selection)?,
                None => writeln!(f, "  No {} data available", statement_type.title())?,
            }
        }

        if let Some(news) = &self.report.news {
            render_news(f, news)?;
        }
        Ok(())
    }
}

/// Text view of symbol search results.
#[derive(Debug)]
pub(crate) struct MatchesView<'a>(pub(crate) &'a [SymbolMatch]);

impl fmt::Display for MatchesView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No matching symbols");
        }
        for m in self.0 {
            writeln!(
                f,
                "{:<12}{:<40}{:<20}{:<6}{:>6.2}",
                m.symbol.as_str(),
                m.name,
                m.region,
                m.currency,
                m.match_score
            )?;
        }
        Ok(())
    }
}
