//! Dashboard assembly: KPIs plus every chart as an aggregate or a "no data" notice.
//!
//! Each chart is gated by [`is_plottable`] before the aggregation engine runs,
//! and an empty filtered view short-circuits the whole dashboard.

use crate::aggregate::{aggregate, melt, AggregationResult, Kpis};
use crate::guard::is_plottable;
use crate::schema::{Dataset, Field, Value};
use serde::Serialize;
use std::fmt;
use tracing::debug;

pub const EMPTY_VIEW_NOTICE: &str =
    "No rows after applying filters. Try changing filters or upload a different file.";

const DEGREE_TYPE: &str = "Degree Type";
const DEGREE: &str = "Degree";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Histogram,
    FacetedHistogram,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartOutcome {
    Ready { aggregate: AggregationResult },
    NoData { reason: String },
}

impl ChartOutcome {
    fn no_data(reason: impl Into<String>) -> Self {
        ChartOutcome::NoData { reason: reason.into() }
    }

    /// Ready unless the aggregate came out empty.
    fn from_aggregate(aggregate: AggregationResult, empty_reason: &str) -> Self {
        if aggregate.is_empty() {
            Self::no_data(empty_reason)
        } else {
            ChartOutcome::Ready { aggregate }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub outcome: ChartOutcome,
}

/// First rows of the filtered view, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: usize,
    pub kpis: Kpis,
    pub average_year_joined_display: String,
    pub charts: Vec<Chart>,
    pub preview: Preview,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Dashboard {
    Empty { notice: String },
    Ready(Report),
}

/// Build the dashboard for an already-filtered `view`.
///
/// `has_years` says whether the full dataset carries any year data; without
/// it the hiring trend chart is skipped outright.
pub fn build(view: &Dataset, has_years: bool, preview_rows: usize) -> Dashboard {
    if view.is_empty() {
        debug!("filtered view is empty, skipping aggregation");
        return Dashboard::Empty {
            notice: EMPTY_VIEW_NOTICE.to_string(),
        };
    }

    let firm = Field::FirmName.name();
    let mut charts = vec![team_size_chart(view), hiring_trend_chart(view, has_years)];

    for (field, title) in [
        (Field::HarmonizedTitle, "Harmonized Title Distribution"),
        (Field::HarmonizedTeam, "Harmonized Team Distribution"),
        (Field::HarmonizedSubTeam, "Harmonized Sub-team Distribution"),
        (Field::CurrentOffice, "Office Location Distribution"),
    ] {
        charts.push(histogram(view, field.name(), firm, title));
    }
    charts.push(education_chart(view));
    charts.push(histogram(
        view,
        Field::CommitteeMemberships.name(),
        firm,
        "Committee Membership Counts",
    ));

    let kpis = Kpis::compute(view);
    Dashboard::Ready(Report {
        rows: view.len(),
        average_year_joined_display: kpis.average_year_display(),
        kpis,
        charts,
        preview: Preview {
            columns: view.columns.clone(),
            rows: view
                .records
                .iter()
                .take(preview_rows)
                .map(|r| r.values.clone())
                .collect(),
        },
    })
}

fn count_field() -> &'static str {
    Field::Name.name()
}

fn team_size_chart(view: &Dataset) -> Chart {
    let firm = Field::FirmName.name();
    let outcome = if is_plottable(view, firm) {
        ChartOutcome::from_aggregate(
            aggregate(view, &[firm], count_field()),
            "No 'Firm Name' data to show Team Size.",
        )
    } else {
        ChartOutcome::no_data("No 'Firm Name' data to show Team Size.")
    };
    Chart {
        title: "Team Size by Firm".to_string(),
        kind: ChartKind::Bar,
        outcome,
    }
}

fn hiring_trend_chart(view: &Dataset, has_years: bool) -> Chart {
    let year = Field::YearJoined.name();
    let outcome = if !has_years {
        ChartOutcome::no_data("No 'Year Joined' data available for Hiring Trends.")
    } else {
        let mut trend = aggregate(view, &[year, Field::FirmName.name()], count_field());
        trend.groups.retain(|g| !g.key[0].is_missing());
        ChartOutcome::from_aggregate(trend, "Year data exists but no valid points after filtering.")
    };
    Chart {
        title: "Hiring Trends Over Time".to_string(),
        kind: ChartKind::Line,
        outcome,
    }
}

/// Counts of `x`, split by `color` when the view has that column.
fn histogram(view: &Dataset, x: &str, color: &str, title: &str) -> Chart {
    let outcome = if !is_plottable(view, x) {
        ChartOutcome::no_data(format!("Skipping '{}': no data for column '{}'.", title, x))
    } else {
        let dims: Vec<&str> = if view.has_column(color) { vec![x, color] } else { vec![x] };
        ChartOutcome::from_aggregate(
            aggregate(view, &dims, count_field()),
            &format!("Skipping '{}': no data for column '{}'.", title, x),
        )
    };
    Chart {
        title: title.to_string(),
        kind: ChartKind::Histogram,
        outcome,
    }
}

fn education_chart(view: &Dataset) -> Chart {
    let title = "Education Background Comparison".to_string();
    let degree_fields: Vec<&str> = [Field::MastersDegree, Field::Undergraduate]
        .into_iter()
        .map(Field::name)
        .filter(|f| is_plottable(view, f))
        .collect();

    if degree_fields.is_empty() {
        return Chart {
            title,
            kind: ChartKind::FacetedHistogram,
            outcome: ChartOutcome::no_data("No 'Masters Degree' or 'Undergraduate' data available."),
        };
    }

    let firm = Field::FirmName.name();
    let long = melt(view, &[firm], &degree_fields, DEGREE_TYPE, DEGREE);
    let outcome = if long.is_empty() || !is_plottable(&long, DEGREE) {
        ChartOutcome::no_data("No education data available to plot.")
    } else {
        // Melted rows carry no identifier, so count on the degree type column
        ChartOutcome::from_aggregate(
            aggregate(&long, &[DEGREE, firm, DEGREE_TYPE], DEGREE_TYPE),
            "No education data available to plot.",
        )
    };
    Chart {
        title,
        kind: ChartKind::FacetedHistogram,
        outcome,
    }
}

/// Plain-text rendering for terminals.
pub fn render_text(dashboard: &Dashboard) -> String {
    dashboard.to_string()
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = match self {
            Dashboard::Empty { notice } => return writeln!(f, "{}", notice),
            Dashboard::Ready(report) => report,
        };

        writeln!(f, "Rows after filters: {}", report.rows)?;
        writeln!(f, "Total Team Members: {}", report.kpis.total_members)?;
        writeln!(f, "Avg. Year Joined:   {}", report.average_year_joined_display)?;
        writeln!(f, "No. of Offices:     {}", report.kpis.offices)?;
        writeln!(f, "Unique Titles:      {}", report.kpis.titles)?;

        for chart in &report.charts {
            writeln!(f)?;
            writeln!(f, "== {} ==", chart.title)?;
            match &chart.outcome {
                ChartOutcome::NoData { reason } => writeln!(f, "  {}", reason)?,
                ChartOutcome::Ready { aggregate } => {
                    writeln!(f, "  {} | Count", aggregate.dimensions.join(" | "))?;
                    for group in &aggregate.groups {
                        let key: Vec<String> = group.key.iter().map(Value::to_string).collect();
                        writeln!(f, "  {} | {}", key.join(" | "), group.count)?;
                    }
                }
            }
        }
        Ok(())
    }
}
