//! One pipeline for every chart family.
//!
//! Daily, monthly and yearly charts differ only in their axis, their endpoints and whether
//! unobserved periods render as gaps; [`ChartFamily`] carries exactly that.

use crate::aggregator::{aggregate, GroupSeries, PresenceMask};
use crate::axis::PeriodAxis;
use crate::chart::{ChartData, Dataset, TARGET_COLOR};
use crate::derive::{cumulative, DerivedViews};
use crate::error::Result;
use crate::fetch::{Backend, DataFetcher};
use crate::filter::FilterState;
use crate::kpi::Achievement;
use crate::query::Endpoint;
use crate::schema::{BreakdownRow, PeriodRow, TOTAL_LABEL};
use crate::topn::{reduce_to_top, TopSet};
use log::debug;
use std::sync::Arc;

const TOTAL_COLOR: &str = "#a78bfa";
const CUMULATIVE_COLOR: &str = "#0ea5a3";

#[derive(Debug, Clone, PartialEq)]
pub struct ChartFamily {
    pub name: &'static str,
    pub title: &'static str,
    pub axis: PeriodAxis,
    pub totals: Endpoint,
    pub breakdown: Endpoint,
    pub target: Endpoint,
    /// Render periods without source rows as gaps instead of zeros.
    pub mask_gaps: bool,
}

impl ChartFamily {
    pub fn daily(year: i32, month: u32) -> Result<Self> {
        Ok(Self {
            name: "daily",
            title: "Daily",
            axis: PeriodAxis::days(year, month)?,
            totals: Endpoint::DailySales,
            breakdown: Endpoint::DailyBreakdown,
            target: Endpoint::DailyTarget,
            mask_gaps: true,
        })
    }

    pub fn monthly() -> Self {
        Self {
            name: "monthly",
            title: "Monthly",
            axis: PeriodAxis::months(),
            totals: Endpoint::MonthlySales,
            breakdown: Endpoint::MonthlyBreakdown,
            target: Endpoint::MonthlyTarget,
            mask_gaps: false,
        }
    }

    pub fn yearly(years: Vec<i32>) -> Result<Self> {
        Ok(Self {
            name: "yearly",
            title: "Yearly",
            axis: PeriodAxis::years(years)?,
            totals: Endpoint::YearlySales,
            breakdown: Endpoint::YearlyBreakdown,
            target: Endpoint::YearlyTarget,
            mask_gaps: false,
        })
    }

    pub fn chart_id(&self, view: View) -> String {
        format!("{}.{}", self.name, view.suffix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Total,
    Cumulative,
    Stacked,
    StackedPercent,
    StackedCumulative,
    StackedCumulativePercent,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Total,
        View::Cumulative,
        View::Stacked,
        View::StackedPercent,
        View::StackedCumulative,
        View::StackedCumulativePercent,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            View::Total => "total",
            View::Cumulative => "cumulative",
            View::Stacked => "stacked",
            View::StackedPercent => "stacked_percent",
            View::StackedCumulative => "stacked_cumulative",
            View::StackedCumulativePercent => "stacked_cumulative_percent",
        }
    }
}

/// Raw rows for one family, as fetched.
#[derive(Debug, Clone, Default)]
pub struct FamilyInputs {
    pub breakdown: Vec<BreakdownRow>,
    /// Only consulted when the breakdown is empty.
    pub totals: Vec<PeriodRow>,
    pub targets: Vec<PeriodRow>,
}

#[derive(Debug, Clone)]
pub struct FamilyCharts {
    pub family: &'static str,
    pub series: GroupSeries,
    pub views: DerivedViews,
    pub target: Option<Vec<f64>>,
    pub achievement: Option<Achievement>,
    pub charts: Vec<(String, ChartData)>,
}

impl FamilyCharts {
    pub fn chart(&self, id: &str) -> Option<&ChartData> {
        self.charts.iter().find(|(i, _)| i == id).map(|(_, c)| c)
    }
}

fn as_line(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// Pure half of the pipeline: aggregate, reduce, derive, lay out charts.
pub fn build_family(
    family: &ChartFamily,
    inputs: &FamilyInputs,
    filters: &FilterState,
    top_set: Option<&TopSet>,
    top_n: usize,
) -> FamilyCharts {
    let axis = &family.axis;

    let (mut series, coverage) = if inputs.breakdown.is_empty() {
        debug!(
            "{} breakdown empty, falling back to {} total rows",
            family.name,
            inputs.totals.len()
        );
        (
            aggregate(&inputs.totals, axis),
            PresenceMask::from_rows(&inputs.totals, axis),
        )
    } else {
        (
            aggregate(&inputs.breakdown, axis),
            PresenceMask::from_rows(&inputs.breakdown, axis),
        )
    };

    if let Some(top) = top_set.filter(|_| filters.wants_top_reduction()) {
        series = reduce_to_top(&series, top, top_n);
    }

    let mask = if family.mask_gaps {
        coverage.clone()
    } else {
        PresenceMask::full(axis.len())
    };
    let views = DerivedViews::derive(&series, &mask);

    let target = if inputs.targets.is_empty() {
        None
    } else {
        let targets = aggregate(&inputs.targets, axis);
        Some(
            targets
                .get(TOTAL_LABEL)
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| vec![0.0; axis.len()]),
        )
    };
    let cumulative_target = target.as_deref().map(cumulative);

    let achievement = match (coverage.last_observed(), &cumulative_target) {
        (Some(last), Some(cum_target)) => {
            Achievement::compute(views.cumulative_total_raw[last], Some(cum_target[last]))
        }
        _ => None,
    };

    let unit = filters.metric.unit_label();
    let labels = axis.labels().to_vec();
    let mut charts = Vec::with_capacity(View::ALL.len());

    let mut total = ChartData::new(format!("{} {}", family.title, unit), labels.clone())
        .with_dataset(Dataset::bar(
            format!("{} {}", family.title, unit),
            views.total.clone(),
            TOTAL_COLOR,
        ));
    let mut cum = ChartData::new(format!("Cumulative {}", unit), labels.clone()).with_dataset(
        Dataset::bar(
            format!("Cumulative {}", unit),
            views.cumulative_total.clone(),
            CUMULATIVE_COLOR,
        ),
    );
    if let (Some(t), Some(ct)) = (&target, &cumulative_target) {
        total = total.with_dataset(Dataset::line(
            format!("{} Target", family.title),
            as_line(t),
            TARGET_COLOR,
        ));
        cum = cum.with_dataset(Dataset::line(
            "Cumulative Target",
            as_line(ct),
            TARGET_COLOR,
        ));
    }
    charts.push((family.chart_id(View::Total), total));
    charts.push((family.chart_id(View::Cumulative), cum));
    charts.push((
        family.chart_id(View::Stacked),
        ChartData::stacked(
            format!("{} by {}", family.title, filters.group_by.as_str()),
            labels.clone(),
            &views.stacked,
        ),
    ));
    charts.push((
        family.chart_id(View::StackedPercent),
        ChartData::stacked(format!("{} %", family.title), labels.clone(), &views.stacked_percent)
            .with_y_max(100.0),
    ));
    charts.push((
        family.chart_id(View::StackedCumulative),
        ChartData::stacked(
            format!("Cumulative by {}", family.title),
            labels.clone(),
            &views.stacked_cumulative,
        ),
    ));
    charts.push((
        family.chart_id(View::StackedCumulativePercent),
        ChartData::stacked("Cumulative %", labels, &views.stacked_cumulative_percent)
            .with_y_max(100.0),
    ));

    FamilyCharts {
        family: family.name,
        series,
        views,
        target,
        achievement,
        charts,
    }
}

/// Fetches one family's rows. Breakdown and target are requested concurrently; the
/// totals endpoint is only hit when the breakdown is empty.
pub async fn fetch_family<B: Backend>(
    fetcher: &DataFetcher<B>,
    family: &ChartFamily,
    filters: &FilterState,
) -> FamilyInputs {
    let (breakdown, targets) = futures::join!(
        fetcher.breakdown_rows(family.breakdown, filters, filters.group_by),
        fetcher.period_rows(family.target, filters)
    );

    let totals = if breakdown.is_empty() {
        fetcher.period_rows(family.totals, filters).await
    } else {
        Vec::new()
    };

    FamilyInputs {
        breakdown,
        totals,
        targets,
    }
}

pub async fn run_family<B: Backend>(
    fetcher: &DataFetcher<B>,
    family: &ChartFamily,
    filters: &FilterState,
    top_set: Option<Arc<TopSet>>,
    top_n: usize,
) -> FamilyCharts {
    let inputs = fetch_family(fetcher, family, filters).await;
    build_family(family, &inputs, filters, top_set.as_deref(), top_n)
}
