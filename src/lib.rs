//! # Sales Series Builder
//!
//! Reshapes row-oriented sales query results into the dense, chart-ready series a sales
//! analytics dashboard renders: daily, monthly and yearly totals, cumulative totals and
//! grouped stacked views, absolute and as percent of the period total.
//!
//! ## Core Concepts
//!
//! - **Period Axis**: Fixed slots for days of a month, the 12 months or an explicit year list
//! - **Group Series**: One dense row per group label, in first-seen order
//! - **Presence Mask**: Which periods had source rows; unobserved periods render as gaps
//! - **Top Set**: Reference top-N customers, cached per filter combination, used to fold the
//!   long tail into `"Other"`
//! - **Filter Dispatcher**: Single owner of the filter state; cascades resets and tags each
//!   redraw with a sequence number
//!
//! ## Example
//!
//! ```rust,ignore
//! use sales_series_builder::*;
//!
//! let axis = PeriodAxis::months();
//! let rows = vec![
//!     BreakdownRow::new(1, "A", 10.0),
//!     BreakdownRow::new(1, "B", 30.0),
//!     BreakdownRow::new(2, "A", 5.0),
//! ];
//!
//! let views = process_breakdown(&rows, &axis, false);
//! assert_eq!(views.stacked_percent[0].values[0], Some(25.0));
//! ```
//!
//! With a backend, [`Dashboard`] drives the whole flow:
//!
//! ```rust,ignore
//! let dashboard = Dashboard::new(DashboardConfig::default(), backend, sink)?;
//! dashboard.init_controls().await;
//! dashboard.dispatch(FilterEvent::SetGroupBy(GroupBy::SoldTo)).await;
//! ```

pub mod aggregator;
pub mod axis;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod derive;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod kpi;
pub mod normalize;
pub mod pipeline;
pub mod profit;
pub mod query;
pub mod schema;
pub mod topn;
pub mod utils;

#[cfg(feature = "http")]
pub mod http;

pub use aggregator::{aggregate, aggregate_with, GroupSeries, PresenceMask};
pub use axis::{AxisKind, PeriodAxis, DAY_SLOTS};
pub use chart::{ChartData, ChartSink, Dataset, DatasetKind, MemorySink};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, RedrawOutcome, RedrawReport, PROFIT_CHART_ID};
pub use derive::{DerivedViews, LabeledSeries, MaskedSeries};
pub use error::{DashboardError, Result};
pub use fetch::{Backend, DataFetcher, Notice};
pub use filter::{
    FilterDispatcher, FilterEvent, FilterField, FilterOptions, FilterSnapshot, FilterState,
    OptionRefresh,
};
pub use kpi::{Achievement, AchievementStatus, KpiCard, KpiSnapshot};
pub use normalize::{labels_match, normalize_label};
pub use pipeline::{build_family, run_family, ChartFamily, FamilyCharts, FamilyInputs, View};
pub use profit::{ProfitRow, ProfitSeries};
pub use query::{Endpoint, Query};
pub use schema::*;
pub use topn::{reduce_to_top, TopSet, TopSetCache, TopSetKey, DEFAULT_TOP_N, OTHER_TAIL_LABEL};
pub use utils::*;

#[cfg(feature = "http")]
pub use http::HttpBackend;

use log::debug;

pub struct SeriesProcessor;

impl SeriesProcessor {
    /// Aggregates breakdown rows over `axis` and derives every chart view.
    ///
    /// With `mask_gaps`, periods without any source row come out as `None` in every view;
    /// otherwise they are zero.
    pub fn process(rows: &[BreakdownRow], axis: &PeriodAxis, mask_gaps: bool) -> DerivedViews {
        let series = aggregate(rows, axis);
        debug!(
            "Aggregated {} rows into {} groups over {} periods",
            rows.len(),
            series.group_count(),
            axis.len()
        );
        let mask = if mask_gaps {
            PresenceMask::from_rows(rows, axis)
        } else {
            PresenceMask::full(axis.len())
        };
        DerivedViews::derive(&series, &mask)
    }

    /// Like [`SeriesProcessor::process`], but folds groups outside `top` into `"Other"`.
    pub fn process_top(
        rows: &[BreakdownRow],
        axis: &PeriodAxis,
        top: &TopSet,
        n: usize,
    ) -> DerivedViews {
        let series = reduce_to_top(&aggregate(rows, axis), top, n);
        DerivedViews::derive(&series, &PresenceMask::full(axis.len()))
    }
}

pub fn process_breakdown(rows: &[BreakdownRow], axis: &PeriodAxis, mask_gaps: bool) -> DerivedViews {
    SeriesProcessor::process(rows, axis, mask_gaps)
}
