//! Cumulative and percent-of-total variants of per-group series.
//!
//! The transforms on [`GroupSeries`] are total: a period whose total is zero yields 0%
//! for every group. Gaps (`None`) only come from a [`PresenceMask`], applied last and
//! identically to every view in [`DerivedViews`].

use crate::aggregator::{GroupSeries, PresenceMask};
use crate::utils::round2;
use serde::Serialize;

/// A series that may carry gaps for unobserved periods.
pub type MaskedSeries = Vec<Option<f64>>;

pub fn cumulative(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |run, v| {
            *run += v;
            Some(*run)
        })
        .collect()
}

pub fn cumulative_groups(series: &GroupSeries) -> GroupSeries {
    series.map_series(cumulative)
}

/// Share of each group in its period's total, rounded to two decimals.
pub fn percent_of_total(series: &GroupSeries) -> GroupSeries {
    let totals = series.totals_per_period();
    series.map_series(|values| {
        values
            .iter()
            .zip(&totals)
            .map(|(v, total)| {
                if *total == 0.0 {
                    0.0
                } else {
                    round2(v / total * 100.0)
                }
            })
            .collect()
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSeries {
    pub label: String,
    pub values: MaskedSeries,
}

fn masked_groups(series: &GroupSeries, mask: &PresenceMask) -> Vec<LabeledSeries> {
    series
        .iter()
        .map(|(label, values)| LabeledSeries {
            label: label.to_string(),
            values: mask.apply(values),
        })
        .collect()
}

/// Every view one chart family renders from a single [`GroupSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub total: MaskedSeries,
    pub cumulative_total: MaskedSeries,
    pub stacked: Vec<LabeledSeries>,
    pub stacked_percent: Vec<LabeledSeries>,
    pub stacked_cumulative: Vec<LabeledSeries>,
    pub stacked_cumulative_percent: Vec<LabeledSeries>,
    /// Unmasked running total, used for achievement figures.
    #[serde(skip)]
    pub cumulative_total_raw: Vec<f64>,
}

impl DerivedViews {
    pub fn derive(series: &GroupSeries, mask: &PresenceMask) -> Self {
        let totals = series.totals_per_period();
        let cumulative_total_raw = cumulative(&totals);
        let cum = cumulative_groups(series);

        Self {
            total: mask.apply(&totals),
            cumulative_total: mask.apply(&cumulative_total_raw),
            stacked: masked_groups(series, mask),
            stacked_percent: masked_groups(&percent_of_total(series), mask),
            stacked_cumulative: masked_groups(&cum, mask),
            stacked_cumulative_percent: masked_groups(&percent_of_total(&cum), mask),
            cumulative_total_raw,
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.stacked.iter().map(|s| s.label.as_str())
    }
}
