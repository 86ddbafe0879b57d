use crate::axis::PeriodAxis;
use crate::error::{DashboardError, Result};
use crate::schema::SeriesRow;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Per-group dense series over one period axis.
///
/// Groups keep the order in which they were first seen. Every array has the same length.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GroupSeries {
    period_len: usize,
    groups: Vec<String>,
    values: Vec<Vec<f64>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GroupSeries {
    pub fn new(period_len: usize) -> Self {
        Self {
            period_len,
            ..Default::default()
        }
    }

    pub fn period_len(&self) -> usize {
        self.period_len
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn get(&self, label: &str) -> Option<&[f64]> {
        self.index.get(label).map(|&i| self.values[i].as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.groups
            .iter()
            .zip(&self.values)
            .map(|(g, v)| (g.as_str(), v.as_slice()))
    }

    /// Registers a zero-filled group if it is not known yet.
    pub fn ensure_group(&mut self, label: &str) -> usize {
        if let Some(&i) = self.index.get(label) {
            return i;
        }
        let i = self.groups.len();
        self.groups.push(label.to_string());
        self.values.push(vec![0.0; self.period_len]);
        self.index.insert(label.to_string(), i);
        i
    }

    /// Accumulates into a slot; out-of-range slots are ignored.
    pub fn add(&mut self, label: &str, slot: usize, value: f64) {
        if slot >= self.period_len {
            return;
        }
        let i = self.ensure_group(label);
        self.values[i][slot] += value;
    }

    /// Replaces (or appends) a whole group array.
    pub fn insert(&mut self, label: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.period_len {
            return Err(DashboardError::InvalidAxis(format!(
                "group '{}' has {} slots, axis has {}",
                label,
                values.len(),
                self.period_len
            )));
        }
        let i = self.ensure_group(label);
        self.values[i] = values;
        Ok(())
    }

    /// Sum across groups for every slot.
    pub fn totals_per_period(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.period_len];
        for series in &self.values {
            for (t, v) in totals.iter_mut().zip(series) {
                *t += v;
            }
        }
        totals
    }

    /// Sum across the whole axis for each group, in group order.
    pub fn group_totals(&self) -> Vec<(String, f64)> {
        self.iter()
            .map(|(g, v)| (g.to_string(), v.iter().sum()))
            .collect()
    }

    /// Applies `f` to every group array, keeping labels and order.
    pub fn map_series<F>(&self, f: F) -> GroupSeries
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let mut out = GroupSeries::new(self.period_len);
        for (g, v) in self.iter() {
            let mapped = f(v);
            let i = out.ensure_group(g);
            out.values[i] = mapped;
        }
        out
    }
}

/// Pivots flat rows into one dense array per group over `axis`.
pub fn aggregate<R: SeriesRow>(rows: &[R], axis: &PeriodAxis) -> GroupSeries {
    aggregate_with(rows, axis.len(), |period| axis.index_of(period))
}

/// Same as [`aggregate`] with an explicit period extractor.
///
/// Groups are registered in order of first appearance even when all of their rows fall
/// outside the axis. Rows with no readable period or an out-of-range slot are dropped.
pub fn aggregate_with<R, F>(rows: &[R], period_len: usize, slot_of: F) -> GroupSeries
where
    R: SeriesRow,
    F: Fn(i64) -> Option<usize>,
{
    let mut series = GroupSeries::new(period_len);
    let mut dropped = 0usize;

    for row in rows {
        let group = series.ensure_group(row.group_label());
        match row.period().and_then(&slot_of) {
            Some(slot) if slot < period_len => series.values[group][slot] += row.value(),
            _ => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            "Dropped {} of {} rows outside the {}-slot axis",
            dropped,
            rows.len(),
            period_len
        );
    }

    series
}

/// Which slots had at least one source row.
///
/// Derived once per redraw from the raw rows, then applied to every derived view so a
/// gap in one chart is a gap in all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceMask {
    observed: Vec<bool>,
}

impl PresenceMask {
    pub fn from_rows<R: SeriesRow>(rows: &[R], axis: &PeriodAxis) -> Self {
        let mut observed = vec![false; axis.len()];
        for slot in rows
            .iter()
            .filter_map(|r| r.period().and_then(|p| axis.index_of(p)))
        {
            observed[slot] = true;
        }
        Self { observed }
    }

    /// A mask with every slot observed, for views that never render gaps.
    pub fn full(period_len: usize) -> Self {
        Self {
            observed: vec![true; period_len],
        }
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn is_observed(&self, slot: usize) -> bool {
        self.observed.get(slot).copied().unwrap_or(false)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.iter().filter(|o| **o).count()
    }

    pub fn last_observed(&self) -> Option<usize> {
        self.observed.iter().rposition(|o| *o)
    }

    pub fn apply(&self, values: &[f64]) -> Vec<Option<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| self.is_observed(i).then_some(*v))
            .collect()
    }
}
