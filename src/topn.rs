use crate::aggregator::GroupSeries;
use crate::filter::FilterState;
use crate::normalize::normalize_label;
use crate::schema::{Metric, Selection, OTHER_LABEL};
use log::debug;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_TOP_N: usize = 10;

/// Label of the folded tail when a kept group is already named [`OTHER_LABEL`].
pub const OTHER_TAIL_LABEL: &str = "Other (rest)";

/// The filter dimensions that change who the top customers are.
///
/// The grouping dimension, the selected customer and the display mode are left out: the
/// ranking must not move when the caller only changes how the data is shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TopSetKey {
    pub metric: Metric,
    pub category: Selection,
    pub region: Selection,
    pub salesman: Selection,
    pub sold_to_group: Selection,
    pub product_group: Selection,
    pub ship_to: Selection,
    pub pattern: Selection,
}

impl TopSetKey {
    pub fn from_filters(filters: &FilterState) -> Self {
        Self {
            metric: filters.metric,
            category: filters.category.clone(),
            region: filters.region.clone(),
            salesman: filters.salesman.clone(),
            sold_to_group: filters.sold_to_group.clone(),
            product_group: filters.product_group.clone(),
            ship_to: filters.ship_to.clone(),
            pattern: filters.pattern.clone(),
        }
    }
}

/// Reference cohort of customer labels, stored normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopSet {
    members: HashSet<String>,
    ordered: Vec<String>,
}

impl TopSet {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = TopSet::default();
        for label in labels {
            let norm = normalize_label(label.as_ref());
            if !norm.is_empty() && set.members.insert(norm.clone()) {
                set.ordered.push(norm);
            }
        }
        set
    }

    pub fn contains(&self, label: &str) -> bool {
        self.members.contains(&normalize_label(label))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Normalized labels in ranking order.
    pub fn labels(&self) -> &[String] {
        &self.ordered
    }
}

/// Ranks labels by total, descending, keeping first-seen order for ties.
pub fn rank_by_total(totals: Vec<(String, f64)>, n: usize) -> Vec<String> {
    let mut ranked = totals;
    // sort_by is stable, so equal totals keep encounter order.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(label, _)| label).collect()
}

/// Collapses `series` to at most `n` groups plus a trailing `"Other"`.
///
/// Groups are kept when they belong to `top`. When `top` shares nothing with the current
/// groups the top `n` by total are kept instead. `"Other"` is only emitted when it has a
/// non-zero slot.
pub fn reduce_to_top(series: &GroupSeries, top: &TopSet, n: usize) -> GroupSeries {
    if series.is_empty() {
        return series.clone();
    }

    let mut keep: Vec<String> = series
        .groups()
        .iter()
        .filter(|g| top.contains(g))
        .take(n)
        .cloned()
        .collect();

    if keep.is_empty() {
        debug!(
            "Top set ({} labels) shares nothing with {} groups, ranking by totals",
            top.len(),
            series.group_count()
        );
        keep = rank_by_total(series.group_totals(), n);
    }

    let kept: HashSet<&str> = keep.iter().map(String::as_str).collect();
    let mut other = vec![0.0; series.period_len()];
    for (label, values) in series.iter() {
        if !kept.contains(label) {
            for (o, v) in other.iter_mut().zip(values) {
                *o += v;
            }
        }
    }

    let mut out = GroupSeries::new(series.period_len());
    for label in &keep {
        if let Some(values) = series.get(label) {
            out.ensure_group(label);
            for (slot, v) in values.iter().enumerate() {
                out.add(label, slot, *v);
            }
        }
    }
    if other.iter().any(|v| *v != 0.0) {
        // A kept customer may itself be called "Other"; the tail must not merge into it.
        let other_label = if out.contains(OTHER_LABEL) {
            OTHER_TAIL_LABEL
        } else {
            OTHER_LABEL
        };
        out.ensure_group(other_label);
        for (slot, v) in other.into_iter().enumerate() {
            out.add(other_label, slot, v);
        }
    }
    out
}

#[derive(Debug, Clone)]
struct CachedTopSet {
    key: TopSetKey,
    set: Arc<TopSet>,
    generation: u64,
}

/// Memoized top set for one key at a time.
///
/// A lookup under a different key misses; storing under a new key bumps the generation
/// so stale sets are never handed out for another filter combination.
#[derive(Debug, Default)]
pub struct TopSetCache {
    entry: Option<CachedTopSet>,
    generation: u64,
}

impl TopSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, key: &TopSetKey) -> Option<Arc<TopSet>> {
        self.entry
            .as_ref()
            .filter(|e| &e.key == key)
            .map(|e| Arc::clone(&e.set))
    }

    pub fn store(&mut self, key: TopSetKey, set: TopSet) -> Arc<TopSet> {
        self.generation += 1;
        let set = Arc::new(set);
        self.entry = Some(CachedTopSet {
            key,
            set: Arc::clone(&set),
            generation: self.generation,
        });
        set
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the stored entry, if it was stored under `key`.
    pub fn entry_generation(&self, key: &TopSetKey) -> Option<u64> {
        self.entry
            .as_ref()
            .filter(|e| &e.key == key)
            .map(|e| e.generation)
    }
}
