use crate::chart::ChartSink;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::fetch::{Backend, DataFetcher, Notice};
use crate::filter::{
    salesmen_for_region, FilterDispatcher, FilterEvent, FilterOptions, FilterState, OptionRefresh,
};
use crate::kpi::{Achievement, KpiCard};
use crate::pipeline::{build_family, fetch_family, ChartFamily};
use crate::profit::ProfitSeries;
use crate::schema::Selection;
use crate::topn::{TopSet, TopSetCache, TopSetKey};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

pub const PROFIT_CHART_ID: &str = "profit.monthly";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone, Default)]
pub struct RedrawReport {
    pub sequence: u64,
    pub rendered: Vec<String>,
    /// Charts whose render target does not exist.
    pub skipped: Vec<String>,
    pub achievement: Option<Achievement>,
    pub kpi_cards: Vec<KpiCard>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub enum RedrawOutcome {
    Rendered(RedrawReport),
    /// A newer redraw started while this one was in flight; its results were dropped.
    Superseded { sequence: u64, latest: u64 },
}

impl RedrawOutcome {
    pub fn report(&self) -> Option<&RedrawReport> {
        match self {
            RedrawOutcome::Rendered(report) => Some(report),
            RedrawOutcome::Superseded { .. } => None,
        }
    }
}

/// Wires filter events to fetching, derivation and the chart sink.
///
/// All mutation of filter state goes through [`Dashboard::dispatch`]. Each redraw works
/// on its own snapshot and is tagged with a sequence number; a redraw that finishes after
/// a newer one started renders nothing and its notices are dropped with it.
pub struct Dashboard<B, S> {
    config: DashboardConfig,
    backend: B,
    dispatcher: Mutex<FilterDispatcher>,
    top_sets: Mutex<TopSetCache>,
    sink: Mutex<S>,
    families: Vec<ChartFamily>,
}

impl<B: Backend, S: ChartSink> Dashboard<B, S> {
    pub fn new(config: DashboardConfig, backend: B, sink: S) -> Result<Self> {
        config.validate()?;
        let families = vec![
            ChartFamily::daily(config.daily_year, config.daily_month)?,
            ChartFamily::monthly(),
            ChartFamily::yearly(config.years.clone())?,
        ];

        let mut dispatcher = FilterDispatcher::new(FilterState::default());
        dispatcher.options_mut().salesmen =
            salesmen_for_region(&config.region_salesmen, &Selection::All);

        Ok(Self {
            config,
            backend,
            dispatcher: Mutex::new(dispatcher),
            top_sets: Mutex::new(TopSetCache::new()),
            sink: Mutex::new(sink),
            families,
        })
    }

    pub fn filters(&self) -> FilterState {
        lock(&self.dispatcher).state().clone()
    }

    pub fn options(&self) -> FilterOptions {
        lock(&self.dispatcher).options().clone()
    }

    pub fn families(&self) -> &[ChartFamily] {
        &self.families
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// A fetcher whose notices belong to one unit of work.
    fn session(&self) -> DataFetcher<&B> {
        DataFetcher::new(&self.backend)
    }

    pub fn with_sink<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.sink))
    }

    /// Loads the selector option lists and returns the notices of failed fetches.
    /// Customer names depend on the customer group, so they are fetched after the group list.
    pub async fn init_controls(&self) -> Vec<Notice> {
        let fetcher = self.session();
        let (product_groups, customer_groups) =
            futures::join!(fetcher.product_groups(), fetcher.customer_groups());
        {
            let mut dispatcher = lock(&self.dispatcher);
            let options = dispatcher.options_mut();
            options.product_groups = product_groups;
            options.customer_groups = customer_groups;
        }
        let customer_group = lock(&self.dispatcher).state().sold_to_group.clone();
        self.refresh_options(&fetcher, OptionRefresh::CustomerNames { customer_group })
            .await;
        fetcher.take_notices()
    }

    /// Applies a UI event, reloads dependent option lists in order, then redraws. Notices
    /// from the option reloads are reported with the redraw.
    pub async fn dispatch(&self, event: FilterEvent) -> RedrawOutcome {
        let refreshes = lock(&self.dispatcher).apply(event);
        let fetcher = self.session();
        for refresh in refreshes {
            self.refresh_options(&fetcher, refresh).await;
        }
        let mut outcome = self.redraw().await;
        if let RedrawOutcome::Rendered(report) = &mut outcome {
            let mut notices = fetcher.take_notices();
            notices.append(&mut report.notices);
            report.notices = notices;
        }
        outcome
    }

    async fn refresh_options(&self, fetcher: &DataFetcher<&B>, refresh: OptionRefresh) {
        let mut scope = self.filters();
        match refresh {
            OptionRefresh::Salesmen { region } => {
                let names = salesmen_for_region(&self.config.region_salesmen, &region);
                lock(&self.dispatcher).options_mut().salesmen = names;
            }
            OptionRefresh::CustomerNames { customer_group } => {
                scope.sold_to_group = customer_group;
                let names = fetcher.customer_names(&scope).await;
                lock(&self.dispatcher).options_mut().customer_names = names;
            }
            OptionRefresh::ShipToNames {
                customer,
                customer_group,
            } => {
                scope.sold_to = customer;
                scope.sold_to_group = customer_group;
                let names = fetcher.ship_to_names(&scope).await;
                lock(&self.dispatcher).options_mut().ship_to_names = names;
            }
            OptionRefresh::Patterns { product_group } => {
                scope.product_group = product_group;
                let names = fetcher.patterns(&scope).await;
                lock(&self.dispatcher).options_mut().patterns = names;
            }
        }
    }

    /// Returns the cached top set for the ranking-relevant filters, fetching it on a miss.
    pub async fn ensure_top_set(&self, filters: &FilterState) -> Arc<TopSet> {
        self.top_set_with(&self.session(), filters).await
    }

    async fn top_set_with(&self, fetcher: &DataFetcher<&B>, filters: &FilterState) -> Arc<TopSet> {
        let key = TopSetKey::from_filters(filters);
        if let Some(set) = lock(&self.top_sets).lookup(&key) {
            debug!("Top set cache hit ({} labels)", set.len());
            return set;
        }
        let set = fetcher.fetch_top_set(filters, self.config.top_n).await;
        lock(&self.top_sets).store(key, set)
    }

    /// Forces the next top-10 redraw to re-rank, e.g. after the backend data changed.
    pub fn invalidate_top_set(&self) {
        lock(&self.top_sets).invalidate();
    }

    pub fn top_set_generation(&self) -> u64 {
        lock(&self.top_sets).generation()
    }

    fn latest_sequence(&self) -> u64 {
        lock(&self.dispatcher).latest_sequence()
    }

    pub async fn redraw(&self) -> RedrawOutcome {
        let snapshot = lock(&self.dispatcher).snapshot();
        let filters = &snapshot.filters;
        info!(
            "Redraw #{} (metric={}, group_by={})",
            snapshot.sequence,
            filters.metric.as_str(),
            filters.group_by.as_str()
        );

        let fetcher = self.session();
        let top_set = async {
            if filters.wants_top_reduction() {
                Some(self.top_set_with(&fetcher, filters).await)
            } else {
                None
            }
        };

        // The top set only matters once rows are aggregated, so it is fetched alongside them.
        let (top_set, inputs, profit_rows, kpi) = futures::join!(
            top_set,
            join_all(
                self.families
                    .iter()
                    .map(|family| fetch_family(&fetcher, family, filters))
            ),
            fetcher.profit_rows(filters),
            fetcher.kpi_snapshot(filters)
        );

        let latest = self.latest_sequence();
        if latest != snapshot.sequence {
            debug!(
                "Dropping redraw #{}, #{} is newer",
                snapshot.sequence, latest
            );
            return RedrawOutcome::Superseded {
                sequence: snapshot.sequence,
                latest,
            };
        }

        let monthly_axis = crate::axis::PeriodAxis::months();
        let profit = ProfitSeries::from_rows(&profit_rows, &monthly_axis);

        let mut report = RedrawReport {
            sequence: snapshot.sequence,
            kpi_cards: kpi.cards(filters),
            ..Default::default()
        };

        let mut charts = Vec::new();
        for (family, inputs) in self.families.iter().zip(&inputs) {
            let built = build_family(
                family,
                inputs,
                filters,
                top_set.as_deref(),
                self.config.top_n,
            );
            if built.family == "daily" {
                report.achievement = built.achievement;
            }
            charts.extend(built.charts);
        }
        charts.push((
            PROFIT_CHART_ID.to_string(),
            profit.chart(monthly_axis.labels().to_vec()),
        ));

        {
            let mut sink = lock(&self.sink);
            for (id, chart) in charts {
                if sink.has_target(&id) {
                    sink.render(&id, chart);
                    report.rendered.push(id);
                } else {
                    debug!("No render target '{}', skipping", id);
                    report.skipped.push(id);
                }
            }
        }

        report.notices = fetcher.take_notices();
        if !report.notices.is_empty() {
            warn!(
                "Redraw #{} finished with {} degraded fetches",
                snapshot.sequence,
                report.notices.len()
            );
        }
        RedrawOutcome::Rendered(report)
    }
}
