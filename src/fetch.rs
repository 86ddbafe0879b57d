use crate::error::Result;
use crate::filter::FilterState;
use crate::kpi::KpiSnapshot;
use crate::normalize::normalize_label;
use crate::profit::ProfitRow;
use crate::query::{Endpoint, Query};
use crate::schema::{BreakdownRow, GroupBy, PeriodRow, RankedCustomer, SeriesRow, ALL};
use crate::topn::{rank_by_total, TopSet};
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// The query side of the sales backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Runs one query and returns the decoded JSON body. Non-success statuses are errors.
    async fn get_json(&self, query: &Query) -> Result<Value>;
}

#[async_trait]
impl<'a, T: Backend + ?Sized + 'a> Backend for &'a T {
    async fn get_json(&self, query: &Query) -> Result<Value> {
        (**self).get_json(query).await
    }
}

/// A non-blocking warning for the user, raised when a fetch degraded to empty data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub endpoint: Endpoint,
    pub message: String,
}

/// Translates filter snapshots into backend queries. Failures never escape: they turn
/// into an empty result plus a [`Notice`].
///
/// Notices accumulate on the fetcher that raised them, so a fetcher over `&B` created for
/// one redraw scopes its notices to that redraw.
pub struct DataFetcher<B> {
    backend: B,
    notices: Mutex<Vec<Notice>>,
}

impl<B: Backend> DataFetcher<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Drains the notices raised since the last call.
    pub fn take_notices(&self) -> Vec<Notice> {
        let mut notices = self.notices.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *notices)
    }

    fn notify(&self, endpoint: Endpoint, message: String) {
        let mut notices = self.notices.lock().unwrap_or_else(|e| e.into_inner());
        notices.push(Notice { endpoint, message });
    }

    async fn try_fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<T> {
        let body = self.backend.get_json(query).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn fetch_or_default<T>(&self, query: Query) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.try_fetch(&query).await {
            Ok(value) => value,
            Err(err) => {
                warn!("Fetch {} failed, using empty result: {}", query.route(), err);
                self.notify(
                    query.endpoint,
                    format!("Failed: {} ({})", query.route(), err),
                );
                T::default()
            }
        }
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, query: Query) -> Vec<T> {
        let rows: Vec<T> = self.fetch_or_default(query.clone()).await;
        debug!("{} returned {} rows", query.route(), rows.len());
        rows
    }

    pub async fn product_groups(&self) -> Vec<String> {
        self.fetch_rows(Query::project(Endpoint::ProductGroups, &FilterState::default()))
            .await
    }

    pub async fn customer_groups(&self) -> Vec<String> {
        self.fetch_rows(Query::project(Endpoint::CustomerGroups, &FilterState::default()))
            .await
    }

    pub async fn customer_names(&self, filters: &FilterState) -> Vec<String> {
        self.fetch_rows(Query::project(Endpoint::CustomerNames, filters))
            .await
    }

    pub async fn ship_to_names(&self, filters: &FilterState) -> Vec<String> {
        self.fetch_rows(Query::project(Endpoint::ShipToNames, filters))
            .await
    }

    pub async fn patterns(&self, filters: &FilterState) -> Vec<String> {
        self.fetch_rows(Query::project(Endpoint::Patterns, filters))
            .await
    }

    /// `{period, value}` rows from a totals or target endpoint.
    pub async fn period_rows(&self, endpoint: Endpoint, filters: &FilterState) -> Vec<PeriodRow> {
        self.fetch_rows(Query::project(endpoint, filters)).await
    }

    pub async fn breakdown_rows(
        &self,
        endpoint: Endpoint,
        filters: &FilterState,
        group_by: GroupBy,
    ) -> Vec<BreakdownRow> {
        self.fetch_rows(Query::project(endpoint, filters).with_group_by(group_by))
            .await
    }

    pub async fn top_customers(&self, filters: &FilterState, n: usize) -> Vec<RankedCustomer> {
        self.fetch_rows(Query::project(Endpoint::TopCustomers, filters).with("n", n.to_string()))
            .await
    }

    pub async fn profit_rows(&self, filters: &FilterState) -> Vec<ProfitRow> {
        self.fetch_rows(Query::project(Endpoint::ProfitByMonth, filters))
            .await
    }

    pub async fn kpi_snapshot(&self, filters: &FilterState) -> KpiSnapshot {
        self.fetch_or_default(Query::project(Endpoint::KpiSnapshot, filters))
            .await
    }

    /// Reference top-`n` customers for the current filters.
    ///
    /// The ranking endpoint and the monthly customer breakdown are requested together;
    /// the breakdown is only used when the ranking comes back empty.
    pub async fn fetch_top_set(&self, filters: &FilterState, n: usize) -> TopSet {
        let fallback_query = Query::project(Endpoint::MonthlyBreakdown, filters)
            .with_group_by(GroupBy::SoldTo)
            .with("sold_to", ALL);

        let (ranked, breakdown): (Vec<RankedCustomer>, Vec<BreakdownRow>) = futures::join!(
            self.top_customers(filters, n),
            self.fetch_rows(fallback_query)
        );

        let names: Vec<String> = ranked.into_iter().filter_map(|r| r.name).collect();
        if !names.is_empty() {
            debug!("Top set from ranking endpoint: {} customers", names.len());
            return TopSet::from_labels(names);
        }

        debug!(
            "Ranking endpoint empty, ranking {} breakdown rows instead",
            breakdown.len()
        );
        TopSet::from_labels(rank_by_total(customer_totals(&breakdown), n))
    }
}

/// Sums each customer's value across all periods, keyed by normalized label, in
/// first-seen order.
pub fn customer_totals(rows: &[BreakdownRow]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let key = normalize_label(row.group_label());
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            totals.push((key, 0.0));
            totals.len() - 1
        });
        totals[slot].1 += row.value();
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use serde_json::json;

    struct FixedBackend {
        routes: HashMap<&'static str, Value>,
    }

    #[async_trait]
    impl Backend for FixedBackend {
        async fn get_json(&self, query: &Query) -> Result<Value> {
            self.routes
                .get(query.route())
                .cloned()
                .ok_or_else(|| DashboardError::HttpStatus {
                    endpoint: query.route().to_string(),
                    status: 500,
                })
        }
    }

    fn fetcher(routes: Vec<(&'static str, Value)>) -> DataFetcher<FixedBackend> {
        DataFetcher::new(FixedBackend {
            routes: routes.into_iter().collect(),
        })
    }

    #[tokio::test]
    async fn test_failure_degrades_to_empty_with_notice() {
        let f = fetcher(vec![]);
        let rows = f
            .period_rows(Endpoint::MonthlySales, &FilterState::default())
            .await;
        assert!(rows.is_empty());
        let notices = f.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].endpoint, Endpoint::MonthlySales);
        assert!(f.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_error_body_is_treated_as_failure() {
        let f = fetcher(vec![("/api/monthly_sales", json!({"error": "db down"}))]);
        let rows = f
            .period_rows(Endpoint::MonthlySales, &FilterState::default())
            .await;
        assert!(rows.is_empty());
        assert_eq!(f.take_notices().len(), 1);
    }

    #[tokio::test]
    async fn test_borrowed_backend_scopes_notices() {
        let backend = FixedBackend {
            routes: HashMap::new(),
        };
        let first = DataFetcher::new(&backend);
        let second = DataFetcher::new(&backend);
        first.product_groups().await;
        assert_eq!(first.take_notices().len(), 1);
        assert!(second.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_kpi_failure_is_default() {
        let f = fetcher(vec![]);
        let snapshot = f.kpi_snapshot(&FilterState::default()).await;
        assert_eq!(snapshot, KpiSnapshot::default());
    }

    #[tokio::test]
    async fn test_top_set_prefers_ranking_endpoint() {
        let f = fetcher(vec![
            ("/api/top_customers", json!([{"sold_to_name": "acme  ltd"}, {"name": "Beta"}])),
            ("/api/monthly_sales_breakdown", json!([{"month": 1, "group_label": "Zeta", "value": 1e6}])),
        ]);
        let top = f.fetch_top_set(&FilterState::default(), 10).await;
        assert!(top.contains("ACME LTD"));
        assert!(top.contains("beta"));
        assert!(!top.contains("Zeta"));
    }

    #[tokio::test]
    async fn test_top_set_falls_back_to_breakdown() {
        let f = fetcher(vec![
            ("/api/top_customers", json!([])),
            (
                "/api/monthly_sales_breakdown",
                json!([
                    {"month": 1, "group_label": "Small", "value": 1},
                    {"month": 1, "group_label": "Big", "value": 50},
                    {"month": 2, "group_label": "small ", "value": 100},
                    {"month": 3, "group_label": "Mid", "value": 60}
                ]),
            ),
        ]);
        let top = f.fetch_top_set(&FilterState::default(), 2).await;
        assert_eq!(top.labels(), &["SMALL".to_string(), "MID".to_string()]);
    }

    #[test]
    fn test_customer_totals_merge_normalized_labels() {
        let rows = vec![
            BreakdownRow::new(1, "Acme", 1.0),
            BreakdownRow::new(2, " ACME ", 2.0),
            BreakdownRow::new(2, "Beta", 5.0),
        ];
        assert_eq!(
            customer_totals(&rows),
            vec![("ACME".to_string(), 3.0), ("BETA".to_string(), 5.0)]
        );
    }
}
