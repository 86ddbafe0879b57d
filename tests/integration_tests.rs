use async_trait::async_trait;
use sales_series_builder::*;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

struct Route {
    path: &'static str,
    when: Option<(&'static str, &'static str)>,
    body: Value,
}

/// Serves canned JSON per route. Unknown routes answer with an empty list, failing routes
/// with a transport error. Every call yields once so concurrent redraws interleave; slow
/// routes yield more often before answering.
#[derive(Default)]
struct MockBackend {
    routes: Vec<Route>,
    failing: HashSet<&'static str>,
    slow: Vec<(&'static str, usize)>,
    fail_once: Mutex<Option<(&'static str, usize)>>,
    calls: Mutex<Vec<Query>>,
    events: Mutex<Vec<String>>,
}

impl MockBackend {
    fn new() -> Self {
        Self::default()
    }

    fn route(mut self, path: &'static str, body: Value) -> Self {
        self.routes.push(Route {
            path,
            when: None,
            body,
        });
        self
    }

    fn route_when(
        mut self,
        path: &'static str,
        param: &'static str,
        value: &'static str,
        body: Value,
    ) -> Self {
        self.routes.push(Route {
            path,
            when: Some((param, value)),
            body,
        });
        self
    }

    fn fail(mut self, path: &'static str) -> Self {
        self.failing.insert(path);
        self
    }

    fn slow(mut self, path: &'static str, yields: usize) -> Self {
        self.slow.push((path, yields));
        self
    }

    /// The first call to `path` waits `yields` turns and then fails; later calls succeed.
    fn fail_once_after(self, path: &'static str, yields: usize) -> Self {
        *self.fail_once.lock().unwrap() = Some((path, yields));
        self
    }

    fn event_index(&self, event: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }

    fn calls_to(&self, path: &str) -> Vec<Query> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.route() == path)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn get_json(&self, query: &Query) -> Result<Value> {
        let delayed_failure = {
            let mut fail_once = self.fail_once.lock().unwrap();
            match *fail_once {
                Some((path, yields)) if path == query.route() => {
                    *fail_once = None;
                    Some(yields)
                }
                _ => None,
            }
        };

        tokio::task::yield_now().await;
        self.calls.lock().unwrap().push(query.clone());
        self.events
            .lock()
            .unwrap()
            .push(format!("start {}", query.route()));

        let extra = self
            .slow
            .iter()
            .find(|(path, _)| *path == query.route())
            .map(|(_, yields)| *yields)
            .or(delayed_failure)
            .unwrap_or(0);
        for _ in 0..extra {
            tokio::task::yield_now().await;
        }
        self.events
            .lock()
            .unwrap()
            .push(format!("end {}", query.route()));

        if delayed_failure.is_some() || self.failing.contains(query.route()) {
            return Err(DashboardError::Transport {
                endpoint: query.route().to_string(),
                details: "connection refused".to_string(),
            });
        }

        let matched = self.routes.iter().find(|r| {
            r.path == query.route()
                && r.when
                    .map(|(param, value)| query.param(param) == Some(value))
                    .unwrap_or(true)
        });
        Ok(match matched {
            Some(route) => route.body.clone(),
            None if query.endpoint == Endpoint::KpiSnapshot => json!({}),
            None => json!([]),
        })
    }
}

fn all_targets() -> Vec<String> {
    let mut ids: Vec<String> = ["daily", "monthly", "yearly"]
        .iter()
        .flat_map(|family| {
            View::ALL
                .iter()
                .map(move |view| format!("{}.{}", family, view.suffix()))
        })
        .collect();
    ids.push(PROFIT_CHART_ID.to_string());
    ids
}

fn dashboard(backend: MockBackend) -> Dashboard<MockBackend, MemorySink> {
    Dashboard::new(
        DashboardConfig::default(),
        backend,
        MemorySink::with_targets(all_targets()),
    )
    .unwrap()
}

fn chart(dash: &Dashboard<MockBackend, MemorySink>, id: &str) -> ChartData {
    dash.with_sink(|sink| sink.chart(id).cloned())
        .unwrap_or_else(|| panic!("chart {} was not rendered", id))
}

fn dataset_labels(chart: &ChartData) -> Vec<&str> {
    chart.datasets.iter().map(|d| d.label.as_str()).collect()
}

fn rendered(outcome: RedrawOutcome) -> RedrawReport {
    match outcome {
        RedrawOutcome::Rendered(report) => report,
        other => panic!("expected a rendered redraw, got {:?}", other),
    }
}

fn customer_breakdown() -> Value {
    let rows: Vec<Value> = (0..12)
        .map(|i| json!({"month": 1, "group_label": format!("cust{}", i), "value": i + 1}))
        .collect();
    Value::Array(rows)
}

#[tokio::test]
async fn test_monthly_region_breakdown() {
    let backend = MockBackend::new().route(
        "/api/monthly_sales_breakdown",
        json!([
            {"month": 1, "group_label": "A", "value": 10},
            {"month": 1, "group_label": "B", "value": "30"},
            {"month": 2, "group_label": "A", "value": 5}
        ]),
    );
    let dash = dashboard(backend);

    let report = rendered(dash.redraw().await);
    assert_eq!(report.sequence, 1);
    assert!(report.skipped.is_empty());
    assert!(report.notices.is_empty());

    let total = chart(&dash, "monthly.total");
    assert_eq!(total.labels[0], "Jan");
    assert_eq!(total.datasets[0].data[0], Some(40.0));
    assert_eq!(total.datasets[0].data[1], Some(5.0));
    assert_eq!(total.datasets[0].data[11], Some(0.0));

    let pct = chart(&dash, "monthly.stacked_percent");
    assert_eq!(dataset_labels(&pct), vec!["A", "B"]);
    assert_eq!(pct.datasets[0].data[0], Some(25.0));
    assert_eq!(pct.datasets[1].data[0], Some(75.0));
    assert_eq!(pct.datasets[0].data[1], Some(100.0));
    assert_eq!(pct.datasets[1].data[1], Some(0.0));

    let stacked = chart(&dash, "monthly.stacked");
    let per_period: f64 = stacked.datasets.iter().filter_map(|d| d.data[0]).sum();
    assert_eq!(per_period, 40.0);

    // The breakdown was non-empty, so the totals endpoint was never hit.
    assert!(dash
        .backend()
        .calls_to("/api/monthly_sales")
        .is_empty());
}

#[tokio::test]
async fn test_daily_unobserved_days_render_as_gaps() {
    let targets: Vec<Value> = (1..=31).map(|d| json!({"day": d, "value": 50})).collect();
    let backend = MockBackend::new()
        .route(
            "/api/daily_sales_breakdown",
            json!([
                {"day": 1, "group_label": "NSW", "value": 40},
                {"day": 2, "group_label": "VIC", "value": 50}
            ]),
        )
        .route("/api/daily_target", Value::Array(targets));
    let dash = dashboard(backend);

    let report = rendered(dash.redraw().await);

    let total = chart(&dash, "daily.total");
    assert_eq!(total.labels.len(), 31);
    assert_eq!(total.labels[0], "01-07-25");
    assert_eq!(total.datasets[0].data[0], Some(40.0));
    assert_eq!(total.datasets[0].data[2], None);

    let cumulative = chart(&dash, "daily.cumulative");
    assert_eq!(cumulative.datasets[0].data[1], Some(90.0));
    assert_eq!(cumulative.datasets[0].data[2], None);

    for id in ["daily.stacked", "daily.stacked_percent", "daily.stacked_cumulative"] {
        let c = chart(&dash, id);
        assert!(c.datasets.iter().all(|d| d.data[2].is_none()), "{}", id);
    }

    let achievement = report.achievement.unwrap();
    assert_eq!(achievement.actual, 90.0);
    assert_eq!(achievement.target, 100.0);
    assert_eq!(achievement.percent, 90.0);
    assert_eq!(achievement.status, AchievementStatus::Ok);

    // Monthly keeps zeros for months without rows.
    let monthly = chart(&dash, "monthly.total");
    assert_eq!(monthly.datasets[0].data[3], Some(0.0));
}

#[tokio::test]
async fn test_empty_breakdown_falls_back_to_totals() {
    let backend = MockBackend::new().route(
        "/api/yearly_sales",
        json!([{"year": 2022, "value": 120}, {"year": 2024, "value": 80}]),
    );
    let dash = dashboard(backend);
    rendered(dash.redraw().await);

    let stacked = chart(&dash, "yearly.stacked");
    assert_eq!(dataset_labels(&stacked), vec!["Total"]);
    assert_eq!(stacked.labels, vec!["2021", "2022", "2023", "2024"]);
    assert_eq!(stacked.datasets[0].data, vec![Some(0.0), Some(120.0), Some(0.0), Some(80.0)]);

    let pct = chart(&dash, "yearly.stacked_percent");
    assert_eq!(pct.datasets[0].data[1], Some(100.0));
    assert_eq!(pct.datasets[0].data[0], Some(0.0));

    let cum = chart(&dash, "yearly.cumulative");
    assert_eq!(cum.datasets[0].data[3], Some(200.0));
}

#[tokio::test]
async fn test_top10_reduces_customers_and_caches_top_set() {
    let backend = MockBackend::new()
        .route(
            "/api/top_customers",
            json!([{"sold_to_name": "CUST11"}, {"sold_to_name": " cust10 "}]),
        )
        .route_when(
            "/api/monthly_sales_breakdown",
            "group_by",
            "sold_to",
            customer_breakdown(),
        );
    let dash = dashboard(backend);

    dash.dispatch(FilterEvent::SetGroupBy(GroupBy::SoldTo)).await;
    let all = chart(&dash, "monthly.stacked");
    assert_eq!(all.datasets.len(), 12);
    assert!(dash
        .backend()
        .calls_to("/api/top_customers")
        .is_empty());

    rendered(
        dash.dispatch(FilterEvent::SetDisplayMode(DisplayMode::Top10))
            .await,
    );
    let top = chart(&dash, "monthly.stacked");
    assert_eq!(dataset_labels(&top), vec!["cust10", "cust11", "Other"]);
    assert_eq!(top.datasets[2].data[0], Some(55.0));

    let total = chart(&dash, "monthly.total");
    assert_eq!(total.datasets[0].data[0], Some(78.0));

    let generation = dash.top_set_generation();
    rendered(dash.redraw().await);
    let ranking_calls = dash.backend().calls_to("/api/top_customers");
    assert_eq!(ranking_calls.len(), 1);
    assert_eq!(ranking_calls[0].param("n"), Some("10"));
    assert_eq!(ranking_calls[0].param("sold_to"), None);
    assert_eq!(dash.top_set_generation(), generation);

    // A ranking-relevant filter change invalidates the cached set.
    dash.dispatch(FilterEvent::SetCategory(Selection::only("Tiles")))
        .await;
    assert_eq!(dash.backend().calls_to("/api/top_customers").len(), 2);
    assert!(dash.top_set_generation() > generation);

    dash.invalidate_top_set();
    dash.redraw().await;
    assert_eq!(dash.backend().calls_to("/api/top_customers").len(), 3);
}

#[tokio::test]
async fn test_top_set_uses_breakdown_when_ranking_is_empty() {
    let backend = MockBackend::new().route_when(
        "/api/monthly_sales_breakdown",
        "group_by",
        "sold_to",
        customer_breakdown(),
    );
    let config = DashboardConfig {
        top_n: 2,
        ..Default::default()
    };
    let dash = Dashboard::new(config, backend, MemorySink::with_targets(all_targets())).unwrap();

    dash.dispatch(FilterEvent::SetGroupBy(GroupBy::SoldTo)).await;
    rendered(
        dash.dispatch(FilterEvent::SetDisplayMode(DisplayMode::Top10))
            .await,
    );

    let top = chart(&dash, "monthly.stacked");
    assert_eq!(dataset_labels(&top), vec!["cust10", "cust11", "Other"]);
    assert_eq!(top.datasets[2].data[0], Some(55.0));

    let fallback = dash
        .backend()
        .calls_to("/api/monthly_sales_breakdown")
        .into_iter()
        .filter(|q| q.param("sold_to") == Some(ALL))
        .count();
    assert!(fallback >= 1);
}

#[tokio::test]
async fn test_disjoint_top_set_ranks_current_groups() {
    let backend = MockBackend::new()
        .route("/api/top_customers", json!([{"name": "Nobody Here"}]))
        .route_when(
            "/api/monthly_sales_breakdown",
            "group_by",
            "sold_to",
            customer_breakdown(),
        );
    let config = DashboardConfig {
        top_n: 3,
        ..Default::default()
    };
    let dash = Dashboard::new(config, backend, MemorySink::with_targets(all_targets())).unwrap();

    dash.dispatch(FilterEvent::SetGroupBy(GroupBy::SoldTo)).await;
    dash.dispatch(FilterEvent::SetDisplayMode(DisplayMode::Top10))
        .await;

    let top = chart(&dash, "monthly.stacked");
    assert_eq!(
        dataset_labels(&top),
        vec!["cust11", "cust10", "cust9", "Other"]
    );
    assert_eq!(top.datasets[3].data[0], Some(45.0));
}

#[tokio::test]
async fn test_single_customer_skips_top_reduction() {
    let backend = MockBackend::new()
        .route("/api/top_customers", json!([{"name": "cust0"}]))
        .route_when(
            "/api/monthly_sales_breakdown",
            "group_by",
            "sold_to",
            json!([{"month": 2, "group_label": "cust5", "value": 9}]),
        );
    let dash = dashboard(backend);

    dash.dispatch(FilterEvent::SetGroupBy(GroupBy::SoldTo)).await;
    dash.dispatch(FilterEvent::SetDisplayMode(DisplayMode::Top10))
        .await;
    dash.dispatch(FilterEvent::SetCustomer(Selection::only("cust5")))
        .await;

    let stacked = chart(&dash, "monthly.stacked");
    assert_eq!(dataset_labels(&stacked), vec!["cust5"]);
}

#[tokio::test]
async fn test_customer_group_cascade() {
    let backend = MockBackend::new()
        .route_when("/api/sold_to_names", "sold_to_group", "Retail", json!(["Acme", "Beta"]))
        .route("/api/sold_to_names", json!(["Acme", "Beta", "Gamma"]))
        .route_when("/api/ship_to_names", "sold_to", "Acme", json!(["Acme North", "Acme South"]))
        .route("/api/product_group", json!(["Tiles", "Grout"]))
        .route("/api/sold_to_groups", json!(["Retail", "Trade"]));
    let dash = dashboard(backend);

    dash.init_controls().await;
    let options = dash.options();
    assert_eq!(options.product_groups, vec!["Tiles", "Grout"]);
    assert_eq!(options.customer_groups, vec!["Retail", "Trade"]);
    assert_eq!(options.customer_names.len(), 3);
    assert_eq!(options.salesmen.len(), 14);

    dash.dispatch(FilterEvent::SetCustomer(Selection::only("Acme")))
        .await;
    assert_eq!(dash.options().ship_to_names, vec!["Acme North", "Acme South"]);
    dash.dispatch(FilterEvent::SetShipTo(Selection::only("Acme North")))
        .await;
    assert_eq!(dash.filters().ship_to, Selection::only("Acme North"));

    dash.dispatch(FilterEvent::SetCustomerGroup(Selection::only("Retail")))
        .await;
    let filters = dash.filters();
    assert_eq!(filters.sold_to_group, Selection::only("Retail"));
    assert!(filters.sold_to.is_all());
    assert!(filters.ship_to.is_all());

    let options = dash.options();
    assert_eq!(options.customer_names, vec!["Acme", "Beta"]);
    assert!(options.ship_to_names.is_empty());

    // Dependent option lists load before the redraw that follows the event.
    let backend = dash.backend();
    let calls = backend.calls.lock().unwrap();
    let names_at = calls
        .iter()
        .rposition(|q| q.route() == "/api/sold_to_names")
        .unwrap();
    let redraw_at = calls
        .iter()
        .rposition(|q| q.endpoint == Endpoint::MonthlyBreakdown)
        .unwrap();
    assert!(names_at < redraw_at);
    assert_eq!(calls[names_at].param("sold_to_group"), Some("Retail"));
}

#[tokio::test]
async fn test_region_change_resets_salesman() {
    let dash = dashboard(MockBackend::new());

    dash.dispatch(FilterEvent::SetSalesman(Selection::only("Lee Don")))
        .await;
    dash.dispatch(FilterEvent::SetRegion(Selection::only("WA")))
        .await;

    assert!(dash.filters().salesman.is_all());
    assert_eq!(
        dash.options().salesmen,
        vec!["Fruci Davide", "Gilbert Michael"]
    );

    let targets = dash.backend().calls_to("/api/monthly_target");
    let last = targets.last().unwrap();
    assert_eq!(last.param("region"), Some("WA"));
    assert_eq!(last.param("salesman"), Some(ALL));
    assert_eq!(last.param("group_by"), None);
}

#[tokio::test]
async fn test_overlapping_redraws_discard_stale_results() {
    let dash = dashboard(MockBackend::new().route(
        "/api/monthly_sales_breakdown",
        json!([{"month": 1, "group_label": "A", "value": 1}]),
    ));

    let (first, second) = futures::join!(dash.redraw(), dash.redraw());

    match first {
        RedrawOutcome::Superseded { sequence, latest } => {
            assert_eq!(sequence, 1);
            assert_eq!(latest, 2);
        }
        other => panic!("first redraw should be superseded, got {:?}", other),
    }
    let report = rendered(second);
    assert_eq!(report.sequence, 2);
    assert!(report.rendered.contains(&"monthly.total".to_string()));
}

#[tokio::test]
async fn test_superseded_redraw_drops_its_notices() {
    let backend = MockBackend::new()
        .route(
            "/api/monthly_sales_breakdown",
            json!([{"month": 1, "group_label": "A", "value": 1}]),
        )
        .fail_once_after("/api/monthly_sales_breakdown", 50);
    let dash = dashboard(backend);

    let (first, second) = futures::join!(dash.redraw(), dash.redraw());
    assert!(matches!(first, RedrawOutcome::Superseded { .. }));
    let second = rendered(second);
    assert!(second.notices.is_empty());

    let third = rendered(dash.redraw().await);
    assert!(third.notices.is_empty(), "{:?}", third.notices);
    assert_eq!(chart(&dash, "monthly.total").datasets[0].data[0], Some(1.0));
}

#[tokio::test]
async fn test_top_set_fetched_alongside_chart_rows() {
    let backend = MockBackend::new()
        .route("/api/top_customers", json!([{"name": "cust0"}]))
        .route_when(
            "/api/monthly_sales_breakdown",
            "group_by",
            "sold_to",
            customer_breakdown(),
        )
        .slow("/api/top_customers", 20);
    let dash = dashboard(backend);

    dash.dispatch(FilterEvent::SetGroupBy(GroupBy::SoldTo)).await;
    rendered(
        dash.dispatch(FilterEvent::SetDisplayMode(DisplayMode::Top10))
            .await,
    );

    let backend = dash.backend();
    let ranking_done = backend.event_index("end /api/top_customers").unwrap();
    let events = backend.events.lock().unwrap();
    let started_during_ranking = events[..ranking_done]
        .iter()
        .filter(|e| *e == "start /api/kpi_snapshot" || *e == "start /api/daily_target")
        .count();
    // One of each from the first redraw, one of each while the ranking was in flight.
    assert_eq!(started_during_ranking, 4);
    drop(events);

    let top = chart(&dash, "monthly.stacked");
    assert_eq!(dataset_labels(&top), vec!["cust0", "Other"]);
}

#[tokio::test]
async fn test_failed_fetches_degrade_to_notices() {
    let backend = MockBackend::new()
        .fail("/api/monthly_sales_breakdown")
        .fail("/api/monthly_sales")
        .route("/api/yearly_sales_breakdown", json!({"error": "db down"}));
    let dash = dashboard(backend);

    let report = rendered(dash.redraw().await);

    let failed: Vec<Endpoint> = report.notices.iter().map(|n| n.endpoint).collect();
    assert!(failed.contains(&Endpoint::MonthlyBreakdown));
    assert!(failed.contains(&Endpoint::MonthlySales));
    assert!(failed.contains(&Endpoint::YearlyBreakdown));

    let monthly = chart(&dash, "monthly.total");
    assert!(monthly.datasets[0].data.iter().all(|v| *v == Some(0.0)));

    // Notices belong to the redraw that raised them and do not pile up.
    let again = rendered(dash.redraw().await);
    assert_eq!(again.notices.len(), report.notices.len());
}

#[tokio::test]
async fn test_missing_render_targets_are_skipped() {
    let sink = MemorySink::with_targets(["monthly.total", "daily.cumulative"]);
    let dash = Dashboard::new(DashboardConfig::default(), MockBackend::new(), sink).unwrap();

    let report = rendered(dash.redraw().await);

    assert_eq!(report.rendered, vec!["daily.cumulative", "monthly.total"]);
    assert!(report.skipped.contains(&"daily.total".to_string()));
    assert!(report.skipped.contains(&PROFIT_CHART_ID.to_string()));
    assert_eq!(dash.with_sink(|s| s.len()), 2);
}

#[tokio::test]
async fn test_kpi_cards_follow_region_filter() {
    let backend = MockBackend::new().route(
        "/api/kpi_snapshot",
        json!({
            "overall": {"mtd": {"actual": 90, "target": 100}},
            "regions": [
                {
                    "region": "NSW",
                    "kpi": {"mtd": {"actual": 50, "target": 40}},
                    "salesmen": [{"name": "Lee Don", "kpi": {"mtd": {"actual": 10, "target": 20}}}]
                },
                {"region": "VIC", "kpi": {"mtd": {"actual": 1, "target": 1}}, "salesmen": []}
            ]
        }),
    );
    let dash = dashboard(backend);

    let report = rendered(dash.redraw().await);
    assert_eq!(report.kpi_cards.len(), 4);

    let report = rendered(
        dash.dispatch(FilterEvent::SetRegion(Selection::only("nsw")))
            .await,
    );
    let statuses: Vec<(&str, AchievementStatus)> = report
        .kpi_cards
        .iter()
        .map(|c| (c.name.as_str(), c.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Overall", AchievementStatus::Ok),
            ("NSW", AchievementStatus::Good),
            ("Lee Don", AchievementStatus::Bad),
        ]
    );
}

#[tokio::test]
async fn test_profit_chart_rendered() {
    let backend = MockBackend::new().route(
        "/api/profit_by_month",
        json!([
            {"month": 1, "gross": 1000, "sales_deduction": 100, "cogs": 400, "op_cost": 200},
            {"month": 2, "gross": "500", "sales_deduction": 0, "cogs": 250, "op_cost": 300}
        ]),
    );
    let dash = dashboard(backend);
    rendered(dash.redraw().await);

    let profit = chart(&dash, PROFIT_CHART_ID);
    assert_eq!(profit.labels.len(), 12);
    assert_eq!(profit.datasets.len(), 4);
}

#[test]
fn test_export_stacked_view_to_csv() -> anyhow::Result<()> {
    let axis = PeriodAxis::months();
    let rows = vec![
        BreakdownRow::new(1, "NSW", 120.0),
        BreakdownRow::new(1, "VIC", 80.0),
        BreakdownRow::new(3, "NSW", 50.0),
    ];
    let views = process_breakdown(&rows, &axis, false);

    let path = std::env::temp_dir().join("sales_series_stacked_percent.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    let mut header = vec!["Period".to_string()];
    header.extend(views.groups().map(str::to_string));
    writer.write_record(&header)?;
    for (slot, label) in axis.labels().iter().enumerate() {
        let mut record = vec![label.clone()];
        for group in &views.stacked_percent {
            record.push(format!("{:.2}", group.values[slot].unwrap_or(0.0)));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    let mut reader = csv::Reader::from_path(&path)?;
    let headers = reader.headers()?.clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Period", "NSW", "VIC"]);

    let records: Vec<csv::StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    assert_eq!(records.len(), 12);
    assert_eq!(&records[0][1], "60.00");
    assert_eq!(&records[0][2], "40.00");
    assert_eq!(&records[2][1], "100.00");
    assert_eq!(&records[1][1], "0.00");

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_schema_generation() {
    let schema_json = ChartData::schema_as_json().unwrap();
    assert!(schema_json.contains("datasets"));
    assert!(schema_json.contains("y_max"));
}
