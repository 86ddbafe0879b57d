use async_trait::async_trait;
use sales_series_builder::*;
use serde_json::{json, Value};
use std::error::Error;

/// Synthetic sales backend: a handful of regions and customers with deterministic values.
struct DemoBackend;

const REGIONS: [&str; 4] = ["NSW", "QLD", "VIC", "WA"];

fn customer(i: usize) -> String {
    format!("Customer {:02}", i + 1)
}

fn breakdown(periods: std::ops::RangeInclusive<i64>, group_by: &str) -> Value {
    let groups: Vec<String> = if group_by == "sold_to" {
        (0..15).map(customer).collect()
    } else {
        REGIONS.iter().map(|r| r.to_string()).collect()
    };
    let rows: Vec<Value> = periods
        .flat_map(|p| {
            groups.iter().enumerate().filter_map(move |(i, g)| {
                // Leave a few holes so the daily charts show gaps.
                if (p as usize + i) % 7 == 0 {
                    return None;
                }
                let value = ((p as usize * 37 + i * 53) % 400 + 20) as f64;
                Some(json!({"period": p, "group_label": g, "value": value}))
            })
        })
        .collect();
    Value::Array(rows)
}

fn flat(periods: std::ops::RangeInclusive<i64>, value: f64) -> Value {
    Value::Array(periods.map(|p| json!({"period": p, "value": value})).collect())
}

#[async_trait]
impl Backend for DemoBackend {
    async fn get_json(&self, query: &Query) -> Result<Value> {
        let group_by = query.param("group_by").unwrap_or("region");
        Ok(match query.endpoint {
            Endpoint::ProductGroups => json!(["Tiles", "Grout", "Adhesive"]),
            Endpoint::CustomerGroups => json!(["Retail", "Trade"]),
            Endpoint::CustomerNames => Value::Array((0..15).map(|i| json!(customer(i))).collect()),
            Endpoint::ShipToNames => json!(["Main Warehouse", "Site Office"]),
            Endpoint::Patterns => json!(["Gloss", "Matt"]),
            Endpoint::DailyBreakdown => breakdown(1..=31, group_by),
            Endpoint::MonthlyBreakdown => breakdown(1..=12, group_by),
            Endpoint::YearlyBreakdown => breakdown(2021..=2024, group_by),
            Endpoint::DailySales | Endpoint::MonthlySales | Endpoint::YearlySales => json!([]),
            Endpoint::DailyTarget => flat(1..=31, 900.0),
            Endpoint::MonthlyTarget => flat(1..=12, 20_000.0),
            Endpoint::YearlyTarget => flat(2021..=2024, 60_000.0),
            Endpoint::TopCustomers => {
                Value::Array((0..10).map(|i| json!({"sold_to_name": customer(i)})).collect())
            }
            Endpoint::ProfitByMonth => Value::Array(
                (1..=12)
                    .map(|m| {
                        json!({
                            "month": m,
                            "gross": 50_000 + m * 1_000,
                            "sales_deduction": 2_500,
                            "cogs": 30_000,
                            "op_cost": 9_000
                        })
                    })
                    .collect(),
            ),
            Endpoint::KpiSnapshot => json!({
                "overall": {"mtd": {"actual": 18_500, "target": 20_000}},
                "regions": [
                    {"region": "NSW", "kpi": {"mtd": {"actual": 6_200, "target": 5_000}}, "salesmen": []},
                    {"region": "WA", "kpi": {"mtd": {"actual": 2_100, "target": 4_000}}, "salesmen": []}
                ]
            }),
        })
    }
}

fn print_chart(id: &str, chart: &ChartData) {
    println!("📊 {} ({})", chart.title, id);
    for dataset in chart.datasets.iter().take(4) {
        let preview: Vec<String> = dataset
            .data
            .iter()
            .take(6)
            .map(|v| v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".to_string()))
            .collect();
        println!("   {:<16} {}", dataset.label, preview.join("  "));
    }
    if chart.datasets.len() > 4 {
        println!("   ... {} more datasets", chart.datasets.len() - 4);
    }
}

fn print_report(outcome: &RedrawOutcome) {
    let Some(report) = outcome.report() else {
        println!("⏭️  Redraw superseded");
        return;
    };
    println!(
        "✅ Redraw #{}: {} charts rendered, {} skipped, {} notices",
        report.sequence,
        report.rendered.len(),
        report.skipped.len(),
        report.notices.len()
    );
    if let Some(achievement) = &report.achievement {
        println!(
            "   Month to date: {:.0} of {:.0} ({}% {:?})",
            achievement.actual, achievement.target, achievement.percent, achievement.status
        );
    }
    for card in &report.kpi_cards {
        println!(
            "   KPI {:<8} {:<4} {:>5}% {:?}",
            card.name, card.bucket, card.percent, card.status
        );
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    let config = DashboardConfig::default();
    let targets = ["daily.total", "daily.stacked", "monthly.stacked_percent", PROFIT_CHART_ID];
    let dashboard = Dashboard::new(config, DemoBackend, MemorySink::with_targets(targets))?;

    println!("🚀 Loading dashboard controls...\n");
    let notices = dashboard.init_controls().await;
    let options = dashboard.options();
    println!("   Product groups: {}", options.product_groups.join(", "));
    println!("   Customers: {}", options.customer_names.len());
    println!("   Salesmen: {}", options.salesmen.len());
    println!("   Failed option loads: {}\n", notices.len());

    print_report(&dashboard.redraw().await);
    for id in targets {
        dashboard.with_sink(|sink| {
            if let Some(chart) = sink.chart(id) {
                print_chart(id, chart);
            }
        });
    }

    println!("\n🔎 Top 10 customers...\n");
    dashboard
        .dispatch(FilterEvent::SetGroupBy(GroupBy::SoldTo))
        .await;
    let outcome = dashboard
        .dispatch(FilterEvent::SetDisplayMode(DisplayMode::Top10))
        .await;
    print_report(&outcome);
    dashboard.with_sink(|sink| {
        if let Some(chart) = sink.chart("monthly.stacked_percent") {
            print_chart("monthly.stacked_percent", chart);
        }
    });

    println!("\n🗺️  Region WA...\n");
    let outcome = dashboard
        .dispatch(FilterEvent::SetRegion(Selection::only("WA")))
        .await;
    print_report(&outcome);
    println!("   Salesmen now: {}", dashboard.options().salesmen.join(", "));

    println!("\n📐 Chart payload schema:\n{}", ChartData::schema_as_json()?);
    Ok(())
}
