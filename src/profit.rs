use crate::axis::PeriodAxis;
use crate::chart::{ChartData, Dataset, PALETTE};
use crate::derive::cumulative;
use crate::utils::{lenient_f64, lenient_period, round2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitRow {
    #[serde(default, alias = "period", deserialize_with = "lenient_period")]
    pub month: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gross: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sales_deduction: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cogs: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub op_cost: f64,
}

/// Month-indexed profit lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitSeries {
    pub gross: Vec<f64>,
    pub sales_deduction: Vec<f64>,
    pub net_sales: Vec<f64>,
    pub cogs: Vec<f64>,
    pub gross_profit: Vec<f64>,
    pub op_cost: Vec<f64>,
    pub operating_profit: Vec<f64>,
    pub gross_margin_pct: Vec<f64>,
    pub operating_margin_pct: Vec<f64>,
    pub cumulative_operating_profit: Vec<f64>,
}

fn margin(profit: &[f64], base: &[f64]) -> Vec<f64> {
    profit
        .iter()
        .zip(base)
        .map(|(p, b)| if *b == 0.0 { 0.0 } else { round2(p / b * 100.0) })
        .collect()
}

fn diff(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

impl ProfitSeries {
    /// Accumulates rows into the axis slots; rows outside the axis are dropped.
    pub fn from_rows(rows: &[ProfitRow], axis: &PeriodAxis) -> Self {
        let n = axis.len();
        let mut gross = vec![0.0; n];
        let mut sales_deduction = vec![0.0; n];
        let mut cogs = vec![0.0; n];
        let mut op_cost = vec![0.0; n];

        for row in rows {
            let Some(slot) = row.month.and_then(|m| axis.index_of(m)) else {
                continue;
            };
            gross[slot] += row.gross;
            sales_deduction[slot] += row.sales_deduction;
            cogs[slot] += row.cogs;
            op_cost[slot] += row.op_cost;
        }

        let net_sales = diff(&gross, &sales_deduction);
        let gross_profit = diff(&net_sales, &cogs);
        let operating_profit = diff(&gross_profit, &op_cost);

        Self {
            gross_margin_pct: margin(&gross_profit, &net_sales),
            operating_margin_pct: margin(&operating_profit, &net_sales),
            cumulative_operating_profit: cumulative(&operating_profit),
            gross,
            sales_deduction,
            net_sales,
            cogs,
            gross_profit,
            op_cost,
            operating_profit,
        }
    }

    pub fn chart(&self, labels: Vec<String>) -> ChartData {
        let some = |v: &[f64]| v.iter().copied().map(Some).collect::<Vec<_>>();
        ChartData::new("Profit by Month", labels)
            .with_dataset(Dataset::bar("Net Sales", some(&self.net_sales), PALETTE[0]))
            .with_dataset(Dataset::bar("Gross Profit", some(&self.gross_profit), PALETTE[2]))
            .with_dataset(Dataset::bar(
                "Operating Profit",
                some(&self.operating_profit),
                PALETTE[4],
            ))
            .with_dataset(Dataset::line(
                "Cumulative Operating Profit",
                some(&self.cumulative_operating_profit),
                PALETTE[3],
            ))
    }
}
