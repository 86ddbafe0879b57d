//! Endpoint table and query projection.
//!
//! Each endpoint projects a fixed subset of [`FilterState`]. A field outside that subset
//! is left out of the query entirely; a field inside it is always sent, `ALL` included.

use crate::filter::{FilterField, FilterField as F, FilterState};
use crate::schema::GroupBy;
use serde::Serialize;

const SCOPED_SALES: &[FilterField] = &[
    F::Metric,
    F::Category,
    F::Region,
    F::Salesman,
    F::SoldToGroup,
    F::SoldTo,
    F::ShipTo,
    F::ProductGroup,
    F::Pattern,
];

const SCOPED_BREAKDOWN: &[FilterField] = &[
    F::Metric,
    F::Category,
    F::Region,
    F::Salesman,
    F::SoldToGroup,
    F::SoldTo,
    F::ShipTo,
    F::ProductGroup,
    F::Pattern,
    F::GroupBy,
];

const RANKING: &[FilterField] = &[
    F::Metric,
    F::Category,
    F::Region,
    F::Salesman,
    F::SoldToGroup,
    F::ProductGroup,
    F::ShipTo,
    F::Pattern,
];

const TARGET: &[FilterField] = &[F::Metric, F::Category, F::Region, F::Salesman, F::SoldToGroup];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Endpoint {
    ProductGroups,
    CustomerGroups,
    CustomerNames,
    ShipToNames,
    Patterns,
    DailySales,
    MonthlySales,
    YearlySales,
    DailyBreakdown,
    MonthlyBreakdown,
    YearlyBreakdown,
    TopCustomers,
    DailyTarget,
    MonthlyTarget,
    YearlyTarget,
    ProfitByMonth,
    KpiSnapshot,
}

impl Endpoint {
    pub fn route(&self) -> &'static str {
        match self {
            Endpoint::ProductGroups => "/api/product_group",
            Endpoint::CustomerGroups => "/api/sold_to_groups",
            Endpoint::CustomerNames => "/api/sold_to_names",
            Endpoint::ShipToNames => "/api/ship_to_names",
            Endpoint::Patterns => "/api/patterns",
            Endpoint::DailySales => "/api/daily_sales",
            Endpoint::MonthlySales => "/api/monthly_sales",
            Endpoint::YearlySales => "/api/yearly_sales",
            Endpoint::DailyBreakdown => "/api/daily_sales_breakdown",
            Endpoint::MonthlyBreakdown => "/api/monthly_sales_breakdown",
            Endpoint::YearlyBreakdown => "/api/yearly_sales_breakdown",
            Endpoint::TopCustomers => "/api/top_customers",
            Endpoint::DailyTarget => "/api/daily_target",
            Endpoint::MonthlyTarget => "/api/monthly_target",
            Endpoint::YearlyTarget => "/api/yearly_target",
            Endpoint::ProfitByMonth => "/api/profit_by_month",
            Endpoint::KpiSnapshot => "/api/kpi_snapshot",
        }
    }

    /// Filter fields this endpoint receives, in query-string order.
    pub fn fields(&self) -> &'static [FilterField] {
        match self {
            Endpoint::ProductGroups | Endpoint::CustomerGroups => &[],
            Endpoint::CustomerNames => &[F::SoldToGroup],
            Endpoint::ShipToNames => &[F::SoldTo, F::SoldToGroup],
            Endpoint::Patterns => &[F::ProductGroup],
            Endpoint::DailySales | Endpoint::MonthlySales | Endpoint::YearlySales => SCOPED_SALES,
            Endpoint::DailyBreakdown | Endpoint::MonthlyBreakdown | Endpoint::YearlyBreakdown => {
                SCOPED_BREAKDOWN
            }
            Endpoint::TopCustomers => RANKING,
            Endpoint::DailyTarget | Endpoint::MonthlyTarget | Endpoint::YearlyTarget => TARGET,
            Endpoint::ProfitByMonth | Endpoint::KpiSnapshot => SCOPED_SALES,
        }
    }
}

/// A projected request: route plus ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl Query {
    pub fn project(endpoint: Endpoint, filters: &FilterState) -> Self {
        let params = endpoint
            .fields()
            .iter()
            .map(|f| (f.param_name(), filters.value_of(*f).to_string()))
            .collect();
        Self { endpoint, params }
    }

    /// Sets a parameter, replacing a projected value of the same name.
    pub fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn with_group_by(self, group_by: GroupBy) -> Self {
        self.with(FilterField::GroupBy.param_name(), group_by.as_str())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn route(&self) -> &'static str {
        self.endpoint.route()
    }
}
