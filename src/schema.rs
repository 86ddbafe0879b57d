use crate::utils::{lenient_f64, lenient_label, lenient_period};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wildcard token used by every filter dimension.
pub const ALL: &str = "ALL";
/// Label given to rows whose group label is missing.
pub const UNKNOWN_LABEL: &str = "UNKNOWN";
/// Label of the single group shown when a breakdown comes back empty.
pub const TOTAL_LABEL: &str = "Total";
/// Label of the synthetic group that absorbs everything outside the top set.
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    #[schemars(description = "Billed quantity in SKU units")]
    Qty,
    #[schemars(description = "Billed amount")]
    Amount,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Qty => "qty",
            Metric::Amount => "amount",
        }
    }

    /// Unit word used in chart titles.
    pub fn unit_label(&self) -> &'static str {
        match self {
            Metric::Qty => "SKU",
            Metric::Amount => "Amount",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Region,
    Salesman,
    SoldToGroup,
    SoldTo,
    ShipTo,
    ProductGroup,
    Pattern,
    Category,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Region => "region",
            GroupBy::Salesman => "salesman",
            GroupBy::SoldToGroup => "sold_to_group",
            GroupBy::SoldTo => "sold_to",
            GroupBy::ShipTo => "ship_to",
            GroupBy::ProductGroup => "product_group",
            GroupBy::Pattern => "pattern",
            GroupBy::Category => "category",
        }
    }

    /// The customer dimension is the only one that may be reduced to a top set.
    pub fn is_customer(&self) -> bool {
        matches!(self, GroupBy::SoldTo)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    All,
    Top10,
}

/// A filter dimension value: the `ALL` wildcard or one concrete token.
///
/// Serialized as a bare string so query strings and stored state look the same as the
/// backend expects. Empty input reads as `ALL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn only(value: impl Into<String>) -> Self {
        Selection::from(value.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(v) => v,
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::from(value.to_string())
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JsonSchema for Selection {
    fn schema_name() -> String {
        "Selection".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

/// Anything the aggregator can pivot: a period marker, a group label and a value.
pub trait SeriesRow {
    fn period(&self) -> Option<i64>;
    fn group_label(&self) -> &str;
    fn value(&self) -> f64;
}

/// `{period, value}` rows from the totals and target endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow {
    #[serde(
        default,
        alias = "day",
        alias = "day_num",
        alias = "month",
        alias = "year",
        deserialize_with = "lenient_period"
    )]
    pub period: Option<i64>,

    #[serde(
        default,
        alias = "daily_total",
        alias = "daily_qty",
        alias = "daily_value",
        deserialize_with = "lenient_f64"
    )]
    pub value: f64,
}

impl PeriodRow {
    pub fn new(period: i64, value: f64) -> Self {
        Self {
            period: Some(period),
            value,
        }
    }
}

impl SeriesRow for PeriodRow {
    fn period(&self) -> Option<i64> {
        self.period
    }

    fn group_label(&self) -> &str {
        TOTAL_LABEL
    }

    fn value(&self) -> f64 {
        self.value
    }
}

/// `{period, group_label, value}` rows from the breakdown endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownRow {
    #[serde(
        default,
        alias = "day",
        alias = "day_num",
        alias = "month",
        alias = "year",
        deserialize_with = "lenient_period"
    )]
    pub period: Option<i64>,

    #[serde(default, deserialize_with = "lenient_label")]
    pub group_label: Option<String>,

    #[serde(
        default,
        alias = "daily_value",
        alias = "daily_qty",
        deserialize_with = "lenient_f64"
    )]
    pub value: f64,
}

impl BreakdownRow {
    pub fn new(period: i64, group_label: impl Into<String>, value: f64) -> Self {
        Self {
            period: Some(period),
            group_label: Some(group_label.into()),
            value,
        }
    }
}

impl SeriesRow for BreakdownRow {
    fn period(&self) -> Option<i64> {
        self.period
    }

    fn group_label(&self) -> &str {
        self.group_label.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    fn value(&self) -> f64 {
        self.value
    }
}

/// One entry of the top-customer ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCustomer {
    #[serde(
        default,
        alias = "sold_to_name",
        alias = "customer",
        deserialize_with = "lenient_label"
    )]
    pub name: Option<String>,
}
