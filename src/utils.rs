use crate::error::{DashboardError, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .ok_or_else(|| DashboardError::DateError(format!("No such month: {}-{:02}", year, month)))
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    Ok(last_day_of_month(year, month)?.day())
}

/// Day labels in `dd-mm-yy` form, one per day of the given month.
pub fn day_labels(year: i32, month: u32, days: u32) -> Vec<String> {
    (1..=days)
        .map(|d| match NaiveDate::from_ymd_opt(year, month, d) {
            Some(date) => date.format("%d-%m-%y").to_string(),
            // Day 31 on a 30-day month still gets a slot on the fixed axis.
            None => format!("{:02}-{:02}-{:02}", d, month, year.rem_euclid(100)),
        })
        .collect()
}

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(DashboardError::InvalidConfig(format!(
            "month {} must be between 1 and 12",
            month
        )));
    }
    Ok(())
}

/// Rounds to two decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reads a JSON scalar as a number: numbers pass through, numeric strings are parsed,
/// anything else (null, bool, garbage, NaN) becomes 0.
pub fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Reads a JSON scalar as a period marker. Unreadable markers become `None` and the row
/// is later dropped by the aggregator.
pub fn coerce_period(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

pub fn lenient_period<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_period(&value))
}

pub fn lenient_label<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
