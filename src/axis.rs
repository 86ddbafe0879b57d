use crate::error::{DashboardError, Result};
use crate::utils::{day_labels, validate_month, MONTH_LABELS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of day slots on a daily axis, independent of the month's real length.
pub const DAY_SLOTS: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Day,
    Month,
    Year,
}

/// Fixed, ordered sequence of period slots. Every series built on an axis has exactly
/// `len()` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodAxis {
    kind: AxisKind,
    labels: Vec<String>,
    years: Vec<i32>,
}

impl PeriodAxis {
    /// 31 day slots labelled `dd-mm-yy` for the given month.
    pub fn days(year: i32, month: u32) -> Result<Self> {
        validate_month(month)?;
        Ok(Self {
            kind: AxisKind::Day,
            labels: day_labels(year, month, DAY_SLOTS as u32),
            years: Vec::new(),
        })
    }

    pub fn months() -> Self {
        Self {
            kind: AxisKind::Month,
            labels: MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
            years: Vec::new(),
        }
    }

    pub fn years(years: Vec<i32>) -> Result<Self> {
        if years.is_empty() {
            return Err(DashboardError::InvalidAxis(
                "year axis needs at least one year".to_string(),
            ));
        }
        for (i, y) in years.iter().enumerate() {
            if years[..i].contains(y) {
                return Err(DashboardError::InvalidAxis(format!(
                    "year {} appears twice",
                    y
                )));
            }
        }
        Ok(Self {
            kind: AxisKind::Year,
            labels: years.iter().map(|y| y.to_string()).collect(),
            years,
        })
    }

    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Maps a row's period marker to its slot: `day-1`, `month-1`, or the position of the
    /// year in the axis. Markers outside the axis map to `None`.
    pub fn index_of(&self, period: i64) -> Option<usize> {
        match self.kind {
            AxisKind::Day | AxisKind::Month => {
                let idx = period.checked_sub(1)?;
                usize::try_from(idx).ok().filter(|i| *i < self.len())
            }
            AxisKind::Year => self.years.iter().position(|y| i64::from(*y) == period),
        }
    }
}
