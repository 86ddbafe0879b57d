use crate::error::{DashboardError, Result};
use crate::topn::DEFAULT_TOP_N;
use crate::utils::validate_month;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Backend origin, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Month shown on the daily axis.
    pub daily_year: i32,
    pub daily_month: u32,
    /// Explicit year list for the yearly axis.
    pub years: Vec<i32>,
    pub top_n: usize,
    /// Region code to salesman roster.
    pub region_salesmen: BTreeMap<String, Vec<String>>,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let roster = [
            ("NSW", &["Hamid Jallis", "LUTTRELL STEVE", "Hulley Gary", "Lee Don"][..]),
            ("QLD", &["Lopez Randall", "Spires Steven", "Sampson Kieren", "Marsh Aaron"][..]),
            ("VIC", &["Bellotto Nicola", "Bilston Kelley", "Gultjaeff Jason", "Hobkirk Calvin"][..]),
            ("WA", &["Fruci Davide", "Gilbert Michael"][..]),
        ];
        Self {
            base_url: "http://localhost:5000".to_string(),
            daily_year: 2025,
            daily_month: 7,
            years: (2021..=2024).collect(),
            top_n: DEFAULT_TOP_N,
            region_salesmen: roster
                .iter()
                .map(|(region, names)| {
                    (
                        region.to_string(),
                        names.iter().map(|n| n.to_string()).collect(),
                    )
                })
                .collect(),
            request_timeout_secs: 30,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_month(self.daily_month)?;
        if self.years.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "years must not be empty".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(DashboardError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
