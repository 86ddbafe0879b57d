//! Renderer-agnostic chart payload and the sink that consumes it.

use crate::derive::{LabeledSeries, MaskedSeries};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const PALETTE: [&str; 12] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf", "#aec7e8", "#ffbb78",
];

pub const TARGET_COLOR: &str = "#ef4444";
pub const STACK_ID: &str = "S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    pub label: String,
    #[schemars(description = "One value per axis label; null marks a period with no data")]
    pub data: Vec<Option<f64>>,
    pub kind: DatasetKind,
    pub stack: Option<String>,
    pub color: String,
}

impl Dataset {
    pub fn bar(label: impl Into<String>, data: MaskedSeries, color: &str) -> Self {
        Self {
            label: label.into(),
            data,
            kind: DatasetKind::Bar,
            stack: None,
            color: color.to_string(),
        }
    }

    pub fn line(label: impl Into<String>, data: MaskedSeries, color: &str) -> Self {
        Self {
            label: label.into(),
            data,
            kind: DatasetKind::Line,
            stack: None,
            color: color.to_string(),
        }
    }

    pub fn stacked(mut self) -> Self {
        self.stack = Some(STACK_ID.to_string());
        self
    }
}

/// `{labels, datasets}` as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[schemars(description = "Fixed y-axis maximum, set to 100 for percent charts")]
    pub y_max: Option<f64>,
}

impl ChartData {
    pub fn new(title: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            title: title.into(),
            labels,
            datasets: Vec::new(),
            y_max: None,
        }
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn with_y_max(mut self, max: f64) -> Self {
        self.y_max = Some(max);
        self
    }

    /// One stacked bar dataset per group, colors cycling through the palette.
    pub fn stacked(title: impl Into<String>, labels: Vec<String>, groups: &[LabeledSeries]) -> Self {
        let datasets = groups
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Dataset::bar(s.label.clone(), s.values.clone(), PALETTE[i % PALETTE.len()])
                    .stacked()
            })
            .collect();
        Self {
            title: title.into(),
            labels,
            datasets,
            y_max: None,
        }
    }

    pub fn dataset(&self, label: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.label == label)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ChartData)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Where rendered charts go. A sink without the named target skips the chart.
pub trait ChartSink {
    fn has_target(&self, id: &str) -> bool;
    fn render(&mut self, id: &str, chart: ChartData);
}

/// Keeps the latest chart per target in memory. Targets must be registered up front;
/// charts for unknown targets are dropped.
#[derive(Debug, Default)]
pub struct MemorySink {
    targets: Vec<String>,
    charts: std::collections::BTreeMap<String, ChartData>,
}

impl MemorySink {
    pub fn with_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            charts: Default::default(),
        }
    }

    pub fn chart(&self, id: &str) -> Option<&ChartData> {
        self.charts.get(id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

impl ChartSink for MemorySink {
    fn has_target(&self, id: &str) -> bool {
        self.targets.iter().any(|t| t == id)
    }

    fn render(&mut self, id: &str, chart: ChartData) {
        self.charts.insert(id.to_string(), chart);
    }
}
