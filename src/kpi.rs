use crate::filter::FilterState;
use crate::normalize::labels_match;
use crate::schema::Selection;
use crate::utils::lenient_f64;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiFigure {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub actual: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub target: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percent: f64,
}

/// Period bucket (e.g. `"mtd"`, `"ytd"`) to figure.
pub type KpiBuckets = BTreeMap<String, KpiFigure>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesmanKpi {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kpi: KpiBuckets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionKpi {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub kpi: KpiBuckets,
    #[serde(default)]
    pub salesmen: Vec<SalesmanKpi>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    #[serde(default)]
    pub overall: KpiBuckets,
    #[serde(default)]
    pub regions: Vec<RegionKpi>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    Good,
    Ok,
    Bad,
}

impl AchievementStatus {
    pub fn classify(percent: f64) -> Self {
        if percent >= 100.0 {
            AchievementStatus::Good
        } else if percent >= 90.0 {
            AchievementStatus::Ok
        } else {
            AchievementStatus::Bad
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Achievement {
    pub actual: f64,
    pub target: f64,
    pub percent: f64,
    pub status: AchievementStatus,
}

impl Achievement {
    /// `None` when there is no usable target.
    pub fn compute(actual: f64, target: Option<f64>) -> Option<Self> {
        let target = target.filter(|t| *t > 0.0)?;
        let percent = round1(actual / target * 100.0);
        Some(Self {
            actual,
            target,
            percent,
            status: AchievementStatus::classify(percent),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum KpiScope {
    Overall,
    Region,
    Salesman { region: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub scope: KpiScope,
    pub name: String,
    pub bucket: String,
    pub actual: f64,
    pub target: f64,
    pub percent: f64,
    pub status: AchievementStatus,
}

fn card(scope: KpiScope, name: &str, bucket: &str, figure: &KpiFigure) -> KpiCard {
    let percent = if figure.target > 0.0 {
        round1(figure.actual / figure.target * 100.0)
    } else {
        round1(figure.percent)
    };
    KpiCard {
        scope,
        name: name.to_string(),
        bucket: bucket.to_string(),
        actual: figure.actual,
        target: figure.target,
        percent,
        status: AchievementStatus::classify(percent),
    }
}

fn selected(selection: &Selection, label: &str) -> bool {
    match selection {
        Selection::All => true,
        Selection::Only(v) => labels_match(v, label),
    }
}

impl KpiSnapshot {
    /// Flattens the snapshot into cards: overall first, then each region followed by its
    /// salesmen, narrowed to the selected region and salesman.
    pub fn cards(&self, filters: &FilterState) -> Vec<KpiCard> {
        let mut cards: Vec<KpiCard> = self
            .overall
            .iter()
            .map(|(bucket, fig)| card(KpiScope::Overall, "Overall", bucket, fig))
            .collect();

        for region in self
            .regions
            .iter()
            .filter(|r| selected(&filters.region, &r.region))
        {
            cards.extend(
                region
                    .kpi
                    .iter()
                    .map(|(bucket, fig)| card(KpiScope::Region, &region.region, bucket, fig)),
            );
            for salesman in region
                .salesmen
                .iter()
                .filter(|s| selected(&filters.salesman, &s.name))
            {
                let scope = KpiScope::Salesman {
                    region: region.region.clone(),
                };
                cards.extend(
                    salesman
                        .kpi
                        .iter()
                        .map(|(bucket, fig)| card(scope.clone(), &salesman.name, bucket, fig)),
                );
            }
        }
        cards
    }
}
