use crate::schema::{DisplayMode, GroupBy, Metric, Selection};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current selection across every filter dimension. Every field always holds a value;
/// unset dimensions are `ALL`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterState {
    pub metric: Metric,
    pub group_by: GroupBy,
    pub display: DisplayMode,
    pub region: Selection,
    pub salesman: Selection,
    pub sold_to_group: Selection,
    pub sold_to: Selection,
    pub ship_to: Selection,
    pub product_group: Selection,
    pub pattern: Selection,
    pub category: Selection,
}

/// Names of the dimensions an endpoint may project into its query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    Metric,
    Category,
    Region,
    Salesman,
    SoldToGroup,
    SoldTo,
    ShipTo,
    ProductGroup,
    Pattern,
    GroupBy,
}

impl FilterField {
    pub fn param_name(&self) -> &'static str {
        match self {
            FilterField::Metric => "metric",
            FilterField::Category => "category",
            FilterField::Region => "region",
            FilterField::Salesman => "salesman",
            FilterField::SoldToGroup => "sold_to_group",
            FilterField::SoldTo => "sold_to",
            FilterField::ShipTo => "ship_to",
            FilterField::ProductGroup => "product_group",
            FilterField::Pattern => "pattern",
            FilterField::GroupBy => "group_by",
        }
    }
}

impl FilterState {
    pub fn value_of(&self, field: FilterField) -> &str {
        match field {
            FilterField::Metric => self.metric.as_str(),
            FilterField::Category => self.category.as_str(),
            FilterField::Region => self.region.as_str(),
            FilterField::Salesman => self.salesman.as_str(),
            FilterField::SoldToGroup => self.sold_to_group.as_str(),
            FilterField::SoldTo => self.sold_to.as_str(),
            FilterField::ShipTo => self.ship_to.as_str(),
            FilterField::ProductGroup => self.product_group.as_str(),
            FilterField::Pattern => self.pattern.as_str(),
            FilterField::GroupBy => self.group_by.as_str(),
        }
    }

    /// Top-N reduction applies only to customer grouping in top-10 mode, and not when a
    /// single customer is already selected.
    pub fn wants_top_reduction(&self) -> bool {
        self.display == DisplayMode::Top10 && self.group_by.is_customer() && self.sold_to.is_all()
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FilterState)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// UI events. The dispatcher is the only place that mutates [`FilterState`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent {
    SetMetric(Metric),
    SetGroupBy(GroupBy),
    SetDisplayMode(DisplayMode),
    SetRegion(Selection),
    SetSalesman(Selection),
    SetCustomerGroup(Selection),
    SetCustomer(Selection),
    SetShipTo(Selection),
    SetProductGroup(Selection),
    SetPattern(Selection),
    SetCategory(Selection),
}

/// Option lists that must be reloaded after a mutation, in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionRefresh {
    Salesmen { region: Selection },
    CustomerNames { customer_group: Selection },
    ShipToNames { customer: Selection, customer_group: Selection },
    Patterns { product_group: Selection },
}

/// Values offered by each selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub product_groups: Vec<String>,
    pub customer_groups: Vec<String>,
    pub customer_names: Vec<String>,
    pub ship_to_names: Vec<String>,
    pub patterns: Vec<String>,
    pub salesmen: Vec<String>,
}

/// An immutable view of the filters taken for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSnapshot {
    pub sequence: u64,
    pub filters: FilterState,
}

#[derive(Debug, Default)]
pub struct FilterDispatcher {
    state: FilterState,
    options: FilterOptions,
    sequence: u64,
}

impl FilterDispatcher {
    pub fn new(state: FilterState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut FilterOptions {
        &mut self.options
    }

    /// Takes a snapshot tagged with the next redraw sequence number.
    pub fn snapshot(&mut self) -> FilterSnapshot {
        self.sequence += 1;
        FilterSnapshot {
            sequence: self.sequence,
            filters: self.state.clone(),
        }
    }

    pub fn latest_sequence(&self) -> u64 {
        self.sequence
    }

    /// Applies one event. Narrower dependent fields are reset to `ALL` here, before
    /// anything can redraw; the returned list names the option lists to reload.
    pub fn apply(&mut self, event: FilterEvent) -> Vec<OptionRefresh> {
        debug!("Applying filter event {:?}", event);
        let state = &mut self.state;
        match event {
            FilterEvent::SetMetric(metric) => {
                state.metric = metric;
                Vec::new()
            }
            FilterEvent::SetGroupBy(group_by) => {
                state.group_by = group_by;
                Vec::new()
            }
            FilterEvent::SetDisplayMode(mode) => {
                state.display = mode;
                Vec::new()
            }
            FilterEvent::SetRegion(region) => {
                state.region = region.clone();
                state.salesman = Selection::All;
                vec![OptionRefresh::Salesmen { region }]
            }
            FilterEvent::SetSalesman(salesman) => {
                state.salesman = salesman;
                Vec::new()
            }
            FilterEvent::SetCustomerGroup(group) => {
                state.sold_to_group = group.clone();
                state.sold_to = Selection::All;
                state.ship_to = Selection::All;
                self.options.ship_to_names.clear();
                vec![OptionRefresh::CustomerNames {
                    customer_group: group,
                }]
            }
            FilterEvent::SetCustomer(customer) => {
                state.sold_to = customer.clone();
                state.ship_to = Selection::All;
                self.options.ship_to_names.clear();
                if customer.is_all() {
                    Vec::new()
                } else {
                    vec![OptionRefresh::ShipToNames {
                        customer,
                        customer_group: state.sold_to_group.clone(),
                    }]
                }
            }
            FilterEvent::SetShipTo(ship_to) => {
                state.ship_to = ship_to;
                Vec::new()
            }
            FilterEvent::SetProductGroup(group) => {
                state.product_group = group.clone();
                state.pattern = Selection::All;
                vec![OptionRefresh::Patterns {
                    product_group: group,
                }]
            }
            FilterEvent::SetPattern(pattern) => {
                state.pattern = pattern;
                Vec::new()
            }
            FilterEvent::SetCategory(category) => {
                state.category = category;
                Vec::new()
            }
        }
    }
}

/// Salesmen offered for a region: the region's roster, or everybody for `ALL`. Sorted,
/// without duplicates.
pub fn salesmen_for_region(
    roster: &BTreeMap<String, Vec<String>>,
    region: &Selection,
) -> Vec<String> {
    let mut names: Vec<String> = match region {
        Selection::All => roster.values().flatten().cloned().collect(),
        Selection::Only(code) => roster.get(code).cloned().unwrap_or_default(),
    };
    names.sort();
    names.dedup();
    names
}
