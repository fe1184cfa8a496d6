//! Summary aggregation: rolls a production graph into totals for machines,
//! base-resource usage, power, and overall efficiency.

use std::collections::{BTreeMap, BTreeSet};

use planforge_catalog::{Catalog, ItemId, MachineId};
use serde::Serialize;

use crate::graph::{Node, ProductionGraph};
use crate::util::{clean_f64, clean_f64_map, round_to_precision};

/// Aggregate statistics over one production graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Fractional machine total across recipe and extraction nodes.
    #[serde(serialize_with = "clean_f64")]
    pub total_machines: f64,
    /// Whole machines that must be built.
    pub total_actual_machines: u32,
    /// Actual machines per machine type, sorted by type id.
    pub machine_breakdown: BTreeMap<MachineId, u32>,
    /// Base resource usage per item, units/minute.
    #[serde(serialize_with = "clean_f64_map")]
    pub base_resources: BTreeMap<ItemId, f64>,
    pub unique_base_resource_types: usize,
    #[serde(serialize_with = "clean_f64")]
    pub total_base_resource_amount: f64,
    pub recipe_node_count: usize,
    pub base_node_count: usize,
    pub unique_recipes: usize,
    /// Total power draw in MW. Recipes with a declared power range are
    /// charged at the mean of min and max.
    #[serde(serialize_with = "clean_f64")]
    pub total_power_mw: f64,
    /// Overall machine utilization as a percentage string, `"0%"` for an
    /// empty graph.
    pub machine_efficiency: String,
}

/// Single pass over the graph.
pub fn summarize(catalog: &Catalog, graph: &ProductionGraph) -> Summary {
    let mut total_theoretical = 0.0;
    let mut total_actual: u32 = 0;
    let mut machine_breakdown: BTreeMap<MachineId, u32> = BTreeMap::new();
    let mut base_resources: BTreeMap<ItemId, f64> = BTreeMap::new();
    let mut total_base = 0.0;
    let mut unique_recipes: BTreeSet<&str> = BTreeSet::new();
    let mut recipe_node_count = 0;
    let mut base_node_count = 0;
    let mut total_power = 0.0;

    for node in graph.values() {
        match node {
            Node::Recipe { recipe_id, machine_type, machine, .. } => {
                recipe_node_count += 1;
                total_theoretical += machine.theoretical;
                total_actual += machine.actual;
                *machine_breakdown.entry(machine_type.clone()).or_default() += machine.actual;
                unique_recipes.insert(recipe_id.as_str());

                let per_machine = match catalog.recipe(recipe_id).and_then(|r| r.power_range) {
                    Some((min, max)) => (min + max) / 2.0,
                    None => catalog.machine_power(machine_type),
                };
                total_power += f64::from(machine.actual) * per_machine;
            }
            Node::BaseExtraction { item, machine_type, machine, rate, .. } => {
                base_node_count += 1;
                total_theoretical += machine.theoretical;
                total_actual += machine.actual;
                *machine_breakdown.entry(machine_type.clone()).or_default() += machine.actual;
                total_power += f64::from(machine.actual) * catalog.machine_power(machine_type);

                total_base += rate;
                let entry = base_resources.entry(item.clone()).or_default();
                *entry = round_to_precision(*entry + rate);
            }
            Node::EndProduct { .. } | Node::Surplus { .. } => {}
        }
    }

    let machine_efficiency = if total_actual > 0 {
        format!("{:.1}%", total_theoretical / f64::from(total_actual) * 100.0)
    } else {
        "0%".to_string()
    };

    Summary {
        total_machines: round_to_precision(total_theoretical),
        total_actual_machines: total_actual,
        machine_breakdown,
        unique_base_resource_types: base_resources.len(),
        base_resources,
        total_base_resource_amount: round_to_precision(total_base),
        recipe_node_count,
        base_node_count,
        unique_recipes: unique_recipes.len(),
        total_power_mw: round_to_precision(total_power),
        machine_efficiency,
    }
}
