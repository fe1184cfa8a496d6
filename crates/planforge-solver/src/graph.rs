//! Graph materialization: turns solved variable values into a typed
//! production graph of recipe, base-extraction, end-product, and surplus
//! nodes, each carrying machine-count and efficiency display metrics.

use std::collections::BTreeMap;

use planforge_catalog::{Catalog, ItemId, MachineId, RecipeId};
use serde::Serialize;

use crate::closure::Closure;
use crate::config::FLOW_EPSILON;
use crate::model::DemandMap;
use crate::optimizer::Solved;
use crate::plan::Target;
use crate::util::{clean_f64, clean_f64_map, round1, round_to_precision};

/// The materialized production graph, keyed by stable node id.
pub type ProductionGraph = BTreeMap<String, Node>;

/// Derived machine-count display metrics for a production or extraction node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineInfo {
    /// Fractional machine count the flow actually requires.
    #[serde(serialize_with = "clean_f64")]
    pub theoretical: f64,
    /// Machines that must physically exist: `ceil(theoretical)`.
    pub actual: u32,
    /// Machines running at 100%: `floor(theoretical)`.
    pub full: u32,
    /// Utilization of the last, partial machine.
    #[serde(serialize_with = "clean_f64")]
    pub partial_percent: f64,
    /// Overall utilization: `theoretical / actual`.
    #[serde(serialize_with = "clean_f64")]
    pub efficiency_percent: f64,
    pub display_text: String,
}

impl MachineInfo {
    /// Derive display metrics for a fractional machine count.
    pub fn for_count(theoretical: f64, machine_label: &str) -> Self {
        if !(theoretical > 0.0) {
            return Self {
                theoretical: 0.0,
                actual: 0,
                full: 0,
                partial_percent: 0.0,
                efficiency_percent: 0.0,
                display_text: format!("0 {machine_label}"),
            };
        }

        let full = theoretical.floor();
        let partial_percent = (theoretical - full) * 100.0;

        let display_text = if theoretical <= 1.0 {
            if partial_percent > 0.0 {
                format!("1 {machine_label} ({partial_percent:.1}%)")
            } else {
                format!("1 {machine_label}")
            }
        } else if partial_percent > 0.1 {
            // Below 0.1% the fraction is floating-point residue; showing
            // "(0.0%)" would only add noise.
            format!("{} {machine_label} + 1 {machine_label} ({partial_percent:.1}%)", full as u32)
        } else {
            format!("{} {machine_label}", full as u32)
        };

        let actual = theoretical.ceil();
        Self {
            theoretical: round_to_precision(theoretical),
            actual: actual as u32,
            full: full as u32,
            partial_percent: round1(partial_percent),
            efficiency_percent: round1(theoretical / actual * 100.0),
            display_text,
        }
    }
}

/// A node of the production graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A recipe running at some intensity across one or more machines.
    Recipe {
        recipe_id: RecipeId,
        recipe_name: String,
        machine_type: MachineId,
        machine: MachineInfo,
        #[serde(serialize_with = "clean_f64")]
        cycles_per_min: f64,
        alternate: bool,
        #[serde(serialize_with = "clean_f64_map")]
        inputs: BTreeMap<ItemId, f64>,
        #[serde(serialize_with = "clean_f64_map")]
        outputs: BTreeMap<ItemId, f64>,
    },
    /// Raw extraction of a base resource.
    BaseExtraction {
        item: ItemId,
        item_name: String,
        machine_type: MachineId,
        machine: MachineInfo,
        #[serde(serialize_with = "clean_f64")]
        rate: f64,
    },
    /// Terminal sink for one requested target.
    EndProduct {
        item: ItemId,
        item_name: String,
        #[serde(serialize_with = "clean_f64")]
        rate: f64,
    },
    /// Excess production beyond consumption and demand.
    Surplus {
        item: ItemId,
        item_name: String,
        #[serde(serialize_with = "clean_f64")]
        rate: f64,
    },
}

fn base_extraction_node(catalog: &Catalog, item: &str, rate: f64) -> Node {
    let extraction_rate = catalog.extraction_rate(item).unwrap_or(60.0);
    let machine_type = catalog.extraction_machine(item).unwrap_or("miner").to_string();
    let label = catalog.machine_display_name(&machine_type).to_string();
    Node::BaseExtraction {
        item: item.to_string(),
        item_name: catalog.item_name(item).to_string(),
        machine: MachineInfo::for_count(rate / extraction_rate, &label),
        machine_type,
        rate: round_to_precision(rate),
    }
}

fn end_product_node(catalog: &Catalog, item: &str, rate: f64) -> Node {
    Node::EndProduct {
        item: item.to_string(),
        item_name: catalog.item_name(item).to_string(),
        rate: round_to_precision(rate),
    }
}

/// Convert solved variable values into the production graph.
pub fn materialize(
    catalog: &Catalog,
    closure: &Closure,
    targets: &[Target],
    solved: &Solved,
) -> ProductionGraph {
    let mut nodes = ProductionGraph::new();
    let mut counter = 0usize;

    // Unrounded flow totals per item, for surplus detection.
    let mut produced: BTreeMap<&str, f64> = BTreeMap::new();
    let mut consumed: BTreeMap<&str, f64> = BTreeMap::new();

    for (rid, &count) in &solved.machine_counts {
        if count <= FLOW_EPSILON {
            continue;
        }
        let Some(recipe) = catalog.recipe(rid) else { continue };
        let cycles = recipe.cycles_per_min();

        let mut inputs = BTreeMap::new();
        for ing in &recipe.ingredients {
            if !closure.items.contains(&ing.item) {
                continue;
            }
            let rate = ing.amount * cycles * count;
            *consumed.entry(ing.item.as_str()).or_default() += rate;
            inputs.insert(ing.item.clone(), round_to_precision(rate));
        }
        let mut outputs = BTreeMap::new();
        for product in &recipe.products {
            if !closure.items.contains(&product.item) {
                continue;
            }
            let rate = product.amount * cycles * count;
            *produced.entry(product.item.as_str()).or_default() += rate;
            outputs.insert(product.item.clone(), round_to_precision(rate));
        }

        let machine_type = recipe.machine_type().to_string();
        let label = catalog.machine_display_name(&machine_type).to_string();
        nodes.insert(
            format!("recipe_{rid}_{counter}"),
            Node::Recipe {
                recipe_id: rid.clone(),
                recipe_name: recipe.name.clone(),
                machine: MachineInfo::for_count(count, &label),
                machine_type,
                cycles_per_min: cycles,
                alternate: recipe.alternate,
                inputs,
                outputs,
            },
        );
        counter += 1;
    }

    for (item, &usage) in &solved.base_usage {
        if usage <= FLOW_EPSILON {
            continue;
        }
        *produced.entry(item.as_str()).or_default() += usage;
        nodes.insert(format!("extract_{item}_{counter}"), base_extraction_node(catalog, item, usage));
        counter += 1;
    }

    let mut demand: DemandMap = DemandMap::new();
    for target in targets {
        *demand.entry(target.item.clone()).or_default() += target.amount_per_min;
        nodes.insert(
            format!("end_{}", target.item),
            end_product_node(catalog, &target.item, demand[&target.item]),
        );
    }

    for item in &closure.items {
        let out = produced.get(item.as_str()).copied().unwrap_or(0.0);
        let used = consumed.get(item.as_str()).copied().unwrap_or(0.0);
        let wanted = demand.get(item).copied().unwrap_or(0.0);
        let excess = out - used - wanted;
        // Relative guard so the target tolerance band never shows up as a
        // phantom surplus on large demands.
        let epsilon = FLOW_EPSILON.max(wanted * FLOW_EPSILON);
        if excess > epsilon {
            nodes.insert(
                format!("surplus_{item}"),
                Node::Surplus {
                    item: item.clone(),
                    item_name: catalog.item_name(item).to_string(),
                    rate: round_to_precision(excess),
                },
            );
        }
    }

    nodes
}

/// Graph for requests whose targets are all base resources: pure extraction,
/// no optimization needed.
pub fn extraction_only_graph(
    catalog: &Catalog,
    demand: &DemandMap,
    targets: &[Target],
) -> ProductionGraph {
    let mut nodes = ProductionGraph::new();
    for (counter, (item, &rate)) in demand.iter().enumerate() {
        nodes.insert(format!("extract_{item}_{counter}"), base_extraction_node(catalog, item, rate));
    }
    for target in targets {
        let rate = demand.get(&target.item).copied().unwrap_or(target.amount_per_min);
        nodes.insert(format!("end_{}", target.item), end_product_node(catalog, &target.item, rate));
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn machine_info_half_machine() {
        let info = MachineInfo::for_count(0.5, "Smelter");
        assert_eq!(info.actual, 1);
        assert_eq!(info.full, 0);
        assert_eq!(info.partial_percent, 50.0);
        assert_eq!(info.efficiency_percent, 50.0);
        assert_eq!(info.display_text, "1 Smelter (50.0%)");
    }

    #[test]
    fn machine_info_exact_counts() {
        let info = MachineInfo::for_count(1.0, "Smelter");
        assert_eq!(info.actual, 1);
        assert_eq!(info.display_text, "1 Smelter");

        let info = MachineInfo::for_count(3.0, "Constructor");
        assert_eq!(info.actual, 3);
        assert_eq!(info.full, 3);
        assert_eq!(info.efficiency_percent, 100.0);
        assert_eq!(info.display_text, "3 Constructor");
    }

    #[test]
    fn machine_info_partial_above_one() {
        let info = MachineInfo::for_count(2.5, "Assembler");
        assert_eq!(info.actual, 3);
        assert_eq!(info.full, 2);
        assert_eq!(info.partial_percent, 50.0);
        assert_eq!(info.display_text, "2 Assembler + 1 Assembler (50.0%)");
    }

    #[test]
    fn machine_info_suppresses_float_residue() {
        // A hair over 3 machines reads as "3", not "3 + 1 (0.0%)".
        let info = MachineInfo::for_count(3.000001, "Refinery");
        assert_eq!(info.display_text, "3 Refinery");
        assert_eq!(info.actual, 4);
    }

    #[test]
    fn machine_info_zero_and_negative() {
        let info = MachineInfo::for_count(0.0, "Miner");
        assert_eq!(info.actual, 0);
        assert_eq!(info.display_text, "0 Miner");
        let info = MachineInfo::for_count(-1.0, "Miner");
        assert_eq!(info.actual, 0);
    }

    proptest! {
        #[test]
        fn machine_info_invariants(theoretical in 1e-3f64..5000.0) {
            let info = MachineInfo::for_count(theoretical, "m");
            prop_assert_eq!(info.actual, theoretical.ceil() as u32);
            prop_assert_eq!(info.full, theoretical.floor() as u32);
            prop_assert!(info.efficiency_percent > 0.0);
            prop_assert!(info.efficiency_percent <= 100.0);
            prop_assert!(info.partial_percent >= 0.0);
            prop_assert!(info.partial_percent <= 100.0);
            prop_assert!(!info.display_text.is_empty());
        }
    }
}
