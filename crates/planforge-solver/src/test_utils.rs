//! Shared fixtures for unit and integration tests.
//!
//! The fixture catalog is a small two-ore factory: iron and copper smelting,
//! plate and rod construction, a lossy alternate that recycles rods back
//! into ingots, and a power-hungry accelerator stage. Rates are chosen so
//! expected machine counts come out to round fractions.

use planforge_catalog::{
    BaseResourceDef, Catalog, CatalogBuilder, ItemDef, MachineDef, RecipeDef, RecipeEntry,
};

use crate::closure::ActiveRecipeMap;
use crate::optimizer::SolverOptions;
use crate::plan::{PlanRequest, Target};
use crate::strategy::Strategy;

fn item(id: &str, name: &str) -> ItemDef {
    ItemDef {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        byproduct: false,
    }
}

fn byproduct(id: &str, name: &str) -> ItemDef {
    ItemDef { byproduct: true, ..item(id, name) }
}

fn entry(item: &str, amount: f64) -> RecipeEntry {
    RecipeEntry { item: item.to_string(), amount }
}

fn machine(id: &str, name: &str, power_mw: f64) -> MachineDef {
    MachineDef { id: id.to_string(), name: name.to_string(), power_mw }
}

#[allow(clippy::too_many_arguments)]
fn recipe(
    id: &str,
    time_secs: f64,
    ingredients: Vec<RecipeEntry>,
    products: Vec<RecipeEntry>,
    produced_in: &str,
    alternate: bool,
    power_range: Option<(f64, f64)>,
) -> RecipeDef {
    RecipeDef {
        id: id.to_string(),
        name: id.to_string(),
        time_secs,
        ingredients,
        products,
        produced_in: vec![produced_in.to_string()],
        alternate,
        power_range,
    }
}

/// Build the standard test catalog. Panics on builder errors since the
/// fixture is static.
pub fn fixture_catalog() -> Catalog {
    let mut builder = CatalogBuilder::new();
    builder
        .add_item(item("iron_ore", "Iron Ore"))
        .add_item(item("copper_ore", "Copper Ore"))
        .add_item(item("iron_ingot", "Iron Ingot"))
        .add_item(item("copper_ingot", "Copper Ingot"))
        .add_item(item("iron_plate", "Iron Plate"))
        .add_item(item("iron_rod", "Iron Rod"))
        .add_item(item("quantum_plate", "Quantum Plate"))
        .add_item(byproduct("slag", "Slag"))
        .add_item(item("gadget", "Gadget"))
        .add_machine(machine("miner", "Miner", 5.0))
        .add_machine(machine("smelter", "Smelter", 4.0))
        .add_machine(machine("constructor", "Constructor", 4.0))
        .add_machine(machine("accelerator", "Accelerator", 0.0))
        .add_base_resource(BaseResourceDef {
            item: "iron_ore".to_string(),
            rate_per_min: 60.0,
            extractor: "miner".to_string(),
        })
        .add_base_resource(BaseResourceDef {
            item: "copper_ore".to_string(),
            rate_per_min: 60.0,
            extractor: "miner".to_string(),
        })
        // 60 cycles/min: one smelter covers 60 ingots/min.
        .add_recipe(recipe(
            "smelt_iron",
            1.0,
            vec![entry("iron_ore", 1.0)],
            vec![entry("iron_ingot", 1.0), entry("slag", 0.1)],
            "smelter",
            false,
            None,
        ))
        .add_recipe(recipe(
            "smelt_copper",
            2.0,
            vec![entry("copper_ore", 1.0)],
            vec![entry("copper_ingot", 1.0)],
            "smelter",
            false,
            None,
        ))
        .add_recipe(recipe(
            "iron_plate",
            4.0,
            vec![entry("iron_ingot", 2.0)],
            vec![entry("iron_plate", 1.0)],
            "constructor",
            false,
            None,
        ))
        .add_recipe(recipe(
            "iron_rod",
            4.0,
            vec![entry("iron_ingot", 1.0)],
            vec![entry("iron_rod", 1.0)],
            "constructor",
            false,
            None,
        ))
        // Lossy recycling loop: a rod costs a full ingot but returns half.
        .add_recipe(recipe(
            "scrap_recovery",
            2.0,
            vec![entry("iron_rod", 1.0)],
            vec![entry("iron_ingot", 0.5)],
            "smelter",
            true,
            None,
        ))
        .add_recipe(recipe(
            "encode_plate",
            10.0,
            vec![entry("iron_plate", 1.0)],
            vec![entry("quantum_plate", 1.0)],
            "accelerator",
            false,
            Some((250.0, 750.0)),
        ));
    match builder.build() {
        Ok(catalog) => catalog,
        Err(err) => panic!("fixture catalog must be valid: {err}"),
    }
}

/// Enable every recipe in the catalog, alternates included.
pub fn active_all(catalog: &Catalog) -> ActiveRecipeMap {
    catalog.recipes().map(|(rid, _)| (rid.clone(), true)).collect()
}

/// Shorthand for a request with default recipe activation and solver options.
pub fn request(targets: &[(&str, f64)], strategy: Strategy) -> PlanRequest {
    PlanRequest {
        targets: targets
            .iter()
            .map(|&(item, amount_per_min)| Target { item: item.to_string(), amount_per_min })
            .collect(),
        strategy,
        active_recipes: None,
        weights: None,
        solver: SolverOptions::default(),
    }
}
