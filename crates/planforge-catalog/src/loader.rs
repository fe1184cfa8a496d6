//! Catalog loading from JSON data files.
//!
//! The raw serde structs mirror the on-disk schema; cross-references are
//! resolved and validated by [`CatalogBuilder::build`], so malformed data
//! fails at load time rather than mid-solve.

use crate::catalog::{Catalog, CatalogBuilder, CatalogError};
use crate::defs::{BaseResourceDef, ItemDef, MachineDef, RecipeDef};

/// Errors that can occur while loading a catalog data file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Top-level catalog data structure for JSON deserialization.
#[derive(Debug, Default, serde::Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub machines: Vec<MachineDef>,
    #[serde(default)]
    pub recipes: Vec<RecipeDef>,
    #[serde(default)]
    pub base_resources: Vec<BaseResourceDef>,
}

/// Load a catalog from a JSON string.
pub fn load_catalog_json(json: &str) -> Result<Catalog, LoadError> {
    let data: CatalogData = serde_json::from_str(json)?;
    Ok(build_catalog(data)?)
}

fn build_catalog(data: CatalogData) -> Result<Catalog, CatalogError> {
    let mut builder = CatalogBuilder::new();
    for item in data.items {
        builder.add_item(item);
    }
    for machine in data.machines {
        builder.add_machine(machine);
    }
    for recipe in data.recipes {
        builder.add_recipe(recipe);
    }
    for base in data.base_resources {
        builder.add_base_resource(base);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_empty_json() {
        let catalog = load_catalog_json(r#"{}"#).unwrap();
        assert_eq!(catalog.item_count(), 0);
        assert_eq!(catalog.recipe_count(), 0);
    }

    #[test]
    fn load_full_catalog() {
        let json = r#"{
            "items": [
                {"id": "iron_ore", "name": "Iron Ore"},
                {"id": "iron_ingot", "name": "Iron Ingot"},
                {"id": "slag", "name": "Slag", "byproduct": true}
            ],
            "machines": [
                {"id": "miner", "name": "Miner", "power_mw": 5.0},
                {"id": "smelter", "name": "Smelter", "power_mw": 4.0}
            ],
            "recipes": [
                {
                    "id": "smelt_iron",
                    "name": "Smelt Iron",
                    "time_secs": 2.0,
                    "ingredients": [{"item": "iron_ore", "amount": 1.0}],
                    "products": [
                        {"item": "iron_ingot", "amount": 1.0},
                        {"item": "slag", "amount": 0.25}
                    ],
                    "produced_in": ["smelter"]
                }
            ],
            "base_resources": [
                {"item": "iron_ore", "rate_per_min": 60.0, "extractor": "miner"}
            ]
        }"#;
        let catalog = load_catalog_json(json).unwrap();
        assert_eq!(catalog.item_count(), 3);
        assert_eq!(catalog.recipe_count(), 1);
        assert!(catalog.is_base_resource("iron_ore"));
        assert!(catalog.item("slag").unwrap().byproduct);
        let recipe = catalog.recipe("smelt_iron").unwrap();
        assert_eq!(recipe.products.len(), 2);
        assert_eq!(recipe.machine_type(), "smelter");
    }

    #[test]
    fn load_invalid_json_fails() {
        let result = load_catalog_json("not valid json {{{");
        assert!(matches!(result.unwrap_err(), LoadError::JsonParse(_)));
    }

    #[test]
    fn load_unknown_item_ref_fails() {
        let json = r#"{
            "items": [{"id": "ore", "name": "Ore"}],
            "recipes": [{
                "id": "bad",
                "name": "Bad",
                "time_secs": 1.0,
                "ingredients": [{"item": "nonexistent", "amount": 1.0}],
                "products": [{"item": "ore", "amount": 1.0}]
            }]
        }"#;
        let result = load_catalog_json(json);
        assert!(matches!(
            result.unwrap_err(),
            LoadError::Catalog(CatalogError::UnknownItemRef { .. })
        ));
    }

    #[test]
    fn load_zero_cycle_time_fails_fast() {
        // Rejected at load rather than silently defaulted to one second.
        let json = r#"{
            "items": [{"id": "ore", "name": "Ore"}],
            "recipes": [{
                "id": "bad_time",
                "name": "Bad",
                "time_secs": 0.0,
                "products": [{"item": "ore", "amount": 1.0}]
            }]
        }"#;
        let result = load_catalog_json(json);
        assert!(matches!(
            result.unwrap_err(),
            LoadError::Catalog(CatalogError::InvalidCycleTime { .. })
        ));
    }

    #[test]
    fn load_power_range_recipe() {
        let json = r#"{
            "items": [{"id": "plate", "name": "Plate"}, {"id": "q_plate", "name": "Quantum Plate"}],
            "machines": [{"id": "accelerator", "name": "Accelerator", "power_mw": 0.0}],
            "recipes": [{
                "id": "encode",
                "name": "Encode",
                "time_secs": 10.0,
                "ingredients": [{"item": "plate", "amount": 1.0}],
                "products": [{"item": "q_plate", "amount": 1.0}],
                "produced_in": ["accelerator"],
                "power_range": [250.0, 750.0]
            }]
        }"#;
        let catalog = load_catalog_json(json).unwrap();
        assert_eq!(catalog.recipe("encode").unwrap().power_range, Some((250.0, 750.0)));
    }
}
