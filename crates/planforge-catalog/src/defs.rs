use serde::{Deserialize, Serialize};

/// Item identifier, e.g. `"iron_ingot"`. Catalog data files use stable
/// string ids so that requests and responses stay human-readable.
pub type ItemId = String;
/// Recipe identifier, e.g. `"smelt_iron"`.
pub type RecipeId = String;
/// Machine type identifier, e.g. `"smelter"`.
pub type MachineId = String;

/// An item that can appear in recipe inputs/outputs or as a plan target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Byproduct items may legitimately have no active producer; the
    /// feasibility checks in the solver skip them.
    #[serde(default)]
    pub byproduct: bool,
}

/// One input or output line of a recipe: item and amount per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeEntry {
    pub item: ItemId,
    pub amount: f64,
}

/// A recipe: fixed ratios of inputs consumed and outputs produced per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDef {
    pub id: RecipeId,
    pub name: String,
    /// Cycle time in seconds. Validated > 0 at catalog build.
    pub time_secs: f64,
    #[serde(default)]
    pub ingredients: Vec<RecipeEntry>,
    pub products: Vec<RecipeEntry>,
    /// Machine types eligible to run this recipe, in preference order.
    #[serde(default)]
    pub produced_in: Vec<MachineId>,
    /// Alternate recipes are inactive by default.
    #[serde(default)]
    pub alternate: bool,
    /// Variable-power recipes declare a (min, max) MW range; power accounting
    /// charges them at the arithmetic mean instead of the machine's nominal
    /// draw.
    #[serde(default)]
    pub power_range: Option<(f64, f64)>,
}

impl RecipeDef {
    /// Cycles completed per minute by a single machine.
    pub fn cycles_per_min(&self) -> f64 {
        60.0 / self.time_secs
    }

    /// The preferred machine type for this recipe.
    pub fn machine_type(&self) -> &str {
        self.produced_in.first().map(String::as_str).unwrap_or("unknown")
    }

    /// Whether this recipe has `item` among its products.
    pub fn produces(&self, item: &str) -> bool {
        self.products.iter().any(|p| p.item == item)
    }
}

/// A base resource: extracted rather than crafted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseResourceDef {
    pub item: ItemId,
    /// Units per minute extracted by one machine at 100% utilization.
    pub rate_per_min: f64,
    pub extractor: MachineId,
}

/// A machine type: display name and nominal power draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDef {
    pub id: MachineId,
    pub name: String,
    /// Nominal power draw in MW.
    #[serde(default)]
    pub power_mw: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(time_secs: f64) -> RecipeDef {
        RecipeDef {
            id: "smelt_iron".into(),
            name: "Smelt Iron".into(),
            time_secs,
            ingredients: vec![RecipeEntry { item: "iron_ore".into(), amount: 1.0 }],
            products: vec![RecipeEntry { item: "iron_ingot".into(), amount: 1.0 }],
            produced_in: vec!["smelter".into()],
            alternate: false,
            power_range: None,
        }
    }

    #[test]
    fn cycles_per_min_from_cycle_time() {
        assert_eq!(recipe(1.0).cycles_per_min(), 60.0);
        assert_eq!(recipe(4.0).cycles_per_min(), 15.0);
    }

    #[test]
    fn produces_checks_products_only() {
        let r = recipe(2.0);
        assert!(r.produces("iron_ingot"));
        assert!(!r.produces("iron_ore"));
    }

    #[test]
    fn machine_type_falls_back_when_unset() {
        let mut r = recipe(2.0);
        r.produced_in.clear();
        assert_eq!(r.machine_type(), "unknown");
    }
}
