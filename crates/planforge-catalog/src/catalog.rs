use crate::defs::*;
use std::collections::BTreeMap;

/// Builder for constructing an immutable [`Catalog`].
/// Two-phase lifecycle: registration, then validation and freeze via
/// [`CatalogBuilder::build`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<ItemDef>,
    machines: Vec<MachineDef>,
    recipes: Vec<RecipeDef>,
    base_resources: Vec<BaseResourceDef>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: ItemDef) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn add_machine(&mut self, machine: MachineDef) -> &mut Self {
        self.machines.push(machine);
        self
    }

    pub fn add_recipe(&mut self, recipe: RecipeDef) -> &mut Self {
        self.recipes.push(recipe);
        self
    }

    pub fn add_base_resource(&mut self, base: BaseResourceDef) -> &mut Self {
        self.base_resources.push(base);
        self
    }

    /// Validate all definitions and freeze the catalog.
    ///
    /// Malformed data fails here rather than being silently defaulted:
    /// recipes must have at least one product and a positive cycle time,
    /// and every cross-reference must resolve.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut items = BTreeMap::new();
        for item in self.items {
            let id = item.id.clone();
            if items.insert(id.clone(), item).is_some() {
                return Err(CatalogError::Duplicate { kind: "item", id });
            }
        }
        let mut machines = BTreeMap::new();
        for machine in self.machines {
            let id = machine.id.clone();
            if machines.insert(id.clone(), machine).is_some() {
                return Err(CatalogError::Duplicate { kind: "machine", id });
            }
        }

        let mut recipes = BTreeMap::new();
        for recipe in self.recipes {
            if recipe.products.is_empty() {
                return Err(CatalogError::NoProducts(recipe.id));
            }
            if !(recipe.time_secs > 0.0) || !recipe.time_secs.is_finite() {
                return Err(CatalogError::InvalidCycleTime {
                    id: recipe.id,
                    time_secs: recipe.time_secs,
                });
            }
            if let Some((min, max)) = recipe.power_range {
                if !min.is_finite() || !max.is_finite() || min < 0.0 || max < min {
                    return Err(CatalogError::InvalidPowerRange(recipe.id));
                }
            }
            for entry in recipe.ingredients.iter().chain(recipe.products.iter()) {
                if !items.contains_key(&entry.item) {
                    return Err(CatalogError::UnknownItemRef {
                        recipe: recipe.id.clone(),
                        item: entry.item.clone(),
                    });
                }
            }
            let id = recipe.id.clone();
            if recipes.insert(id.clone(), recipe).is_some() {
                return Err(CatalogError::Duplicate { kind: "recipe", id });
            }
        }

        let mut base_resources = BTreeMap::new();
        for base in self.base_resources {
            if !items.contains_key(&base.item) {
                return Err(CatalogError::UnknownBaseItem(base.item));
            }
            if !machines.contains_key(&base.extractor) {
                return Err(CatalogError::UnknownMachineRef {
                    item: base.item,
                    machine: base.extractor,
                });
            }
            if !(base.rate_per_min > 0.0) || !base.rate_per_min.is_finite() {
                return Err(CatalogError::InvalidExtractionRate {
                    item: base.item,
                    rate: base.rate_per_min,
                });
            }
            let id = base.item.clone();
            if base_resources.insert(id.clone(), base).is_some() {
                return Err(CatalogError::Duplicate { kind: "base resource", id });
            }
        }

        Ok(Catalog { items, machines, recipes, base_resources })
    }
}

/// Immutable catalog. Frozen after [`CatalogBuilder::build`]; safe to share
/// across threads for the process lifetime.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: BTreeMap<ItemId, ItemDef>,
    machines: BTreeMap<MachineId, MachineDef>,
    recipes: BTreeMap<RecipeId, RecipeDef>,
    base_resources: BTreeMap<ItemId, BaseResourceDef>,
}

impl Catalog {
    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn recipe(&self, id: &str) -> Option<&RecipeDef> {
        self.recipes.get(id)
    }

    pub fn machine(&self, id: &str) -> Option<&MachineDef> {
        self.machines.get(id)
    }

    pub fn is_base_resource(&self, item: &str) -> bool {
        self.base_resources.contains_key(item)
    }

    /// Units per minute one machine extracts of a base resource.
    pub fn extraction_rate(&self, item: &str) -> Option<f64> {
        self.base_resources.get(item).map(|b| b.rate_per_min)
    }

    /// Machine type designated to extract a base resource.
    pub fn extraction_machine(&self, item: &str) -> Option<&str> {
        self.base_resources.get(item).map(|b| b.extractor.as_str())
    }

    /// Nominal power draw of a machine in MW, 0 if unknown.
    pub fn machine_power(&self, machine: &str) -> f64 {
        self.machines.get(machine).map(|m| m.power_mw).unwrap_or(0.0)
    }

    /// Human-readable machine name, falling back to the id.
    pub fn machine_display_name<'a>(&'a self, machine: &'a str) -> &'a str {
        self.machines.get(machine).map(|m| m.name.as_str()).unwrap_or(machine)
    }

    /// Human-readable item name, falling back to the id.
    pub fn item_name<'a>(&'a self, item: &'a str) -> &'a str {
        self.items.get(item).map(|i| i.name.as_str()).unwrap_or(item)
    }

    pub fn recipes(&self) -> impl Iterator<Item = (&RecipeId, &RecipeDef)> {
        self.recipes.iter()
    }

    /// Default enable state per recipe: standard recipes on, alternates off.
    pub fn default_active_recipes(&self) -> BTreeMap<RecipeId, bool> {
        self.recipes
            .iter()
            .map(|(id, r)| (id.clone(), !r.alternate))
            .collect()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate {kind} id: {id}")]
    Duplicate { kind: &'static str, id: String },
    #[error("recipe {0} has no products")]
    NoProducts(RecipeId),
    #[error("recipe {id} has invalid cycle time {time_secs}")]
    InvalidCycleTime { id: RecipeId, time_secs: f64 },
    #[error("recipe {0} has an invalid power range")]
    InvalidPowerRange(RecipeId),
    #[error("recipe {recipe} references unknown item {item}")]
    UnknownItemRef { recipe: RecipeId, item: ItemId },
    #[error("base resource references unknown item {0}")]
    UnknownBaseItem(ItemId),
    #[error("base resource {item} references unknown machine {machine}")]
    UnknownMachineRef { item: ItemId, machine: MachineId },
    #[error("base resource {item} has invalid extraction rate {rate}")]
    InvalidExtractionRate { item: ItemId, rate: f64 },
}
