//! Dependency closure: the minimal set of items and recipes reachable from
//! the targets through active production links.
//!
//! Pruning the model to this closure keeps solve times down on large
//! catalogs. When the prune looks unsafe -- no recipes found for a craftable
//! target, or a needed item left without any active producer -- the closure
//! falls back to the entire active set, trading model size for guaranteed
//! feasibility.

use std::collections::{BTreeMap, BTreeSet};

use planforge_catalog::{Catalog, ItemId, RecipeId};
use tracing::warn;

use crate::config::CLOSURE_ITERATION_CAP;
use crate::error::PlanError;

/// Per-request recipe enable map. Recipes absent from the map are inactive.
pub type ActiveRecipeMap = BTreeMap<RecipeId, bool>;

/// Items and recipes needed to satisfy a set of targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Closure {
    pub items: BTreeSet<ItemId>,
    pub recipes: BTreeSet<RecipeId>,
}

impl Closure {
    /// Whether any recipe in the closure produces `item`.
    pub fn has_producer(&self, catalog: &Catalog, item: &str) -> bool {
        self.recipes
            .iter()
            .any(|rid| catalog.recipe(rid).is_some_and(|r| r.produces(item)))
    }
}

fn is_active(active: &ActiveRecipeMap, recipe: &str) -> bool {
    active.get(recipe).copied().unwrap_or(false)
}

/// Iterative worklist traversal from the targets. Base resources terminate
/// traversal; only active recipes are followed. The iteration cap keeps
/// pathological or cyclic catalogs from spinning.
pub fn dependency_closure(
    catalog: &Catalog,
    targets: &[ItemId],
    active: &ActiveRecipeMap,
) -> Closure {
    let mut closure = Closure::default();
    let mut stack: Vec<ItemId> = targets.to_vec();
    let mut iterations = 0usize;

    while let Some(item) = stack.pop() {
        iterations += 1;
        if iterations > CLOSURE_ITERATION_CAP {
            warn!(iterations, "dependency closure hit iteration cap, result may be partial");
            break;
        }
        if !closure.items.insert(item.clone()) {
            continue;
        }
        if catalog.is_base_resource(&item) {
            continue;
        }
        for (rid, recipe) in catalog.recipes() {
            if !is_active(active, rid) || !recipe.produces(&item) {
                continue;
            }
            closure.recipes.insert(rid.clone());
            for ing in &recipe.ingredients {
                stack.push(ing.item.clone());
            }
        }
    }

    closure
}

/// Closure over the entire active recipe set, used as the safety fallback.
fn full_active_closure(
    catalog: &Catalog,
    targets: &[ItemId],
    active: &ActiveRecipeMap,
) -> Closure {
    let mut closure = Closure::default();
    closure.items.extend(targets.iter().cloned());
    for (rid, recipe) in catalog.recipes() {
        if !is_active(active, rid) {
            continue;
        }
        closure.recipes.insert(rid.clone());
        for entry in recipe.ingredients.iter().chain(recipe.products.iter()) {
            closure.items.insert(entry.item.clone());
        }
    }
    closure
}

/// True when the pruned closure cannot be trusted to yield a feasible model:
/// either no recipes survived pruning while a craftable target exists, or
/// some needed non-base, non-byproduct item has zero active producers.
fn prune_is_unsafe(catalog: &Catalog, closure: &Closure, targets: &[ItemId]) -> bool {
    if closure.recipes.is_empty()
        && targets.iter().any(|t| !catalog.is_base_resource(t))
    {
        return true;
    }
    closure.items.iter().any(|item| {
        !catalog.is_base_resource(item)
            && !catalog.item(item).is_some_and(|d| d.byproduct)
            && !closure.has_producer(catalog, item)
    })
}

/// Compute the pruned closure, falling back to the full active set when the
/// prune looks unsafe. Errors with [`PlanError::NoProducer`] if, even after
/// the fallback, a target is neither a base resource nor actively produced.
pub fn closure_with_fallback(
    catalog: &Catalog,
    targets: &[ItemId],
    active: &ActiveRecipeMap,
) -> Result<Closure, PlanError> {
    let pruned = dependency_closure(catalog, targets, active);
    let closure = if prune_is_unsafe(catalog, &pruned, targets) {
        warn!(
            pruned_recipes = pruned.recipes.len(),
            "pruned closure unsafe, recomputing over the full active set"
        );
        full_active_closure(catalog, targets, active)
    } else {
        pruned
    };

    let missing: Vec<ItemId> = targets
        .iter()
        .filter(|t| !catalog.is_base_resource(t) && !closure.has_producer(catalog, t))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(PlanError::NoProducer(missing));
    }
    Ok(closure)
}
