//! MILP model construction.
//!
//! For the (possibly pruned) active recipe set R and the base items B in the
//! closure, builds continuous machine-count and base-usage variables with
//! binary activity toggles (big-M linked), per-item flow balance
//! constraints, and the four reusable objective component expressions. No
//! objective is attached at build time: the optimizer picks one per pass.

use std::collections::{BTreeMap, BTreeSet};

use good_lp::{Constraint, Expression, ProblemVariables, Variable, constraint, variable};
use planforge_catalog::{Catalog, ItemId, RecipeId};

use crate::closure::Closure;
use crate::config::{BAND_TOLERANCE, BIG_M_BASE, BIG_M_MACHINE};
use crate::strategy::Objective;

/// Demand per item in units/minute, summed over request targets.
pub type DemandMap = BTreeMap<ItemId, f64>;

/// Builds one fresh model instance per solve pass from a fixed closure and
/// demand map. Rebuilding per pass keeps each lexicographic pass independent
/// of the previous pass's solver state.
pub struct ModelBuilder<'a> {
    catalog: &'a Catalog,
    closure: &'a Closure,
    demand: &'a DemandMap,
}

/// A built model: variables, constraints, and the four objective component
/// expressions, with no objective attached yet.
pub struct ModelInstance {
    pub vars: ProblemVariables,
    pub machine_count: BTreeMap<RecipeId, Variable>,
    pub recipe_used: BTreeMap<RecipeId, Variable>,
    pub base_usage: BTreeMap<ItemId, Variable>,
    pub base_used: BTreeMap<ItemId, Variable>,
    pub constraints: Vec<Constraint>,
    components: BTreeMap<Objective, Expression>,
}

impl ModelInstance {
    /// The linear expression of one aggregate objective component.
    pub fn component(&self, objective: Objective) -> Expression {
        self.components[&objective].clone()
    }

    /// `Σ weight_k · component_k` for single-pass weighted solving.
    pub fn weighted_objective(&self, weights: &crate::strategy::Weights) -> Expression {
        let mut objective: Expression =
            self.base_usage.values().map(|&v| weights.base * v).sum();
        objective += self
            .base_used
            .values()
            .map(|&v| weights.base_types * v)
            .sum::<Expression>();
        objective += self
            .machine_count
            .values()
            .map(|&v| weights.machines * v)
            .sum::<Expression>();
        objective += self
            .recipe_used
            .values()
            .map(|&v| weights.recipes * v)
            .sum::<Expression>();
        objective
    }
}

impl<'a> ModelBuilder<'a> {
    pub fn new(catalog: &'a Catalog, closure: &'a Closure, demand: &'a DemandMap) -> Self {
        Self { catalog, closure, demand }
    }

    pub fn build(&self) -> ModelInstance {
        let mut vars = ProblemVariables::new();
        let mut constraints = Vec::new();

        // machine_count[r] >= 0 linked to binary recipe_used[r].
        let mut machine_count = BTreeMap::new();
        let mut recipe_used = BTreeMap::new();
        for rid in &self.closure.recipes {
            let m = vars.add(variable().min(0.0));
            let y = vars.add(variable().binary());
            constraints.push(constraint!(m <= BIG_M_MACHINE * y));
            machine_count.insert(rid.clone(), m);
            recipe_used.insert(rid.clone(), y);
        }

        // base_usage[b] >= 0 linked to binary base_used[b].
        let mut base_usage = BTreeMap::new();
        let mut base_used = BTreeMap::new();
        for item in &self.closure.items {
            if !self.catalog.is_base_resource(item) {
                continue;
            }
            let u = vars.add(variable().min(0.0));
            let b = vars.add(variable().binary());
            constraints.push(constraint!(u <= BIG_M_BASE * b));
            base_usage.insert(item.clone(), u);
            base_used.insert(item.clone(), b);
        }

        // Per-item production and consumption terms: (variable, rate/min).
        let mut production: BTreeMap<&str, Vec<(Variable, f64)>> = BTreeMap::new();
        let mut consumption: BTreeMap<&str, Vec<(Variable, f64)>> = BTreeMap::new();
        for rid in &self.closure.recipes {
            let Some(recipe) = self.catalog.recipe(rid) else { continue };
            let cycles = recipe.cycles_per_min();
            let m = machine_count[rid];
            for p in &recipe.products {
                production.entry(p.item.as_str()).or_default().push((m, p.amount * cycles));
            }
            for ing in &recipe.ingredients {
                consumption.entry(ing.item.as_str()).or_default().push((m, ing.amount * cycles));
            }
        }

        let mut relevant: BTreeSet<&str> = production.keys().chain(consumption.keys()).copied().collect();
        relevant.extend(self.demand.keys().map(String::as_str));

        for item in relevant {
            let demand = self.demand.get(item).copied().unwrap_or(0.0);
            if self.catalog.is_base_resource(item) {
                // Base items have no production variable; extraction covers
                // consumption plus any direct demand on the raw resource.
                let consumed = consumption.contains_key(item);
                if let Some(&u) = base_usage.get(item) {
                    if consumed || demand > 0.0 {
                        let cons = linear_sum(consumption.get(item));
                        constraints.push(constraint!(u >= cons + demand));
                    }
                }
            } else {
                let prod = linear_sum(production.get(item));
                let cons = linear_sum(consumption.get(item));
                constraints.push(constraint!(prod.clone() - cons.clone() >= demand));
                if demand > 0.0 {
                    // Cap target surplus; the tolerance absorbs floating
                    // point slack without allowing wasteful over-production.
                    constraints.push(constraint!(prod - cons <= demand * (1.0 + BAND_TOLERANCE)));
                }
            }
        }

        let mut components = BTreeMap::new();
        components.insert(
            Objective::TotalBase,
            base_usage.values().map(|&v| 1.0 * v).sum::<Expression>(),
        );
        components.insert(
            Objective::UniqueBaseTypes,
            base_used.values().map(|&v| 1.0 * v).sum::<Expression>(),
        );
        components.insert(
            Objective::TotalMachines,
            machine_count.values().map(|&v| 1.0 * v).sum::<Expression>(),
        );
        components.insert(
            Objective::UniqueRecipes,
            recipe_used.values().map(|&v| 1.0 * v).sum::<Expression>(),
        );

        ModelInstance {
            vars,
            machine_count,
            recipe_used,
            base_usage,
            base_used,
            constraints,
            components,
        }
    }
}

fn linear_sum(terms: Option<&Vec<(Variable, f64)>>) -> Expression {
    terms
        .into_iter()
        .flatten()
        .map(|&(variable, rate)| rate * variable)
        .sum()
}
