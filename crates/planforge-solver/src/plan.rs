//! Request/response surface and solve orchestration.
//!
//! `plan()` wires the pipeline together: validate targets, resolve the
//! active-recipe map, compute the dependency closure, run the optimizer, and
//! materialize the solved model into a graph plus summary. Every call is
//! stateless given its inputs.

use std::collections::BTreeMap;

use planforge_catalog::{Catalog, ItemId, RecipeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::closure::{ActiveRecipeMap, closure_with_fallback};
use crate::error::PlanError;
use crate::graph::{self, ProductionGraph};
use crate::model::{DemandMap, ModelBuilder};
use crate::optimizer::{ObjectiveComponents, Optimizer, SolverOptions};
use crate::strategy::{PartialWeights, Strategy, Weights};
use crate::summary::{Summary, summarize};
use crate::util::clean_f64;

/// One requested output: item and rate in units/minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub item: ItemId,
    #[serde(serialize_with = "clean_f64")]
    pub amount_per_min: f64,
}

/// A complete solve request.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub targets: Vec<Target>,
    #[serde(default)]
    pub strategy: Strategy,
    /// Per-request recipe enable map; falls back to the catalog defaults
    /// (standard on, alternates off) when absent.
    #[serde(default)]
    pub active_recipes: Option<BTreeMap<RecipeId, bool>>,
    /// Weight overrides, honored for the custom strategy only.
    #[serde(default)]
    pub weights: Option<PartialWeights>,
    #[serde(default)]
    pub solver: SolverOptions,
}

/// A complete solve response.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub graph: ProductionGraph,
    pub targets: Vec<Target>,
    pub objective_components: ObjectiveComponents,
    pub proven_optimal: bool,
    pub strategy_used: Strategy,
    pub weights_used: Weights,
    pub summary: Summary,
}

/// Compute a production plan for the request against an immutable catalog.
pub fn plan(catalog: &Catalog, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
    if request.targets.is_empty() {
        return Err(PlanError::EmptyTargets);
    }

    let mut demand: DemandMap = DemandMap::new();
    for target in &request.targets {
        if catalog.item(&target.item).is_none() {
            return Err(PlanError::UnknownItem(target.item.clone()));
        }
        if !target.amount_per_min.is_finite() || target.amount_per_min <= 0.0 {
            return Err(PlanError::InvalidTarget(format!(
                "{}: rate must be a positive number",
                target.item
            )));
        }
        *demand.entry(target.item.clone()).or_default() += target.amount_per_min;
    }

    let active: ActiveRecipeMap = match &request.active_recipes {
        Some(map) => map
            .iter()
            .filter(|(rid, _)| catalog.recipe(rid).is_some())
            .map(|(rid, &enabled)| (rid.clone(), enabled))
            .collect(),
        None => catalog.default_active_recipes(),
    };
    let weights = request.strategy.weights(request.weights.as_ref());

    // When every target is a base resource there is nothing to optimize:
    // the plan is direct extraction.
    if request.targets.iter().all(|t| catalog.is_base_resource(&t.item)) {
        debug!("all targets are base resources, skipping optimization");
        let graph = graph::extraction_only_graph(catalog, &demand, &request.targets);
        let summary = summarize(catalog, &graph);
        return Ok(PlanResponse {
            graph,
            targets: request.targets.clone(),
            objective_components: ObjectiveComponents {
                total_base: demand.values().sum(),
                unique_base_types: demand.len() as f64,
                ..Default::default()
            },
            proven_optimal: true,
            strategy_used: request.strategy,
            weights_used: weights,
            summary,
        });
    }

    let target_items: Vec<ItemId> = demand.keys().cloned().collect();
    let closure = closure_with_fallback(catalog, &target_items, &active)?;
    debug!(
        items = closure.items.len(),
        recipes = closure.recipes.len(),
        strategy = ?request.strategy,
        "solving production model"
    );

    let builder = ModelBuilder::new(catalog, &closure, &demand);
    let solved = Optimizer::new(builder, request.solver).solve(request.strategy, &weights)?;
    let graph = graph::materialize(catalog, &closure, &request.targets, &solved);
    let summary = summarize(catalog, &graph);

    Ok(PlanResponse {
        graph,
        targets: request.targets.clone(),
        objective_components: solved.components,
        proven_optimal: solved.proven_optimal,
        strategy_used: request.strategy,
        weights_used: weights,
        summary,
    })
}
