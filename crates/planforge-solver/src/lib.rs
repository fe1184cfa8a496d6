//! Planforge solver -- computes minimum-cost production plans.
//!
//! Given an immutable [`planforge_catalog::Catalog`], a set of target output
//! rates, and an optimization strategy, the solver finds the combination of
//! recipe run-rates that satisfies all demand without violating mass
//! balance, then materializes the result as an annotated production graph.
//!
//! # Pipeline
//!
//! Each call to [`plan::plan`] runs the following stages:
//!
//! 1. **Closure** -- prune the catalog to the recipes reachable from the
//!    targets through active production links ([`closure`]).
//! 2. **Model** -- build the mixed-integer linear model: machine-count and
//!    activity variables, big-M links, and per-item balance constraints
//!    ([`model`]).
//! 3. **Optimize** -- one weighted pass for the custom strategy, or a
//!    lexicographic sequence of passes for the named strategies
//!    ([`optimizer`], [`strategy`]).
//! 4. **Materialize** -- turn solved variable values into typed graph nodes
//!    with machine-count and efficiency metrics ([`graph`]).
//! 5. **Summarize** -- roll the graph into totals: machines, base resource
//!    usage, power, overall efficiency ([`summary`]).
//!
//! Every solve is stateless given its inputs: the request carries its own
//! active-recipe map and solver budget, and nothing is persisted between
//! calls.

pub mod closure;
pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod optimizer;
pub mod plan;
pub mod strategy;
pub mod summary;
pub mod util;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use closure::{ActiveRecipeMap, Closure};
pub use error::PlanError;
pub use graph::{MachineInfo, Node, ProductionGraph};
pub use optimizer::{ObjectiveComponents, SolverOptions};
pub use plan::{PlanRequest, PlanResponse, Target, plan};
pub use strategy::{Objective, PartialWeights, Strategy, Weights};
pub use summary::Summary;
