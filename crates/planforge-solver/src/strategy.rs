//! Strategy policy: maps a strategy name (or custom weights) to an objective
//! weight vector and a lexicographic priority ordering over the four
//! aggregate objective components.

use serde::{Deserialize, Serialize};

/// Optimization strategy selected by the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Minimize total base-resource usage first.
    ResourceEfficiency,
    /// Minimize distinct base-resource types first.
    ResourceConsolidation,
    /// Minimize distinct recipes first.
    CompactBuild,
    /// Joint focus on recipe count and base amount.
    #[default]
    BalancedProduction,
    /// Client-supplied weights, solved in a single weighted pass.
    Custom,
}

/// The four aggregate objective components of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Objective {
    TotalBase,
    UniqueBaseTypes,
    TotalMachines,
    UniqueRecipes,
}

/// Weight 4-tuple for single-pass weighted solving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub base: f64,
    pub base_types: f64,
    pub machines: f64,
    pub recipes: f64,
}

/// Client-side weight overrides for the custom strategy; unset fields keep
/// the neutral default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialWeights {
    #[serde(default)]
    pub base: Option<f64>,
    #[serde(default)]
    pub base_types: Option<f64>,
    #[serde(default)]
    pub machines: Option<f64>,
    #[serde(default)]
    pub recipes: Option<f64>,
}

impl Strategy {
    /// Preset weights for this strategy. Overrides are only honored for
    /// [`Strategy::Custom`], merged onto the neutral (1, 1, 0, 1) default.
    pub fn weights(self, overrides: Option<&PartialWeights>) -> Weights {
        let preset = match self {
            Strategy::ResourceEfficiency => {
                Weights { base: 1.0, base_types: 0.25, machines: 0.0, recipes: 0.05 }
            }
            Strategy::ResourceConsolidation => {
                Weights { base: 0.3, base_types: 3.0, machines: 0.0, recipes: 0.4 }
            }
            Strategy::CompactBuild => {
                Weights { base: 0.2, base_types: 0.1, machines: 0.0, recipes: 3.0 }
            }
            Strategy::BalancedProduction => {
                Weights { base: 1.0, base_types: 0.2, machines: 0.0, recipes: 1.0 }
            }
            Strategy::Custom => Weights { base: 1.0, base_types: 1.0, machines: 0.0, recipes: 1.0 },
        };
        match (self, overrides) {
            (Strategy::Custom, Some(o)) => Weights {
                base: finite_or(o.base, preset.base),
                base_types: finite_or(o.base_types, preset.base_types),
                machines: finite_or(o.machines, preset.machines),
                recipes: finite_or(o.recipes, preset.recipes),
            },
            _ => preset,
        }
    }

    /// Lexicographic priority ordering for named strategies; `None` for the
    /// custom strategy, which is solved in weighted mode only.
    pub fn priorities(self) -> Option<&'static [Objective]> {
        use Objective::*;
        match self {
            Strategy::ResourceEfficiency => Some(&[TotalBase, UniqueBaseTypes, UniqueRecipes]),
            Strategy::ResourceConsolidation => Some(&[UniqueBaseTypes, UniqueRecipes, TotalBase]),
            Strategy::CompactBuild => Some(&[UniqueRecipes, UniqueBaseTypes, TotalBase]),
            Strategy::BalancedProduction => Some(&[UniqueRecipes, UniqueBaseTypes, TotalBase]),
            Strategy::Custom => None,
        }
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_weight_table() {
        let w = Strategy::ResourceEfficiency.weights(None);
        assert_eq!((w.base, w.base_types, w.machines, w.recipes), (1.0, 0.25, 0.0, 0.05));
        let w = Strategy::CompactBuild.weights(None);
        assert_eq!((w.base, w.base_types, w.machines, w.recipes), (0.2, 0.1, 0.0, 3.0));
        let w = Strategy::ResourceConsolidation.weights(None);
        assert_eq!(w.base_types, 3.0);
    }

    #[test]
    fn machines_weight_is_zero_in_presets() {
        for strategy in [
            Strategy::ResourceEfficiency,
            Strategy::ResourceConsolidation,
            Strategy::CompactBuild,
            Strategy::BalancedProduction,
        ] {
            assert_eq!(strategy.weights(None).machines, 0.0);
        }
    }

    #[test]
    fn custom_merges_onto_neutral_default() {
        let overrides = PartialWeights { base: Some(2.5), machines: Some(0.5), ..Default::default() };
        let w = Strategy::Custom.weights(Some(&overrides));
        assert_eq!((w.base, w.base_types, w.machines, w.recipes), (2.5, 1.0, 0.5, 1.0));
    }

    #[test]
    fn overrides_ignored_for_named_strategies() {
        let overrides = PartialWeights { base: Some(99.0), ..Default::default() };
        let w = Strategy::BalancedProduction.weights(Some(&overrides));
        assert_eq!(w.base, 1.0);
    }

    #[test]
    fn non_finite_override_falls_back() {
        let overrides = PartialWeights { base: Some(f64::NAN), ..Default::default() };
        let w = Strategy::Custom.weights(Some(&overrides));
        assert_eq!(w.base, 1.0);
    }

    #[test]
    fn priority_orderings() {
        assert_eq!(
            Strategy::ResourceEfficiency.priorities().unwrap()[0],
            Objective::TotalBase
        );
        assert_eq!(
            Strategy::CompactBuild.priorities().unwrap()[0],
            Objective::UniqueRecipes
        );
        assert!(Strategy::Custom.priorities().is_none());
    }

    #[test]
    fn strategy_serde_names() {
        let s: Strategy = serde_json::from_str(r#""resource_efficiency""#).unwrap();
        assert_eq!(s, Strategy::ResourceEfficiency);
        assert_eq!(
            serde_json::to_string(&Strategy::BalancedProduction).unwrap(),
            r#""balanced_production""#
        );
    }
}
