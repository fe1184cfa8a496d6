//! Planforge catalog -- the immutable item/recipe/machine database that every
//! production plan is computed against.
//!
//! The catalog is loaded once at process start (usually from a JSON data
//! file, see [`loader`]) and never mutated afterward, so concurrent solves
//! may share a `&Catalog` freely without locking.
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- immutable lookup of items, recipes, base
//!   resources, and machines, frozen by [`catalog::CatalogBuilder::build`].
//! - [`defs::RecipeDef`] -- fixed input/output ratios per cycle time.
//! - [`defs::BaseResourceDef`] -- an item obtained by extraction rather than
//!   by any recipe, with a fixed rate and extractor machine.
//! - [`loader`] -- JSON deserialization into the builder, with fail-fast
//!   validation of malformed data.

pub mod catalog;
pub mod defs;
pub mod loader;

pub use catalog::{Catalog, CatalogBuilder, CatalogError};
pub use defs::{BaseResourceDef, ItemDef, ItemId, MachineDef, MachineId, RecipeDef, RecipeEntry, RecipeId};
pub use loader::{CatalogData, LoadError, load_catalog_json};
