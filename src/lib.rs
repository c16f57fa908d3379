//! Cheapest-order planning for anvil combining.
//!
//! A [`Planner`] takes a [`RecipeSpec`] (a target plus the modifiers to put on
//! it) and searches every combination order for the one with the lowest total
//! level cost, keeping each single operation under the cost cap. The result is
//! a binary [`OpNode`] tree with per-step costs and point totals from [`xp`].
//! A [`RuleIndex`] overlays conditional conflicts, max level overrides,
//! surcharges and target restrictions on the static [`ModifierCatalog`], and
//! [`Bom`] turns a finished tree into a shopping list.

mod bom;
mod compile;
mod error;
mod optimize;
pub mod parse;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;
mod vanilla;
pub mod xp;

pub use error::AnvilError;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    target_label, Bom, BomCategory, BomEntry, CatalogError, Combine, CompileError,
    ComputedRecipe, CustomCheck, Leaf, LeafItem, ModifierCatalog, ModifierCatalogBuilder,
    ModifierDef, ModifierDefBuilder, ModifierKind, ModifierLevel, NodeId, OpNode, PlanError,
    PlanReport, Planner, PlannerBuilder, RangeError, RecipeCache, RecipeSpec, RestrictBuilder, Rule,
    RuleIndex, RuleIndexBuilder, RuleKind, Surcharge, TargetKind, TotalCost, ValidatorFn,
    ValidatorRegistry, Value, Violation, DEFAULT_COST_CAP, DEFAULT_MAX_MODIFIERS,
};
