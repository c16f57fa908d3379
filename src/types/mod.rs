mod bom;
mod cache;
mod error;
mod modifier;
mod node;
mod planner;
mod recipe;
mod rule;
mod rule_index;
mod target;
mod validator;
mod value;

pub use bom::{Bom, BomCategory, BomEntry};
pub use cache::RecipeCache;
pub use error::{CatalogError, CompileError, PlanError, RangeError};
pub use modifier::{
    ModifierCatalog, ModifierCatalogBuilder, ModifierDef, ModifierDefBuilder, ModifierKind,
};
pub use node::{Combine, Leaf, LeafItem, NodeId, OpNode};
pub use planner::{Planner, PlannerBuilder, DEFAULT_COST_CAP, DEFAULT_MAX_MODIFIERS};
pub use recipe::{ComputedRecipe, ModifierLevel, PlanReport, RecipeSpec, TotalCost};
pub(crate) use rule::Restriction;
pub use rule::{CustomCheck, Rule, RuleKind, Surcharge};
pub use rule_index::{RestrictBuilder, RuleIndex, RuleIndexBuilder};
pub use target::{target_label, TargetKind};
pub use validator::{ValidatorFn, ValidatorRegistry, Violation};
pub use value::Value;
