use std::fmt;
use std::time::Duration;

use super::modifier::ModifierKind;
use super::node::OpNode;
use super::target::{title_case, TargetKind};

/// A modifier at a specific level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierLevel {
    pub kind: ModifierKind,
    pub level: u32,
}

impl ModifierLevel {
    #[must_use]
    pub fn new(kind: impl Into<ModifierKind>, level: u32) -> Self {
        Self {
            kind: kind.into(),
            level,
        }
    }

    /// Label of a book carrying just this modifier: `Fire Aspect 2 Book`.
    #[must_use]
    pub fn book_label(&self) -> String {
        format!("{self} Book")
    }
}

impl fmt::Display for ModifierLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", title_case(self.kind.as_str()), self.level)
    }
}

/// One catalog entry: the target and the modifiers to merge onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecipeSpec {
    pub target: TargetKind,
    pub material: Option<String>,
    pub modifiers: Vec<ModifierLevel>,
}

impl RecipeSpec {
    #[must_use]
    pub fn new(target: impl Into<TargetKind>) -> Self {
        Self {
            target: target.into(),
            material: None,
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    #[must_use]
    pub fn modifier(mut self, kind: impl Into<ModifierKind>, level: u32) -> Self {
        self.modifiers.push(ModifierLevel::new(kind, level));
        self
    }
}

/// Total level cost of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TotalCost {
    Levels(u32),
    /// Every ordering has at least one step above the cost cap.
    Infeasible,
}

impl TotalCost {
    #[must_use]
    pub fn levels(self) -> Option<u32> {
        match self {
            TotalCost::Levels(n) => Some(n),
            TotalCost::Infeasible => None,
        }
    }

    #[must_use]
    pub fn is_feasible(self) -> bool {
        matches!(self, TotalCost::Levels(_))
    }
}

impl fmt::Display for TotalCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalCost::Levels(n) => write!(f, "{n} levels"),
            TotalCost::Infeasible => write!(f, "too expensive"),
        }
    }
}

/// The cheapest combination plan found for a [`RecipeSpec`].
///
/// Check [`is_feasible`](Self::is_feasible) before trusting the totals: an
/// infeasible recipe carries the bare target leaf and zero point totals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct ComputedRecipe {
    pub tree: OpNode,
    pub total: TotalCost,
    /// Level cost of every combine step, in execution order.
    pub step_costs: Vec<u32>,
    /// Points spent when each step is paid for from zero.
    pub incremental_points: u64,
    /// Points saved up front to afford the most expensive step.
    pub bulk_points: u64,
}

impl ComputedRecipe {
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.total.is_feasible()
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_costs.len()
    }
}

impl fmt::Display for ComputedRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}, {} steps, {} points incremental, {} points bulk)",
            self.tree.label(),
            self.total,
            self.step_count(),
            self.incremental_points,
            self.bulk_points,
        )?;
        write!(f, "{}", self.tree)
    }
}

/// Search diagnostics returned by
/// [`Planner::compute_detailed()`](super::planner::Planner::compute_detailed).
#[derive(Debug, Clone)]
#[must_use]
pub struct PlanReport {
    recipe: ComputedRecipe,
    orderings: usize,
    feasible_orderings: usize,
    duration: Duration,
}

impl PlanReport {
    pub(crate) fn new(
        recipe: ComputedRecipe,
        orderings: usize,
        feasible_orderings: usize,
        duration: Duration,
    ) -> Self {
        Self {
            recipe,
            orderings,
            feasible_orderings,
            duration,
        }
    }

    pub fn recipe(&self) -> &ComputedRecipe {
        &self.recipe
    }

    pub fn into_recipe(self) -> ComputedRecipe {
        self.recipe
    }

    /// Number of candidate orderings evaluated.
    #[must_use]
    pub fn orderings(&self) -> usize {
        self.orderings
    }

    /// Orderings whose every step stayed within the cost cap.
    #[must_use]
    pub fn feasible_orderings(&self) -> usize {
        self.feasible_orderings
    }

    /// Wall-clock duration of the search.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total: {}, orderings: {} ({} feasible), duration: {:?}",
            self.recipe.total, self.orderings, self.feasible_orderings, self.duration
        )
    }
}
