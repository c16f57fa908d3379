use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use super::error::PlanError;
use super::modifier::ModifierCatalog;
use super::recipe::{ComputedRecipe, PlanReport, RecipeSpec, TotalCost};
use super::rule::CustomCheck;
use super::rule_index::RuleIndex;
use super::target::target_label;
use super::validator::{ValidatorRegistry, Violation};
use crate::optimize::{self, Candidate};
use crate::xp;

/// Highest level cost a single anvil operation may have.
pub const DEFAULT_COST_CAP: u32 = 39;

/// Largest modifier count the exhaustive search accepts by default.
pub const DEFAULT_MAX_MODIFIERS: usize = 8;

/// Builder for a [`Planner`].
///
/// # Example
///
/// ```
/// use anvil_plan::{ModifierCatalog, Planner, RecipeSpec, RuleIndex};
///
/// let rules = RuleIndex::from_dsl("rule cheap_mending:\n    surcharge mending add -1").unwrap();
/// let planner = Planner::builder(ModifierCatalog::vanilla())
///     .rules(rules)
///     .cost_cap(39)
///     .build();
///
/// let recipe = planner
///     .compute(&RecipeSpec::new("sword").material("netherite").modifier("sharpness", 5))
///     .unwrap();
/// assert_eq!(recipe.total.levels(), Some(5));
/// ```
#[derive(Debug)]
pub struct PlannerBuilder {
    catalog: ModifierCatalog,
    rules: RuleIndex,
    cost_cap: u32,
    max_modifiers: usize,
    validators: ValidatorRegistry,
}

impl PlannerBuilder {
    #[must_use]
    pub fn new(catalog: ModifierCatalog) -> Self {
        Self {
            catalog,
            rules: RuleIndex::empty(),
            cost_cap: DEFAULT_COST_CAP,
            max_modifiers: DEFAULT_MAX_MODIFIERS,
            validators: ValidatorRegistry::new(),
        }
    }

    #[must_use]
    pub fn rules(mut self, rules: RuleIndex) -> Self {
        self.rules = rules;
        self
    }

    /// Per-operation level cap. Steps costing more than this are rejected.
    #[must_use]
    pub fn cost_cap(mut self, cap: u32) -> Self {
        self.cost_cap = cap;
        self
    }

    /// Requests with more modifiers than this fail with
    /// [`PlanError::TooManyModifiers`]. The search is factorial in this number.
    #[must_use]
    pub fn max_modifiers(mut self, limit: usize) -> Self {
        self.max_modifiers = limit;
        self
    }

    /// Register a handler for custom rules naming `name` as their validator.
    #[must_use]
    pub fn validator(
        mut self,
        name: &str,
        handler: impl Fn(&RecipeSpec, &CustomCheck) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validators.register(name, handler);
        self
    }

    #[must_use]
    pub fn build(self) -> Planner {
        Planner {
            catalog: self.catalog,
            rules: self.rules,
            cost_cap: self.cost_cap,
            max_modifiers: self.max_modifiers,
            validators: self.validators,
        }
    }
}

/// Computes cheapest combination plans. Immutable and designed to live
/// behind `Arc`.
#[derive(Debug)]
pub struct Planner {
    catalog: ModifierCatalog,
    rules: RuleIndex,
    cost_cap: u32,
    max_modifiers: usize,
    validators: ValidatorRegistry,
}

impl Planner {
    #[must_use]
    pub fn builder(catalog: ModifierCatalog) -> PlannerBuilder {
        PlannerBuilder::new(catalog)
    }

    #[must_use]
    pub fn catalog(&self) -> &ModifierCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn rules(&self) -> &RuleIndex {
        &self.rules
    }

    #[must_use]
    pub fn cost_cap(&self) -> u32 {
        self.cost_cap
    }

    #[must_use]
    pub fn max_modifiers(&self) -> usize {
        self.max_modifiers
    }

    /// Find the cheapest way to apply every modifier of `spec`.
    ///
    /// An over-cap recipe is not an error: the result carries
    /// [`TotalCost::Infeasible`] and the bare target leaf.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] for unknown modifiers, level 0 requests, or more
    /// modifiers than the configured limit.
    pub fn compute(&self, spec: &RecipeSpec) -> Result<ComputedRecipe, PlanError> {
        self.compute_detailed(spec).map(PlanReport::into_recipe)
    }

    /// Like [`compute`](Self::compute), with search statistics.
    ///
    /// # Errors
    ///
    /// Same as [`compute`](Self::compute).
    pub fn compute_detailed(&self, spec: &RecipeSpec) -> Result<PlanReport, PlanError> {
        let start = Instant::now();
        let candidates = self.candidates(spec)?;
        let label = target_label(&spec.target, spec.material.as_deref());

        let outcome = optimize::search(&candidates, &label, self.cost_cap);

        let recipe = if outcome.feasible {
            let step_costs: Vec<u32> = outcome.tree.steps().iter().map(|s| s.cost).collect();
            ComputedRecipe {
                total: TotalCost::Levels(outcome.total),
                incremental_points: xp::incremental_total(&step_costs),
                bulk_points: xp::bulk_total(&step_costs),
                step_costs,
                tree: outcome.tree,
            }
        } else {
            ComputedRecipe {
                tree: outcome.tree,
                total: TotalCost::Infeasible,
                step_costs: Vec::new(),
                incremental_points: 0,
                bulk_points: 0,
            }
        };

        Ok(PlanReport::new(
            recipe,
            outcome.orderings,
            outcome.feasible_orderings,
            start.elapsed(),
        ))
    }

    /// Check `spec` against the catalog and rule overlay without searching.
    ///
    /// Custom rules whose validator is not registered pass.
    #[must_use]
    pub fn validate(&self, spec: &RecipeSpec) -> Vec<Violation> {
        let target = spec.target.as_str();
        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for requested in &spec.modifiers {
            let kind = requested.kind.as_str();
            if !seen.insert(kind) {
                violations.push(Violation::Duplicate {
                    kind: kind.to_owned(),
                });
                continue;
            }
            let Some(def) = self.catalog.get(kind) else {
                violations.push(Violation::UnknownModifier {
                    kind: kind.to_owned(),
                });
                continue;
            };
            if requested.level == 0 {
                violations.push(Violation::ZeroLevel {
                    kind: kind.to_owned(),
                });
            }
            let max = self.rules.effective_max_level(kind, def.max_level);
            if requested.level > max {
                violations.push(Violation::LevelTooHigh {
                    kind: kind.to_owned(),
                    level: requested.level,
                    max,
                });
            }
            let static_ok = def.targets.is_empty() || def.targets.contains(target);
            if !static_ok || !self.rules.can_attach_to(kind, target) {
                violations.push(Violation::NotApplicable {
                    kind: kind.to_owned(),
                    target: target.to_owned(),
                });
            }
        }

        let mut distinct = HashSet::new();
        let known: Vec<&str> = spec
            .modifiers
            .iter()
            .map(|m| m.kind.as_str())
            .filter(|k| self.catalog.contains(k) && distinct.insert(*k))
            .collect();
        for (i, a) in known.iter().enumerate() {
            let Some(def) = self.catalog.get(a) else {
                continue;
            };
            for b in &known[i + 1..] {
                if self.rules.has_conflict(a, b, target, &def.conflicts) {
                    violations.push(Violation::Conflict {
                        first: (*a).to_owned(),
                        second: (*b).to_owned(),
                    });
                }
            }
        }

        for check in self.rules.custom_checks() {
            match self.validators.get(&check.validator) {
                Some(handler) => {
                    if !handler(spec, check) {
                        violations.push(Violation::CustomRule {
                            rule_id: check.rule_id.clone(),
                            validator: check.validator.clone(),
                        });
                    }
                }
                None => log::info!(
                    "rule '{}': no validator registered for '{}', treating as passed",
                    check.rule_id,
                    check.validator
                ),
            }
        }

        violations
    }

    /// Resolve multipliers and put the request into canonical search order.
    fn candidates(&self, spec: &RecipeSpec) -> Result<Vec<Candidate>, PlanError> {
        if spec.modifiers.len() > self.max_modifiers {
            return Err(PlanError::TooManyModifiers {
                count: spec.modifiers.len(),
                limit: self.max_modifiers,
            });
        }

        let mut candidates = spec
            .modifiers
            .iter()
            .map(|requested| {
                let kind = requested.kind.as_str();
                let def = self
                    .catalog
                    .get(kind)
                    .ok_or_else(|| PlanError::UnknownModifier {
                        kind: kind.to_owned(),
                    })?;
                if requested.level == 0 {
                    return Err(PlanError::ZeroLevel {
                        kind: kind.to_owned(),
                    });
                }
                Ok(Candidate {
                    modifier: requested.clone(),
                    book_multiplier: self.rules.surcharge(kind).apply(def.book_multiplier),
                    item_multiplier: def.item_multiplier,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // stable, so equal weights keep request order
        candidates.sort_by_key(Candidate::book_weight);
        Ok(candidates)
    }
}

impl fmt::Display for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Planner({}, {}, cap {}, max {} modifiers)",
            self.catalog, self.rules, self.cost_cap, self.max_modifiers
        )
    }
}
