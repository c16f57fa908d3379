use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::Path;

use super::error::CompileError;
use super::modifier::ModifierKind;
use super::rule::{CustomCheck, Restriction, Rule, RuleKind, Surcharge};
use super::target::TargetKind;
use super::value::Value;

/// Builder for constructing a [`RuleIndex`].
///
/// # Example
///
/// ```
/// use anvil_plan::{RuleIndex, Surcharge};
///
/// let index = RuleIndex::builder()
///     .conflict("axe_damage", ("sharpness", "smite"), ["axe"])
///     .max_level("sharpness_vi", "sharpness", 6)
///     .surcharge("mending_tax", ["mending"], Surcharge::new(2.0, 1.0))
///     .restrict("frost_boots", "frost_walker", |r| r.allow(["boots"]))
///     .compile()
///     .unwrap();
///
/// assert!(index.has_conflict("smite", "sharpness", "axe", &Default::default()));
/// assert!(!index.can_attach_to("frost_walker", "leggings"));
/// ```
#[derive(Debug, Default)]
pub struct RuleIndexBuilder {
    rules: Vec<Rule>,
}

/// Intermediate builder passed to the restriction closure.
#[derive(Debug, Default)]
pub struct RestrictBuilder {
    allow: Option<Vec<TargetKind>>,
    block: Option<Vec<TargetKind>>,
}

impl RuleIndexBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already-constructed rule, enabled or not.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// `a` and `b` conflict on each of `targets`.
    #[must_use]
    pub fn conflict<I, S>(self, id: &str, kinds: (&str, &str), targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TargetKind>,
    {
        self.push(
            id,
            RuleKind::Conflict {
                kinds: (kinds.0.into(), kinds.1.into()),
                targets: targets.into_iter().map(Into::into).collect(),
            },
        )
    }

    #[must_use]
    pub fn max_level(self, id: &str, kind: &str, level: u32) -> Self {
        self.push(
            id,
            RuleKind::MaxLevel {
                kind: kind.into(),
                level,
            },
        )
    }

    #[must_use]
    pub fn surcharge<I, S>(self, id: &str, kinds: I, surcharge: Surcharge) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModifierKind>,
    {
        self.push(
            id,
            RuleKind::Surcharge {
                kinds: kinds.into_iter().map(Into::into).collect(),
                surcharge,
            },
        )
    }

    #[must_use]
    pub fn restrict(
        self,
        id: &str,
        kind: &str,
        f: impl FnOnce(RestrictBuilder) -> RestrictBuilder,
    ) -> Self {
        let builder = f(RestrictBuilder::default());
        self.push(
            id,
            RuleKind::Restrict {
                kind: kind.into(),
                allow: builder.allow,
                block: builder.block,
            },
        )
    }

    #[must_use]
    pub fn custom<I, K>(self, id: &str, validator: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.push(
            id,
            RuleKind::Custom {
                validator: validator.to_owned(),
                params: params.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            },
        )
    }

    /// Disable every rule added so far under `id`.
    #[must_use]
    pub fn disable(mut self, id: &str) -> Self {
        for rule in self.rules.iter_mut().filter(|r| r.id == id) {
            rule.enabled = false;
        }
        self
    }

    /// Compile the enabled rules into an immutable `RuleIndex`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if validation fails.
    pub fn compile(self) -> Result<RuleIndex, CompileError> {
        crate::compile::compile(&self.rules)
    }

    fn push(mut self, id: &str, kind: RuleKind) -> Self {
        self.rules.push(Rule {
            id: id.to_owned(),
            enabled: true,
            kind,
        });
        self
    }
}

impl RestrictBuilder {
    #[must_use]
    pub fn allow<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TargetKind>,
    {
        self.allow
            .get_or_insert_with(Vec::new)
            .extend(targets.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn block<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TargetKind>,
    {
        self.block
            .get_or_insert_with(Vec::new)
            .extend(targets.into_iter().map(Into::into));
        self
    }
}

/// Compiled, immutable rule overlay. Thread-safe and designed to live behind `Arc`.
///
/// Queried by the planner for effective max levels, book multiplier
/// surcharges, conditional conflicts, and target restrictions.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    pub(crate) conflicts: HashMap<ModifierKind, HashMap<ModifierKind, HashSet<TargetKind>>>,
    pub(crate) max_levels: HashMap<ModifierKind, u32>,
    pub(crate) surcharges: HashMap<ModifierKind, Surcharge>,
    pub(crate) restrictions: HashMap<ModifierKind, Restriction>,
    pub(crate) custom: Vec<CustomCheck>,
    pub(crate) rule_count: usize,
}

impl RuleIndex {
    #[must_use]
    pub fn builder() -> RuleIndexBuilder {
        RuleIndexBuilder::new()
    }

    /// An index with no rules: every query returns the static answer.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile a list of rules.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if validation fails.
    pub fn from_rules(rules: &[Rule]) -> Result<Self, CompileError> {
        crate::compile::compile(rules)
    }

    /// Parse DSL text and compile it into a `RuleIndex`.
    ///
    /// # Errors
    ///
    /// Returns [`AnvilError`](crate::AnvilError) on parse or compile failure.
    pub fn from_dsl(input: &str) -> Result<Self, crate::AnvilError> {
        let parsed = crate::parse::parse(input)?;
        let index = crate::compile::compile(&parsed.rules)?;
        Ok(index)
    }

    /// Read a DSL file and compile it into a `RuleIndex`.
    ///
    /// # Errors
    ///
    /// Returns [`AnvilError`](crate::AnvilError) on I/O, parse, or compile failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, crate::AnvilError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_dsl(&input)
    }

    /// Like [`from_file`](Self::from_file), but never fails: an unreadable or
    /// invalid rule file is logged and replaced by an empty index.
    #[must_use]
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(index) => {
                log::debug!(
                    "loaded {} rules from {}",
                    index.rule_count,
                    path.display()
                );
                index
            }
            Err(e) => {
                log::warn!(
                    "ignoring rule file {}: {e}; continuing without rules",
                    path.display()
                );
                Self::empty()
            }
        }
    }

    /// Whether `a` and `b` may not both be applied to `target`.
    ///
    /// `base_conflicts` is the static conflict set of `a`; a static conflict
    /// always applies and cannot be lifted by rules.
    #[must_use]
    pub fn has_conflict(
        &self,
        a: &str,
        b: &str,
        target: &str,
        base_conflicts: &BTreeSet<ModifierKind>,
    ) -> bool {
        if a == b {
            return false;
        }
        if base_conflicts.contains(b) {
            return true;
        }
        self.conflicts
            .get(a)
            .and_then(|by_kind| by_kind.get(b))
            .is_some_and(|targets| targets.contains(target))
    }

    #[must_use]
    pub fn effective_max_level(&self, kind: &str, static_max: u32) -> u32 {
        self.max_levels.get(kind).copied().unwrap_or(static_max)
    }

    #[must_use]
    pub fn surcharge(&self, kind: &str) -> Surcharge {
        self.surcharges.get(kind).copied().unwrap_or_default()
    }

    /// Block lists are checked before allow lists.
    #[must_use]
    pub fn can_attach_to(&self, kind: &str, target: &str) -> bool {
        let Some(restriction) = self.restrictions.get(kind) else {
            return true;
        };
        if let Some(block) = &restriction.block {
            if block.contains(target) {
                return false;
            }
        }
        match &restriction.allow {
            Some(allow) => allow.contains(target),
            None => true,
        }
    }

    /// Custom rules, in declaration order, for the planner's validators.
    #[must_use]
    pub fn custom_checks(&self) -> &[CustomCheck] {
        &self.custom
    }

    /// Number of enabled rules compiled into this index.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    /// Number of distinct (pair, target) conditional conflicts.
    #[must_use]
    pub fn conflict_count(&self) -> usize {
        // each pair is stored in both orders
        self.conflicts
            .values()
            .flat_map(HashMap::values)
            .map(HashSet::len)
            .sum::<usize>()
            / 2
    }
}

impl fmt::Display for RuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleIndex({} rules, {} conflicts, {} max levels, {} surcharges, {} restrictions, {} custom)",
            self.rule_count,
            self.conflict_count(),
            self.max_levels.len(),
            self.surcharges.len(),
            self.restrictions.len(),
            self.custom.len(),
        )
    }
}
