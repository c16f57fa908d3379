use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::recipe::RecipeSpec;
use super::rule::CustomCheck;

/// Handler for a [`RuleKind::Custom`](super::RuleKind::Custom) rule. Returns
/// `true` when the recipe passes.
pub type ValidatorFn = dyn Fn(&RecipeSpec, &CustomCheck) -> bool + Send + Sync;

/// Named handlers for custom rules, looked up by the rule's validator name.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    handlers: HashMap<String, Arc<ValidatorFn>>,
}

impl ValidatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any earlier handler.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn(&RecipeSpec, &CustomCheck) -> bool + Send + Sync + 'static,
    ) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ValidatorFn> {
        self.handlers.get(name).map(|h| &**h)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRegistry")
            .field("handlers", &names)
            .finish()
    }
}

/// A reason a [`RecipeSpec`] cannot be applied as requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    UnknownModifier {
        kind: String,
    },
    ZeroLevel {
        kind: String,
    },
    LevelTooHigh {
        kind: String,
        level: u32,
        max: u32,
    },
    Duplicate {
        kind: String,
    },
    Conflict {
        first: String,
        second: String,
    },
    NotApplicable {
        kind: String,
        target: String,
    },
    CustomRule {
        rule_id: String,
        validator: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownModifier { kind } => write!(f, "unknown modifier '{kind}'"),
            Violation::ZeroLevel { kind } => write!(f, "'{kind}' requested at level 0"),
            Violation::LevelTooHigh { kind, level, max } => {
                write!(f, "'{kind}' level {level} exceeds max level {max}")
            }
            Violation::Duplicate { kind } => write!(f, "'{kind}' requested more than once"),
            Violation::Conflict { first, second } => {
                write!(f, "'{first}' conflicts with '{second}'")
            }
            Violation::NotApplicable { kind, target } => {
                write!(f, "'{kind}' cannot be applied to '{target}'")
            }
            Violation::CustomRule { rule_id, validator } => {
                write!(f, "rule '{rule_id}' rejected by validator '{validator}'")
            }
        }
    }
}
