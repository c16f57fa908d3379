use std::collections::HashSet;

use super::modifier::ModifierKind;
use super::target::TargetKind;
use super::value::Value;

/// A declarative policy adjustment applied on top of static modifier data.
///
/// Rules are created via [`RuleIndexBuilder`](super::RuleIndexBuilder) or by
/// parsing DSL text with [`RuleIndex::from_dsl()`](super::RuleIndex::from_dsl).
/// Disabled rules are dropped before compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub enabled: bool,
    pub kind: RuleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// The two kinds conflict, but only on the listed targets.
    Conflict {
        kinds: (ModifierKind, ModifierKind),
        targets: Vec<TargetKind>,
    },
    /// Replace the static max level of a kind.
    MaxLevel { kind: ModifierKind, level: u32 },
    /// Adjust the book multiplier of every listed kind.
    Surcharge {
        kinds: Vec<ModifierKind>,
        surcharge: Surcharge,
    },
    /// Limit which targets a kind may be applied to.
    Restrict {
        kind: ModifierKind,
        allow: Option<Vec<TargetKind>>,
        block: Option<Vec<TargetKind>>,
    },
    /// Escape hatch handled by a caller-registered validator.
    Custom {
        validator: String,
        params: Vec<(String, Value)>,
    },
}

/// Additive then multiplicative adjustment to a book multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surcharge {
    pub additive: f64,
    pub multiplicative: f64,
}

impl Surcharge {
    pub const IDENTITY: Surcharge = Surcharge {
        additive: 0.0,
        multiplicative: 1.0,
    };

    #[must_use]
    pub fn new(additive: f64, multiplicative: f64) -> Self {
        Self {
            additive,
            multiplicative,
        }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// `round((base + additive) * multiplicative)`, clamped to zero.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn apply(&self, base: u32) -> u32 {
        let adjusted = ((f64::from(base) + self.additive) * self.multiplicative).round();
        if adjusted <= 0.0 {
            0
        } else if adjusted >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            adjusted as u32
        }
    }
}

impl Default for Surcharge {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Compiled form of a [`RuleKind::Restrict`] rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Restriction {
    pub(crate) allow: Option<HashSet<TargetKind>>,
    pub(crate) block: Option<HashSet<TargetKind>>,
}

/// A [`RuleKind::Custom`] rule kept for the planner's validator registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomCheck {
    pub rule_id: String,
    pub validator: String,
    pub params: Vec<(String, Value)>,
}

impl CustomCheck {
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_surcharge_keeps_base() {
        assert_eq!(Surcharge::IDENTITY.apply(4), 4);
        assert!(Surcharge::default().is_identity());
    }

    #[test]
    fn surcharge_adds_then_multiplies() {
        assert_eq!(Surcharge::new(2.0, 1.5).apply(2), 6);
        assert_eq!(Surcharge::new(0.0, 1.5).apply(1), 2);
        assert_eq!(Surcharge::new(1.0, 1.0).apply(1), 2);
    }

    #[test]
    fn surcharge_clamps_at_zero() {
        assert_eq!(Surcharge::new(-5.0, 1.0).apply(2), 0);
    }

    #[test]
    fn custom_check_param_lookup() {
        let check = CustomCheck {
            rule_id: "loot".into(),
            validator: "loot_table".into(),
            params: vec![("weight".into(), Value::Int(3))],
        };
        assert_eq!(check.param("weight"), Some(&Value::Int(3)));
        assert_eq!(check.param("pool"), None);
    }
}
