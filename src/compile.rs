use std::collections::HashSet;

use crate::types::{Restriction, RuleIndex};
use crate::{CompileError, CustomCheck, Rule, RuleKind, Surcharge};

pub(crate) fn compile(rules: &[Rule]) -> Result<RuleIndex, CompileError> {
    check_duplicates(rules)?;

    let mut index = RuleIndex::default();

    for rule in rules.iter().filter(|r| r.enabled) {
        check_rule(rule)?;
        match &rule.kind {
            RuleKind::Conflict { kinds, targets } => {
                let (a, b) = kinds;
                for target in targets {
                    index
                        .conflicts
                        .entry(a.clone())
                        .or_default()
                        .entry(b.clone())
                        .or_default()
                        .insert(target.clone());
                    index
                        .conflicts
                        .entry(b.clone())
                        .or_default()
                        .entry(a.clone())
                        .or_default()
                        .insert(target.clone());
                }
            }
            RuleKind::MaxLevel { kind, level } => {
                index.max_levels.insert(kind.clone(), *level);
            }
            RuleKind::Surcharge { kinds, surcharge } => {
                for kind in kinds {
                    index.surcharges.insert(kind.clone(), *surcharge);
                }
            }
            RuleKind::Restrict { kind, allow, block } => {
                index.restrictions.insert(
                    kind.clone(),
                    Restriction {
                        allow: allow.as_ref().map(|t| t.iter().cloned().collect()),
                        block: block.as_ref().map(|t| t.iter().cloned().collect()),
                    },
                );
            }
            RuleKind::Custom { validator, params } => {
                index.custom.push(CustomCheck {
                    rule_id: rule.id.clone(),
                    validator: validator.clone(),
                    params: params.clone(),
                });
            }
        }
    }

    index.rule_count = rules.iter().filter(|r| r.enabled).count();
    Ok(index)
}

fn check_duplicates(rules: &[Rule]) -> Result<(), CompileError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(&rule.id) {
            return Err(CompileError::DuplicateRule {
                id: rule.id.clone(),
            });
        }
    }
    Ok(())
}

fn check_rule(rule: &Rule) -> Result<(), CompileError> {
    match &rule.kind {
        RuleKind::Conflict { kinds: (a, b), targets } => {
            if a == b {
                return Err(CompileError::SelfConflict {
                    rule: rule.id.clone(),
                    kind: a.to_string(),
                });
            }
            if targets.is_empty() {
                return Err(CompileError::EmptyTargets {
                    rule: rule.id.clone(),
                });
            }
        }
        RuleKind::MaxLevel { kind, level } => {
            if *level == 0 {
                return Err(CompileError::InvalidMaxLevel {
                    rule: rule.id.clone(),
                    kind: kind.to_string(),
                });
            }
        }
        RuleKind::Surcharge { surcharge, .. } => check_surcharge(&rule.id, surcharge)?,
        RuleKind::Restrict { .. } | RuleKind::Custom { .. } => {}
    }
    Ok(())
}

fn check_surcharge(rule: &str, surcharge: &Surcharge) -> Result<(), CompileError> {
    if !surcharge.additive.is_finite() || !surcharge.multiplicative.is_finite() {
        return Err(CompileError::InvalidSurcharge {
            rule: rule.to_owned(),
            reason: "values must be finite".to_owned(),
        });
    }
    if surcharge.multiplicative < 0.0 {
        return Err(CompileError::InvalidSurcharge {
            rule: rule.to_owned(),
            reason: format!("negative multiplier {}", surcharge.multiplicative),
        });
    }
    Ok(())
}
