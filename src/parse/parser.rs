use crate::Rule;

/// Rules read from one DSL document, in declaration order, disabled ones
/// included.
#[derive(Debug, Default)]
pub struct ParsedRuleFile {
    pub rules: Vec<Rule>,
}

impl ParsedRuleFile {
    /// Rules annotated `(disabled)`; they are dropped at compile time.
    #[must_use]
    pub fn disabled_count(&self) -> usize {
        self.rules.iter().filter(|r| !r.enabled).count()
    }

    #[must_use]
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }
}
