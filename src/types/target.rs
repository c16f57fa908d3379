use std::borrow::Borrow;
use std::fmt;

/// Identifier for a kind of target object, e.g. `sword` or `boots`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetKind(String);

impl TargetKind {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TargetKind {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetKind {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TargetKind {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display label for a target object, optionally prefixed by its material.
///
/// `target_label(&"sword".into(), Some("netherite"))` is `"Netherite Sword"`.
#[must_use]
pub fn target_label(target: &TargetKind, material: Option<&str>) -> String {
    match material {
        Some(material) if !material.is_empty() => {
            format!("{} {}", title_case(material), title_case(target.as_str()))
        }
        _ => title_case(target.as_str()),
    }
}

/// `fire_aspect` -> `Fire Aspect`.
pub(crate) fn title_case(id: &str) -> String {
    id.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_with_material() {
        let label = target_label(&TargetKind::from("sword"), Some("netherite"));
        assert_eq!(label, "Netherite Sword");
    }

    #[test]
    fn label_without_material() {
        assert_eq!(target_label(&"fishing_rod".into(), None), "Fishing Rod");
        assert_eq!(target_label(&"boots".into(), Some("")), "Boots");
    }

    #[test]
    fn title_case_collapses_separators() {
        assert_eq!(title_case("bane_of__arthropods"), "Bane Of Arthropods");
        assert_eq!(title_case(""), "");
    }
}
