use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use super::error::CatalogError;
use super::target::TargetKind;

/// Identifier for a category of enhancement, e.g. `sharpness`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierKind(String);

impl ModifierKind {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModifierKind {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModifierKind {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModifierKind {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static metadata for one [`ModifierKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierDef {
    pub max_level: u32,
    /// Cost per level when the modifier is consumed from a book.
    pub book_multiplier: u32,
    /// Cost per level when the modifier is consumed from an item.
    pub item_multiplier: u32,
    pub conflicts: BTreeSet<ModifierKind>,
    pub targets: BTreeSet<TargetKind>,
}

/// Read-only modifier metadata, built once and passed to the planner.
///
/// # Example
///
/// ```
/// use anvil_plan::ModifierCatalog;
///
/// let catalog = ModifierCatalog::builder()
///     .modifier("sharpness", |m| {
///         m.max_level(5).multipliers(1, 1).targets(["sword", "axe"]).conflicts(["smite"])
///     })
///     .modifier("smite", |m| m.max_level(5).multipliers(2, 1).targets(["sword", "axe"]))
///     .build()
///     .unwrap();
///
/// // static conflicts are made symmetric
/// assert!(catalog.get("smite").unwrap().conflicts.contains("sharpness"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModifierCatalog {
    defs: HashMap<ModifierKind, ModifierDef>,
}

impl ModifierCatalog {
    #[must_use]
    pub fn builder() -> ModifierCatalogBuilder {
        ModifierCatalogBuilder::default()
    }

    /// The built-in reference data set.
    #[must_use]
    pub fn vanilla() -> Self {
        crate::vanilla::catalog()
    }

    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&ModifierDef> {
        self.defs.get(kind)
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.defs.contains_key(kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Modifier kinds in sorted order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&ModifierKind> {
        let mut kinds: Vec<&ModifierKind> = self.defs.keys().collect();
        kinds.sort();
        kinds
    }

    /// Sorted kinds that may be applied to `target` according to static data.
    #[must_use]
    pub fn applicable_to(&self, target: &str) -> Vec<&ModifierKind> {
        let mut kinds: Vec<&ModifierKind> = self
            .defs
            .iter()
            .filter(|(_, def)| def.targets.contains(target))
            .map(|(kind, _)| kind)
            .collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Display for ModifierCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModifierCatalog({} modifiers)", self.defs.len())
    }
}

/// Builder for [`ModifierCatalog`].
#[derive(Debug, Default)]
pub struct ModifierCatalogBuilder {
    entries: Vec<(ModifierKind, ModifierDef)>,
}

/// Intermediate builder passed to the modifier definition closure.
#[derive(Debug)]
pub struct ModifierDefBuilder {
    def: ModifierDef,
}

impl ModifierCatalogBuilder {
    /// Define a modifier. Unset fields default to max level 1, multipliers of 1
    /// and no conflicts or targets.
    #[must_use]
    pub fn modifier(
        mut self,
        kind: &str,
        f: impl FnOnce(ModifierDefBuilder) -> ModifierDefBuilder,
    ) -> Self {
        let builder = f(ModifierDefBuilder {
            def: ModifierDef {
                max_level: 1,
                book_multiplier: 1,
                item_multiplier: 1,
                conflicts: BTreeSet::new(),
                targets: BTreeSet::new(),
            },
        });
        self.entries.push((ModifierKind::new(kind), builder.def));
        self
    }

    /// Validate the definitions and freeze them into a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for duplicate kinds or a max level of 0.
    pub fn build(self) -> Result<ModifierCatalog, CatalogError> {
        let mut seen = HashSet::new();
        for (kind, def) in &self.entries {
            if def.max_level == 0 {
                return Err(CatalogError::ZeroMaxLevel {
                    kind: kind.to_string(),
                });
            }
            if !seen.insert(kind) {
                return Err(CatalogError::DuplicateModifier {
                    kind: kind.to_string(),
                });
            }
        }
        Ok(self.freeze())
    }

    /// Build without validation, for data already known to be well formed.
    pub(crate) fn freeze(self) -> ModifierCatalog {
        let mut defs: HashMap<ModifierKind, ModifierDef> = self.entries.into_iter().collect();

        let pairs: Vec<(ModifierKind, ModifierKind)> = defs
            .iter()
            .flat_map(|(kind, def)| def.conflicts.iter().map(|other| (other.clone(), kind.clone())))
            .collect();
        for (kind, other) in pairs {
            if let Some(def) = defs.get_mut(&kind) {
                def.conflicts.insert(other);
            }
        }

        ModifierCatalog { defs }
    }
}

impl ModifierDefBuilder {
    #[must_use]
    pub fn max_level(mut self, level: u32) -> Self {
        self.def.max_level = level;
        self
    }

    /// Set the item and book multipliers, in that order.
    #[must_use]
    pub fn multipliers(mut self, item: u32, book: u32) -> Self {
        self.def.item_multiplier = item;
        self.def.book_multiplier = book;
        self
    }

    #[must_use]
    pub fn conflicts<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModifierKind>,
    {
        self.def.conflicts.extend(kinds.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TargetKind>,
    {
        self.def.targets.extend(targets.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> ModifierCatalog {
        ModifierCatalog::builder()
            .modifier("sharpness", |m| {
                m.max_level(5)
                    .multipliers(1, 1)
                    .targets(["sword", "axe"])
                    .conflicts(["smite"])
            })
            .modifier("smite", |m| {
                m.max_level(5).multipliers(2, 1).targets(["sword", "axe"])
            })
            .modifier("mending", |m| m.multipliers(4, 2).targets(["sword", "boots"]))
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_by_str() {
        let catalog = small_catalog();
        let def = catalog.get("smite").unwrap();
        assert_eq!(def.max_level, 5);
        assert_eq!(def.item_multiplier, 2);
        assert_eq!(def.book_multiplier, 1);
        assert!(catalog.get("looting").is_none());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn conflicts_are_symmetric() {
        let catalog = small_catalog();
        assert!(catalog.get("sharpness").unwrap().conflicts.contains("smite"));
        assert!(catalog.get("smite").unwrap().conflicts.contains("sharpness"));
        assert!(catalog.get("mending").unwrap().conflicts.is_empty());
    }

    #[test]
    fn defaults_when_unset() {
        let catalog = ModifierCatalog::builder()
            .modifier("plain", |m| m)
            .build()
            .unwrap();
        let def = catalog.get("plain").unwrap();
        assert_eq!(def.max_level, 1);
        assert_eq!(def.book_multiplier, 1);
        assert!(def.targets.is_empty());
    }

    #[test]
    fn duplicate_modifier_rejected() {
        let result = ModifierCatalog::builder()
            .modifier("a", |m| m)
            .modifier("a", |m| m.max_level(2))
            .build();
        assert!(matches!(result, Err(CatalogError::DuplicateModifier { kind }) if kind == "a"));
    }

    #[test]
    fn zero_max_level_rejected() {
        let result = ModifierCatalog::builder()
            .modifier("broken", |m| m.max_level(0))
            .build();
        assert!(matches!(result, Err(CatalogError::ZeroMaxLevel { .. })));
    }

    #[test]
    fn applicable_to_is_sorted() {
        let catalog = small_catalog();
        let kinds: Vec<&str> = catalog
            .applicable_to("sword")
            .into_iter()
            .map(ModifierKind::as_str)
            .collect();
        assert_eq!(kinds, vec!["mending", "sharpness", "smite"]);
        let boots: Vec<&str> = catalog
            .applicable_to("boots")
            .into_iter()
            .map(ModifierKind::as_str)
            .collect();
        assert_eq!(boots, vec!["mending"]);
    }
}
