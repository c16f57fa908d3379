use std::fmt;

use super::recipe::ComputedRecipe;

/// Named computed recipes, e.g. one per catalog entry, ready to be persisted
/// so the search does not run again at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeCache {
    cost_cap: u32,
    entries: Vec<(String, ComputedRecipe)>,
}

impl RecipeCache {
    /// An empty cache for recipes computed under `cost_cap`.
    #[must_use]
    pub fn new(cost_cap: u32) -> Self {
        Self {
            cost_cap,
            entries: Vec::new(),
        }
    }

    /// Insert or replace the recipe stored under `name`.
    pub fn insert(&mut self, name: impl Into<String>, recipe: ComputedRecipe) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = recipe,
            None => self.entries.push((name, recipe)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComputedRecipe> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, recipe)| recipe)
    }

    #[must_use]
    pub fn cost_cap(&self) -> u32 {
        self.cost_cap
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ComputedRecipe)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    #[cfg(feature = "binary-cache")]
    pub(crate) fn from_parts(cost_cap: u32, entries: Vec<(String, ComputedRecipe)>) -> Self {
        Self { cost_cap, entries }
    }
}

impl fmt::Display for RecipeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RecipeCache({} recipes, cap {})",
            self.entries.len(),
            self.cost_cap
        )
    }
}

#[cfg(feature = "binary-cache")]
impl RecipeCache {
    /// Serialize the cache to a byte vector.
    ///
    /// The optional `source_text` (e.g. the catalog file the recipes were
    /// computed from) is hashed with BLAKE3 and embedded, so
    /// [`from_bytes_checked`](Self::from_bytes_checked) can tell when the
    /// cache is out of date.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a cache previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes, None)
    }

    /// Like [`from_bytes`](Self::from_bytes), but also require that the
    /// cache was written for exactly `source_text`.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError::StaleSource`](crate::serial::DeserializeError::StaleSource)
    /// when the embedded digest is missing or differs.
    pub fn from_bytes_checked(
        bytes: &[u8],
        source_text: &str,
    ) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes, Some(source_text))
    }

    /// Serialize the cache and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the cache it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Leaf, LeafItem, NodeId, OpNode, TotalCost};

    fn bare(label: &str) -> ComputedRecipe {
        ComputedRecipe {
            tree: OpNode::Leaf(Leaf {
                id: NodeId(0),
                label: label.to_owned(),
                item: LeafItem::Target,
            }),
            total: TotalCost::Levels(0),
            step_costs: Vec::new(),
            incremental_points: 0,
            bulk_points: 0,
        }
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut cache = RecipeCache::new(39);
        cache.insert("bow", bare("Bow"));
        cache.insert("axe", bare("Axe"));
        cache.insert("bow", bare("Crossbow"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("bow").unwrap().tree.label(), "Crossbow");
        let names: Vec<&str> = cache.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["bow", "axe"]);
        assert!(cache.get("hoe").is_none());
    }
}
