use std::fmt;

use super::modifier::ModifierCatalog;
use super::node::OpNode;
use super::recipe::ModifierLevel;

/// Groups of a shopping list. Books sort before base items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BomCategory {
    Book,
    BaseItem,
}

impl fmt::Display for BomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BomCategory::Book => write!(f, "book"),
            BomCategory::BaseItem => write!(f, "base item"),
        }
    }
}

/// One line of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BomEntry {
    pub label: String,
    pub category: BomCategory,
    /// Set for books, `None` for base items.
    pub modifier: Option<ModifierLevel>,
    pub quantity: u32,
}

impl BomEntry {
    #[must_use]
    pub fn book(modifier: ModifierLevel, quantity: u32) -> Self {
        Self {
            label: modifier.book_label(),
            category: BomCategory::Book,
            modifier: Some(modifier),
            quantity,
        }
    }

    #[must_use]
    pub fn base_item(label: impl Into<String>, quantity: u32) -> Self {
        Self {
            label: label.into(),
            category: BomCategory::BaseItem,
            modifier: None,
            quantity,
        }
    }
}

impl fmt::Display for BomEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.quantity, self.label)
    }
}

/// Bill of materials: everything to buy or craft before starting a recipe.
///
/// Entries are merged and sorted: books first, then base items, each group
/// alphabetical by label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bom {
    /// Label of the item receiving the modifiers, if any.
    pub base_item: Option<String>,
    pub entries: Vec<BomEntry>,
}

impl Bom {
    /// Collect the leaves of an operation tree.
    ///
    /// Book leaves whose modifier kind is not in `catalog` are dropped with a
    /// warning; extraction itself never fails.
    #[must_use]
    pub fn from_tree(tree: &OpNode, catalog: &ModifierCatalog) -> Self {
        crate::bom::extract(tree, catalog)
    }

    /// Merge several lists into one. `base_item` comes from the first input.
    #[must_use]
    pub fn aggregate(boms: &[Bom]) -> Self {
        Self {
            base_item: boms.first().and_then(|b| b.base_item.clone()),
            entries: crate::bom::merge(boms.iter().flat_map(|b| b.entries.iter().cloned())),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in one category, in list order.
    pub fn entries_in(&self, category: BomCategory) -> impl Iterator<Item = &BomEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Number of books on the list, counting quantities.
    #[must_use]
    pub fn book_count(&self) -> u32 {
        self.entries_in(BomCategory::Book).map(|e| e.quantity).sum()
    }
}

impl fmt::Display for Bom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(base) = &self.base_item {
            writeln!(f, "for {base}:")?;
        }
        for entry in &self.entries {
            writeln!(f, "  {entry}")?;
        }
        Ok(())
    }
}
