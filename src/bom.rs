use std::collections::HashMap;

use crate::types::{Bom, BomCategory, BomEntry, LeafItem, ModifierCatalog, ModifierLevel, OpNode};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MergeKey {
    Book(ModifierLevel),
    BaseItem(String),
}

impl MergeKey {
    fn of(entry: &BomEntry) -> Self {
        match (&entry.category, &entry.modifier) {
            (BomCategory::Book, Some(modifier)) => MergeKey::Book(modifier.clone()),
            _ => MergeKey::BaseItem(entry.label.clone()),
        }
    }
}

pub(crate) fn extract(tree: &OpNode, catalog: &ModifierCatalog) -> Bom {
    let mut base_item = None;
    let mut entries = Vec::new();

    for leaf in tree.leaves() {
        match &leaf.item {
            LeafItem::Target => {
                if base_item.is_none() {
                    base_item = Some(leaf.label.clone());
                }
                entries.push(BomEntry::base_item(leaf.label.clone(), 1));
            }
            LeafItem::Book(modifier) => {
                if !catalog.contains(modifier.kind.as_str()) {
                    log::warn!(
                        "dropping '{}' from bill of materials: unknown modifier '{}'",
                        leaf.label,
                        modifier.kind
                    );
                    continue;
                }
                let mut entry = BomEntry::book(modifier.clone(), 1);
                entry.label.clone_from(&leaf.label);
                entries.push(entry);
            }
        }
    }

    Bom {
        base_item,
        entries: merge(entries),
    }
}

/// Sum quantities by key, then sort books before base items and each group
/// by label.
pub(crate) fn merge(entries: impl IntoIterator<Item = BomEntry>) -> Vec<BomEntry> {
    let mut slots: HashMap<MergeKey, usize> = HashMap::new();
    let mut merged: Vec<BomEntry> = Vec::new();

    for entry in entries {
        match slots.get(&MergeKey::of(&entry)) {
            Some(&slot) => merged[slot].quantity += entry.quantity,
            None => {
                slots.insert(MergeKey::of(&entry), merged.len());
                merged.push(entry);
            }
        }
    }

    merged.sort_by(|a, b| (a.category, &a.label).cmp(&(b.category, &b.label)));
    merged
}
