//! Built-in modifier reference data.

use crate::types::{ModifierCatalog, ModifierCatalogBuilder};

const HELMET: &[&str] = &["helmet", "turtle_shell"];
const ARMOR: &[&str] = &["helmet", "turtle_shell", "chestplate", "leggings", "boots"];
const MELEE: &[&str] = &["sword", "axe"];
const TOOLS: &[&str] = &["pickaxe", "shovel", "axe", "hoe"];
const DURABLE: &[&str] = &[
    "helmet",
    "turtle_shell",
    "chestplate",
    "leggings",
    "boots",
    "elytra",
    "sword",
    "axe",
    "pickaxe",
    "shovel",
    "hoe",
    "bow",
    "crossbow",
    "trident",
    "mace",
    "fishing_rod",
    "shears",
    "flint_and_steel",
    "shield",
    "carrot_on_a_stick",
    "brush",
];

/// (kind, max level, item multiplier, book multiplier, targets, conflicts)
type Row = (
    &'static str,
    u32,
    u32,
    u32,
    &'static [&'static str],
    &'static [&'static str],
);

const PROTECTIONS: &[&str] = &[
    "protection",
    "fire_protection",
    "blast_protection",
    "projectile_protection",
];
const DAMAGE: &[&str] = &["sharpness", "smite", "bane_of_arthropods", "density", "breach"];

#[rustfmt::skip]
const ROWS: &[Row] = &[
    ("protection",            4, 1, 1, ARMOR,  PROTECTIONS),
    ("fire_protection",       4, 2, 1, ARMOR,  PROTECTIONS),
    ("blast_protection",      4, 4, 2, ARMOR,  PROTECTIONS),
    ("projectile_protection", 4, 2, 1, ARMOR,  PROTECTIONS),
    ("thorns",                3, 8, 4, ARMOR,  &[]),
    ("respiration",           3, 4, 2, HELMET, &[]),
    ("aqua_affinity",         1, 4, 2, HELMET, &[]),
    ("swift_sneak",           3, 8, 4, &["leggings"], &[]),
    ("feather_falling",       4, 2, 1, &["boots"], &[]),
    ("depth_strider",         3, 4, 2, &["boots"], &["frost_walker"]),
    ("frost_walker",          2, 4, 2, &["boots"], &["depth_strider"]),
    ("soul_speed",            3, 8, 4, &["boots"], &[]),
    ("sharpness",             5, 1, 1, MELEE,  DAMAGE),
    ("smite",                 5, 2, 1, MELEE,  DAMAGE),
    ("bane_of_arthropods",    5, 2, 1, MELEE,  DAMAGE),
    ("knockback",             2, 2, 1, &["sword"], &[]),
    ("fire_aspect",           2, 4, 2, &["sword"], &[]),
    ("looting",               3, 4, 2, &["sword"], &[]),
    ("sweeping_edge",         3, 4, 2, &["sword"], &[]),
    ("efficiency",            5, 1, 1, &["pickaxe", "shovel", "axe", "hoe", "shears"], &[]),
    ("silk_touch",            1, 8, 4, TOOLS,  &["fortune"]),
    ("fortune",               3, 4, 2, TOOLS,  &["silk_touch"]),
    ("power",                 5, 1, 1, &["bow"], &[]),
    ("punch",                 2, 4, 2, &["bow"], &[]),
    ("flame",                 1, 4, 2, &["bow"], &[]),
    ("infinity",              1, 8, 4, &["bow"], &["mending"]),
    ("luck_of_the_sea",       3, 4, 2, &["fishing_rod"], &[]),
    ("lure",                  3, 4, 2, &["fishing_rod"], &[]),
    ("loyalty",               3, 1, 1, &["trident"], &["riptide"]),
    ("impaling",              5, 4, 2, &["trident"], &[]),
    ("riptide",               3, 4, 2, &["trident"], &["loyalty", "channeling"]),
    ("channeling",            1, 8, 4, &["trident"], &["riptide"]),
    ("multishot",             1, 4, 2, &["crossbow"], &["piercing"]),
    ("quick_charge",          3, 2, 1, &["crossbow"], &[]),
    ("piercing",              4, 1, 1, &["crossbow"], &["multishot"]),
    ("density",               5, 2, 1, &["mace"], DAMAGE),
    ("breach",                4, 4, 2, &["mace"], DAMAGE),
    ("wind_burst",            3, 4, 2, &["mace"], &[]),
    ("unbreaking",            3, 2, 1, DURABLE, &[]),
    ("mending",               1, 4, 2, DURABLE, &["infinity"]),
    ("curse_of_binding",      1, 8, 4, ARMOR, &[]),
    ("curse_of_vanishing",    1, 8, 4, DURABLE, &[]),
];

fn builder() -> ModifierCatalogBuilder {
    ROWS.iter().fold(
        ModifierCatalog::builder(),
        |catalog, &(kind, max, item, book, targets, conflicts)| {
            catalog.modifier(kind, |m| {
                m.max_level(max)
                    .multipliers(item, book)
                    .targets(targets.iter().copied())
                    // the conflict groups list their own member too
                    .conflicts(conflicts.iter().copied().filter(|&c| c != kind))
            })
        },
    )
}

pub(crate) fn catalog() -> ModifierCatalog {
    builder().freeze()
}
