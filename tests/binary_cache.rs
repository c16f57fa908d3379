#![cfg(feature = "binary-cache")]

use anvil_plan::{
    DeserializeError, ModifierCatalog, Planner, RecipeCache, RecipeSpec, RuleIndex, TotalCost,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const RULES: &str = "rule cheap_mending:\n    surcharge mending add -1\n";

fn planner() -> Planner {
    Planner::builder(ModifierCatalog::vanilla())
        .rules(RuleIndex::from_dsl(RULES).unwrap())
        .build()
}

fn catalog_entries() -> Vec<(&'static str, RecipeSpec)> {
    vec![
        (
            "netherite_sword",
            RecipeSpec::new("sword")
                .material("netherite")
                .modifier("sharpness", 5)
                .modifier("looting", 3)
                .modifier("fire_aspect", 2)
                .modifier("sweeping_edge", 3)
                .modifier("knockback", 2)
                .modifier("unbreaking", 3)
                .modifier("mending", 1),
        ),
        (
            "bow",
            RecipeSpec::new("bow")
                .modifier("power", 5)
                .modifier("punch", 2)
                .modifier("flame", 1)
                .modifier("infinity", 1),
        ),
        ("plain_elytra", RecipeSpec::new("elytra")),
    ]
}

fn filled_cache() -> RecipeCache {
    let planner = planner();
    let mut cache = RecipeCache::new(planner.cost_cap());
    for (name, spec) in catalog_entries() {
        cache.insert(name, planner.compute(&spec).unwrap());
    }
    cache
}

fn infeasible_cache() -> RecipeCache {
    let catalog = ModifierCatalog::builder()
        .modifier("heavy", |m| m.max_level(5).multipliers(8, 8))
        .build()
        .unwrap();
    let recipe = Planner::builder(catalog)
        .build()
        .compute(&RecipeSpec::new("bow").modifier("heavy", 5))
        .unwrap();
    assert_eq!(recipe.total, TotalCost::Infeasible);
    let mut cache = RecipeCache::new(39);
    cache.insert("heavy_bow", recipe);
    cache
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn round_trip_catalog() {
    let original = filled_cache();
    let bytes = original.to_bytes(None).unwrap();
    let restored = RecipeCache::from_bytes(&bytes).unwrap();

    assert_eq!(restored, original);
    let names: Vec<&str> = restored.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["netherite_sword", "bow", "plain_elytra"]);
}

#[test]
fn round_trip_preserves_tree_and_totals() {
    let original = filled_cache();
    let restored = RecipeCache::from_bytes(&original.to_bytes(None).unwrap()).unwrap();

    let before = original.get("netherite_sword").unwrap();
    let after = restored.get("netherite_sword").unwrap();
    assert_eq!(after.total, before.total);
    assert_eq!(after.step_costs, before.step_costs);
    assert_eq!(after.incremental_points, before.incremental_points);
    assert_eq!(after.bulk_points, before.bulk_points);
    assert_eq!(after.tree.to_string(), before.tree.to_string());
}

#[test]
fn round_trip_infeasible() {
    let original = infeasible_cache();
    let restored = RecipeCache::from_bytes(&original.to_bytes(None).unwrap()).unwrap();
    let recipe = restored.get("heavy_bow").unwrap();
    assert_eq!(recipe.total, TotalCost::Infeasible);
    assert!(recipe.tree.is_leaf());
}

#[test]
fn round_trip_empty() {
    let original = RecipeCache::new(50);
    let restored = RecipeCache::from_bytes(&original.to_bytes(None).unwrap()).unwrap();
    assert!(restored.is_empty());
    assert_eq!(restored.cost_cap(), 50);
}

// ---------------------------------------------------------------------------
// Source digest
// ---------------------------------------------------------------------------

#[test]
fn matching_source_is_accepted() {
    let bytes = filled_cache().to_bytes(Some(RULES)).unwrap();
    let restored = RecipeCache::from_bytes_checked(&bytes, RULES).unwrap();
    assert_eq!(restored.len(), 3);
}

#[test]
fn changed_source_is_stale() {
    let bytes = filled_cache().to_bytes(Some(RULES)).unwrap();
    let err = RecipeCache::from_bytes_checked(&bytes, "rule other:\n    max_level sharpness 6")
        .unwrap_err();
    assert!(
        matches!(err, DeserializeError::StaleSource),
        "expected StaleSource, got: {err}"
    );
}

#[test]
fn missing_digest_is_stale() {
    let bytes = filled_cache().to_bytes(None).unwrap();
    let err = RecipeCache::from_bytes_checked(&bytes, RULES).unwrap_err();
    assert!(matches!(err, DeserializeError::StaleSource));
    // unchecked loading does not care
    assert!(RecipeCache::from_bytes(&bytes).is_ok());
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn corruption_byte_flip() {
    let mut corrupted = filled_cache().to_bytes(None).unwrap();
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xFF;

    let err = RecipeCache::from_bytes(&corrupted).unwrap_err();
    assert!(
        matches!(err, DeserializeError::ChecksumMismatch),
        "expected ChecksumMismatch, got: {err}"
    );
}

#[test]
fn corruption_truncation() {
    let bytes = filled_cache().to_bytes(None).unwrap();
    let err = RecipeCache::from_bytes(&bytes[..33]).unwrap_err();
    assert!(
        matches!(err, DeserializeError::LengthMismatch { .. }),
        "expected LengthMismatch, got: {err}"
    );

    let err = RecipeCache::from_bytes(&bytes[..10]).unwrap_err();
    assert!(matches!(err, DeserializeError::LengthMismatch { .. }));
}

#[test]
fn bad_magic() {
    let mut bad = filled_cache().to_bytes(None).unwrap();
    bad[0..4].copy_from_slice(b"BAAD");

    let err = RecipeCache::from_bytes(&bad).unwrap_err();
    assert!(
        matches!(err, DeserializeError::BadMagic),
        "expected BadMagic, got: {err}"
    );
}

#[test]
fn version_mismatch() {
    let mut bad = filled_cache().to_bytes(None).unwrap();
    bad[4] = 99;
    bad[5] = 0;

    let err = RecipeCache::from_bytes(&bad).unwrap_err();
    assert!(
        matches!(
            err,
            DeserializeError::IncompatibleVersion {
                blob: 99,
                supported: 1
            }
        ),
        "expected IncompatibleVersion, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn file_round_trip() {
    let dir = std::env::temp_dir().join("anvil_plan_test_binary_cache");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("recipes.anvl");

    let original = filled_cache();
    original.to_binary_file(&path, Some(RULES)).unwrap();
    let restored = RecipeCache::from_binary_file(&path).unwrap();
    assert_eq!(restored, original);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir().join("anvil_plan_test_no_such_cache.anvl");
    let err = RecipeCache::from_binary_file(&path).unwrap_err();
    assert!(matches!(err, DeserializeError::Io(_)));
}
