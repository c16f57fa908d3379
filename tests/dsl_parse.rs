use anvil_plan::{
    AnvilError, ModifierCatalog, Planner, RecipeSpec, RuleIndex, TotalCost, Violation,
};

const HOUSE_RULES: &str = r#"
# Server overrides, loaded at startup.

rule sword_loot:
    conflict looting fire_aspect on sword

rule sharpness_vi:
    max_level sharpness 6

rule cheap_mending:
    surcharge mending add -1

rule frost_boots:
    restrict frost_walker allow boots

rule no_bow_mending (disabled):
    restrict mending block bow

rule named_gear:
    custom require_material (material = "netherite")
"#;

fn planner(rules: RuleIndex) -> Planner {
    Planner::builder(ModifierCatalog::vanilla())
        .rules(rules)
        .validator("require_material", |spec, check| {
            let wanted = check.param("material").and_then(|v| v.as_str());
            spec.material.as_deref() == wanted
        })
        .build()
}

#[test]
fn dsl_compiles_every_directive() {
    let index = RuleIndex::from_dsl(HOUSE_RULES).unwrap();
    assert_eq!(index.rule_count(), 5);
    assert_eq!(index.conflict_count(), 1);
    assert!(index.has_conflict("fire_aspect", "looting", "sword", &Default::default()));
    assert!(!index.has_conflict("fire_aspect", "looting", "axe", &Default::default()));
    assert_eq!(index.effective_max_level("sharpness", 5), 6);
    assert_eq!(index.surcharge("mending").apply(2), 1);
    assert!(index.can_attach_to("frost_walker", "boots"));
    assert!(!index.can_attach_to("frost_walker", "leggings"));
    // disabled rules are dropped
    assert!(index.can_attach_to("mending", "bow"));
    assert_eq!(index.custom_checks().len(), 1);
}

#[test]
fn dsl_rules_change_validation() {
    let planner = planner(RuleIndex::from_dsl(HOUSE_RULES).unwrap());

    let sword = RecipeSpec::new("sword")
        .material("netherite")
        .modifier("sharpness", 6)
        .modifier("looting", 3)
        .modifier("fire_aspect", 2);
    let violations = planner.validate(&sword);
    assert_eq!(
        violations,
        vec![Violation::Conflict {
            first: "looting".into(),
            second: "fire_aspect".into(),
        }]
    );

    let boots = RecipeSpec::new("leggings").modifier("frost_walker", 2);
    let violations = planner.validate(&boots);
    assert!(violations.contains(&Violation::CustomRule {
        rule_id: "named_gear".into(),
        validator: "require_material".into(),
    }));
    assert!(violations.iter().any(|v| matches!(v, Violation::NotApplicable { .. })));
}

#[test]
fn surcharge_lowers_the_plan_cost() {
    let spec = RecipeSpec::new("sword").modifier("mending", 1);
    let plain = Planner::builder(ModifierCatalog::vanilla())
        .build()
        .compute(&spec)
        .unwrap();
    let discounted = planner(RuleIndex::from_dsl(HOUSE_RULES).unwrap())
        .compute(&spec)
        .unwrap();
    assert_eq!(plain.total, TotalCost::Levels(2));
    assert_eq!(discounted.total, TotalCost::Levels(1));
}

#[test]
fn unregistered_custom_validators_pass() {
    let index = RuleIndex::from_dsl("rule x:\n    custom nobody_home").unwrap();
    let planner = Planner::builder(ModifierCatalog::vanilla()).rules(index).build();
    assert!(planner
        .validate(&RecipeSpec::new("sword").modifier("sharpness", 5))
        .is_empty());
}

#[test]
fn dsl_syntax_error_is_reported() {
    let err = RuleIndex::from_dsl("rule broken:\n    conflict sharpness").unwrap_err();
    assert!(matches!(err, AnvilError::Parse(_)));

    let err = RuleIndex::from_dsl("rule broken:\n    teleport sharpness").unwrap_err();
    assert!(matches!(err, AnvilError::Parse(_)));
}

#[test]
fn dsl_compile_error_is_reported() {
    let err = RuleIndex::from_dsl("rule a:\n    max_level sharpness 0").unwrap_err();
    assert!(matches!(err, AnvilError::Compile(_)));

    let err = RuleIndex::from_dsl(
        "rule a:\n    max_level sharpness 6\nrule a:\n    max_level smite 6",
    )
    .unwrap_err();
    assert!(matches!(err, AnvilError::Compile(_)));

    let err = RuleIndex::from_dsl("rule a:\n    conflict smite smite on sword").unwrap_err();
    assert!(matches!(err, AnvilError::Compile(_)));
}

#[test]
fn rule_file_round_trip() {
    let dir = std::env::temp_dir().join("anvil_plan_test_rule_file");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("house.rules");
    std::fs::write(&path, HOUSE_RULES).unwrap();

    let from_file = RuleIndex::from_file(&path).unwrap();
    assert_eq!(from_file.rule_count(), 5);

    let loaded = RuleIndex::load_or_empty(&path);
    assert_eq!(loaded.rule_count(), 5);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn missing_rule_file() {
    let path = std::env::temp_dir().join("anvil_plan_test_does_not_exist.rules");
    let err = RuleIndex::from_file(&path).unwrap_err();
    assert!(matches!(err, AnvilError::Io(_)));

    // load_or_empty falls back to no rules
    let index = RuleIndex::load_or_empty(&path);
    assert_eq!(index.rule_count(), 0);
    assert!(index.can_attach_to("frost_walker", "leggings"));
}

#[test]
fn invalid_rule_file_falls_back_to_empty() {
    let dir = std::env::temp_dir().join("anvil_plan_test_invalid_rule_file");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("broken.rules");
    std::fs::write(&path, "rule nope:\n    conflict").unwrap();

    let index = RuleIndex::load_or_empty(&path);
    assert_eq!(index.rule_count(), 0);

    std::fs::remove_dir_all(&dir).ok();
}
