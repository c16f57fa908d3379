use anvil_plan::{ModifierCatalog, Planner, RecipeSpec, RuleIndex};

fn main() {
    env_logger::init();

    let rules = RuleIndex::from_file("demos/house.rules").expect("failed to load rules");

    println!("{rules}");

    let planner = Planner::builder(ModifierCatalog::vanilla())
        .rules(rules)
        .validator("require_material", |spec, check| {
            let wanted = check.param("material").and_then(|v| v.as_str());
            spec.material.as_deref() == wanted
        })
        .build();

    let spec = RecipeSpec::new("sword")
        .material("diamond")
        .modifier("sharpness", 6)
        .modifier("looting", 3)
        .modifier("fire_aspect", 2);

    let violations = planner.validate(&spec);
    if violations.is_empty() {
        println!("No violations.");
    }
    for violation in &violations {
        println!("Violation: {violation}");
    }

    let recipe = planner.compute(&spec).expect("failed to plan recipe");
    println!("{recipe}");
}
