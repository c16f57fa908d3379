use anvil_plan::{ModifierCatalog, Planner, RecipeSpec};

fn main() {
    env_logger::init();

    let planner = Planner::builder(ModifierCatalog::vanilla()).build();

    let spec = RecipeSpec::new("sword")
        .material("netherite")
        .modifier("sharpness", 5)
        .modifier("looting", 3)
        .modifier("fire_aspect", 2)
        .modifier("sweeping_edge", 3)
        .modifier("knockback", 2)
        .modifier("unbreaking", 3)
        .modifier("mending", 1);

    let report = planner.compute_detailed(&spec).expect("failed to plan recipe");

    println!("{report}");
    println!();
    println!("{}", report.recipe());
    println!("Step costs: {:?}", report.recipe().step_costs);
    println!(
        "Orderings within the cap: {} of {}",
        report.feasible_orderings(),
        report.orderings()
    );
    println!("Duration: {:?}", report.duration());
}
