use anvil_plan::{ModifierCatalog, Planner, RecipeSpec};

fn main() {
    env_logger::init();

    let planner = Planner::builder(ModifierCatalog::vanilla()).build();

    println!("{planner}");

    let spec = RecipeSpec::new("sword")
        .material("netherite")
        .modifier("sharpness", 5)
        .modifier("looting", 3)
        .modifier("unbreaking", 3)
        .modifier("mending", 1);

    let recipe = planner.compute(&spec).expect("failed to plan recipe");

    if recipe.is_feasible() {
        println!("{recipe}");
    } else {
        println!("{} is too expensive to make.", recipe.tree.label());
    }
}
