use anvil_plan::{Bom, ModifierCatalog, Planner, RecipeSpec};

fn main() {
    env_logger::init();

    let planner = Planner::builder(ModifierCatalog::vanilla()).build();

    let kit = [
        RecipeSpec::new("helmet")
            .material("diamond")
            .modifier("protection", 4)
            .modifier("respiration", 3)
            .modifier("aqua_affinity", 1)
            .modifier("unbreaking", 3)
            .modifier("mending", 1),
        RecipeSpec::new("boots")
            .material("diamond")
            .modifier("protection", 4)
            .modifier("feather_falling", 4)
            .modifier("depth_strider", 3)
            .modifier("unbreaking", 3)
            .modifier("mending", 1),
        RecipeSpec::new("pickaxe")
            .material("diamond")
            .modifier("efficiency", 5)
            .modifier("fortune", 3)
            .modifier("unbreaking", 3)
            .modifier("mending", 1),
    ];

    let mut lists = Vec::new();
    for spec in &kit {
        let recipe = planner.compute(spec).expect("failed to plan recipe");
        let bom = Bom::from_tree(&recipe.tree, planner.catalog());
        println!("{} ({})", recipe.tree.label(), recipe.total);
        print!("{bom}");
        lists.push(bom);
    }

    let total = Bom::aggregate(&lists);
    println!();
    println!("Everything, {} books:", total.book_count());
    for entry in &total.entries {
        println!("  {entry}");
    }
}
