use std::sync::Arc;
use std::thread;

use anvil_plan::{ModifierCatalog, Planner, RecipeSpec};

fn main() {
    env_logger::init();

    let planner = Arc::new(Planner::builder(ModifierCatalog::vanilla()).build());

    let targets = ["sword", "axe", "pickaxe", "trident"];

    let handles: Vec<_> = targets
        .into_iter()
        .enumerate()
        .map(|(i, target)| {
            let p = Arc::clone(&planner);
            thread::spawn(move || {
                let spec = RecipeSpec::new(target)
                    .material("netherite")
                    .modifier("unbreaking", 3)
                    .modifier("mending", 1);

                let result = p.compute(&spec).map(|recipe| recipe.total);
                println!("Thread {i} ({target}): {result:?}");
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
