
use std::collections::HashSet;

use anvil_plan::{Bom, LeafItem, OpNode, Planner, TotalCost, DEFAULT_COST_CAP};
use proptest::prelude::*;
use strategies::{arb_recipe, GenRecipe};

fn plan(gen: &GenRecipe) -> (Planner, anvil_plan::PlanReport) {
    let planner = Planner::builder(gen.catalog()).build();
    let report = planner.compute_detailed(&gen.spec()).unwrap();
    (planner, report)
}

fn factorial(n: usize) -> usize {
    (1..=n).product()
}

// ---------------------------------------------------------------------------
// Invariant 1: Determinism
//
// The same catalog and request always produce the same tree and totals.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn determinism(gen in arb_recipe(5)) {
        let planner = Planner::builder(gen.catalog()).build();
        let first = planner.compute(&gen.spec()).unwrap();
        for _ in 0..3 {
            let again = planner.compute(&gen.spec()).unwrap();
            prop_assert_eq!(&first, &again, "determinism violated on repeated compute");
        }
    }

    #[test]
    fn determinism_rebuild(gen in arb_recipe(4)) {
        let a = Planner::builder(gen.catalog()).build().compute(&gen.spec()).unwrap();
        let b = Planner::builder(gen.catalog()).build().compute(&gen.spec()).unwrap();
        prop_assert_eq!(a, b, "determinism violated across planner rebuilds");
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Step laws
//
// A feasible recipe has one step per modifier, every step is within the cap,
// and the total is the sum of the steps.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn feasible_recipes_obey_step_laws(gen in arb_recipe(5)) {
        let (_, report) = plan(&gen);
        let recipe = report.recipe();
        if let TotalCost::Levels(total) = recipe.total {
            prop_assert_eq!(recipe.step_count(), gen.len());
            prop_assert_eq!(recipe.tree.steps().len(), gen.len());
            prop_assert!(recipe.step_costs.iter().all(|&c| c <= DEFAULT_COST_CAP));
            prop_assert_eq!(recipe.step_costs.iter().sum::<u32>(), total);
            prop_assert_eq!(recipe.incremental_points, anvil_plan::xp::incremental_total(&recipe.step_costs));
            prop_assert_eq!(recipe.bulk_points, anvil_plan::xp::bulk_total(&recipe.step_costs));
        } else {
            prop_assert!(recipe.tree.is_leaf());
            prop_assert!(recipe.step_costs.is_empty());
            prop_assert_eq!(report.feasible_orderings(), 0);
        }
    }

    #[test]
    fn every_ordering_is_evaluated(gen in arb_recipe(5)) {
        let (_, report) = plan(&gen);
        prop_assert_eq!(report.orderings(), factorial(gen.len()));
        prop_assert!(report.feasible_orderings() <= report.orderings());
    }

    // The final combine carries every modifier at the deepest prior work, so
    // it dominates every earlier step and the same for each ordering.
    #[test]
    fn feasibility_is_all_or_nothing(gen in arb_recipe(5), cap in 0_u32..60) {
        let report = Planner::builder(gen.catalog())
            .cost_cap(cap)
            .build()
            .compute_detailed(&gen.spec())
            .unwrap();
        let feasible = report.feasible_orderings();
        prop_assert!(feasible == 0 || feasible == report.orderings());
    }

    #[test]
    fn lower_cap_never_cheaper(gen in arb_recipe(4), cap in 1_u32..39) {
        let loose = Planner::builder(gen.catalog()).build().compute(&gen.spec()).unwrap();
        let tight = Planner::builder(gen.catalog()).cost_cap(cap).build().compute(&gen.spec()).unwrap();
        match (loose.total, tight.total) {
            (TotalCost::Levels(l), TotalCost::Levels(t)) => prop_assert!(t >= l),
            (TotalCost::Infeasible, TotalCost::Levels(_)) => {
                prop_assert!(false, "tighter cap found a plan the default cap missed");
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Tree shape
//
// Ids are 0..n in pre-order, the target is the single root-most kept leaf,
// and each requested modifier appears on exactly one book leaf.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn ids_are_dense_preorder(gen in arb_recipe(5)) {
        let (_, report) = plan(&gen);
        let ids: Vec<u32> = report.recipe().tree.nodes().iter().map(|n| n.id().0).collect();
        let expected: Vec<u32> = (0..u32::try_from(ids.len()).unwrap()).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn target_is_never_consumed(gen in arb_recipe(5)) {
        let (_, report) = plan(&gen);
        for step in report.recipe().tree.steps() {
            let consumed_target = matches!(
                step.consumed.as_ref(),
                OpNode::Leaf(leaf) if leaf.item == LeafItem::Target
            );
            prop_assert!(!consumed_target);
        }
    }

    #[test]
    fn each_modifier_on_one_book(gen in arb_recipe(5)) {
        let (_, report) = plan(&gen);
        let recipe = report.recipe();
        prop_assume!(recipe.is_feasible());
        let books: Vec<String> = recipe
            .tree
            .leaves()
            .iter()
            .filter_map(|leaf| match &leaf.item {
                LeafItem::Book(m) => Some(m.kind.to_string()),
                LeafItem::Target => None,
            })
            .collect();
        let distinct: HashSet<&String> = books.iter().collect();
        prop_assert_eq!(books.len(), gen.len());
        prop_assert_eq!(distinct.len(), gen.len());
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Bill of materials
//
// Book quantities add up to the modifier count; aggregation of one list is
// the identity.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn bom_counts_books(gen in arb_recipe(5)) {
        let (planner, report) = plan(&gen);
        let recipe = report.recipe();
        prop_assume!(recipe.is_feasible());
        let bom = Bom::from_tree(&recipe.tree, planner.catalog());
        prop_assert_eq!(bom.book_count() as usize, gen.len());
        prop_assert_eq!(bom.base_item.as_deref(), Some("Gear"));
    }

    #[test]
    fn aggregate_singleton_identity(gen in arb_recipe(5)) {
        let (planner, report) = plan(&gen);
        let bom = Bom::from_tree(&report.recipe().tree, planner.catalog());
        prop_assert_eq!(Bom::aggregate(std::slice::from_ref(&bom)), bom);
    }

    #[test]
    fn aggregate_sums_quantities(a in arb_recipe(4), b in arb_recipe(4)) {
        let (pa, ra) = plan(&a);
        let (pb, rb) = plan(&b);
        let bom_a = Bom::from_tree(&ra.recipe().tree, pa.catalog());
        let bom_b = Bom::from_tree(&rb.recipe().tree, pb.catalog());
        let total = Bom::aggregate(&[bom_a.clone(), bom_b.clone()]);
        let sum = |bom: &Bom| bom.entries.iter().map(|e| e.quantity).sum::<u32>();
        prop_assert_eq!(sum(&total), sum(&bom_a) + sum(&bom_b));
        prop_assert_eq!(total.base_item, bom_a.base_item);
    }
}
