mod common;

use std::collections::HashSet;

use common::*;
use marten_pdr::{
    config::Config,
    invariant,
    reports::Report,
    structures::{
        atom::Atom,
        clause::Clause,
        problem::{Model, Problem},
        state::State,
    },
};
use proptest::prelude::*;

/// A randomly grounded case, everything encoded as atom masks.
#[derive(Debug, Clone)]
struct Case {
    atoms: usize,
    init: u32,
    goal: u32,
    actions: Vec<(u32, u32, u32)>,
}

fn mask_atoms(atoms: usize, mask: u32) -> Vec<Atom> {
    (0..atoms as Atom).filter(|a| mask >> a & 1 != 0).collect()
}

fn case_problem(case: &Case) -> Problem {
    let actions = case
        .actions
        .iter()
        .enumerate()
        .map(|(i, (pre, add, del))| {
            action(
                &format!("a{i}"),
                &mask_atoms(case.atoms, *pre),
                &mask_atoms(case.atoms, *add),
                &mask_atoms(case.atoms, *del),
            )
        })
        .collect();

    problem(
        case.atoms,
        &mask_atoms(case.atoms, case.init),
        &mask_atoms(case.atoms, case.goal),
        actions,
    )
}

fn arb_case() -> impl Strategy<Value = Case> {
    (2usize..=5).prop_flat_map(|atoms| {
        let mask = 0u32..1 << atoms;
        let goal = 1u32..1 << atoms;
        let action = (mask.clone(), mask.clone(), mask.clone());
        (
            mask.clone(),
            goal,
            proptest::collection::vec(action, 1..=4),
        )
            .prop_map(move |(init, goal, actions)| Case {
                atoms,
                init,
                goal,
                actions,
            })
    })
}

/// Ground truth by exhaustive forward search over state masks.
fn bfs_reachable(case: &Case) -> bool {
    let mut problem = case_problem(case);
    problem.normalize();

    let apply = |state: u32, pre: u32, add: u32, del: u32| -> Option<u32> {
        (state & pre == pre).then_some((state & !del) | add)
    };

    let actions: Vec<(u32, u32, u32)> = problem
        .actions
        .iter()
        .map(|a| {
            let fold = |atoms: &[Atom]| atoms.iter().fold(0u32, |m, a| m | 1 << a);
            (fold(&a.pre), fold(&a.add), fold(&a.del))
        })
        .collect();

    let mut seen = HashSet::new();
    let mut queue = vec![case.init];
    seen.insert(case.init);

    while let Some(state) = queue.pop() {
        if state & case.goal == case.goal {
            return true;
        }
        for (pre, add, del) in &actions {
            if let Some(next) = apply(state, *pre, *add, *del) {
                if seen.insert(next) {
                    queue.push(next);
                }
            }
        }
    }
    false
}

mod primitives {
    use super::*;

    proptest! {
        #[test]
        fn subsumption_is_subset_inclusion(
            a in proptest::collection::btree_set(0u32..24, 0..6),
            b in proptest::collection::btree_set(0u32..24, 0..6),
        ) {
            let c1: Vec<Atom> = a.iter().copied().collect();
            let c2: Vec<Atom> = b.iter().copied().collect();
            prop_assert_eq!(c1.subsumes(&c2), a.is_subset(&b));
        }

        #[test]
        fn effect_application(case in arb_case(), state_mask in 0u32..32) {
            let mut problem = case_problem(&case);
            problem.normalize();
            let state_mask = state_mask & ((1 << case.atoms) - 1);

            for action in &problem.actions {
                let mut state = State::filled(case.atoms, false);
                for atom in mask_atoms(case.atoms, state_mask) {
                    state.set(atom);
                }
                action.apply_to(&mut state);

                for atom in 0..case.atoms as Atom {
                    let expected = action.add.contains(&atom)
                        || (state_mask >> atom & 1 != 0 && !action.del.contains(&atom));
                    prop_assert_eq!(state.value_of(atom), expected);
                }
            }
        }
    }
}

mod invariants {
    use super::*;

    proptest! {
        /// Every derived clause is inductive under regression: an action
        /// adding into a clause it has no precondition in must leave a
        /// clause of the set inside the regression.
        #[test]
        fn derivation_is_inductive(case in arb_case()) {
            let mut problem = case_problem(&case);
            problem.normalize();
            let model = Model::build(&problem, false);

            let clauses: Vec<Vec<Atom>> = invariant::derive(&model)
                .map(|bc| {
                    if bc.is_unit() { vec![bc.l1] } else {
                        let mut pair = vec![bc.l1, bc.l2];
                        pair.sort_unstable();
                        pair
                    }
                })
                .collect();

            for clause in &clauses {
                for action in &model.actions {
                    let pre_meets = action.pre.iter().any(|p| clause.contains(p));
                    let add_meets = action.add.iter().any(|a| clause.contains(a));
                    if pre_meets || !add_meets {
                        continue;
                    }

                    let remainder: HashSet<Atom> = clause
                        .iter()
                        .filter(|atom| !action.add.contains(atom))
                        .chain(action.del.iter())
                        .copied()
                        .collect();

                    let shielded = clauses
                        .iter()
                        .any(|d| d.iter().all(|atom| remainder.contains(atom)));
                    prop_assert!(shielded, "{clause:?} unshielded against {}", action.name);
                }
            }
        }
    }
}

mod search {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The engine's verdict agrees with exhaustive search, plans
        /// execute, and the layer store's refcounts stay exact.
        #[test]
        fn verdict_agrees_with_exhaustive_search(case in arb_case()) {
            let reachable = bfs_reachable(&case);
            let problem = case_problem(&case);

            if problem.goal_in_initial() {
                prop_assert!(reachable);
                return Ok(());
            }

            let mut config = Config::default();
            config.phaselim.value = 64;
            let (ctx, report) = solve(problem, config);

            match report {
                Report::PlanFound(_) => {
                    prop_assert!(reachable);
                    prop_assert!(plan_is_valid(&ctx, ctx.last_plan.as_deref().unwrap()));
                }
                Report::Unsatisfiable => prop_assert!(!reachable),
                other => prop_assert!(false, "unexpected report {other}"),
            }

            // Refcounts: every box is held exactly once per list membership.
            let mut boxes = Vec::new();
            for list in ctx.layers.delta.iter().chain(ctx.layers.deriv.iter()) {
                for boxed in list {
                    if !boxes.iter().any(|b| std::rc::Rc::ptr_eq(b, boxed)) {
                        boxes.push(boxed.clone());
                    }
                }
            }
            for boxed in &boxes {
                let held: usize = ctx
                    .layers
                    .delta
                    .iter()
                    .chain(ctx.layers.deriv.iter())
                    .map(|list| list.iter().filter(|b| std::rc::Rc::ptr_eq(b, boxed)).count())
                    .sum();
                prop_assert_eq!(std::rc::Rc::strong_count(boxed), held + 1);
            }
        }

        /// Layers strengthen monotonically: every clause of layer k has a
        /// subsuming witness in layer k - 1.
        #[test]
        fn layers_strengthen_monotonically(case in arb_case()) {
            let problem = case_problem(&case);
            if problem.goal_in_initial() {
                return Ok(());
            }

            let mut config = Config::default();
            config.phaselim.value = 64;
            // Level 2 trades the witness for relative induction; level 1
            // keeps it.
            config.minimize.value = 1;
            let (ctx, _report) = solve(problem, config);

            for k in 1..ctx.layers.len() {
                let of_layer = |idx: usize| {
                    ctx.layers.delta[idx]
                        .iter()
                        .chain(ctx.layers.deriv[idx].iter())
                        .filter(move |b| b.valid_at(idx))
                };

                for boxed in of_layer(k) {
                    let witnessed = of_layer(k - 1)
                        .any(|below| below.data.subsumes(&boxed.data));
                    prop_assert!(
                        witnessed,
                        "clause {:?} of layer {k} has no witness below",
                        boxed.data
                    );
                }
            }
        }

        /// Action elimination is idempotent on whatever plan a run finds.
        #[test]
        fn postprocess_idempotent(case in arb_case()) {
            let problem = case_problem(&case);
            if problem.goal_in_initial() {
                return Ok(());
            }

            let mut config = Config::default();
            config.phaselim.value = 64;
            let (mut ctx, report) = solve(problem, config);

            if let Report::PlanFound(_) = report {
                let once = ctx.last_plan.clone().unwrap();
                let twice = ctx.eliminate_actions(once.clone());
                prop_assert_eq!(once, twice);
            }
        }
    }
}
