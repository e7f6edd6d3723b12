#![allow(dead_code)]

use marten_pdr::{
    config::Config,
    context::SolveContext,
    invariant,
    reports::Report,
    structures::{
        action::Action,
        atom::Atom,
        problem::{Model, Problem},
        state::State,
    },
};

pub fn action(name: &str, pre: &[Atom], add: &[Atom], del: &[Atom]) -> Action {
    Action {
        name: name.to_string(),
        pre: pre.to_vec(),
        add: add.to_vec(),
        del: del.to_vec(),
    }
}

pub fn problem(atoms: usize, initial: &[Atom], goal: &[Atom], actions: Vec<Action>) -> Problem {
    let mut initial_state = State::filled(atoms, false);
    for atom in initial {
        initial_state.set(*atom);
    }
    let mut goal = goal.to_vec();
    goal.sort_unstable();

    Problem {
        domain_name: "test".to_string(),
        problem_name: "case".to_string(),
        atom_names: (1..=atoms).map(|i| format!("f{i}")).collect(),
        actions,
        initial: initial_state,
        goal,
    }
}

/// Normalizes, models, derives the invariant per config, and solves.
pub fn solve(mut problem: Problem, config: Config) -> (SolveContext, Report) {
    problem.normalize();
    let model = Model::build(&problem, config.reverse.value);
    let mut ctx = SolveContext::new(model, config);
    if ctx.config.gen_invariant.value {
        let set = invariant::derive(&ctx.model).collect_set();
        ctx.load_invariant(set);
    }
    let report = ctx.solve();
    (ctx, report)
}

/// Executes `plan` from the model's start state; true iff every action was
/// applicable and the final state satisfies the target condition.
pub fn plan_is_valid(ctx: &SolveContext, plan: &[usize]) -> bool {
    let mut state = ctx.model.start.clone();
    for step in plan {
        let action = &ctx.model.actions[*step];
        if !action.applicable_in(&state) {
            return false;
        }
        action.apply_to(&mut state);
    }
    ctx.model.target.iter().all(|atom| state.value_of(*atom))
}

/// A single action turning the only goal atom on.
pub fn one_step() -> Problem {
    problem(2, &[0], &[1], vec![action("step", &[0], &[1], &[])])
}

/// A two-atom problem whose goal no action can reach.
pub fn unreachable() -> Problem {
    problem(2, &[0], &[1], vec![action("spin", &[], &[0], &[])])
}

/// Two-block blocksworld, both blocks on the table, goal `on a b`.
///
/// Atoms: 0 clear-a, 1 clear-b, 2 on-a-b, 3 on-b-a, 4 ontable-a,
/// 5 ontable-b, 6 holding-a, 7 holding-b, 8 handempty.
pub fn blocksworld() -> Problem {
    let actions = vec![
        action("pick-up a", &[0, 4, 8], &[6], &[0, 4, 8]),
        action("pick-up b", &[1, 5, 8], &[7], &[1, 5, 8]),
        action("put-down a", &[6], &[0, 4, 8], &[6]),
        action("put-down b", &[7], &[1, 5, 8], &[7]),
        action("stack a b", &[6, 1], &[2, 0, 8], &[6, 1]),
        action("stack b a", &[7, 0], &[3, 1, 8], &[7, 0]),
        action("unstack a b", &[2, 0, 8], &[6, 1], &[2, 0, 8]),
        action("unstack b a", &[3, 1, 8], &[7, 0], &[3, 1, 8]),
    ];
    problem(9, &[0, 1, 4, 5, 8], &[2], actions)
}
