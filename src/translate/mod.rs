/*!
Re-exports of the problem in other formats.

Two emitters, both driven by `just_*` switches and both exiting the run:

- [write_cnf]: the bounded-horizon SAT encoding of one transition step, in
  a DIMACS-like sectioned format. Variables are numbered atoms `1..N`,
  actions `N+1..N+A`, next-state atoms `N+A+1..N+A+N`; every clause ends
  with `0`. Sections are tagged by a leading letter: `c` comments (with
  `c FACT i name` and `c ACTION j name` naming lines and a `c implied lo hi`
  hint for the action-variable range), `i cnf V K` the initial state,
  `g cnf V K` the goal, `t cnf V K` the transition relation --- sequential
  (at-least-one over actions plus a classical frame) or parallel (pairwise
  mutexes for interfering actions plus an explanatory frame) --- and
  `u cnf V K` the binary invariant, when one was derived.

- [dump_grounded]: the grounded problem as a PDDL domain/problem pair
  (`operatorN.pddl`, `factsN.pddl`), in the direction the model searches.
  The `dummy` predicate keeps the initial state non-empty for third-party
  consumers and can be disabled via `dump_dummy`.
*/

use std::io::{self, Write};

use crate::{
    config::Config,
    invariant::InvariantSet,
    structures::{action::Action, problem::Model, problem::Problem},
};

/// A fact or action name as a single PDDL symbol.
fn grounded(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Reborrows `out` for a shorter lifetime; `Option<&mut dyn Write>` doesn't
/// implicitly reborrow through `as_deref_mut` across function calls.
fn reborrow<'a>(out: &'a mut Option<&mut dyn Write>) -> Option<&'a mut dyn Write> {
    match out {
        Some(w) => Some(&mut **w),
        None => None,
    }
}

/// Per-action precondition and effect clauses; returns the clause count,
/// printing only when `out` is given.
fn encode_actions(problem: &Problem, mut out: Option<&mut dyn Write>) -> io::Result<usize> {
    let atoms = problem.atom_count() as i64;
    let actions = problem.actions.len() as i64;
    let mut count = 0;

    let mut act_var = atoms + 1;
    for action in &problem.actions {
        for pre in &action.pre {
            if let Some(out) = reborrow(&mut out) {
                writeln!(out, "{} {} 0", -act_var, *pre as i64 + 1)?;
            }
            count += 1;
        }
        for add in &action.add {
            if let Some(out) = reborrow(&mut out) {
                writeln!(out, "{} {} 0", -act_var, atoms + actions + *add as i64 + 1)?;
            }
            count += 1;
        }
        for del in &action.del {
            if let Some(out) = reborrow(&mut out) {
                writeln!(out, "{} {} 0", -act_var, -(atoms + actions + *del as i64 + 1))?;
            }
            count += 1;
        }
        act_var += 1;
    }

    Ok(count)
}

fn preserves_fact(action: &Action, fact: u32) -> bool {
    !action.add.contains(&fact) && !action.del.contains(&fact)
}

/// Exactly one action per step, with a classical frame axiom.
fn sequential_encoding(problem: &Problem, mut out: Option<&mut dyn Write>) -> io::Result<usize> {
    let atoms = problem.atom_count() as i64;
    let actions = problem.actions.len() as i64;
    let mut count = 0;

    // At least one action.
    if let Some(out) = reborrow(&mut out) {
        for act_var in atoms + 1..=atoms + actions {
            write!(out, "{act_var} ")?;
        }
        writeln!(out, "0")?;
    }
    count += 1;

    count += encode_actions(problem, reborrow(&mut out))?;

    // Classical frame: an applied action preserves what it does not touch.
    let mut act_var = atoms + 1;
    for action in &problem.actions {
        for fact in 0..problem.atom_count() as u32 {
            if preserves_fact(action, fact) {
                let now = fact as i64 + 1;
                let next = atoms + actions + fact as i64 + 1;
                if let Some(out) = reborrow(&mut out) {
                    writeln!(out, "{} {} {} 0", -act_var, -now, next)?;
                    writeln!(out, "{} {} {} 0", -act_var, now, -next)?;
                }
                count += 2;
            }
        }
        act_var += 1;
    }

    Ok(count)
}

/// True iff `a` deletes a precondition or an add of `b`.
fn deletes_pre_or_add(a: &Action, b: &Action) -> bool {
    a.del
        .iter()
        .any(|del| b.pre.contains(del) || b.add.contains(del))
}

/// Non-interfering actions in parallel, with an explanatory frame.
fn parallel_encoding(problem: &Problem, mut out: Option<&mut dyn Write>) -> io::Result<usize> {
    let atoms = problem.atom_count() as i64;
    let actions = problem.actions.len() as i64;
    let mut count = 0;

    // Pairwise mutex for interfering pairs.
    for (i, a) in problem.actions.iter().enumerate() {
        for (j, b) in problem.actions.iter().enumerate().skip(i + 1) {
            if deletes_pre_or_add(a, b) || deletes_pre_or_add(b, a) {
                if let Some(out) = reborrow(&mut out) {
                    writeln!(
                        out,
                        "{} {} 0",
                        -(atoms + i as i64 + 1),
                        -(atoms + j as i64 + 1)
                    )?;
                }
                count += 1;
            }
        }
    }

    count += encode_actions(problem, reborrow(&mut out))?;

    // Explanatory frame: a change of value names a responsible action.
    for fact in 0..problem.atom_count() as u32 {
        let now = fact as i64 + 1;
        let next = atoms + actions + fact as i64 + 1;

        if let Some(out) = reborrow(&mut out) {
            write!(out, "{} {} ", now, -next)?;
            for (i, action) in problem.actions.iter().enumerate() {
                if action.add.contains(&fact) {
                    write!(out, "{} ", atoms + i as i64 + 1)?;
                }
            }
            writeln!(out, "0")?;

            write!(out, "{} {} ", -now, next)?;
            for (i, action) in problem.actions.iter().enumerate() {
                if action.del.contains(&fact) {
                    write!(out, "{} ", atoms + i as i64 + 1)?;
                }
            }
            writeln!(out, "0")?;
        }
        count += 2;
    }

    Ok(count)
}

/// Writes the bounded-horizon encoding; `parallel` selects the transition
/// semantics.
pub fn write_cnf(
    out: &mut impl Write,
    problem: &Problem,
    parallel: bool,
    invariant: Option<&InvariantSet>,
) -> io::Result<()> {
    let atoms = problem.atom_count() as i64;
    let actions = problem.actions.len() as i64;

    for (idx, name) in problem.atom_names.iter().enumerate() {
        writeln!(out, "c FACT {} {}", idx + 1, grounded(name))?;
    }
    for (idx, action) in problem.actions.iter().enumerate() {
        writeln!(out, "c ACTION {} ({})", atoms + idx as i64 + 1, action.name)?;
    }
    writeln!(out, "c implied {} {}", atoms + 1, atoms + actions)?;
    writeln!(out, "c START")?;

    // Initial state: every atom, by polarity.
    writeln!(out, "i cnf {} {}", atoms + actions, atoms)?;
    for fact in 0..problem.atom_count() as u32 {
        let var = fact as i64 + 1;
        match problem.initial.value_of(fact) {
            true => writeln!(out, "{var} 0")?,
            false => writeln!(out, "{} 0", -var)?,
        }
    }

    // Goal condition.
    writeln!(out, "g cnf {} {}", atoms + actions, problem.goal.len())?;
    for atom in &problem.goal {
        writeln!(out, "{} 0", *atom as i64 + 1)?;
    }

    // Transition relation.
    let count = match parallel {
        false => sequential_encoding(problem, None)?,
        true => parallel_encoding(problem, None)?,
    };
    writeln!(out, "t cnf {} {}", 2 * (atoms + actions), count)?;
    match parallel {
        false => sequential_encoding(problem, Some(&mut *out as &mut dyn Write))?,
        true => parallel_encoding(problem, Some(&mut *out as &mut dyn Write))?,
    };

    // The binary invariant, when derived.
    if let Some(invariant) = invariant {
        if !invariant.is_empty() {
            writeln!(out, "u cnf {} {}", atoms + actions, invariant.len())?;
            for clause in invariant.iter() {
                if clause.is_unit() {
                    writeln!(out, "{} 0", clause.l1 as i64 + 1)?;
                } else {
                    writeln!(out, "{} {} 0", clause.l1 as i64 + 1, clause.l2 as i64 + 1)?;
                }
            }
        }
    }

    Ok(())
}

/// Dumps the grounded problem as `operator<suffix>.pddl` and
/// `facts<suffix>.pddl` in the working directory.
pub fn dump_grounded(
    problem: &Problem,
    model: &Model,
    config: &Config,
    suffix: usize,
) -> io::Result<()> {
    let dummy = config.dump_dummy.value;

    // The domain file.
    let mut out = std::fs::File::create(format!("operator{suffix}.pddl"))?;

    writeln!(out, "(define (domain {}-GND)", grounded(&problem.domain_name))?;
    writeln!(out, "(:predicates")?;
    if dummy {
        writeln!(out, "\t(dummy)")?;
    }
    for name in &problem.atom_names {
        writeln!(out, "\t({})", grounded(name))?;
    }
    writeln!(out, ")")?;

    for action in &model.actions {
        writeln!(out, "(:action {}", grounded(&action.name))?;

        if !action.pre.is_empty() {
            write!(out, "\t:precondition (and ")?;
            for pre in &action.pre {
                write!(out, "({}) ", grounded(&problem.atom_names[*pre as usize]))?;
            }
            writeln!(out, ")")?;
        }

        if !action.add.is_empty() || !action.del.is_empty() {
            write!(out, "\t:effect (and ")?;
            for add in &action.add {
                write!(out, "({}) ", grounded(&problem.atom_names[*add as usize]))?;
            }
            for del in &action.del {
                write!(
                    out,
                    "(not ({})) ",
                    grounded(&problem.atom_names[*del as usize])
                )?;
            }
            writeln!(out, ")")?;
        }

        writeln!(out, ")")?;
    }
    writeln!(out, ")")?;

    // The problem file.
    let mut out = std::fs::File::create(format!("facts{suffix}.pddl"))?;

    writeln!(out, "(define (problem {}-GND)", grounded(&problem.problem_name))?;
    writeln!(out, "(:domain {}-GND)", grounded(&problem.domain_name))?;

    writeln!(out, "(:init")?;
    if dummy {
        writeln!(out, "\t(dummy)")?;
    }
    for atom in model.start.true_atoms() {
        writeln!(out, "\t({})", grounded(&problem.atom_names[atom as usize]))?;
    }
    writeln!(out, ")")?;

    writeln!(out, "(:goal (and")?;
    for atom in &model.target {
        writeln!(out, "\t({})", grounded(&problem.atom_names[*atom as usize]))?;
    }
    writeln!(out, "))")?;

    writeln!(out, ")")?;

    Ok(())
}
