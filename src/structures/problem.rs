/*!
The grounded problem and its direction-aware model.

A [Problem] is the immutable output of grounding: the fact universe, the
grounded actions in forward orientation, the initial state and the goal
condition. A [Model] is the view the solver works against. It is the only
place which knows about reverse mode: when searching by regression the model
exchanges preconditions and deletes, starts from the flipped goal state, and
targets the complement of the initial state. Everything downstream uses the
model's direction-neutral fields.
*/

use crate::{
    misc::log::targets,
    structures::{action::Action, atom::Atom, clause::CClause, state::State},
};

/// A grounded planning problem, forward orientation.
#[derive(Debug)]
pub struct Problem {
    /// The domain name, used for grounded dumps.
    pub domain_name: String,

    /// The problem name, used for grounded dumps.
    pub problem_name: String,

    /// External names of the atoms, indexed by atom.
    pub atom_names: Vec<String>,

    /// The grounded actions.
    pub actions: Vec<Action>,

    /// The initial state.
    pub initial: State,

    /// The goal condition, a conjunction of atoms, sorted ascending.
    pub goal: Vec<Atom>,
}

impl Problem {
    /// The number of atoms in the fact universe.
    pub fn atom_count(&self) -> usize {
        self.atom_names.len()
    }

    /// True iff the initial state satisfies the goal condition.
    pub fn goal_in_initial(&self) -> bool {
        self.goal.iter().all(|atom| self.initial.value_of(*atom))
    }

    /// Normalizes every action to `del ∩ add = ∅` and `add ∩ pre = ∅`, and
    /// drops actions whose add list becomes empty.
    ///
    /// Returns the number of actions modified and the number dropped.
    pub fn normalize(&mut self) -> (usize, usize) {
        let mut playground = vec![0usize; self.atom_count()];
        let mut mark = 0usize;

        let mut modified = 0;
        let mut dropped = 0;

        self.actions.retain_mut(|action| {
            let mut touched = false;

            // del := del \ add
            mark += 1;
            for atom in &action.add {
                playground[*atom as usize] = mark;
            }
            let before = action.del.len();
            action.del.retain(|atom| playground[*atom as usize] != mark);
            touched |= action.del.len() != before;

            // add := add \ pre
            mark += 1;
            for atom in &action.pre {
                playground[*atom as usize] = mark;
            }
            let before = action.add.len();
            action.add.retain(|atom| playground[*atom as usize] != mark);
            touched |= action.add.len() != before;

            if action.add.is_empty() {
                log::trace!(target: targets::BUILD, "Dropped actionless action {}", action.name);
                dropped += 1;
                return false;
            }
            if touched {
                modified += 1;
            }
            true
        });

        (modified, dropped)
    }
}

/// The solver's view of a problem in the configured search direction.
pub struct Model {
    /// The number of atoms in the fact universe.
    pub atom_count: usize,

    /// The actions, with (pre, add, del) as seen in the search direction.
    pub actions: Vec<Action>,

    /// The state the search starts from.
    pub start: State,

    /// The target condition as a conjunction of atoms, sorted ascending.
    pub target: CClause,

    /// Whether the model searches by regression from the goal.
    pub reverse: bool,
}

impl Model {
    /// Builds the model for the requested direction.
    ///
    /// In reverse mode preconditions and deletes are exchanged (regression
    /// semantics), the start state is the goal state with negated polarity,
    /// and the target collects the atoms false in the initial state.
    pub fn build(problem: &Problem, reverse: bool) -> Self {
        let atom_count = problem.atom_count();

        if !reverse {
            let mut target = problem.goal.clone();
            target.sort_unstable();

            Model {
                atom_count,
                actions: problem.actions.clone(),
                start: problem.initial.clone(),
                target,
                reverse,
            }
        } else {
            let actions = problem
                .actions
                .iter()
                .map(|action| Action {
                    name: action.name.clone(),
                    pre: action.del.clone(),
                    add: action.add.clone(),
                    del: action.pre.clone(),
                })
                .collect();

            let mut start = State::filled(atom_count, true);
            for atom in &problem.goal {
                start.clear(*atom);
            }

            let target = (0..atom_count as Atom)
                .filter(|atom| !problem.initial.value_of(*atom))
                .collect();

            Model {
                atom_count,
                actions,
                start,
                target,
                reverse,
            }
        }
    }
}

#[cfg(test)]
mod problem_tests {
    use super::*;

    fn two_atom_problem() -> Problem {
        let mut initial = State::filled(2, false);
        initial.set(0);

        Problem {
            domain_name: "d".to_string(),
            problem_name: "p".to_string(),
            atom_names: vec!["p".to_string(), "q".to_string()],
            actions: vec![Action {
                name: "a".to_string(),
                pre: vec![0],
                add: vec![1, 0],
                del: vec![1],
            }],
            initial,
            goal: vec![1],
        }
    }

    #[test]
    fn normalization() {
        let mut problem = two_atom_problem();
        let (modified, dropped) = problem.normalize();
        assert_eq!((modified, dropped), (1, 0));

        let action = &problem.actions[0];
        // 1 was both added and deleted, 0 was both added and required.
        assert_eq!(action.add, vec![1]);
        assert_eq!(action.del, Vec::<Atom>::new());
        assert_eq!(action.pre, vec![0]);
    }

    #[test]
    fn reverse_model_swaps_and_flips() {
        let mut problem = two_atom_problem();
        problem.normalize();
        let model = Model::build(&problem, true);

        assert_eq!(model.actions[0].pre, Vec::<Atom>::new());
        assert_eq!(model.actions[0].del, vec![0]);

        // Goal state with negated polarity: atom 1 false, the rest true.
        assert!(model.start.value_of(0));
        assert!(!model.start.value_of(1));

        // Atoms false in the initial state.
        assert_eq!(model.target, vec![1]);
    }
}
