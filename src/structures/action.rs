/*!
Grounded STRIPS actions.

An action is a (preconditions, adds, deletes) triple of atom sets together
with its grounded name. Application is deterministic: with all preconditions
true, deletes are cleared and adds are set.

Actions are [normalized](crate::structures::problem::Problem::normalize)
before solving so that `del ∩ add = ∅` and `add ∩ pre = ∅`; under these the
order of effect application is immaterial.
*/

use crate::structures::{atom::Atom, state::State};

/// A grounded action: name plus (pre, add, del) atom lists.
#[derive(Clone, Debug)]
pub struct Action {
    /// The grounded name, e.g. `unstack b1 b2`.
    pub name: String,

    /// Atoms which must be true for the action to apply.
    pub pre: Vec<Atom>,

    /// Atoms set true by application.
    pub add: Vec<Atom>,

    /// Atoms set false by application.
    pub del: Vec<Atom>,
}

impl Action {
    /// True iff every precondition holds in `state`.
    pub fn applicable_in(&self, state: &State) -> bool {
        self.pre.iter().all(|atom| state.value_of(*atom))
    }

    /// Applies the action's effects to `state`: first deletes, then adds.
    pub fn apply_to(&self, state: &mut State) {
        for atom in &self.del {
            state.clear(*atom);
        }
        for atom in &self.add {
            state.set(*atom);
        }
    }
}

#[cfg(test)]
mod action_tests {
    use super::*;

    #[test]
    fn apply_sets_adds_and_clears_dels() {
        let action = Action {
            name: "flip".to_string(),
            pre: vec![0],
            add: vec![1],
            del: vec![2],
        };

        let mut state = State::filled(3, false);
        state.set(0);
        state.set(2);

        assert!(action.applicable_in(&state));
        action.apply_to(&mut state);

        assert!(state.value_of(0));
        assert!(state.value_of(1));
        assert!(!state.value_of(2));
    }

    #[test]
    fn inapplicable_on_missing_precondition() {
        let action = Action {
            name: "noop".to_string(),
            pre: vec![1],
            add: vec![0],
            del: vec![],
        };
        let state = State::filled(2, false);
        assert!(!action.applicable_in(&state));
    }
}
