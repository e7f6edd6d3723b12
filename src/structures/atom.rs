/*!
(The internal representation of) an atom, aka. a ground fact.

Each atom is a `u32` index into the fact universe of the grounded problem.
The universe is fixed when a problem is built: the atoms are [0..*n*) for the
*n* relevant facts, and so an atom doubles as an index into any structure
keyed by facts (states, names, the invariant lists).

The external representation of an atom is stored in the
[problem](crate::structures::problem::Problem).
*/

/// An atom, aka. a ground fact of the planning problem.
pub type Atom = u32;

/// A pseudo-atom used where a partner literal is absent.
pub const NO_ATOM: Atom = Atom::MAX;
