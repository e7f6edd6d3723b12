/*!
Refcounted carriers for layer clauses.

A blocking clause derived at layer *k* typically also strengthens every
weaker layer down to some minimum, so one clause is listed by several layers
at once. A [ClauseBox] is the shared carrier: the clause data together with
the closed liveness interval `[to .. from]` of layers it currently belongs
to. Sharing is by [Rc] --- the strong count of a box equals the number of
`delta`/`derived` lists holding it, and a box expelled everywhere is freed
when the last list lets go.

The interval is adjusted in place through [Cell]s: subsumption *kicks* a box
out of a layer (raising `to`), and pushing *extends* a box one layer up
(raising `from`). Lists drop boxes whose interval no longer covers them
lazily, on their next traversal.
*/

use std::{cell::Cell, rc::Rc};

use crate::structures::clause::CClause;

/// A shared, interval-tagged layer clause.
pub type LayerClause = Rc<ClauseBox>;

/// A clause together with the layer interval it is live in.
pub struct ClauseBox {
    /// The clause, atoms sorted ascending.
    pub data: CClause,

    /// The strongest layer holding the clause.
    from: Cell<usize>,

    /// The weakest layer holding the clause.
    to: Cell<usize>,
}

impl ClauseBox {
    /// A fresh box live exactly at `idx`.
    pub fn at(data: CClause, idx: usize) -> LayerClause {
        Rc::new(ClauseBox {
            data,
            from: Cell::new(idx),
            to: Cell::new(idx),
        })
    }

    /// True iff the box is live at layer `idx`.
    pub fn valid_at(&self, idx: usize) -> bool {
        self.from.get() >= idx && idx >= self.to.get()
    }

    /// Notes expulsion from layer `idx`: the box stays live above it.
    pub fn kicked_from(&self, idx: usize) {
        self.to.set(idx + 1);
    }

    /// Notes extension up to the stronger layer `idx`.
    pub fn extended_to(&self, idx: usize) {
        self.from.set(idx);
    }

    /// Lowers the weak end of the interval to `idx`.
    pub fn reaches_down_to(&self, idx: usize) {
        self.to.set(idx);
    }

    /// The interval as a `(to, from)` pair.
    pub fn interval(&self) -> (usize, usize) {
        (self.to.get(), self.from.get())
    }
}

#[cfg(test)]
mod clause_box_tests {
    use super::*;

    #[test]
    fn interval_adjustment() {
        let boxed = ClauseBox::at(vec![2, 5], 4);
        assert!(boxed.valid_at(4));
        assert!(!boxed.valid_at(3));
        assert!(!boxed.valid_at(5));

        boxed.reaches_down_to(2);
        assert!(boxed.valid_at(2));
        assert!(boxed.valid_at(3));

        boxed.extended_to(5);
        assert!(boxed.valid_at(5));

        boxed.kicked_from(2);
        assert!(!boxed.valid_at(2));
        assert_eq!(boxed.interval(), (3, 5));
    }
}
