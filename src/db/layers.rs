/*!
The layer store.

Layer *k* over-approximates the set of states from which the target is
reachable in ≤ *k* steps, represented by the conjunction of its blocking
clauses. Per layer the store keeps two lists of [LayerClause] boxes:

- `delta[k]`: clauses whose strongest layer is *k* --- known at *k* but not at
  *k* + 1.
- `deriv[k]`: clauses inherited from some stronger layer. Boxes here may
  have been invalidated externally, so any traversal prunes or checks
  validity.

Layers strengthen monotonically: every clause held at layer *k* also holds
at every weaker layer in its interval. A `delta` layer running empty means
two adjacent layers coincide and the sequence has stabilised --- the store
reports the index as the engine's unsatisfiability signal.
*/

use crate::{
    config::Config,
    context::Counters,
    db::clause_box::{ClauseBox, LayerClause},
    misc::log::targets,
    structures::{atom::Atom, clause::CClause, clause::Clause, state::State},
};

/// Drops the boxes of `layer` whose liveness interval excludes `idx`.
pub(crate) fn prune_invalid(layer: &mut Vec<LayerClause>, idx: usize) {
    layer.retain(|boxed| boxed.valid_at(idx));
}

/// Prunes `layer` against the incoming clause `cl`.
///
/// In one pass: invalid boxes are dropped; boxes subsumed by `cl` are kicked
/// from `idx` and removed; a box with exactly the atoms of `cl` is removed
/// from the list but handed back as `same` (still live) for the caller to
/// merge with; and, when `test_for_weak`, `cl` itself is tested against the
/// surviving boxes --- `strong` is false if one of them subsumes it.
pub(crate) fn prune_by_clause(
    layer: &mut Vec<LayerClause>,
    cl: &[Atom],
    idx: usize,
    test_for_weak: bool,
    counters: &mut Counters,
) -> (bool, Option<LayerClause>) {
    let mut strong = true;
    let mut same: Option<LayerClause> = None;

    layer.retain(|boxed| {
        if !boxed.valid_at(idx) {
            return false;
        }
        if strong && same.is_none() {
            if cl.subsumes(&boxed.data) {
                if cl.len() == boxed.data.len() {
                    same = Some(boxed.clone());
                } else {
                    boxed.kicked_from(idx);
                    counters.cla_subsumed += 1;
                }
                return false;
            } else if test_for_weak && boxed.data.subsumes(&cl) {
                strong = false;
            }
        }
        true
    });

    (strong, same)
}

/// The ordered sequence of layers.
pub struct LayerDB {
    /// Clauses whose strongest layer is the list index.
    pub delta: Vec<Vec<LayerClause>>,

    /// Clauses inherited from stronger layers.
    pub deriv: Vec<Vec<LayerClause>>,
}

impl LayerDB {
    /// A store with layer 0 seeded by one unit clause per target atom.
    pub fn new(target: &[Atom]) -> Self {
        let layer_zero = target
            .iter()
            .map(|atom| ClauseBox::at(vec![*atom], 0))
            .collect();

        LayerDB {
            delta: vec![layer_zero],
            deriv: vec![Vec::new()],
        }
    }

    /// The number of layers.
    pub fn len(&self) -> usize {
        self.delta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delta.is_empty()
    }

    /// Appends a fresh, empty layer.
    pub fn push_layer(&mut self) {
        self.delta.push(Vec::new());
        self.deriv.push(Vec::new());
    }

    /// True iff `state` satisfies every clause of layer `idx`.
    ///
    /// The invariant is checked elsewhere.
    pub fn is_layer_state(&self, idx: usize, state: &State) -> bool {
        for boxed in &self.delta[idx] {
            if !boxed.data.satisfied_on(state) {
                return false;
            }
        }
        for boxed in &self.deriv[idx] {
            if !boxed.data.satisfied_on(state) {
                return false;
            }
        }
        true
    }

    /// Inserts the blocking clause `cl` with layer `idx` as its new frontier.
    ///
    /// The clause first prunes its own layer; an equal clause already
    /// present is merged with instead of duplicated, and without obligation
    /// subsumption `cl` may itself turn out too weak and be dropped. With
    /// clause subsumption on, pruning then cascades down the weaker layers
    /// while `cl` remains strictly stronger than everything it meets, and
    /// the surviving clause is boxed across the whole strengthened range.
    ///
    /// Returns the index of a `delta` layer emptied by the cascade, if any ---
    /// in which case the insertion is abandoned.
    pub fn insert(
        &mut self,
        cl: CClause,
        idx: usize,
        config: &Config,
        counters: &mut Counters,
    ) -> Option<usize> {
        log::trace!(target: targets::LAYERS, "Insert at {idx}: {cl:?}");
        let test_for_weak = config.obl_subsumption.value == 0;

        // The clause's own layer, delta then derived.
        let (strong, same) = prune_by_clause(&mut self.delta[idx], &cl, idx, test_for_weak, counters);
        if !strong {
            return None;
        }
        if let Some(same) = same {
            self.delta[idx].push(same);
            return None;
        }

        let (strong, same) = prune_by_clause(&mut self.deriv[idx], &cl, idx, test_for_weak, counters);
        if !strong {
            return None;
        }
        if let Some(same) = same {
            self.deriv[idx].push(same);
            return None;
        }

        assert!(idx > 0, "blocking clauses never target layer 0");

        let mut floor = idx - 1;
        while floor > 0 {
            if config.cla_subsumption.value == 0 {
                break;
            }

            let (strong, same) =
                prune_by_clause(&mut self.delta[floor], &cl, floor, true, counters);
            if !strong {
                break;
            }

            if self.delta[floor].is_empty() {
                // Any equal clause removed above drops with the insertion.
                return Some(floor);
            }

            if let Some(same) = same {
                same.extended_to(idx);
                self.delta[idx].push(same.clone());
                for j in floor + 1..idx {
                    self.deriv[j].push(same.clone());
                }
                self.deriv[floor].push(same);
                return None;
            }

            floor -= 1;
        }

        let boxed = ClauseBox::at(cl, idx);
        boxed.reaches_down_to(floor + 1);
        self.delta[idx].push(boxed.clone());
        for j in floor + 1..idx {
            self.deriv[j].push(boxed.clone());
        }

        None
    }
}

#[cfg(test)]
mod layer_tests {
    use super::*;
    use std::rc::Rc;

    fn ctx() -> (Config, Counters) {
        (Config::default(), Counters::default())
    }

    /// A store where the weak layers carry unrelated ballast clauses, as
    /// the phase loop guarantees when an insert cascade reaches them.
    fn seeded(layers: usize) -> LayerDB {
        let mut db = LayerDB::new(&[0]);
        for _ in 0..layers {
            db.push_layer();
        }
        for idx in 1..layers {
            db.delta[idx].push(ClauseBox::at(vec![90 + idx as Atom], idx));
        }
        db
    }

    #[test]
    fn insert_spans_down_to_layer_one() {
        let (config, mut counters) = ctx();
        let mut db = seeded(4);

        assert_eq!(db.insert(vec![1, 2], 3, &config, &mut counters), None);

        let boxed = db.delta[3]
            .iter()
            .find(|b| b.data == vec![1, 2])
            .cloned()
            .unwrap();
        assert_eq!(boxed.interval(), (1, 3));
        assert!(db.deriv[2].iter().any(|b| Rc::ptr_eq(b, &boxed)));
        assert!(db.deriv[1].iter().any(|b| Rc::ptr_eq(b, &boxed)));
        assert!(db.deriv[0].is_empty());
        // Held by delta[3], deriv[2], deriv[1], and this test.
        assert_eq!(Rc::strong_count(&boxed), 4);
    }

    #[test]
    fn stronger_clause_expels_weaker() {
        let (config, mut counters) = ctx();
        let mut db = seeded(4);

        db.insert(vec![1, 2, 3], 2, &config, &mut counters);
        db.insert(vec![1, 2], 2, &config, &mut counters);

        // The weaker clause is kicked out of its interval entirely.
        assert!(db.delta[2].iter().all(|b| b.data != vec![1, 2, 3]));
        assert!(db.delta[2].iter().any(|b| b.data == vec![1, 2]));
        assert_eq!(counters.cla_subsumed, 1);

        prune_invalid(&mut db.deriv[1], 1);
        assert!(db.deriv[1].iter().all(|b| b.data != vec![1, 2, 3]));
        assert!(db.deriv[1].iter().any(|b| b.data == vec![1, 2]));
    }

    #[test]
    fn equal_clause_is_merged_not_duplicated() {
        let (config, mut counters) = ctx();
        let mut db = seeded(4);

        db.insert(vec![1, 2], 2, &config, &mut counters);
        db.insert(vec![1, 2], 2, &config, &mut counters);

        let copies = db.delta[2].iter().filter(|b| b.data == vec![1, 2]).count();
        assert_eq!(copies, 1);
        assert_eq!(counters.cla_subsumed, 0);
    }

    #[test]
    fn merge_from_weaker_layer_extends_interval() {
        let (config, mut counters) = ctx();
        let mut db = seeded(4);

        db.insert(vec![1, 2], 2, &config, &mut counters);
        db.insert(vec![1, 2], 3, &config, &mut counters);

        // The old box now spans layers 1..=3: delta home at 3, derived
        // below, and no duplicate was created.
        assert_eq!(db.delta[3].iter().filter(|b| b.data == vec![1, 2]).count(), 1);
        let boxed = db.delta[3]
            .iter()
            .find(|b| b.data == vec![1, 2])
            .cloned()
            .unwrap();
        assert_eq!(boxed.interval(), (1, 3));
        assert!(db.deriv[2].iter().any(|b| Rc::ptr_eq(b, &boxed)));
        assert!(db.deriv[1].iter().any(|b| Rc::ptr_eq(b, &boxed)));
        assert!(!db.delta[2].iter().any(|b| Rc::ptr_eq(b, &boxed)));
    }

    #[test]
    fn merge_emptying_a_weaker_layer_is_terminal() {
        let (config, mut counters) = ctx();
        let mut db = LayerDB::new(&[0]);
        for _ in 0..4 {
            db.push_layer();
        }
        db.delta[1].push(ClauseBox::at(vec![91], 1));

        // The equal clause is delta[2]'s only member: removing it for the
        // merge empties the layer, which is the stabilisation signal.
        db.insert(vec![1, 2], 2, &config, &mut counters);
        assert_eq!(db.insert(vec![1, 2], 3, &config, &mut counters), Some(2));
    }

    #[test]
    fn emptied_layer_is_reported() {
        let (config, mut counters) = ctx();
        let mut db = LayerDB::new(&[0]);
        for _ in 0..4 {
            db.push_layer();
        }

        db.insert(vec![1, 2], 1, &config, &mut counters);
        // Subsumes the only clause of delta[1], emptying it.
        let emptied = db.insert(vec![1], 2, &config, &mut counters);
        assert_eq!(emptied, Some(1));
    }

    #[test]
    fn refcount_matches_list_membership() {
        let (config, mut counters) = ctx();
        let mut db = seeded(5);

        db.insert(vec![4, 6], 4, &config, &mut counters);
        db.insert(vec![2, 4, 6], 3, &config, &mut counters);

        for idx in 0..db.len() {
            prune_invalid(&mut db.delta[idx], idx);
            prune_invalid(&mut db.deriv[idx], idx);
        }

        // Count list memberships per box and compare with the refcount.
        let mut boxes: Vec<LayerClause> = Vec::new();
        for list in db.delta.iter().chain(db.deriv.iter()) {
            for boxed in list {
                if !boxes.iter().any(|b| Rc::ptr_eq(b, boxed)) {
                    boxes.push(boxed.clone());
                }
            }
        }
        for boxed in &boxes {
            let held: usize = db
                .delta
                .iter()
                .chain(db.deriv.iter())
                .map(|list| list.iter().filter(|b| Rc::ptr_eq(b, boxed)).count())
                .sum();
            // One extra count for the handle taken by this test.
            assert_eq!(Rc::strong_count(boxed), held + 1);
        }
    }
}
