/*!
Clause pushing --- propagation of inductive clauses between phases.

A clause of `delta[k]` whose negation-as-state (exactly its atoms false) has
no successor inside layer *k* is inductive relative to the layer: every
*k*-bounded state satisfying it leads only to states satisfying it again.
Such a clause migrates --- it stays derived at *k* and becomes a `delta`
clause of *k* + 1.

Pushing visits layers in increasing order from `least_affected_layer`,
which tracks the weakest layer insertion touched since the previous pass.
A `delta` layer emptied by pushing is the stabilisation signal.
*/

use crate::{
    context::SolveContext,
    db::layers::prune_by_clause,
    misc::log::targets,
    procedures::obligations::Migration,
    structures::state::State,
};

impl SolveContext {
    /// One pushing pass; returns the index of an emptied delta layer.
    pub(crate) fn clause_pushing(&mut self) -> Option<usize> {
        debug_assert_eq!(self.layers.len(), self.phase + 2);

        for idx in self.least_affected_layer..=self.phase {
            let candidates = self.layers.delta[idx].clone();
            let mut kept = Vec::with_capacity(candidates.len());

            for boxed in candidates {
                let mut negation = State::filled(self.model.atom_count, true);
                for atom in &boxed.data {
                    negation.clear(*atom);
                }

                if self.has_layer_successor(idx, &negation) {
                    kept.push(boxed);
                    continue;
                }

                log::trace!(target: targets::PUSHING,
                    "Pushing from {idx}: {:?}", boxed.data);
                self.counters.cla_pushed += 1;

                let (strong, same) = prune_by_clause(
                    &mut self.layers.delta[idx + 1],
                    &boxed.data,
                    idx + 1,
                    false,
                    &mut self.counters,
                );
                debug_assert!(strong && same.is_none());

                // The box keeps its reference from delta[idx] as a deriv
                // reference, and gains one as the new frontier clause.
                self.layers.deriv[idx].push(boxed.clone());
                boxed.extended_to(idx + 1);
                self.layers.delta[idx + 1].push(boxed.clone());

                // Without migration a surviving obligation could reach a
                // layer with no false clause.
                debug_assert!(
                    self.config.obl_survive.value == 0
                        || self.config.obl_subsumption.value > 0
                );

                if self.config.obl_subsumption.value > 0 {
                    // Only the frontier queue can be non-empty between
                    // phases, and only in survival mode.
                    debug_assert!(idx == self.phase || self.obligations[idx].is_empty());
                    let moved =
                        self.migrate_falsified(idx, &boxed.data, Migration::Forward);
                    self.counters.oblig_subsumed += moved;
                }
            }

            self.layers.delta[idx] = kept;

            if self.layers.delta[idx].is_empty() {
                self.report_repetition(idx, "pushing");
                return Some(idx);
            }
        }

        self.least_affected_layer = self.phase + 1;
        None
    }
}
