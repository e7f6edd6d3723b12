/*!
The phase loop.

Phase *p* drives the PDR frontier to layer *p*: the root obligation (the
start state at layer *p* − 1) is reinserted unless a prior phase's
obligations survive to stand in for it, and the
[scheduler](crate::procedures::obligations) runs the queues dry. Between
phases the store grows one layer and, with `cla_subsumption == 2`, clause
[pushing](crate::procedures::pushing) propagates inductive clauses into it.

The loop ends with a plan, with a stabilised layer sequence (no plan), on
the phase limit, or on interrupt. The start state is checked against the
backward invariant once, before the first phase.

Roughly:

```none
      +-> phase limit? ----------------> UNRESOLVED
      |
      |   [reinsert root] -> process_obligations --+--> SAT (plan)
      |                                            +--> UNSAT (layer empty)
      |                                            |
      |   grow store, push clauses <---------------+ (exhausted)
      |       |        |
      |       |        +--> UNSAT (layer empty)
      +-------+
```
*/

use std::{rc::Rc, time::Instant};

use crate::{
    context::{Obligation, SolveContext},
    procedures::obligations::PhaseOutcome,
    reports::Report,
};

impl SolveContext {
    /// Runs PDR to an outcome.
    pub fn solve(&mut self) -> Report {
        self.run_clock = Some(Instant::now());

        assert!(self.model.atom_count > 0);
        debug_assert_eq!(self.layers.len(), 1);
        debug_assert!(self.obligations.is_empty());

        // Queue 0 keeps discharged obligations alive through a phase; one
        // more of everything readies phase 1.
        self.obligations.push(Default::default());
        self.obligations.push(Default::default());
        self.layers.push_layer();
        self.push_action_order();

        if self.invariant.falsified_on(&self.model.start) {
            println!("UNSAT: initial state doesn't satisfy the backward invariant!");
            return Report::Unsatisfiable;
        }

        self.phase = 1;
        loop {
            if self.config.pphase.value == 1 {
                println!("Phase {}", self.phase);
            }

            if self.phase > self.config.phaselim.value {
                println!("UNRESOLVED: Phase limit reached!");
                return Report::Unresolved;
            }

            let reinsert_root = self.config.obl_survive.value == 0
                || self.config.resched.value == 0
                || self.phase == 1
                || self.config.obl_subsumption.value == 2;

            let mut outcome = PhaseOutcome::Exhausted;

            if self.config.cla_subsumption.value == 2
                && reinsert_root
                && !self.start_satisfies_frontier()
            {
                if self.config.pphase.value == 1 {
                    println!("Skipped - initial state doesn't satisfy pushed clauses!");
                }
            } else {
                if reinsert_root {
                    let root = Rc::new(Obligation {
                        depth: 0,
                        state: self.model.start.clone(),
                        parent: None,
                        action: None,
                    });
                    // At the front, so stack order picks it last among the
                    // frontier's survivors.
                    self.obligations[self.phase - 1].push_front(root);
                }
                outcome = self.process_obligations();
            }

            if self.config.pphase.value == 2 {
                let mut line = String::new();
                for i in 0..self.phase {
                    line.push(if i < self.path_min_layer { '.' } else { '*' });
                }
                println!("{line}");
                self.path_min_layer = self.phase + 1;
            }

            match outcome {
                PhaseOutcome::PlanFound(length) => return Report::PlanFound(length),
                PhaseOutcome::LayerEmptied => return self.repetition_report(),
                PhaseOutcome::Interrupted => return Report::Interrupted,
                PhaseOutcome::Exhausted => {}
            }

            // Grow by a layer so pushing can fill it for the next phase.
            self.layers.push_layer();
            self.obligations.push(Default::default());
            self.push_action_order();

            if self.config.cla_subsumption.value == 2 {
                let clock = Instant::now();
                let emptied = self.clause_pushing();
                self.counters.time_pushing += clock.elapsed();

                if emptied.is_some() {
                    return self.repetition_report();
                }
            }

            if self.config.pphase.value == 1 {
                self.print_stats(true);
            }

            self.phase += 1;
        }
    }

    /// A stabilised layer sequence: unsatisfiable, unless the configuration
    /// is known to lose completeness.
    fn repetition_report(&self) -> Report {
        if self.config.obl_survive.value < 2 {
            Report::Unsatisfiable
        } else {
            Report::Unresolved
        }
    }

    /// True iff the start state satisfies the frontier's delta clauses.
    fn start_satisfies_frontier(&self) -> bool {
        use crate::structures::clause::Clause;
        self.layers.delta[self.phase]
            .iter()
            .all(|boxed| boxed.data.satisfied_on(&self.model.start))
    }

    /// Appends a freshly shuffled action ordering for the next layer.
    pub(crate) fn push_action_order(&mut self) {
        use rand::seq::SliceRandom;
        let mut order: Vec<usize> = (0..self.model.actions.len()).collect();
        order.shuffle(&mut self.rng);
        self.action_ords.push(order);
    }
}
