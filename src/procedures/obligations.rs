/*!
The obligation scheduler --- the inner loop of a phase.

Obligations are processed from the weakest non-empty queue upwards. Each pop
is handed to the [extension oracle](crate::procedures::extend):

- an extension spawns a child one layer down (reaching layer 0 is a plan),
- a sidestep spawns a sibling in the same queue,
- a block inserts the derived clause one layer up, after which the blocked
  obligation is rescheduled or dropped, and obligations the clause falsifies
  are migrated forward (or, at the frontier, into the grave).

Stack order (the default) favours depth: a freshly spawned child is the
next obligation considered. Sidestepping requires it --- under FIFO a parent
may sidestep to the same sibling each time it resurfaces, starving the
siblings' own descendants.
*/

use std::{rc::Rc, time::Instant};

use crate::{
    context::{Obligation, SolveContext},
    misc::log::targets,
    procedures::extend::Extension,
    structures::{atom::Atom, clause::Clause},
};

/// How a phase's obligation processing ended.
pub(crate) enum PhaseOutcome {
    /// All queues drained without reaching layer 0.
    Exhausted,

    /// A plan of the noted length was found (and written out).
    PlanFound(usize),

    /// A delta layer ran empty: two layers coincide.
    LayerEmptied,

    /// The external interrupt flag was raised.
    Interrupted,
}

/// Where obligations falsified by a fresh clause are migrated to.
pub(crate) enum Migration {
    /// One queue up.
    Forward,

    /// Into the grave.
    Grave,
}

impl SolveContext {
    pub(crate) fn process_obligations(&mut self) -> PhaseOutcome {
        debug_assert!(self.phase > 0);
        let phase = self.phase;

        let mut obl_top = phase - 1;

        loop {
            if self.interrupted() {
                return PhaseOutcome::Interrupted;
            }

            while obl_top < phase && self.obligations[obl_top].is_empty() {
                obl_top += 1;
            }

            if obl_top == phase {
                if self.config.obl_survive.value == 0 {
                    // The next phase starts from scratch.
                    self.obligations[phase].clear();
                }
                return PhaseOutcome::Exhausted;
            }

            let obl = match self.config.oblig_prior_stack.value {
                true => self.obligations[obl_top].pop_back(),
                false => self.obligations[obl_top].pop_front(),
            };
            let Some(obl) = obl else { unreachable!() };

            self.counters.oblig_processed += 1;

            if obl_top < self.path_min_layer {
                self.path_min_layer = obl_top;
            }
            if obl_top + 1 < self.least_affected_layer {
                self.least_affected_layer = obl_top + 1;
            }

            let clock = Instant::now();

            match self.extend(obl_top, &obl.state) {
                extension @ (Extension::Extend(_) | Extension::Sidestep(_)) => {
                    self.counters.time_extend_sat += clock.elapsed();

                    let (action_idx, sidestep) = match extension {
                        Extension::Extend(action_idx) => {
                            self.counters.oblig_extended += 1;
                            (action_idx, false)
                        }
                        Extension::Sidestep(action_idx) => {
                            self.counters.oblig_sidestepped += 1;
                            (action_idx, true)
                        }
                        Extension::Block(_) => unreachable!(),
                    };

                    // The parent goes back --- or to the grave, under the
                    // incomplete survival variant.
                    if self.config.obl_survive.value < 2 {
                        self.obligations[obl_top].push_back(obl.clone());
                    } else {
                        self.grave.push(obl.clone());
                    }

                    let mut state = obl.state.clone();
                    self.model.actions[action_idx].apply_to(&mut state);
                    let child = Rc::new(Obligation {
                        depth: obl.depth + 1,
                        state,
                        parent: Some(obl),
                        action: Some(action_idx),
                    });

                    if sidestep {
                        self.obligations[obl_top].push_back(child);
                    } else if obl_top == 0 {
                        println!("SAT: plan of length {} found", child.depth);
                        let length = child.depth;
                        self.emit_solution(&child);
                        return PhaseOutcome::PlanFound(length);
                    } else {
                        self.obligations[obl_top - 1].push_back(child);
                        obl_top -= 1;
                    }
                }

                Extension::Block(clause) => {
                    self.counters.oblig_blocked += 1;
                    self.counters.time_extend_uns += clock.elapsed();
                    self.counters.cla_derived += 1;

                    let emptied =
                        self.layers
                            .insert(clause.clone(), obl_top + 1, &self.config, &mut self.counters);
                    if let Some(layer) = emptied {
                        self.report_repetition(layer, "subsumption");
                        return PhaseOutcome::LayerEmptied;
                    }

                    if self.config.obl_subsumption.value == 2 && obl_top + 1 == phase {
                        // Off the rim: cannot be deleted outright, they may
                        // be part of the future plan.
                        let killed = self.migrate_falsified(obl_top, &clause, Migration::Grave);
                        self.counters.oblig_killed += killed;
                    } else if self.config.obl_subsumption.value > 0 {
                        let moved = self.migrate_falsified(obl_top, &clause, Migration::Forward);
                        self.counters.oblig_subsumed += moved;
                    }

                    if self.config.resched.value > 0 {
                        self.obligations[obl_top + 1].push_back(obl);
                    }
                }
            }
        }
    }

    /// Moves the obligations of queue `idx` whose states falsify `clause`
    /// to the queue above or to the grave; returns how many moved.
    pub(crate) fn migrate_falsified(
        &mut self,
        idx: usize,
        clause: &[Atom],
        target: Migration,
    ) -> usize {
        let mut moved = 0;
        let mut retained = std::collections::VecDeque::with_capacity(self.obligations[idx].len());

        while let Some(obl) = self.obligations[idx].pop_front() {
            if clause.satisfied_on(&obl.state) {
                retained.push_back(obl);
            } else {
                moved += 1;
                match target {
                    Migration::Forward => self.obligations[idx + 1].push_back(obl),
                    Migration::Grave => self.grave.push(obl),
                }
            }
        }

        self.obligations[idx] = retained;
        log::trace!(target: targets::OBLIGATIONS, "Migrated {moved} obligations from {idx}");
        moved
    }

    /// Prints the repetition marker for an emptied delta layer.
    pub(crate) fn report_repetition(&self, layer: usize, by: &str) {
        if self.config.obl_survive.value < 2 {
            println!("UNSAT: repetition detected!");
        } else {
            println!("UNRESOLVED: repetition detected under incomplete setup!");
        }
        println!("Delta-layer {layer} emptied by {by}!");
    }
}
