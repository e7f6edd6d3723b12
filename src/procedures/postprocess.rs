/*!
Plan extraction and postprocessing.

A discharged obligation chain is unwound into a plan, optionally compacted
by action elimination (Nakhost & Müller 2010), recorded on the context, and
written to the solution file: one `i:   (action)` line per step. In reverse
mode the chain describes a regression, so the file lists it back to front.
*/

use std::{io::Write, rc::Rc, time::Instant};

use crate::{
    context::{Obligation, SolveContext},
    misc::log::targets,
};

impl SolveContext {
    /// Unwinds `terminal` into a plan, postprocesses per configuration,
    /// records it, and writes the solution file if one is configured.
    ///
    /// A file system failure is reported and the run carries on --- the plan
    /// is kept on the context either way.
    pub(crate) fn emit_solution(&mut self, terminal: &Rc<Obligation>) {
        let mut plan = Vec::new();
        let mut cursor = terminal.clone();
        while let Some(parent) = cursor.parent.clone() {
            if let Some(action) = cursor.action {
                plan.push(action);
            }
            cursor = parent;
        }
        plan.reverse();

        if self.config.postprocess.value {
            let clock = Instant::now();
            plan = self.eliminate_actions(plan);
            self.counters.time_postprocessing += clock.elapsed();
            println!("Reduced to {} actions.", plan.len());
        }

        if let Some(path) = self.solution_path.clone() {
            match std::fs::File::create(&path) {
                Ok(mut file) => {
                    if let Err(error) = self.write_plan(&plan, &mut file) {
                        println!("{error}");
                    }
                }
                Err(error) => println!("{error}"),
            }
        }

        self.last_plan = Some(plan);
    }

    /// Writes the plan, one numbered action per line, forward order.
    pub fn write_plan(&self, plan: &[usize], out: &mut impl Write) -> std::io::Result<()> {
        for i in 0..plan.len() {
            let step = match self.model.reverse {
                false => i,
                true => plan.len() - 1 - i,
            };
            let action = &self.model.actions[plan[step]];
            writeln!(out, "{}:   ({})", i, action.name)?;
        }
        Ok(())
    }

    /// Action elimination: drop `a_i` --- and whatever becomes inapplicable
    /// downstream --- whenever the rest of the plan still reaches the target.
    ///
    /// Each round either commits a strictly shorter plan or advances, so
    /// the pass terminates with a plan no longer than its input, and a
    /// second application changes nothing.
    pub fn eliminate_actions(&mut self, plan: Vec<usize>) -> Vec<usize> {
        let mut plan: Vec<(usize, usize)> = plan.into_iter().map(|action| (action, 0)).collect();

        let mut state = self.model.start.clone();
        let mut i = 0;

        while i < plan.len() {
            let round = i + 1;
            plan[i].1 = round;

            // Run the tail with a_i skipped, marking casualties.
            let mut probe = state.clone();
            for j in i + 1..plan.len() {
                let action = &self.model.actions[plan[j].0];
                if action.applicable_in(&probe) {
                    action.apply_to(&mut probe);
                } else {
                    plan[j].1 = round;
                }
            }

            if self.layers.is_layer_state(0, &probe) {
                // Target still reached: commit, removing everything marked.
                let mut keep = i;
                for j in i + 1..plan.len() {
                    if plan[j].1 != round {
                        plan[keep] = plan[j];
                        keep += 1;
                    }
                }
                plan.truncate(keep);
                log::trace!(target: targets::POSTPROCESS,
                    "Eliminated down to {} actions", plan.len());
            } else {
                let action = &self.model.actions[plan[i].0];
                action.apply_to(&mut state);
                i += 1;
            }
        }

        plan.into_iter().map(|(action, _)| action).collect()
    }
}
