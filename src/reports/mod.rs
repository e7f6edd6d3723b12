/*!
Reports regarding a run, and the statistics printer.

The textual termination markers (`SAT: …`, `UNSAT: …`, `UNRESOLVED: …`) are
printed where the outcome is detected; the [Report] value carries the same
outcome to callers. Statistics go to standard output between phases (under
`pphase == 1`) and once at the end of the run.
*/

use crate::{context::SolveContext, db::layers::prune_invalid};

/// High-level report regarding a run.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Report {
    /// A plan of the noted length was found.
    PlanFound(usize),

    /// The start state already satisfies the target condition.
    Trivial,

    /// The layer sequence stabilised: no plan exists.
    Unsatisfiable,

    /// Terminated without an answer --- phase limit, or stabilisation under a
    /// configuration known to lose completeness.
    Unresolved,

    /// The run was interrupted from outside.
    Interrupted,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlanFound(length) => write!(f, "plan of length {length}"),
            Self::Trivial => write!(f, "trivial"),
            Self::Unsatisfiable => write!(f, "unsatisfiable"),
            Self::Unresolved => write!(f, "unresolved"),
            Self::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl SolveContext {
    /// Prints the per-phase statistics blocks and resets the phase-local
    /// counters.
    pub fn print_stats(&mut self, between_phases: bool) {
        // Obligations.
        println!();
        println!("Obligations:");
        println!("\t{} processed,", self.counters.oblig_processed);
        println!("\t{} extended,", self.counters.oblig_extended);
        println!("\t{} sidestepped,", self.counters.oblig_sidestepped);
        println!("\t{} blocked,", self.counters.oblig_blocked);
        if self.config.obl_subsumption.value == 2 {
            println!(
                "\t{} subsumed ({} extra killed).",
                self.counters.oblig_subsumed, self.counters.oblig_killed
            );
        } else {
            println!("\t{} subsumed.", self.counters.oblig_subsumed);
        }
        if self.config.obl_survive.value == 2 || self.config.obl_subsumption.value == 2 {
            println!();
            println!("\t{} obligations in the grave.", self.grave.len());
        }

        self.counters.oblig_subsumed = 0;
        self.counters.oblig_killed = 0;

        // Clauses.
        let mut cla_kept = 0usize;
        let mut cla_lensum = 0usize;
        for layer in self.layers.delta.iter().skip(1) {
            for boxed in layer {
                cla_kept += 1;
                cla_lensum += boxed.data.len();
            }
        }

        println!();
        println!("Clauses:");
        println!("\t{} derived,", self.counters.cla_derived);
        println!("\t{} subsumed,", self.counters.cla_subsumed);
        println!("\t{} pushed,", self.counters.cla_pushed);
        println!(
            "\t{} kept (average size {:.6} lits ).",
            cla_kept,
            cla_lensum as f64 / cla_kept as f64
        );

        self.counters.cla_derived = 0;
        self.counters.cla_subsumed = 0;
        self.counters.cla_pushed = 0;

        // Minimization.
        if self.config.minimize.value > 0 {
            println!();
            println!(
                "Minimization success rate: {:.6} lits per attempt.",
                self.counters.minim_litkilled as f64 / self.counters.minim_attempted as f64
            );
            self.counters.minim_attempted = 0;
            self.counters.minim_litkilled = 0;
        }

        // Layers.
        println!();
        print!("Layers: ");
        debug_assert_eq!(self.layers.delta.len(), self.layers.deriv.len());
        let layer_count = self.layers.delta.len();
        for idx in 0..layer_count {
            let lensum: usize = self.layers.delta[idx]
                .iter()
                .map(|boxed| boxed.data.len())
                .sum();

            prune_invalid(&mut self.layers.deriv[idx], idx);
            print!(
                "{}+{}",
                self.layers.delta[idx].len(),
                self.layers.deriv[idx].len()
            );

            if self.layers.delta[idx].is_empty() {
                print!(" s-");
            } else {
                print!(" s{}", lensum / self.layers.delta[idx].len());
            }

            if idx < layer_count - 1 {
                print!(" | ");
            } else {
                println!();
            }
        }

        // Timing.
        let sat = self.counters.time_extend_sat.as_secs_f64();
        let uns = self.counters.time_extend_uns.as_secs_f64();
        println!();
        println!("Timing:");
        println!(
            "\t{:.6}s spent extending ({:.6} calls per second),",
            sat + uns,
            self.counters.oblig_processed as f64 / (sat + uns)
        );
        println!(
            "\t{:.6}s SAT ({:.6} calls per second),",
            sat,
            (self.counters.oblig_extended + self.counters.oblig_sidestepped) as f64 / sat
        );
        println!(
            "\t{:.6}s UNS ({:.6} calls per second),",
            uns,
            self.counters.oblig_blocked as f64 / uns
        );
        println!(
            "\t{:.6}s spent pushing.",
            self.counters.time_pushing.as_secs_f64()
        );
        if self.config.postprocess.value && !between_phases {
            println!(
                "\t{:.6}s spent postprocessing the plan.",
                self.counters.time_postprocessing.as_secs_f64()
            );
        }

        self.counters.time_extend_sat = std::time::Duration::ZERO;
        self.counters.time_extend_uns = std::time::Duration::ZERO;
        self.counters.time_pushing = std::time::Duration::ZERO;
        self.counters.oblig_processed = 0;
        self.counters.oblig_extended = 0;
        self.counters.oblig_sidestepped = 0;
        self.counters.oblig_blocked = 0;

        println!();
    }

    /// Prints the end-of-run statistics and overall timing.
    pub fn print_final_stats(&mut self) {
        if self.phase > 0 {
            println!();
            println!("Game over during phase {}", self.phase);
            self.print_stats(false);
        }

        let overall = self
            .run_clock
            .map(|clock| clock.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        println!();
        println!("PDR took: {overall:7.2} seconds overall.");
        println!();
    }
}
