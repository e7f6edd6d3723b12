/*!
Configuration of a solve.

All configuration for a solve is contained within a [Config], one
[ConfigOption] per switch. Levelled switches keep the numeric levels of the
engine's literature presentation (e.g. `minimize` 0–3) rather than splitting
into several booleans, so a configuration is a flat record of small numbers.

Some combinations are unsound and are rejected by [Config::check]:
sidestepping (`resched == 2`) needs stack-ordered obligations, and keeping
obligations across phases (`obl_survive > 0`) needs obligation subsumption so
that surviving obligations are migrated when their layer strengthens.
*/

mod config_option;
pub use config_option::ConfigOption;

use crate::types::err::{ConfigError, ErrorKind};

/// The primary configuration structure.
#[derive(Clone)]
pub struct Config {
    /// Search by regression from the goal: preconditions and deletes are
    /// exchanged and the roles of initial state and goal swap.
    pub reverse: ConfigOption<bool>,

    /// Derive the binary backward invariant before solving.
    pub gen_invariant: ConfigOption<bool>,

    /// Reason-clause minimization level.
    ///
    /// 0 none, 1 greedy literal deletion, 2 additionally the inductive
    /// argument once no goal literal remains, 3 iterates level 2 to a
    /// fixpoint.
    pub minimize: ConfigOption<u8>,

    /// What happens to a blocked obligation.
    ///
    /// 0 drop it, 1 reschedule it one layer up, 2 additionally permit
    /// sidestepping extensions.
    pub resched: ConfigOption<u8>,

    /// Retain obligations across phase boundaries. Level 2 keeps parents in
    /// the grave and is known to lose completeness.
    pub obl_survive: ConfigOption<u8>,

    /// Cross-obligation subsumption: obligations falsified by a fresh
    /// blocking clause are migrated forward (1) or, at the frontier, moved
    /// to the grave (2).
    pub obl_subsumption: ConfigOption<u8>,

    /// Clause subsumption depth on insertion. Level 2 additionally runs
    /// clause pushing between phases.
    pub cla_subsumption: ConfigOption<u8>,

    /// Short-circuit the full clause scan for actions already blocked by a
    /// failed precondition. 0 off, 1 on, 2 only for interesting actions.
    pub quick_reason: ConfigOption<u8>,

    /// Treat per-layer obligation queues as stacks rather than FIFO.
    pub oblig_prior_stack: ConfigOption<bool>,

    /// Cap on the number of phases; the default is no cap.
    pub phaselim: ConfigOption<usize>,

    /// Progress printing: 0 quiet, 1 per-phase statistics, 2 path-depth dots.
    pub pphase: ConfigOption<u8>,

    /// Run action elimination on a discovered plan.
    pub postprocess: ConfigOption<bool>,

    /// Seed for the engine's pseudorandom permutations.
    pub random_seed: ConfigOption<u64>,

    /// Emit the `dummy` predicate in grounded dumps, keeping initial states
    /// non-empty for third-party consumers.
    pub dump_dummy: ConfigOption<bool>,
}

impl Default for Config {
    /// The default configuration enables the complete feature set:
    /// invariant generation, inductive minimization, sidestepping, obligation
    /// survival with subsumption, and clause pushing.
    fn default() -> Self {
        Config {
            reverse: ConfigOption {
                name: "reverse",
                min: false,
                max: true,
                value: false,
            },

            gen_invariant: ConfigOption {
                name: "gen_invariant",
                min: false,
                max: true,
                value: true,
            },

            minimize: ConfigOption {
                name: "minimize",
                min: 0,
                max: 3,
                value: 2,
            },

            resched: ConfigOption {
                name: "resched",
                min: 0,
                max: 2,
                value: 2,
            },

            obl_survive: ConfigOption {
                name: "obl_survive",
                min: 0,
                max: 2,
                value: 1,
            },

            obl_subsumption: ConfigOption {
                name: "obl_subsumption",
                min: 0,
                max: 2,
                value: 1,
            },

            cla_subsumption: ConfigOption {
                name: "cla_subsumption",
                min: 0,
                max: 2,
                value: 2,
            },

            quick_reason: ConfigOption {
                name: "quick_reason",
                min: 0,
                max: 2,
                value: 1,
            },

            oblig_prior_stack: ConfigOption {
                name: "oblig_prior_stack",
                min: false,
                max: true,
                value: true,
            },

            phaselim: ConfigOption {
                name: "phaselim",
                min: 0,
                max: usize::MAX,
                value: usize::MAX,
            },

            pphase: ConfigOption {
                name: "pphase",
                min: 0,
                max: 2,
                value: 1,
            },

            postprocess: ConfigOption {
                name: "postprocess",
                min: false,
                max: true,
                value: true,
            },

            random_seed: ConfigOption {
                name: "random_seed",
                min: 0,
                max: u64::MAX,
                value: 0,
            },

            dump_dummy: ConfigOption {
                name: "dump_dummy",
                min: false,
                max: true,
                value: true,
            },
        }
    }
}

impl Config {
    /// Rejects switch combinations the engine does not support.
    pub fn check(&self) -> Result<(), ErrorKind> {
        if self.resched.value == 2 && !self.oblig_prior_stack.value {
            // A queued obligation may sidestep to the same successor each
            // time it is revisited, starving its descendants.
            return Err(ConfigError::SidestepNeedsStack.into());
        }
        if self.obl_survive.value > 0 && self.obl_subsumption.value == 0 {
            return Err(ConfigError::SurvivalNeedsSubsumption.into());
        }
        Ok(())
    }
}
