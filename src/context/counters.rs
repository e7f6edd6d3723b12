use std::time::Duration;

/// Counts for various things which count, and per-kind timing.
///
/// The obligation and timing counts are reset after each phase report; the
/// layer store is the source of truth for kept clauses.
pub struct Counters {
    /// Obligations popped from the queues.
    pub oblig_processed: usize,

    /// Obligations extended to a child one layer down.
    pub oblig_extended: usize,

    /// Obligations extended sideways (same layer).
    pub oblig_sidestepped: usize,

    /// Obligations blocked with a derived clause.
    pub oblig_blocked: usize,

    /// Obligations migrated forward by a subsuming clause.
    pub oblig_subsumed: usize,

    /// Obligations moved to the grave by a subsuming clause.
    pub oblig_killed: usize,

    /// Blocking clauses derived.
    pub cla_derived: usize,

    /// Layer clauses expelled by subsumption.
    pub cla_subsumed: usize,

    /// Clauses found inductive and pushed a layer up.
    pub cla_pushed: usize,

    /// Minimization calls.
    pub minim_attempted: usize,

    /// Literals removed by minimization.
    pub minim_litkilled: usize,

    /// Time spent in successful extension calls.
    pub time_extend_sat: Duration,

    /// Time spent in blocked extension calls.
    pub time_extend_uns: Duration,

    /// Time spent pushing clauses between phases.
    pub time_pushing: Duration,

    /// Time spent postprocessing a plan.
    pub time_postprocessing: Duration,
}

impl Default for Counters {
    fn default() -> Self {
        Counters {
            oblig_processed: 0,
            oblig_extended: 0,
            oblig_sidestepped: 0,
            oblig_blocked: 0,
            oblig_subsumed: 0,
            oblig_killed: 0,

            cla_derived: 0,
            cla_subsumed: 0,
            cla_pushed: 0,

            minim_attempted: 0,
            minim_litkilled: 0,

            time_extend_sat: Duration::ZERO,
            time_extend_uns: Duration::ZERO,
            time_pushing: Duration::ZERO,
            time_postprocessing: Duration::ZERO,
        }
    }
}
