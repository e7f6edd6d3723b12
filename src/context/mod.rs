/*!
The solving context --- the owner of everything a PDR run mutates.

A context is built from a [Model] and a [Config], and owns the layer store,
the per-layer obligation queues (and the grave), the per-layer action
orderings, the packed invariant, the extension scratch space, counters, and
the seeded source of randomness. The [solve](SolveContext::solve) procedure
and its parts are implemented across [procedures](crate::procedures).
*/

mod counters;
pub use counters::Counters;

use std::{
    collections::VecDeque,
    path::PathBuf,
    rc::Rc,
    sync::{atomic::AtomicBool, Arc},
};

use rand::SeedableRng;

use crate::{
    config::Config,
    db::LayerDB,
    generic::pcg::Pcg32,
    invariant::InvariantSet,
    procedures::extend::ExtendScratch,
    structures::{problem::Model, state::State},
};

/// A proof obligation: the claim that `state` still has to be shown unable
/// to reach the target within its current layer's bound.
///
/// Obligations form chains through their parents; when one is discharged at
/// layer 0 the chain is the plan. Parents are kept alive by [Rc] --- also
/// from the grave, where retired obligations wait because a live descendant
/// may still need them for plan reconstruction.
pub struct Obligation {
    /// Actions applied since the root obligation.
    pub depth: usize,

    /// The state to extend or block.
    pub state: State,

    /// The obligation this one was extended from.
    pub parent: Option<Rc<Obligation>>,

    /// The action which produced `state` from the parent's state.
    pub action: Option<usize>,
}

/// A per-layer queue of obligations.
pub type Obligations = VecDeque<Rc<Obligation>>;

/// The solving context.
pub struct SolveContext {
    /// The configuration of the run.
    pub config: Config,

    /// Counters related to the run.
    pub counters: Counters,

    /// The problem as seen in the configured direction.
    pub model: Model,

    /// The binary invariant, empty unless generated.
    pub invariant: InvariantSet,

    /// The layer store.
    pub layers: LayerDB,

    /// Obligation queues, indexed by the layer the obligation targets.
    pub obligations: Vec<Obligations>,

    /// Retired obligations kept alive for plan reconstruction.
    pub grave: Vec<Rc<Obligation>>,

    /// The current phase; the PDR frontier is layer `phase`.
    pub phase: usize,

    /// Per-layer action orderings, updated by extension outcomes.
    pub(crate) action_ords: Vec<Vec<usize>>,

    /// Mask of the target atoms, used by inductive minimization.
    pub(crate) goal_mask: State,

    /// The weakest layer an obligation reached this phase (statistics).
    pub(crate) path_min_layer: usize,

    /// The weakest layer clause insertion touched; pushing starts here.
    pub(crate) least_affected_layer: usize,

    /// Scratch space for the extension oracle.
    pub(crate) scratch: ExtendScratch,

    /// The source of randomness, seeded from the configuration.
    pub rng: Pcg32,

    /// Set from outside to abandon the run.
    pub interrupt: Option<Arc<AtomicBool>>,

    /// Where to write a discovered plan, if anywhere.
    pub solution_path: Option<PathBuf>,

    /// The most recent plan, in model orientation, as action indices.
    pub last_plan: Option<Vec<usize>>,

    /// Started when the solve begins; drives the overall timing report.
    pub(crate) run_clock: Option<std::time::Instant>,
}

impl SolveContext {
    /// Creates a context for `model` under `config`.
    ///
    /// Layer 0 is seeded with the target units. The invariant starts empty;
    /// see [load_invariant](SolveContext::load_invariant).
    pub fn new(model: Model, config: Config) -> Self {
        let atom_count = model.atom_count;
        let action_count = model.actions.len();

        let layers = LayerDB::new(&model.target);

        let mut goal_mask = State::filled(atom_count, false);
        if config.minimize.value > 1 {
            for atom in &model.target {
                goal_mask.set(*atom);
            }
        }

        let rng = Pcg32::from_seed(config.random_seed.value.to_le_bytes());

        SolveContext {
            counters: Counters::default(),
            invariant: InvariantSet::default(),
            layers,
            obligations: Vec::new(),
            grave: Vec::new(),
            phase: 0,
            action_ords: Vec::new(),
            goal_mask,
            path_min_layer: 1,
            least_affected_layer: 1,
            scratch: ExtendScratch::new(atom_count, action_count),
            rng,
            interrupt: None,
            solution_path: None,
            last_plan: None,
            run_clock: None,
            model,
            config,
        }
    }

    /// Installs a generated invariant; immutable for the rest of the run.
    pub fn load_invariant(&mut self, invariant: InvariantSet) {
        self.invariant = invariant;
    }

    /// True iff the external interrupt flag has been raised.
    pub(crate) fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(std::sync::atomic::Ordering::Relaxed))
    }
}
