/*!
The extension oracle.

Given a layer index *k* and a state which fails some clause of `delta[k]`,
[extend](crate::context::SolveContext::extend) decides one of:

- **Extend**: some action applies and its successor satisfies everything
  known at layer *k* (`delta[k] ∪ deriv[k] ∪ invariant`).
- **Sidestep** (with `resched == 2`): no extension exists, but some action's
  successor strictly reduces the number of false `delta[k]` clauses while
  still belonging to layer *k* + 1.
- **Block**: no action helps; a generalized blocking clause is derived which
  is false in the state and --- one reason per action --- cannot be escaped at
  this bound.

Reasons are collected per action into [ReasonBuffer]s: for a failed
precondition the single literal, for a clause the action fails to
re-satisfy its literals preserved false by the action. A failed
precondition shadows the clauses it already falsifies, so only the cheaper
reason is kept. Actions whose successor re-satisfies no false clause are
*boring* --- the virtual NOOP buffer, holding all currently false clauses,
speaks for them.

The blocking clause is the union of one reason per action, assembled from
small buffers first, greedily picking the reason which adds fewest fresh
atoms. Minimization then deletes literals in random order as long as every
buffer keeps a represented reason; at level ≥ 2 an action whose adds miss
the clause is discharged by the inductive argument once no target literal
remains.

After every blocked call the layer's action ordering is stably re-sorted by
the number of reasons each action contributed (fewer first); a successful
action moves to the front of the ordering.
*/

use rand::seq::SliceRandom;

use crate::{
    context::SolveContext,
    db::layers::prune_invalid,
    misc::log::targets,
    structures::{atom::Atom, clause::CClause, clause::Clause, state::State},
};

/// The outcome of an extension query.
pub(crate) enum Extension {
    /// The action yields a successor inside the queried layer.
    Extend(usize),

    /// The action reduces the count of false clauses (stays in the layer
    /// above).
    Sidestep(usize),

    /// No extension: a generalized blocking clause.
    Block(CClause),
}

/// Reasons one action contributes against a state, stored as a packed
/// stream of literal runs.
pub(crate) struct ReasonBuffer {
    /// The action the reasons belong to; `None` for the virtual NOOP.
    pub action: Option<usize>,

    lens: Vec<u32>,
    lits: Vec<Atom>,
}

impl ReasonBuffer {
    fn new() -> Self {
        ReasonBuffer {
            action: None,
            lens: Vec::new(),
            lits: Vec::new(),
        }
    }

    fn clear(&mut self, action: Option<usize>) {
        self.action = action;
        self.lens.clear();
        self.lits.clear();
    }

    fn push_reason<I: IntoIterator<Item = Atom>>(&mut self, lits: I) {
        let start = self.lits.len();
        self.lits.extend(lits);
        self.lens.push((self.lits.len() - start) as u32);
    }

    /// The number of reasons recorded.
    pub fn count(&self) -> usize {
        self.lens.len()
    }

    /// The reasons, as literal slices.
    pub fn reasons(&self) -> impl Iterator<Item = &[Atom]> + '_ {
        let mut offset = 0;
        self.lens.iter().map(move |len| {
            let slice = &self.lits[offset..offset + *len as usize];
            offset += *len as usize;
            slice
        })
    }
}

/// Scratch space for the oracle, allocated once per context.
pub(crate) struct ExtendScratch {
    /// One buffer per action, plus the NOOP.
    buffers: Vec<ReasonBuffer>,

    /// Buffers in use for the current query.
    used: usize,

    /// Order in which buffers contribute to the union.
    buffer_ord: Vec<usize>,

    /// Mask of the current action's failed preconditions.
    false_precond: State,

    /// The successor state under construction.
    working: State,

    /// The union of picked reasons --- the blocking clause as a mask.
    union: State,

    /// Literal order for minimization.
    lit_ord: Vec<Atom>,

    /// Indices into `delta[k]` of the clauses false in the queried state.
    false_clauses: Vec<usize>,

    /// Per-action score: reasons contributed by the last blocked call.
    scores: Vec<i32>,

    /// Per-action flag: re-satisfied some false clause in the last call.
    interesting: Vec<bool>,

    /// Loading spot for invariant clauses.
    inv_clause: CClause,
}

impl ExtendScratch {
    pub fn new(atom_count: usize, action_count: usize) -> Self {
        ExtendScratch {
            buffers: (0..action_count + 1).map(|_| ReasonBuffer::new()).collect(),
            used: 0,
            buffer_ord: Vec::new(),
            false_precond: State::filled(atom_count, false),
            working: State::filled(atom_count, false),
            union: State::filled(atom_count, false),
            lit_ord: Vec::new(),
            false_clauses: Vec::new(),
            scores: vec![0; action_count],
            interesting: vec![false; action_count],
            inv_clause: Vec::new(),
        }
    }
}

impl SolveContext {
    /// Extends `state` into layer `layer_idx`, or blocks it.
    pub(crate) fn extend(&mut self, layer_idx: usize, state: &State) -> Extension {
        self.scratch.false_clauses.clear();
        for (i, boxed) in self.layers.delta[layer_idx].iter().enumerate() {
            if !boxed.data.satisfied_on(state) {
                self.scratch.false_clauses.push(i);
            }
        }
        // Otherwise the state would already sit in the queried layer; false
        // clauses never come from deriv or the invariant, which held when
        // the state was admitted one layer up.
        assert!(
            !self.scratch.false_clauses.is_empty(),
            "extend called on a state of its own layer"
        );

        let action_count = self.model.actions.len();
        let resched = self.config.resched.value;
        let quick_reason = self.config.quick_reason.value;

        let mut best_action: Option<usize> = None;
        let mut best_false_after = self.scratch.false_clauses.len() as i32;

        self.scratch.false_precond.fill(false);
        self.scratch.used = 0;

        for ord_pos in 0..action_count {
            let action_idx = self.action_ords[layer_idx][ord_pos];
            let action = &self.model.actions[action_idx];

            let mut plausible = true;
            let mut interesting = false;
            self.scratch.interesting[action_idx] = false;

            let mut failed_precond = false;
            let mut false_after: i32 = 0;

            let buffer_idx = self.scratch.used;
            self.scratch.used += 1;
            self.scratch.buffers[buffer_idx].clear(Some(action_idx));

            self.scratch.working.clone_from(state);

            // A useless action adds nothing the state lacks, and so cannot
            // leave it.
            let mut useless = true;
            for add in &action.add {
                self.scratch.working.set(*add);
                if !state.value_of(*add) {
                    useless = false;
                }
            }
            if useless {
                self.scratch.used -= 1;
                self.scratch.scores[action_idx] = i32::MAX;
                continue;
            }

            for pre in &action.pre {
                if !state.value_of(*pre) {
                    plausible = false;
                    failed_precond = true;
                    self.scratch.buffers[buffer_idx].push_reason([*pre]);
                    self.scratch.false_precond.set(*pre);
                }
            }

            for del in &action.del {
                self.scratch.working.clear(*del);
            }

            // The false clauses first: an action re-satisfying none of them
            // is boring and its reasons are covered by the NOOP's.
            {
                let mut failed_cnt = 0usize;
                for fc in &self.scratch.false_clauses {
                    let cl = &self.layers.delta[layer_idx][*fc].data;
                    if cl.satisfied_on(&self.scratch.working) {
                        continue;
                    }
                    failed_cnt += 1;

                    if cl.satisfied_on(&self.scratch.false_precond) {
                        // A failed precondition is the cheaper reason.
                        debug_assert!(!plausible);
                        continue;
                    }

                    plausible = false;
                    false_after += 1;
                    self.scratch.buffers[buffer_idx].push_reason(cl.iter().copied());
                }

                if failed_cnt < self.scratch.false_clauses.len() {
                    interesting = true;
                    self.scratch.interesting[action_idx] = true;
                } else {
                    // Release the buffer; the slot is reused by the next
                    // action, though the score below still reads its count.
                    self.scratch.used -= 1;
                }
            }

            self.scratch.scores[action_idx] = if plausible {
                // If the score is ever consulted, the action broke a clause
                // below and can never apply in this context.
                i32::MAX
            } else {
                self.scratch.buffers[buffer_idx].count() as i32
            };

            let mut can_do_side =
                resched == 2 && !failed_precond && false_after < best_false_after;
            let mut just_because_side = false;

            let full_scan = if plausible
                || quick_reason == 0
                || (interesting && quick_reason == 2)
            {
                true
            } else if can_do_side {
                just_because_side = true;
                true
            } else {
                false
            };

            if full_scan {
                prune_invalid(&mut self.layers.deriv[layer_idx], layer_idx);

                let delta_len = self.layers.delta[layer_idx].len();
                let deriv_len = self.layers.deriv[layer_idx].len();
                let inv_len = self.invariant.len();
                let mut false_pos = 0usize;

                'clause_scan: for i in 0..delta_len + deriv_len + inv_len {
                    let cl: &[Atom] = if i < delta_len {
                        if false_pos < self.scratch.false_clauses.len()
                            && i == self.scratch.false_clauses[false_pos]
                        {
                            false_pos += 1;
                            continue 'clause_scan; // handled above
                        }
                        &self.layers.delta[layer_idx][i].data
                    } else if i - delta_len < deriv_len {
                        &self.layers.deriv[layer_idx][i - delta_len].data
                    } else {
                        self.invariant
                            .load_into(i - delta_len - deriv_len, &mut self.scratch.inv_clause);
                        &self.scratch.inv_clause
                    };

                    if cl.satisfied_on(&self.scratch.working) {
                        continue;
                    }

                    can_do_side = false;
                    if just_because_side {
                        break 'clause_scan;
                    }

                    if cl.satisfied_on(&self.scratch.false_precond) {
                        debug_assert!(!plausible);
                        continue;
                    }

                    plausible = false;

                    // Only literals preserved false by the action can be
                    // part of the reason; the rest it deleted itself.
                    let preserved = cl.iter().copied().filter(|lit| !state.value_of(*lit));
                    self.scratch.buffers[buffer_idx].push_reason(preserved);
                }
            }

            if plausible {
                log::trace!(target: targets::EXTEND,
                    "Extend at {layer_idx} by action {action_idx}");

                // Recency heuristic: the winner moves to the front.
                let ord = &mut self.action_ords[layer_idx];
                for i in (1..=ord_pos).rev() {
                    ord[i] = ord[i - 1];
                }
                ord[0] = action_idx;

                return Extension::Extend(action_idx);
            }

            if can_do_side && self.layers.is_layer_state(layer_idx + 1, &self.scratch.working) {
                // deriv lists are subsumption reduced, so the successor may
                // still fail a clause of the parent's layer; hence the
                // explicit membership test.
                best_false_after = false_after;
                best_action = Some(action_idx);
            }

            for pre in &self.model.actions[action_idx].pre {
                self.scratch.false_precond.clear(*pre);
            }
        }

        if resched == 2 {
            if let Some(action_idx) = best_action {
                log::trace!(target: targets::EXTEND,
                    "Sidestep at {layer_idx} by action {action_idx} ({best_false_after} false)");
                return Extension::Sidestep(action_idx);
            }
        }

        // The NOOP's contribution: every clause already false in the state.
        {
            let buffer_idx = self.scratch.used;
            self.scratch.used += 1;
            self.scratch.buffers[buffer_idx].clear(None);
            for fc in &self.scratch.false_clauses {
                let cl = &self.layers.delta[layer_idx][*fc].data;
                self.scratch.buffers[buffer_idx].push_reason(cl.iter().copied());
            }
        }

        // Fewer reasons first next time.
        {
            let scores = &self.scratch.scores;
            self.action_ords[layer_idx].sort_by_key(|action| scores[*action]);
        }

        // Union one reason per action, small buffers first, each time the
        // reason adding the fewest fresh atoms.
        self.scratch.union.fill(false);

        let used = self.scratch.used;
        self.scratch.buffer_ord.clear();
        self.scratch.buffer_ord.extend(0..used);
        self.scratch.buffer_ord.shuffle(&mut self.rng);
        {
            let buffers = &self.scratch.buffers;
            self.scratch
                .buffer_ord
                .sort_by_key(|buffer| buffers[*buffer].count());
        }

        for ord_pos in 0..used {
            let buffer = &self.scratch.buffers[self.scratch.buffer_ord[ord_pos]];
            debug_assert!(buffer.count() > 0);

            let mut best_adds = usize::MAX;
            let mut best: Option<&[Atom]> = None;
            for reason in buffer.reasons() {
                let adds = reason
                    .iter()
                    .filter(|lit| !self.scratch.union.value_of(**lit))
                    .count();
                if adds < best_adds {
                    best_adds = adds;
                    best = Some(reason);
                    if adds == 0 {
                        break;
                    }
                }
            }

            if let Some(reason) = best {
                for lit in reason {
                    self.scratch.union.set(*lit);
                }
            }
        }

        if self.config.minimize.value > 0 {
            self.minimize_reason();
        }

        let clause: CClause = self.scratch.union.true_atoms().collect();
        log::trace!(target: targets::EXTEND, "Blocked at {layer_idx} with {clause:?}");
        Extension::Block(clause)
    }

    /// Greedily deletes literals from the reason union while every buffer
    /// keeps a represented reason.
    fn minimize_reason(&mut self) {
        self.counters.minim_attempted += 1;

        let minimize = self.config.minimize.value;
        let atom_count = self.model.atom_count;

        self.scratch.lit_ord.clear();
        self.scratch.lit_ord.extend(0..atom_count as Atom);
        self.scratch.lit_ord.shuffle(&mut self.rng);

        let mut goal_remaining: i64 = 0;
        if minimize > 1 {
            for atom in 0..atom_count as Atom {
                if self.goal_mask.value_of(atom) && self.scratch.union.value_of(atom) {
                    goal_remaining += 1;
                }
            }
        }

        loop {
            let mut removed_something = false;

            for lit_pos in 0..self.scratch.lit_ord.len() {
                let lit = self.scratch.lit_ord[lit_pos];
                if !self.scratch.union.value_of(lit) {
                    continue;
                }

                self.scratch.union.clear(lit);
                if self.goal_mask.value_of(lit) {
                    goal_remaining -= 1;
                }

                let mut keep = false;

                'buffers: for ord_pos in 0..self.scratch.used {
                    let buffer = &self.scratch.buffers[self.scratch.buffer_ord[ord_pos]];

                    if goal_remaining > 0 {
                        // The clause still demands a target literal, so it
                        // may be kept blocked inductively: an action whose
                        // adds miss the clause cannot re-satisfy it.
                        debug_assert!(minimize > 1);
                        match buffer.action {
                            Some(action_idx) => {
                                let hits = self.model.actions[action_idx]
                                    .add
                                    .iter()
                                    .any(|add| self.scratch.union.value_of(*add));
                                if !hits {
                                    continue 'buffers;
                                }
                            }
                            None => {
                                // The NOOP preserves everything, but speaks
                                // for the boring actions; try them now.
                                let mut hits = false;
                                for (idx, action) in self.model.actions.iter().enumerate() {
                                    if self.scratch.interesting[idx] {
                                        continue;
                                    }
                                    if action
                                        .add
                                        .iter()
                                        .any(|add| self.scratch.union.value_of(*add))
                                    {
                                        hits = true;
                                        break;
                                    }
                                }
                                if !hits {
                                    continue 'buffers;
                                }
                            }
                        }
                    }

                    for reason in buffer.reasons() {
                        if reason.iter().all(|l| self.scratch.union.value_of(*l)) {
                            continue 'buffers;
                        }
                    }

                    // No reason survives without the literal.
                    keep = true;
                    break 'buffers;
                }

                if keep {
                    self.scratch.union.set(lit);
                    if self.goal_mask.value_of(lit) {
                        goal_remaining += 1;
                    }
                } else {
                    removed_something = true;
                    self.counters.minim_litkilled += 1;
                }
            }

            if !(minimize > 2 && removed_something) {
                break;
            }
        }
    }

    /// The push test: does any action lead from `state` into layer
    /// `layer_idx`?
    ///
    /// `state` is the negation-as-state of a clause under pushing --- exactly
    /// the clause's atoms false. If no action yields a successor satisfying
    /// `delta ∪ deriv ∪ invariant` at the layer, the clause is inductive
    /// relative to it.
    pub(crate) fn has_layer_successor(&mut self, layer_idx: usize, state: &State) -> bool {
        prune_invalid(&mut self.layers.deriv[layer_idx], layer_idx);

        'actions: for action in &self.model.actions {
            let mut useless = true;
            for add in &action.add {
                if !state.value_of(*add) {
                    useless = false;
                    break;
                }
            }
            if useless {
                continue;
            }

            for pre in &action.pre {
                if !state.value_of(*pre) {
                    continue 'actions;
                }
            }

            self.scratch.working.clone_from(state);
            for add in &action.add {
                self.scratch.working.set(*add);
            }
            for del in &action.del {
                self.scratch.working.clear(*del);
            }

            for boxed in &self.layers.delta[layer_idx] {
                if !boxed.data.satisfied_on(&self.scratch.working) {
                    continue 'actions;
                }
            }
            for boxed in &self.layers.deriv[layer_idx] {
                if !boxed.data.satisfied_on(&self.scratch.working) {
                    continue 'actions;
                }
            }
            for bin in self.invariant.iter() {
                if !self.scratch.working.value_of(bin.l1)
                    && !self.scratch.working.value_of(bin.l2)
                {
                    continue 'actions;
                }
            }

            return true;
        }

        false
    }
}
