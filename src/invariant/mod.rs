/*!
Derivation of the binary backward invariant.

# Contract

Given the target condition G of a [model](crate::structures::problem::Model),
derive a set I of positive clauses of arity ≤ 2 such that:

- every atom of G appears in I as a unit clause or strengthened form, and
- for every action a and clause c ∈ I with pre(a) ∩ c = ∅ and
  add(a) ∩ c ≠ ∅, some d ∈ I satisfies d ⊆ (c \ add(a)) ∪ del(a).

Informally: I is inductive under regression, restricted to unit and binary
clauses, and so holds in every state from which the target is reachable.
The solver uses I to strengthen every layer-membership test.

# Algorithm

Start from one unit per distinct target atom and iterate to a fixpoint: an
action which violates the condition for a clause c *weakens* c --- a binary is
removed, a unit {x} is replaced by all binaries {x, y} over atoms y which are
not already live units. The universe of candidates is finite and every step
removes or strictly weakens, so the fixpoint terminates; it is detected by a
full pass with no modification.

# Representation

Clause sides live in an arena of records linked into one doubly-linked list
per atom, so each atom indexes the clauses watching it and removal is O(1)
by index surgery (no intrusive pointers). Binaries link their two sides
through `peer`. Freed records are recycled through a free list --- a dying
unit over *n* atoms allocates up to 2(*n*−1) sides.

The fixpoint is consumed through a draining iterator ([Derivation]) and
packed into an [InvariantSet] for the solver.
*/

use crate::{
    misc::log::targets,
    structures::{
        atom::{Atom, NO_ATOM},
        clause::CClause,
        problem::Model,
        state::State,
    },
};

/// A unit-or-binary clause; `l1 == l2` encodes a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinClause {
    pub l1: Atom,
    pub l2: Atom,
}

impl BinClause {
    /// True iff the clause has one distinct atom.
    pub fn is_unit(&self) -> bool {
        self.l1 == self.l2
    }
}

/// A packed, immutable sequence of [BinClause]s.
///
/// Stored as flat atom pairs, so a clause index addresses two adjacent
/// entries and no per-clause allocation is made.
#[derive(Default)]
pub struct InvariantSet {
    data: Vec<Atom>,
}

impl InvariantSet {
    pub fn with_capacity(clauses: usize) -> Self {
        InvariantSet {
            data: Vec::with_capacity(clauses * 2),
        }
    }

    pub fn push(&mut self, clause: BinClause) {
        self.data.push(clause.l1);
        self.data.push(clause.l2);
    }

    /// The number of clauses in the set.
    pub fn len(&self) -> usize {
        self.data.len() >> 1
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, idx: usize) -> BinClause {
        BinClause {
            l1: self.data[idx * 2],
            l2: self.data[idx * 2 + 1],
        }
    }

    /// Writes clause `idx` into `clause`, unit clauses as one literal.
    pub fn load_into(&self, idx: usize, clause: &mut CClause) {
        clause.clear();
        let bc = self.get(idx);
        clause.push(bc.l1);
        if bc.l1 != bc.l2 {
            clause.push(bc.l2);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = BinClause> + '_ {
        (0..self.len()).map(|idx| self.get(idx))
    }

    /// True iff some clause of the set is false in `state`.
    pub fn falsified_on(&self, state: &State) -> bool {
        self.iter()
            .any(|bc| !state.value_of(bc.l1) && !state.value_of(bc.l2))
    }
}

const NIL: u32 = u32::MAX;

const FL_PRE: u8 = 1;
const FL_ADD: u8 = 2;
const FL_DEL: u8 = 4;

/// One side of a live clause, linked into the list of its home atom.
struct Record {
    /// The partner atom; equal to the home atom for a unit.
    other_lit: Atom,

    /// The arena index of the partner side, [NIL] for a unit.
    peer: u32,

    /// The home atom, needed to fix the list head on removal.
    home: Atom,

    prev: u32,
    next: u32,
}

struct Engine<'m> {
    model: &'m Model,

    arena: Vec<Record>,
    free: Vec<u32>,

    /// Head of the record list per atom.
    heads: Vec<u32>,

    /// Per-atom pre/add/del membership flags of the action under test.
    flags: Vec<u8>,

    /// Live clause count (sides counted once).
    count: usize,
}

/// The result of a derivation: a draining iterator over the fixpoint.
pub struct Derivation<'m> {
    engine: Engine<'m>,
    idx: usize,
}

/// Derives the binary invariant of `model`, seeded by its target condition.
pub fn derive(model: &Model) -> Derivation<'_> {
    let mut engine = Engine {
        model,
        arena: Vec::new(),
        free: Vec::new(),
        heads: vec![NIL; model.atom_count],
        flags: vec![0; model.atom_count],
        count: 0,
    };

    for atom in &model.target {
        // Insert each unit only once.
        if engine.heads[*atom as usize] == NIL {
            let rec = engine.alloc(*atom, *atom, NIL);
            engine.link(rec);
            engine.count += 1;
        }
    }

    engine.fixpoint();
    log::info!(target: targets::INVARIANT, "Fixpoint with {} clauses", engine.count);

    Derivation { engine, idx: 0 }
}

impl<'m> Engine<'m> {
    fn alloc(&mut self, home: Atom, other_lit: Atom, peer: u32) -> u32 {
        let record = Record {
            other_lit,
            peer,
            home,
            prev: NIL,
            next: NIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.arena[idx as usize] = record;
                idx
            }
            None => {
                self.arena.push(record);
                (self.arena.len() - 1) as u32
            }
        }
    }

    /// Links `idx` at the head of its home list.
    fn link(&mut self, idx: u32) {
        let home = self.arena[idx as usize].home as usize;
        let old_head = self.heads[home];
        self.arena[idx as usize].next = old_head;
        self.arena[idx as usize].prev = NIL;
        if old_head != NIL {
            self.arena[old_head as usize].prev = idx;
        }
        self.heads[home] = idx;
    }

    /// Unlinks `idx` from its home list and recycles the slot.
    fn unlink(&mut self, idx: u32) {
        let (home, prev, next) = {
            let rec = &self.arena[idx as usize];
            (rec.home as usize, rec.prev, rec.next)
        };
        match prev {
            NIL => self.heads[home] = next,
            _ => self.arena[prev as usize].next = next,
        }
        if next != NIL {
            self.arena[next as usize].prev = prev;
        }
        self.free.push(idx);
    }

    /// True iff the head of `atom`'s list is a unit.
    ///
    /// Units are inserted only while their list is empty and later records
    /// always enter at the head, so a unit at the head is the whole story.
    fn unit_head(&self, atom: Atom) -> bool {
        let head = self.heads[atom as usize];
        head != NIL && self.arena[head as usize].peer == NIL
    }

    fn is_pre(&self, atom: Atom) -> bool {
        self.flags[atom as usize] & FL_PRE != 0
    }

    fn is_add(&self, atom: Atom) -> bool {
        self.flags[atom as usize] & FL_ADD != 0
    }

    fn is_del(&self, atom: Atom) -> bool {
        self.flags[atom as usize] & FL_DEL != 0
    }

    fn load_flags(&mut self, action_idx: usize) {
        let action = &self.model.actions[action_idx];
        for atom in &action.pre {
            self.flags[*atom as usize] |= FL_PRE;
        }
        for atom in &action.add {
            self.flags[*atom as usize] |= FL_ADD;
        }
        for atom in &action.del {
            self.flags[*atom as usize] |= FL_DEL;
        }
    }

    fn unload_flags(&mut self, action_idx: usize) {
        let action = &self.model.actions[action_idx];
        for atom in &action.pre {
            self.flags[*atom as usize] = 0;
        }
        for atom in &action.add {
            self.flags[*atom as usize] = 0;
        }
        for atom in &action.del {
            self.flags[*atom as usize] = 0;
        }
    }

    fn fixpoint(&mut self) {
        loop {
            let mut modified = false;

            'actions: for action_idx in 0..self.model.actions.len() {
                self.load_flags(action_idx);

                for add_idx in 0..self.model.actions[action_idx].add.len() {
                    let c_lit = self.model.actions[action_idx].add[add_idx];

                    let mut c = self.heads[c_lit as usize];
                    while c != NIL {
                        let mut c_other = self.arena[c as usize].other_lit;

                        if self.is_pre(c_other) {
                            // pre(a) ∩ c ≠ ∅: a cannot leave c's complement.
                            c = self.arena[c as usize].next;
                            continue;
                        }

                        if self.is_add(c_other) {
                            // c \ add(a) is empty; nothing to pair up with.
                            c_other = NO_ATOM;
                        }

                        match self.shield_search(action_idx, c_other) {
                            ShieldSearch::ActionHarmless => {
                                // Some d ⊆ del(a): a kills no clause at all.
                                self.unload_flags(action_idx);
                                continue 'actions;
                            }
                            ShieldSearch::Found => {
                                c = self.arena[c as usize].next;
                            }
                            ShieldSearch::Missing => {
                                modified = true;
                                let next = self.arena[c as usize].next;
                                self.weaken(c, c_lit);
                                c = next;
                            }
                        }
                    }
                }

                self.unload_flags(action_idx);
            }

            if !modified {
                break;
            }
        }
    }

    /// Searches for a shielding clause d with d ⊆ (c \ add(a)) ∪ del(a).
    ///
    /// Any such d has a side at a delete of the action, with its partner
    /// either another delete (then d ⊆ del(a) and the action is harmless
    /// everywhere) or the surviving literal of c.
    fn shield_search(&self, action_idx: usize, c_other: Atom) -> ShieldSearch {
        for del_lit in &self.model.actions[action_idx].del {
            let mut d = self.heads[*del_lit as usize];
            while d != NIL {
                let rec = &self.arena[d as usize];
                if self.is_del(rec.other_lit) {
                    return ShieldSearch::ActionHarmless;
                }
                if rec.other_lit == c_other {
                    return ShieldSearch::Found;
                }
                d = rec.next;
            }
        }
        ShieldSearch::Missing
    }

    /// Weakens the clause whose side `idx` lives in `home`'s list: a binary
    /// is removed, a unit {x} is replaced by binaries {x, y} over every y
    /// which is not itself a live unit.
    fn weaken(&mut self, idx: u32, home: Atom) {
        let peer = self.arena[idx as usize].peer;

        if peer != NIL {
            log::trace!(target: targets::INVARIANT,
                "Removing binary {{{home}, {}}}", self.arena[idx as usize].other_lit);
            self.unlink(peer);
        } else {
            log::trace!(target: targets::INVARIANT, "Weakening unit {{{home}}}");
            for other in 0..self.heads.len() as Atom {
                if other != home && !self.unit_head(other) {
                    let side_a = self.alloc(home, other, NIL);
                    let side_b = self.alloc(other, home, side_a);
                    self.arena[side_a as usize].peer = side_b;
                    self.link(side_a);
                    self.link(side_b);
                    self.count += 1;
                }
            }
        }

        self.unlink(idx);
        self.count -= 1;
    }
}

enum ShieldSearch {
    /// A clause inside del(a) exists; the action can kill nothing.
    ActionHarmless,

    /// A shielding clause was found for c.
    Found,

    /// c must be weakened.
    Missing,
}

impl<'m> Derivation<'m> {
    /// The number of clauses not yet drained.
    pub fn len(&self) -> usize {
        self.engine.count
    }

    pub fn is_empty(&self) -> bool {
        self.engine.count == 0
    }

    /// Drains the remainder into a packed set.
    pub fn collect_set(self) -> InvariantSet {
        let mut set = InvariantSet::with_capacity(self.len());
        for clause in self {
            set.push(clause);
        }
        set
    }
}

impl<'m> Iterator for Derivation<'m> {
    type Item = BinClause;

    fn next(&mut self) -> Option<BinClause> {
        while self.idx < self.engine.heads.len() && self.engine.heads[self.idx] == NIL {
            self.idx += 1;
        }

        if self.idx == self.engine.heads.len() {
            return None;
        }

        let head = self.engine.heads[self.idx];
        let result = BinClause {
            l1: self.idx as Atom,
            l2: self.engine.arena[head as usize].other_lit,
        };

        let peer = self.engine.arena[head as usize].peer;
        if peer != NIL {
            self.engine.unlink(peer);
        }
        self.engine.unlink(head);
        self.engine.count -= 1;

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.engine.count, Some(self.engine.count))
    }
}

impl<'m> ExactSizeIterator for Derivation<'m> {}
