use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use sched_core::{ConstraintCatalog, EntryIndex, EvalContext, RequirementUnit, Snapshot};
use tracing::debug;
use types::{ConstraintViolation, EntryId, TimetableEntry};

use crate::domain::{key_of, Demand, Domain, DomainKey, Triple};

/// Id given to candidates while they are scored; never stored.
const PROBE: &str = "~candidate";

pub fn next_id(rng: &mut ChaCha8Rng) -> EntryId {
    EntryId(uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string())
}

#[derive(Clone, Copy, Debug)]
pub struct RepairBudget {
    pub iterations: u32,
    pub deadline: Option<Instant>,
}

#[derive(Debug, Default)]
pub struct RepairReport {
    pub still_unplaced: Vec<usize>,
    pub placed: usize,
    pub swaps: usize,
    pub attempts: u32,
    pub exhausted: bool,
}

/// Entries committed so far in one run.
pub struct Board<'a> {
    snapshot: &'a Snapshot,
    catalog: &'a ConstraintCatalog,
    index: EntryIndex,
    /// Generated entries the repair may relocate, with their unit.
    movable: HashMap<EntryId, usize>,
}

impl<'a> Board<'a> {
    pub fn new(snapshot: &'a Snapshot, catalog: &'a ConstraintCatalog) -> Self {
        Self {
            snapshot,
            catalog,
            index: EntryIndex::default(),
            movable: HashMap::new(),
        }
    }

    fn ctx(&self) -> EvalContext<'_> {
        EvalContext::new(self.snapshot, &self.index)
    }

    /// Keeps a manual entry if it is legal against the pins so far;
    /// otherwise returns what it violates.
    pub fn pin(&mut self, e: TimetableEntry) -> Option<Vec<ConstraintViolation>> {
        let v = self.catalog.violations(&self.ctx(), &e);
        if !v.is_empty() {
            return Some(v);
        }
        self.index.insert(e);
        None
    }

    /// Keeps an entry unchecked.
    pub fn keep(&mut self, e: TimetableEntry) {
        self.index.insert(e);
    }

    pub fn place(&mut self, e: TimetableEntry, unit: usize) {
        self.movable.insert(e.id.clone(), unit);
        self.index.insert(e);
    }

    pub fn into_index(self) -> EntryIndex {
        self.index
    }

    fn legal(&self, probe: &TimetableEntry) -> bool {
        self.catalog.dynamically_legal(&self.ctx(), probe)
    }

    /// First candidate of minimal cost among the dynamically legal ones.
    pub fn best<'t>(
        &self,
        unit: &RequirementUnit,
        cands: impl IntoIterator<Item = &'t Triple>,
        demand: &Demand,
        lookahead: f64,
    ) -> Option<&'t Triple> {
        let ctx = self.ctx();
        let mut best: Option<(f64, &'t Triple)> = None;
        for t in cands {
            let probe = t.entry(EntryId::from(PROBE), unit);
            if !self.catalog.dynamically_legal(&ctx, &probe) {
                continue;
            }
            let cost = self.catalog.marginal_cost(&ctx, &probe) + lookahead * demand.pressure(t);
            if best.map_or(true, |(c, _)| cost < c) {
                best = Some((cost, t));
            }
        }
        best.map(|(_, t)| t)
    }

    /// The one entry standing between `probe` and a legal placement, if
    /// exactly one entry shares its teacher, room or group at the slot.
    fn single_blocker(&self, probe: &TimetableEntry) -> Option<EntryId> {
        let slot = &probe.time_slot_id;
        let ids: BTreeSet<&EntryId> = self
            .index
            .teacher_slot(&probe.teacher_id, slot)
            .iter()
            .chain(self.index.room_slot(&probe.classroom_id, slot))
            .chain(self.index.group_slot(&probe.group_id, slot))
            .collect();
        match ids.len() {
            1 => ids.into_iter().next().cloned(),
            _ => None,
        }
    }

    /// Bounded swap repair. For each unplaced unit, walks its shuffled domain
    /// looking for a triple held by a single relocatable entry of no higher
    /// priority; the unit takes the triple if the blocker fits elsewhere.
    /// Every triple examined costs one iteration.
    pub fn repair(
        &mut self,
        units: &[RequirementUnit],
        domains: &HashMap<DomainKey, Domain>,
        unplaced: Vec<usize>,
        budget: RepairBudget,
        rng: &mut ChaCha8Rng,
    ) -> RepairReport {
        let mut report = RepairReport::default();
        let idle = Demand::default();

        for i in unplaced {
            let unit = &units[i];
            let dom = &domains[&key_of(unit)];
            if report.exhausted || dom.triples.is_empty() {
                report.still_unplaced.push(i);
                continue;
            }
            let mut cands: Vec<&Triple> = dom.triples.iter().collect();
            cands.shuffle(rng);

            let mut fixed = false;
            for t in cands {
                let out_of_time = budget.deadline.map_or(false, |d| Instant::now() >= d);
                if report.attempts >= budget.iterations || out_of_time {
                    report.exhausted = true;
                    break;
                }
                report.attempts += 1;

                let probe = t.entry(EntryId::from(PROBE), unit);
                if self.legal(&probe) {
                    // freed by an earlier swap
                    self.place(t.entry(next_id(rng), unit), i);
                    report.placed += 1;
                    fixed = true;
                    break;
                }
                let Some(blocker) = self.single_blocker(&probe) else {
                    continue;
                };
                let Some(&bi) = self.movable.get(&blocker) else {
                    continue;
                };
                let owner = &units[bi];
                if owner.priority > unit.priority {
                    continue;
                }
                let Some(old) = self.index.remove(&blocker) else {
                    continue;
                };
                if !self.legal(&probe) {
                    self.index.insert(old);
                    continue;
                }
                let entry = t.entry(next_id(rng), unit);
                let new_id = entry.id.clone();
                self.index.insert(entry);

                let here = Triple::of(&old);
                let mut alts: Vec<&Triple> = domains[&key_of(owner)]
                    .triples
                    .iter()
                    .filter(|x| **x != here)
                    .collect();
                alts.shuffle(rng);
                match self.best(owner, alts, &idle, 0.0) {
                    Some(alt) => {
                        debug!(unit = %unit.id, moved = %old.id, from = %here.slot, to = %alt.slot, "repair swap");
                        self.index.insert(alt.entry(old.id.clone(), owner));
                        self.movable.insert(new_id, i);
                        report.placed += 1;
                        report.swaps += 1;
                        fixed = true;
                        break;
                    }
                    None => {
                        self.index.remove(&new_id);
                        self.index.insert(old);
                    }
                }
            }
            if !fixed {
                report.still_unplaced.push(i);
            }
        }
        report
    }
}
