//! Constructive timetable generator.
//!
//! Units are placed most-constrained first: each unit's statically legal
//! (teacher, room, slot) triples are shuffled with a seeded ChaCha8 stream and
//! the first triple of minimal cost wins, where cost is the weighted soft
//! penalty increase plus a look-ahead term for pairs that units still waiting
//! could use. Units left over go through a bounded swap repair.

mod board;
mod domain;
#[cfg(test)]
mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{
    compute_soft_scores, expand, ConstraintCatalog, EngineError, EvalContext, GenerationRequest,
    Generator, RequirementUnit, Snapshot,
};
use tracing::{info, warn};
use types::{
    EntryOrigin, GenerationMethod, GenerationOutcome, Unscheduled, UnscheduledReason,
};

use board::{Board, RepairBudget};
use domain::{key_of, Demand, Domain, DomainKey};

pub struct HeurGenerator {
    catalog: Arc<ConstraintCatalog>,
}

impl Default for HeurGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeurGenerator {
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(ConstraintCatalog::standard()))
    }

    pub fn with_catalog(catalog: Arc<ConstraintCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ConstraintCatalog {
        &self.catalog
    }

    /// One generation run. Only inconsistent input is an error; units that
    /// cannot be placed are reported in the outcome.
    pub fn run(&self, snapshot: &Snapshot, req: &GenerationRequest) -> Result<GenerationOutcome, EngineError> {
        let started = Instant::now();
        let params = &req.params;
        let deadline = params.timeout_ms.map(|ms| started + Duration::from_millis(ms));
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

        if req.method != GenerationMethod::Auto {
            snapshot.check_entries(&req.existing)?;
        }

        let expansion = expand(snapshot, &req.scope);
        let units = expansion.units;
        let mut domains: HashMap<DomainKey, Domain> = HashMap::new();
        for u in &units {
            domains
                .entry(key_of(u))
                .or_insert_with(|| domain::build(snapshot, &self.catalog, u));
        }

        let mut board = Board::new(snapshot, &self.catalog);
        let mut pending: Vec<usize> = (0..units.len()).collect();
        let mut pinned = 0usize;
        let mut dropped = 0usize;

        match req.method {
            GenerationMethod::Auto => {}
            GenerationMethod::Hybrid => {
                for pin in req.existing.iter().filter(|e| e.origin == EntryOrigin::Manual) {
                    if let Some(v) = board.pin(pin.clone()) {
                        dropped += 1;
                        warn!(entry = %pin.id, scope = %req.scope, violations = v.len(), "dropping conflicting pin");
                        continue;
                    }
                    pinned += 1;
                    consume(&units, &mut pending, pin);
                }
            }
            GenerationMethod::Manual => {
                for e in &req.existing {
                    board.keep(e.clone());
                    consume(&units, &mut pending, e);
                }
            }
        }

        let mut placed_now = 0usize;
        let mut report = board::RepairReport::default();
        let mut unplaced = Vec::new();
        if req.method == GenerationMethod::Manual {
            unplaced = pending;
        } else {
            pending.sort_by(|&a, &b| {
                let (ua, ub) = (&units[a], &units[b]);
                (domain_of(&domains, ua).triples.len(), std::cmp::Reverse(ua.priority), &ua.id)
                    .cmp(&(domain_of(&domains, ub).triples.len(), std::cmp::Reverse(ub.priority), &ub.id))
            });
            let mut demand = Demand::default();
            for &i in &pending {
                demand.add(domain_of(&domains, &units[i]));
            }
            for i in pending {
                let unit = &units[i];
                let dom = domain_of(&domains, unit);
                demand.retire(dom);
                let mut cands: Vec<&domain::Triple> = dom.triples.iter().collect();
                cands.shuffle(&mut rng);
                match board.best(unit, cands, &demand, params.lookahead_weight) {
                    Some(t) => {
                        let id = board::next_id(&mut rng);
                        board.place(t.entry(id, unit), i);
                        placed_now += 1;
                    }
                    None => unplaced.push(i),
                }
            }

            let budget = RepairBudget {
                iterations: params.repair_iterations,
                deadline,
            };
            report = board.repair(&units, &domains, unplaced, budget, &mut rng);
            unplaced = std::mem::take(&mut report.still_unplaced);
            if report.exhausted {
                warn!(
                    scope = %req.scope,
                    attempts = report.attempts,
                    remaining = unplaced.len(),
                    "repair budget exhausted"
                );
            }
        }

        let mut unscheduled = expansion.remainders;
        unplaced.sort_unstable();
        for i in &unplaced {
            unscheduled.push(describe(snapshot, &units[*i], domain_of(&domains, &units[*i]), req.method));
        }

        let total_units = units.len() as u32;
        let total_classes = total_units - unplaced.len() as u32;
        let success_rate = if total_units == 0 {
            100.0
        } else {
            f64::from(total_classes) / f64::from(total_units) * 100.0
        };
        let index = board.into_index();
        let objective = compute_soft_scores(&self.catalog, &EvalContext::new(snapshot, &index)).objective;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            scope = %req.scope,
            method = %req.method,
            placed = total_classes,
            units = total_units,
            success_rate,
            elapsed_ms,
            "generation finished"
        );

        Ok(GenerationOutcome {
            entries: index.into_entries(),
            total_classes,
            total_units,
            success_rate,
            unscheduled,
            exhausted: report.exhausted,
            objective,
            stats: serde_json::json!({
                "method": req.method.to_string(),
                "seed": params.seed,
                "placed": placed_now + report.placed,
                "pinned": pinned,
                "dropped_pins": dropped,
                "repaired_swaps": report.swaps,
                "repair_attempts": report.attempts,
                "objective": objective,
                "elapsed_ms": elapsed_ms,
            }),
        })
    }
}

#[async_trait]
impl Generator for HeurGenerator {
    async fn generate(
        &self,
        snapshot: Arc<Snapshot>,
        req: GenerationRequest,
    ) -> Result<GenerationOutcome, EngineError> {
        self.run(&snapshot, &req)
    }
}

fn domain_of<'d>(domains: &'d HashMap<DomainKey, Domain>, unit: &RequirementUnit) -> &'d Domain {
    &domains[&key_of(unit)]
}

/// Marks the first waiting unit the entry covers as satisfied.
fn consume(units: &[RequirementUnit], pending: &mut Vec<usize>, e: &types::TimetableEntry) {
    if let Some(pos) = pending
        .iter()
        .position(|&i| units[i].matches(&e.group_id, &e.subject_id, e.session_type))
    {
        pending.remove(pos);
    }
}

fn describe(snapshot: &Snapshot, unit: &RequirementUnit, dom: &Domain, method: GenerationMethod) -> Unscheduled {
    let subject = snapshot
        .subject(&unit.subject_id)
        .map_or(unit.subject_id.as_str(), |s| s.code.as_str());
    let group = snapshot
        .group(&unit.group_id)
        .map_or(unit.group_id.as_str(), |g| g.code.as_str());
    let why = match (method, dom.reason) {
        (GenerationMethod::Manual, UnscheduledReason::NoQualifyingSlot) => "not covered by a manual entry".to_string(),
        (_, reason) => reason.to_string(),
    };
    Unscheduled {
        group_id: unit.group_id.clone(),
        subject_id: unit.subject_id.clone(),
        session_type: unit.session_type,
        hours: 1.0,
        reason: dom.reason,
        message: format!("{subject} {} for {group}: {why}", unit.session_type),
    }
}
