use std::collections::BTreeMap;

use types::{DayOfWeek, EntryId, SoftBreakdown, SoftWeights, TimetableEntry};

use crate::constraints::{ConstraintCatalog, EvalContext};

#[derive(Clone, Debug)]
pub struct SoftFinding {
    pub constraint: &'static str,
    /// Who the finding is about, e.g. `t1@mon` or an entry id.
    pub subject: String,
    pub entries: Vec<EntryId>,
    pub penalty: f64,
    pub description: String,
}

pub trait SoftConstraint: Send + Sync {
    fn name(&self) -> &'static str;
    fn weight(&self, w: &SoftWeights) -> f64;
    fn findings(&self, ctx: &EvalContext<'_>) -> Vec<SoftFinding>;
    /// Raw penalty change from adding `candidate` (not yet in the index).
    fn marginal(&self, ctx: &EvalContext<'_>, candidate: &TimetableEntry) -> f64;
}

pub fn standard_soft() -> Vec<Box<dyn SoftConstraint>> {
    vec![Box::new(DailyLoad), Box::new(GroupGaps), Box::new(Preferences)]
}

fn day_of(ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<DayOfWeek> {
    ctx.snapshot.slot(&e.time_slot_id).map(|s| s.day)
}

/// Idle teachable slots between the first and last occupied one.
fn gaps(positions: &mut Vec<u32>) -> u32 {
    positions.sort_unstable();
    positions.dedup();
    match (positions.first(), positions.last()) {
        (Some(&a), Some(&b)) => (b - a + 1) - positions.len() as u32,
        _ => 0,
    }
}

/// Periods per (teacher, day) above the teacher's or the policy's daily limit.
pub struct DailyLoad;

impl DailyLoad {
    fn limit(ctx: &EvalContext<'_>, teacher: &types::TeacherId) -> u32 {
        ctx.snapshot
            .teacher(teacher)
            .and_then(|t| t.prefs.max_per_day)
            .unwrap_or(ctx.snapshot.policy().daily_load_limit)
    }
}

impl SoftConstraint for DailyLoad {
    fn name(&self) -> &'static str {
        "daily_load"
    }

    fn weight(&self, w: &SoftWeights) -> f64 {
        w.daily_load
    }

    fn findings(&self, ctx: &EvalContext<'_>) -> Vec<SoftFinding> {
        let mut out = Vec::new();
        for (tid, ids) in ctx.index.teachers() {
            let limit = Self::limit(ctx, tid);
            let mut per_day: BTreeMap<DayOfWeek, Vec<EntryId>> = BTreeMap::new();
            for id in ids {
                if let Some(day) = ctx.index.get(id).and_then(|e| day_of(ctx, e)) {
                    per_day.entry(day).or_default().push(id.clone());
                }
            }
            for (day, ids) in per_day {
                let load = ids.len() as u32;
                if load > limit {
                    out.push(SoftFinding {
                        constraint: self.name(),
                        subject: format!("{tid}@{day}"),
                        penalty: f64::from(load - limit),
                        description: format!(
                            "teacher {tid} teaches {load} periods on {day}, limit is {limit}"
                        ),
                        entries: ids,
                    });
                }
            }
        }
        out
    }

    fn marginal(&self, ctx: &EvalContext<'_>, c: &TimetableEntry) -> f64 {
        let Some(day) = day_of(ctx, c) else {
            return 0.0;
        };
        let load = ctx
            .index
            .teacher_entries(&c.teacher_id)
            .iter()
            .filter(|id| **id != c.id)
            .filter_map(|id| ctx.index.get(id))
            .filter(|e| day_of(ctx, e) == Some(day))
            .count() as u32;
        if load + 1 > Self::limit(ctx, &c.teacher_id) {
            1.0
        } else {
            0.0
        }
    }
}

/// Idle periods inside a group's day.
pub struct GroupGaps;

impl GroupGaps {
    fn day_positions(
        ctx: &EvalContext<'_>,
        group: &types::GroupId,
        skip: Option<&EntryId>,
    ) -> BTreeMap<DayOfWeek, (Vec<u32>, Vec<EntryId>)> {
        let mut per_day: BTreeMap<DayOfWeek, (Vec<u32>, Vec<EntryId>)> = BTreeMap::new();
        for id in ctx.index.group_entries(group) {
            if Some(id) == skip {
                continue;
            }
            let Some(e) = ctx.index.get(id) else { continue };
            let (Some(day), Some(pos)) = (day_of(ctx, e), ctx.snapshot.position(&e.time_slot_id))
            else {
                continue;
            };
            let slot = per_day.entry(day).or_default();
            slot.0.push(pos);
            slot.1.push(id.clone());
        }
        per_day
    }
}

impl SoftConstraint for GroupGaps {
    fn name(&self) -> &'static str {
        "group_gaps"
    }

    fn weight(&self, w: &SoftWeights) -> f64 {
        w.gaps
    }

    fn findings(&self, ctx: &EvalContext<'_>) -> Vec<SoftFinding> {
        let mut out = Vec::new();
        for (gid, _) in ctx.index.groups() {
            for (day, (mut positions, ids)) in Self::day_positions(ctx, gid, None) {
                let g = gaps(&mut positions);
                if g > 0 {
                    out.push(SoftFinding {
                        constraint: self.name(),
                        subject: format!("{gid}@{day}"),
                        entries: ids,
                        penalty: f64::from(g),
                        description: format!("group {gid} has {g} idle periods on {day}"),
                    });
                }
            }
        }
        out
    }

    fn marginal(&self, ctx: &EvalContext<'_>, c: &TimetableEntry) -> f64 {
        let (Some(day), Some(pos)) = (day_of(ctx, c), ctx.snapshot.position(&c.time_slot_id)) else {
            return 0.0;
        };
        let mut before = Self::day_positions(ctx, &c.group_id, Some(&c.id))
            .remove(&day)
            .map(|(p, _)| p)
            .unwrap_or_default();
        let old = gaps(&mut before);
        before.push(pos);
        let new = gaps(&mut before);
        f64::from(new) - f64::from(old)
    }
}

/// Avoided slots, days outside the preferred ones, rooms outside the preferred ones.
pub struct Preferences;

impl Preferences {
    fn misses(ctx: &EvalContext<'_>, e: &TimetableEntry) -> (u32, Vec<&'static str>) {
        let Some(t) = ctx.snapshot.teacher(&e.teacher_id) else {
            return (0, vec![]);
        };
        let mut why = Vec::new();
        if t.prefs.avoid_slots.contains(&e.time_slot_id) {
            why.push("avoided slot");
        }
        if !t.prefs.preferred_days.is_empty() {
            if let Some(day) = day_of(ctx, e) {
                if !t.prefs.preferred_days.contains(&day) {
                    why.push("non-preferred day");
                }
            }
        }
        if !t.prefs.preferred_rooms.is_empty() && !t.prefs.preferred_rooms.contains(&e.classroom_id) {
            why.push("non-preferred room");
        }
        (why.len() as u32, why)
    }
}

impl SoftConstraint for Preferences {
    fn name(&self) -> &'static str {
        "preferences"
    }

    fn weight(&self, w: &SoftWeights) -> f64 {
        w.preferences
    }

    fn findings(&self, ctx: &EvalContext<'_>) -> Vec<SoftFinding> {
        ctx.index
            .entries()
            .filter_map(|e| {
                let (n, why) = Self::misses(ctx, e);
                (n > 0).then(|| SoftFinding {
                    constraint: self.name(),
                    subject: e.id.to_string(),
                    entries: vec![e.id.clone()],
                    penalty: f64::from(n),
                    description: format!("teacher {}: {}", e.teacher_id, why.join(", ")),
                })
            })
            .collect()
    }

    fn marginal(&self, ctx: &EvalContext<'_>, c: &TimetableEntry) -> f64 {
        f64::from(Self::misses(ctx, c).0)
    }
}

pub fn compute_soft_scores(catalog: &ConstraintCatalog, ctx: &EvalContext<'_>) -> SoftBreakdown {
    let w = &ctx.snapshot.policy().soft_weights;
    let mut out = SoftBreakdown {
        daily_overload: 0.0,
        group_gaps: 0.0,
        preference_misses: 0.0,
        objective: 0.0,
        gaps_by_group: BTreeMap::new(),
        overload_by_teacher: BTreeMap::new(),
    };
    for c in catalog.soft() {
        let weight = c.weight(w);
        for f in c.findings(ctx) {
            out.objective += weight * f.penalty;
            match f.constraint {
                "daily_load" => {
                    out.daily_overload += f.penalty;
                    let teacher = f.subject.split('@').next().unwrap_or_default().to_string();
                    *out.overload_by_teacher.entry(teacher).or_default() += f.penalty;
                }
                "group_gaps" => {
                    out.group_gaps += f.penalty;
                    let group = f.subject.split('@').next().unwrap_or_default().to_string();
                    *out.gaps_by_group.entry(group).or_default() += f.penalty;
                }
                _ => out.preference_misses += f.penalty,
            }
        }
    }
    out
}

/// Findings whose weighted penalty exceeds the policy threshold.
pub fn soft_warnings(catalog: &ConstraintCatalog, ctx: &EvalContext<'_>) -> Vec<SoftFinding> {
    let policy = ctx.snapshot.policy();
    catalog
        .soft()
        .iter()
        .flat_map(|c| {
            let weight = c.weight(&policy.soft_weights);
            c.findings(ctx)
                .into_iter()
                .filter(move |f| weight * f.penalty > policy.warning_threshold)
        })
        .collect()
}
