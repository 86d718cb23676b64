//! Hard constraints and the catalog that bundles them with the soft ones.
//!
//! A hard constraint answers two questions over the same rule:
//! - `check`: does this one entry violate the rule against the rest of the set?
//! - `scan`: which violation instances exist across the whole set, each reported once?
//!
//! `check` always ignores the index's copy of the entry under test (matched by
//! id), so a candidate can be evaluated for its new position while the index
//! still holds its old one.

use types::{ConflictType, ConstraintViolation, EntryId, TimetableEntry};

use crate::index::EntryIndex;
use crate::scoring::{standard_soft, SoftConstraint};
use crate::snapshot::Snapshot;

#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub snapshot: &'a Snapshot,
    pub index: &'a EntryIndex,
}

impl<'a> EvalContext<'a> {
    pub fn new(snapshot: &'a Snapshot, index: &'a EntryIndex) -> Self {
        Self { snapshot, index }
    }
}

pub trait HardConstraint: Send + Sync {
    fn kind(&self) -> ConflictType;

    /// True when the verdict depends only on the entry and the entities,
    /// never on other entries.
    fn is_static(&self) -> bool {
        false
    }

    fn check(&self, ctx: &EvalContext<'_>, entry: &TimetableEntry) -> Option<ConstraintViolation>;

    fn scan(&self, ctx: &EvalContext<'_>) -> Vec<ConstraintViolation> {
        ctx.index.entries().filter_map(|e| self.check(ctx, e)).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Teacher,
    Classroom,
    Group,
}

/// At most one entry per (resource, slot).
pub struct DoubleBooking(pub Resource);

impl DoubleBooking {
    fn bucket<'i>(&self, index: &'i EntryIndex, e: &TimetableEntry) -> &'i [EntryId] {
        match self.0 {
            Resource::Teacher => index.teacher_slot(&e.teacher_id, &e.time_slot_id),
            Resource::Classroom => index.room_slot(&e.classroom_id, &e.time_slot_id),
            Resource::Group => index.group_slot(&e.group_id, &e.time_slot_id),
        }
    }

    fn describe(&self, resource: &str, slot: &str, count: usize) -> String {
        let what = match self.0 {
            Resource::Teacher => "teacher",
            Resource::Classroom => "classroom",
            Resource::Group => "group",
        };
        format!("{what} {resource} is booked {count} times at {slot}")
    }
}

impl HardConstraint for DoubleBooking {
    fn kind(&self) -> ConflictType {
        match self.0 {
            Resource::Teacher => ConflictType::TeacherDoubleBooking,
            Resource::Classroom => ConflictType::ClassroomDoubleBooking,
            Resource::Group => ConflictType::GroupDoubleBooking,
        }
    }

    fn check(&self, ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<ConstraintViolation> {
        let mut ids: Vec<EntryId> = self
            .bucket(ctx.index, e)
            .iter()
            .filter(|id| **id != e.id)
            .cloned()
            .collect();
        if ids.is_empty() {
            return None;
        }
        ids.push(e.id.clone());
        let resource = match self.0 {
            Resource::Teacher => e.teacher_id.as_str(),
            Resource::Classroom => e.classroom_id.as_str(),
            Resource::Group => e.group_id.as_str(),
        };
        let description = self.describe(resource, e.time_slot_id.as_str(), ids.len());
        Some(ConstraintViolation::new(self.kind(), ids, description))
    }

    fn scan(&self, ctx: &EvalContext<'_>) -> Vec<ConstraintViolation> {
        let mut out = Vec::new();
        let mut emit = |resource: &str, slot: &str, ids: &Vec<EntryId>| {
            if ids.len() > 1 {
                out.push(ConstraintViolation::new(
                    self.kind(),
                    ids.clone(),
                    self.describe(resource, slot, ids.len()),
                ));
            }
        };
        match self.0 {
            Resource::Teacher => {
                for ((t, s), ids) in ctx.index.teacher_slot_buckets() {
                    emit(t.as_str(), s.as_str(), ids);
                }
            }
            Resource::Classroom => {
                for ((r, s), ids) in ctx.index.room_slot_buckets() {
                    emit(r.as_str(), s.as_str(), ids);
                }
            }
            Resource::Group => {
                for ((g, s), ids) in ctx.index.group_slot_buckets() {
                    emit(g.as_str(), s.as_str(), ids);
                }
            }
        }
        out
    }
}

pub struct TeacherAvailability;

impl HardConstraint for TeacherAvailability {
    fn kind(&self) -> ConflictType {
        ConflictType::TeacherUnavailable
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<ConstraintViolation> {
        let teacher = ctx.snapshot.teacher(&e.teacher_id)?;
        let slot = ctx.snapshot.slot(&e.time_slot_id)?;
        teacher.is_unavailable(slot).then(|| {
            ConstraintViolation::new(
                self.kind(),
                vec![e.id.clone()],
                format!("teacher {} is unavailable at {} ({})", teacher.id, slot.id, slot.day),
            )
        })
    }
}

pub struct TeacherQualification;

impl HardConstraint for TeacherQualification {
    fn kind(&self) -> ConflictType {
        ConflictType::TeacherUnqualified
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<ConstraintViolation> {
        let teacher = ctx.snapshot.teacher(&e.teacher_id)?;
        (!teacher.qualifications.contains(&e.subject_id)).then(|| {
            ConstraintViolation::new(
                self.kind(),
                vec![e.id.clone()],
                format!("teacher {} is not qualified for {}", teacher.id, e.subject_id),
            )
        })
    }
}

pub struct RoomCapacity;

impl HardConstraint for RoomCapacity {
    fn kind(&self) -> ConflictType {
        ConflictType::CapacityExceeded
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<ConstraintViolation> {
        let room = ctx.snapshot.classroom(&e.classroom_id)?;
        let group = ctx.snapshot.group(&e.group_id)?;
        let min = ctx
            .snapshot
            .subject(&e.subject_id)
            .map_or(0, |s| s.min_room_capacity);
        let needed = group.student_count.max(min);
        (room.seating_capacity < needed).then(|| {
            ConstraintViolation::new(
                self.kind(),
                vec![e.id.clone()],
                format!(
                    "classroom {} seats {} but {} needs {}",
                    room.room_number, room.seating_capacity, group.code, needed
                ),
            )
        })
    }
}

/// Room type or facility match, room active, room not under maintenance.
pub struct RoomSuitability;

impl HardConstraint for RoomSuitability {
    fn kind(&self) -> ConflictType {
        ConflictType::RoomUnsuitable
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<ConstraintViolation> {
        let room = ctx.snapshot.classroom(&e.classroom_id)?;
        let reason = if !room.is_active {
            Some(format!("classroom {} is not active", room.room_number))
        } else if room.maintenance.contains(&e.time_slot_id) {
            Some(format!(
                "classroom {} is under maintenance at {}",
                room.room_number, e.time_slot_id
            ))
        } else {
            ctx.snapshot
                .subject(&e.subject_id)
                .and_then(|s| s.required_room_type)
                .filter(|&req| !room.satisfies(req))
                .map(|req| {
                    format!(
                        "{} requires a {} but classroom {} is a {}",
                        e.subject_id,
                        req.tag(),
                        room.room_number,
                        room.room_type.tag()
                    )
                })
        };
        reason.map(|r| ConstraintViolation::new(self.kind(), vec![e.id.clone()], r))
    }
}

pub struct TeachingSlot;

impl HardConstraint for TeachingSlot {
    fn kind(&self) -> ConflictType {
        ConflictType::NonTeachingSlot
    }

    fn is_static(&self) -> bool {
        true
    }

    fn check(&self, ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<ConstraintViolation> {
        let slot = ctx.snapshot.slot(&e.time_slot_id)?;
        (!slot.kind.is_teachable()).then(|| {
            ConstraintViolation::new(
                self.kind(),
                vec![e.id.clone()],
                format!("slot {} is not a teaching slot", slot.id),
            )
        })
    }
}

/// Each entry is one period against the teacher's weekly cap.
pub struct WeeklyHourCap;

impl HardConstraint for WeeklyHourCap {
    fn kind(&self) -> ConflictType {
        ConflictType::WeeklyHoursExceeded
    }

    fn check(&self, ctx: &EvalContext<'_>, e: &TimetableEntry) -> Option<ConstraintViolation> {
        let teacher = ctx.snapshot.teacher(&e.teacher_id)?;
        let mut ids: Vec<EntryId> = ctx
            .index
            .teacher_entries(&e.teacher_id)
            .iter()
            .filter(|id| **id != e.id)
            .cloned()
            .collect();
        ids.push(e.id.clone());
        let load = ids.len() as u32;
        (load > teacher.max_hours_per_week).then(|| {
            ConstraintViolation::new(
                self.kind(),
                ids,
                format!(
                    "teacher {} would teach {} periods, cap is {}",
                    teacher.id, load, teacher.max_hours_per_week
                ),
            )
        })
    }

    fn scan(&self, ctx: &EvalContext<'_>) -> Vec<ConstraintViolation> {
        ctx.index
            .teachers()
            .filter_map(|(tid, ids)| {
                let teacher = ctx.snapshot.teacher(tid)?;
                let load = ids.len() as u32;
                (load > teacher.max_hours_per_week).then(|| {
                    ConstraintViolation::new(
                        self.kind(),
                        ids.clone(),
                        format!(
                            "teacher {} teaches {} periods, cap is {}",
                            tid, load, teacher.max_hours_per_week
                        ),
                    )
                })
            })
            .collect()
    }
}

/// The full rule set: every hard constraint plus the weighted soft ones.
pub struct ConstraintCatalog {
    hard: Vec<Box<dyn HardConstraint>>,
    soft: Vec<Box<dyn SoftConstraint>>,
}

impl Default for ConstraintCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ConstraintCatalog {
    pub fn standard() -> Self {
        Self {
            hard: vec![
                Box::new(DoubleBooking(Resource::Teacher)),
                Box::new(DoubleBooking(Resource::Classroom)),
                Box::new(DoubleBooking(Resource::Group)),
                Box::new(TeacherAvailability),
                Box::new(TeacherQualification),
                Box::new(RoomCapacity),
                Box::new(RoomSuitability),
                Box::new(TeachingSlot),
                Box::new(WeeklyHourCap),
            ],
            soft: standard_soft(),
        }
    }

    pub fn new(hard: Vec<Box<dyn HardConstraint>>, soft: Vec<Box<dyn SoftConstraint>>) -> Self {
        Self { hard, soft }
    }

    pub fn hard(&self) -> &[Box<dyn HardConstraint>] {
        &self.hard
    }

    pub fn soft(&self) -> &[Box<dyn SoftConstraint>] {
        &self.soft
    }

    pub fn violations(&self, ctx: &EvalContext<'_>, entry: &TimetableEntry) -> Vec<ConstraintViolation> {
        self.hard.iter().filter_map(|c| c.check(ctx, entry)).collect()
    }

    pub fn static_violations(
        &self,
        ctx: &EvalContext<'_>,
        entry: &TimetableEntry,
    ) -> Vec<ConstraintViolation> {
        self.hard
            .iter()
            .filter(|c| c.is_static())
            .filter_map(|c| c.check(ctx, entry))
            .collect()
    }

    /// Cheaper legality test for a candidate whose static checks already passed.
    pub fn dynamically_legal(&self, ctx: &EvalContext<'_>, entry: &TimetableEntry) -> bool {
        self.hard
            .iter()
            .filter(|c| !c.is_static())
            .all(|c| c.check(ctx, entry).is_none())
    }

    /// Weighted soft-penalty increase from adding `entry` to the set.
    pub fn marginal_cost(&self, ctx: &EvalContext<'_>, entry: &TimetableEntry) -> f64 {
        let w = &ctx.snapshot.policy().soft_weights;
        self.soft
            .iter()
            .map(|c| c.weight(w) * c.marginal(ctx, entry))
            .sum()
    }
}
