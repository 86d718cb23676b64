use std::collections::{HashMap, HashSet};

use sched_core::{ConstraintCatalog, EntryIndex, EvalContext, RequirementUnit, Snapshot};
use types::{
    ClassroomId, ConflictType, EntryId, EntryOrigin, GroupId, SessionType, SubjectId, TeacherId,
    TimeSlotId, TimetableEntry, UnscheduledReason,
};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Triple {
    pub teacher: TeacherId,
    pub room: ClassroomId,
    pub slot: TimeSlotId,
}

impl Triple {
    pub fn entry(&self, id: EntryId, unit: &RequirementUnit) -> TimetableEntry {
        TimetableEntry {
            id,
            group_id: unit.group_id.clone(),
            subject_id: unit.subject_id.clone(),
            teacher_id: self.teacher.clone(),
            classroom_id: self.room.clone(),
            time_slot_id: self.slot.clone(),
            session_type: unit.session_type,
            origin: EntryOrigin::Generated,
        }
    }

    pub fn of(e: &TimetableEntry) -> Self {
        Self {
            teacher: e.teacher_id.clone(),
            room: e.classroom_id.clone(),
            slot: e.time_slot_id.clone(),
        }
    }
}

/// Placements of one kind of unit that pass every static constraint.
#[derive(Clone, Debug)]
pub struct Domain {
    pub triples: Vec<Triple>,
    /// Reported when a unit of this kind stays unplaced.
    pub reason: UnscheduledReason,
}

pub type DomainKey = (GroupId, SubjectId, SessionType, Option<TeacherId>);

pub fn key_of(unit: &RequirementUnit) -> DomainKey {
    (
        unit.group_id.clone(),
        unit.subject_id.clone(),
        unit.session_type,
        unit.assigned_teacher.clone(),
    )
}

/// Enumerates (teacher, room, slot) over qualified (or assigned) teachers,
/// active rooms and teachable slots, in grid order.
pub fn build(snapshot: &Snapshot, catalog: &ConstraintCatalog, unit: &RequirementUnit) -> Domain {
    let cat = snapshot.catalog();
    let teachers: Vec<&TeacherId> = match &unit.assigned_teacher {
        Some(t) => snapshot.teacher(t).map(|t| &t.id).into_iter().collect(),
        None => cat
            .teachers
            .iter()
            .filter(|t| t.qualifications.contains(&unit.subject_id))
            .map(|t| &t.id)
            .collect(),
    };
    if teachers.is_empty() {
        return Domain {
            triples: Vec::new(),
            reason: UnscheduledReason::NoQualifiedTeacher,
        };
    }
    let rooms: Vec<&ClassroomId> = cat
        .classrooms
        .iter()
        .filter(|r| r.is_active)
        .map(|r| &r.id)
        .collect();

    let empty = EntryIndex::default();
    let ctx = EvalContext::new(snapshot, &empty);
    let mut triples = Vec::new();
    let mut room_fits = false;
    for slot in snapshot.teachable_slots() {
        for room in &rooms {
            for teacher in &teachers {
                let t = Triple {
                    teacher: (*teacher).clone(),
                    room: (*room).clone(),
                    slot: slot.id.clone(),
                };
                let violations = catalog.static_violations(&ctx, &t.entry(EntryId::from("probe"), unit));
                let room_ok = violations
                    .iter()
                    .all(|v| !matches!(v.kind, ConflictType::CapacityExceeded | ConflictType::RoomUnsuitable));
                room_fits |= room_ok;
                if violations.is_empty() {
                    triples.push(t);
                }
            }
        }
    }
    let reason = if rooms.is_empty() || !room_fits {
        UnscheduledReason::NoSuitableRoom
    } else {
        UnscheduledReason::NoQualifyingSlot
    };
    Domain { triples, reason }
}

/// How many still-unplaced units could use each (teacher, slot) and
/// (room, slot) pair. Placing on a contested pair costs look-ahead.
#[derive(Default)]
pub struct Demand {
    teacher_slot: HashMap<(TeacherId, TimeSlotId), u32>,
    room_slot: HashMap<(ClassroomId, TimeSlotId), u32>,
}

impl Demand {
    fn pairs(domain: &Domain) -> (HashSet<(&TeacherId, &TimeSlotId)>, HashSet<(&ClassroomId, &TimeSlotId)>) {
        let ts = domain.triples.iter().map(|t| (&t.teacher, &t.slot)).collect();
        let rs = domain.triples.iter().map(|t| (&t.room, &t.slot)).collect();
        (ts, rs)
    }

    pub fn add(&mut self, domain: &Domain) {
        let (ts, rs) = Self::pairs(domain);
        for (t, s) in ts {
            *self.teacher_slot.entry((t.clone(), s.clone())).or_default() += 1;
        }
        for (r, s) in rs {
            *self.room_slot.entry((r.clone(), s.clone())).or_default() += 1;
        }
    }

    pub fn retire(&mut self, domain: &Domain) {
        let (ts, rs) = Self::pairs(domain);
        for (t, s) in ts {
            if let Some(n) = self.teacher_slot.get_mut(&(t.clone(), s.clone())) {
                *n = n.saturating_sub(1);
            }
        }
        for (r, s) in rs {
            if let Some(n) = self.room_slot.get_mut(&(r.clone(), s.clone())) {
                *n = n.saturating_sub(1);
            }
        }
    }

    pub fn pressure(&self, t: &Triple) -> f64 {
        let a = self
            .teacher_slot
            .get(&(t.teacher.clone(), t.slot.clone()))
            .copied()
            .unwrap_or(0);
        let b = self
            .room_slot
            .get(&(t.room.clone(), t.slot.clone()))
            .copied()
            .unwrap_or(0);
        f64::from(a + b)
    }
}
