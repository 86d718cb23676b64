use std::collections::{BTreeMap, HashMap, HashSet};

use types::{
    Catalog, Classroom, ClassroomId, DayOfWeek, GroupId, Policy, Scope, StudentGroup, Subject,
    SubjectId, Teacher, TeacherId, TimeSlot, TimeSlotId, TimetableEntry,
};

use crate::error::InputError;

/// Validated, indexed view over the entity pools.
///
/// Built once at the boundary; every other component reads entities through
/// it instead of re-checking references.
#[derive(Debug, Clone)]
pub struct Snapshot {
    catalog: Catalog,
    teachers: HashMap<TeacherId, usize>,
    subjects: HashMap<SubjectId, usize>,
    classrooms: HashMap<ClassroomId, usize>,
    groups: HashMap<GroupId, usize>,
    slots: HashMap<TimeSlotId, usize>,
    /// Teachable slot indices per day, in ordinal order.
    day_slots: BTreeMap<DayOfWeek, Vec<usize>>,
    /// Position of each teachable slot within its day.
    positions: HashMap<TimeSlotId, u32>,
}

impl Snapshot {
    pub fn new(catalog: Catalog) -> Result<Self, InputError> {
        validate(&catalog)?;

        fn index<K: Clone + std::hash::Hash + Eq>(ids: impl Iterator<Item = K>) -> HashMap<K, usize> {
            ids.enumerate().map(|(i, k)| (k, i)).collect()
        }

        let teachers = index(catalog.teachers.iter().map(|t| t.id.clone()));
        let subjects = index(catalog.subjects.iter().map(|s| s.id.clone()));
        let classrooms = index(catalog.classrooms.iter().map(|c| c.id.clone()));
        let groups = index(catalog.groups.iter().map(|g| g.id.clone()));
        let slots = index(catalog.time_slots.iter().map(|s| s.id.clone()));

        let mut day_slots: BTreeMap<DayOfWeek, Vec<usize>> = BTreeMap::new();
        for (i, s) in catalog.time_slots.iter().enumerate() {
            if s.kind.is_teachable() {
                day_slots.entry(s.day).or_default().push(i);
            }
        }
        let mut positions = HashMap::new();
        for v in day_slots.values_mut() {
            v.sort_by_key(|&i| catalog.time_slots[i].ordinal);
            for (pos, &i) in v.iter().enumerate() {
                positions.insert(catalog.time_slots[i].id.clone(), pos as u32);
            }
        }

        Ok(Self {
            catalog,
            teachers,
            subjects,
            classrooms,
            groups,
            slots,
            day_slots,
            positions,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &Policy {
        &self.catalog.policy
    }

    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teachers.get(id).map(|&i| &self.catalog.teachers[i])
    }

    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.get(id).map(|&i| &self.catalog.subjects[i])
    }

    pub fn classroom(&self, id: &ClassroomId) -> Option<&Classroom> {
        self.classrooms.get(id).map(|&i| &self.catalog.classrooms[i])
    }

    pub fn group(&self, id: &GroupId) -> Option<&StudentGroup> {
        self.groups.get(id).map(|&i| &self.catalog.groups[i])
    }

    pub fn slot(&self, id: &TimeSlotId) -> Option<&TimeSlot> {
        self.slots.get(id).map(|&i| &self.catalog.time_slots[i])
    }

    /// Position among the teachable slots of the same day; `None` for breaks.
    pub fn position(&self, id: &TimeSlotId) -> Option<u32> {
        self.positions.get(id).copied()
    }

    pub fn teachable_slots(&self) -> impl Iterator<Item = &TimeSlot> + '_ {
        self.day_slots
            .values()
            .flat_map(move |v| v.iter().map(move |&i| &self.catalog.time_slots[i]))
    }

    pub fn groups_in<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a StudentGroup> + 'a {
        self.catalog
            .groups
            .iter()
            .filter(move |g| g.academic_year == scope.academic_year && g.semester == scope.semester)
    }

    /// Ordering key for presenting entries on the weekly grid.
    pub fn grid_key(&self, slot: &TimeSlotId) -> (DayOfWeek, u32) {
        self.slot(slot)
            .map(|s| (s.day, s.ordinal))
            .unwrap_or((DayOfWeek::Sat, u32::MAX))
    }

    /// Referential integrity of an entry set: every id resolves, entry ids are unique.
    pub fn check_entries(&self, entries: &[TimetableEntry]) -> Result<(), InputError> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for e in entries {
            if !seen.insert(&e.id) {
                issues.push(format!("duplicate entry id: {}", e.id));
            }
            if self.group(&e.group_id).is_none() {
                issues.push(format!("entry {} references missing group {}", e.id, e.group_id));
            }
            if self.subject(&e.subject_id).is_none() {
                issues.push(format!("entry {} references missing subject {}", e.id, e.subject_id));
            }
            if self.teacher(&e.teacher_id).is_none() {
                issues.push(format!("entry {} references missing teacher {}", e.id, e.teacher_id));
            }
            if self.classroom(&e.classroom_id).is_none() {
                issues.push(format!(
                    "entry {} references missing classroom {}",
                    e.id, e.classroom_id
                ));
            }
            if self.slot(&e.time_slot_id).is_none() {
                issues.push(format!(
                    "entry {} references missing time slot {}",
                    e.id, e.time_slot_id
                ));
            }
        }
        InputError::from_issues(issues)
    }
}

pub fn validate(cat: &Catalog) -> Result<(), InputError> {
    let mut errors: Vec<String> = Vec::new();

    if cat.time_slots.is_empty() {
        errors.push("time_slots is empty".into());
    }

    fn chk_unique<'a>(name: &str, ids: impl Iterator<Item = &'a str>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                errors.push(format!("duplicate {name} id: {id}"));
            }
        }
    }
    chk_unique("teacher", cat.teachers.iter().map(|x| x.id.as_str()), &mut errors);
    chk_unique("subject", cat.subjects.iter().map(|x| x.id.as_str()), &mut errors);
    chk_unique("classroom", cat.classrooms.iter().map(|x| x.id.as_str()), &mut errors);
    chk_unique("group", cat.groups.iter().map(|x| x.id.as_str()), &mut errors);
    chk_unique("time slot", cat.time_slots.iter().map(|x| x.id.as_str()), &mut errors);

    let teachers: HashMap<&str, &Teacher> = cat.teachers.iter().map(|t| (t.id.as_str(), t)).collect();
    let subjects: HashSet<&str> = cat.subjects.iter().map(|s| s.id.as_str()).collect();
    let rooms: HashSet<&str> = cat.classrooms.iter().map(|c| c.id.as_str()).collect();
    let slots: HashMap<&str, &TimeSlot> = cat.time_slots.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut by_day: BTreeMap<DayOfWeek, Vec<&TimeSlot>> = BTreeMap::new();
    for s in &cat.time_slots {
        if s.end <= s.start {
            errors.push(format!("time slot {} ends before it starts", s.id));
        }
        by_day.entry(s.day).or_default().push(s);
    }
    for (day, mut v) in by_day {
        v.sort_by_key(|s| s.ordinal);
        for w in v.windows(2) {
            if w[0].ordinal == w[1].ordinal {
                errors.push(format!(
                    "time slots {} and {} share ordinal {} on {day}",
                    w[0].id, w[1].id, w[0].ordinal
                ));
            } else if w[1].start < w[0].end {
                errors.push(format!(
                    "time slots {} and {} overlap or are out of order on {day}",
                    w[0].id, w[1].id
                ));
            }
        }
    }

    for t in &cat.teachers {
        if t.max_hours_per_week == 0 {
            errors.push(format!("teacher {} has max_hours_per_week=0", t.id));
        }
        for q in &t.qualifications {
            if !subjects.contains(q.as_str()) {
                errors.push(format!("teacher {} is qualified for missing subject {}", t.id, q));
            }
        }
        for (day, set) in &t.weekly_unavailability {
            for slot in set {
                match slots.get(slot.as_str()) {
                    None => errors.push(format!(
                        "teacher {} has unknown unavailable slot {}",
                        t.id, slot
                    )),
                    Some(s) if s.day != *day => errors.push(format!(
                        "teacher {} lists slot {} under {day} but it is on {}",
                        t.id, slot, s.day
                    )),
                    Some(_) => {}
                }
            }
        }
        for slot in &t.prefs.avoid_slots {
            if !slots.contains_key(slot.as_str()) {
                errors.push(format!("teacher {} avoids unknown slot {}", t.id, slot));
            }
        }
        for room in &t.prefs.preferred_rooms {
            if !rooms.contains(room.as_str()) {
                errors.push(format!("teacher {} prefers unknown classroom {}", t.id, room));
            }
        }
    }

    for s in &cat.subjects {
        for (label, h) in [
            ("weekly_lecture_hours", s.weekly_lecture_hours),
            ("weekly_lab_hours", s.weekly_lab_hours),
            ("weekly_tutorial_hours", s.weekly_tutorial_hours),
        ] {
            if !h.is_finite() || h < 0.0 {
                errors.push(format!("subject {} has invalid {label} {h}", s.id));
            }
        }
    }

    for c in &cat.classrooms {
        if c.seating_capacity == 0 {
            errors.push(format!("classroom {} has seating_capacity=0", c.id));
        }
        for slot in &c.maintenance {
            if !slots.contains_key(slot.as_str()) {
                errors.push(format!("classroom {} has unknown maintenance slot {}", c.id, slot));
            }
        }
    }

    for g in &cat.groups {
        if g.student_count == 0 {
            errors.push(format!("group {} has student_count=0", g.id));
        }
        if let Some(coord) = &g.coordinator {
            if !teachers.contains_key(coord.as_str()) {
                errors.push(format!("group {} references missing coordinator {}", g.id, coord));
            }
        }
        let mut seen = HashSet::new();
        for r in &g.requirements {
            if !seen.insert(r.subject_id.as_str()) {
                errors.push(format!("group {} requires subject {} twice", g.id, r.subject_id));
            }
            if !subjects.contains(r.subject_id.as_str()) {
                errors.push(format!(
                    "group {} references missing subject {}",
                    g.id, r.subject_id
                ));
            }
            if let Some(tid) = &r.assigned_teacher {
                match teachers.get(tid.as_str()) {
                    None => errors.push(format!(
                        "group {} assigns missing teacher {} to {}",
                        g.id, tid, r.subject_id
                    )),
                    Some(t) if !t.qualifications.contains(&r.subject_id) => errors.push(format!(
                        "group {} assigns teacher {} who is not qualified for {}",
                        g.id, tid, r.subject_id
                    )),
                    Some(_) => {}
                }
            }
            if let Some(sessions) = &r.session_types {
                let mut kinds = HashSet::new();
                for s in sessions {
                    if !kinds.insert(*s) {
                        errors.push(format!(
                            "group {} lists session type {} twice for {}",
                            g.id, s, r.subject_id
                        ));
                    }
                }
            }
        }
    }

    InputError::from_issues(errors)
}
