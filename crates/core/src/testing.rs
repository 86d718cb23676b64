use types::{
    Catalog, ClassroomId, ClockTime, DayOfWeek, EntryId, EntryOrigin, GroupRequirement, Policy,
    RoomType, SessionType, SlotKind, StudentGroup, Subject, SubjectKind, Teacher, TimeSlot,
    TimetableEntry,
};

use crate::{EntryIndex, EvalContext, Snapshot};

pub fn slot(id: &str, day: DayOfWeek, ordinal: u32) -> TimeSlot {
    let start = 9 * 60 + (ordinal as u16 - 1) * 45;
    TimeSlot {
        id: id.into(),
        day,
        start: ClockTime::new(start / 60, start % 60).unwrap(),
        end: ClockTime::new((start + 45) / 60, (start + 45) % 60).unwrap(),
        ordinal,
        kind: SlotKind::Regular,
    }
}

pub fn subject(id: &str, lecture: f64) -> Subject {
    Subject {
        id: id.into(),
        code: id.to_uppercase(),
        name: String::new(),
        kind: SubjectKind::Lecture,
        weekly_lecture_hours: lecture,
        weekly_lab_hours: 0.0,
        weekly_tutorial_hours: 0.0,
        required_room_type: None,
        min_room_capacity: 0,
    }
}

pub fn teacher(id: &str, subjects: &[&str], max_hours: u32) -> Teacher {
    Teacher {
        id: id.into(),
        code: id.to_uppercase(),
        name: String::new(),
        qualifications: subjects.iter().map(|&s| s.into()).collect(),
        max_hours_per_week: max_hours,
        weekly_unavailability: Default::default(),
        prefs: Default::default(),
    }
}

pub fn room(id: &str, room_type: RoomType, capacity: u32) -> types::Classroom {
    types::Classroom {
        id: ClassroomId::from(id),
        room_number: id.to_uppercase(),
        name: String::new(),
        room_type,
        seating_capacity: capacity,
        facilities: Default::default(),
        is_active: true,
        maintenance: Default::default(),
    }
}

pub fn group(id: &str, students: u32, subjects: &[&str]) -> StudentGroup {
    StudentGroup {
        id: id.into(),
        code: id.to_uppercase(),
        name: String::new(),
        academic_year: "2024-25".into(),
        semester: 1,
        student_count: students,
        requirements: subjects
            .iter()
            .map(|&s| GroupRequirement {
                subject_id: s.into(),
                session_types: None,
                assigned_teacher: None,
                priority: 1,
            })
            .collect(),
        coordinator: None,
    }
}

/// Two days of four slots, two teachers, a lecture hall and a computer lab.
pub fn catalog() -> Catalog {
    let mut cs = subject("cs", 2.0);
    cs.required_room_type = Some(RoomType::ComputerLab);
    Catalog {
        teachers: vec![teacher("t1", &["math"], 20), teacher("t2", &["math", "cs"], 3)],
        subjects: vec![subject("math", 3.0), cs],
        classrooms: vec![
            room("r1", RoomType::LectureHall, 40),
            room("r2", RoomType::ComputerLab, 20),
        ],
        groups: vec![group("g1", 30, &["math"]), group("g2", 15, &["cs"])],
        time_slots: (1..=4)
            .map(|i| slot(&format!("mon.{i}"), DayOfWeek::Mon, i))
            .chain((1..=4).map(|i| slot(&format!("tue.{i}"), DayOfWeek::Tue, i)))
            .collect(),
        policy: Policy::default(),
    }
}

pub fn entry(id: &str, group: &str, teacher: &str, room: &str, slot: &str) -> TimetableEntry {
    TimetableEntry {
        id: EntryId::from(id),
        group_id: group.into(),
        subject_id: "math".into(),
        teacher_id: teacher.into(),
        classroom_id: room.into(),
        time_slot_id: slot.into(),
        session_type: SessionType::Lecture,
        origin: EntryOrigin::Manual,
    }
}

pub fn with_ctx<R>(snap: &Snapshot, entries: &[TimetableEntry], f: impl FnOnce(&EvalContext<'_>) -> R) -> R {
    let index = EntryIndex::build(entries.iter().cloned());
    let ctx = EvalContext::new(snap, &index);
    f(&ctx)
}
