#![allow(dead_code)]

use types::{
    Catalog, Classroom, ClockTime, DayOfWeek, GroupRequirement, RoomType, StudentGroup, Subject,
    Teacher, TimeSlot,
};

pub fn slots(day: DayOfWeek, n: u32) -> Vec<TimeSlot> {
    (1..=n)
        .map(|ordinal| {
            let start = 8 * 60 + (ordinal as u16 - 1) * 50;
            TimeSlot {
                id: format!("{day}.{ordinal}").as_str().into(),
                day,
                start: ClockTime::new(start / 60, start % 60).unwrap(),
                end: ClockTime::new((start + 45) / 60, (start + 45) % 60).unwrap(),
                ordinal,
                kind: Default::default(),
            }
        })
        .collect()
}

pub fn teacher(id: &str, subjects: &[&str]) -> Teacher {
    Teacher {
        id: id.into(),
        code: id.to_uppercase(),
        name: String::new(),
        qualifications: subjects.iter().map(|&s| s.into()).collect(),
        max_hours_per_week: 20,
        weekly_unavailability: Default::default(),
        prefs: Default::default(),
    }
}

pub fn subject(id: &str, lecture_hours: f64) -> Subject {
    Subject {
        id: id.into(),
        code: id.to_uppercase(),
        name: String::new(),
        kind: Default::default(),
        weekly_lecture_hours: lecture_hours,
        weekly_lab_hours: 0.0,
        weekly_tutorial_hours: 0.0,
        required_room_type: None,
        min_room_capacity: 0,
    }
}

pub fn room(id: &str, capacity: u32) -> Classroom {
    Classroom {
        id: id.into(),
        room_number: id.to_uppercase(),
        name: String::new(),
        room_type: RoomType::LectureHall,
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

/// One teacher, one subject of `hours` lectures, one room, one group, `n` Monday slots.
pub fn single(hours: f64, n: u32) -> Catalog {
    Catalog {
        teachers: vec![teacher("t1", &["s"])],
        subjects: vec![subject("s", hours)],
        classrooms: vec![room("r1", 30)],
        groups: vec![group("g", 25, &["s"])],
        time_slots: slots(DayOfWeek::Mon, n),
        policy: Default::default(),
    }
}

pub fn request(method: types::GenerationMethod) -> sched_core::GenerationRequest {
    sched_core::GenerationRequest {
        scope: types::Scope::new("2024-25", 1),
        method,
        params: Default::default(),
        existing: Vec::new(),
    }
}
