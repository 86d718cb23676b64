mod common;

use std::sync::Arc;

use common::{group, request, room, single, slots, subject, teacher};
use sched_core::{hard_conflicts, ConstraintCatalog, Generator, Snapshot};
use solver_heur::HeurGenerator;
use types::{
    Catalog, DayOfWeek, EntryOrigin, GenerationMethod, Severity, TimetableEntry, UnscheduledReason,
};

fn manual(id: &str, slot: &str) -> TimetableEntry {
    TimetableEntry {
        id: id.into(),
        group_id: "g".into(),
        subject_id: "s".into(),
        teacher_id: "t1".into(),
        classroom_id: "r1".into(),
        time_slot_id: slot.into(),
        session_type: types::SessionType::Lecture,
        origin: EntryOrigin::Manual,
    }
}

#[test]
fn three_free_triples_place_everything() {
    let snap = Snapshot::new(single(3.0, 3)).unwrap();
    let out = HeurGenerator::new().run(&snap, &request(GenerationMethod::Auto)).unwrap();
    assert_eq!(out.total_classes, 3);
    assert_eq!(out.success_rate, 100.0);
    assert!(out.unscheduled.is_empty());
    assert!(!out.exhausted);

    let conflicts = hard_conflicts(&snap, &ConstraintCatalog::standard(), &out.entries).unwrap();
    assert!(conflicts.iter().all(|c| c.severity != Severity::Critical), "{conflicts:#?}");
    assert!(conflicts.is_empty());
}

#[test]
fn two_slots_leave_one_unit_unscheduled() {
    let snap = Snapshot::new(single(3.0, 2)).unwrap();
    let out = HeurGenerator::new().run(&snap, &request(GenerationMethod::Auto)).unwrap();
    assert_eq!(out.total_classes, 2);
    assert!((out.success_rate - 66.666).abs() < 0.1, "{}", out.success_rate);
    assert_eq!(out.unscheduled.len(), 1);
    assert_eq!(out.unscheduled[0].reason, UnscheduledReason::NoQualifyingSlot);
    assert_eq!(out.unscheduled[0].reason.to_string(), "no qualifying slot available");
    assert!(out.unscheduled[0].message.ends_with("no qualifying slot available"));
    assert!(!out.exhausted);
}

#[test]
fn same_seed_same_timetable() {
    let cat = Catalog {
        teachers: vec![teacher("t1", &["a", "b"]), teacher("t2", &["b", "c"])],
        subjects: vec![subject("a", 3.0), subject("b", 2.0), subject("c", 2.0)],
        classrooms: vec![room("r1", 40), room("r2", 30)],
        groups: vec![group("g1", 25, &["a", "b"]), group("g2", 30, &["b", "c"])],
        time_slots: [slots(DayOfWeek::Mon, 4), slots(DayOfWeek::Tue, 4)].concat(),
        policy: Default::default(),
    };
    let snap = Snapshot::new(cat).unwrap();
    let gen = HeurGenerator::new();
    let a = gen.run(&snap, &request(GenerationMethod::Auto)).unwrap();
    let b = gen.run(&snap, &request(GenerationMethod::Auto)).unwrap();
    assert_eq!(a.success_rate, b.success_rate);
    assert_eq!(a.entries, b.entries);
    assert_eq!(a.success_rate, 100.0);

    let mut other = request(GenerationMethod::Auto);
    other.params.seed = 7;
    let c = gen.run(&snap, &other).unwrap();
    assert_eq!(c.success_rate, a.success_rate);
}

#[test]
fn fractional_hours_are_reported_but_not_counted() {
    let snap = Snapshot::new(single(2.5, 4)).unwrap();
    let out = HeurGenerator::new().run(&snap, &request(GenerationMethod::Auto)).unwrap();
    assert_eq!(out.total_units, 2);
    assert_eq!(out.success_rate, 100.0);
    assert_eq!(out.unscheduled.len(), 1);
    assert_eq!(out.unscheduled[0].reason, UnscheduledReason::FractionalRemainder);
    assert_eq!(out.unscheduled[0].hours, 0.5);
}

#[test]
fn missing_teacher_is_named_as_the_reason() {
    let mut cat = single(2.0, 3);
    cat.teachers[0].qualifications.clear();
    let snap = Snapshot::new(cat).unwrap();
    let out = HeurGenerator::new().run(&snap, &request(GenerationMethod::Auto)).unwrap();
    assert_eq!(out.success_rate, 0.0);
    assert!(out
        .unscheduled
        .iter()
        .all(|u| u.reason == UnscheduledReason::NoQualifiedTeacher));
}

#[test]
fn hybrid_keeps_manual_entries_and_fills_the_rest() {
    let snap = Snapshot::new(single(3.0, 4)).unwrap();
    let mut req = request(GenerationMethod::Hybrid);
    let mut stale = manual("old", "mon.1");
    stale.origin = EntryOrigin::Generated;
    req.existing = vec![manual("pin", "mon.3"), stale];
    let out = HeurGenerator::new().run(&snap, &req).unwrap();
    assert_eq!(out.total_classes, 3);
    assert_eq!(out.entries.len(), 3);
    let pin = out.entries.iter().find(|e| e.id.as_str() == "pin").unwrap();
    assert_eq!(pin.time_slot_id.as_str(), "mon.3");
    assert!(out.entries.iter().all(|e| e.id.as_str() != "old"));
    assert_eq!(out.stats["pinned"], 1);
}

#[test]
fn hybrid_drops_pins_that_collide() {
    let snap = Snapshot::new(single(2.0, 4)).unwrap();
    let mut req = request(GenerationMethod::Hybrid);
    req.existing = vec![manual("a", "mon.1"), manual("b", "mon.1")];
    let out = HeurGenerator::new().run(&snap, &req).unwrap();
    assert_eq!(out.stats["dropped_pins"], 1);
    assert_eq!(out.success_rate, 100.0);
    let conflicts = hard_conflicts(&snap, &ConstraintCatalog::standard(), &out.entries).unwrap();
    assert!(conflicts.is_empty(), "{conflicts:#?}");
}

#[test]
fn manual_method_only_reports_coverage() {
    let snap = Snapshot::new(single(3.0, 4)).unwrap();
    let mut req = request(GenerationMethod::Manual);
    req.existing = vec![manual("m1", "mon.2")];
    let out = HeurGenerator::new().run(&snap, &req).unwrap();
    assert_eq!(out.entries, req.existing);
    assert_eq!(out.total_classes, 1);
    assert_eq!(out.unscheduled.len(), 2);
    assert!(out.unscheduled[0].message.contains("not covered"));
}

#[test]
fn dangling_existing_entries_are_rejected() {
    let snap = Snapshot::new(single(1.0, 2)).unwrap();
    let mut req = request(GenerationMethod::Hybrid);
    let mut bad = manual("x", "mon.1");
    bad.classroom_id = "nowhere".into();
    req.existing = vec![bad];
    assert!(HeurGenerator::new().run(&snap, &req).is_err());
}

#[test]
fn zero_timeout_cuts_repair_short() {
    let snap = Snapshot::new(single(3.0, 2)).unwrap();
    let mut req = request(GenerationMethod::Auto);
    req.params.timeout_ms = Some(0);
    let out = HeurGenerator::new().run(&snap, &req).unwrap();
    assert!(out.exhausted);
    assert_eq!(out.total_classes, 2);
    assert_eq!(out.stats["repair_attempts"], 0);
}

#[test]
fn no_units_is_full_success() {
    let mut cat = single(0.0, 2);
    cat.groups[0].requirements.clear();
    let snap = Snapshot::new(cat).unwrap();
    let out = HeurGenerator::new().run(&snap, &request(GenerationMethod::Auto)).unwrap();
    assert_eq!(out.total_units, 0);
    assert_eq!(out.success_rate, 100.0);
}

#[tokio::test]
async fn generator_trait_runs_the_same_search() {
    let snap = Arc::new(Snapshot::new(single(3.0, 3)).unwrap());
    let gen = HeurGenerator::new();
    let via_trait = gen.generate(snap.clone(), request(GenerationMethod::Auto)).await.unwrap();
    let direct = gen.run(&snap, &request(GenerationMethod::Auto)).unwrap();
    assert_eq!(via_trait.entries, direct.entries);
}
