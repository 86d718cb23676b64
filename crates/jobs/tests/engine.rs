use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jobs::{Dataset, Engine, InMemJobs, InMemRepository, JobStatus, Repository, Versioned};
use parking_lot::Mutex;
use sched_core::{EngineError, GenerationRequest, Generator, Snapshot};
use solver_heur::HeurGenerator;
use tokio::sync::Notify;
use types::{
    Catalog, Classroom, ClockTime, Conflict, ConflictType, DayOfWeek, EntryId, EntryOrigin,
    GenerationMethod, GenerationOutcome, GenerationRecord, GenerationStatus, GroupRequirement,
    MoveRequest, RoomType, Scope, SessionType, Severity, StudentGroup, Subject, Teacher, TimeSlot,
    TimetableEntry, ViewFilter,
};

fn first() -> Scope {
    Scope::new("2024-25", 1)
}

fn second() -> Scope {
    Scope::new("2024-25", 2)
}

fn catalog() -> Catalog {
    let mut time_slots = Vec::new();
    for day in [DayOfWeek::Mon, DayOfWeek::Tue] {
        for ordinal in 1..=3u32 {
            let start = 9 * 60 + (ordinal as u16 - 1) * 60;
            time_slots.push(TimeSlot {
                id: format!("{day}.{ordinal}").as_str().into(),
                day,
                start: ClockTime::new(start / 60, 0).unwrap(),
                end: ClockTime::new(start / 60, 45).unwrap(),
                ordinal,
                kind: Default::default(),
            });
        }
    }
    let teacher = |id: &str| Teacher {
        id: id.into(),
        code: id.to_uppercase(),
        name: String::new(),
        qualifications: ["math".into()].into_iter().collect(),
        max_hours_per_week: 10,
        weekly_unavailability: Default::default(),
        prefs: Default::default(),
    };
    let room = |id: &str| Classroom {
        id: id.into(),
        room_number: id.to_uppercase(),
        name: String::new(),
        room_type: RoomType::LectureHall,
        seating_capacity: 40,
        facilities: Default::default(),
        is_active: true,
        maintenance: Default::default(),
    };
    let group = |id: &str, semester: u8, needs: &[&str]| StudentGroup {
        id: id.into(),
        code: id.to_uppercase(),
        name: String::new(),
        academic_year: "2024-25".into(),
        semester,
        student_count: 25,
        requirements: needs
            .iter()
            .map(|&s| GroupRequirement {
                subject_id: s.into(),
                session_types: None,
                assigned_teacher: None,
                priority: 1,
            })
            .collect(),
        coordinator: None,
    };
    Catalog {
        teachers: vec![teacher("t1"), teacher("t2")],
        subjects: vec![Subject {
            id: "math".into(),
            code: "MATH".into(),
            name: String::new(),
            kind: Default::default(),
            weekly_lecture_hours: 2.0,
            weekly_lab_hours: 0.0,
            weekly_tutorial_hours: 0.0,
            required_room_type: None,
            min_room_capacity: 0,
        }],
        classrooms: vec![room("r1"), room("r2")],
        groups: vec![
            group("g1", 1, &["math"]),
            group("g3", 1, &[]),
            group("g2", 2, &["math"]),
        ],
        time_slots,
        policy: Default::default(),
    }
}

fn entry(id: &str, group: &str, teacher: &str, room: &str, slot: &str) -> TimetableEntry {
    TimetableEntry {
        id: id.into(),
        group_id: group.into(),
        subject_id: "math".into(),
        teacher_id: teacher.into(),
        classroom_id: room.into(),
        time_slot_id: slot.into(),
        session_type: SessionType::Lecture,
        origin: EntryOrigin::Manual,
    }
}

fn seeded(entries: Vec<TimetableEntry>) -> Arc<InMemRepository> {
    Arc::new(
        InMemRepository::from_dataset(Dataset {
            catalog: catalog(),
            entries,
        })
        .unwrap(),
    )
}

fn move_to(id: &str, slot: &str) -> MoveRequest {
    MoveRequest {
        entry_id: id.into(),
        new_time_slot_id: slot.into(),
        new_classroom_id: None,
        new_teacher_id: None,
    }
}

#[tokio::test]
async fn generation_replaces_the_scope_and_is_recorded() {
    let repo = seeded(vec![entry("old", "g1", "t1", "r1", "mon.1")]);
    let engine = Engine::new(HeurGenerator::new(), repo.clone());

    let summary = engine
        .generate(first(), GenerationMethod::Auto, None)
        .await
        .unwrap();
    assert_eq!(summary.total_classes, 2);
    assert_eq!(summary.success_rate, 100.0);
    assert_eq!(summary.conflicts, 0);

    let stored = repo.entries(&first()).await.unwrap();
    assert_eq!(stored.value.len(), 2);
    assert!(stored.value.iter().all(|e| e.id.as_str() != "old"));
    assert!(repo.entries(&second()).await.unwrap().value.is_empty());

    let stats = engine.stats().await.unwrap();
    assert_eq!(stats.generations, 1);
    assert_eq!(stats.entries, 2);
    let last = stats.last_generation.unwrap();
    assert_eq!(last.status, GenerationStatus::Completed);
    assert_eq!(last.seed, 42);
}

struct Gate {
    inner: HeurGenerator,
    armed: AtomicBool,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Generator for Gate {
    async fn generate(
        &self,
        snapshot: Arc<Snapshot>,
        req: GenerationRequest,
    ) -> Result<GenerationOutcome, EngineError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.generate(snapshot, req).await
    }
}

#[tokio::test]
async fn one_generation_per_scope_at_a_time() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let gate = Gate {
        inner: HeurGenerator::new(),
        armed: AtomicBool::new(true),
        entered: entered.clone(),
        release: release.clone(),
    };
    let engine = Arc::new(Engine::new(gate, seeded(Vec::new())));

    let running = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.generate(first(), GenerationMethod::Auto, None).await })
    };
    entered.notified().await;

    let err = engine
        .generate(first(), GenerationMethod::Auto, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ScopeBusy(ref s) if *s == first()));

    // other scopes are unaffected
    let other = engine
        .generate(second(), GenerationMethod::Auto, None)
        .await
        .unwrap();
    assert_eq!(other.total_classes, 2);

    release.notify_one();
    let done = running.await.unwrap().unwrap();
    assert_eq!(done.success_rate, 100.0);

    // the lock is free again
    assert!(engine.generate(first(), GenerationMethod::Auto, None).await.is_ok());
}

#[tokio::test]
async fn commit_applies_a_legal_move_and_bumps_the_version() {
    let repo = seeded(vec![
        entry("e1", "g1", "t1", "r1", "mon.1"),
        entry("e2", "g1", "t1", "r1", "mon.2"),
    ]);
    let engine = Engine::new(HeurGenerator::new(), repo.clone());

    let verdict = engine.validate_move(&move_to("e1", "mon.2")).await.unwrap();
    assert!(!verdict.ok);
    let kinds: Vec<_> = verdict.violations.iter().map(|v| v.kind).collect();
    assert!(kinds.contains(&ConflictType::ClassroomDoubleBooking));

    let rejected = engine.commit_move(&move_to("e1", "mon.2")).await.unwrap();
    assert!(!rejected.ok);
    assert!(rejected.entry.is_none());
    assert_eq!(rejected.version, 1);

    let done = engine.commit_move(&move_to("e1", "tue.1")).await.unwrap();
    assert!(done.ok);
    assert_eq!(done.version, 2);
    let moved = done.entry.unwrap();
    assert_eq!(moved.time_slot_id.as_str(), "tue.1");
    assert_eq!(moved.origin, EntryOrigin::Manual);

    let stored = repo.entries(&first()).await.unwrap();
    let e1 = stored.value.iter().find(|e| e.id.as_str() == "e1").unwrap();
    assert_eq!(e1.time_slot_id.as_str(), "tue.1");
}

#[tokio::test]
async fn unknown_entries_are_reported() {
    let engine = Engine::new(HeurGenerator::new(), seeded(Vec::new()));
    let err = engine.commit_move(&move_to("ghost", "mon.1")).await.unwrap_err();
    assert!(matches!(err, EngineError::EntryNotFound(_)));
}

/// Lets another writer land between a commit's optimistic read and its
/// locked re-read.
struct Racing {
    inner: Arc<InMemRepository>,
    reads: AtomicUsize,
    sneak: Mutex<Option<TimetableEntry>>,
}

#[async_trait]
impl Repository for Racing {
    async fn catalog(&self) -> Result<Catalog, EngineError> {
        self.inner.catalog().await
    }

    async fn entries(&self, scope: &Scope) -> Result<Versioned<Vec<TimetableEntry>>, EngineError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 1 {
            let sneak = self.sneak.lock().take();
            if let Some(e) = sneak {
                let v = self.inner.entries(scope).await?.version;
                self.inner.update_entry(scope, v, e).await?;
            }
        }
        self.inner.entries(scope).await
    }

    async fn replace_entries(&self, scope: &Scope, entries: Vec<TimetableEntry>) -> Result<u64, EngineError> {
        self.inner.replace_entries(scope, entries).await
    }

    async fn find_entry(&self, id: &EntryId) -> Result<Option<(Scope, TimetableEntry)>, EngineError> {
        self.inner.find_entry(id).await
    }

    async fn update_entry(&self, scope: &Scope, expected: u64, entry: TimetableEntry) -> Result<u64, EngineError> {
        self.inner.update_entry(scope, expected, entry).await
    }

    async fn delete_entry(&self, scope: &Scope, id: &EntryId) -> Result<u64, EngineError> {
        self.inner.delete_entry(scope, id).await
    }

    async fn append_conflicts(&self, scope: &Scope, conflicts: Vec<Conflict>) -> Result<(), EngineError> {
        self.inner.append_conflicts(scope, conflicts).await
    }

    async fn record_generation(&self, record: GenerationRecord) -> Result<(), EngineError> {
        self.inner.record_generation(record).await
    }

    async fn generations(&self) -> Result<Vec<GenerationRecord>, EngineError> {
        self.inner.generations().await
    }

    async fn entry_count(&self) -> Result<usize, EngineError> {
        self.inner.entry_count().await
    }
}

fn racing(sneak: TimetableEntry) -> Arc<Racing> {
    Arc::new(Racing {
        inner: seeded(vec![
            entry("e1", "g1", "t1", "r1", "mon.1"),
            entry("e2", "g3", "t2", "r2", "mon.2"),
        ]),
        reads: AtomicUsize::new(0),
        sneak: Mutex::new(Some(sneak)),
    })
}

#[tokio::test]
async fn a_commit_that_lost_the_race_is_a_concurrent_modification() {
    // e2 moves into r1 at mon.3 while e1 is being moved there
    let repo = racing(entry("e2", "g3", "t2", "r1", "mon.3"));
    let engine = Engine::new(HeurGenerator::new(), repo.clone());

    let err = engine.commit_move(&move_to("e1", "mon.3")).await.unwrap_err();
    assert!(matches!(err, EngineError::ConcurrentModification { .. }), "{err}");
    assert_eq!(err.kind(), "concurrent_modification");

    let stored = repo.entries(&first()).await.unwrap();
    let e1 = stored.value.iter().find(|e| e.id.as_str() == "e1").unwrap();
    assert_eq!(e1.time_slot_id.as_str(), "mon.1");
}

#[tokio::test]
async fn a_commit_still_legal_after_a_newer_write_goes_through() {
    let repo = racing(entry("e2", "g3", "t2", "r2", "tue.1"));
    let engine = Engine::new(HeurGenerator::new(), repo);

    let done = engine.commit_move(&move_to("e1", "mon.3")).await.unwrap();
    assert!(done.ok);
    assert_eq!(done.version, 3);
}

#[tokio::test]
async fn hand_edited_double_booking_is_one_critical_conflict() {
    let repo = seeded(vec![
        entry("e1", "g1", "t1", "r1", "mon.1"),
        entry("e2", "g3", "t1", "r2", "mon.1"),
    ]);
    let engine = Engine::new(HeurGenerator::new(), repo.clone());

    let found = engine.list_conflicts(&first(), false).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Critical);
    assert_eq!(found[0].conflict_type, ConflictType::TeacherDoubleBooking);
    assert_eq!(found[0].entries, vec![EntryId::from("e1"), EntryId::from("e2")]);

    // re-detection keeps one stored record per instance
    engine.list_conflicts(&first(), false).await.unwrap();
    assert_eq!(repo.stored_conflicts(&first()).len(), 1);
}

#[tokio::test]
async fn view_filters_on_one_parameter() {
    let repo = seeded(vec![
        entry("e2", "g3", "t2", "r2", "mon.2"),
        entry("e1", "g1", "t1", "r1", "mon.1"),
        entry("e3", "g1", "t1", "r1", "tue.1"),
    ]);
    let engine = Engine::new(HeurGenerator::new(), repo);

    let all = engine.view(&first(), &ViewFilter::All).await.unwrap();
    let ids: Vec<_> = all.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e1", "e2", "e3"]);

    let t1 = engine
        .view(&first(), &ViewFilter::Teacher("t1".into()))
        .await
        .unwrap();
    assert_eq!(t1.len(), 2);
    let g3 = engine
        .view(&first(), &ViewFilter::Group("g3".into()))
        .await
        .unwrap();
    assert_eq!(g3.len(), 1);
}

#[tokio::test]
async fn explain_breaks_down_the_soft_score() {
    let repo = seeded(vec![
        entry("e1", "g1", "t1", "r1", "mon.1"),
        entry("e2", "g1", "t1", "r1", "mon.3"),
    ]);
    let engine = Engine::new(HeurGenerator::new(), repo);
    let soft = engine.explain(&first()).await.unwrap();
    assert_eq!(soft.group_gaps, 1.0);
    assert_eq!(soft.gaps_by_group["g1"], 1.0);
}

#[tokio::test]
async fn removing_an_entry_bumps_the_version() {
    let repo = seeded(vec![entry("e1", "g1", "t1", "r1", "mon.1")]);
    let engine = Engine::new(HeurGenerator::new(), repo.clone());
    assert_eq!(engine.remove_entry(&"e1".into()).await.unwrap(), 2);
    assert!(repo.entries(&first()).await.unwrap().value.is_empty());
    assert!(matches!(
        engine.remove_entry(&"e1".into()).await,
        Err(EngineError::EntryNotFound(_))
    ));
}

#[tokio::test]
async fn queued_jobs_finish_with_a_summary() {
    let engine = Arc::new(Engine::new(HeurGenerator::new(), seeded(Vec::new())));
    let jobs = InMemJobs::new(engine);
    let id = jobs.enqueue(first(), GenerationMethod::Auto, None);

    let mut status = jobs.get(&id.0).unwrap();
    for _ in 0..200 {
        if matches!(status, JobStatus::Completed { .. } | JobStatus::Failed { .. }) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        status = jobs.get(&id.0).unwrap();
    }
    match status {
        JobStatus::Completed { summary } => assert_eq!(summary.total_classes, 2),
        other => panic!("job did not complete: {other:?}"),
    }
    assert!(jobs.get("nope").is_none());

    let json = serde_json::to_value(JobStatus::Queued).unwrap();
    assert_eq!(json, serde_json::json!({"status": "queued"}));
}
