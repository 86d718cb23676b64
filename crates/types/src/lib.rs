use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(TeacherId);
id_newtype!(SubjectId);
id_newtype!(ClassroomId);
id_newtype!(GroupId);
id_newtype!(TimeSlotId);
id_newtype!(EntryId);
id_newtype!(ConflictId);

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 6] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
    ];
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
        };
        f.write_str(s)
    }
}

/// Wall-clock time of day with minute precision, written as `HH:MM`.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct ClockTime(u16);

impl ClockTime {
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got {s:?}"))?;
        let hour = h.parse::<u16>().map_err(|e| format!("bad hour in {s:?}: {e}"))?;
        let minute = m.parse::<u16>().map_err(|e| format!("bad minute in {s:?}: {e}"))?;
        ClockTime::new(hour, minute).ok_or_else(|| format!("time out of range: {s:?}"))
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    #[default]
    Regular,
    LabSession,
    ShortBreak,
    LunchBreak,
    ExtraCurricular,
}

impl SlotKind {
    pub fn is_teachable(self) -> bool {
        matches!(self, SlotKind::Regular | SlotKind::LabSession)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub day: DayOfWeek,
    #[schema(value_type = String, example = "09:00")]
    #[schemars(with = "String")]
    pub start: ClockTime,
    #[schema(value_type = String, example = "09:45")]
    #[schemars(with = "String")]
    pub end: ClockTime,
    pub ordinal: u32,
    #[serde(default)]
    pub kind: SlotKind,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Lecture,
    Lab,
    Tutorial,
}

impl SessionType {
    pub const ALL: [SessionType; 3] = [SessionType::Lecture, SessionType::Lab, SessionType::Tutorial];
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionType::Lecture => "lecture",
            SessionType::Lab => "lab",
            SessionType::Tutorial => "tutorial",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    LectureHall,
    ComputerLab,
    ScienceLab,
    TutorialRoom,
    Auditorium,
    Workshop,
}

impl RoomType {
    /// Facility tag that stands in for this room type on rooms of another type.
    pub fn tag(self) -> &'static str {
        match self {
            RoomType::LectureHall => "lecture_hall",
            RoomType::ComputerLab => "computer_lab",
            RoomType::ScienceLab => "science_lab",
            RoomType::TutorialRoom => "tutorial_room",
            RoomType::Auditorium => "auditorium",
            RoomType::Workshop => "workshop",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TeacherPrefs {
    #[serde(default)]
    pub preferred_days: Vec<DayOfWeek>,
    #[serde(default)]
    pub avoid_slots: Vec<TimeSlotId>,
    #[serde(default)]
    pub preferred_rooms: Vec<ClassroomId>,
    #[serde(default)]
    pub max_per_day: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qualifications: BTreeSet<SubjectId>,
    pub max_hours_per_week: u32,
    #[serde(default)]
    pub weekly_unavailability: BTreeMap<DayOfWeek, BTreeSet<TimeSlotId>>,
    #[serde(default)]
    pub prefs: TeacherPrefs,
}

impl Teacher {
    pub fn is_unavailable(&self, slot: &TimeSlot) -> bool {
        self.weekly_unavailability
            .get(&slot.day)
            .is_some_and(|slots| slots.contains(&slot.id))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    #[default]
    Lecture,
    Lab,
    Tutorial,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: SubjectKind,
    #[serde(default)]
    pub weekly_lecture_hours: f64,
    #[serde(default)]
    pub weekly_lab_hours: f64,
    #[serde(default)]
    pub weekly_tutorial_hours: f64,
    #[serde(default)]
    pub required_room_type: Option<RoomType>,
    #[serde(default)]
    pub min_room_capacity: u32,
}

impl Subject {
    pub fn hours_for(&self, session: SessionType) -> f64 {
        match session {
            SessionType::Lecture => self.weekly_lecture_hours,
            SessionType::Lab => self.weekly_lab_hours,
            SessionType::Tutorial => self.weekly_tutorial_hours,
        }
    }

    pub fn total_weekly_hours(&self) -> f64 {
        self.weekly_lecture_hours + self.weekly_lab_hours + self.weekly_tutorial_hours
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Classroom {
    pub id: ClassroomId,
    pub room_number: String,
    #[serde(default)]
    pub name: String,
    pub room_type: RoomType,
    pub seating_capacity: u32,
    #[serde(default)]
    pub facilities: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub maintenance: BTreeSet<TimeSlotId>,
}

impl Classroom {
    pub fn satisfies(&self, required: RoomType) -> bool {
        self.room_type == required || self.facilities.contains(required.tag())
    }
}

fn default_priority() -> u8 {
    1
}

/// One subject a group has to take, optionally narrowed to some session types.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GroupRequirement {
    pub subject_id: SubjectId,
    #[serde(default)]
    pub session_types: Option<Vec<SessionType>>,
    #[serde(default)]
    pub assigned_teacher: Option<TeacherId>,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Scope {
    pub academic_year: String,
    pub semester: u8,
}

impl Scope {
    pub fn new(academic_year: impl Into<String>, semester: u8) -> Self {
        Self {
            academic_year: academic_year.into(),
            semester,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.academic_year, self.semester)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct StudentGroup {
    pub id: GroupId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub academic_year: String,
    pub semester: u8,
    pub student_count: u32,
    #[serde(default)]
    pub requirements: Vec<GroupRequirement>,
    #[serde(default)]
    pub coordinator: Option<TeacherId>,
}

impl StudentGroup {
    pub fn scope(&self) -> Scope {
        Scope::new(self.academic_year.clone(), self.semester)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    #[default]
    Generated,
    Manual,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct TimetableEntry {
    pub id: EntryId,
    pub group_id: GroupId,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    pub classroom_id: ClassroomId,
    pub time_slot_id: TimeSlotId,
    pub session_type: SessionType,
    #[serde(default)]
    pub origin: EntryOrigin,
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    TeacherDoubleBooking,
    ClassroomDoubleBooking,
    GroupDoubleBooking,
    TeacherUnavailable,
    TeacherUnqualified,
    CapacityExceeded,
    RoomUnsuitable,
    NonTeachingSlot,
    WeeklyHoursExceeded,
    SoftImbalance,
}

impl ConflictType {
    /// Fixed severity mapping; callers cannot override it.
    pub fn severity(self) -> Severity {
        match self {
            ConflictType::TeacherDoubleBooking
            | ConflictType::ClassroomDoubleBooking
            | ConflictType::GroupDoubleBooking
            | ConflictType::TeacherUnavailable
            | ConflictType::TeacherUnqualified => Severity::Critical,
            ConflictType::CapacityExceeded
            | ConflictType::RoomUnsuitable
            | ConflictType::NonTeachingSlot => Severity::Major,
            ConflictType::WeeklyHoursExceeded => Severity::Minor,
            ConflictType::SoftImbalance => Severity::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConflictType::TeacherDoubleBooking => "teacher_double_booking",
            ConflictType::ClassroomDoubleBooking => "classroom_double_booking",
            ConflictType::GroupDoubleBooking => "group_double_booking",
            ConflictType::TeacherUnavailable => "teacher_unavailable",
            ConflictType::TeacherUnqualified => "teacher_unqualified",
            ConflictType::CapacityExceeded => "capacity_exceeded",
            ConflictType::RoomUnsuitable => "room_unsuitable",
            ConflictType::NonTeachingSlot => "non_teaching_slot",
            ConflictType::WeeklyHoursExceeded => "weekly_hours_exceeded",
            ConflictType::SoftImbalance => "soft_imbalance",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from most to least severe.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Major,
    Minor,
    Warning,
}

/// A single rule violation, before it is stamped into a [`Conflict`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConflictType,
    pub severity: Severity,
    pub entries: Vec<EntryId>,
    pub description: String,
}

impl ConstraintViolation {
    pub fn new(kind: ConflictType, mut entries: Vec<EntryId>, description: impl Into<String>) -> Self {
        entries.sort();
        entries.dedup();
        Self {
            kind,
            severity: kind.severity(),
            entries,
            description: description.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct Conflict {
    pub id: ConflictId,
    pub entries: Vec<EntryId>,
    pub conflict_type: ConflictType,
    pub description: String,
    pub severity: Severity,
    pub detected_at: u64,
}

impl Conflict {
    pub fn from_violation(v: ConstraintViolation, detected_at: u64) -> Self {
        Self::qualified(v, None, detected_at)
    }

    /// `qualifier` tells apart instances that share a type and entry set,
    /// e.g. two soft findings over the same day.
    pub fn qualified(v: ConstraintViolation, qualifier: Option<&str>, detected_at: u64) -> Self {
        let ids: Vec<&str> = v.entries.iter().map(|e| e.as_str()).collect();
        let id = match qualifier {
            Some(q) => format!("{}/{}:{}", v.kind, q, ids.join("+")),
            None => format!("{}:{}", v.kind, ids.join("+")),
        };
        Self {
            id: ConflictId(id),
            entries: v.entries,
            conflict_type: v.kind,
            description: v.description,
            severity: v.severity,
            detected_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SoftWeights {
    #[serde(default = "SoftWeights::default_daily_load")]
    pub daily_load: f64,
    #[serde(default = "SoftWeights::default_gaps")]
    pub gaps: f64,
    #[serde(default = "SoftWeights::default_preferences")]
    pub preferences: f64,
}

impl SoftWeights {
    fn default_daily_load() -> f64 {
        2.0
    }
    fn default_gaps() -> f64 {
        1.0
    }
    fn default_preferences() -> f64 {
        3.0
    }
}

impl Default for SoftWeights {
    fn default() -> Self {
        Self {
            daily_load: Self::default_daily_load(),
            gaps: Self::default_gaps(),
            preferences: Self::default_preferences(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Policy {
    #[serde(default)]
    pub soft_weights: SoftWeights,
    /// Periods per day above which a teacher's day counts as overloaded.
    #[serde(default = "Policy::default_daily_load_limit")]
    pub daily_load_limit: u32,
    /// Weighted soft penalty a single finding must exceed to be reported.
    #[serde(default = "Policy::default_warning_threshold")]
    pub warning_threshold: f64,
}

impl Policy {
    fn default_daily_load_limit() -> u32 {
        4
    }
    fn default_warning_threshold() -> f64 {
        2.0
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            soft_weights: SoftWeights::default(),
            daily_load_limit: Self::default_daily_load_limit(),
            warning_threshold: Self::default_warning_threshold(),
        }
    }
}

/// Entity pools as handed over by the storage collaborator.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Catalog {
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    #[serde(default)]
    pub groups: Vec<StudentGroup>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub policy: Policy,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    #[default]
    Auto,
    Hybrid,
    Manual,
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationMethod::Auto => "auto",
            GenerationMethod::Hybrid => "hybrid",
            GenerationMethod::Manual => "manual",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerationParams {
    #[serde(default = "GenerationParams::default_seed")]
    pub seed: u64,
    #[serde(default = "GenerationParams::default_repair_iterations")]
    pub repair_iterations: u32,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "GenerationParams::default_lookahead_weight")]
    pub lookahead_weight: f64,
}

impl GenerationParams {
    fn default_seed() -> u64 {
        42
    }
    fn default_repair_iterations() -> u32 {
        200
    }
    fn default_lookahead_weight() -> f64 {
        0.1
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            repair_iterations: Self::default_repair_iterations(),
            timeout_ms: None,
            lookahead_weight: Self::default_lookahead_weight(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum UnscheduledReason {
    NoQualifiedTeacher,
    NoSuitableRoom,
    NoQualifyingSlot,
    FractionalRemainder,
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnscheduledReason::NoQualifiedTeacher => "no qualified teacher available",
            UnscheduledReason::NoSuitableRoom => "no suitable classroom available",
            UnscheduledReason::NoQualifyingSlot => "no qualifying slot available",
            UnscheduledReason::FractionalRemainder => "fractional hours cannot fill a slot",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Unscheduled {
    pub group_id: GroupId,
    pub subject_id: SubjectId,
    pub session_type: SessionType,
    /// Slot-length units left unplaced; fractional only for remainders.
    pub hours: f64,
    pub reason: UnscheduledReason,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerationOutcome {
    pub entries: Vec<TimetableEntry>,
    pub total_classes: u32,
    pub total_units: u32,
    /// Percentage of requirement units placed, 0–100.
    pub success_rate: f64,
    pub unscheduled: Vec<Unscheduled>,
    /// Repair ran out of its iteration or time budget with units still unplaced.
    pub exhausted: bool,
    pub objective: f64,
    #[schema(value_type = Object)]
    pub stats: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerationSummary {
    pub generation_id: String,
    pub scope: Scope,
    pub method: GenerationMethod,
    pub total_classes: u32,
    pub success_rate: f64,
    pub unscheduled: Vec<Unscheduled>,
    pub exhausted: bool,
    pub conflicts: usize,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Completed,
    Partial,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerationRecord {
    pub id: String,
    pub scope: Scope,
    pub method: GenerationMethod,
    pub status: GenerationStatus,
    pub total_classes: u32,
    pub total_units: u32,
    pub success_rate: f64,
    pub elapsed_ms: u64,
    pub seed: u64,
    pub created_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct MoveRequest {
    pub entry_id: EntryId,
    pub new_time_slot_id: TimeSlotId,
    #[serde(default)]
    pub new_classroom_id: Option<ClassroomId>,
    #[serde(default)]
    pub new_teacher_id: Option<TeacherId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct MoveVerdict {
    pub ok: bool,
    pub violations: Vec<ConstraintViolation>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct CommitOutcome {
    pub ok: bool,
    pub violations: Vec<ConstraintViolation>,
    /// The relocated entry, present when the move was applied.
    #[serde(default)]
    pub entry: Option<TimetableEntry>,
    pub version: u64,
}

/// Single filter parameter for the read-only timetable projection.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "by", content = "id", rename_all = "lowercase")]
pub enum ViewFilter {
    #[default]
    All,
    Group(GroupId),
    Teacher(TeacherId),
    Classroom(ClassroomId),
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SoftBreakdown {
    pub daily_overload: f64,
    pub group_gaps: f64,
    pub preference_misses: f64,
    pub objective: f64,
    pub gaps_by_group: BTreeMap<String, f64>,
    pub overload_by_teacher: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct EngineStats {
    pub teachers: usize,
    pub subjects: usize,
    pub classrooms: usize,
    pub groups: usize,
    pub time_slots: usize,
    pub entries: usize,
    pub generations: usize,
    pub last_generation: Option<GenerationRecord>,
}
