use types::{EntryOrigin, MoveRequest, MoveVerdict, TimetableEntry};

use crate::constraints::{ConstraintCatalog, EvalContext};
use crate::error::{EngineError, InputError};
use crate::index::EntryIndex;
use crate::snapshot::Snapshot;

/// The entry as it would look after the move.
pub fn relocated(entry: &TimetableEntry, req: &MoveRequest) -> TimetableEntry {
    TimetableEntry {
        time_slot_id: req.new_time_slot_id.clone(),
        classroom_id: req
            .new_classroom_id
            .clone()
            .unwrap_or_else(|| entry.classroom_id.clone()),
        teacher_id: req
            .new_teacher_id
            .clone()
            .unwrap_or_else(|| entry.teacher_id.clone()),
        origin: EntryOrigin::Manual,
        ..entry.clone()
    }
}

/// Checks a single-entry relocation against the unchanged rest of the set.
///
/// Only the buckets of the moved entry's teacher, classroom and group at the
/// destination slot are consulted, plus the teacher's weekly load. The verdict
/// agrees with rerunning [`crate::detect`] on the moved set: `ok` exactly when
/// the move introduces no hard conflict involving the moved entry.
pub fn validate_move(
    snapshot: &Snapshot,
    catalog: &ConstraintCatalog,
    index: &EntryIndex,
    req: &MoveRequest,
) -> Result<(MoveVerdict, TimetableEntry), EngineError> {
    let current = index
        .get(&req.entry_id)
        .ok_or_else(|| EngineError::EntryNotFound(req.entry_id.clone()))?;

    let mut issues = Vec::new();
    if snapshot.slot(&req.new_time_slot_id).is_none() {
        issues.push(format!("unknown time slot {}", req.new_time_slot_id));
    }
    if let Some(room) = &req.new_classroom_id {
        if snapshot.classroom(room).is_none() {
            issues.push(format!("unknown classroom {room}"));
        }
    }
    if let Some(teacher) = &req.new_teacher_id {
        if snapshot.teacher(teacher).is_none() {
            issues.push(format!("unknown teacher {teacher}"));
        }
    }
    if !issues.is_empty() {
        return Err(InputError { issues }.into());
    }

    let candidate = relocated(current, req);
    let ctx = EvalContext::new(snapshot, index);
    let violations = catalog.violations(&ctx, &candidate);
    Ok((
        MoveVerdict {
            ok: violations.is_empty(),
            violations,
        },
        candidate,
    ))
}
