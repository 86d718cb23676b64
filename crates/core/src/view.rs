use types::{TimetableEntry, ViewFilter};

use crate::snapshot::Snapshot;

fn admits(filter: &ViewFilter, e: &TimetableEntry) -> bool {
    match filter {
        ViewFilter::All => true,
        ViewFilter::Group(id) => &e.group_id == id,
        ViewFilter::Teacher(id) => &e.teacher_id == id,
        ViewFilter::Classroom(id) => &e.classroom_id == id,
    }
}

/// Read-only projection ordered by day, slot ordinal, then group.
pub fn project(snapshot: &Snapshot, entries: &[TimetableEntry], filter: &ViewFilter) -> Vec<TimetableEntry> {
    let mut out: Vec<TimetableEntry> = entries.iter().filter(|e| admits(filter, e)).cloned().collect();
    out.sort_by(|a, b| {
        (snapshot.grid_key(&a.time_slot_id), &a.group_id, &a.id)
            .cmp(&(snapshot.grid_key(&b.time_slot_id), &b.group_id, &b.id))
    });
    out
}
