use types::{Conflict, ConflictType, ConstraintViolation, TimetableEntry};

use crate::constraints::{ConstraintCatalog, EvalContext};
use crate::error::InputError;
use crate::index::EntryIndex;
use crate::scoring::soft_warnings;
use crate::snapshot::Snapshot;

#[derive(Clone, Copy, Debug, Default)]
pub struct DetectOptions {
    /// Also report soft findings above the policy threshold as warnings.
    pub include_soft: bool,
    /// Unix seconds stamped onto every conflict.
    pub detected_at: u64,
}

/// Every hard-constraint violation in `entries`, one record per instance.
///
/// Never mutates the entry set; works equally on generated and hand-edited
/// timetables.
pub fn detect(
    snapshot: &Snapshot,
    catalog: &ConstraintCatalog,
    entries: &[TimetableEntry],
    opts: DetectOptions,
) -> Result<Vec<Conflict>, InputError> {
    snapshot.check_entries(entries)?;
    let index = EntryIndex::build(entries.iter().cloned());
    Ok(detect_indexed(snapshot, catalog, &index, opts))
}

pub fn detect_indexed(
    snapshot: &Snapshot,
    catalog: &ConstraintCatalog,
    index: &EntryIndex,
    opts: DetectOptions,
) -> Vec<Conflict> {
    let ctx = EvalContext::new(snapshot, index);
    let mut found: Vec<(ConstraintViolation, Option<String>)> = catalog
        .hard()
        .iter()
        .flat_map(|c| c.scan(&ctx))
        .map(|v| (v, None))
        .collect();

    if opts.include_soft {
        found.extend(soft_warnings(catalog, &ctx).into_iter().map(|f| {
            (
                ConstraintViolation::new(
                    ConflictType::SoftImbalance,
                    f.entries,
                    format!("{}: {}", f.constraint, f.description),
                ),
                Some(format!("{}/{}", f.constraint, f.subject)),
            )
        }));
    }

    found.sort_by(|(a, qa), (b, qb)| {
        (a.severity, a.kind, &a.entries, qa, &a.description).cmp(&(b.severity, b.kind, &b.entries, qb, &b.description))
    });
    found
        .into_iter()
        .map(|(v, q)| Conflict::qualified(v, q.as_deref(), opts.detected_at))
        .collect()
}

/// Hard conflicts only, for callers that need a yes/no on legality.
pub fn hard_conflicts(
    snapshot: &Snapshot,
    catalog: &ConstraintCatalog,
    entries: &[TimetableEntry],
) -> Result<Vec<Conflict>, InputError> {
    detect(snapshot, catalog, entries, DetectOptions::default())
}
