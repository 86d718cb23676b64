use types::{
    GroupId, Scope, SessionType, SubjectId, TeacherId, Unscheduled, UnscheduledReason,
};

use crate::snapshot::Snapshot;

/// One slot-length instance of a group's weekly requirement for a subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequirementUnit {
    pub id: String,
    pub group_id: GroupId,
    pub subject_id: SubjectId,
    pub session_type: SessionType,
    pub priority: u8,
    pub assigned_teacher: Option<TeacherId>,
}

impl RequirementUnit {
    /// Units of the same (group, subject, session type) are interchangeable.
    pub fn matches(&self, group: &GroupId, subject: &SubjectId, session: SessionType) -> bool {
        &self.group_id == group && &self.subject_id == subject && self.session_type == session
    }
}

#[derive(Clone, Debug, Default)]
pub struct Expansion {
    pub units: Vec<RequirementUnit>,
    /// Fractional hours that cannot fill a whole slot.
    pub remainders: Vec<Unscheduled>,
}

const EPS: f64 = 1e-9;

/// Expands every group of the scope into requirement units, one per whole
/// weekly hour; groups and subjects are visited in catalog order.
pub fn expand(snapshot: &Snapshot, scope: &Scope) -> Expansion {
    let mut out = Expansion::default();
    for group in snapshot.groups_in(scope) {
        for req in &group.requirements {
            let Some(subject) = snapshot.subject(&req.subject_id) else {
                continue;
            };
            let sessions: Vec<SessionType> = match &req.session_types {
                Some(list) => list.clone(),
                None => SessionType::ALL.to_vec(),
            };
            for session in sessions {
                let hours = subject.hours_for(session);
                let whole = (hours + EPS).floor();
                for k in 0..whole as u32 {
                    out.units.push(RequirementUnit {
                        id: format!("{}/{}/{}/{}", group.id, subject.id, session, k + 1),
                        group_id: group.id.clone(),
                        subject_id: subject.id.clone(),
                        session_type: session,
                        priority: req.priority,
                        assigned_teacher: req.assigned_teacher.clone(),
                    });
                }
                let frac = hours - whole;
                if frac > EPS {
                    out.remainders.push(Unscheduled {
                        group_id: group.id.clone(),
                        subject_id: subject.id.clone(),
                        session_type: session,
                        hours: frac,
                        reason: UnscheduledReason::FractionalRemainder,
                        message: format!(
                            "{} {} for {}: {:.2} h left over after {} whole slots",
                            subject.code, session, group.code, frac, whole
                        ),
                    });
                }
            }
        }
    }
    out
}
