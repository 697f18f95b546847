use crate::model::{EvaluationCollection, Teacher};
use crate::remote::{RemoteSnapshot, SyncError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ReconcileOutcome {
    /// Remote data was merged; `merged` counts records taken from the remote side.
    Merged { merged: usize, added: usize },
    /// Pull produced no information; local state untouched.
    Skipped { reason: String },
}

/// Re-keys every remote record under the teacher's own class/room and lays it
/// over `local`. Remote wins on collision; local-only keys survive.
pub fn merge_remote(
    local: &EvaluationCollection,
    teacher: &Teacher,
    remote: &RemoteSnapshot,
) -> (EvaluationCollection, ReconcileOutcome) {
    let mut merged = local.clone();
    let mut added = 0;
    for (student_id, record) in remote {
        let key = teacher.key_for(*student_id);
        if !merged.contains(&key) {
            added += 1;
        }
        merged.insert(&key, record.clone());
    }
    let outcome = ReconcileOutcome::Merged {
        merged: remote.len(),
        added,
    };
    (merged, outcome)
}

/// Returns the collection to persist, or `None` when the pull failed.
pub fn reconcile(
    local: &EvaluationCollection,
    teacher: &Teacher,
    pulled: Result<RemoteSnapshot, SyncError>,
) -> (Option<EvaluationCollection>, ReconcileOutcome) {
    match pulled {
        Ok(remote) => {
            let (merged, outcome) = merge_remote(local, teacher, &remote);
            (Some(merged), outcome)
        }
        Err(e) => (
            None,
            ReconcileOutcome::Skipped {
                reason: e.to_string(),
            },
        ),
    }
}
