use std::thread;

use serde_json::Value;
use tracing::{error, info};

use crate::domain::RecordId;
use crate::store::{self, Filter, Record, RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct AssignSummary {
    pub assigned: Vec<RecordId>,
    pub failed: Vec<(RecordId, StoreError)>,
}

/// Sets `assigned_to` on every listed project, one independent update per
/// project, all in flight at once. Each failure is logged; nothing is
/// retried.
pub fn bulk_assign(store: &dyn RecordStore, user_id: &str, project_ids: &[RecordId]) -> AssignSummary {
    let results: Vec<(RecordId, Result<(), StoreError>)> = thread::scope(|scope| {
        let handles: Vec<_> = project_ids
            .iter()
            .map(|project_id| {
                let handle = scope.spawn(move || assign_one(store, user_id, project_id));
                (project_id, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(project_id, handle)| {
                let outcome = handle.join().unwrap_or_else(|_| {
                    Err(StoreError::Unavailable(
                        "assignment worker panicked".to_string(),
                    ))
                });
                (project_id.clone(), outcome)
            })
            .collect()
    });

    let mut summary = AssignSummary::default();
    for (project_id, outcome) in results {
        match outcome {
            Ok(()) => summary.assigned.push(project_id),
            Err(err) => {
                error!(project = %project_id, user = user_id, error = %err, "error assigning project");
                summary.failed.push((project_id, err));
            }
        }
    }
    info!(
        assigned = summary.assigned.len(),
        failed = summary.failed.len(),
        "bulk assignment finished"
    );
    summary
}

fn assign_one(store: &dyn RecordStore, user_id: &str, project_id: &RecordId) -> Result<(), StoreError> {
    let mut patch = Record::new();
    patch.insert("assigned_to".to_string(), Value::from(user_id));
    store
        .update(
            store::PROJECTS,
            patch,
            &[Filter::eq("id", project_id.to_value())],
        )
        .map(|_| ())
}
