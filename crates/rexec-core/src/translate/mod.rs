//! Remote status vocabulary to [`TaskState`].
//!
//! Translation is a fixed table lookup with an explicit fallback: an unknown status is always
//! `Queued`, never a failure, so a transient status the service adds later cannot fail a task.

use rexec_model::TaskState;

use crate::backend::Backend;

const BATCH_STATUSES: &[(&str, TaskState)] = &[
    ("SUBMITTED", TaskState::Queued),
    ("PENDING", TaskState::Queued),
    ("RUNNABLE", TaskState::Queued),
    ("STARTING", TaskState::Queued),
    ("RUNNING", TaskState::Running),
    ("SUCCEEDED", TaskState::Success),
    ("FAILED", TaskState::Failed),
];

// STOPPED never reaches the table: the ECS decoder resolves it to SUCCEEDED or FAILED from the container exit codes.
const ECS_STATUSES: &[(&str, TaskState)] = &[
    ("PROVISIONING", TaskState::Queued),
    ("PENDING", TaskState::Queued),
    ("ACTIVATING", TaskState::Queued),
    ("RUNNING", TaskState::Running),
    ("DEACTIVATING", TaskState::Running),
    ("STOPPING", TaskState::Running),
    ("DEPROVISIONING", TaskState::Running),
    ("SUCCEEDED", TaskState::Success),
    ("FAILED", TaskState::Failed),
];

/// State used for any status missing from the table.
pub const FALLBACK_STATE: TaskState = TaskState::Queued;

/// Map a remote status string to the internal lifecycle.
pub fn translate(backend: Backend, status: &str) -> TaskState {
    table(backend)
        .iter()
        .find(|(remote, _)| *remote == status)
        .map(|(_, state)| *state)
        .unwrap_or(FALLBACK_STATE)
}

fn table(backend: Backend) -> &'static [(&'static str, TaskState)] {
    match backend {
        Backend::Batch => BATCH_STATUSES,
        Backend::Ecs => ECS_STATUSES,
    }
}
