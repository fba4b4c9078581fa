use serde::{Deserialize, Serialize};

/// Internal lifecycle of a task delegated to the remote service.
///
/// `Queued` is also the state of any remote status the executor does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskState {
    /// Submitted, waiting for capacity or still starting.
    Queued,
    /// Container is executing.
    Running,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Failed,
}

impl TaskState {
    /// Returns `true` for `Success` and `Failed`; no transition leaves these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Queued => "queued",
            TaskState::Running => "running",
            TaskState::Success => "success",
            TaskState::Failed => "failed",
        }
    }
}
