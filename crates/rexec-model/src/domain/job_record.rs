use serde::{Deserialize, Serialize};

use crate::RemoteJobId;

/// One decoded entry of a describe response.
///
/// Built fresh on every poll and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub job_id: RemoteJobId,
    /// Status string in the remote service's vocabulary.
    pub status: String,
    /// Human-readable detail about the current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

impl JobRecord {
    pub fn new(job_id: impl Into<RemoteJobId>, status: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: status.into(),
            status_reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }
}
