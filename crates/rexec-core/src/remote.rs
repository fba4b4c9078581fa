use async_trait::async_trait;
use rexec_model::RemoteJobId;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("service rejected request: {0}")]
    Rejected(String),
}

/// Managed compute API the executor delegates jobs to.
///
/// Implementations return the raw decoded JSON body; shape checking is done by [`crate::validate`] so a misbehaving
/// service is reported the same way regardless of transport.
#[async_trait]
pub trait RemoteApi: Send + Sync + 'static {
    /// Submit one job built from the submission template.
    async fn submit_job(&self, request: Value) -> Result<Value, RemoteError>;

    /// Describe a batch of jobs. Callers keep `job_ids` within the service's batch limit.
    async fn describe_jobs(&self, job_ids: &[RemoteJobId]) -> Result<Value, RemoteError>;

    /// Ask the service to stop a job.
    async fn terminate_job(&self, job_id: &RemoteJobId, reason: &str) -> Result<(), RemoteError>;
}
