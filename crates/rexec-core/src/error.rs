use rexec_model::RemoteJobId;
use serde_json::Value;
use thiserror::Error;

use crate::remote::RemoteError;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("executor config must not override reserved field `{0}`")]
    InvalidOverride(&'static str),

    #[error("{operation} response does not match the expected shape: {reason}")]
    MalformedResponse {
        operation: &'static str,
        reason: String,
        raw: Box<Value>,
    },

    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("job is not tracked by the ledger: {0}")]
    NotFound(RemoteJobId),

    #[error("failed to terminate {} job(s): {}", .0.len(), join_failures(.0))]
    Terminate(Vec<(RemoteJobId, RemoteError)>),

    #[error("invalid submission template: {0}")]
    InvalidTemplate(String),

    #[error("invalid settings: {0}")]
    Settings(String),
}

impl CoreError {
    pub(crate) fn malformed(operation: &'static str, reason: impl ToString, raw: Value) -> Self {
        CoreError::MalformedResponse {
            operation,
            reason: reason.to_string(),
            raw: Box::new(raw),
        }
    }
}

fn join_failures(failures: &[(RemoteJobId, RemoteError)]) -> String {
    failures
        .iter()
        .map(|(id, e)| format!("{id}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}
