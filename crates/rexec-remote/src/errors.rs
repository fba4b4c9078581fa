use rexec_core::RemoteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpRemoteError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<HttpRemoteError> for RemoteError {
    fn from(err: HttpRemoteError) -> Self {
        match err {
            HttpRemoteError::Status { status, body } => RemoteError::Service { status, body },
            other => RemoteError::Transport(other.to_string()),
        }
    }
}
