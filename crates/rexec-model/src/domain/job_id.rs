use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote compute service to a submitted job.
///
/// For the Batch backend this is the `jobId`, for ECS it is the task ARN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteJobId(String);

impl RemoteJobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteJobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RemoteJobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RemoteJobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
