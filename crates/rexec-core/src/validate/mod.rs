//! Decoding of raw remote responses into typed records.
//!
//! Decoding happens in two steps: the JSON body is deserialized into the backend's wire structs, then the wire
//! structs are turned into domain values. Any shape mismatch rejects the whole response; dropping a single bad
//! entry would leave its job tracked forever with no terminal callback.

mod batch;
mod ecs;

use rexec_model::{JobRecord, RemoteJobId};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::error;

use crate::{backend::Backend, error::CoreError};

pub(crate) const SUBMIT: &str = "submit";
pub(crate) const DESCRIBE: &str = "describe";

/// Extract the job id from a submit response.
pub fn decode_submit(backend: Backend, raw: Value) -> Result<RemoteJobId, CoreError> {
    match backend {
        Backend::Batch => {
            let wire: batch::SubmitJobResponse = decode(SUBMIT, &raw)?;
            Ok(wire.into_job_id())
        }
        Backend::Ecs => {
            let wire: ecs::RunTaskResponse = decode(SUBMIT, &raw)?;
            wire.into_job_id(raw)
        }
    }
}

/// Decode every entry of a describe response.
pub fn decode_describe(backend: Backend, raw: Value) -> Result<Vec<JobRecord>, CoreError> {
    match backend {
        Backend::Batch => {
            let wire: batch::DescribeJobsResponse = decode(DESCRIBE, &raw)?;
            Ok(wire.into_records())
        }
        Backend::Ecs => {
            let wire: ecs::DescribeTasksResponse = decode(DESCRIBE, &raw)?;
            Ok(wire.into_records())
        }
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, raw: &Value) -> Result<T, CoreError> {
    T::deserialize(raw).map_err(|e| {
        error!(operation, response = %raw, "remote response does not match expected shape");
        CoreError::malformed(operation, e, raw.clone())
    })
}
