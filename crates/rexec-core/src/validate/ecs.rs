use rexec_model::{JobRecord, RemoteJobId};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::SUBMIT;
use crate::{error::CoreError, remote::RemoteError};

const STOPPED: &str = "STOPPED";
const SUCCEEDED: &str = "SUCCEEDED";
const FAILED: &str = "FAILED";

#[derive(Debug, Deserialize)]
pub(super) struct RunTaskResponse {
    tasks: Vec<TaskRef>,
    #[serde(default)]
    failures: Vec<Failure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRef {
    task_arn: String,
}

#[derive(Debug, Deserialize)]
struct Failure {
    #[serde(default)]
    arn: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl Failure {
    fn describe(&self) -> String {
        let mut out = self.reason.clone().unwrap_or_else(|| "unknown".to_string());
        if let Some(detail) = &self.detail {
            out.push_str(&format!(" ({detail})"));
        }
        if let Some(arn) = &self.arn {
            out.push_str(&format!(" [{arn}]"));
        }
        out
    }
}

impl RunTaskResponse {
    /// RunTask is sent with `count: 1`, so exactly one task must come back.
    pub(super) fn into_job_id(mut self, raw: Value) -> Result<RemoteJobId, CoreError> {
        if !self.failures.is_empty() {
            let reasons: Vec<String> = self.failures.iter().map(Failure::describe).collect();
            return Err(RemoteError::Rejected(reasons.join("; ")).into());
        }
        match self.tasks.len() {
            1 => Ok(RemoteJobId::from(self.tasks.remove(0).task_arn)),
            n => Err(CoreError::malformed(
                SUBMIT,
                format!("expected exactly one task, got {n}"),
                raw,
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DescribeTasksResponse {
    tasks: Vec<TaskDetail>,
    #[serde(default)]
    failures: Vec<Failure>,
}

/// `lastStatus` runs PROVISIONING, PENDING, ACTIVATING, RUNNING, DEACTIVATING, STOPPING, DEPROVISIONING, STOPPED.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskDetail {
    task_arn: String,
    last_status: String,
    #[serde(default)]
    stopped_reason: Option<String>,
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Container {
    #[serde(default)]
    exit_code: Option<i64>,
    #[serde(default)]
    reason: Option<String>,
}

impl DescribeTasksResponse {
    pub(super) fn into_records(self) -> Vec<JobRecord> {
        for failure in &self.failures {
            warn!(failure = %failure.describe(), "describe tasks reported a failure");
        }
        self.tasks.into_iter().map(TaskDetail::into_record).collect()
    }
}

impl TaskDetail {
    /// A stopped task succeeded only if every container exited with code 0.
    /// Missing exit codes mean a container never ran, which is a failure too.
    fn into_record(self) -> JobRecord {
        if self.last_status != STOPPED {
            return JobRecord {
                job_id: RemoteJobId::from(self.task_arn),
                status: self.last_status,
                status_reason: self.stopped_reason,
            };
        }

        let succeeded =
            !self.containers.is_empty() && self.containers.iter().all(|c| c.exit_code == Some(0));
        let container_reason = self
            .containers
            .iter()
            .find(|c| c.exit_code != Some(0))
            .and_then(|c| c.reason.clone());

        JobRecord {
            job_id: RemoteJobId::from(self.task_arn),
            status: if succeeded { SUCCEEDED } else { FAILED }.to_string(),
            status_reason: container_reason.or(self.stopped_reason),
        }
    }
}
