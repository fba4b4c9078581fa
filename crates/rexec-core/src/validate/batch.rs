use rexec_model::{JobRecord, RemoteJobId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubmitJobResponse {
    job_id: String,
}

impl SubmitJobResponse {
    pub(super) fn into_job_id(self) -> RemoteJobId {
        RemoteJobId::from(self.job_id)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DescribeJobsResponse {
    jobs: Vec<JobDetail>,
}

/// `status` is one of SUBMITTED, PENDING, RUNNABLE, STARTING, RUNNING, SUCCEEDED, FAILED.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobDetail {
    job_id: String,
    status: String,
    #[serde(default)]
    status_reason: Option<String>,
}

impl DescribeJobsResponse {
    pub(super) fn into_records(self) -> Vec<JobRecord> {
        self.jobs
            .into_iter()
            .map(|job| JobRecord {
                job_id: RemoteJobId::from(job.job_id),
                status: job.status,
                status_reason: job.status_reason,
            })
            .collect()
    }
}
