//! In-memory remote service and host sink used by the executor tests.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use rexec_model::{RemoteJobId, TaskKey};
use serde_json::{Value, json};

use crate::{Backend, RemoteApi, RemoteError, TaskSink};

#[derive(Default)]
struct FakeState {
    next_id: usize,
    /// Status sequence per job; each describe reports the front and advances while more than one is left.
    statuses: HashMap<RemoteJobId, VecDeque<String>>,
    submits: Vec<Value>,
    describes: Vec<Vec<RemoteJobId>>,
    terminates: Vec<RemoteJobId>,
    submit_responses: VecDeque<Result<Value, RemoteError>>,
    failing_terminates: HashSet<RemoteJobId>,
    hidden: HashSet<RemoteJobId>,
    extra_records: Vec<(RemoteJobId, String, Option<String>)>,
    malformed_describe_call: Option<usize>,
    failing_describe_call: Option<usize>,
}

pub(crate) struct FakeRemote {
    backend: Backend,
    state: Mutex<FakeState>,
}

impl FakeRemote {
    pub(crate) fn new(backend: Backend) -> Self {
        Self {
            backend,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub(crate) fn set_statuses(&self, id: &str, statuses: &[&str]) {
        self.state.lock().unwrap().statuses.insert(
            RemoteJobId::from(id),
            statuses.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub(crate) fn push_submit_response(&self, response: Result<Value, RemoteError>) {
        self.state.lock().unwrap().submit_responses.push_back(response);
    }

    pub(crate) fn fail_terminate(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_terminates
            .insert(RemoteJobId::from(id));
    }

    pub(crate) fn hide(&self, id: &str) {
        self.state.lock().unwrap().hidden.insert(RemoteJobId::from(id));
    }

    /// Report an additional entry on the next describe call, whether or not it was requested.
    pub(crate) fn add_extra_record(&self, id: &str, status: &str, reason: Option<&str>) {
        self.state.lock().unwrap().extra_records.push((
            RemoteJobId::from(id),
            status.to_string(),
            reason.map(str::to_string),
        ));
    }

    /// Zero-based index of the describe call that returns a malformed body.
    pub(crate) fn malformed_describe_on(&self, call: usize) {
        self.state.lock().unwrap().malformed_describe_call = Some(call);
    }

    /// Zero-based index of the describe call that fails with a service error.
    pub(crate) fn fail_describe_on(&self, call: usize) {
        self.state.lock().unwrap().failing_describe_call = Some(call);
    }

    pub(crate) fn submits(&self) -> Vec<Value> {
        self.state.lock().unwrap().submits.clone()
    }

    pub(crate) fn describes(&self) -> Vec<Vec<RemoteJobId>> {
        self.state.lock().unwrap().describes.clone()
    }

    pub(crate) fn terminates(&self) -> Vec<RemoteJobId> {
        self.state.lock().unwrap().terminates.clone()
    }

    fn submit_body(&self, id: &RemoteJobId) -> Value {
        match self.backend {
            Backend::Batch => json!({"jobId": id, "jobName": "fake"}),
            Backend::Ecs => json!({"tasks": [{"taskArn": id, "lastStatus": "PROVISIONING"}], "failures": []}),
        }
    }

    fn describe_entry(&self, id: &RemoteJobId, status: &str) -> Value {
        match self.backend {
            Backend::Batch => json!({"jobId": id, "status": status}),
            Backend::Ecs if status == "STOPPED" => {
                json!({"taskArn": id, "lastStatus": status, "containers": [{"exitCode": 0}]})
            }
            Backend::Ecs => json!({"taskArn": id, "lastStatus": status, "containers": [{}]}),
        }
    }

    fn describe_body(&self, entries: Vec<Value>) -> Value {
        match self.backend {
            Backend::Batch => json!({"jobs": entries}),
            Backend::Ecs => json!({"tasks": entries, "failures": []}),
        }
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn submit_job(&self, request: Value) -> Result<Value, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.submits.push(request);
        if let Some(response) = state.submit_responses.pop_front() {
            return response;
        }

        state.next_id += 1;
        let id = RemoteJobId::from(format!("job-{:03}", state.next_id));
        state
            .statuses
            .entry(id.clone())
            .or_insert_with(|| VecDeque::from(["SUBMITTED".to_string()]));
        Ok(self.submit_body(&id))
    }

    async fn describe_jobs(&self, job_ids: &[RemoteJobId]) -> Result<Value, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let call = state.describes.len();
        state.describes.push(job_ids.to_vec());

        if state.failing_describe_call == Some(call) {
            return Err(RemoteError::Service {
                status: 500,
                body: "internal failure".to_string(),
            });
        }
        if state.malformed_describe_call == Some(call) {
            return Ok(json!({"jobs": [{"jobId": job_ids[0]}], "tasks": [{}]}));
        }

        let mut entries = Vec::new();
        for id in job_ids {
            if state.hidden.contains(id) {
                continue;
            }
            let Some(seq) = state.statuses.get_mut(id) else {
                continue;
            };
            let status = if seq.len() > 1 {
                seq.pop_front().unwrap_or_default()
            } else {
                seq.front().cloned().unwrap_or_default()
            };
            entries.push(self.describe_entry(id, &status));
        }
        for (id, status, reason) in state.extra_records.drain(..) {
            let mut entry = self.describe_entry(&id, &status);
            if let Some(reason) = reason {
                let field = match self.backend {
                    Backend::Batch => "statusReason",
                    Backend::Ecs => "stoppedReason",
                };
                entry[field] = json!(reason);
            }
            entries.push(entry);
        }
        Ok(self.describe_body(entries))
    }

    async fn terminate_job(&self, job_id: &RemoteJobId, _reason: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.terminates.push(job_id.clone());
        if state.failing_terminates.contains(job_id) {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }

        let stopped = match self.backend {
            Backend::Batch => "FAILED",
            Backend::Ecs => "STOPPED",
        };
        // ECS reports a stopped task with exit code 0 here; a real SIGTERM'd container would usually not.
        state
            .statuses
            .insert(job_id.clone(), VecDeque::from([stopped.to_string()]));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success(TaskKey),
    Failure(TaskKey, Option<String>),
}

#[derive(Default)]
pub(crate) struct RecordingSink {
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingSink {
    pub(crate) fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl TaskSink<TaskKey> for RecordingSink {
    fn on_success(&self, key: TaskKey) {
        self.outcomes.lock().unwrap().push(Outcome::Success(key));
    }

    fn on_failure(&self, key: TaskKey, reason: Option<&str>) {
        self.outcomes
            .lock()
            .unwrap()
            .push(Outcome::Failure(key, reason.map(str::to_string)));
    }
}
