use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use rexec_core::{Backend, RemoteApi, RemoteError};
use rexec_model::RemoteJobId;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, trace};

use crate::{config::RemoteConfig, errors::HttpRemoteError};

const ECS_TARGET_PREFIX: &str = "AmazonEC2ContainerServiceV20141113";
const ECS_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Submit,
    Describe,
    Terminate,
}

impl Operation {
    fn batch_path(self) -> &'static str {
        match self {
            Operation::Submit => "/v1/submitjob",
            Operation::Describe => "/v1/describejobs",
            Operation::Terminate => "/v1/terminatejob",
        }
    }

    fn ecs_action(self) -> &'static str {
        match self {
            Operation::Submit => "RunTask",
            Operation::Describe => "DescribeTasks",
            Operation::Terminate => "StopTask",
        }
    }
}

/// [`RemoteApi`] over plain JSON/HTTP.
///
/// Batch is spoken as REST-JSON (`POST /v1/<action>`), ECS as JSON 1.1 with an `X-Amz-Target` header. Requests
/// are not signed: point the endpoint at a signing proxy, a VPC gateway or a local emulator.
pub struct HttpRemote {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> Result<Self, HttpRemoteError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn url(&self, op: Operation) -> String {
        match self.config.backend {
            Backend::Batch => format!("{}{}", self.config.endpoint, op.batch_path()),
            Backend::Ecs => format!("{}/", self.config.endpoint),
        }
    }

    fn describe_body(&self, job_ids: &[RemoteJobId]) -> Value {
        match self.config.backend {
            Backend::Batch => json!({ "jobs": job_ids }),
            Backend::Ecs => self.with_cluster(json!({ "tasks": job_ids })),
        }
    }

    fn terminate_body(&self, job_id: &RemoteJobId, reason: &str) -> Value {
        match self.config.backend {
            Backend::Batch => json!({ "jobId": job_id, "reason": reason }),
            Backend::Ecs => self.with_cluster(json!({ "task": job_id, "reason": reason })),
        }
    }

    fn with_cluster(&self, mut body: Value) -> Value {
        if let (Some(cluster), Some(obj)) = (&self.config.cluster, body.as_object_mut()) {
            obj.insert("cluster".to_string(), json!(cluster));
        }
        body
    }

    #[instrument(level = "trace", skip(self, body), fields(backend = %self.config.backend))]
    async fn call(&self, op: Operation, body: &Value) -> Result<Value, HttpRemoteError> {
        let request = match self.config.backend {
            Backend::Batch => self.client.post(self.url(op)).json(body),
            Backend::Ecs => self
                .client
                .post(self.url(op))
                .header(CONTENT_TYPE, ECS_CONTENT_TYPE)
                .header("X-Amz-Target", format!("{ECS_TARGET_PREFIX}.{}", op.ecs_action()))
                .body(body.to_string()),
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        trace!(status = status.as_u16(), body = %text, "remote response");

        if !status.is_success() {
            debug!(status = status.as_u16(), "remote call rejected");
            return Err(HttpRemoteError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_body(&text)
    }
}

fn parse_body(text: &str) -> Result<Value, HttpRemoteError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|e| {
        HttpRemoteError::InvalidResponse(format!("failed to parse response: {e}, body: {text}"))
    })
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn submit_job(&self, request: Value) -> Result<Value, RemoteError> {
        Ok(self.call(Operation::Submit, &request).await?)
    }

    async fn describe_jobs(&self, job_ids: &[RemoteJobId]) -> Result<Value, RemoteError> {
        let body = self.describe_body(job_ids);
        Ok(self.call(Operation::Describe, &body).await?)
    }

    async fn terminate_job(&self, job_id: &RemoteJobId, reason: &str) -> Result<(), RemoteError> {
        let body = self.terminate_body(job_id, reason);
        self.call(Operation::Terminate, &body).await?;
        Ok(())
    }
}
