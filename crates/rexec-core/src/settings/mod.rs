//! Operator settings for one executor.
//!
//! Settings are read from a JSON document tagged by `backend`. They produce the submission template the pipeline
//! copies for every task and the executor tunables.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{
    backend::Backend, error::CoreError, executor::ExecutorOptions, template::SubmissionTemplate,
};

const DEFAULT_PLATFORM_VERSION: &str = "LATEST";
const DEFAULT_DRAIN_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ExecutorSettings {
    Batch(BatchSettings),
    Ecs(EcsSettings),
}

/// Settings shared by both backends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommonSettings {
    #[serde(default)]
    pub region: String,
    /// Overrides the regional service endpoint, e.g. a signing proxy or a local emulator.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub describe_batch_size: Option<usize>,
    #[serde(default)]
    pub drain_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchSettings {
    #[serde(flatten)]
    pub common: CommonSettings,
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub job_queue: String,
    #[serde(default)]
    pub job_definition: String,
    /// Complete `SubmitJob` base request; replaces the one built from the fields above.
    #[serde(default)]
    pub submit_job_kwargs: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EcsSettings {
    #[serde(flatten)]
    pub common: CommonSettings,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub task_definition: String,
    #[serde(default)]
    pub container_name: String,
    #[serde(default)]
    pub launch_type: Option<String>,
    #[serde(default)]
    pub platform_version: Option<String>,
    #[serde(default)]
    pub network: Option<NetworkSettings>,
    /// Complete `RunTask` base request; replaces the one built from the fields above.
    #[serde(default)]
    pub run_task_kwargs: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkSettings {
    #[serde(default)]
    pub subnets: Vec<String>,
    #[serde(default)]
    pub security_groups: Vec<String>,
    #[serde(default)]
    pub assign_public_ip: Option<String>,
}

impl ExecutorSettings {
    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CoreError::Settings(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        let settings: Self =
            serde_json::from_str(content).map_err(|e| CoreError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn backend(&self) -> Backend {
        match self {
            ExecutorSettings::Batch(_) => Backend::Batch,
            ExecutorSettings::Ecs(_) => Backend::Ecs,
        }
    }

    pub fn common(&self) -> &CommonSettings {
        match self {
            ExecutorSettings::Batch(s) => &s.common,
            ExecutorSettings::Ecs(s) => &s.common,
        }
    }

    pub fn region(&self) -> &str {
        &self.common().region
    }

    /// Configured endpoint, or the backend's regional endpoint.
    pub fn endpoint(&self) -> String {
        match non_empty(self.common().endpoint.as_deref()) {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.{}.amazonaws.com",
                self.backend().service(),
                self.region()
            ),
        }
    }

    /// Cluster the ECS describe and stop calls are scoped to.
    pub fn cluster(&self) -> Option<&str> {
        match self {
            ExecutorSettings::Batch(_) => None,
            ExecutorSettings::Ecs(s) => non_empty(Some(s.cluster.as_str())),
        }
    }

    pub fn options(&self) -> ExecutorOptions {
        let common = self.common();
        let mut options = ExecutorOptions::for_backend(self.backend());
        if let Some(size) = common.describe_batch_size {
            options = options.with_describe_batch_size(size);
        }
        options.with_drain_interval(Duration::from_secs(
            common
                .drain_interval_secs
                .unwrap_or(DEFAULT_DRAIN_INTERVAL_SECS),
        ))
    }

    /// Build and validate the submission template.
    pub fn template(&self) -> Result<SubmissionTemplate, CoreError> {
        let base = match self {
            ExecutorSettings::Batch(s) => s
                .submit_job_kwargs
                .clone()
                .unwrap_or_else(|| batch_base(s)),
            ExecutorSettings::Ecs(s) => s.run_task_kwargs.clone().unwrap_or_else(|| ecs_base(s)),
        };
        SubmissionTemplate::new(self.backend(), base)
    }

    fn validate(&self) -> Result<(), CoreError> {
        let common = self.common();
        if common.region.trim().is_empty() && non_empty(common.endpoint.as_deref()).is_none() {
            return Err(CoreError::Settings(
                "either `region` or `endpoint` must be set".to_string(),
            ));
        }
        let backend = self.backend();
        if let Some(size) = common.describe_batch_size
            && (size == 0 || size > backend.describe_batch_limit())
        {
            return Err(CoreError::Settings(format!(
                "describe_batch_size must be between 1 and {} for {backend}",
                backend.describe_batch_limit()
            )));
        }

        match self {
            ExecutorSettings::Batch(s) if s.submit_job_kwargs.is_none() => {
                require("job_queue", &s.job_queue)?;
                require("job_definition", &s.job_definition)
            }
            ExecutorSettings::Ecs(s) => {
                require("cluster", &s.cluster)?;
                if s.run_task_kwargs.is_none() {
                    require("task_definition", &s.task_definition)?;
                    require("container_name", &s.container_name)?;
                }
                Ok(())
            }
            ExecutorSettings::Batch(_) => Ok(()),
        }
    }
}

fn batch_base(s: &BatchSettings) -> Value {
    let job_name = non_empty(Some(s.job_name.as_str())).unwrap_or("remote-task");
    json!({
        "jobName": job_name,
        "jobQueue": s.job_queue,
        "jobDefinition": s.job_definition,
        "containerOverrides": {"command": []},
    })
}

fn ecs_base(s: &EcsSettings) -> Value {
    let mut base = Map::new();
    base.insert("cluster".into(), json!(s.cluster));
    base.insert("taskDefinition".into(), json!(s.task_definition));
    base.insert(
        "platformVersion".into(),
        json!(non_empty(s.platform_version.as_deref()).unwrap_or(DEFAULT_PLATFORM_VERSION)),
    );
    base.insert(
        "overrides".into(),
        json!({"containerOverrides": [{"name": s.container_name, "command": []}]}),
    );
    base.insert("count".into(), json!(1));

    if let Some(launch_type) = non_empty(s.launch_type.as_deref()) {
        base.insert("launchType".into(), json!(launch_type));
    }
    if let Some(network) = &s.network
        && !network.subnets.is_empty()
        && !network.security_groups.is_empty()
    {
        let assign_public_ip = non_empty(network.assign_public_ip.as_deref()).unwrap_or("DISABLED");
        base.insert(
            "networkConfiguration".into(),
            json!({"awsvpcConfiguration": {
                "subnets": network.subnets,
                "securityGroups": network.security_groups,
                "assignPublicIp": assign_public_ip,
            }}),
        );
    }
    Value::Object(base)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Settings(format!("`{field}` must be set")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_settings_build_default_template() {
        let settings = ExecutorSettings::from_json(
            r#"{
                "backend": "batch",
                "region": "eu-west-1",
                "job_name": "nightly",
                "job_queue": "q1",
                "job_definition": "runner:7"
            }"#,
        )
        .unwrap();

        assert_eq!(settings.backend(), Backend::Batch);
        assert_eq!(settings.endpoint(), "https://batch.eu-west-1.amazonaws.com");
        assert_eq!(settings.cluster(), None);

        let template = settings.template().unwrap();
        assert_eq!(
            Value::Object(template.base().clone()),
            json!({
                "jobName": "nightly",
                "jobQueue": "q1",
                "jobDefinition": "runner:7",
                "containerOverrides": {"command": []},
            })
        );

        let options = settings.options();
        assert_eq!(options.describe_batch_size, 99);
        assert_eq!(options.drain_interval, Duration::from_secs(10));
    }

    #[test]
    fn ecs_settings_build_network_and_launch_type() {
        let settings = ExecutorSettings::from_json(
            r#"{
                "backend": "ecs",
                "region": "us-east-1",
                "endpoint": "http://localhost:4566/",
                "cluster": "main",
                "task_definition": "runner",
                "container_name": "worker",
                "launch_type": "FARGATE",
                "network": {"subnets": ["subnet-1", "subnet-2"], "security_groups": ["sg-1"], "assign_public_ip": "ENABLED"},
                "drain_interval_secs": 2
            }"#,
        )
        .unwrap();

        assert_eq!(settings.endpoint(), "http://localhost:4566");
        assert_eq!(settings.cluster(), Some("main"));
        assert_eq!(settings.options().drain_interval, Duration::from_secs(2));

        let base = Value::Object(settings.template().unwrap().base().clone());
        assert_eq!(base["launchType"], json!("FARGATE"));
        assert_eq!(base["platformVersion"], json!("LATEST"));
        assert_eq!(base["count"], json!(1));
        assert_eq!(
            base["networkConfiguration"]["awsvpcConfiguration"],
            json!({"subnets": ["subnet-1", "subnet-2"], "securityGroups": ["sg-1"], "assignPublicIp": "ENABLED"})
        );
        assert_eq!(
            base["overrides"]["containerOverrides"][0],
            json!({"name": "worker", "command": []})
        );
    }

    #[test]
    fn ecs_network_needs_subnets_and_security_groups() {
        let settings = ExecutorSettings::from_json(
            r#"{
                "backend": "ecs", "region": "us-east-1", "cluster": "c",
                "task_definition": "t", "container_name": "w",
                "launch_type": "",
                "network": {"subnets": ["subnet-1"]}
            }"#,
        )
        .unwrap();

        let base = Value::Object(settings.template().unwrap().base().clone());
        assert!(base.get("networkConfiguration").is_none());
        assert!(base.get("launchType").is_none());
    }

    #[test]
    fn custom_base_request_is_validated() {
        let settings = ExecutorSettings::from_json(
            r#"{
                "backend": "batch", "region": "us-east-1",
                "submit_job_kwargs": {"jobQueue": "q", "jobDefinition": "d", "containerOverrides": {"memory": 10}}
            }"#,
        )
        .unwrap();
        assert!(matches!(settings.template(), Err(CoreError::InvalidTemplate(_))));

        let settings = ExecutorSettings::from_json(
            r#"{
                "backend": "batch", "region": "us-east-1",
                "submit_job_kwargs": {"jobQueue": "q", "jobDefinition": "d", "containerOverrides": {"command": null, "memory": 10}}
            }"#,
        )
        .unwrap();
        let template = settings.template().unwrap();
        assert_eq!(template.base()["containerOverrides"]["memory"], json!(10));
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        let err = ExecutorSettings::from_json(r#"{"backend": "batch", "region": "us-east-1", "job_queue": "q"}"#)
            .unwrap_err();
        assert!(matches!(err, CoreError::Settings(ref m) if m.contains("job_definition")));

        let err = ExecutorSettings::from_json(
            r#"{"backend": "ecs", "region": "us-east-1", "task_definition": "t", "container_name": "w"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Settings(ref m) if m.contains("cluster")));

        let err = ExecutorSettings::from_json(r#"{"backend": "lambda", "region": "x"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Settings(_)));
    }

    #[test]
    fn describe_batch_size_is_bounded_by_backend_limit() {
        let err = ExecutorSettings::from_json(
            r#"{"backend": "batch", "region": "r", "job_queue": "q", "job_definition": "d", "describe_batch_size": 100}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Settings(ref m) if m.contains("describe_batch_size")));

        let settings = ExecutorSettings::from_json(
            r#"{"backend": "ecs", "region": "r", "cluster": "c", "task_definition": "t", "container_name": "w", "describe_batch_size": 100}"#,
        )
        .unwrap();
        assert_eq!(settings.options().describe_batch_size, 100);
    }
}
