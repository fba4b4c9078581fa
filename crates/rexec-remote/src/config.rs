use std::time::Duration;

use rexec_core::{Backend, ExecutorSettings};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how [`crate::HttpRemote`] reaches the compute service.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub backend: Backend,
    /// Base URL without trailing slash.
    pub endpoint: String,
    /// ECS cluster for describe and stop calls.
    pub cluster: Option<String>,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(backend: Backend, endpoint: impl Into<String>) -> Self {
        Self {
            backend,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            cluster: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = Some(cluster.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_settings(settings: &ExecutorSettings) -> Self {
        let config = Self::new(settings.backend(), settings.endpoint());
        match settings.cluster() {
            Some(cluster) => config.with_cluster(cluster),
            None => config,
        }
    }
}
