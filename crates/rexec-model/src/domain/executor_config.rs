use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys of a container override that the submission pipeline owns.
///
/// A task's executor config may set any other container override field (cpu, memory, environment, ...).
pub const RESERVED_OVERRIDE_KEYS: [&str; 2] = ["command", "name"];

/// Per-task container overrides attached by the host scheduler.
///
/// Serialized as a plain JSON object so it can be merged into the backend's container-override section as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutorConfig(Map<String, Value>);

impl ExecutorConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set one override field, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// First reserved key present in this config, if any.
    pub fn reserved_key(&self) -> Option<&'static str> {
        RESERVED_OVERRIDE_KEYS
            .into_iter()
            .find(|k| self.0.contains_key(*k))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for ExecutorConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
