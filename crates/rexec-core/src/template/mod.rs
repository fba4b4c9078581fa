use rexec_model::ExecutorConfig;
use serde_json::{Map, Value};

use crate::{backend::Backend, error::CoreError};

const COMMAND: &str = "command";

/// Operator-configured base request every submission starts from.
///
/// The base is validated once, at construction, to contain the backend's container override section with a
/// `command` slot. It is never mutated afterwards; each request is built from a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTemplate {
    backend: Backend,
    base: Map<String, Value>,
}

impl SubmissionTemplate {
    pub fn new(backend: Backend, base: Value) -> Result<Self, CoreError> {
        let Value::Object(mut base) = base else {
            return Err(CoreError::InvalidTemplate(
                "base request must be a JSON object".to_string(),
            ));
        };

        let section = override_section(backend, &mut base).ok_or_else(|| {
            CoreError::InvalidTemplate(format!(
                "base request needs a {} object",
                override_path(backend)
            ))
        })?;
        if !section.contains_key(COMMAND) {
            return Err(CoreError::InvalidTemplate(format!(
                "{} must contain a `command` field (its value is replaced on submit)",
                override_path(backend)
            )));
        }

        Ok(Self { backend, base })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn base(&self) -> &Map<String, Value> {
        &self.base
    }

    /// Build the submit request for one task.
    ///
    /// `overrides` are merged into the container override section first, then `command` is written last so it
    /// always wins. Reserved keys in `overrides` are rejected before anything is built.
    pub fn build_request(
        &self,
        command: &[String],
        overrides: Option<&ExecutorConfig>,
    ) -> Result<Value, CoreError> {
        if let Some(key) = overrides.and_then(ExecutorConfig::reserved_key) {
            return Err(CoreError::InvalidOverride(key));
        }

        let mut request = self.base.clone();
        let section = override_section(self.backend, &mut request).ok_or_else(|| {
            CoreError::InvalidTemplate(format!("{} disappeared", override_path(self.backend)))
        })?;

        if let Some(overrides) = overrides {
            for (k, v) in overrides.iter() {
                section.insert(k.clone(), v.clone());
            }
        }
        section.insert(
            COMMAND.to_string(),
            Value::Array(command.iter().cloned().map(Value::String).collect()),
        );

        Ok(Value::Object(request))
    }
}

/// Container override section the pipeline writes into.
fn override_section(backend: Backend, request: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    match backend {
        Backend::Batch => request.get_mut("containerOverrides")?.as_object_mut(),
        Backend::Ecs => request
            .get_mut("overrides")?
            .get_mut("containerOverrides")?
            .get_mut(0)?
            .as_object_mut(),
    }
}

fn override_path(backend: Backend) -> &'static str {
    match backend {
        Backend::Batch => "`containerOverrides`",
        Backend::Ecs => "`overrides.containerOverrides[0]`",
    }
}
