use std::{collections::HashSet, path::Path};

use anyhow::Context;
use rexec_model::{Command, ExecutorConfig, TaskKey};
use serde::Deserialize;

/// One entry of the tasks file.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEntry {
    pub key: TaskKey,
    pub command: Command,
    #[serde(default)]
    pub overrides: Option<ExecutorConfig>,
}

pub fn load(path: &Path) -> anyhow::Result<Vec<TaskEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tasks file {}", path.display()))?;
    parse(&content).with_context(|| format!("invalid tasks file {}", path.display()))
}

fn parse(content: &str) -> anyhow::Result<Vec<TaskEntry>> {
    let entries: Vec<TaskEntry> = serde_json::from_str(content)?;
    let mut seen = HashSet::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        if entry.command.is_empty() {
            anyhow::bail!("task #{idx} ({}) has an empty command", entry.key);
        }
        // one task key maps to at most one in-flight job
        if !seen.insert(&entry.key) {
            anyhow::bail!("task #{idx} repeats key {}", entry.key);
        }
    }
    Ok(entries)
}
