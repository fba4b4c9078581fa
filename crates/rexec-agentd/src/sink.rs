use std::sync::atomic::{AtomicUsize, Ordering};

use rexec_core::TaskSink;
use rexec_model::TaskKey;
use tracing::{info, warn};

/// Reports terminal tasks to the log and keeps a tally for the exit summary.
#[derive(Debug, Default)]
pub struct LogSink {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl LogSink {
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

impl TaskSink<TaskKey> for LogSink {
    fn on_success(&self, key: TaskKey) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        info!(task = %key, "task succeeded");
    }

    fn on_failure(&self, key: TaskKey, reason: Option<&str>) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        warn!(task = %key, reason = reason.unwrap_or("unknown"), "task failed");
    }
}
