mod sink;
mod tasks;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use rexec_core::{CoreError, Executor, ExecutorSettings};
use rexec_model::TaskKey;
use rexec_observe::{LoggerConfig, logger_init};
use rexec_remote::{HttpRemote, RemoteConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{sink::LogSink, tasks::TaskEntry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = LoggerConfig::from_env()?;
    logger_init(&cfg)?;

    let (settings_path, tasks_path) = parse_args()?;
    let settings = ExecutorSettings::load(&settings_path)
        .with_context(|| format!("failed to load settings {}", settings_path.display()))?;
    let entries = tasks::load(&tasks_path)?;
    info!(
        backend = %settings.backend(),
        endpoint = %settings.endpoint(),
        tasks = entries.len(),
        "settings loaded"
    );

    let remote = Arc::new(HttpRemote::new(RemoteConfig::from_settings(&settings))?);
    let sink = Arc::new(LogSink::default());
    let executor: Executor<TaskKey> = Executor::new(settings.template()?, remote, sink.clone())
        .with_options(settings.options());

    // Installed before the first submit so an interrupt never leaves submitted jobs behind.
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("shutdown requested"),
                Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
            }
            shutdown.cancel();
        }
    });

    let rejected = submit_all(&executor, entries, &shutdown).await;
    run(&executor, &shutdown).await?;

    info!(
        succeeded = sink.succeeded(),
        failed = sink.failed(),
        rejected,
        "all tasks finished"
    );
    Ok(())
}

fn parse_args() -> anyhow::Result<(PathBuf, PathBuf)> {
    let mut args = std::env::args_os().skip(1);
    match (args.next(), args.next(), args.next()) {
        (Some(settings), Some(tasks), None) => Ok((settings.into(), tasks.into())),
        _ => anyhow::bail!("usage: rexec-agentd <settings.json> <tasks.json>"),
    }
}

/// Submit entries in order until `shutdown` fires; returns how many the service or executor rejected.
async fn submit_all(
    executor: &Executor<TaskKey>,
    entries: Vec<TaskEntry>,
    shutdown: &CancellationToken,
) -> usize {
    let total = entries.len();
    let mut rejected = 0usize;
    for (idx, entry) in entries.into_iter().enumerate() {
        if shutdown.is_cancelled() {
            warn!(skipped = total - idx, "shutdown requested; remaining tasks not submitted");
            break;
        }
        match executor
            .submit(entry.key.clone(), &entry.command, entry.overrides.as_ref())
            .await
        {
            Ok(job_id) => info!(task = %entry.key, job_id = %job_id, "task submitted"),
            Err(e) => {
                rejected += 1;
                error!(task = %entry.key, error = %e, "task submission failed");
            }
        }
    }
    rejected
}

/// Tick `sync` until the ledger drains, or stop everything once `shutdown` fires.
async fn run(executor: &Executor<TaskKey>, shutdown: &CancellationToken) -> anyhow::Result<()> {
    let interval = executor.options().drain_interval;

    while !executor.ledger().is_empty() {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                return terminate(executor).await;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        match executor.sync().await {
            Ok(report) if report.finished() > 0 => info!(
                succeeded = report.succeeded,
                failed = report.failed,
                active = executor.active_jobs(),
                "sync finished jobs"
            ),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "sync failed; retrying on next tick"),
        }
    }
    Ok(())
}

async fn terminate(executor: &Executor<TaskKey>) -> anyhow::Result<()> {
    match executor.terminate().await {
        Ok(()) => Ok(()),
        Err(CoreError::Terminate(failures)) => {
            for (job_id, e) in &failures {
                warn!(job_id = %job_id, error = %e, "job could not be stopped");
            }
            anyhow::bail!("{} job(s) could not be stopped", failures.len())
        }
        Err(e) => Err(e).context("terminate failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use async_trait::async_trait;
    use rexec_core::{Backend, ExecutorOptions, RemoteApi, RemoteError, SubmissionTemplate};
    use rexec_model::RemoteJobId;
    use serde_json::{Value, json};

    use super::*;

    /// Batch-shaped service: jobs run until stopped, then report FAILED.
    #[derive(Default)]
    struct StubRemote {
        submitted: Mutex<usize>,
        stopped: Mutex<Vec<RemoteJobId>>,
        cancel_after_submit: Option<CancellationToken>,
    }

    #[async_trait]
    impl RemoteApi for StubRemote {
        async fn submit_job(&self, _request: Value) -> Result<Value, RemoteError> {
            let mut submitted = self.submitted.lock().unwrap();
            *submitted += 1;
            if let Some(token) = &self.cancel_after_submit {
                token.cancel();
            }
            Ok(json!({ "jobId": format!("job-{:03}", *submitted) }))
        }

        async fn describe_jobs(&self, job_ids: &[RemoteJobId]) -> Result<Value, RemoteError> {
            let stopped = self.stopped.lock().unwrap();
            let jobs: Vec<Value> = job_ids
                .iter()
                .map(|id| {
                    let status = if stopped.contains(id) { "FAILED" } else { "RUNNING" };
                    json!({ "jobId": id, "status": status })
                })
                .collect();
            Ok(json!({ "jobs": jobs }))
        }

        async fn terminate_job(&self, job_id: &RemoteJobId, _reason: &str) -> Result<(), RemoteError> {
            self.stopped.lock().unwrap().push(job_id.clone());
            Ok(())
        }
    }

    fn executor(remote: Arc<StubRemote>, sink: Arc<LogSink>) -> Executor<TaskKey> {
        let template = SubmissionTemplate::new(
            Backend::Batch,
            json!({"jobQueue": "q", "jobDefinition": "d", "containerOverrides": {"command": []}}),
        )
        .unwrap();
        Executor::new(template, remote, sink).with_options(
            ExecutorOptions::for_backend(Backend::Batch).with_drain_interval(Duration::from_millis(1)),
        )
    }

    fn entries(keys: &[&str]) -> Vec<TaskEntry> {
        keys.iter()
            .map(|k| TaskEntry {
                key: TaskKey::from(*k),
                command: vec!["true".to_string()],
                overrides: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn interrupt_during_submission_stops_and_drains_submitted_jobs() {
        let shutdown = CancellationToken::new();
        let remote = Arc::new(StubRemote {
            cancel_after_submit: Some(shutdown.clone()),
            ..Default::default()
        });
        let sink = Arc::new(LogSink::default());
        let executor = executor(remote.clone(), sink.clone());

        let rejected = submit_all(&executor, entries(&["a", "b", "c"]), &shutdown).await;
        assert_eq!(rejected, 0);
        assert_eq!(*remote.submitted.lock().unwrap(), 1);
        assert_eq!(executor.active_jobs(), 1);

        run(&executor, &shutdown).await.unwrap();

        assert_eq!(
            *remote.stopped.lock().unwrap(),
            vec![RemoteJobId::from("job-001")]
        );
        assert!(executor.ledger().is_empty());
        assert_eq!(sink.failed(), 1);
    }

    #[tokio::test]
    async fn submits_everything_without_interrupt() {
        let shutdown = CancellationToken::new();
        let remote = Arc::new(StubRemote::default());
        let sink = Arc::new(LogSink::default());
        let executor = executor(remote.clone(), sink);

        submit_all(&executor, entries(&["a", "b", "c"]), &shutdown).await;

        assert_eq!(*remote.submitted.lock().unwrap(), 3);
        assert_eq!(executor.active_jobs(), 3);
        assert!(remote.stopped.lock().unwrap().is_empty());
    }
}
