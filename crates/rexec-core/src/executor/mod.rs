mod shutdown;
pub use shutdown::TERMINATE_REASON;

use std::{collections::HashSet, fmt::Debug, hash::Hash, sync::Arc, time::Duration};

use rexec_model::{ExecutorConfig, JobRecord, RemoteJobId, TaskState};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    backend::Backend,
    error::CoreResult,
    ledger::Ledger,
    remote::RemoteApi,
    sink::TaskSink,
    template::SubmissionTemplate,
    translate::translate,
    validate,
};

/// Tunables of one executor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Maximum number of ids per describe call.
    pub describe_batch_size: usize,
    /// Pause between polls while draining.
    pub drain_interval: Duration,
}

impl ExecutorOptions {
    pub fn for_backend(backend: Backend) -> Self {
        Self {
            describe_batch_size: backend.describe_batch_limit(),
            drain_interval: Duration::from_secs(10),
        }
    }

    pub fn with_describe_batch_size(mut self, size: usize) -> Self {
        self.describe_batch_size = size;
        self
    }

    pub fn with_drain_interval(mut self, interval: Duration) -> Self {
        self.drain_interval = interval;
        self
    }
}

/// Outcome counts of one [`Executor::sync`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub queued: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl SyncReport {
    /// Jobs that reached a terminal state and left the ledger.
    pub fn finished(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Delegates host tasks to a remote compute service and reconciles their state.
///
/// The host submits tasks with [`Executor::submit`] and drives [`Executor::sync`] on its own cadence. Every task
/// that reaches a terminal state is reported to the [`TaskSink`] exactly once.
pub struct Executor<K> {
    template: SubmissionTemplate,
    remote: Arc<dyn RemoteApi>,
    sink: Arc<dyn TaskSink<K>>,
    ledger: Ledger<K>,
    options: ExecutorOptions,
}

impl<K> Executor<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    pub fn new(
        template: SubmissionTemplate,
        remote: Arc<dyn RemoteApi>,
        sink: Arc<dyn TaskSink<K>>,
    ) -> Self {
        let options = ExecutorOptions::for_backend(template.backend());
        Self {
            template,
            remote,
            sink,
            ledger: Ledger::new(),
            options,
        }
    }

    pub fn with_options(mut self, options: ExecutorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn backend(&self) -> Backend {
        self.template.backend()
    }

    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Read-only view for hosts that report on in-flight jobs.
    pub fn ledger(&self) -> &Ledger<K> {
        &self.ledger
    }

    /// Number of jobs still awaiting a terminal state.
    pub fn active_jobs(&self) -> usize {
        self.ledger.len()
    }

    /// Submit one task and start tracking the job the service created for it.
    ///
    /// Nothing is tracked unless the service returned a well-formed job id; any error is returned to the caller
    /// and never turned into a task failure callback.
    #[instrument(level = "debug", skip(self, command, overrides), fields(backend = %self.backend()))]
    pub async fn submit(
        &self,
        key: K,
        command: &[String],
        overrides: Option<&ExecutorConfig>,
    ) -> CoreResult<RemoteJobId> {
        let request = self.template.build_request(command, overrides)?;
        trace!(%request, "built submit request");

        let raw = self.remote.submit_job(request).await?;
        let job_id = validate::decode_submit(self.backend(), raw)?;

        self.ledger.add(job_id.clone(), key);
        info!(job_id = %job_id, "job submitted");
        Ok(job_id)
    }

    /// Poll every tracked job once and fire callbacks for the ones that finished.
    ///
    /// Ids are described in chunks of at most `describe_batch_size`. A transport or decode error aborts the call;
    /// callbacks already fired for earlier chunks stand, and unfinished jobs stay tracked for the next call.
    #[instrument(level = "debug", skip(self), fields(backend = %self.backend()))]
    pub async fn sync(&self) -> CoreResult<SyncReport> {
        let job_ids = self.ledger.all_job_ids();
        if job_ids.is_empty() {
            debug!("no active jobs, skipping sync");
            return Ok(SyncReport::default());
        }

        let mut report = SyncReport::default();
        for chunk in job_ids.chunks(self.options.describe_batch_size.max(1)) {
            let raw = self.remote.describe_jobs(chunk).await?;
            let records = validate::decode_describe(self.backend(), raw)?;
            warn_missing(chunk, &records);

            for record in records {
                self.reconcile(record, &mut report)?;
            }
        }

        debug!(
            queued = report.queued,
            running = report.running,
            succeeded = report.succeeded,
            failed = report.failed,
            "sync finished"
        );
        Ok(report)
    }

    fn reconcile(&self, record: JobRecord, report: &mut SyncReport) -> CoreResult<()> {
        let state = translate(self.backend(), &record.status);
        trace!(job_id = %record.job_id, status = %record.status, state = state.as_str(), "job state");

        if !state.is_terminal() {
            match state {
                TaskState::Running => report.running += 1,
                _ => report.queued += 1,
            }
            return Ok(());
        }

        let key = self.ledger.pop_by_id(&record.job_id)?;
        if state == TaskState::Success {
            info!(job_id = %record.job_id, key = ?key, "job succeeded");
            self.sink.on_success(key);
            report.succeeded += 1;
        } else {
            warn!(
                job_id = %record.job_id,
                key = ?key,
                reason = record.status_reason.as_deref().unwrap_or("unknown"),
                "job failed"
            );
            self.sink.on_failure(key, record.status_reason.as_deref());
            report.failed += 1;
        }
        Ok(())
    }
}

fn warn_missing(requested: &[RemoteJobId], records: &[JobRecord]) {
    if records.len() >= requested.len() {
        return;
    }
    let seen: HashSet<&RemoteJobId> = records.iter().map(|r| &r.job_id).collect();
    for id in requested.iter().filter(|id| !seen.contains(id)) {
        warn!(job_id = %id, "tracked job missing from describe response");
    }
}
