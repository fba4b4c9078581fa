use std::{fmt::Debug, hash::Hash, time::Duration};

use tracing::{debug, error, info, instrument, warn};

use super::Executor;
use crate::error::{CoreError, CoreResult};

/// Reason attached to every terminate call issued by [`Executor::terminate`].
pub const TERMINATE_REASON: &str = "remote executor received a termination request";

impl<K> Executor<K>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
{
    /// Keep syncing until every tracked job reached a terminal state.
    ///
    /// Submits nothing; returns the first sync error.
    #[instrument(level = "debug", skip(self))]
    pub async fn drain(&self, poll_interval: Duration) -> CoreResult<()> {
        info!(active = self.active_jobs(), "waiting for tracked jobs to finish");
        loop {
            self.sync().await?;
            if self.ledger.is_empty() {
                break;
            }
            debug!(active = self.active_jobs(), "jobs still active");
            tokio::time::sleep(poll_interval).await;
        }
        info!("all tracked jobs finished");
        Ok(())
    }

    /// Stop every tracked job, then drain so each one still gets its terminal callback.
    ///
    /// A failed terminate call does not stop the remaining ones. Failures are collected and returned as
    /// [`CoreError::Terminate`] once draining finished; an error while draining is returned instead.
    #[instrument(level = "debug", skip(self))]
    pub async fn terminate(&self) -> CoreResult<()> {
        let job_ids = self.ledger.all_job_ids();
        info!(active = job_ids.len(), "terminating tracked jobs");

        let mut failures = Vec::new();
        for job_id in job_ids {
            match self.remote.terminate_job(&job_id, TERMINATE_REASON).await {
                Ok(()) => debug!(job_id = %job_id, "terminate requested"),
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "terminate call failed");
                    failures.push((job_id, e));
                }
            }
        }

        if let Err(e) = self.drain(self.options.drain_interval).await {
            if !failures.is_empty() {
                error!(
                    failed = failures.len(),
                    "drain aborted after failed terminate calls"
                );
            }
            return Err(e);
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Terminate(failures))
        }
    }
}
