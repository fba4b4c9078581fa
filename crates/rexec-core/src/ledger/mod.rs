use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{Arc, PoisonError, RwLock},
};

use rexec_model::RemoteJobId;
use tracing::error;

use crate::error::CoreError;

/// Bidirectional map between host task keys and remote job ids.
///
/// Both directions are updated under one lock, so every entry `(k, id)` in one map has `(id, k)` in the other.
/// Cloning yields another handle to the same ledger.
#[derive(Clone)]
pub struct Ledger<K> {
    inner: Arc<RwLock<LedgerInner<K>>>,
}

struct LedgerInner<K> {
    key_to_id: HashMap<K, RemoteJobId>,
    id_to_key: HashMap<RemoteJobId, K>,
}

impl<K> Ledger<K>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerInner {
                key_to_id: HashMap::new(),
                id_to_key: HashMap::new(),
            })),
        }
    }

    /// Start tracking `job_id` for `key`.
    ///
    /// One task has at most one job in flight: neither side may already be tracked.
    pub fn add(&self, job_id: RemoteJobId, key: K) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        debug_assert!(
            !inner.key_to_id.contains_key(&key),
            "task {key:?} already has a job in flight"
        );
        debug_assert!(
            !inner.id_to_key.contains_key(&job_id),
            "job {job_id} is already tracked"
        );

        inner.key_to_id.insert(key.clone(), job_id.clone());
        inner.id_to_key.insert(job_id, key);
    }

    /// Stop tracking `job_id` and return the task key it belonged to.
    ///
    /// An untracked id leaves the ledger untouched and is reported as [`CoreError::NotFound`].
    pub fn pop_by_id(&self, job_id: &RemoteJobId) -> Result<K, CoreError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let Some(key) = inner.id_to_key.remove(job_id) else {
            error!(job_id = %job_id, "ledger has no entry for job id");
            return Err(CoreError::NotFound(job_id.clone()));
        };
        inner.key_to_id.remove(&key);
        Ok(key)
    }

    /// Snapshot of every tracked job id, in no particular order.
    pub fn all_job_ids(&self) -> Vec<RemoteJobId> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.id_to_key.keys().cloned().collect()
    }

    /// Number of tracked jobs.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.key_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn is_bijective(&self) -> bool {
        let inner = self.inner.read().unwrap();
        inner.key_to_id.len() == inner.id_to_key.len()
            && inner
                .key_to_id
                .iter()
                .all(|(k, id)| inner.id_to_key.get(id) == Some(k))
    }
}

impl<K> Default for Ledger<K>
where
    K: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
