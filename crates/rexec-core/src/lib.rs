//! Remote task lifecycle reconciliation engine.
//!
//! Submits tasks to a managed compute API (AWS Batch or ECS), keeps the task-key/job-id ledger and reconciles remote status back into host callbacks.

pub mod error;
pub use error::{CoreError, CoreResult};

mod backend;
pub use backend::Backend;

pub mod ledger;
pub use ledger::Ledger;

pub mod remote;
pub use remote::{RemoteApi, RemoteError};

mod sink;
pub use sink::TaskSink;

pub mod settings;
pub use settings::ExecutorSettings;

pub mod template;
pub use template::SubmissionTemplate;

pub mod translate;
pub mod validate;

mod executor;
pub use executor::{Executor, ExecutorOptions, SyncReport, TERMINATE_REASON};

#[cfg(test)]
mod fake;
