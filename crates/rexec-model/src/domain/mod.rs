mod task_key;
pub use task_key::TaskKey;

mod job_id;
pub use job_id::RemoteJobId;

mod task_state;
pub use task_state::TaskState;

mod job_record;
pub use job_record::JobRecord;

mod executor_config;
pub use executor_config::{ExecutorConfig, RESERVED_OVERRIDE_KEYS};

/// Ordered argument list executed inside the remote container.
pub type Command = Vec<String>;
