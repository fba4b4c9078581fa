use std::fmt;

/// Remote service flavour an executor speaks.
///
/// Both services share the same lifecycle; they differ in request layout, response shapes and status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// AWS Batch: `SubmitJob` / `DescribeJobs` / `TerminateJob`.
    Batch,
    /// AWS ECS or Fargate: `RunTask` / `DescribeTasks` / `StopTask`.
    Ecs,
}

impl Backend {
    /// Largest id list a single describe call accepts.
    pub fn describe_batch_limit(&self) -> usize {
        match self {
            Backend::Batch => 99,
            Backend::Ecs => 100,
        }
    }

    /// Service name used in the default regional endpoint.
    pub fn service(&self) -> &'static str {
        match self {
            Backend::Batch => "batch",
            Backend::Ecs => "ecs",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service())
    }
}
