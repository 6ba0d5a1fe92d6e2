//! Immutable, validated job descriptions.

use crate::types::{EvaluateJobType, ServingJobType, TrainingJobType};

/// A job ready to be rendered into an `arena` invocation.
///
/// Produced only by [`JobBuilder::build`](crate::JobBuilder::build). The
/// argument list is already validated and in builder call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec<T> {
    name: String,
    job_type: T,
    version: Option<String>,
    namespace: Option<String>,
    args: Vec<String>,
    command: String,
}

/// A training job (also used for scale-in and scale-out requests).
pub type TrainingJob = JobSpec<TrainingJobType>;

/// A serving job.
pub type ServingJob = JobSpec<ServingJobType>;

/// An evaluate job.
pub type EvaluateJob = JobSpec<EvaluateJobType>;

impl<T: Copy> JobSpec<T> {
    pub(crate) fn new(
        job_type: T,
        name: Option<String>,
        version: Option<String>,
        namespace: Option<String>,
        args: Vec<String>,
        command: Option<String>,
    ) -> Self {
        Self {
            name: name.unwrap_or_default(),
            job_type,
            version,
            namespace,
            args,
            command: command.unwrap_or_default(),
        }
    }

    /// The job name, or an empty string if none was set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The job kind.
    #[must_use]
    pub fn job_type(&self) -> T {
        self.job_type
    }

    /// The serving version, if one was set.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The namespace captured by the builder, if one was set.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Rendered option tokens in builder call order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The trailing command, or an empty string.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The trailing command when it is non-empty.
    #[must_use]
    pub fn trailing_command(&self) -> Option<&str> {
        (!self.command.is_empty()).then_some(self.command.as_str())
    }
}
