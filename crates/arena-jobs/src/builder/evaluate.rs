//! Model evaluation jobs.

use super::JobBuilder;
use crate::types::EvaluateJobType;

job_kind!(
    /// Model evaluation (`arena evaluate model`).
    EvaluateModel => EvaluateJobType::Model
);

option_groups!(EvaluateModel => WithImage, WithEnvs, WithResources, WithPlacement,
    WithDataSync, WithWorkingDir, WithShell, WithCommand);

/// Builder for evaluate jobs.
pub type EvaluateJobBuilder = JobBuilder<EvaluateModel>;

impl JobBuilder<EvaluateModel> {
    /// Namespace the job runs in (`--namespace`).
    ///
    /// Also remembered on the job for error messages.
    #[must_use]
    pub fn namespace(self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.capture_namespace(&namespace)
            .scalar("--namespace", namespace)
    }

    /// Dataset location (`--dataset-path`).
    #[must_use]
    pub fn dataset_path(self, path: impl Into<String>) -> Self {
        self.scalar("--dataset-path", path)
    }

    /// Where results are written (`--metrics-path`).
    #[must_use]
    pub fn metrics_path(self, path: impl Into<String>) -> Self {
        self.scalar("--metrics-path", path)
    }

    /// Model name (`--model-name`).
    #[must_use]
    pub fn model_name(self, name: impl Into<String>) -> Self {
        self.scalar("--model-name", name)
    }

    /// Model location (`--model-path`).
    #[must_use]
    pub fn model_path(self, path: impl Into<String>) -> Self {
        self.scalar("--model-path", path)
    }

    /// Model version (`--model-version`).
    #[must_use]
    pub fn model_version(self, version: impl Into<String>) -> Self {
        self.scalar("--model-version", version)
    }
}
