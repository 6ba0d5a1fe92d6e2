//! Training job client.

use std::time::Duration;

use arena_jobs::{TrainingJob, TrainingJobStatus, TrainingJobType};
use tracing::{debug, info};

use crate::context::{ClientContext, decode_output};
use crate::error::{ArenaError, Domain, Operation, Result};
use crate::logs::{LogOptions, LogStream};
use crate::model::{TrainingInstance, TrainingJobInfo};

/// Default pause between polls in [`TrainingClient::wait_for_running`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of polls in [`TrainingClient::wait_for_running`].
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// How to poll a job until it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause between polls.
    pub interval: Duration,
    /// Polls before giving up. At least one poll is always made.
    pub max_attempts: u32,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl WaitPolicy {
    /// Poll every `interval`, at most `max_attempts` times.
    #[must_use]
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// Submits and inspects training jobs (`arena submit`, `arena get`, ...).
#[derive(Debug, Clone)]
pub struct TrainingClient {
    ctx: ClientContext,
}

impl TrainingClient {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// A copy of this client bound to `namespace`.
    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Self {
        Self::new(self.ctx.with_namespace(namespace))
    }

    /// Submit a job and return the tool's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::AlreadyExists`] if a job with the same name
    /// exists, or another error if the submission fails.
    pub async fn submit(&self, job: &TrainingJob) -> Result<String> {
        let alias = job.job_type().alias();
        let line = self.ctx.command(&["submit", alias]).job(job);
        let output = self
            .ctx
            .run(Domain::Training, Operation::Submit, job.name(), line)
            .await?;
        info!(job = job.name(), kind = alias, namespace = self.ctx.namespace(), "training job submitted");
        Ok(output)
    }

    /// List jobs of `job_type`, or of every kind for [`TrainingJobType::All`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn list(&self, job_type: TrainingJobType, all_namespaces: bool) -> Result<Vec<TrainingJobInfo>> {
        let line = self
            .ctx
            .command(&["list"])
            .opt("--type", job_type.filter())
            .all_namespaces(all_namespaces)
            .json_output();
        let output = self.ctx.run(Domain::Training, Operation::List, "", line).await?;
        decode_output(Domain::Training, Operation::List, &output, TrainingJobInfo::decode_list)
    }

    /// Fetch one job. A job that does not exist yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails for any other reason or its
    /// output cannot be decoded.
    pub async fn get(&self, name: &str, job_type: TrainingJobType) -> Result<Option<TrainingJobInfo>> {
        let line = self
            .ctx
            .command(&["get"])
            .opt("--type", job_type.filter())
            .arg(name)
            .json_output();
        match self.ctx.run(Domain::Training, Operation::Get, name, line).await {
            Ok(output) => {
                decode_output(Domain::Training, Operation::Get, &output, TrainingJobInfo::decode).map(Some)
            }
            Err(e) if e.is_not_found() => {
                debug!(job = name, "training job not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a job and return the tool's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn delete(&self, name: &str, job_type: TrainingJobType) -> Result<String> {
        let line = self
            .ctx
            .command(&["delete"])
            .opt("--type", job_type.filter())
            .arg(name);
        let output = self.ctx.run(Domain::Training, Operation::Delete, name, line).await?;
        info!(job = name, namespace = self.ctx.namespace(), "training job deleted");
        Ok(output)
    }

    /// Delete finished jobs older than `since`, e.g. `"24h"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn prune(&self, since: &str, all_namespaces: bool) -> Result<String> {
        let line = self
            .ctx
            .command(&["prune"])
            .opt("--since", Some(since))
            .all_namespaces(all_namespaces);
        let output = self.ctx.run(Domain::Training, Operation::Prune, "", line).await?;
        info!(since, all_namespaces, "training jobs pruned");
        Ok(output)
    }

    /// Remove workers from an elastic job.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn scale_in(&self, job: &TrainingJob) -> Result<String> {
        self.scale("scalein", Operation::ScaleIn, job).await
    }

    /// Add workers to an elastic job.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn scale_out(&self, job: &TrainingJob) -> Result<String> {
        self.scale("scaleout", Operation::ScaleOut, job).await
    }

    async fn scale(&self, subcommand: &str, operation: Operation, job: &TrainingJob) -> Result<String> {
        let line = self.ctx.command(&[subcommand, job.job_type().alias()]).job(job);
        let output = self.ctx.run(Domain::Training, operation, job.name(), line).await?;
        info!(job = job.name(), %operation, "training job scaled");
        Ok(output)
    }

    /// Stream the log of one pod of a job.
    ///
    /// # Errors
    ///
    /// Returns an error if no log transport is configured or the stream
    /// cannot be opened.
    pub async fn logs(&self, instance: &TrainingInstance, options: &LogOptions) -> Result<LogStream> {
        self.ctx.logs(&instance.instance_ref(), options).await
    }

    /// Poll a job until it is no longer pending.
    ///
    /// Returns the first snapshot whose status is not `PENDING`.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::NotFound`] if the job does not exist,
    /// [`ArenaError::WaitTimeout`] if it is still pending after
    /// `policy.max_attempts` polls, or any error from [`Self::get`].
    pub async fn wait_for_running(
        &self,
        name: &str,
        job_type: TrainingJobType,
        policy: &WaitPolicy,
    ) -> Result<TrainingJobInfo> {
        let attempts = policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            let info = self
                .get(name, job_type)
                .await?
                .ok_or_else(|| ArenaError::not_found(Domain::Training, name))?;
            if info.status != TrainingJobStatus::Pending {
                debug!(job = name, status = %info.status, attempt, "training job started");
                return Ok(info);
            }
            if attempt < attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }

        Err(ArenaError::WaitTimeout {
            name: name.to_string(),
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arena_command::CommandExecutor;
    use arena_jobs::{EtScaleBuilder, MpiJobBuilder};

    use crate::client::ArenaClient;
    use crate::config::ClientConfig;
    use crate::testing::{RecordingExecutor, client};

    const NOT_FOUND: &str =
        "Not found training job mpi-dist in namespace default,please use 'arena submit' to create it.\n";

    fn job_json(status: &str) -> String {
        format!(
            r#"{{"name":"mpi-dist","namespace":"default","status":"{status}","trainer":"mpijob","instances":[{{"name":"mpi-dist-launcher"}}]}}"#
        )
    }

    fn mpi_job() -> TrainingJob {
        MpiJobBuilder::new()
            .name("mpi-dist")
            .workers(1)
            .gpus(1)
            .enable_tensorboard()
            .image("uber/horovod:0.13.11-tf1.10.0-torch0.4.0-py3.5")
            .command("mpirun python train.py")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_argument_vector() {
        let executor = Arc::new(RecordingExecutor::new().ok("job submitted\n"));
        let output = client(&executor).training().submit(&mpi_job()).await.unwrap();
        assert_eq!(output, "job submitted\n");

        let argv = executor.last_call();
        assert_eq!(&argv[..4], ["arena", "submit", "mpijob", "--namespace=default"]);
        for expected in ["--name=mpi-dist", "--workers=1", "--gpus=1", "--tensorboard"] {
            assert!(argv.contains(&expected.to_string()), "missing {expected}");
        }
        assert_eq!(argv.last().map(String::as_str), Some("mpirun python train.py"));
    }

    #[tokio::test]
    async fn test_submit_already_exists() {
        let executor = Arc::new(
            RecordingExecutor::new().fail(1, "the job mpi-dist is already exist, please delete it first.\n"),
        );
        let err = client(&executor).training().submit(&mpi_job()).await.unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(err.code(), "training-job-exists");
    }

    #[tokio::test]
    async fn test_submit_other_failure() {
        let executor = Arc::new(RecordingExecutor::new().fail(1, "image pull secret missing"));
        let err = client(&executor).training().submit(&mpi_job()).await.unwrap_err();
        assert_eq!(err.code(), "training-submit-failed");
    }

    #[tokio::test]
    async fn test_list_arguments_and_decode() {
        let executor = Arc::new(RecordingExecutor::new().ok(&format!("[{}]", job_json("RUNNING"))));
        let jobs = client(&executor)
            .training()
            .list(TrainingJobType::Mpi, true)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].instances[0].owner, "mpi-dist");
        assert_eq!(
            executor.last_call(),
            ["arena", "list", "--namespace=default", "--type=mpijob", "-A", "-o", "json"]
        );
    }

    #[tokio::test]
    async fn test_list_all_types_has_no_filter() {
        let executor = Arc::new(RecordingExecutor::new().ok("[]"));
        let jobs = client(&executor)
            .training()
            .list(TrainingJobType::All, false)
            .await
            .unwrap();
        assert!(jobs.is_empty());
        assert_eq!(executor.last_call(), ["arena", "list", "--namespace=default", "-o", "json"]);
    }

    #[tokio::test]
    async fn test_get_found() {
        let executor = Arc::new(RecordingExecutor::new().ok(&job_json("RUNNING")));
        let info = client(&executor)
            .training()
            .get("mpi-dist", TrainingJobType::Mpi)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(info.status, TrainingJobStatus::Running);
        assert_eq!(info.instances[0].owner_type, TrainingJobType::Mpi);
        assert_eq!(
            executor.last_call(),
            ["arena", "get", "--namespace=default", "--type=mpijob", "mpi-dist", "-o", "json"]
        );
    }

    #[tokio::test]
    async fn test_get_twice_is_stable() {
        let executor = Arc::new(RecordingExecutor::new().ok(&job_json("RUNNING")).ok(&job_json("RUNNING")));
        let training = client(&executor).training();
        let first = training.get("mpi-dist", TrainingJobType::Mpi).await.unwrap();
        let second = training.get("mpi-dist", TrainingJobType::Mpi).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_not_found_is_none() {
        let executor = Arc::new(RecordingExecutor::new().fail(1, NOT_FOUND));
        let info = client(&executor)
            .training()
            .get("mpi-dist", TrainingJobType::All)
            .await
            .unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn test_get_not_found_in_other_namespace_is_error() {
        let executor = Arc::new(RecordingExecutor::new().fail(1, NOT_FOUND));
        let err = client(&executor)
            .training()
            .namespace("ml")
            .get("mpi-dist", TrainingJobType::All)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "training-get-failed");
    }

    #[tokio::test]
    async fn test_get_not_found_with_unset_namespace() {
        let executor = Arc::new(RecordingExecutor::new().fail(1, NOT_FOUND));
        let config = ClientConfig::default().with_namespace("").with_log_level("");
        let info = ArenaClient::with_executor(config, Arc::clone(&executor) as Arc<dyn CommandExecutor>)
            .training()
            .get("mpi-dist", TrainingJobType::All)
            .await
            .unwrap();
        assert!(info.is_none());
        assert!(!executor.last_call().iter().any(|arg| arg.starts_with("--namespace")));
    }

    #[tokio::test]
    async fn test_get_bad_json() {
        let executor = Arc::new(RecordingExecutor::new().ok("{ truncated"));
        let err = client(&executor)
            .training()
            .get("mpi-dist", TrainingJobType::All)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "decode-failed");
    }

    #[tokio::test]
    async fn test_delete_and_prune() {
        let executor = Arc::new(RecordingExecutor::new().ok("deleted").ok("pruned"));
        let training = client(&executor).training();
        training.delete("mpi-dist", TrainingJobType::Mpi).await.unwrap();
        training.prune("24h", true).await.unwrap();

        let calls = executor.calls();
        assert_eq!(calls[0], ["arena", "delete", "--namespace=default", "--type=mpijob", "mpi-dist"]);
        assert_eq!(calls[1], ["arena", "prune", "--namespace=default", "--since=24h", "-A"]);
    }

    #[tokio::test]
    async fn test_delete_failure_code() {
        let executor = Arc::new(RecordingExecutor::new().fail(1, "forbidden"));
        let err = client(&executor)
            .training()
            .delete("mpi-dist", TrainingJobType::Mpi)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "training-delete-failed");
    }

    #[tokio::test]
    async fn test_scale_out() {
        let job = EtScaleBuilder::new().name("elastic").count(2).timeout("300").build().unwrap();
        let executor = Arc::new(RecordingExecutor::new().ok("scaled").fail(1, "no workers"));
        let training = client(&executor).training();
        training.scale_out(&job).await.unwrap();
        let err = training.scale_in(&job).await.unwrap_err();
        assert_eq!(err.code(), "training-scale-in-failed");

        let calls = executor.calls();
        assert_eq!(&calls[0][..3], ["arena", "scaleout", "etjob"]);
        assert_eq!(&calls[1][..3], ["arena", "scalein", "etjob"]);
        assert!(calls[0].contains(&"--count=2".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_running() {
        let executor = Arc::new(
            RecordingExecutor::new()
                .ok(&job_json("PENDING"))
                .ok(&job_json("PENDING"))
                .ok(&job_json("RUNNING")),
        );
        let info = client(&executor)
            .training()
            .wait_for_running("mpi-dist", TrainingJobType::Mpi, &WaitPolicy::default())
            .await
            .unwrap();
        assert_eq!(info.status, TrainingJobStatus::Running);
        assert_eq!(executor.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_running_returns_terminal_state() {
        let executor = Arc::new(RecordingExecutor::new().ok(&job_json("FAILED")));
        let info = client(&executor)
            .training()
            .wait_for_running("mpi-dist", TrainingJobType::Mpi, &WaitPolicy::default())
            .await
            .unwrap();
        assert!(info.status.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_running_times_out() {
        let executor = Arc::new(
            RecordingExecutor::new()
                .ok(&job_json("PENDING"))
                .ok(&job_json("PENDING")),
        );
        let policy = WaitPolicy::new(Duration::from_secs(1), 2);
        let err = client(&executor)
            .training()
            .wait_for_running("mpi-dist", TrainingJobType::Mpi, &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, ArenaError::WaitTimeout { attempts: 2, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_running_missing_job() {
        let executor = Arc::new(RecordingExecutor::new().fail(1, NOT_FOUND));
        let err = client(&executor)
            .training()
            .wait_for_running("mpi-dist", TrainingJobType::Mpi, &WaitPolicy::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
