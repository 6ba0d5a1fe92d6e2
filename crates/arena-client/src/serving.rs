//! Serving job client.

use arena_jobs::{ServingJob, ServingJobType};
use tracing::{debug, info};

use crate::context::{ClientContext, decode_output};
use crate::error::{Domain, Operation, Result};
use crate::logs::{LogOptions, LogStream};
use crate::model::{ServingInstance, ServingJobInfo};

/// Deploys and inspects inference services (`arena serve ...`).
#[derive(Debug, Clone)]
pub struct ServingClient {
    ctx: ClientContext,
}

impl ServingClient {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// A copy of this client bound to `namespace`.
    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Self {
        Self::new(self.ctx.with_namespace(namespace))
    }

    /// Deploy a serving job and return the tool's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArenaError::AlreadyExists`] if a job with the same
    /// name exists, or another error if the deployment fails.
    pub async fn submit(&self, job: &ServingJob) -> Result<String> {
        let shorthand = job.job_type().shorthand();
        let line = self.ctx.command(&["serve", shorthand]).job(job);
        let output = self
            .ctx
            .run(Domain::Serving, Operation::Submit, job.name(), line)
            .await?;
        info!(
            job = job.name(),
            kind = shorthand,
            version = job.version().unwrap_or_default(),
            "serving job submitted"
        );
        Ok(output)
    }

    /// List serving jobs of `job_type`, or of every kind for [`ServingJobType::All`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn list(&self, job_type: ServingJobType) -> Result<Vec<ServingJobInfo>> {
        let line = self
            .ctx
            .command(&["serve", "list"])
            .opt("--type", job_type.filter())
            .json_output();
        let output = self.ctx.run(Domain::Serving, Operation::List, "", line).await?;
        decode_output(Domain::Serving, Operation::List, &output, ServingJobInfo::decode_list)
    }

    /// Fetch one serving job. A job that does not exist yields `Ok(None)`.
    ///
    /// An empty `version` matches any version.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails for any other reason or its
    /// output cannot be decoded.
    pub async fn get(&self, name: &str, job_type: ServingJobType, version: &str) -> Result<Option<ServingJobInfo>> {
        let line = self
            .ctx
            .command(&["serve", "get"])
            .opt("--type", job_type.filter())
            .opt("--version", Some(version))
            .arg(name)
            .json_output();
        match self.ctx.run(Domain::Serving, Operation::Get, name, line).await {
            Ok(output) => {
                decode_output(Domain::Serving, Operation::Get, &output, ServingJobInfo::decode).map(Some)
            }
            Err(e) if e.is_not_found() => {
                debug!(job = name, "serving job not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a serving job and return the tool's confirmation text.
    ///
    /// An empty `version` deletes every version.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn delete(&self, name: &str, job_type: ServingJobType, version: &str) -> Result<String> {
        let line = self
            .ctx
            .command(&["serve", "delete"])
            .opt("--type", job_type.filter())
            .opt("--version", Some(version))
            .arg(name);
        let output = self.ctx.run(Domain::Serving, Operation::Delete, name, line).await?;
        info!(job = name, version, "serving job deleted");
        Ok(output)
    }

    /// Stream the log of one pod of a serving job.
    ///
    /// # Errors
    ///
    /// Returns an error if no log transport is configured or the stream
    /// cannot be opened.
    pub async fn logs(&self, instance: &ServingInstance, options: &LogOptions) -> Result<LogStream> {
        self.ctx.logs(&instance.instance_ref(), options).await
    }
}
