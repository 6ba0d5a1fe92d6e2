//! Evaluate job client.

use arena_jobs::EvaluateJob;
use tracing::{debug, info};

use crate::context::{ClientContext, decode_output};
use crate::error::{Domain, Operation, Result};
use crate::model::EvaluateJobInfo;

/// Runs and inspects model evaluations (`arena evaluate ...`).
#[derive(Debug, Clone)]
pub struct EvaluateClient {
    ctx: ClientContext,
}

impl EvaluateClient {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// A copy of this client bound to `namespace`.
    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Self {
        Self::new(self.ctx.with_namespace(namespace))
    }

    /// Submit an evaluation and return the tool's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArenaError::AlreadyExists`] if a job with the same
    /// name exists, or another error if the submission fails.
    pub async fn submit(&self, job: &EvaluateJob) -> Result<String> {
        let line = self
            .ctx
            .command(&["evaluate", job.job_type().alias()])
            .job(job);
        let output = self
            .ctx
            .run(Domain::Evaluate, Operation::Submit, job.name(), line)
            .await?;
        info!(job = job.name(), "evaluate job submitted");
        Ok(output)
    }

    /// List evaluations.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn list(&self, all_namespaces: bool) -> Result<Vec<EvaluateJobInfo>> {
        let line = self
            .ctx
            .command(&["evaluate", "list"])
            .all_namespaces(all_namespaces)
            .json_output();
        let output = self.ctx.run(Domain::Evaluate, Operation::List, "", line).await?;
        decode_output(Domain::Evaluate, Operation::List, &output, EvaluateJobInfo::decode_list)
    }

    /// Fetch one evaluation. A job that does not exist yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails for any other reason or its
    /// output cannot be decoded.
    pub async fn get(&self, name: &str) -> Result<Option<EvaluateJobInfo>> {
        let line = self
            .ctx
            .command(&["evaluate", "get"])
            .arg(name)
            .json_output();
        match self.ctx.run(Domain::Evaluate, Operation::Get, name, line).await {
            Ok(output) => {
                decode_output(Domain::Evaluate, Operation::Get, &output, EvaluateJobInfo::decode).map(Some)
            }
            Err(e) if e.is_not_found() => {
                debug!(job = name, "evaluate job not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete an evaluation and return the tool's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn delete(&self, name: &str) -> Result<String> {
        let line = self.ctx.command(&["evaluate", "delete"]).arg(name);
        let output = self.ctx.run(Domain::Evaluate, Operation::Delete, name, line).await?;
        info!(job = name, "evaluate job deleted");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arena_jobs::EvaluateJobBuilder;

    use crate::testing::{RecordingExecutor, client};

    #[tokio::test]
    async fn test_submit() {
        let job = EvaluateJobBuilder::new()
            .name("eval-1")
            .model_name("resnet")
            .model_path("/models/resnet")
            .command("python eval.py")
            .build()
            .unwrap();
        let executor = Arc::new(RecordingExecutor::new().ok("job eval-1 submitted"));
        client(&executor).evaluate().submit(&job).await.unwrap();

        let argv = executor.last_call();
        assert_eq!(&argv[..4], ["arena", "evaluate", "model", "--namespace=default"]);
        assert_eq!(argv.last().map(String::as_str), Some("python eval.py"));
    }

    #[tokio::test]
    async fn test_list_all_namespaces() {
        let executor = Arc::new(RecordingExecutor::new().ok(r#"[{"name":"eval-1","jobId":"j1"}]"#));
        let jobs = client(&executor).evaluate().list(true).await.unwrap();
        assert_eq!(jobs[0].job_id, "j1");
        assert_eq!(
            executor.last_call(),
            ["arena", "evaluate", "list", "--namespace=default", "-A", "-o", "json"]
        );
    }

    #[tokio::test]
    async fn test_get_not_found_is_none() {
        let executor = Arc::new(RecordingExecutor::new().fail(
            1,
            "Not found evaluate job eval-1, please check it with `arena serve list | grep eval-1`",
        ));
        assert!(client(&executor).evaluate().get("eval-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_in_namespace() {
        let executor = Arc::new(RecordingExecutor::new().ok("deleted"));
        client(&executor)
            .evaluate()
            .namespace("ml")
            .delete("eval-1")
            .await
            .unwrap();
        assert_eq!(
            executor.last_call(),
            ["arena", "evaluate", "delete", "--namespace=ml", "eval-1"]
        );
    }
}
