//! State shared by the job clients.

use std::sync::Arc;

use arena_command::CommandExecutor;
use tracing::debug;

use crate::classify::{MessageContext, classify_failure};
use crate::command_line::CommandLine;
use crate::config::ClientConfig;
use crate::error::{ArenaError, Domain, LogsError, Operation, Result};
use crate::logs::{InstanceRef, LogOptions, LogStream, LogTransport, stream_logs};
use crate::model::json_payload;

/// Configuration, executor and log transport behind every client.
///
/// Cloning is cheap; rebinding the namespace copies only the configuration.
#[derive(Debug, Clone)]
pub(crate) struct ClientContext {
    config: Arc<ClientConfig>,
    executor: Arc<dyn CommandExecutor>,
    log_transport: Option<Arc<dyn LogTransport>>,
}

impl ClientContext {
    pub(crate) fn new(
        config: Arc<ClientConfig>,
        executor: Arc<dyn CommandExecutor>,
        log_transport: Option<Arc<dyn LogTransport>>,
    ) -> Self {
        Self {
            config,
            executor,
            log_transport,
        }
    }

    pub(crate) fn with_namespace(&self, namespace: &str) -> Self {
        let config = self.config.as_ref().clone().with_namespace(namespace);
        Self {
            config: Arc::new(config),
            executor: Arc::clone(&self.executor),
            log_transport: self.log_transport.clone(),
        }
    }

    pub(crate) fn with_log_transport(self, transport: Arc<dyn LogTransport>) -> Self {
        Self {
            log_transport: Some(transport),
            ..self
        }
    }

    pub(crate) fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub(crate) fn command(&self, subcommands: &[&str]) -> CommandLine {
        CommandLine::new(&self.config, subcommands)
    }

    /// Run `line`, classifying a failure against the job `name`.
    pub(crate) async fn run(
        &self,
        domain: Domain,
        operation: Operation,
        name: &str,
        line: CommandLine,
    ) -> Result<String> {
        debug!(%domain, %operation, job = name, "running arena");
        let ctx = MessageContext::new(name, self.namespace());
        self.executor
            .execute(line.as_slice())
            .await
            .map_err(|e| classify_failure(domain, operation, &ctx, e))
    }

    pub(crate) async fn logs(&self, instance: &InstanceRef, options: &LogOptions) -> Result<LogStream> {
        let transport = self.log_transport.as_deref().ok_or(LogsError::NoTransport)?;
        Ok(stream_logs(transport, instance, options).await?)
    }
}

/// Decode the JSON document in `output` with `decode`.
pub(crate) fn decode_output<T>(
    domain: Domain,
    operation: Operation,
    output: &str,
    decode: impl FnOnce(&str) -> serde_json::Result<T>,
) -> Result<T> {
    decode(json_payload(output)).map_err(|e| ArenaError::decode(domain, operation, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingExecutor;

    #[tokio::test]
    async fn test_with_namespace_leaves_original() {
        let ctx = ClientContext::new(
            Arc::new(ClientConfig::default()),
            Arc::new(RecordingExecutor::new()),
            None,
        );
        let other = ctx.with_namespace("ml");
        assert_eq!(ctx.namespace(), "default");
        assert_eq!(other.namespace(), "ml");
        assert!(other.command(&["list"]).as_slice().contains(&"--namespace=ml".to_string()));
    }

    #[tokio::test]
    async fn test_logs_without_transport() {
        let ctx = ClientContext::new(
            Arc::new(ClientConfig::default()),
            Arc::new(RecordingExecutor::new()),
            None,
        );
        let err = ctx
            .logs(&InstanceRef::new("default", "p"), &LogOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ArenaError::Logs(LogsError::NoTransport)));
        assert_eq!(err.code(), "logs-failed");
    }

    #[test]
    fn test_decode_output_error() {
        let err = decode_output(Domain::Training, Operation::List, "not json", |s| {
            serde_json::from_str::<Vec<String>>(s)
        })
        .unwrap_err();
        assert_eq!(err.code(), "decode-failed");
    }
}
