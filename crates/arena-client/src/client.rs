//! The facade tying configuration, executor and log transport together.

use std::sync::Arc;

use arena_command::{CommandExecutor, ProcessRunner};
use tracing::debug;

use crate::config::{ClientConfig, default_kubeconfig};
use crate::context::ClientContext;
use crate::error::Result;
use crate::evaluate::EvaluateClient;
use crate::logs::LogTransport;
use crate::nodes::NodeClient;
use crate::serving::ServingClient;
use crate::training::TrainingClient;

/// Entry point producing the per-domain clients.
///
/// Every client handed out shares one configuration, one executor and one
/// optional log transport.
#[derive(Debug, Clone)]
pub struct ArenaClient {
    ctx: ClientContext,
}

impl ArenaClient {
    /// Client running the real tool as configured.
    ///
    /// A configuration without a kubeconfig picks up `~/.kube/config` when
    /// that file exists. [`ArenaClient::with_executor`] takes the
    /// configuration as it is.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let config = config.or_kubeconfig(default_kubeconfig());
        let runner = match config.execution_timeout() {
            Some(timeout) => ProcessRunner::new().with_timeout(timeout),
            None => ProcessRunner::new(),
        };
        debug!(binary = %config.binary, namespace = %config.namespace, "arena client created");
        Ok(Self::with_executor(config, Arc::new(runner)))
    }

    /// Client running commands through `executor`.
    #[must_use]
    pub fn with_executor(config: ClientConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            ctx: ClientContext::new(Arc::new(config), executor, None),
        }
    }

    /// Use `transport` for log streaming.
    #[must_use]
    pub fn with_log_transport(self, transport: Arc<dyn LogTransport>) -> Self {
        Self {
            ctx: self.ctx.with_log_transport(transport),
        }
    }

    /// Training job client.
    #[must_use]
    pub fn training(&self) -> TrainingClient {
        TrainingClient::new(self.ctx.clone())
    }

    /// Serving job client.
    #[must_use]
    pub fn serving(&self) -> ServingClient {
        ServingClient::new(self.ctx.clone())
    }

    /// Evaluate job client.
    #[must_use]
    pub fn evaluate(&self) -> EvaluateClient {
        EvaluateClient::new(self.ctx.clone())
    }

    /// Node inspection client.
    #[must_use]
    pub fn nodes(&self) -> NodeClient {
        NodeClient::new(self.ctx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = ArenaClient::new(ClientConfig::default().with_binary("")).unwrap_err();
        assert_eq!(err.code(), "config-invalid");
    }

    #[test]
    fn test_new_falls_back_to_default_kubeconfig() {
        let client = ArenaClient::new(ClientConfig::default()).unwrap();
        let args = client.ctx.command(&["list"]).into_args();
        let expected = default_kubeconfig().map(|path| format!("--config={}", path.display()));
        assert_eq!(args.iter().find(|arg| arg.starts_with("--config=")).cloned(), expected);
    }

    #[test]
    fn test_new_keeps_explicit_kubeconfig() {
        let client = ArenaClient::new(ClientConfig::default().with_kubeconfig("/etc/arena/kubeconfig")).unwrap();
        let args = client.ctx.command(&["list"]).into_args();
        assert!(args.contains(&"--config=/etc/arena/kubeconfig".to_string()));
    }

    #[test]
    fn test_new_with_timeout() {
        let config = ClientConfig::default().with_execution_timeout(Duration::from_secs(60));
        assert!(ArenaClient::new(config).is_ok());
    }
}
