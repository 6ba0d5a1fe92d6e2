//! Client configuration.
//!
//! [`ClientConfig`] holds everything that ends up in the global flags of an
//! `arena` invocation, plus the deadlines this library adds on top. It can
//! be built in code or loaded from TOML:
//!
//! ```toml
//! binary = "/usr/local/bin/arena"
//! namespace = "ml-team"
//! log_level = "debug"
//! execution_timeout_secs = 300
//! ```
//!
//! `execution_timeout_secs` may be fractional (`0.5`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};

/// Default tool name, resolved through `PATH`.
pub const DEFAULT_BINARY: &str = "arena";

/// Default job namespace.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default tool log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default namespace of the arena control plane.
pub const DEFAULT_ARENA_NAMESPACE: &str = "arena-system";

/// Default read timeout for log streams, in seconds.
pub const DEFAULT_LOG_READ_TIMEOUT_SECS: u64 = 10;

/// Configuration shared by every client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Tool to execute.
    pub binary: String,
    /// Kubeconfig passed as `--config=`. Omitted when unset.
    pub kubeconfig: Option<PathBuf>,
    /// Namespace passed as `--namespace=`. Omitted when empty.
    pub namespace: String,
    /// Tool log level passed as `--loglevel=`. Omitted when empty.
    pub log_level: String,
    /// Control-plane namespace passed as `--arena-namespace=`. Omitted when empty.
    pub arena_namespace: String,
    /// Kill the tool if it runs longer than this. No deadline when unset.
    #[serde(
        rename = "execution_timeout_secs",
        with = "optional_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_timeout: Option<Duration>,
    /// Default read timeout for log streams.
    pub log_read_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            kubeconfig: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            arena_namespace: DEFAULT_ARENA_NAMESPACE.to_string(),
            execution_timeout: None,
            log_read_timeout_secs: DEFAULT_LOG_READ_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Defaults, plus `~/.kube/config` as the kubeconfig when that file exists.
    #[must_use]
    pub fn detect() -> Self {
        Self::default().or_kubeconfig(default_kubeconfig())
    }

    /// Use `fallback` as the kubeconfig unless one is already set.
    #[must_use]
    pub fn or_kubeconfig(mut self, fallback: Option<PathBuf>) -> Self {
        if self.kubeconfig.is_none() {
            self.kubeconfig = fallback;
        }
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ArenaError::config(format!(
                "failed to read config file '{}': {e}",
                path.as_ref().display()
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ArenaError::config(format!("invalid TOML: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the binary or namespace is empty or a timeout is
    /// zero.
    pub fn validate(&self) -> Result<()> {
        if self.binary.trim().is_empty() {
            return Err(ArenaError::config("binary cannot be empty"));
        }

        if self.namespace.trim().is_empty() {
            return Err(ArenaError::config("namespace cannot be empty"));
        }

        if self.execution_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ArenaError::config(
                "execution_timeout_secs must be greater than 0",
            ));
        }

        if self.log_read_timeout_secs == 0 {
            return Err(ArenaError::config(
                "log_read_timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Set the tool to execute.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the kubeconfig path.
    #[must_use]
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    /// Set the job namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the tool log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the control-plane namespace.
    #[must_use]
    pub fn with_arena_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.arena_namespace = namespace.into();
        self
    }

    /// Set the execution deadline.
    #[must_use]
    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = Some(timeout);
        self
    }

    /// Set the default log read timeout.
    #[must_use]
    pub fn with_log_read_timeout(mut self, timeout: Duration) -> Self {
        self.log_read_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// The execution deadline, if any.
    #[must_use]
    pub fn execution_timeout(&self) -> Option<Duration> {
        self.execution_timeout
    }

    /// The default log read timeout.
    #[must_use]
    pub fn log_read_timeout(&self) -> Duration {
        Duration::from_secs(self.log_read_timeout_secs)
    }

    /// Global flags, in the order the tool documents them.
    ///
    /// Each flag is present only when its value is non-empty.
    #[must_use]
    pub fn global_flags(&self) -> Vec<String> {
        let kubeconfig = self
            .kubeconfig
            .as_deref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        [
            ("--namespace", self.namespace.as_str()),
            ("--config", kubeconfig.as_str()),
            ("--loglevel", self.log_level.as_str()),
            ("--arena-namespace", self.arena_namespace.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(flag, value)| format!("{flag}={value}"))
        .collect()
    }
}

/// An optional duration written as seconds, fractions allowed.
mod optional_secs {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(D::Error::custom))
            .transpose()
    }
}

/// `~/.kube/config`, if it exists.
#[must_use]
pub fn default_kubeconfig() -> Option<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .filter(|path| path.is_file())
}
