//! Error types for arena client operations.
//!
//! Every failure a caller can see is an [`ArenaError`]. A raw non-zero exit
//! from the tool never escapes: it is classified first (see
//! [`crate::classify`]) into one of the semantic variants below.

use std::fmt;

use arena_command::CommandError;
use arena_jobs::ValidationError;
use thiserror::Error;

/// Result type alias for arena client operations.
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Job domain an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Training jobs.
    Training,
    /// Serving jobs.
    Serving,
    /// Evaluate jobs.
    Evaluate,
    /// Cluster nodes.
    Node,
}

impl Domain {
    /// Lower-case name used in error codes.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Training => "training",
            Self::Serving => "serving",
            Self::Evaluate => "evaluate",
            Self::Node => "node",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a job.
    Submit,
    /// List jobs.
    List,
    /// Fetch one job.
    Get,
    /// Delete a job.
    Delete,
    /// Remove finished jobs.
    Prune,
    /// Remove workers from an elastic job.
    ScaleIn,
    /// Add workers to an elastic job.
    ScaleOut,
    /// Inspect node resources.
    Top,
    /// Stream instance logs.
    Logs,
    /// Poll until a job leaves the pending state.
    Wait,
}

impl Operation {
    /// Lower-case name used in error codes.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::List => "list",
            Self::Get => "get",
            Self::Delete => "delete",
            Self::Prune => "prune",
            Self::ScaleIn => "scale-in",
            Self::ScaleOut => "scale-out",
            Self::Top => "top",
            Self::Logs => "logs",
            Self::Wait => "wait",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by arena client operations.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// A job option was missing or empty. Nothing was executed.
    #[error("invalid job: {0}")]
    Validation(#[from] ValidationError),

    /// The tool could not be run or did not finish.
    #[error("{domain} {operation} could not run: {source}")]
    Execution {
        /// Domain of the operation.
        domain: Domain,
        /// The operation.
        operation: Operation,
        /// Underlying process error.
        #[source]
        source: CommandError,
    },

    /// A job with the same name already exists.
    #[error("{domain} job '{name}' already exists: {message}")]
    AlreadyExists {
        /// Domain of the job.
        domain: Domain,
        /// Job name.
        name: String,
        /// Tool output.
        message: String,
    },

    /// The job does not exist.
    #[error("{domain} job '{name}' not found")]
    NotFound {
        /// Domain of the job.
        domain: Domain,
        /// Job name.
        name: String,
    },

    /// The tool reported a failure no known pattern describes.
    #[error("{domain} {operation} failed: {message}")]
    OperationFailed {
        /// Domain of the operation.
        domain: Domain,
        /// The operation.
        operation: Operation,
        /// Tool output.
        message: String,
    },

    /// The tool succeeded but its output could not be decoded.
    #[error("failed to decode {domain} {operation} output: {message}")]
    Decode {
        /// Domain of the operation.
        domain: Domain,
        /// The operation.
        operation: Operation,
        /// Parser error.
        message: String,
    },

    /// Log streaming failed.
    #[error(transparent)]
    Logs(#[from] LogsError),

    /// A job did not leave the pending state in time.
    #[error("job '{name}' still pending after {attempts} attempts")]
    WaitTimeout {
        /// Job name.
        name: String,
        /// Polls performed.
        attempts: u32,
    },

    /// Client configuration is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl ArenaError {
    /// Create an execution error.
    #[must_use]
    pub fn execution(domain: Domain, operation: Operation, source: CommandError) -> Self {
        Self::Execution {
            domain,
            operation,
            source,
        }
    }

    /// Create an already-exists error.
    #[must_use]
    pub fn already_exists(domain: Domain, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            domain,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(domain: Domain, name: impl Into<String>) -> Self {
        Self::NotFound {
            domain,
            name: name.into(),
        }
    }

    /// Create a generic operation failure.
    #[must_use]
    pub fn operation_failed(domain: Domain, operation: Operation, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            domain,
            operation,
            message: message.into(),
        }
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(domain: Domain, operation: Operation, message: impl Into<String>) -> Self {
        Self::Decode {
            domain,
            operation,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Validation(_) => "validation-failed".to_string(),
            Self::Execution { .. } => "execution-failed".to_string(),
            Self::AlreadyExists { domain, .. } => format!("{domain}-job-exists"),
            Self::NotFound { domain, .. } => format!("{domain}-job-not-found"),
            Self::OperationFailed {
                domain, operation, ..
            } => format!("{domain}-{operation}-failed"),
            Self::Decode { .. } => "decode-failed".to_string(),
            Self::Logs(_) => "logs-failed".to_string(),
            Self::WaitTimeout { .. } => "wait-timeout".to_string(),
            Self::Config { .. } => "config-invalid".to_string(),
        }
    }

    /// Check if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an already-exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Check if repeating the call might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Execution { source, .. } => source.is_timeout(),
            Self::WaitTimeout { .. } => true,
            Self::Logs(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Errors from the log stream adapter and its transports.
#[derive(Debug, Error)]
pub enum LogsError {
    /// The client was built without a log transport.
    #[error("no log transport configured")]
    NoTransport,

    /// The instance description lacks container information.
    #[error("instance {namespace}/{instance} has no container information")]
    NoContainers {
        /// Instance namespace.
        namespace: String,
        /// Instance name.
        instance: String,
    },

    /// The request could not be sent.
    #[error("logs request could not be issued: {message}")]
    Request {
        /// Description of the failure.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("logs request failed: {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Reading the stream failed after it was opened.
    #[error("failed to read log stream: {message}")]
    Read {
        /// Description of the failure.
        message: String,
    },

    /// Transport configuration is invalid.
    #[error("invalid log transport configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl LogsError {
    /// Create a request error.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Create a read error.
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if repeating the call might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } | Self::Read { .. } => true,
            Self::Status { status } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
