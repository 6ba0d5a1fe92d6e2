//! Error types for command execution.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The argument vector was empty, so there was no program to run.
    #[error("empty argument vector: no program to execute")]
    EmptyCommand,

    /// An argument can never be passed to a process.
    #[error("argument {index} is invalid: {reason}")]
    InvalidArgument {
        /// Position of the argument in the vector (0 is the program).
        index: usize,
        /// Why it was rejected.
        reason: String,
    },

    /// The process could not be started, or its output could not be read.
    #[error("command execution failed: {command}: {message}")]
    ExecutionFailed {
        /// The command that was executed.
        command: String,
        /// Description of the failure.
        message: String,
    },

    /// The process ran to completion but exited with a non-zero code.
    #[error("command '{command}' exited with code {exit_code}: {output}")]
    ExitCode {
        /// The command that was executed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout and stderr transcript.
        output: String,
    },

    /// The process did not finish within the configured deadline.
    #[error("command '{command}' did not complete within {timeout_ms} ms")]
    Timeout {
        /// The command that was executed.
        command: String,
        /// The deadline, in milliseconds.
        timeout_ms: u64,
    },
}

impl CommandError {
    /// Create an execution failed error.
    #[must_use]
    pub fn execution_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a non-zero exit error.
    #[must_use]
    pub fn exit_code(command: impl Into<String>, exit_code: i32, output: impl Into<String>) -> Self {
        Self::ExitCode {
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(command: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            command: command.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Returns the captured transcript if the process exited non-zero.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::ExitCode { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Returns the exit code if the process exited non-zero.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::ExitCode { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Check if the process ran and reported failure itself.
    ///
    /// Every other variant means the process never produced a verdict.
    #[must_use]
    pub fn is_exit_code(&self) -> bool {
        matches!(self, Self::ExitCode { .. })
    }

    /// Check if this is a deadline error.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
