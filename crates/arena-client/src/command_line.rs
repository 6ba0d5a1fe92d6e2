//! Argument vector composition.

use arena_jobs::JobSpec;

use crate::config::ClientConfig;

/// An `arena` argument vector under construction.
///
/// Starts with the binary, the subcommand words and the global flags, then
/// takes operation-specific arguments in the order they are added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<String>,
}

impl CommandLine {
    /// Start a command: `<binary> <subcommands...> <global flags...>`.
    #[must_use]
    pub fn new(config: &ClientConfig, subcommands: &[&str]) -> Self {
        let mut args = Vec::with_capacity(subcommands.len() + 8);
        args.push(config.binary.clone());
        args.extend(subcommands.iter().map(ToString::to_string));
        args.extend(config.global_flags());
        Self { args }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments in order.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `flag=value` when `value` is present and non-empty.
    #[must_use]
    pub fn opt(self, flag: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.arg(format!("{flag}={value}")),
            _ => self,
        }
    }

    /// Append `-A` when `all` is set.
    #[must_use]
    pub fn all_namespaces(self, all: bool) -> Self {
        if all { self.arg("-A") } else { self }
    }

    /// Request JSON output (`-o json`).
    #[must_use]
    pub fn json_output(self) -> Self {
        self.args(["-o", "json"])
    }

    /// Append a job's rendered options and, if non-empty, its command.
    #[must_use]
    pub fn job<T: Copy>(self, job: &JobSpec<T>) -> Self {
        let line = self.args(job.args().iter().cloned());
        match job.trailing_command() {
            Some(command) => line.arg(command),
            None => line,
        }
    }

    /// The argument vector.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    /// Take the argument vector.
    #[must_use]
    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}
