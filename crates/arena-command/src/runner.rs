//! Process runner for the `arena` command-line tool.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::{Pin, pin};
use std::process::Stdio;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use crate::error::{CommandError, Result};
use crate::sanitize::sanitize_arguments;

/// Boxed future returned by [`CommandExecutor::execute`].
pub type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Runs an argument vector and returns the combined output transcript.
///
/// The first element of `argv` is the program. Implementations must report a
/// non-zero exit as [`CommandError::ExitCode`] carrying the transcript, since
/// callers classify failures by inspecting it.
pub trait CommandExecutor: Send + Sync + fmt::Debug {
    /// Execute the command and wait for it to finish.
    fn execute<'a>(&'a self, argv: &'a [String]) -> ExecuteFuture<'a>;
}

/// Build a printable description of a command for logs and errors.
#[must_use]
pub fn command_description<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    let mut description = program.to_string();
    for arg in args {
        description.push(' ');
        description.push_str(arg.as_ref());
    }
    description
}

/// Lines of `reader`, each with its newline. A final unterminated line is
/// yielded as it is.
fn lines<R>(reader: R) -> impl Stream<Item = std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    stream::unfold(Some(BufReader::new(reader)), |state| async move {
        let mut reader = state?;
        let mut line = Vec::new();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => None,
            Ok(_) => Some((Ok(line), Some(reader))),
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// Spawns real processes via tokio.
///
/// No shell is involved: the program is resolved through `PATH` (or used as
/// a path directly) and the arguments are passed as-is after sanitization.
///
/// Stdout and stderr are read from separate pipes and merged a whole line at
/// a time, in the order lines complete. A line is never split by output from
/// the other stream. Lines written to both streams at nearly the same moment
/// may come out in either order, so the transcript can differ from a terminal
/// that shares one pipe between them. The transcript is decoded lossily.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    current_dir: Option<PathBuf>,
    env_vars: Vec<(String, String)>,
}

impl ProcessRunner {
    /// Create a runner with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the process and fail if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run commands in the given working directory.
    #[must_use]
    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set an environment variable for every command.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// The configured deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `argv` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::ExitCode`] with the combined transcript when the
    /// process exits non-zero, [`CommandError::Timeout`] when the deadline
    /// passes, and [`CommandError::ExecutionFailed`] when the process cannot
    /// be started or is terminated by a signal.
    pub async fn run(&self, argv: &[String]) -> Result<String> {
        let (program, args) = argv.split_first().ok_or(CommandError::EmptyCommand)?;
        if let Some(index) = argv.iter().position(|arg| arg.contains('\0')) {
            return Err(CommandError::InvalidArgument {
                index,
                reason: "contains a NUL byte".to_string(),
            });
        }

        let args = sanitize_arguments(args);
        let description = command_description(program, &args);
        debug!(command = %description, "executing command");

        let mut cmd = TokioCommand::new(program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }

        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| CommandError::execution_failed(&description, e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CommandError::execution_failed(&description, "stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CommandError::execution_failed(&description, "stderr was not captured"))?;

        let completion = async {
            let mut merged = pin!(stream::select(lines(stdout), lines(stderr)));
            let mut transcript = Vec::new();
            while let Some(line) = merged.next().await {
                transcript.extend_from_slice(&line?);
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, transcript))
        };

        let completed = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, completion).await {
                Ok(completed) => completed,
                Err(_) => {
                    warn!(command = %description, ?timeout, "command timed out");
                    return Err(CommandError::timeout(description, timeout));
                }
            },
            None => completion.await,
        };

        let (status, transcript) =
            completed.map_err(|e| CommandError::execution_failed(&description, e.to_string()))?;
        let output = String::from_utf8_lossy(&transcript).into_owned();

        match status.code() {
            Some(0) => Ok(output),
            Some(code) => {
                debug!(command = %description, exit_code = code, "command exited with failure");
                Err(CommandError::exit_code(description, code, output))
            }
            None => Err(CommandError::execution_failed(
                description,
                "process was terminated by a signal",
            )),
        }
    }
}

impl CommandExecutor for ProcessRunner {
    fn execute<'a>(&'a self, argv: &'a [String]) -> ExecuteFuture<'a> {
        Box::pin(self.run(argv))
    }
}
