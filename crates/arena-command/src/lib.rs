//! External process execution for the arena job client.
//!
//! Every job operation ends up as one invocation of the `arena` command-line
//! tool. This crate owns that boundary: it sanitizes the argument vector,
//! spawns the process without a shell, collects stdout and stderr into a
//! single transcript and reports non-zero exits with the captured output so
//! callers can classify the failure.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), arena_command::CommandError> {
//! use arena_command::{CommandExecutor, ProcessRunner};
//!
//! let runner = ProcessRunner::new();
//! let argv = vec!["arena".to_string(), "list".to_string(), "-o".to_string(), "json".to_string()];
//! let output = runner.execute(&argv).await?;
//! println!("{output}");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod runner;
pub mod sanitize;

pub use error::{CommandError, Result};
pub use runner::{command_description, CommandExecutor, ExecuteFuture, ProcessRunner};
pub use sanitize::{sanitize_argument, sanitize_arguments, QUOTE_STRIPPED_FLAGS};
