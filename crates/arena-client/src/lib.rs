//! Job clients for the `arena` command-line tool.
//!
//! Each client composes an `arena` invocation from a job description and the
//! shared [`ClientConfig`], runs it through a
//! [`CommandExecutor`](arena_command::CommandExecutor) and turns the result
//! into typed payloads or a classified [`ArenaError`].
//!
//! # Overview
//!
//! - [`ArenaClient`]: facade handing out the per-domain clients
//! - [`TrainingClient`], [`ServingClient`], [`EvaluateClient`], [`NodeClient`]
//! - [`classify`]: the table of tool messages recognized on failure
//! - [`model`]: decoded `-o json` output
//! - [`logs`]: pod log streaming with a per-call read timeout
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> arena_client::Result<()> {
//! use arena_client::{ArenaClient, ClientConfig, TrainingJobType};
//! use arena_jobs::MpiJobBuilder;
//!
//! let client = ArenaClient::new(ClientConfig::detect())?;
//! let job = MpiJobBuilder::new()
//!     .name("mpi-dist")
//!     .workers(1)
//!     .gpus(1)
//!     .image("uber/horovod:0.13.11-tf1.10.0-torch0.4.0-py3.5")
//!     .command("mpirun python train.py")
//!     .build()?;
//!
//! client.training().submit(&job).await?;
//! if let Some(info) = client.training().get("mpi-dist", TrainingJobType::Mpi).await? {
//!     println!("{} is {}", info.name, info.status);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod client;
pub mod command_line;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod kubeconfig;
pub mod logs;
pub mod model;
pub mod nodes;
pub mod serving;
pub mod training;

mod context;
#[cfg(test)]
mod testing;

pub use arena_jobs::{NodeType, ServingJobType, TrainingJobStatus, TrainingJobType};
pub use classify::{FailureKind, MESSAGE_PATTERNS, MessageContext, MessagePattern};
pub use client::ArenaClient;
pub use command_line::CommandLine;
pub use config::ClientConfig;
pub use error::{ArenaError, Domain, LogsError, Operation, Result};
pub use evaluate::EvaluateClient;
pub use kubeconfig::KubeConfig;
pub use logs::kube::KubeApiTransport;
pub use logs::{InstanceRef, LogOptions, LogStream, LogTransport, stream_logs};
pub use nodes::NodeClient;
pub use serving::ServingClient;
pub use training::{TrainingClient, WaitPolicy};
