//! Job descriptions for the `arena` command-line tool.
//!
//! This crate turns typed builder calls into the validated, ordered argument
//! list that an `arena submit`, `arena serve` or `arena evaluate` invocation
//! expects. It never runs anything; see `arena-client` for that.
//!
//! # Overview
//!
//! - [`Field`]: one command-line option that validates and renders itself
//! - [`JobBuilder`]: generic builder; the kind marker selects the setters
//! - [`JobSpec`]: the immutable result of [`JobBuilder::build`]
//! - [`types`]: closed sets of job, serving and node kinds and job states
//!
//! # Example
//!
//! ```
//! use arena_jobs::{CustomServingBuilder, ServingJobType};
//!
//! let job = CustomServingBuilder::new()
//!     .name("fast-style-transfer")
//!     .version("alpha")
//!     .gpus(1)
//!     .restful_port(8501)
//!     .image("happy365/fast-style-transfer:latest")
//!     .command("python app.py")
//!     .build()?;
//!
//! assert_eq!(job.job_type(), ServingJobType::Custom);
//! assert_eq!(job.args().len(), 5);
//! # Ok::<(), arena_jobs::ValidationError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod field;
pub mod spec;
pub mod types;

pub use builder::evaluate::{EvaluateJobBuilder, EvaluateModel};
pub use builder::serving::{
    CustomServing, CustomServingBuilder, KfServing, KfServingBuilder, ServingKind, TfServing,
    TfServingBuilder, TritonServing, TritonServingBuilder, TrtServing, TrtServingBuilder,
};
pub use builder::training::{
    EtJob, EtJobBuilder, EtScale, EtScaleBuilder, HorovodJob, HorovodJobBuilder, MpiJob,
    MpiJobBuilder, PytorchJob, PytorchJobBuilder, SparkJob, SparkJobBuilder, StandardTraining,
    TfJob, TfJobBuilder, VolcanoJob, VolcanoJobBuilder,
};
pub use builder::{JobBuilder, JobKind};
pub use error::{Result, ValidationError, ValidationErrorKind};
pub use field::Field;
pub use spec::{EvaluateJob, JobSpec, ServingJob, TrainingJob};
pub use types::{EvaluateJobType, NodeType, ServingJobType, TrainingJobStatus, TrainingJobType};
