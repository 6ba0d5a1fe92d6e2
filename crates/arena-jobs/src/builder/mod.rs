//! One generic job builder shared by every job kind.
//!
//! [`JobBuilder<K>`] accumulates [`Field`]s in call order. The kind marker
//! `K` fixes the job type discriminator and, through the marker traits in
//! this module, which setters exist. A setter that the tool does not accept
//! for a kind is simply not callable on that kind's builder:
//!
//! ```
//! use arena_jobs::{JobBuilder, MpiJob};
//!
//! let job = JobBuilder::<MpiJob>::new()
//!     .name("mpi-dist")
//!     .workers(1)
//!     .gpus(1)
//!     .enable_tensorboard()
//!     .image("horovod:0.13")
//!     .command("mpirun python train.py")
//!     .build()?;
//!
//! assert_eq!(job.args()[0], "--name=mpi-dist");
//! # Ok::<(), arena_jobs::ValidationError>(())
//! ```

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::error::Result;
use crate::field::{Field, COLON, EQUALS};
use crate::spec::JobSpec;

macro_rules! job_kind {
    ($(#[$meta:meta])* $name:ident => $ty:ident :: $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl $crate::builder::JobKind for $name {
            type JobType = $ty;
            const JOB_TYPE: $ty = $ty::$variant;
        }
    };
}

macro_rules! option_groups {
    ($name:ident => $($group:ident),+ $(,)?) => {
        $(impl $crate::builder::$group for $name {})+
    };
}

pub mod evaluate;
pub mod serving;
pub mod training;

/// A job kind: fixes the type discriminator a builder produces.
pub trait JobKind {
    /// The closed set of types this kind belongs to.
    type JobType: Copy + fmt::Debug;
    /// The discriminator for this kind.
    const JOB_TYPE: Self::JobType;
}

/// Kinds that accept `--image`.
pub trait WithImage: JobKind {}

/// Kinds that accept `--env`.
pub trait WithEnvs: JobKind {}

/// Kinds that accept `--cpu` and `--memory`.
pub trait WithResources: JobKind {}

/// Kinds that accept `--replicas`.
pub trait WithReplicas: JobKind {}

/// Kinds that accept GPU, pull secret, scheduling and volume options.
pub trait WithPlacement: JobKind {}

/// Kinds that accept the `--sync-*` source download options.
pub trait WithDataSync: JobKind {}

/// Kinds that accept `--working-dir`.
pub trait WithWorkingDir: JobKind {}

/// Kinds that accept `--shell`.
pub trait WithShell: JobKind {}

/// Kinds that take a trailing command.
pub trait WithCommand: JobKind {}

/// Accumulates options for one job kind.
#[derive(Debug, Clone)]
pub struct JobBuilder<K> {
    name: Option<String>,
    version: Option<String>,
    namespace: Option<String>,
    fields: Vec<Field>,
    command: Option<String>,
    kind: PhantomData<K>,
}

impl<K: JobKind> Default for JobBuilder<K> {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            namespace: None,
            fields: Vec::new(),
            command: None,
            kind: PhantomData,
        }
    }
}

impl<K: JobKind> JobBuilder<K> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the job name (`--name`).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = Some(name.clone());
        self.scalar("--name", name)
    }

    /// Append an arbitrary option.
    ///
    /// For flags this library has no setter for yet.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Options accumulated so far, in call order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Validate and render every option, in call order.
    ///
    /// # Errors
    ///
    /// Returns the error of the first invalid option. Later options are not
    /// inspected.
    pub fn build(self) -> Result<JobSpec<K::JobType>> {
        let mut args = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            field.validate()?;
            field.render_into(&mut args);
        }

        debug!(
            kind = ?K::JOB_TYPE,
            name = self.name.as_deref().unwrap_or_default(),
            options = self.fields.len(),
            "job built"
        );

        Ok(JobSpec::new(
            K::JOB_TYPE,
            self.name,
            self.version,
            self.namespace,
            args,
            self.command,
        ))
    }

    pub(crate) fn scalar(self, flag: &str, value: impl Into<String>) -> Self {
        self.field(Field::scalar(flag, value))
    }

    pub(crate) fn number(self, flag: &str, value: impl fmt::Display) -> Self {
        self.field(Field::scalar(flag, value.to_string()))
    }

    pub(crate) fn list<I, S>(self, flag: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field(Field::list(flag, values))
    }

    pub(crate) fn map<I, A, B>(self, flag: &str, entries: I, separator: char) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.field(Field::map(flag, entries, separator))
    }

    pub(crate) fn switch(self, flag: &str) -> Self {
        self.field(Field::flag(flag))
    }

    pub(crate) fn capture_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub(crate) fn capture_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }
}

impl<K: WithImage> JobBuilder<K> {
    /// Container image (`--image`).
    #[must_use]
    pub fn image(self, image: impl Into<String>) -> Self {
        self.scalar("--image", image)
    }
}

impl<K: WithEnvs> JobBuilder<K> {
    /// Environment variables (`--env=K=V`).
    #[must_use]
    pub fn envs<I, A, B>(self, envs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--env", envs, EQUALS)
    }
}

impl<K: WithResources> JobBuilder<K> {
    /// CPU request, in Kubernetes quantity notation (`--cpu`).
    #[must_use]
    pub fn cpu(self, cpu: impl Into<String>) -> Self {
        self.scalar("--cpu", cpu)
    }

    /// Memory request, in Kubernetes quantity notation (`--memory`).
    #[must_use]
    pub fn memory(self, memory: impl Into<String>) -> Self {
        self.scalar("--memory", memory)
    }
}

impl<K: WithReplicas> JobBuilder<K> {
    /// Replica count (`--replicas`).
    #[must_use]
    pub fn replicas(self, count: u32) -> Self {
        self.number("--replicas", count)
    }
}

impl<K: WithPlacement> JobBuilder<K> {
    /// GPUs per instance (`--gpus`).
    #[must_use]
    pub fn gpus(self, count: u32) -> Self {
        self.number("--gpus", count)
    }

    /// Image pull secrets (`--image-pull-secret`).
    #[must_use]
    pub fn image_pull_secrets<I, S>(self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list("--image-pull-secret", secrets)
    }

    /// Node selectors (`--selector=K=V`).
    #[must_use]
    pub fn node_selectors<I, A, B>(self, selectors: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--selector", selectors, EQUALS)
    }

    /// Tolerated taints (`--toleration`).
    #[must_use]
    pub fn tolerations<I, S>(self, tolerations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list("--toleration", tolerations)
    }

    /// Pod annotations (`--annotation=K=V`).
    #[must_use]
    pub fn annotations<I, A, B>(self, annotations: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--annotation", annotations, EQUALS)
    }

    /// Persistent volume claims to mount (`--data=claim:path`).
    #[must_use]
    pub fn datas<I, A, B>(self, datas: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--data", datas, COLON)
    }

    /// Host directories to mount (`--data-dir=host:path`).
    #[must_use]
    pub fn data_dirs<I, A, B>(self, dirs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--data-dir", dirs, COLON)
    }
}

impl<K: WithDataSync> JobBuilder<K> {
    /// Image used to download the source (`--sync-image`).
    #[must_use]
    pub fn sync_image(self, image: impl Into<String>) -> Self {
        self.scalar("--sync-image", image)
    }

    /// Source download mode, e.g. `git` or `rsync` (`--sync-mode`).
    #[must_use]
    pub fn sync_mode(self, mode: impl Into<String>) -> Self {
        self.scalar("--sync-mode", mode)
    }

    /// Source location (`--sync-source`).
    #[must_use]
    pub fn sync_source(self, source: impl Into<String>) -> Self {
        self.scalar("--sync-source", source)
    }
}

impl<K: WithWorkingDir> JobBuilder<K> {
    /// Working directory inside the container (`--working-dir`).
    #[must_use]
    pub fn working_dir(self, dir: impl Into<String>) -> Self {
        self.scalar("--working-dir", dir)
    }
}

impl<K: WithShell> JobBuilder<K> {
    /// Shell used to run the command (`--shell`).
    #[must_use]
    pub fn shell(self, shell: impl Into<String>) -> Self {
        self.scalar("--shell", shell)
    }
}

impl<K: WithCommand> JobBuilder<K> {
    /// The trailing command run inside the job's containers.
    ///
    /// Passed to the tool as one final argument when non-empty.
    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}
