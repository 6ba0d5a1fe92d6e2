//! Serving job kinds and their options.

use super::{JobBuilder, JobKind};
use crate::types::ServingJobType;

job_kind!(
    /// TensorFlow Serving (`arena serve tf`).
    TfServing => ServingJobType::Tf
);
job_kind!(
    /// TensorRT Inference Server (`arena serve trt`).
    TrtServing => ServingJobType::Trt
);
job_kind!(
    /// Triton Inference Server (`arena serve triton`).
    TritonServing => ServingJobType::Triton
);
job_kind!(
    /// KFServing (`arena serve kf`).
    KfServing => ServingJobType::KfServing
);
job_kind!(
    /// User-supplied serving image (`arena serve custom`).
    CustomServing => ServingJobType::Custom
);

/// Serving kinds. Each runtime names its port flags differently.
pub trait ServingKind: JobKind<JobType = ServingJobType> {
    /// Flag for the gRPC port.
    const PORT_FLAG: &'static str = "--port";
    /// Flag for the HTTP port.
    const RESTFUL_PORT_FLAG: &'static str = "--restful-port";
}

impl ServingKind for TfServing {
    const RESTFUL_PORT_FLAG: &'static str = "--restfulPort";
}

impl ServingKind for TrtServing {
    const PORT_FLAG: &'static str = "--grpc-port";
    const RESTFUL_PORT_FLAG: &'static str = "--http-port";
}

impl ServingKind for TritonServing {
    const PORT_FLAG: &'static str = "--grpc-port";
    const RESTFUL_PORT_FLAG: &'static str = "--http-port";
}

impl ServingKind for KfServing {}
impl ServingKind for CustomServing {}

macro_rules! serving_kind {
    ($($name:ident),+) => {
        $(option_groups!($name => WithImage, WithEnvs, WithResources, WithReplicas,
            WithPlacement, WithCommand);)+
    };
}

serving_kind!(TfServing, TrtServing, TritonServing, KfServing, CustomServing);
option_groups!(TrtServing => WithShell);
option_groups!(TritonServing => WithShell);

/// Builder for TensorFlow Serving jobs.
pub type TfServingBuilder = JobBuilder<TfServing>;
/// Builder for TensorRT serving jobs.
pub type TrtServingBuilder = JobBuilder<TrtServing>;
/// Builder for Triton serving jobs.
pub type TritonServingBuilder = JobBuilder<TritonServing>;
/// Builder for KFServing jobs.
pub type KfServingBuilder = JobBuilder<KfServing>;
/// Builder for custom serving jobs.
pub type CustomServingBuilder = JobBuilder<CustomServing>;

impl<K: ServingKind> JobBuilder<K> {
    /// Serving version (`--version`).
    ///
    /// Also remembered on the job so later lookups can name it.
    #[must_use]
    pub fn version(self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.capture_version(&version).scalar("--version", version)
    }

    /// GPU memory per instance, in GiB (`--gpumemory`).
    #[must_use]
    pub fn gpu_memory(self, gib: u32) -> Self {
        self.number("--gpumemory", gib)
    }

    /// Inject an Istio sidecar (`--enable-istio`).
    #[must_use]
    pub fn enable_istio(self) -> Self {
        self.switch("--enable-istio")
    }

    /// gRPC port of the serving runtime.
    #[must_use]
    pub fn port(self, port: u16) -> Self {
        self.number(K::PORT_FLAG, port)
    }

    /// HTTP port of the serving runtime.
    #[must_use]
    pub fn restful_port(self, port: u16) -> Self {
        self.number(K::RESTFUL_PORT_FLAG, port)
    }
}

impl JobBuilder<TfServing> {
    /// Model name (`--model-name`).
    #[must_use]
    pub fn model_name(self, name: impl Into<String>) -> Self {
        self.scalar("--model-name", name)
    }

    /// Model path inside the container (`--model-path`).
    #[must_use]
    pub fn model_path(self, path: impl Into<String>) -> Self {
        self.scalar("--model-path", path)
    }

    /// Model config file (`--modelConfigFile`).
    #[must_use]
    pub fn model_config_file(self, path: impl Into<String>) -> Self {
        self.scalar("--modelConfigFile", path)
    }

    /// Which model versions to serve (`--version-policy`).
    #[must_use]
    pub fn version_policy(self, policy: impl Into<String>) -> Self {
        self.scalar("--version-policy", policy)
    }
}

impl JobBuilder<TrtServing> {
    /// Model store path (`--model-store`).
    #[must_use]
    pub fn model_store(self, store: impl Into<String>) -> Self {
        self.scalar("--model-store", store)
    }

    /// gRPC port (`--grpc-port`).
    #[must_use]
    pub fn grpc_port(self, port: u16) -> Self {
        self.port(port)
    }

    /// HTTP port (`--http-port`).
    #[must_use]
    pub fn http_port(self, port: u16) -> Self {
        self.restful_port(port)
    }

    /// Metrics port (`--metric-port`).
    #[must_use]
    pub fn metric_port(self, port: u16) -> Self {
        self.number("--metric-port", port)
    }

    /// Expose metrics (`--allow-metrics`).
    #[must_use]
    pub fn allow_metrics(self) -> Self {
        self.switch("--allow-metrics")
    }
}

impl JobBuilder<TritonServing> {
    /// Model repository path (`--model-repository`).
    #[must_use]
    pub fn model_repository(self, repository: impl Into<String>) -> Self {
        self.scalar("--model-repository", repository)
    }

    /// gRPC port (`--grpc-port`).
    #[must_use]
    pub fn grpc_port(self, port: u16) -> Self {
        self.port(port)
    }

    /// HTTP port (`--http-port`).
    #[must_use]
    pub fn http_port(self, port: u16) -> Self {
        self.restful_port(port)
    }

    /// Metrics port (`--metrics-port`).
    #[must_use]
    pub fn metrics_port(self, port: u16) -> Self {
        self.number("--metrics-port", port)
    }

    /// Expose metrics (`--allow-metrics`).
    #[must_use]
    pub fn allow_metrics(self) -> Self {
        self.switch("--allow-metrics")
    }
}

impl JobBuilder<KfServing> {
    /// Model framework, e.g. `tensorflow` or `custom` (`--model-type`).
    #[must_use]
    pub fn model_type(self, model_type: impl Into<String>) -> Self {
        self.scalar("--model-type", model_type)
    }

    /// Model location (`--storage-uri`).
    #[must_use]
    pub fn storage_uri(self, uri: impl Into<String>) -> Self {
        self.scalar("--storage-uri", uri)
    }

    /// Share of traffic routed to the canary (`--canary-percent`).
    #[must_use]
    pub fn canary_percent(self, percent: u8) -> Self {
        self.number("--canary-percent", percent)
    }
}
