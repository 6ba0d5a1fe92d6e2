//! Closed sets of job kinds, serving kinds, node kinds and job states.
//!
//! Every enum round-trips through the string form the `arena` tool uses on
//! its command line and in its JSON output. Unrecognized strings decode to
//! an `Unknown` variant instead of failing, so a newer tool version cannot
//! break decoding of an otherwise valid payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of training job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrainingJobType {
    /// TensorFlow distributed training.
    Tf,
    /// MPI training.
    Mpi,
    /// PyTorch training.
    Pytorch,
    /// Horovod training.
    Horovod,
    /// Volcano batch job.
    Volcano,
    /// Elastic training.
    Et,
    /// Spark job.
    Spark,
    /// Every kind; used as a list filter.
    All,
    /// A kind this library does not know.
    #[default]
    Unknown,
}

impl TrainingJobType {
    /// Every concrete kind, in a stable order.
    pub const CONCRETE: [Self; 7] = [
        Self::Tf,
        Self::Mpi,
        Self::Pytorch,
        Self::Horovod,
        Self::Volcano,
        Self::Et,
        Self::Spark,
    ];

    /// The name used on the command line and in JSON output.
    #[must_use]
    pub fn alias(&self) -> &'static str {
        match self {
            Self::Tf => "tfjob",
            Self::Mpi => "mpijob",
            Self::Pytorch => "pytorchjob",
            Self::Horovod => "horovodjob",
            Self::Volcano => "volcanojob",
            Self::Et => "etjob",
            Self::Spark => "sparkjob",
            Self::All => "",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the command-line name. Unrecognized names map to `Unknown`.
    #[must_use]
    pub fn from_alias(alias: &str) -> Self {
        if alias.is_empty() {
            return Self::All;
        }
        Self::CONCRETE
            .into_iter()
            .find(|t| t.alias().eq_ignore_ascii_case(alias))
            .unwrap_or(Self::Unknown)
    }

    /// The value for a `--type=` filter, if this kind narrows a query.
    #[must_use]
    pub fn filter(&self) -> Option<&'static str> {
        match self {
            Self::All | Self::Unknown => None,
            other => Some(other.alias()),
        }
    }
}

impl fmt::Display for TrainingJobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

impl From<String> for TrainingJobType {
    fn from(value: String) -> Self {
        Self::from_alias(&value)
    }
}

impl From<TrainingJobType> for String {
    fn from(value: TrainingJobType) -> Self {
        value.alias().to_string()
    }
}

/// Kind of serving job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServingJobType {
    /// TensorFlow Serving.
    Tf,
    /// TensorRT Inference Server.
    Trt,
    /// Triton Inference Server.
    Triton,
    /// KFServing.
    KfServing,
    /// A user-supplied serving image.
    Custom,
    /// Every kind; used as a list filter.
    All,
    /// A kind this library does not know.
    #[default]
    Unknown,
}

impl ServingJobType {
    /// Every concrete kind, in a stable order.
    pub const CONCRETE: [Self; 5] = [
        Self::Tf,
        Self::Trt,
        Self::Triton,
        Self::KfServing,
        Self::Custom,
    ];

    /// The short name used as the `arena serve` subcommand and `--type=` value.
    #[must_use]
    pub fn shorthand(&self) -> &'static str {
        match self {
            Self::Tf => "tf",
            Self::Trt => "trt",
            Self::Triton => "triton",
            Self::KfServing => "kf",
            Self::Custom => "custom",
            Self::All => "",
            Self::Unknown => "unknown",
        }
    }

    /// The display name the tool prints in its tables.
    #[must_use]
    pub fn alias(&self) -> &'static str {
        match self {
            Self::Tf => "Tensorflow",
            Self::Trt => "Tensorrt",
            Self::Triton => "Triton",
            Self::KfServing => "KFServing",
            Self::Custom => "Custom",
            Self::All => "",
            Self::Unknown => "Unknown",
        }
    }

    /// The full name the tool uses in JSON payloads.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Tf => "tf-serving",
            Self::Trt => "trt-serving",
            Self::Triton => "triton-serving",
            Self::KfServing => "kf-serving",
            Self::Custom => "custom-serving",
            Self::All => "",
            Self::Unknown => "unknown",
        }
    }

    /// Parse any of the shorthand, display or wire names, ignoring case.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.is_empty() {
            return Self::All;
        }
        Self::CONCRETE
            .into_iter()
            .find(|t| {
                t.shorthand().eq_ignore_ascii_case(value)
                    || t.alias().eq_ignore_ascii_case(value)
                    || t.wire_name().eq_ignore_ascii_case(value)
            })
            .unwrap_or(Self::Unknown)
    }

    /// The value for a `--type=` filter, if this kind narrows a query.
    #[must_use]
    pub fn filter(&self) -> Option<&'static str> {
        match self {
            Self::All | Self::Unknown => None,
            other => Some(other.shorthand()),
        }
    }
}

impl fmt::Display for ServingJobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shorthand())
    }
}

impl From<String> for ServingJobType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ServingJobType> for String {
    fn from(value: ServingJobType) -> Self {
        value.wire_name().to_string()
    }
}

/// Kind of evaluate job. The tool has a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EvaluateJobType {
    /// Model evaluation.
    #[default]
    #[serde(rename = "model")]
    Model,
}

impl EvaluateJobType {
    /// The `arena evaluate` subcommand.
    #[must_use]
    pub fn alias(&self) -> &'static str {
        "model"
    }
}

impl fmt::Display for EvaluateJobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

/// Category of cluster node reported by `arena top node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeType {
    /// Nodes whose GPUs are allocated whole.
    GpuExclusive,
    /// Nodes whose GPUs are shared by memory.
    GpuShare,
    /// Nodes scheduled with GPU topology awareness.
    GpuTopology,
    /// Nodes without GPUs.
    Normal,
    /// Every category.
    #[default]
    All,
    /// A category this library does not know.
    Unknown,
}

impl NodeType {
    /// The value passed to `-m=`.
    #[must_use]
    pub fn shorthand(&self) -> &'static str {
        match self {
            Self::GpuExclusive => "e",
            Self::GpuShare => "s",
            Self::GpuTopology => "t",
            Self::Normal => "n",
            Self::All => "",
            Self::Unknown => "unknown",
        }
    }

    /// The value for a `-m=` filter, if this category narrows a query.
    #[must_use]
    pub fn filter(&self) -> Option<&'static str> {
        match self {
            Self::All | Self::Unknown => None,
            other => Some(other.shorthand()),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shorthand())
    }
}

/// Aggregate status of a training job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrainingJobStatus {
    /// Accepted but not yet running.
    Pending,
    /// At least one instance is running.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Elastic job is changing its worker count.
    Scaling,
    /// Anything else the tool reports.
    #[default]
    Unknown,
}

impl TrainingJobStatus {
    /// The status string the tool prints.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Scaling => "SCALING",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Whether the job can no longer change state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for TrainingJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TrainingJobStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "SCALING" => Self::Scaling,
            _ => Self::Unknown,
        }
    }
}

impl From<TrainingJobStatus> for String {
    fn from(value: TrainingJobStatus) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("tfjob", TrainingJobType::Tf)]
    #[test_case("mpijob", TrainingJobType::Mpi)]
    #[test_case("PyTorchJob", TrainingJobType::Pytorch ; "case insensitive")]
    #[test_case("sparkjob", TrainingJobType::Spark)]
    #[test_case("", TrainingJobType::All)]
    #[test_case("rayjob", TrainingJobType::Unknown)]
    fn test_training_from_alias(alias: &str, expected: TrainingJobType) {
        assert_eq!(TrainingJobType::from_alias(alias), expected);
    }

    #[test]
    fn test_training_alias_roundtrip() {
        for kind in TrainingJobType::CONCRETE {
            assert_eq!(TrainingJobType::from_alias(kind.alias()), kind);
        }
    }

    #[test]
    fn test_training_filter() {
        assert_eq!(TrainingJobType::Mpi.filter(), Some("mpijob"));
        assert_eq!(TrainingJobType::All.filter(), None);
        assert_eq!(TrainingJobType::Unknown.filter(), None);
    }

    #[test]
    fn test_training_type_serde() {
        let kind: TrainingJobType = serde_json::from_str("\"tfjob\"").unwrap();
        assert_eq!(kind, TrainingJobType::Tf);
        assert_eq!(serde_json::to_string(&TrainingJobType::Et).unwrap(), "\"etjob\"");
    }

    #[test_case("tf", ServingJobType::Tf ; "shorthand")]
    #[test_case("Tensorflow", ServingJobType::Tf ; "display name")]
    #[test_case("tf-serving", ServingJobType::Tf ; "wire name")]
    #[test_case("KFSERVING", ServingJobType::KfServing ; "upper case display")]
    #[test_case("trt-serving", ServingJobType::Trt ; "trt wire name")]
    #[test_case("seldon", ServingJobType::Unknown ; "unknown")]
    fn test_serving_parse(value: &str, expected: ServingJobType) {
        assert_eq!(ServingJobType::parse(value), expected);
    }

    #[test]
    fn test_serving_filter_uses_shorthand() {
        assert_eq!(ServingJobType::Triton.filter(), Some("triton"));
        assert_eq!(ServingJobType::All.filter(), None);
    }

    #[test]
    fn test_node_type_filter() {
        assert_eq!(NodeType::GpuShare.filter(), Some("s"));
        assert_eq!(NodeType::Normal.filter(), Some("n"));
        assert_eq!(NodeType::All.filter(), None);
    }

    #[test_case("PENDING", TrainingJobStatus::Pending)]
    #[test_case("Running", TrainingJobStatus::Running)]
    #[test_case("SUCCEEDED", TrainingJobStatus::Succeeded)]
    #[test_case("FAILED", TrainingJobStatus::Failed)]
    #[test_case("SCALING", TrainingJobStatus::Scaling)]
    #[test_case("CREATED", TrainingJobStatus::Unknown)]
    fn test_status_from_string(value: &str, expected: TrainingJobStatus) {
        assert_eq!(TrainingJobStatus::from(value.to_string()), expected);
    }

    #[test]
    fn test_status_terminal() {
        assert!(TrainingJobStatus::Succeeded.is_terminal());
        assert!(TrainingJobStatus::Failed.is_terminal());
        assert!(!TrainingJobStatus::Pending.is_terminal());
        assert!(!TrainingJobStatus::Unknown.is_terminal());
    }
}
