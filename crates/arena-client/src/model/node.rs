//! Node inspection payloads.
//!
//! `arena top node -d -o json` groups nodes by how their GPUs are shared.
//! Every category carries the [`NodeInfo`] common block; the GPU categories
//! add totals, per-device metrics and the pods placed on them.

use std::collections::BTreeMap;

use arena_jobs::NodeType;
use serde::{Deserialize, Serialize};

use super::nullable;

/// Fields shared by every node category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    /// Node name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Internal IP.
    pub ip: String,
    /// `Ready`, `NotReady`, ...
    pub status: String,
    /// Node role, e.g. `master`.
    pub role: String,
    /// Category as the tool names it.
    #[serde(rename = "type")]
    pub node_type: String,
}

impl NodeInfo {
    /// Whether the node reports `Ready`.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status.eq_ignore_ascii_case("ready")
    }
}

/// Metrics for one GPU device of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeGpuMetric {
    /// Device index.
    pub id: String,
    /// Device UUID.
    pub uuid: String,
    /// Utilization, in percent.
    #[serde(rename = "gpuDutyCycle")]
    pub duty_cycle: f64,
    /// Memory in use, in MiB.
    #[serde(rename = "usedGPUMemory")]
    pub used_memory: f64,
    /// Total memory, in MiB.
    #[serde(rename = "totalGPUMemory")]
    pub total_memory: f64,
    /// Pods using this device.
    #[serde(rename = "podNames", deserialize_with = "nullable")]
    pub pod_names: Vec<String>,
}

/// A node that runs ordinary workloads only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalNode {
    /// Common fields.
    #[serde(flatten)]
    pub info: NodeInfo,
}

/// A pod holding whole GPUs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuExclusivePod {
    /// Pod name.
    pub name: String,
    /// Pod namespace.
    pub namespace: String,
    /// Pod phase.
    pub status: String,
    /// GPUs requested.
    #[serde(rename = "requestGPUs")]
    pub request_gpus: f64,
}

/// A node whose GPUs are allocated whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuExclusiveNode {
    /// Common fields.
    #[serde(flatten)]
    pub info: NodeInfo,
    /// GPUs on the node.
    #[serde(rename = "totalGPUs")]
    pub total_gpus: f64,
    /// GPUs allocated to pods.
    #[serde(rename = "allocatedGPUs")]
    pub allocated_gpus: f64,
    /// GPUs reported unhealthy.
    #[serde(rename = "unhealthyGPUs")]
    pub unhealthy_gpus: f64,
    /// Per-device metrics.
    #[serde(rename = "gpuMetrics", deserialize_with = "nullable")]
    pub gpu_metrics: Vec<NodeGpuMetric>,
    /// Pods placed on the node.
    #[serde(deserialize_with = "nullable")]
    pub instances: Vec<GpuExclusivePod>,
}

/// A pod holding a share of GPU memory and cores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuSharePod {
    /// Pod name.
    pub name: String,
    /// Pod namespace.
    pub namespace: String,
    /// Pod phase.
    pub status: String,
    /// GPU memory requested, in GiB.
    #[serde(rename = "requestGPUMemory")]
    pub request_gpu_memory: f64,
    /// GPU core share requested.
    #[serde(rename = "requestGPUCore")]
    pub request_gpu_core: f64,
    /// Memory allocated per device id.
    #[serde(rename = "gpuMemoryAllocation", deserialize_with = "nullable")]
    pub gpu_memory_allocation: BTreeMap<String, f64>,
    /// Core share allocated per device id.
    #[serde(rename = "gpuCoreAllocation", deserialize_with = "nullable")]
    pub gpu_core_allocation: BTreeMap<String, f64>,
}

/// Allocation state of one shared GPU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuShareDevice {
    /// Device index.
    pub id: String,
    /// Device memory, in GiB.
    #[serde(rename = "totalGPUMemory")]
    pub total_gpu_memory: f64,
    /// Memory handed out, in GiB.
    #[serde(rename = "allocatedGPUMemory")]
    pub allocated_gpu_memory: f64,
    /// Core share available.
    #[serde(rename = "totalGPUCore")]
    pub total_gpu_core: f64,
    /// Core share handed out.
    #[serde(rename = "allocatedGPUCore")]
    pub allocated_gpu_core: f64,
}

/// A node whose GPUs are shared by memory and cores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuShareNode {
    /// Common fields.
    #[serde(flatten)]
    pub info: NodeInfo,
    /// GPUs on the node.
    #[serde(rename = "totalGPUs")]
    pub total_gpus: f64,
    /// GPUs with any allocation.
    #[serde(rename = "allocatedGPUs")]
    pub allocated_gpus: f64,
    /// GPUs reported unhealthy.
    #[serde(rename = "unhealthyGPUs")]
    pub unhealthy_gpus: f64,
    /// Per-device metrics.
    #[serde(rename = "gpuMetrics", deserialize_with = "nullable")]
    pub gpu_metrics: Vec<NodeGpuMetric>,
    /// Pods placed on the node.
    #[serde(deserialize_with = "nullable")]
    pub instances: Vec<GpuSharePod>,
    /// GPU memory on the node, in GiB.
    #[serde(rename = "totalGPUMemory")]
    pub total_gpu_memory: f64,
    /// GPU memory handed out, in GiB.
    #[serde(rename = "allocatedGPUMemory")]
    pub allocated_gpu_memory: f64,
    /// Core share on the node.
    #[serde(rename = "totalGPUCore")]
    pub total_gpu_core: f64,
    /// Core share handed out.
    #[serde(rename = "allocatedGPUCore")]
    pub allocated_gpu_core: f64,
    /// Per-device allocation.
    #[serde(deserialize_with = "nullable")]
    pub devices: Vec<GpuShareDevice>,
}

/// A pod placed with topology awareness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuTopologyPod {
    /// Pod name.
    pub name: String,
    /// Pod namespace.
    pub namespace: String,
    /// Pod phase.
    pub status: String,
    /// GPUs requested.
    #[serde(rename = "requestGPUs")]
    pub request_gpus: f64,
    /// Device ids allocated to the pod.
    #[serde(deserialize_with = "nullable")]
    pub allocation: Vec<String>,
    /// Device ids visible to the pod.
    #[serde(rename = "visibleGPUs", deserialize_with = "nullable")]
    pub visible_gpus: Vec<String>,
}

/// Interconnect between the GPUs of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuTopology {
    /// Link type between each pair of devices, e.g. `NV2`.
    #[serde(rename = "linkMatrix", deserialize_with = "nullable")]
    pub link_matrix: Vec<Vec<String>>,
    /// Measured bandwidth between each pair of devices.
    #[serde(rename = "bandwidthMatrix", deserialize_with = "nullable")]
    pub bandwidth_matrix: Vec<Vec<f32>>,
}

/// Health of one topology-managed GPU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuTopologyDevice {
    /// Device index.
    pub id: String,
    /// Whether the device is healthy.
    pub healthy: bool,
    /// Allocation status.
    pub status: String,
}

/// A node whose GPUs are allocated by interconnect topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuTopologyNode {
    /// Common fields.
    #[serde(flatten)]
    pub info: NodeInfo,
    /// GPUs on the node.
    #[serde(rename = "totalGPUs")]
    pub total_gpus: f64,
    /// GPUs allocated to pods.
    #[serde(rename = "allocatedGPUs")]
    pub allocated_gpus: f64,
    /// GPUs reported unhealthy.
    #[serde(rename = "unhealthyGPUs")]
    pub unhealthy_gpus: f64,
    /// Per-device metrics.
    #[serde(rename = "gpuMetrics", deserialize_with = "nullable")]
    pub gpu_metrics: Vec<NodeGpuMetric>,
    /// Pods placed on the node.
    #[serde(deserialize_with = "nullable")]
    pub instances: Vec<GpuTopologyPod>,
    /// Interconnect matrices.
    #[serde(rename = "gpuTopology")]
    pub gpu_topology: GpuTopology,
    /// Per-device health.
    #[serde(deserialize_with = "nullable")]
    pub devices: Vec<GpuTopologyDevice>,
}

/// Cluster nodes partitioned by GPU sharing mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSet {
    /// Nodes without GPU scheduling.
    #[serde(rename = "normalNodes", deserialize_with = "nullable")]
    pub normal_nodes: Vec<NormalNode>,
    /// Nodes with whole-GPU scheduling.
    #[serde(rename = "gpuExclusiveNodes", deserialize_with = "nullable")]
    pub gpu_exclusive_nodes: Vec<GpuExclusiveNode>,
    /// Nodes with shared-GPU scheduling.
    #[serde(rename = "gpuShareNodes", deserialize_with = "nullable")]
    pub gpu_share_nodes: Vec<GpuShareNode>,
    /// Nodes with topology-aware scheduling.
    #[serde(rename = "gpuTopologyNodes", deserialize_with = "nullable")]
    pub gpu_topology_nodes: Vec<GpuTopologyNode>,
}

impl NodeSet {
    /// Decode a node listing.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not a node set.
    pub fn decode(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Number of nodes across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.normal_nodes.len()
            + self.gpu_exclusive_nodes.len()
            + self.gpu_share_nodes.len()
            + self.gpu_topology_nodes.len()
    }

    /// Whether no node was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Common fields of every node, with the category it was reported under.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeType, &NodeInfo)> {
        let normal = self.normal_nodes.iter().map(|n| (NodeType::Normal, &n.info));
        let exclusive = self
            .gpu_exclusive_nodes
            .iter()
            .map(|n| (NodeType::GpuExclusive, &n.info));
        let share = self
            .gpu_share_nodes
            .iter()
            .map(|n| (NodeType::GpuShare, &n.info));
        let topology = self
            .gpu_topology_nodes
            .iter()
            .map(|n| (NodeType::GpuTopology, &n.info));
        normal.chain(exclusive).chain(share).chain(topology)
    }
}
