//! Training job payloads.

use std::collections::BTreeMap;

use arena_jobs::{TrainingJobStatus, TrainingJobType};
use serde::{Deserialize, Serialize};

use super::nullable;
use crate::logs::InstanceRef;

/// GPU utilization reported for one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuMetric {
    /// Utilization, in percent.
    #[serde(rename = "gpuDutyCycle")]
    pub duty_cycle: f64,
    /// Memory in use, in MiB.
    #[serde(rename = "usedGPUMemory")]
    pub used_memory: f64,
    /// Total memory, in MiB.
    #[serde(rename = "totalGPUMemory")]
    pub total_memory: f64,
}

/// One pod of a training job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingInstance {
    /// Pod name.
    pub name: String,
    /// Pod IP.
    pub ip: String,
    /// Age as the tool prints it, e.g. `3m`.
    pub age: String,
    /// Pod phase.
    pub status: String,
    /// Node the pod runs on.
    pub node: String,
    /// IP of that node.
    #[serde(rename = "nodeIP")]
    pub node_ip: String,
    /// GPUs requested.
    #[serde(rename = "requestGPUs")]
    pub request_gpus: f64,
    /// Whether this is the chief pod.
    pub chief: bool,
    /// Per-device GPU metrics, keyed by device id.
    #[serde(rename = "gpuMetrics", deserialize_with = "nullable")]
    pub gpu_metrics: BTreeMap<String, GpuMetric>,
    /// Name of the owning job. Filled in on decode.
    #[serde(skip_deserializing)]
    pub owner: String,
    /// Kind of the owning job. Filled in on decode.
    #[serde(skip_deserializing)]
    pub owner_type: TrainingJobType,
    /// Namespace of the owning job. Filled in on decode.
    #[serde(skip_deserializing)]
    pub namespace: String,
}

impl TrainingInstance {
    /// Address of this pod for log streaming.
    #[must_use]
    pub fn instance_ref(&self) -> InstanceRef {
        InstanceRef::new(&self.namespace, &self.name)
    }
}

/// A training job as reported by `arena get` and `arena list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingJobInfo {
    /// Job name.
    pub name: String,
    /// Job namespace.
    pub namespace: String,
    /// Run time as the tool prints it.
    pub duration: String,
    /// Aggregate status.
    pub status: TrainingJobStatus,
    /// Job kind.
    pub trainer: TrainingJobType,
    /// TensorBoard URL, if one was started.
    pub tensorboard: String,
    /// Name of the chief pod.
    #[serde(rename = "chiefName")]
    pub chief_name: String,
    /// Priority class.
    pub priority: String,
    /// GPUs requested across all pods.
    #[serde(rename = "requestGPUs")]
    pub request_gpus: f64,
    /// GPUs currently allocated.
    #[serde(rename = "allocatedGPUs")]
    pub allocated_gpus: f64,
    /// Pods of the job.
    #[serde(deserialize_with = "nullable")]
    pub instances: Vec<TrainingInstance>,
    /// Creation time, in seconds since the epoch.
    #[serde(rename = "creationTimestamp")]
    pub creation_timestamp: i64,
}

impl TrainingJobInfo {
    /// Decode one job and link its instances back to it.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not a training job.
    pub fn decode(json: &str) -> serde_json::Result<Self> {
        let mut info: Self = serde_json::from_str(json)?;
        info.link_instances();
        Ok(info)
    }

    /// Decode a list of jobs, linking every job's instances.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not an array of training jobs.
    pub fn decode_list(json: &str) -> serde_json::Result<Vec<Self>> {
        let mut jobs: Vec<Self> = serde_json::from_str(json)?;
        jobs.iter_mut().for_each(Self::link_instances);
        Ok(jobs)
    }

    /// The chief pod, if the job has one.
    #[must_use]
    pub fn chief(&self) -> Option<&TrainingInstance> {
        self.instances.iter().find(|i| i.chief)
    }

    fn link_instances(&mut self) {
        for instance in &mut self.instances {
            instance.owner.clone_from(&self.name);
            instance.owner_type = self.trainer;
            instance.namespace.clone_from(&self.namespace);
        }
    }
}
