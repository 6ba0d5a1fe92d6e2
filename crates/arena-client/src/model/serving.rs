//! Serving job payloads.

use arena_jobs::ServingJobType;
use serde::{Deserialize, Serialize};

use super::nullable;
use crate::logs::InstanceRef;

/// A service port exposed by a serving job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    /// Port name, e.g. `grpc`.
    pub name: String,
    /// Service port.
    pub port: u32,
    /// Node port, 0 when the service has none.
    #[serde(rename = "nodePort")]
    pub node_port: u32,
}

/// One pod of a serving job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingInstance {
    /// Pod name.
    pub name: String,
    /// Pod phase.
    pub status: String,
    /// Age as the tool prints it.
    pub age: String,
    /// Containers reporting ready.
    #[serde(rename = "readyContainers")]
    pub ready_containers: u32,
    /// Containers in the pod.
    #[serde(rename = "totalContainers")]
    pub total_containers: u32,
    /// Container restarts.
    #[serde(rename = "restartCount")]
    pub restart_count: u32,
    /// IP of the node.
    #[serde(rename = "nodeIP")]
    pub node_ip: String,
    /// Node name.
    #[serde(rename = "nodeName")]
    pub node_name: String,
    /// Pod IP.
    pub ip: String,
    /// CPUs requested.
    #[serde(rename = "requestCPUs")]
    pub request_cpus: f64,
    /// GPUs requested.
    #[serde(rename = "requestGPUs")]
    pub request_gpus: f64,
    /// GPU memory requested, in GiB.
    #[serde(rename = "requestGPUMemory")]
    pub request_gpu_memory: u32,
    /// GPU core share requested.
    #[serde(rename = "requestGPUCore")]
    pub request_gpu_core: u32,
    /// Creation time, in seconds since the epoch.
    #[serde(rename = "creationTimestamp")]
    pub creation_timestamp: i64,
    /// Name of the owning job. Filled in on decode.
    #[serde(skip_deserializing)]
    pub owner: String,
    /// Kind of the owning job. Filled in on decode.
    #[serde(skip_deserializing)]
    pub owner_type: ServingJobType,
    /// Version of the owning job. Filled in on decode.
    #[serde(skip_deserializing)]
    pub owner_version: String,
    /// Namespace of the owning job. Filled in on decode.
    #[serde(skip_deserializing)]
    pub namespace: String,
}

impl ServingInstance {
    /// Address of this pod for log streaming.
    #[must_use]
    pub fn instance_ref(&self) -> InstanceRef {
        InstanceRef::new(&self.namespace, &self.name)
    }

    /// Whether every container of the pod is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.total_containers > 0 && self.ready_containers == self.total_containers
    }
}

/// A serving job as reported by `arena serve get` and `arena serve list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServingJobInfo {
    /// Unique id of the job.
    pub uuid: String,
    /// Job name.
    pub name: String,
    /// Job namespace.
    pub namespace: String,
    /// Serving kind.
    #[serde(rename = "type")]
    pub job_type: ServingJobType,
    /// Job version.
    pub version: String,
    /// Age as the tool prints it.
    pub age: String,
    /// Service IP.
    pub ip: String,
    /// Replicas requested.
    #[serde(rename = "desiredInstances")]
    pub desired_instances: u32,
    /// Replicas available.
    #[serde(rename = "availableInstances")]
    pub available_instances: u32,
    /// CPUs requested across all pods.
    #[serde(rename = "requestCPUs")]
    pub request_cpus: f64,
    /// GPUs requested across all pods.
    #[serde(rename = "requestGPUs")]
    pub request_gpus: f64,
    /// GPU memory requested across all pods.
    #[serde(rename = "requestGPUMemory")]
    pub request_gpu_memory: u32,
    /// GPU core share requested across all pods.
    #[serde(rename = "requestGPUCore")]
    pub request_gpu_core: u32,
    /// Exposed ports.
    #[serde(deserialize_with = "nullable")]
    pub endpoints: Vec<Endpoint>,
    /// Pods of the job.
    #[serde(deserialize_with = "nullable")]
    pub instances: Vec<ServingInstance>,
    /// Creation time, in seconds since the epoch.
    #[serde(rename = "creationTimestamp")]
    pub creation_timestamp: i64,
}

impl ServingJobInfo {
    /// Decode one job and link its instances back to it.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not a serving job.
    pub fn decode(json: &str) -> serde_json::Result<Self> {
        let mut info: Self = serde_json::from_str(json)?;
        info.link_instances();
        Ok(info)
    }

    /// Decode a list of jobs, linking every job's instances.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not an array of serving jobs.
    pub fn decode_list(json: &str) -> serde_json::Result<Vec<Self>> {
        let mut jobs: Vec<Self> = serde_json::from_str(json)?;
        jobs.iter_mut().for_each(Self::link_instances);
        Ok(jobs)
    }

    /// Whether every desired replica is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.desired_instances > 0 && self.available_instances >= self.desired_instances
    }

    fn link_instances(&mut self) {
        for instance in &mut self.instances {
            instance.owner.clone_from(&self.name);
            instance.owner_type = self.job_type;
            instance.owner_version.clone_from(&self.version);
            instance.namespace.clone_from(&self.namespace);
        }
    }
}
