//! Evaluate job payloads.

use serde::{Deserialize, Serialize};

/// An evaluate job as reported by `arena evaluate get` and `arena evaluate list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateJobInfo {
    /// Unique id of the job.
    pub uuid: String,
    /// Id of the underlying Kubernetes job.
    #[serde(rename = "jobId")]
    pub job_id: String,
    /// Job name.
    pub name: String,
    /// Job namespace.
    pub namespace: String,
    /// Model under evaluation.
    #[serde(rename = "modelName")]
    pub model_name: String,
    /// Path of the model files.
    #[serde(rename = "modelPath")]
    pub model_path: String,
    /// Model version.
    #[serde(rename = "modelVersion")]
    pub model_version: String,
    /// Where metrics are written.
    #[serde(rename = "metricsPath")]
    pub metrics_path: String,
    /// Evaluation dataset.
    #[serde(rename = "datasetPath")]
    pub dataset_path: String,
    /// Last time the job was scheduled.
    #[serde(rename = "lastScheduleTime")]
    pub last_schedule_time: String,
    /// Creation time, as the tool formats it.
    #[serde(rename = "creationTimestamp")]
    pub creation_timestamp: String,
}

impl EvaluateJobInfo {
    /// Decode one job.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not an evaluate job.
    pub fn decode(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Decode a list of jobs.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not an array of evaluate jobs.
    pub fn decode_list(json: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let json = r#"{
            "uuid": "9a1b",
            "jobId": "evaluate-job-abc",
            "name": "eval-1",
            "namespace": "default",
            "modelName": "resnet",
            "modelPath": "/models/resnet",
            "modelVersion": "v1",
            "metricsPath": "/metrics",
            "datasetPath": "/data/val",
            "lastScheduleTime": "",
            "creationTimestamp": "2024-01-01 10:00:00"
        }"#;
        let info = EvaluateJobInfo::decode(json).unwrap();
        assert_eq!(info.job_id, "evaluate-job-abc");
        assert_eq!(info.model_name, "resnet");
        assert_eq!(info.creation_timestamp, "2024-01-01 10:00:00");
    }

    #[test]
    fn test_decode_list_tolerates_missing_fields() {
        let jobs = EvaluateJobInfo::decode_list(r#"[{"name": "a"}, {"name": "b"}]"#).unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(jobs[1].model_path.is_empty());
    }
}
