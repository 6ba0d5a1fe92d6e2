//! Payloads decoded from `-o json` output.
//!
//! The tool is written in Go, which prints `null` for empty slices and maps
//! and omits zero-valued fields in places. Every collection here therefore
//! accepts `null` and every scalar has a default.

pub mod evaluate;
pub mod node;
pub mod serving;
pub mod training;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

pub use evaluate::EvaluateJobInfo;
pub use node::{
    GpuExclusiveNode, GpuExclusivePod, GpuShareDevice, GpuShareNode, GpuSharePod, GpuTopology,
    GpuTopologyDevice, GpuTopologyNode, GpuTopologyPod, NodeGpuMetric, NodeInfo, NodeSet,
    NormalNode,
};
pub use serving::{Endpoint, ServingInstance, ServingJobInfo};
pub use training::{GpuMetric, TrainingInstance, TrainingJobInfo};

/// Deserialize `null` as the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The JSON document inside the tool's output.
///
/// Stderr is merged into the transcript, so log lines can surround the
/// document. The first line-leading object or array that parses as a whole
/// is returned and anything after it is dropped. Without one, the trimmed
/// output from the first such line on is returned so that decoding reports
/// the real problem.
#[must_use]
pub fn json_payload(output: &str) -> &str {
    let mut first_candidate = None;
    let mut offset = 0;
    for line in output.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            let candidate = &output[offset..];
            let mut values = serde_json::Deserializer::from_str(candidate).into_iter::<IgnoredAny>();
            if matches!(values.next(), Some(Ok(_))) {
                return candidate[..values.byte_offset()].trim();
            }
            first_candidate.get_or_insert(candidate);
        }
        offset += line.len();
    }
    first_candidate.unwrap_or(output).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_payload_plain() {
        assert_eq!(json_payload("[]\n"), "[]");
        assert_eq!(json_payload("  {\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_json_payload_skips_log_lines() {
        let output = "time=\"2024-01-01\" level=warning msg=\"deprecated\"\n[{\"name\":\"tf\"}]\n";
        assert_eq!(json_payload(output), "[{\"name\":\"tf\"}]");
    }

    #[test]
    fn test_json_payload_drops_trailing_noise() {
        let output = "{\"name\":\"tf\",\"instances\":[]}\nW0501 10:00:00 warnings.go:70] v1 Endpoints is deprecated\n";
        assert_eq!(json_payload(output), "{\"name\":\"tf\",\"instances\":[]}");
    }

    #[test]
    fn test_json_payload_surrounded_by_log_lines() {
        let output = "level=info msg=\"loading\"\n[\n  {\"name\": \"tf\"}\n]\nlevel=warning msg=\"done\"\n";
        let payload = json_payload(output);
        assert_eq!(payload, "[\n  {\"name\": \"tf\"}\n]");
        assert!(serde_json::from_str::<serde_json::Value>(payload).is_ok());
    }

    #[test]
    fn test_json_payload_skips_bracketed_log_prefix() {
        let output = "[WARN] kubeconfig is world readable\n{\"name\":\"tf\"}\n";
        assert_eq!(json_payload(output), "{\"name\":\"tf\"}");
    }

    #[test]
    fn test_json_payload_truncated_document() {
        assert_eq!(json_payload("noise\n{ truncated\n"), "{ truncated");
    }

    #[test]
    fn test_json_payload_without_document() {
        assert_eq!(json_payload("No resources found\n"), "No resources found");
    }

    #[test]
    fn test_nullable() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "nullable")]
            items: Vec<String>,
        }

        let null: Holder = serde_json::from_str(r#"{"items":null}"#).unwrap();
        assert!(null.items.is_empty());
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert!(missing.items.is_empty());
        let present: Holder = serde_json::from_str(r#"{"items":["a"]}"#).unwrap();
        assert_eq!(present.items, vec!["a"]);
    }
}
