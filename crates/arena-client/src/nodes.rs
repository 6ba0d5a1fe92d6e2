//! Node inspection client.

use arena_jobs::NodeType;

use crate::context::{ClientContext, decode_output};
use crate::error::{Domain, Operation, Result};
use crate::model::{GpuExclusiveNode, GpuShareNode, GpuTopologyNode, NodeSet, NormalNode};

/// Reads node capacity and GPU allocation (`arena top node`).
#[derive(Debug, Clone)]
pub struct NodeClient {
    ctx: ClientContext,
}

impl NodeClient {
    pub(crate) fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    /// A copy of this client bound to `namespace`.
    #[must_use]
    pub fn namespace(&self, namespace: &str) -> Self {
        Self::new(self.ctx.with_namespace(namespace))
    }

    /// Every node, or only `names` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn all(&self, names: &[&str]) -> Result<NodeSet> {
        self.filter(NodeType::All, names).await
    }

    /// Nodes of one category, or only `names` among them when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn filter(&self, node_type: NodeType, names: &[&str]) -> Result<NodeSet> {
        let line = self
            .ctx
            .command(&["top", "node", "-d", "-o", "json"])
            .opt("-m", node_type.filter())
            .args(names.iter().copied());
        let output = self.ctx.run(Domain::Node, Operation::Top, "", line).await?;
        decode_output(Domain::Node, Operation::Top, &output, NodeSet::decode)
    }

    /// Nodes with whole-GPU scheduling.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn gpu_exclusive_nodes(&self, names: &[&str]) -> Result<Vec<GpuExclusiveNode>> {
        Ok(self.filter(NodeType::GpuExclusive, names).await?.gpu_exclusive_nodes)
    }

    /// Nodes with shared-GPU scheduling.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn gpu_share_nodes(&self, names: &[&str]) -> Result<Vec<GpuShareNode>> {
        Ok(self.filter(NodeType::GpuShare, names).await?.gpu_share_nodes)
    }

    /// Nodes with topology-aware scheduling.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn gpu_topology_nodes(&self, names: &[&str]) -> Result<Vec<GpuTopologyNode>> {
        Ok(self.filter(NodeType::GpuTopology, names).await?.gpu_topology_nodes)
    }

    /// Nodes without GPU scheduling.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails or its output cannot be decoded.
    pub async fn normal_nodes(&self, names: &[&str]) -> Result<Vec<NormalNode>> {
        Ok(self.filter(NodeType::Normal, names).await?.normal_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{RecordingExecutor, client};

    #[tokio::test]
    async fn test_all_nodes() {
        let executor = Arc::new(RecordingExecutor::new().ok(r#"{"normalNodes":[{"name":"cpu-1"}],"gpuShareNodes":null}"#));
        let set = client(&executor).nodes().all(&[]).await.unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            executor.last_call(),
            ["arena", "top", "node", "-d", "-o", "json", "--namespace=default"]
        );
    }

    #[tokio::test]
    async fn test_category_with_names() {
        let executor = Arc::new(RecordingExecutor::new().ok(r#"{"gpuExclusiveNodes":[{"name":"gpu-1","totalGPUs":8}]}"#));
        let nodes = client(&executor)
            .nodes()
            .gpu_exclusive_nodes(&["gpu-1", "gpu-2"])
            .await
            .unwrap();
        assert_eq!(nodes[0].info.name, "gpu-1");
        assert_eq!(
            executor.last_call(),
            ["arena", "top", "node", "-d", "-o", "json", "--namespace=default", "-m=e", "gpu-1", "gpu-2"]
        );
    }

    #[tokio::test]
    async fn test_failure_code() {
        let executor = Arc::new(RecordingExecutor::new().fail(1, "unable to connect to cluster"));
        let err = client(&executor).nodes().normal_nodes(&[]).await.unwrap_err();
        assert_eq!(err.code(), "node-top-failed");
    }
}
