use serde::{Deserialize, Serialize};

/// One running job's GPU usage on one node.
///
/// A job spanning several nodes produces one claim per node it touches.
/// Claims are recomputed from the queue snapshot on every query; zero-count
/// claims are dropped before they are ever recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuClaim {
    pub job_id: String,
    /// GPU model label; a generic `gpu` label when the queue snapshot does
    /// not carry type granularity.
    pub gpu_type: String,
    pub count: u32,
}

/// One running job's total GPU footprint before it is split across nodes.
#[derive(Debug, Clone)]
pub struct JobGpuUsage {
    pub job_id: String,
    pub gpu_type: String,
    pub gpu_total: u32,
    /// Raw node-list expression as reported by the queue, possibly in
    /// compressed range notation.
    pub node_expr: String,
}
