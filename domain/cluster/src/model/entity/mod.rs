pub mod job;
pub mod node;
pub mod partition;
pub mod submission;

#[rustfmt::skip]
pub use {
    job::{GpuClaim, JobGpuUsage},
    node::NodeRecord,
    partition::PartitionInfo,
    submission::JobConfig,
};
