use std::collections::HashMap;

use crate::model::entity::job::{GpuClaim, JobGpuUsage};
use crate::service::hostlist;

/// Split a job's total GPU claim across `nodes` nodes: every node gets the
/// floor share and the first `total % nodes` nodes in listed order get one
/// extra, so the shares always sum back to `total`.
///
/// The queue snapshot does not reveal the scheduler's true per-node
/// placement for multi-node jobs, so this stays a documented approximation
/// and must not be silently replaced with anything cleverer.
pub fn distribute(total: u32, nodes: usize) -> Vec<u32> {
    if nodes == 0 {
        return Vec::new();
    }
    let base = total / nodes as u32;
    let remainder = (total % nodes as u32) as usize;
    (0..nodes)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Reconcile the running-job snapshot into a per-node claim table.
///
/// Jobs without any resolved GPU footprint are dropped entirely, and so are
/// per-node shares of zero (a claim of zero is never recorded).
pub fn reconcile(jobs: Vec<JobGpuUsage>) -> HashMap<String, Vec<GpuClaim>> {
    let mut claims: HashMap<String, Vec<GpuClaim>> = HashMap::new();
    for job in jobs {
        if job.gpu_total == 0 {
            continue;
        }
        let nodes = hostlist::expand(&job.node_expr);
        if nodes.is_empty() {
            continue;
        }
        let shares = distribute(job.gpu_total, nodes.len());
        for (node, share) in nodes.into_iter().zip(shares) {
            if share == 0 {
                continue;
            }
            claims.entry(node).or_default().push(GpuClaim {
                job_id: job.job_id.clone(),
                gpu_type: job.gpu_type.clone(),
                count: share,
            });
        }
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::{distribute, reconcile};
    use crate::model::entity::job::JobGpuUsage;

    fn usage(job_id: &str, gpu_total: u32, node_expr: &str) -> JobGpuUsage {
        JobGpuUsage {
            job_id: job_id.into(),
            gpu_type: "a100".into(),
            gpu_total,
            node_expr: node_expr.into(),
        }
    }

    #[test]
    fn remainder_goes_to_leading_nodes() {
        assert_eq!(distribute(5, 3), vec![2, 2, 1]);
        assert_eq!(distribute(8, 2), vec![4, 4]);
        assert_eq!(distribute(1, 4), vec![1, 0, 0, 0]);
    }

    #[test]
    fn shares_always_sum_to_claim() {
        for total in 0..=17u32 {
            for nodes in 1..=6usize {
                let sum: u32 = distribute(total, nodes).iter().sum();
                assert_eq!(sum, total, "total={total} nodes={nodes}");
            }
        }
    }

    #[test]
    fn multi_node_job_is_split_per_node() {
        let claims = reconcile(vec![usage("991", 5, "hgpn[01-03]")]);
        assert_eq!(claims["hgpn01"][0].count, 2);
        assert_eq!(claims["hgpn02"][0].count, 2);
        assert_eq!(claims["hgpn03"][0].count, 1);
    }

    #[test]
    fn zero_gpu_jobs_never_appear() {
        let claims = reconcile(vec![usage("991", 0, "hgpn01")]);
        assert!(claims.is_empty());
    }

    #[test]
    fn zero_shares_are_not_recorded() {
        let claims = reconcile(vec![usage("991", 2, "hgpn[01-03]")]);
        assert!(claims.contains_key("hgpn01"));
        assert!(claims.contains_key("hgpn02"));
        assert!(!claims.contains_key("hgpn03"));
    }
}
