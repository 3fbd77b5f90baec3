use clap::Args;

use crate::display::{slots, table};
use crate::infrastructure::slurm::{scontrol, squeue};

#[derive(Debug, Args)]
pub struct NodesArgs {
    /// Include nodes in 'down' or 'drain' states
    #[arg(long)]
    pub include_down: bool,

    /// Render one column per GPU slot instead of the summary table
    #[arg(short, long)]
    pub graph: bool,
}

pub async fn execute(args: NodesArgs) -> anyhow::Result<()> {
    let records = scontrol::fetch_nodes(args.include_down).await?;
    if records.is_empty() {
        println!("No node information to display.");
        return Ok(());
    }

    if args.graph {
        // Running-job claims refine the slot labels when available; the two
        // snapshots come from independent commands and may differ slightly.
        let claims = squeue::fetch_gpu_claims().await;
        println!("{}", slots::gpu_graph_table(&records, &claims));
    } else {
        println!("{}", table::node_table(&records));
        if let Some(free) = free_gpu_summary(&records) {
            println!("Available GPUs: {free}");
        }
    }
    Ok(())
}

/// Cluster-wide free GPU counts by type, summed over the listed nodes.
fn free_gpu_summary(records: &[domain_cluster::model::entity::NodeRecord]) -> Option<String> {
    let mut free: Vec<(String, u32)> = Vec::new();
    for node in records {
        for (ty, count) in node.gpu_available_by_type() {
            match free.iter_mut().find(|(t, _)| *t == ty) {
                Some((_, c)) => *c += count,
                None => free.push((ty, count)),
            }
        }
    }
    if free.is_empty() {
        return None;
    }
    Some(
        free.iter()
            .map(|(ty, count)| format!("{ty}:{count}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::free_gpu_summary;
    use domain_cluster::model::entity::NodeRecord;

    #[test]
    fn sums_free_gpus_across_nodes() {
        let nodes = vec![
            NodeRecord {
                gpu_total_by_type: vec![("a100".into(), 8)],
                gpu_allocated_by_type: vec![("a100".into(), 5)],
                ..Default::default()
            },
            NodeRecord {
                gpu_total_by_type: vec![("a100".into(), 4), ("v100".into(), 2)],
                // inconsistent source data: more allocated than present
                gpu_allocated_by_type: vec![("a100".into(), 6)],
                ..Default::default()
            },
        ];
        assert_eq!(free_gpu_summary(&nodes).as_deref(), Some("a100:3, v100:2"));
        assert_eq!(free_gpu_summary(&[]), None);
    }
}
