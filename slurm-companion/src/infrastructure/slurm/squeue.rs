//! Queue wrappers over `squeue`.
//!
//! Both readers consume pipe-delimited custom formats. Rows that do not
//! carry the expected field count (truncated lines, stray headers) are
//! skipped silently and never fail the whole listing.

use std::collections::HashMap;

use domain_cluster::exception::ClusterResult;
use domain_cluster::model::entity::{GpuClaim, JobGpuUsage};
use domain_cluster::service::gpu_accounting;
use serde::Deserialize;

use super::{gres, invoke};

pub const QUEUE_ARGS: &[&str] = &["--noheader", "-o", "%i|%P|%j|%u|%T|%M|%D|%R"];
pub const GRES_ARGS: &[&str] = &["--noheader", "-t", "running", "-o", "%i|%N|%b"];

#[derive(Debug, Clone, Deserialize)]
pub struct QueueRow {
    pub job_id: String,
    pub partition: String,
    pub name: String,
    pub user: String,
    pub state: String,
    pub elapsed: String,
    pub node_count: String,
    pub node_list: String,
}

#[derive(Debug, Deserialize)]
struct GresRow {
    job_id: String,
    node_list: String,
    gres: String,
}

pub async fn fetch_queue() -> ClusterResult<Vec<QueueRow>> {
    let raw = invoke("squeue", QUEUE_ARGS).await?;
    Ok(parse_queue(&raw))
}

pub fn parse_queue(raw: &str) -> Vec<QueueRow> {
    reader(raw).deserialize().filter_map(Result::ok).collect()
}

/// Per-node GPU claims of the currently running jobs.
///
/// The queue snapshot is an enhancement over the node listing, not a
/// prerequisite: when `squeue` is unavailable or fails, this degrades to an
/// empty mapping instead of propagating the error.
pub async fn fetch_gpu_claims() -> HashMap<String, Vec<GpuClaim>> {
    match invoke("squeue", GRES_ARGS).await {
        Ok(raw) => parse_gpu_claims(&raw),
        Err(e) => {
            tracing::debug!("running-job GPU snapshot unavailable: {e}");
            HashMap::new()
        }
    }
}

pub fn parse_gpu_claims(raw: &str) -> HashMap<String, Vec<GpuClaim>> {
    let usages = reader(raw)
        .deserialize()
        .filter_map(Result::ok)
        .map(|row: GresRow| {
            let (gpu_type, gpu_total) = gres::job_gpus(&row.gres);
            JobGpuUsage {
                job_id: row.job_id,
                gpu_type,
                gpu_total,
                node_expr: row.node_list,
            }
        })
        .collect();
    gpu_accounting::reconcile(usages)
}

fn reader(raw: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{parse_gpu_claims, parse_queue};
    use indoc::indoc;

    #[test]
    fn parses_queue_rows() {
        let raw = indoc! {"
            991|gpux|train|alice|RUNNING|2:10:33|2|hgpn[01-02]
            992|cpu|prep|bob|PENDING|0:00|1|(Priority)
        "};
        let rows = parse_queue(raw);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].job_id, "991");
        assert_eq!(rows[0].user, "alice");
        assert_eq!(rows[1].state, "PENDING");
        assert_eq!(rows[1].node_list, "(Priority)");
    }

    #[test]
    fn short_rows_are_skipped() {
        let raw = indoc! {"
            991|gpux|train|alice|RUNNING|2:10:33|2|hgpn[01-02]
            some stray diagnostic line
        "};
        assert_eq!(parse_queue(raw).len(), 1);
    }

    #[test]
    fn empty_output_yields_no_rows() {
        assert!(parse_queue("").is_empty());
    }

    #[test]
    fn reconciles_claims_across_nodes() {
        let raw = indoc! {"
            991|hgpn[01-03]|gres/gpu:a100:5
            992|hgpn05|gpu:2
            993|cpu01|N/A
        "};
        let claims = parse_gpu_claims(raw);
        assert_eq!(claims["hgpn01"][0].count, 2);
        assert_eq!(claims["hgpn02"][0].count, 2);
        assert_eq!(claims["hgpn03"][0].count, 1);
        assert_eq!(claims["hgpn01"][0].gpu_type, "a100");
        assert_eq!(claims["hgpn05"][0].count, 2);
        assert_eq!(claims["hgpn05"][0].gpu_type, "gpu");
        // job 993 claims no GPUs and must not appear at all
        assert!(!claims.contains_key("cpu01"));
    }
}
