//! Node descriptor wrapper over `scontrol show node`.
//!
//! The output is a sequence of blank-line-separated blocks of `Key=Value`
//! tokens, possibly wrapped across lines. Unknown keys are ignored, missing
//! numerics default to zero and missing strings to `UNKNOWN`; a block
//! without a `NodeName=` token is not a node and is skipped silently.

use domain_cluster::exception::ClusterResult;
use domain_cluster::model::entity::NodeRecord;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{gres, invoke};

pub const ARGS: &[&str] = &["show", "node"];

static RE_NODE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"NodeName=(\S+)").unwrap());
static RE_STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"State=(\S+)").unwrap());
static RE_PARTITIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Partitions=(\S+)").unwrap());
static RE_CPU_ALLOC: Lazy<Regex> = Lazy::new(|| Regex::new(r"CPUAlloc=(\d+)").unwrap());
static RE_CPU_TOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"CPUTot=(\d+)").unwrap());
static RE_CPU_LOAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"CPULoad=([\d.]+)").unwrap());
static RE_REAL_MEMORY: Lazy<Regex> = Lazy::new(|| Regex::new(r"RealMemory=(\d+)").unwrap());
static RE_ALLOC_MEMORY: Lazy<Regex> = Lazy::new(|| Regex::new(r"AllocMem=(\d+)").unwrap());
static RE_CFG_TRES: Lazy<Regex> = Lazy::new(|| Regex::new(r"CfgTRES=(\S+)").unwrap());
static RE_ALLOC_TRES: Lazy<Regex> = Lazy::new(|| Regex::new(r"AllocTRES=(\S+)").unwrap());
static RE_GRES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bGres=(\S+)").unwrap());
static RE_GRES_USED: Lazy<Regex> = Lazy::new(|| Regex::new(r"GresUsed=(\S+)").unwrap());

pub async fn fetch_nodes(include_down: bool) -> ClusterResult<Vec<NodeRecord>> {
    let raw = invoke("scontrol", ARGS).await?;
    Ok(parse_nodes(&raw, include_down))
}

pub fn parse_nodes(raw: &str, include_down: bool) -> Vec<NodeRecord> {
    raw.split("\n\n")
        .filter_map(parse_node_block)
        .filter(|node| include_down || !node.is_down_or_drained())
        .collect()
}

/// Parse one descriptor block; `None` when it carries no node at all.
pub fn parse_node_block(block: &str) -> Option<NodeRecord> {
    let name = capture(&RE_NODE_NAME, block)?.to_string();

    let cfg_tres = capture(&RE_CFG_TRES, block).unwrap_or("");
    let alloc_tres = capture(&RE_ALLOC_TRES, block).unwrap_or("");
    let gres_field = capture(&RE_GRES, block).unwrap_or("");
    let gres_used = capture(&RE_GRES_USED, block).unwrap_or("");

    let (gpu_total_by_type, gpu_total) = gres::node_gpus(cfg_tres, gres_field);
    let (gpu_allocated_by_type, gpu_allocated) = gres::node_gpus(alloc_tres, gres_used);

    Some(NodeRecord {
        name,
        state: capture(&RE_STATE, block).unwrap_or("UNKNOWN").to_string(),
        partitions: capture(&RE_PARTITIONS, block).unwrap_or("UNKNOWN").to_string(),
        cpu_allocated: capture_number(&RE_CPU_ALLOC, block),
        cpu_total: capture_number(&RE_CPU_TOT, block),
        cpu_load: capture(&RE_CPU_LOAD, block).and_then(|s| s.parse().ok()).unwrap_or(0.0),
        memory_total_mb: capture_number(&RE_REAL_MEMORY, block),
        memory_allocated_mb: capture_number(&RE_ALLOC_MEMORY, block),
        gpu_total,
        gpu_allocated,
        gpu_total_by_type,
        gpu_allocated_by_type,
    })
}

fn capture<'a>(re: &Regex, block: &'a str) -> Option<&'a str> {
    re.captures(block).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

fn capture_number<T: std::str::FromStr + Default>(re: &Regex, block: &str) -> T {
    capture(re, block).and_then(|s| s.parse().ok()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{parse_node_block, parse_nodes};
    use indoc::indoc;

    const SAMPLE_NODE: &str = indoc! {"
        NodeName=hgpn02 Arch=x86_64 CoresPerSocket=16
           CPUAlloc=32 CPUTot=64 CPULoad=20.00
           RealMemory=191997 AllocMem=1024
           CfgTRES=cpu=64,mem=191997M,billing=64,gres/gpu=8
           AllocTRES=cpu=32,mem=1024M,gres/gpu=4
           State=MIXED
           Partitions=gpux
    "};

    #[test]
    fn parses_untyped_tres_descriptor() {
        let node = parse_node_block(SAMPLE_NODE).unwrap();
        assert_eq!(node.name, "hgpn02");
        assert_eq!(node.cpu_allocated, 32);
        assert_eq!(node.cpu_total, 64);
        assert!((node.cpu_load - 20.0).abs() < 0.01);
        assert_eq!(node.memory_total_mb, 191997);
        assert_eq!(node.memory_allocated_mb, 1024);
        assert_eq!(node.gpu_allocated, 4);
        assert_eq!(node.gpu_total, 8);
        assert_eq!(node.state, "MIXED");
        assert_eq!(node.partitions, "gpux");
    }

    #[test]
    fn parses_typed_tres_descriptor() {
        let block = indoc! {"
            NodeName=hgpn05
               CPUAlloc=0 CPUTot=128
               RealMemory=512000 AllocMem=0
               Gres=gpu:a100:8(S:0-1)
               CfgTRES=cpu=128,mem=512000M,gres/gpu=8,gres/gpu:a100=8
               AllocTRES=cpu=16,mem=64000M,gres/gpu=2,gres/gpu:a100=2
               State=MIXED Partitions=gpux,debug
        "};
        let node = parse_node_block(block).unwrap();
        assert_eq!(node.gpu_total_by_type, vec![("a100".to_string(), 8)]);
        assert_eq!(node.gpu_allocated_by_type, vec![("a100".to_string(), 2)]);
        assert_eq!(node.gpu_total, 8);
        assert_eq!(node.gpu_allocated, 2);
        assert_eq!(node.partitions, "gpux,debug");
    }

    #[test]
    fn legacy_gres_fields_are_the_fallback() {
        let block = indoc! {"
            NodeName=oldnode
               CPUAlloc=4 CPUTot=32
               Gres=gpu:v100:4
               GresUsed=gpu:v100:1(IDX:0)
               State=MIXED
        "};
        let node = parse_node_block(block).unwrap();
        assert_eq!(node.gpu_total_by_type, vec![("v100".to_string(), 4)]);
        assert_eq!(node.gpu_allocated_by_type, vec![("v100".to_string(), 1)]);
        assert_eq!(node.gpu_total, 4);
        assert_eq!(node.gpu_allocated, 1);
    }

    #[test]
    fn block_without_node_name_is_not_a_node() {
        assert!(parse_node_block("").is_none());
        assert!(parse_node_block("State=IDLE Partitions=gpux").is_none());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let node = parse_node_block("NodeName=bare01").unwrap();
        assert_eq!(node.state, "UNKNOWN");
        assert_eq!(node.partitions, "UNKNOWN");
        assert_eq!(node.cpu_total, 0);
        assert_eq!(node.cpu_load, 0.0);
        assert_eq!(node.gpu_total, 0);
    }

    #[test]
    fn drained_nodes_are_hidden_by_default() {
        let raw = indoc! {"
            NodeName=ok01 State=IDLE

            NodeName=bad01 State=MIXED+DRAIN

            NodeName=bad02 State=DOWN*
        "};
        let names: Vec<_> = parse_nodes(raw, false).into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["ok01"]);

        let all = parse_nodes(raw, true);
        assert_eq!(all.len(), 3);
    }
}
