//! Partition capability summary over `sinfo`.
//!
//! One partition can be reported on several lines when it spans
//! heterogeneous node groups; the line with the highest CPU count wins so
//! derived submission defaults aim at the largest nodes.

use std::collections::HashMap;

use domain_cluster::exception::ClusterResult;
use domain_cluster::model::entity::partition::{format_memory, PartitionInfo};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::invoke;

pub const ARGS: &[&str] = &["--format=%P|%c|%m|%G|%l", "--noheader"];

static RE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, Deserialize)]
struct PartitionRow {
    partition: String,
    cpus: String,
    memory: String,
    gres: String,
    time_limit: String,
}

pub async fn fetch_partitions() -> ClusterResult<HashMap<String, PartitionInfo>> {
    let raw = invoke("sinfo", ARGS).await?;
    Ok(parse_partitions(&raw))
}

pub fn parse_partitions(raw: &str) -> HashMap<String, PartitionInfo> {
    let mut partitions: HashMap<String, PartitionInfo> = HashMap::new();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    for row in reader.deserialize::<PartitionRow>().filter_map(Result::ok) {
        // the cluster default partition is flagged with a trailing `*`
        let name = row.partition.split('*').next().unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }
        let cpus_per_node = row
            .cpus
            .split('/')
            .filter(|piece| !piece.is_empty())
            .last()
            .and_then(|piece| piece.trim_end_matches('+').parse().ok())
            .unwrap_or(1);
        let memory_mb: u64 = row
            .memory
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0);
        let max_time = {
            let t = row.time_limit.trim();
            (!t.is_empty()).then(|| t.to_string())
        };

        let replace = partitions.get(&name).map(|p| cpus_per_node > p.cpus_per_node).unwrap_or(true);
        if replace {
            partitions.insert(
                name.clone(),
                PartitionInfo {
                    name,
                    cpus_per_node,
                    memory_mb,
                    memory_display: format_memory(memory_mb),
                    gpus: gpu_hint(&row.gres),
                    max_time,
                },
            );
        }
    }
    partitions
}

/// GPUs per node hinted by the partition's GRES column; submission defaults
/// always assume at least one.
fn gpu_hint(gres: &str) -> u32 {
    for entry in gres.split(',') {
        if !entry.contains("gpu") {
            continue;
        }
        if let Some(m) = RE_NUMBER.find_iter(entry).last() {
            if let Ok(n) = m.as_str().parse::<u32>() {
                return n.max(1);
            }
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::parse_partitions;
    use indoc::indoc;

    #[test]
    fn keeps_max_cpu_line_per_partition() {
        let raw = indoc! {"
            cpu*|64|191997|(null)|7-00:00:00
            cpu*|128|512000+|(null)|7-00:00:00
            gpux|64|191997|gpu:a100:8|4-00:00:00
        "};
        let partitions = parse_partitions(raw);
        assert_eq!(partitions["cpu"].cpus_per_node, 128);
        assert_eq!(partitions["cpu"].memory_mb, 512000);
        assert_eq!(partitions["gpux"].gpus, 8);
        assert_eq!(partitions["gpux"].max_time.as_deref(), Some("4-00:00:00"));
    }

    #[test]
    fn short_or_blank_lines_are_skipped() {
        let raw = indoc! {"
            gpux|64|191997|gpu:8|infinite

            broken line
        "};
        let partitions = parse_partitions(raw);
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions["gpux"].gpus, 8);
    }

    #[test]
    fn missing_gres_defaults_to_one_gpu() {
        let partitions = parse_partitions("cpu|32|64000|(null)|1-00:00:00\n");
        assert_eq!(partitions["cpu"].gpus, 1);
        assert_eq!(partitions["cpu"].memory_display, "62.5G");
    }
}
