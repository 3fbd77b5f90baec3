use serde::{Deserialize, Serialize};

/// Summary of one partition's per-node resource limits.
///
/// When the same partition name is reported on several `sinfo` lines
/// (heterogeneous node groups), the line with the highest CPU count wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionInfo {
    pub name: String,
    pub cpus_per_node: u32,
    pub memory_mb: u64,
    pub memory_display: String,
    pub gpus: u32,
    pub max_time: Option<String>,
}

/// Render a raw MB figure the way submission flags expect it: whole
/// gigabytes when the value divides evenly, one decimal above a gigabyte,
/// megabytes below, and a safe fallback when the source reported nothing.
pub fn format_memory(memory_mb: u64) -> String {
    if memory_mb == 0 {
        return "50G".to_string();
    }
    if memory_mb % 1024 == 0 {
        return format!("{}G", memory_mb / 1024);
    }
    if memory_mb > 1024 {
        return format!("{:.1}G", memory_mb as f64 / 1024.0);
    }
    format!("{memory_mb}M")
}

#[cfg(test)]
mod tests {
    use super::format_memory;

    #[test]
    fn formats_memory_by_magnitude() {
        assert_eq!(format_memory(0), "50G");
        assert_eq!(format_memory(2048), "2G");
        assert_eq!(format_memory(1536), "1.5G");
        assert_eq!(format_memory(512), "512M");
    }
}
