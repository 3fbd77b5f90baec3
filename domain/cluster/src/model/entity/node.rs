use serde::{Deserialize, Serialize};

/// One compute node's resource snapshot.
///
/// Records are rebuilt from scratch on every query and discarded after the
/// display that consumed them; nothing here is cached between invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    /// Verbatim scheduler state, compound states included (e.g. `MIXED+DRAIN`).
    pub state: String,
    /// Comma-joined partition list, kept as one string for display fidelity.
    pub partitions: String,
    pub cpu_allocated: u32,
    pub cpu_total: u32,
    pub cpu_load: f64,
    pub memory_allocated_mb: u64,
    pub memory_total_mb: u64,
    /// Aggregate GPU count across all types.
    pub gpu_total: u32,
    pub gpu_allocated: u32,
    /// Per-type GPU counts in source order; keys are unique.
    pub gpu_total_by_type: Vec<(String, u32)>,
    pub gpu_allocated_by_type: Vec<(String, u32)>,
}

impl NodeRecord {
    pub fn cpu_usage_percent(&self) -> f64 {
        if self.cpu_total > 0 {
            self.cpu_allocated as f64 / self.cpu_total as f64 * 100.0
        } else {
            0.0
        }
    }

    /// `AllocMem / RealMemory` as a percentage; 0 when the node reports no
    /// memory at all.
    pub fn memory_usage_percent(&self) -> f64 {
        if self.memory_total_mb > 0 {
            self.memory_allocated_mb as f64 / self.memory_total_mb as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Available GPUs per type. Types whose source data is inconsistent
    /// (allocated above total) are reported as zero available, never negative,
    /// and only strictly positive counts appear in the result.
    pub fn gpu_available_by_type(&self) -> Vec<(String, u32)> {
        self.gpu_total_by_type
            .iter()
            .filter_map(|(ty, total)| {
                let allocated = self
                    .gpu_allocated_by_type
                    .iter()
                    .find(|(t, _)| t == ty)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                (*total > allocated).then(|| (ty.clone(), total - allocated))
            })
            .collect()
    }

    /// Substring check used by the default node listing to hide unusable
    /// nodes; must match compound states like `MIXED+DRAIN`.
    pub fn is_down_or_drained(&self) -> bool {
        let state = self.state.to_lowercase();
        state.contains("drain") || state.contains("down")
    }
}

#[cfg(test)]
mod tests {
    use super::NodeRecord;

    #[test]
    fn memory_usage_is_zero_without_total() {
        let node = NodeRecord {
            memory_allocated_mb: 1024,
            memory_total_mb: 0,
            ..Default::default()
        };
        assert_eq!(node.memory_usage_percent(), 0.0);
    }

    #[test]
    fn gpu_available_never_negative() {
        let node = NodeRecord {
            gpu_total_by_type: vec![("a100".into(), 4), ("v100".into(), 2)],
            gpu_allocated_by_type: vec![("a100".into(), 6), ("v100".into(), 1)],
            ..Default::default()
        };
        assert_eq!(node.gpu_available_by_type(), vec![("v100".to_string(), 1)]);
    }

    #[test]
    fn compound_state_counts_as_drained() {
        let node = NodeRecord {
            state: "MIXED+DRAIN".into(),
            ..Default::default()
        };
        assert!(node.is_down_or_drained());

        let node = NodeRecord {
            state: "IDLE".into(),
            ..Default::default()
        };
        assert!(!node.is_down_or_drained());
    }
}
