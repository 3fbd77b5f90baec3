use std::collections::VecDeque;

use crate::model::entity::{GpuClaim, NodeRecord};

/// Minimum number of slot columns, regardless of how small the cluster's
/// largest node is.
pub const MIN_SLOTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotCell {
    /// Occupied slot, labelled with an abbreviation of the owning GPU type
    /// or a generic marker when no type-level data exists.
    Used(String),
    /// Present on the node but currently free.
    Free,
    /// Beyond this node's GPU count.
    Absent,
}

/// Fixed-width per-GPU slot cells for one node row.
#[derive(Debug, Clone)]
pub struct SlotRow {
    pub cells: Vec<SlotCell>,
}

/// Slot column count for a set of node records: the largest observed GPU
/// total, floor-bounded at [`MIN_SLOTS`].
pub fn display_width(records: &[NodeRecord]) -> usize {
    records
        .iter()
        .map(|r| r.gpu_total as usize)
        .max()
        .unwrap_or(0)
        .max(MIN_SLOTS)
}

impl SlotRow {
    /// Derive the slot cells for one node.
    ///
    /// Labels come from the running jobs' claims when available, then from
    /// the node's own allocated-by-type breakdown, then a generic `#`.
    /// Inconsistent source data (allocated above total) is tolerated by
    /// clamping the used range, never by reporting out-of-bounds slots.
    pub fn derive(record: &NodeRecord, claims: Option<&[GpuClaim]>, width: usize) -> Self {
        let total = (record.gpu_total as usize).min(width);
        let used = (record.gpu_allocated as usize).min(total);

        let mut labels: VecDeque<String> = VecDeque::new();
        if let Some(claims) = claims {
            for claim in claims {
                for _ in 0..claim.count {
                    labels.push_back(abbreviate(&claim.gpu_type));
                }
            }
        }
        if labels.is_empty() {
            for (ty, count) in &record.gpu_allocated_by_type {
                for _ in 0..*count {
                    labels.push_back(abbreviate(ty));
                }
            }
        }

        let cells = (0..width)
            .map(|i| {
                if i < used {
                    SlotCell::Used(labels.pop_front().unwrap_or_else(|| "#".to_string()))
                } else if i < total {
                    SlotCell::Free
                } else {
                    SlotCell::Absent
                }
            })
            .collect();
        Self { cells }
    }
}

fn abbreviate(gpu_type: &str) -> String {
    gpu_type.chars().take(4).collect()
}
