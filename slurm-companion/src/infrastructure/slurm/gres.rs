//! GRES/TRES sub-token parsing shared by the node and queue wrappers.
//!
//! The extraction order is deliberate: some SLURM configurations only
//! populate the TRES descriptors, others only the legacy `Gres` fields, so
//! each reader tries the richer typed form first and falls back from there.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_TRES_TYPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"gres/gpu:([^=,]+)=(\d+)").unwrap());
static RE_TRES_UNTYPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"gres/gpu=(\d+)").unwrap());
static RE_GRES_TYPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"gpu:([A-Za-z0-9_.\-]+):(\d+)").unwrap());
static RE_GRES_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"gpu[^:]*:(\d+)").unwrap());
static RE_JOB_UNTYPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"gpu[:=](\d+)").unwrap());

/// Per-type and aggregate GPU counts for one node, from its TRES descriptor
/// (`CfgTRES`/`AllocTRES`) plus the legacy field (`Gres`/`GresUsed`).
///
/// Typed counts are taken from `gres/gpu:<type>=<n>` first, then from
/// `gpu:<type>:<n>`. The aggregate prefers an explicit untyped
/// `gres/gpu=<n>` token, then the by-type sum, then a bare `gpu...:<n>`.
pub(crate) fn node_gpus(tres: &str, gres: &str) -> (Vec<(String, u32)>, u32) {
    let mut by_type = typed_counts(&RE_TRES_TYPED, tres);
    if by_type.is_empty() {
        by_type = typed_counts(&RE_GRES_TYPED, gres);
    }

    let untyped = first_count(&RE_TRES_UNTYPED, tres);
    let total = match untyped {
        Some(n) => n,
        None if !by_type.is_empty() => by_type.iter().map(|(_, n)| n).sum(),
        None => first_count(&RE_GRES_BARE, gres).unwrap_or(0),
    };
    (by_type, total)
}

/// A running job's GPU footprint from its generic-resource expression:
/// `(label, total)`. Typed `gpu:<type>:<n>` entries win (summed, labelled
/// after the first type); otherwise a bare `gpu:<n>`/`gpu=<n>` count gets
/// the generic `gpu` label. A total of zero means the job claims no GPUs.
pub(crate) fn job_gpus(expr: &str) -> (String, u32) {
    let typed = typed_counts(&RE_GRES_TYPED, expr);
    if let Some((label, _)) = typed.first() {
        let total = typed.iter().map(|(_, n)| n).sum();
        return (label.clone(), total);
    }
    match first_count(&RE_JOB_UNTYPED, expr) {
        Some(n) => ("gpu".to_string(), n),
        None => ("gpu".to_string(), 0),
    }
}

fn typed_counts(re: &Regex, s: &str) -> Vec<(String, u32)> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for caps in re.captures_iter(s) {
        let ty = &caps[1];
        let Ok(n) = caps[2].parse::<u32>() else {
            continue;
        };
        match counts.iter_mut().find(|(t, _)| t == ty) {
            Some((_, c)) => *c += n,
            None => counts.push((ty.to_string(), n)),
        }
    }
    counts
}

fn first_count(re: &Regex, s: &str) -> Option<u32> {
    re.captures(s).and_then(|caps| caps[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{job_gpus, node_gpus};

    #[test]
    fn typed_tres_wins_over_gres() {
        let (by_type, total) = node_gpus(
            "cpu=64,mem=191997M,gres/gpu:a100=8",
            "gpu:v100:4(S:0-1)",
        );
        assert_eq!(by_type, vec![("a100".to_string(), 8)]);
        assert_eq!(total, 8);
    }

    #[test]
    fn untyped_tres_total_is_authoritative() {
        let (by_type, total) = node_gpus("cpu=64,mem=191997M,billing=64,gres/gpu=8", "");
        assert!(by_type.is_empty());
        assert_eq!(total, 8);
    }

    #[test]
    fn gres_field_fallback() {
        let (by_type, total) = node_gpus("cpu=64,mem=191997M", "gpu:rtx2080:6");
        assert_eq!(by_type, vec![("rtx2080".to_string(), 6)]);
        assert_eq!(total, 6);
    }

    #[test]
    fn bare_gres_yields_untyped_total() {
        let (by_type, total) = node_gpus("", "gpu:8");
        assert!(by_type.is_empty());
        assert_eq!(total, 8);
    }

    #[test]
    fn no_gpu_data_means_zero() {
        let (by_type, total) = node_gpus("cpu=64,mem=191997M", "(null)");
        assert!(by_type.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn job_typed_expression() {
        assert_eq!(job_gpus("gres/gpu:a100:3"), ("a100".to_string(), 3));
        assert_eq!(job_gpus("gpu:v100:2,gpu:v100:1"), ("v100".to_string(), 3));
    }

    #[test]
    fn job_untyped_expression() {
        assert_eq!(job_gpus("gres:gpu:4").1, 4);
        assert_eq!(job_gpus("gpu=2"), ("gpu".to_string(), 2));
    }

    #[test]
    fn job_without_gpus() {
        assert_eq!(job_gpus("N/A").1, 0);
        assert_eq!(job_gpus("").1, 0);
    }
}
