//! Table rendering for the node and queue listings.

use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use domain_cluster::model::entity::{JobConfig, NodeRecord};

use crate::infrastructure::slurm::squeue::QueueRow;

/// Color a node state the way operators read them at a glance: green is
/// free, yellow is busy, red needs attention.
pub fn node_state_cell(state: &str) -> Cell {
    let lower = state.to_lowercase();
    let color = if lower.contains("idle") {
        Color::Green
    } else if lower.contains("mix") {
        Color::Yellow
    } else if lower.contains("drain") || lower.contains("down") {
        Color::Red
    } else {
        Color::Cyan
    };
    Cell::new(state).fg(color).add_attribute(Attribute::Bold)
}

pub fn node_table(records: &[NodeRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["NodeName", "State", "Partitions", "CPUs", "Memory", "GPUs"]);
    for node in records {
        table.add_row(vec![
            Cell::new(&node.name).set_alignment(CellAlignment::Right),
            node_state_cell(&node.state),
            Cell::new(&node.partitions),
            Cell::new(format!(
                "{} Alloc ({:.1}%) / {} Total",
                node.cpu_allocated,
                node.cpu_usage_percent(),
                node.cpu_total
            )),
            Cell::new(format!(
                "{} GB Used / {} GB ({:.1}%)",
                node.memory_allocated_mb / 1024,
                node.memory_total_mb / 1024,
                node.memory_usage_percent()
            )),
            Cell::new(gpu_summary(node)),
        ]);
    }
    table
}

fn gpu_summary(node: &NodeRecord) -> String {
    if node.gpu_total == 0 {
        return "-".to_string();
    }
    if node.gpu_total_by_type.is_empty() {
        return format!("{} / {}", node.gpu_allocated, node.gpu_total);
    }
    let types = node
        .gpu_total_by_type
        .iter()
        .map(|(ty, n)| format!("{ty}:{n}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{} / {} ({})", node.gpu_allocated, node.gpu_total, types)
}

/// Whether a queue row belongs to the invoking user or someone in their
/// group, for highlighting.
pub fn is_group_job(owner: &str, user: &str, group_members: &[String]) -> bool {
    !user.is_empty() && (owner == user || group_members.iter().any(|member| member == owner))
}

fn queue_state_cell(state: &str) -> Cell {
    let color = match state.to_uppercase().as_str() {
        "RUNNING" | "R" => Color::Green,
        "PENDING" | "PD" => Color::Yellow,
        "COMPLETING" | "CG" => Color::Blue,
        s if s.starts_with("FAIL") || s == "F" => Color::Red,
        _ => Color::Cyan,
    };
    Cell::new(state).fg(color).add_attribute(Attribute::Bold)
}

pub fn queue_table(rows: &[QueueRow], user: &str, group_members: &[String]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "JobID", "Partition", "Name", "User", "State", "Time", "Nodes", "NodeList",
    ]);
    for row in rows {
        let mine = is_group_job(&row.user, user, group_members);
        let mut job_id = Cell::new(&row.job_id)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold);
        let mut owner = Cell::new(&row.user);
        if mine {
            job_id = job_id.fg(Color::Yellow);
            owner = owner.fg(Color::Yellow).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            job_id,
            Cell::new(&row.partition),
            Cell::new(&row.name),
            owner,
            queue_state_cell(&row.state),
            Cell::new(&row.elapsed),
            Cell::new(&row.node_count),
            Cell::new(&row.node_list),
        ]);
    }
    table
}

/// Submission summary: `*` marks automatically detected values, `†` values
/// loaded from the saved defaults.
pub fn submission_summary(
    config: &JobConfig,
    auto_fields: &[&str],
    default_fields: &[&str],
    mode: &str,
    script_path: Option<&Path>,
) -> Table {
    let marked = |value: String, field: &str| -> Cell {
        if auto_fields.contains(&field) {
            Cell::new(format!("{value} *")).fg(Color::Cyan)
        } else if default_fields.contains(&field) {
            Cell::new(format!("{value} \u{2020}")).fg(Color::Yellow)
        } else {
            Cell::new(value)
        }
    };

    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("Mode").set_alignment(CellAlignment::Right), Cell::new(mode)]);
    let rows = [
        ("Partition", config.partition.clone(), "partition"),
        ("Account", config.account.clone(), "account"),
        ("Nodes", config.nodes.to_string(), "nodes"),
        ("Tasks / Node", config.tasks_per_node.to_string(), "tasks_per_node"),
        ("CPUs / Task", config.cpus_per_task.to_string(), "cpus_per_task"),
        ("Memory", config.memory.clone(), "memory"),
        ("GPUs", config.gpus.to_string(), "gpus"),
        ("Time", config.time.clone(), "time"),
    ];
    for (label, value, field) in rows {
        table.add_row(vec![
            Cell::new(label).set_alignment(CellAlignment::Right),
            marked(value, field),
        ]);
    }
    table.add_row(vec![
        Cell::new("Command").set_alignment(CellAlignment::Right),
        Cell::new(config.command_for_display()),
    ]);
    if let Some(nodelist) = &config.nodelist {
        table.add_row(vec![Cell::new("NodeList").set_alignment(CellAlignment::Right), Cell::new(nodelist)]);
    }
    if let Some(exclude) = &config.exclude {
        table.add_row(vec![Cell::new("Exclude").set_alignment(CellAlignment::Right), Cell::new(exclude)]);
    }
    if let Some(job_name) = &config.job_name {
        table.add_row(vec![Cell::new("Job Name").set_alignment(CellAlignment::Right), Cell::new(job_name)]);
    }
    table.add_row(vec![
        Cell::new("Log Dir").set_alignment(CellAlignment::Right),
        marked(config.report_dir.clone(), "report_dir"),
    ]);
    if let Some(path) = script_path {
        table.add_row(vec![
            Cell::new("Script").set_alignment(CellAlignment::Right),
            Cell::new(path.display().to_string()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::{is_group_job, node_table, queue_table};
    use crate::infrastructure::slurm::squeue::QueueRow;
    use domain_cluster::model::entity::NodeRecord;

    #[test]
    fn group_membership_drives_highlighting() {
        let members = vec!["bob".to_string(), "carol".to_string()];
        assert!(is_group_job("alice", "alice", &members));
        assert!(is_group_job("bob", "alice", &members));
        assert!(!is_group_job("mallory", "alice", &members));
        assert!(!is_group_job("mallory", "", &[]));
    }

    #[test]
    fn node_table_shows_usage_figures() {
        let node = NodeRecord {
            name: "hgpn02".into(),
            state: "MIXED".into(),
            partitions: "gpux".into(),
            cpu_allocated: 32,
            cpu_total: 64,
            memory_allocated_mb: 1024,
            memory_total_mb: 191997,
            gpu_allocated: 4,
            gpu_total: 8,
            ..Default::default()
        };
        let rendered = node_table(&[node]).to_string();
        assert!(rendered.contains("hgpn02"));
        assert!(rendered.contains("32 Alloc (50.0%) / 64 Total"));
        assert!(rendered.contains("4 / 8"));
    }

    #[test]
    fn queue_table_lists_every_row() {
        let rows = vec![QueueRow {
            job_id: "991".into(),
            partition: "gpux".into(),
            name: "train".into(),
            user: "alice".into(),
            state: "RUNNING".into(),
            elapsed: "2:10:33".into(),
            node_count: "2".into(),
            node_list: "hgpn[01-02]".into(),
        }];
        let rendered = queue_table(&rows, "alice", &[]).to_string();
        assert!(rendered.contains("991"));
        assert!(rendered.contains("RUNNING"));
        assert!(rendered.contains("hgpn[01-02]"));
    }
}
