use serde::{Deserialize, Serialize};

use crate::exception::{ClusterException, ClusterResult};

/// Normalized configuration for one job submission, after CLI flags, saved
/// defaults and partition-derived values have been reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub nodes: u32,
    pub partition: String,
    pub account: String,
    pub tasks_per_node: u32,
    pub cpus_per_task: u32,
    pub memory: String,
    pub gpus: u32,
    pub time: String,
    pub report_dir: String,
    pub command: Vec<String>,
    pub nodelist: Option<String>,
    pub exclude: Option<String>,
    pub job_name: Option<String>,
    pub interactive: bool,
}

impl JobConfig {
    pub fn command_for_display(&self) -> String {
        if self.interactive {
            return "Interactive shell".to_string();
        }
        if self.command.is_empty() {
            return "<no command provided>".to_string();
        }
        self.command.join(" ")
    }

    /// Quote the command so it survives as a single argument to `bash -lc`.
    pub fn command_for_script(&self) -> ClusterResult<String> {
        if self.command.is_empty() {
            return Err(ClusterException::EmptyBatchCommand);
        }
        let joined =
            self.command.iter().map(|arg| shell_escape(arg)).collect::<Vec<_>>().join(" ");
        Ok(shell_escape(&joined))
    }
}

/// Minimal POSIX single-quote escaping.
pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.chars().all(|c| c.is_ascii_alphanumeric() || "-_./:@=".contains(c)) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}
