use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPORT_DIR: &str = "./slurm-report";
pub const DEFAULT_SCRIPT_DIR: &str = "./slurm_run";
pub const DEFAULT_TIME: &str = "4-00:00:00";

/// Saved submission defaults. Every field is optional: anything absent falls
/// through to partition-derived automatic values at submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitDefaults {
    pub partition: Option<String>,
    pub account: Option<String>,
    pub nodes: Option<u32>,
    pub tasks_per_node: Option<u32>,
    pub cpus_per_task: Option<u32>,
    pub memory: Option<String>,
    pub gpus: Option<u32>,
    pub time: Option<String>,
    pub report_dir: Option<String>,
    pub script_dir: Option<String>,
}

impl SubmitDefaults {
    pub fn is_empty(&self) -> bool {
        self.partition.is_none()
            && self.account.is_none()
            && self.nodes.is_none()
            && self.tasks_per_node.is_none()
            && self.cpus_per_task.is_none()
            && self.memory.is_none()
            && self.gpus.is_none()
            && self.time.is_none()
            && self.report_dir.is_none()
            && self.script_dir.is_none()
    }

    /// Overlay the provided values; fields the update does not carry keep
    /// their current value.
    pub fn merge_from(&mut self, updates: SubmitDefaults) {
        let SubmitDefaults {
            partition,
            account,
            nodes,
            tasks_per_node,
            cpus_per_task,
            memory,
            gpus,
            time,
            report_dir,
            script_dir,
        } = updates;
        self.partition = partition.or(self.partition.take());
        self.account = account.or(self.account.take());
        self.nodes = nodes.or(self.nodes.take());
        self.tasks_per_node = tasks_per_node.or(self.tasks_per_node.take());
        self.cpus_per_task = cpus_per_task.or(self.cpus_per_task.take());
        self.memory = memory.or(self.memory.take());
        self.gpus = gpus.or(self.gpus.take());
        self.time = time.or(self.time.take());
        self.report_dir = report_dir.or(self.report_dir.take());
        self.script_dir = script_dir.or(self.script_dir.take());
    }
}

/// JSON-backed defaults store under the user's config directory.
pub struct DefaultsStore {
    path: PathBuf,
}

impl DefaultsStore {
    pub fn open() -> Self {
        let path = ProjectDirs::from("", "", "slurm-companion")
            .map(|dirs| dirs.config_dir().join("defaults.json"))
            .unwrap_or_else(|| PathBuf::from("defaults.json"));
        Self { path }
    }

    /// Load saved defaults. A missing file yields empty defaults; a
    /// malformed one is ignored with a notice, never an error.
    pub fn load(&self) -> SubmitDefaults {
        let loaded = config::Config::builder()
            .add_source(config::File::from(self.path.clone()).required(false))
            .build()
            .and_then(|c| c.try_deserialize::<SubmitDefaults>());
        match loaded {
            Ok(defaults) => defaults,
            Err(e) => {
                println!("Ignoring saved defaults at {}: {e}", self.path.display());
                SubmitDefaults::default()
            }
        }
    }

    /// Merge the updates over whatever is already saved and write the result
    /// back as pretty-printed JSON.
    pub fn save(&self, updates: SubmitDefaults) -> anyhow::Result<()> {
        let mut defaults = self.load();
        defaults.merge_from(updates);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&defaults)?)?;
        println!("Saved defaults to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SubmitDefaults;

    #[test]
    fn merge_keeps_existing_values() {
        let mut defaults = SubmitDefaults {
            partition: Some("gpux".into()),
            gpus: Some(8),
            ..Default::default()
        };
        defaults.merge_from(SubmitDefaults {
            gpus: Some(4),
            time: Some("1-00:00:00".into()),
            ..Default::default()
        });
        assert_eq!(defaults.partition.as_deref(), Some("gpux"));
        assert_eq!(defaults.gpus, Some(4));
        assert_eq!(defaults.time.as_deref(), Some("1-00:00:00"));
    }

    #[test]
    fn empty_detection() {
        assert!(SubmitDefaults::default().is_empty());
        assert!(!SubmitDefaults {
            nodes: Some(2),
            ..Default::default()
        }
        .is_empty());
    }
}
