//! Interactive prompts for submission parameters that are still missing
//! after CLI flags and saved defaults have been applied.

use std::collections::HashMap;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use domain_cluster::model::entity::PartitionInfo;

use crate::config::{SubmitDefaults, DEFAULT_TIME};

const MEMORY_CHOICES: &[&str] =
    &["16G", "32G", "50G", "64G", "100G", "128G", "200G", "256G", "500G"];
const TIME_CHOICES: &[&str] = &[
    "1:00:00",
    "4:00:00",
    "12:00:00",
    "1-00:00:00",
    "2-00:00:00",
    "4-00:00:00",
    "7-00:00:00",
];
const CPU_CHOICES: &[u32] = &[1, 2, 4, 8, 16, 32, 64, 128];
const CUSTOM: &str = "Custom...";

/// Values picked interactively; only the requested fields are filled.
#[derive(Debug, Default)]
pub struct Answers {
    pub partition: Option<String>,
    pub account: Option<String>,
    pub nodes: Option<u32>,
    pub tasks_per_node: Option<u32>,
    pub cpus_per_task: Option<u32>,
    pub memory: Option<String>,
    pub gpus: Option<u32>,
    pub time: Option<String>,
}

pub fn available() -> bool {
    dialoguer::console::user_attended()
}

pub fn fill_missing(
    missing: &[&str],
    partitions: &HashMap<String, PartitionInfo>,
    defaults: &SubmitDefaults,
) -> anyhow::Result<Answers> {
    let theme = ColorfulTheme::default();
    let mut answers = Answers::default();

    // Partition first: the remaining defaults are derived from it.
    let mut selected: Option<PartitionInfo> = None;
    if missing.contains(&"partition") && !partitions.is_empty() {
        let mut names: Vec<&String> = partitions.keys().collect();
        names.sort();
        let items: Vec<String> = names
            .iter()
            .map(|name| {
                let info = &partitions[name.as_str()];
                format!(
                    "{name} (CPUs: {}, Mem: {}, GPUs: {})",
                    info.cpus_per_node, info.memory_display, info.gpus
                )
            })
            .collect();
        let default_idx = defaults
            .partition
            .as_ref()
            .and_then(|d| names.iter().position(|n| *n == d))
            .unwrap_or(0);
        let idx = Select::with_theme(&theme)
            .with_prompt("Select partition")
            .items(&items)
            .default(default_idx)
            .interact()?;
        answers.partition = Some(names[idx].clone());
        selected = partitions.get(names[idx]).cloned();
    } else if let Some(partition) = &defaults.partition {
        selected = partitions.get(partition).cloned();
    }
    if selected.is_none() {
        selected = partitions
            .values()
            .max_by_key(|info| (info.cpus_per_node, info.gpus, info.memory_mb))
            .cloned();
    }

    if missing.contains(&"account") {
        let account: String = Input::with_theme(&theme)
            .with_prompt("Enter account")
            .default(defaults.account.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        let account = account.trim().to_string();
        if !account.is_empty() {
            answers.account = Some(account);
        }
    }

    if missing.contains(&"nodes") {
        answers.nodes = Some(select_count(
            &theme,
            "Select number of nodes",
            1..=16,
            defaults.nodes.unwrap_or(1),
        )?);
    }

    if missing.contains(&"tasks_per_node") {
        let max = selected.as_ref().map(|info| info.gpus.clamp(1, 8)).unwrap_or(8);
        answers.tasks_per_node = Some(select_count(
            &theme,
            "Select tasks per node",
            1..=max,
            defaults.tasks_per_node.unwrap_or(1),
        )?);
    }

    if missing.contains(&"cpus_per_task") {
        let max = selected.as_ref().map(|info| info.cpus_per_node).unwrap_or(128);
        let mut choices: Vec<u32> = CPU_CHOICES.iter().copied().filter(|c| *c <= max).collect();
        if !choices.contains(&max) {
            choices.push(max);
        }
        let default = defaults.cpus_per_task.filter(|c| choices.contains(c)).unwrap_or(max);
        let default_idx = choices.iter().position(|c| *c == default).unwrap_or(choices.len() - 1);
        let items: Vec<String> = choices.iter().map(u32::to_string).collect();
        let idx = Select::with_theme(&theme)
            .with_prompt("Select CPUs per task")
            .items(&items)
            .default(default_idx)
            .interact()?;
        answers.cpus_per_task = Some(choices[idx]);
    }

    if missing.contains(&"memory") {
        let default = defaults
            .memory
            .clone()
            .or_else(|| selected.as_ref().map(|info| info.memory_display.clone()))
            .unwrap_or_else(|| "50G".to_string());
        answers.memory = Some(select_or_custom(&theme, "Select memory", MEMORY_CHOICES, &default)?);
    }

    if missing.contains(&"gpus") {
        let max = selected.as_ref().map(|info| info.gpus.max(1)).unwrap_or(8);
        answers.gpus = Some(select_count(
            &theme,
            "Select number of GPUs",
            0..=max,
            defaults.gpus.unwrap_or(max),
        )?);
    }

    if missing.contains(&"time") {
        let default = defaults
            .time
            .clone()
            .or_else(|| selected.as_ref().and_then(|info| info.max_time.clone()))
            .unwrap_or_else(|| DEFAULT_TIME.to_string());
        answers.time = Some(select_or_custom(&theme, "Select time limit", TIME_CHOICES, &default)?);
    }

    Ok(answers)
}

fn select_count(
    theme: &ColorfulTheme,
    prompt: &str,
    range: std::ops::RangeInclusive<u32>,
    default: u32,
) -> anyhow::Result<u32> {
    let choices: Vec<u32> = range.collect();
    let default_idx = choices.iter().position(|c| *c == default).unwrap_or(0);
    let items: Vec<String> = choices.iter().map(u32::to_string).collect();
    let idx = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(default_idx)
        .interact()?;
    Ok(choices[idx])
}

fn select_or_custom(
    theme: &ColorfulTheme,
    prompt: &str,
    choices: &[&str],
    default: &str,
) -> anyhow::Result<String> {
    let mut items: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
    items.push(CUSTOM.to_string());
    let default_idx = items.iter().position(|c| c == default).unwrap_or(items.len() - 1);
    let idx = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(default_idx)
        .interact()?;
    if items[idx] == CUSTOM {
        let value: String = Input::with_theme(theme)
            .with_prompt(format!("{prompt} (e.g. {default})"))
            .default(default.to_string())
            .interact_text()?;
        return Ok(value.trim().to_string());
    }
    Ok(items[idx].clone())
}
