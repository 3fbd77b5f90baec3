use std::collections::HashMap;

use anyhow::bail;
use clap::Args;
use colored::Colorize;
use domain_cluster::model::entity::{JobConfig, PartitionInfo};
use domain_cluster::service::IdentityService;

use crate::commands::prompts;
use crate::config::{DefaultsStore, SubmitDefaults, DEFAULT_REPORT_DIR, DEFAULT_SCRIPT_DIR, DEFAULT_TIME};
use crate::display::table;
use crate::infrastructure::identity::OsIdentity;
use crate::infrastructure::slurm::{sacctmgr, sbatch, sinfo};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Number of nodes to request
    #[arg(short = 'N', long)]
    pub nodes: Option<u32>,

    /// Partition name to submit to
    #[arg(short, long)]
    pub partition: Option<String>,

    /// SLURM account to charge
    #[arg(short = 'A', long)]
    pub account: Option<String>,

    /// Tasks per node
    #[arg(short = 'n', long)]
    pub tasks_per_node: Option<u32>,

    /// CPU cores per task
    #[arg(short = 'c', long)]
    pub cpus_per_task: Option<u32>,

    /// Memory per node (e.g. 50G)
    #[arg(long = "mem", visible_alias = "memory")]
    pub memory: Option<String>,

    /// GPUs per node
    #[arg(short = 'G', long)]
    pub gpus: Option<u32>,

    /// Job time limit (default: partition maximum when available)
    #[arg(short = 't', long)]
    pub time: Option<String>,

    /// Comma separated list of nodes to include
    #[arg(short = 'w', long)]
    pub nodelist: Option<String>,

    /// Comma separated list of nodes to exclude
    #[arg(short = 'x', long)]
    pub exclude: Option<String>,

    /// Optional job name shown in SLURM accounting
    #[arg(short = 'J', long)]
    pub job_name: Option<String>,

    /// Directory where SLURM writes job logs
    #[arg(long)]
    pub report_dir: Option<String>,

    /// Directory to store generated sbatch scripts
    #[arg(long)]
    pub script_dir: Option<String>,

    /// Force an interactive srun session
    #[arg(short, long)]
    pub interactive: bool,

    /// Show the sbatch script without submitting
    #[arg(long)]
    pub dry_run: bool,

    /// Use auto-detected defaults without interactive prompts
    #[arg(short = 'd', long)]
    pub defaults: bool,

    /// Persist the provided options as defaults and exit
    #[arg(long)]
    pub save_defaults: bool,

    /// Command to execute for batch jobs (e.g. python train.py --epochs 10)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

struct ResolvedJob {
    config: JobConfig,
    auto_fields: Vec<&'static str>,
    default_fields: Vec<&'static str>,
    script_dir: String,
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let store = DefaultsStore::open();
    let defaults = store.load();

    if args.save_defaults {
        let updates = args.as_default_updates();
        if updates.is_empty() {
            println!("No values provided to save as defaults.");
            return Ok(());
        }
        return store.save(updates);
    }

    let resolved = resolve_job_config(&args, &defaults).await?;
    let mode = if resolved.config.interactive { "Interactive" } else { "Batch" };

    if resolved.config.interactive {
        print_summary(&resolved, mode, None);
        return Ok(sbatch::run_interactive(&resolved.config).await?);
    }

    if args.dry_run {
        let script = sbatch::build_script(&resolved.config)?;
        print_summary(&resolved, mode, None);
        println!("\nDry run enabled - sbatch script preview:\n");
        println!("{script}");
        return Ok(());
    }

    let script_path = sbatch::write_script(&resolved.config, &resolved.script_dir).await?;
    println!("Generated sbatch script: {}", script_path.display());
    print_summary(&resolved, mode, Some(script_path.as_path()));

    tokio::fs::create_dir_all(&resolved.config.report_dir).await?;
    let job_id = sbatch::submit(&script_path).await?;
    let stdout_log = format!("{}/{job_id}.out", resolved.config.report_dir);
    let stderr_log = format!("{}/{job_id}.err", resolved.config.report_dir);
    println!("Job submitted: {}", job_id.as_str().green().bold());
    println!("Stdout log: {stdout_log}");
    println!("Stderr log: {stderr_log}");
    println!("Monitor logs: slurmc logs {job_id}");
    Ok(())
}

fn print_summary(resolved: &ResolvedJob, mode: &str, script_path: Option<&std::path::Path>) {
    println!(
        "{}",
        table::submission_summary(
            &resolved.config,
            &resolved.auto_fields,
            &resolved.default_fields,
            mode,
            script_path,
        )
    );
    if !resolved.auto_fields.is_empty() {
        println!("{}", "* Automatically detected value".cyan());
    }
    if !resolved.default_fields.is_empty() {
        println!("{}", "\u{2020} Loaded from saved defaults".yellow());
    }
}

impl RunArgs {
    fn as_default_updates(&self) -> SubmitDefaults {
        SubmitDefaults {
            partition: self.partition.clone(),
            account: self.account.clone(),
            nodes: self.nodes,
            tasks_per_node: self.tasks_per_node,
            cpus_per_task: self.cpus_per_task,
            memory: self.memory.clone(),
            gpus: self.gpus,
            time: self.time.clone(),
            report_dir: self.report_dir.clone(),
            script_dir: self.script_dir.clone(),
        }
    }
}

fn pick<T: Clone>(
    cli: Option<T>,
    saved: Option<T>,
    field: &'static str,
    default_fields: &mut Vec<&'static str>,
) -> Option<T> {
    if cli.is_some() {
        return cli;
    }
    if saved.is_some() {
        default_fields.push(field);
    }
    saved
}

async fn resolve_job_config(args: &RunArgs, defaults: &SubmitDefaults) -> anyhow::Result<ResolvedJob> {
    let mut auto_fields: Vec<&'static str> = Vec::new();
    let mut default_fields: Vec<&'static str> = Vec::new();

    let mut partition = pick(
        args.partition.clone(),
        defaults.partition.clone(),
        "partition",
        &mut default_fields,
    );
    let mut nodes = pick(args.nodes, defaults.nodes, "nodes", &mut default_fields);
    let mut tasks_per_node = pick(
        args.tasks_per_node,
        defaults.tasks_per_node,
        "tasks_per_node",
        &mut default_fields,
    );
    let mut cpus_per_task = pick(
        args.cpus_per_task,
        defaults.cpus_per_task,
        "cpus_per_task",
        &mut default_fields,
    );
    let mut memory = pick(args.memory.clone(), defaults.memory.clone(), "memory", &mut default_fields);
    let mut gpus = pick(args.gpus, defaults.gpus, "gpus", &mut default_fields);
    let mut time = pick(args.time.clone(), defaults.time.clone(), "time", &mut default_fields);
    let mut account = pick(
        args.account.clone(),
        defaults.account.clone(),
        "account",
        &mut default_fields,
    );
    let report_dir = pick(
        args.report_dir.clone(),
        defaults.report_dir.clone(),
        "report_dir",
        &mut default_fields,
    )
    .unwrap_or_else(|| DEFAULT_REPORT_DIR.to_string());
    let script_dir = pick(
        args.script_dir.clone(),
        defaults.script_dir.clone(),
        "script_dir",
        &mut default_fields,
    )
    .unwrap_or_else(|| DEFAULT_SCRIPT_DIR.to_string());

    // Partition capabilities are only queried when something still depends
    // on them; a failure is fatal only if a critical field stays unresolved.
    let need_partition_data = partition.is_none()
        || cpus_per_task.is_none()
        || memory.is_none()
        || gpus.is_none()
        || time.is_none();
    let partitions: HashMap<String, PartitionInfo> = if need_partition_data {
        match sinfo::fetch_partitions().await {
            Ok(partitions) => partitions,
            Err(e) => {
                if partition.is_none() || cpus_per_task.is_none() || memory.is_none() || gpus.is_none()
                {
                    return Err(e.into());
                }
                HashMap::new()
            }
        }
    } else {
        HashMap::new()
    };

    let mut missing: Vec<&'static str> = Vec::new();
    if partition.is_none() {
        missing.push("partition");
    }
    if nodes.is_none() {
        missing.push("nodes");
    }
    if tasks_per_node.is_none() {
        missing.push("tasks_per_node");
    }
    if cpus_per_task.is_none() {
        missing.push("cpus_per_task");
    }
    if memory.is_none() {
        missing.push("memory");
    }
    if gpus.is_none() {
        missing.push("gpus");
    }
    if time.is_none() {
        missing.push("time");
    }
    if account.is_none() {
        missing.push("account");
    }

    if !missing.is_empty() && !args.defaults && prompts::available() {
        let answers = prompts::fill_missing(&missing, &partitions, defaults)?;
        partition = answers.partition.or(partition);
        nodes = answers.nodes.or(nodes);
        tasks_per_node = answers.tasks_per_node.or(tasks_per_node);
        cpus_per_task = answers.cpus_per_task.or(cpus_per_task);
        memory = answers.memory.or(memory);
        gpus = answers.gpus.or(gpus);
        time = answers.time.or(time);
        account = answers.account.or(account);
    }

    let (partition, partition_info): (String, Option<&PartitionInfo>) = match partition {
        Some(name) => {
            let info = partitions.get(&name);
            (name, info)
        }
        None => {
            let best = partitions
                .values()
                .max_by_key(|info| (info.cpus_per_node, info.gpus, info.memory_mb));
            let Some(best) = best else {
                bail!("Unable to determine partition. Provide --partition or ensure 'sinfo' is available.");
            };
            auto_fields.push("partition");
            (best.name.clone(), Some(best))
        }
    };

    let nodes = nodes.unwrap_or_else(|| {
        auto_fields.push("nodes");
        1
    });
    let tasks_per_node = tasks_per_node.unwrap_or_else(|| {
        auto_fields.push("tasks_per_node");
        1
    });

    let cpus_per_task = match cpus_per_task {
        Some(value) => value,
        None => {
            let Some(info) = partition_info else {
                bail!("Unable to determine CPUs per task. Provide --cpus-per-task or ensure 'sinfo' is available.");
            };
            auto_fields.push("cpus_per_task");
            info.cpus_per_node
        }
    };

    let memory = match memory {
        Some(value) => value,
        None => {
            let Some(info) = partition_info else {
                bail!("Unable to determine memory. Provide --mem or ensure 'sinfo' is available.");
            };
            auto_fields.push("memory");
            info.memory_display.clone()
        }
    };

    let gpus = match gpus {
        Some(value) => value,
        None => {
            auto_fields.push("gpus");
            partition_info.map(|info| info.gpus).unwrap_or(1)
        }
    };

    let time = match time {
        Some(value) => value,
        None => {
            auto_fields.push("time");
            partition_info
                .and_then(|info| info.max_time.clone())
                .unwrap_or_else(|| DEFAULT_TIME.to_string())
        }
    };

    let account = match account {
        Some(value) => value,
        None => {
            let user = OsIdentity.current_user().await?;
            auto_fields.push("account");
            sacctmgr::default_account(&user).await?
        }
    };

    let command = args.command.clone();
    let interactive = args.interactive
        || command.is_empty()
        || (command.len() == 1 && command[0].trim() == "bash");

    Ok(ResolvedJob {
        config: JobConfig {
            nodes,
            partition,
            account,
            tasks_per_node,
            cpus_per_task,
            memory,
            gpus,
            time,
            report_dir,
            command,
            nodelist: args.nodelist.clone(),
            exclude: args.exclude.clone(),
            job_name: args.job_name.clone(),
            interactive,
        },
        auto_fields,
        default_fields,
        script_dir,
    })
}
