//! Batch script generation and submission.

use std::path::{Path, PathBuf};

use domain_cluster::exception::{ClusterException, ClusterResult};
use domain_cluster::model::entity::JobConfig;
use tokio::process::Command;

use super::invoke;

/// Render the sbatch script for a batch submission.
pub fn build_script(config: &JobConfig) -> ClusterResult<String> {
    let command = config.command_for_script()?;
    let job_name_line = config
        .job_name
        .as_ref()
        .map(|name| format!("#SBATCH -J {name}\n"))
        .unwrap_or_default();
    let nodelist_option = config
        .nodelist
        .as_ref()
        .map(|nodes| format!("#SBATCH --nodelist={nodes}\n"))
        .unwrap_or_default();
    let exclude_option = config
        .exclude
        .as_ref()
        .map(|nodes| format!("#SBATCH --exclude={nodes}\n"))
        .unwrap_or_default();

    Ok(format!(
        r#"#!/bin/bash
#SBATCH -N {nodes}
#SBATCH -p {partition}
#SBATCH --account={account}
#SBATCH --ntasks-per-node={tasks_per_node}
#SBATCH --cpus-per-task={cpus_per_task}
#SBATCH --mem={memory}
#SBATCH --gres=gpu:{gpus}
#SBATCH --time={time}
#SBATCH -o {report_dir}/%j.out
#SBATCH -e {report_dir}/%j.err
{job_name_line}{nodelist_option}{exclude_option}
# SLURM environment
echo "SLURM_NNODES=${{SLURM_NNODES}}"
echo "NODELIST=${{SLURM_JOB_NODELIST}}"
echo "SLURM_NODEID=${{SLURM_NODEID}}"
echo "SLURM_ARRAY_TASK_ID=${{SLURM_ARRAY_TASK_ID}}"

# Distributed training setup
export MASTER_ADDR=$(scontrol show hostnames ${{SLURM_JOB_NODELIST}} | head -n 1)
export MASTER_PORT=$(shuf -i 1024-65535 -n 1)
export TORCH_NCCL_ASYNC_ERROR_HANDLING=1

srun --wait=60 --kill-on-bad-exit=1 bash -lc {command}
"#,
        nodes = config.nodes,
        partition = config.partition,
        account = config.account,
        tasks_per_node = config.tasks_per_node,
        cpus_per_task = config.cpus_per_task,
        memory = config.memory,
        gpus = config.gpus,
        time = config.time,
        report_dir = config.report_dir,
    ))
}

/// Write the rendered script to a timestamped file under `script_dir`.
pub async fn write_script(config: &JobConfig, script_dir: &str) -> ClusterResult<PathBuf> {
    let script = build_script(config)?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = Path::new(script_dir).join(format!("job_{timestamp}.sbatch"));
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, script).await?;
    Ok(path)
}

/// Submit a script and return the new job id.
pub async fn submit(script_path: &Path) -> ClusterResult<String> {
    let path = script_path.to_string_lossy();
    let stdout = invoke("sbatch", &[path.as_ref()]).await?;
    Ok(stdout.replace("Submitted batch job ", "").trim().to_string())
}

/// Replace this process's foreground with an interactive `srun` shell using
/// the same resource shape a batch submission would get.
pub async fn run_interactive(config: &JobConfig) -> ClusterResult<()> {
    let mut command = Command::new("srun");
    command
        .arg(format!("--partition={}", config.partition))
        .arg(format!("--account={}", config.account))
        .arg("-N")
        .arg(config.nodes.to_string())
        .arg(format!("--ntasks-per-node={}", config.tasks_per_node))
        .arg(format!("--cpus-per-task={}", config.cpus_per_task))
        .arg(format!("--mem={}", config.memory))
        .arg(format!("--gres=gpu:{}", config.gpus))
        .arg(format!("--time={}", config.time));
    if let Some(nodelist) = &config.nodelist {
        command.arg(format!("--nodelist={nodelist}"));
    }
    if let Some(exclude) = &config.exclude {
        command.arg(format!("--exclude={exclude}"));
    }
    command.arg("--pty").arg("bash");

    let status = command.status().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ClusterException::SchedulerToolMissing { command: "srun" }
        } else {
            ClusterException::InternalError { source: e.into() }
        }
    })?;
    if !status.success() {
        tracing::debug!("interactive srun session ended with {status}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::build_script;
    use domain_cluster::model::entity::JobConfig;

    fn config() -> JobConfig {
        JobConfig {
            nodes: 2,
            partition: "gpux".into(),
            account: "lab".into(),
            tasks_per_node: 1,
            cpus_per_task: 16,
            memory: "100G".into(),
            gpus: 4,
            time: "1-00:00:00".into(),
            report_dir: "./slurm-report".into(),
            command: vec!["python".into(), "train.py".into()],
            nodelist: None,
            exclude: None,
            job_name: None,
            interactive: false,
        }
    }

    #[test]
    fn renders_resource_directives() {
        let script = build_script(&config()).unwrap();
        assert!(script.starts_with("#!/bin/bash"));
        assert!(script.contains("#SBATCH -N 2"));
        assert!(script.contains("#SBATCH -p gpux"));
        assert!(script.contains("#SBATCH --gres=gpu:4"));
        assert!(script.contains("#SBATCH -o ./slurm-report/%j.out"));
        assert!(script.contains("srun --wait=60 --kill-on-bad-exit=1 bash -lc 'python train.py'"));
        assert!(!script.contains("--nodelist"));
    }

    #[test]
    fn optional_directives_appear_when_set() {
        let mut config = config();
        config.job_name = Some("prep".into());
        config.nodelist = Some("hgpn01,hgpn02".into());
        config.exclude = Some("hgpn05".into());
        let script = build_script(&config).unwrap();
        assert!(script.contains("#SBATCH -J prep"));
        assert!(script.contains("#SBATCH --nodelist=hgpn01,hgpn02"));
        assert!(script.contains("#SBATCH --exclude=hgpn05"));
    }

    #[test]
    fn batch_script_requires_a_command() {
        let mut config = config();
        config.command.clear();
        assert!(build_script(&config).is_err());
    }
}
