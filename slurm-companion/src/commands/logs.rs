use std::path::PathBuf;
use std::time::SystemTime;

use clap::Args;
use domain_cluster::exception::ClusterException;
use tokio::process::Command;

use crate::config::DEFAULT_REPORT_DIR;

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Job ID to watch; defaults to the most recent log
    pub job_id: Option<String>,

    /// Directory containing the job logs
    #[arg(long, default_value = DEFAULT_REPORT_DIR)]
    pub report_dir: String,
}

pub async fn execute(args: LogsArgs) -> anyhow::Result<()> {
    let log_file = match &args.job_id {
        Some(job_id) => {
            let path = PathBuf::from(&args.report_dir).join(format!("{job_id}.out"));
            if !path.exists() {
                return Err(ClusterException::LogFileNotFound {
                    job_id: job_id.clone(),
                    dir: args.report_dir.clone(),
                }
                .into());
            }
            path
        }
        None => latest_log(&args.report_dir)?,
    };

    println!("Watching log file: {}", log_file.display());
    let status = Command::new("tail")
        .arg("-n")
        .arg("20")
        .arg("-f")
        .arg(&log_file)
        .status()
        .await;
    match status {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(anyhow::anyhow!("Command 'tail' not found on PATH."))
        }
        Err(e) => Err(e.into()),
    }
}

/// Most recently modified `*.out` file in the report directory.
fn latest_log(report_dir: &str) -> anyhow::Result<PathBuf> {
    let no_logs = || ClusterException::NoLogFiles {
        dir: report_dir.to_string(),
    };

    let entries = std::fs::read_dir(report_dir).map_err(|_| no_logs())?;
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|ext| ext == "out").unwrap_or(false) {
            let modified =
                entry.metadata().and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
            if latest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
                latest = Some((modified, path));
            }
        }
    }
    latest.map(|(_, path)| path).ok_or_else(|| no_logs().into())
}
