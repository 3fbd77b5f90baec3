use anyhow::bail;
use clap::Args;
use colored::Colorize;
use domain_cluster::exception::ClusterException;

use crate::infrastructure::slurm::scancel;

#[derive(Debug, Args)]
pub struct CancelArgs {
    /// One or more SLURM job IDs to cancel
    #[arg(required = true)]
    pub job_ids: Vec<String>,

    /// Optional signal to send to the jobs (passed to scancel)
    #[arg(long)]
    pub signal: Option<String>,

    /// Cancel jobs for a specific user (passed to scancel)
    #[arg(long)]
    pub user: Option<String>,
}

pub async fn execute(args: CancelArgs) -> anyhow::Result<()> {
    let mut failed = 0usize;
    for job_id in &args.job_ids {
        match scancel::cancel(job_id, args.signal.as_deref(), args.user.as_deref()).await {
            Ok(()) => println!("Cancelled job {}", job_id.as_str().green()),
            // A missing scancel binary will fail every remaining id the
            // same way; stop immediately.
            Err(e @ ClusterException::SchedulerToolMissing { .. }) => return Err(e.into()),
            Err(e) => {
                eprintln!("Failed to cancel job {job_id}: {e}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} job(s) could not be cancelled", args.job_ids.len());
    }
    Ok(())
}
