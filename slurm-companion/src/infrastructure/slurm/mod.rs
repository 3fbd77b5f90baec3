pub mod gres;
pub mod sacctmgr;
pub mod sbatch;
pub mod scancel;
pub mod scontrol;
pub mod sinfo;
pub mod squeue;

use domain_cluster::exception::{ClusterException, ClusterResult};
use tokio::process::Command;

/// Run one SLURM client tool and return its stdout.
///
/// A missing binary and a non-zero exit are the only fatal outcomes; both
/// carry a user-presentable message instead of a raw io error.
pub(crate) async fn invoke(program: &'static str, args: &[&str]) -> ClusterResult<String> {
    let output = Command::new(program).args(args).output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ClusterException::SchedulerToolMissing { command: program }
        } else {
            ClusterException::InternalError { source: e.into() }
        }
    })?;
    if !output.status.success() {
        return Err(ClusterException::SchedulerToolFailed {
            command: program,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
