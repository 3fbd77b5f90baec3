//! Job cancellation over `scancel`.

use domain_cluster::exception::ClusterResult;

use super::invoke;

pub async fn cancel(job_id: &str, signal: Option<&str>, user: Option<&str>) -> ClusterResult<()> {
    let mut args: Vec<&str> = Vec::new();
    if let Some(signal) = signal {
        args.extend(["--signal", signal]);
    }
    if let Some(user) = user {
        args.extend(["--user", user]);
    }
    args.push(job_id);
    invoke("scancel", &args).await?;
    Ok(())
}
