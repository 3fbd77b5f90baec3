use thiserror::Error;

pub type ClusterResult<T> = Result<T, ClusterException>;

#[derive(Error, Debug)]
pub enum ClusterException {
    #[error("Command '{command}' not found. Ensure SLURM client tools are installed and on PATH.")]
    SchedulerToolMissing { command: &'static str },

    #[error("{command} terminated with an exception: {stderr}")]
    SchedulerToolFailed { command: &'static str, stderr: String },

    #[error("Batch jobs require a command to execute.")]
    EmptyBatchCommand,

    #[error("No log files found in {dir}.")]
    NoLogFiles { dir: String },

    #[error("Log file for job {job_id} not found in {dir}.")]
    LogFileNotFound { job_id: String, dir: String },

    #[error("Cluster internal error: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for ClusterException {
    fn from(e: anyhow::Error) -> Self {
        ClusterException::InternalError { source: e }
    }
}

impl From<std::io::Error> for ClusterException {
    fn from(e: std::io::Error) -> Self {
        ClusterException::InternalError { source: e.into() }
    }
}
