use clap::{Parser, Subcommand};

use crate::commands::{
    cancel::CancelArgs, logs::LogsArgs, nodes::NodesArgs, queue::QueueArgs, run::RunArgs,
};

#[derive(Debug, Parser)]
#[command(
    name = "slurmc",
    version,
    about = "Friendly command-line companion for SLURM clusters"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show per-node resource usage (scontrol wrapper)
    Nodes(NodesArgs),
    /// Show the job queue in a readable table (squeue wrapper)
    Queue(QueueArgs),
    /// Submit a batch job or start an interactive session (sbatch/srun wrapper)
    Run(RunArgs),
    /// Cancel one or more jobs (scancel wrapper)
    Cancel(CancelArgs),
    /// Tail a job's log file
    Logs(LogsArgs),
}
