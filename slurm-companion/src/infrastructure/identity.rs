//! OS-backed identity lookup.
//!
//! Resolved through the same kind of external commands the rest of the tool
//! relies on (`id`, `getent`) so no libc binding is needed; callers treat a
//! failure here as "highlight nothing", never as a fatal error.

use anyhow::{bail, Context};
use async_trait::async_trait;
use domain_cluster::service::IdentityService;
use tokio::process::Command;

pub struct OsIdentity;

#[async_trait]
impl IdentityService for OsIdentity {
    async fn current_user(&self) -> anyhow::Result<String> {
        if let Ok(user) = std::env::var("USER") {
            if !user.is_empty() {
                return Ok(user);
            }
        }
        let stdout = capture("id", &["-un"]).await?;
        let user = stdout.trim();
        if user.is_empty() {
            bail!("could not determine the current user");
        }
        Ok(user.to_string())
    }

    async fn group_members(&self) -> anyhow::Result<Vec<String>> {
        let gid = capture("id", &["-g"]).await?;
        let gid = gid.trim().to_string();
        if gid.is_empty() {
            bail!("could not determine the current group");
        }

        // getent output: <name>:<passwd>:<gid>:<member>,<member>,...
        let group = capture("getent", &["group", &gid]).await?;
        let members = group
            .lines()
            .next()
            .and_then(|line| line.splitn(4, ':').nth(3))
            .map(|members| {
                members
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(members)
    }
}

async fn capture(program: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .with_context(|| format!("running {program}"))?;
    if !output.status.success() {
        bail!("{program} exited with {}", output.status);
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
