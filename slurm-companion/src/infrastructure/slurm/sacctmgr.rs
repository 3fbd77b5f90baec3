//! Account lookup over `sacctmgr`.

use anyhow::Context;

use super::invoke;

/// The first account associated with `user`, used when no account was given
/// on the command line or in the saved defaults.
pub async fn default_account(user: &str) -> anyhow::Result<String> {
    let assoc = format!("user={user}");
    let stdout = invoke(
        "sacctmgr",
        &["show", "assoc", assoc.as_str(), "format=Account", "--noheader"],
    )
    .await
    .context("Unable to retrieve a default SLURM account")?;

    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .with_context(|| format!("No SLURM account association found for user '{user}'"))
}
