use clap::Args;
use domain_cluster::service::IdentityService;

use crate::display::table;
use crate::infrastructure::identity::OsIdentity;
use crate::infrastructure::slurm::squeue;

#[derive(Debug, Args)]
pub struct QueueArgs {}

pub async fn execute(_args: QueueArgs) -> anyhow::Result<()> {
    let rows = squeue::fetch_queue().await?;
    if rows.is_empty() {
        println!("No jobs in the queue.");
        return Ok(());
    }

    let (user, group_members) = identity_context(&OsIdentity).await;
    println!("{}", table::queue_table(&rows, &user, &group_members));
    Ok(())
}

/// Resolve who is asking, for row highlighting. Identity lookups that fail
/// degrade to "highlight nothing" rather than failing the listing.
async fn identity_context(identity: &dyn IdentityService) -> (String, Vec<String>) {
    let user = identity.current_user().await.unwrap_or_default();
    let group_members = identity.group_members().await.unwrap_or_default();
    (user, group_members)
}

#[cfg(test)]
mod tests {
    use super::identity_context;
    use crate::display::table::is_group_job;
    use domain_cluster::service::MockIdentityService;

    #[tokio::test]
    async fn highlights_own_and_group_jobs() {
        let mut identity = MockIdentityService::new();
        identity.expect_current_user().returning(|| Ok("alice".to_string()));
        identity
            .expect_group_members()
            .returning(|| Ok(vec!["bob".to_string()]));

        let (user, members) = identity_context(&identity).await;
        assert!(is_group_job("alice", &user, &members));
        assert!(is_group_job("bob", &user, &members));
        assert!(!is_group_job("mallory", &user, &members));
    }

    #[tokio::test]
    async fn identity_failure_means_no_highlight() {
        let mut identity = MockIdentityService::new();
        identity
            .expect_current_user()
            .returning(|| Err(anyhow::anyhow!("no user database")));
        identity
            .expect_group_members()
            .returning(|| Err(anyhow::anyhow!("no user database")));

        let (user, members) = identity_context(&identity).await;
        assert!(user.is_empty());
        assert!(members.is_empty());
        assert!(!is_group_job("anyone", &user, &members));
    }
}
