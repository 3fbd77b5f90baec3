use async_trait::async_trait;

/// Who is running the tool, for queue-highlighting purposes.
///
/// Kept behind a trait so display logic can be exercised without a real OS
/// user context.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Login name of the invoking user.
    async fn current_user(&self) -> anyhow::Result<String>;

    /// Login names of the members of the invoking user's group.
    async fn group_members(&self) -> anyhow::Result<Vec<String>>;
}
