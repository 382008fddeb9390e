pub mod discord;

use async_trait::async_trait;

pub use discord::DiscordRoleClient;

#[derive(thiserror::Error, Debug)]
pub enum RoleError {
    /// The process runs without Discord credentials; grants cannot happen
    /// but verification itself still proceeds.
    #[error("role-grant capability is not configured")]
    NotConfigured,

    #[error("role `{0}` does not exist in the guild")]
    RoleNotFound(String),

    /// Usually a role-hierarchy or permission misconfiguration that needs
    /// operator intervention.
    #[error("discord api returned status {status} while {context}")]
    RequestFailed { status: u16, context: &'static str },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Outbound role-grant capability.
///
/// The granting principal must outrank the target role in the guild's role
/// hierarchy; that precondition lives outside this system, which is why
/// grant failures are reported rather than retried.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleClient: Send + Sync {
    /// Grants `role_name` to the user. Granting an already-held role is a
    /// no-op on the platform side, so this call is idempotent.
    async fn grant_role(&self, discord_id: &str, role_name: &str) -> Result<(), RoleError>;
}

/// Stand-in used when no bot token or guild is configured. Every grant
/// fails loudly so the outcome is surfaced instead of silently dropped.
pub struct DisabledRoleClient;

#[async_trait]
impl RoleClient for DisabledRoleClient {
    async fn grant_role(&self, _discord_id: &str, _role_name: &str) -> Result<(), RoleError> {
        Err(RoleError::NotConfigured)
    }
}
