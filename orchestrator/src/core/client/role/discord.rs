use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{RoleClient, RoleError};

#[derive(Deserialize)]
struct GuildRole {
    id: String,
    name: String,
}

/// Role grants through the Discord REST API.
pub struct DiscordRoleClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    guild_id: String,
}

impl DiscordRoleClient {
    pub fn new(api_base: String, bot_token: String, guild_id: String) -> Self {
        Self { http: reqwest::Client::new(), api_base, bot_token, guild_id }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Looks up a role id by name, case-insensitively.
    async fn role_id_by_name(&self, role_name: &str) -> Result<String, RoleError> {
        let url = format!("{}/guilds/{}/roles", self.api_base, self.guild_id);
        let response = self.http.get(&url).header("Authorization", self.auth_header()).send().await?;
        if !response.status().is_success() {
            return Err(RoleError::RequestFailed {
                status: response.status().as_u16(),
                context: "listing guild roles",
            });
        }
        let roles: Vec<GuildRole> = response.json().await?;
        roles
            .into_iter()
            .find(|role| role.name.eq_ignore_ascii_case(role_name))
            .map(|role| role.id)
            .ok_or_else(|| RoleError::RoleNotFound(role_name.to_string()))
    }
}

#[async_trait]
impl RoleClient for DiscordRoleClient {
    async fn grant_role(&self, discord_id: &str, role_name: &str) -> Result<(), RoleError> {
        let role_id = self.role_id_by_name(role_name).await?;
        let url = format!(
            "{}/guilds/{}/members/{}/roles/{}",
            self.api_base, self.guild_id, discord_id, role_id
        );
        let response = self
            .http
            .put(&url)
            .header("Authorization", self.auth_header())
            .header("X-Audit-Log-Reason", "xverify tier role assignment")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RoleError::RequestFailed {
                status: response.status().as_u16(),
                context: "assigning role to member",
            });
        }
        debug!(discord_id, role_name, "Granted role");
        Ok(())
    }
}
