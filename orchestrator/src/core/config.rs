use std::sync::Arc;
use tracing::warn;

use crate::cli::RunCmd;
use crate::core::client::database::{build_database_client, DatabaseClient};
use crate::core::client::queue::{build_queue_client, QueueClient};
use crate::core::client::role::{DisabledRoleClient, DiscordRoleClient, RoleClient};
use crate::core::client::verifier::{HandleVerifier, StubVerifier};
use crate::error::OrchestratorResult;
use crate::types::params::{
    DatabaseParams, DiscordParams, QueueParams, ServerParams, ServiceParams, ValidationParams,
};

/// Runtime configuration: resolved parameters plus the client trait objects
/// every stage talks through. Built once at startup; the backend choices
/// behind the trait objects never leak past this point.
pub struct Config {
    server_params: ServerParams,
    validation_params: ValidationParams,
    service_params: ServiceParams,
    database: Box<dyn DatabaseClient>,
    queue: Box<dyn QueueClient>,
    role_client: Box<dyn RoleClient>,
    verifier: Box<dyn HandleVerifier>,
}

impl Config {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        server_params: ServerParams,
        validation_params: ValidationParams,
        service_params: ServiceParams,
        database: Box<dyn DatabaseClient>,
        queue: Box<dyn QueueClient>,
        role_client: Box<dyn RoleClient>,
        verifier: Box<dyn HandleVerifier>,
    ) -> Self {
        Self { server_params, validation_params, service_params, database, queue, role_client, verifier }
    }

    /// Builds the full runtime configuration from CLI/env arguments.
    ///
    /// Schema creation runs here; a failure aborts startup since the
    /// pipeline cannot run without a usable store.
    pub async fn from_run_cmd(run_cmd: &RunCmd) -> OrchestratorResult<Arc<Self>> {
        let database_params = DatabaseParams::from(run_cmd.database_args.clone());
        let queue_params = QueueParams::from(run_cmd.queue_args.clone());
        let discord_params = DiscordParams::from(run_cmd.discord_args.clone());

        let database = build_database_client(&database_params).await?;
        database.ensure_schema().await?;

        let queue = build_queue_client(&queue_params).await?;
        let role_client = build_role_client(&discord_params);

        Ok(Arc::new(Self::new(
            ServerParams::from(run_cmd.server_args.clone()),
            ValidationParams::from(run_cmd.validation_args.clone()),
            ServiceParams::from(run_cmd.service_args.clone()),
            database,
            queue,
            role_client,
            Box::new(StubVerifier),
        )))
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.server_params
    }

    pub fn validation_params(&self) -> &ValidationParams {
        &self.validation_params
    }

    pub fn service_params(&self) -> &ServiceParams {
        &self.service_params
    }

    pub fn database(&self) -> &dyn DatabaseClient {
        self.database.as_ref()
    }

    pub fn queue(&self) -> &dyn QueueClient {
        self.queue.as_ref()
    }

    pub fn role_client(&self) -> &dyn RoleClient {
        self.role_client.as_ref()
    }

    pub fn verifier(&self) -> &dyn HandleVerifier {
        self.verifier.as_ref()
    }
}

fn build_role_client(params: &DiscordParams) -> Box<dyn RoleClient> {
    match (&params.bot_token, &params.guild_id) {
        (Some(token), Some(guild)) => {
            Box::new(DiscordRoleClient::new(params.api_base.clone(), token.clone(), guild.clone()))
        }
        _ => {
            warn!("Discord credentials missing; role grants will fail until configured");
            Box::new(DisabledRoleClient)
        }
    }
}
