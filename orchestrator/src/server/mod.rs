pub mod error;
pub mod route;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::config::Config;
use crate::error::OrchestratorResult;
use crate::server::route::server_router;

pub use error::{ApiError, ApiResult};

/// Handle for managing the HTTP server lifecycle.
pub struct ServerHandle {
    shutdown_token: CancellationToken,
    task_handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Initiates graceful shutdown and waits for in-flight requests to
    /// drain.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        info!("Initiating server graceful shutdown");
        self.shutdown_token.cancel();
        self.task_handle.await
    }
}

/// Binds the configured address and serves the router in a background task
/// with graceful-shutdown support. Returns the bound address (useful when
/// the OS picks the port) and the lifecycle handle.
pub async fn setup_server(config: Arc<Config>) -> OrchestratorResult<(SocketAddr, ServerHandle)> {
    let (address, listener) = bind_server(config.clone()).await;

    let shutdown_token = CancellationToken::new();
    let server_token = shutdown_token.clone();

    let app = server_router(config);
    let task_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(server_token.cancelled_owned())
            .await
            .expect("Failed to start axum server")
    });

    info!(%address, "HTTP server listening");
    Ok((address, ServerHandle { shutdown_token, task_handle }))
}

pub(crate) async fn bind_server(config: Arc<Config>) -> (SocketAddr, tokio::net::TcpListener) {
    // Tests bind port 0 so parallel runs never collide on an address
    let port = if cfg!(test) { 0 } else { config.server_params().port };
    let address = format!("{}:{}", config.server_params().host, port);
    let listener = tokio::net::TcpListener::bind(address).await.expect("Failed to get listener");
    let bound = listener.local_addr().expect("Unable to read listener address");
    (bound, listener)
}
