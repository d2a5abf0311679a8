use std::future::IntoFuture;
use std::io;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use dev_memory_service::Services;

use crate::config::ServerConfig;
use crate::handlers::{self, health, interactions, invariants, tasks};
use crate::shutdown::ShutdownCoordinator;

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

/// The dev-memory HTTP server.
pub struct DevMemoryServer {
    config: ServerConfig,
    services: Services,
    shutdown: ShutdownCoordinator,
}

impl DevMemoryServer {
    pub fn new(config: ServerConfig, services: Services) -> Self {
        Self {
            config,
            services,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        build_router(AppState {
            services: self.services.clone(),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> io::Result<TcpListener> {
        TcpListener::bind(self.config.bind_addr()).await
    }

    /// Serve on `listener` until shutdown is signalled, then let in-flight
    /// requests drain for at most `shutdown_timeout_secs`.
    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "dev-memory server listening");

        let token = self.shutdown.token();
        let drain_timeout = self.config.shutdown_timeout();
        let signal = token.clone();
        let server = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => result?,
            () = async {
                token.cancelled().await;
                tokio::time::sleep(drain_timeout).await;
            } => {
                warn!(
                    timeout_secs = drain_timeout.as_secs(),
                    "shutdown timed out, dropping open connections"
                );
            }
        }

        info!("dev-memory server stopped");
        Ok(())
    }

    /// Bind and serve in a background task.
    pub async fn start(self) -> io::Result<ServerHandle> {
        let listener = self.bind().await?;
        let port = listener.local_addr()?.port();
        let shutdown = self.shutdown.clone();
        let task = tokio::spawn(self.serve(listener));
        Ok(ServerHandle {
            port,
            shutdown,
            task,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/dev-memory/tasks", get(tasks::list).post(tasks::create))
        .route("/dev-memory/tasks/{id}", get(tasks::get).patch(tasks::update))
        .route(
            "/dev-memory/tasks/{id}/interactions",
            get(interactions::list).post(interactions::append),
        )
        .route("/invariants", get(invariants::list))
        .route("/invariants/check", get(invariants::check))
        .route("/health", get(health::health))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Handle returned by [`DevMemoryServer::start`].
pub struct ServerHandle {
    pub port: u16,
    shutdown: ShutdownCoordinator,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Signal shutdown and wait for the server loop to finish.
    pub async fn stop(self) -> io::Result<()> {
        self.shutdown.shutdown();
        self.task.await.map_err(io::Error::other)?
    }
}
