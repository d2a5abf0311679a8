//! HTTP front door for the dev-memory service.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, DevMemoryServer, ServerHandle};
pub use shutdown::ShutdownCoordinator;
