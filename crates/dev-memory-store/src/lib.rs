pub mod connection;
pub mod database;
pub mod error;
pub mod interactions;
pub mod invariants;
pub mod migrations;
pub mod row_helpers;
pub mod tasks;

pub use connection::{ConnectionConfig, DatabaseTarget};
pub use database::Database;
pub use error::StoreError;
pub use interactions::InteractionRepo;
pub use invariants::InvariantRepo;
pub use migrations::{run_migrations, MigrationScript, MigrationSource};
pub use tasks::TaskRepo;
