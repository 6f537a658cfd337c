//! Embedded schema migrations, applied at startup.
//!
//! `diesel_migrations` only speaks the synchronous `Connection` trait, so
//! the embedded migrations run through `AsyncConnectionWrapper` on a
//! blocking thread before the async pool is built.

use diesel::Connection;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// All migrations shipped inside the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database connection could not be established.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply.
    #[error("failed to run migrations: {0}")]
    Run(String),
    /// The blocking migration task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    Join(String),
}

/// Apply any pending migrations against `database_url`.
pub async fn run_pending(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn: AsyncConnectionWrapper<AsyncPgConnection> =
            AsyncConnectionWrapper::establish(&url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| MigrationError::Run(e.to_string()))?;
        for version in applied {
            info!(migration = %version, "applied migration");
        }
        Ok(())
    })
    .await
    .map_err(|e| MigrationError::Join(e.to_string()))?
}
