//! Database module providing connection management and per-domain queries.

pub mod attachments;
pub mod comments;
pub mod dashboard;
pub mod executions;
pub mod steps;
pub mod templates;
pub mod test_cases;
pub mod test_runs;
pub mod versions;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::error::{AppError, AppResult};

/// Connection pool wrapper around SeaORM's `DatabaseConnection`.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to the SQLite database at `url`.
    ///
    /// In-memory databases are pinned to a single pooled connection:
    /// `sqlite::memory:` is per-connection state, so a larger pool would
    /// hand each checkout a different empty database.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        Self::connect_with(url, max_connections).await
    }

    /// Connect with an explicit pool size.
    pub async fn connect_with(url: &str, max_connections: u32) -> AppResult<Self> {
        let mut options = ConnectOptions::new(url.to_owned());
        options
            .max_connections(max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Access the underlying connection for queries and transactions.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
