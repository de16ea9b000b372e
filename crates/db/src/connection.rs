use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 5, 30).await
}

/// Open a pool with the catalog's SQLite profile: the database file is
/// created on first run, foreign keys are enforced (sessions cascade when
/// their user is deleted), WAL keeps admin writes from blocking concurrent
/// recommendation reads, and the busy timeout matches the configured
/// acquire timeout.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let timeout = Duration::from_secs(timeout_secs.max(1));
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(timeout);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(timeout)
        .connect_with(options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connections_enforce_foreign_keys() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");

        let enabled: i64 =
            sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&pool).await.expect("pragma");
        assert_eq!(enabled, 1);
        pool.close().await;
    }

    #[tokio::test]
    async fn busy_timeout_follows_the_configured_timeout() {
        let pool = connect_with_settings("sqlite::memory:", 1, 7).await.expect("connect");

        let millis: i64 =
            sqlx::query_scalar("PRAGMA busy_timeout").fetch_one(&pool).await.expect("pragma");
        assert_eq!(millis, 7_000);
        pool.close().await;
    }
}
