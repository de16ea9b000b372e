use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "products",
        "users",
        "sessions",
        "feedback",
        "idx_products_category",
        "idx_products_price",
        "idx_sessions_user_id",
        "idx_feedback_user_id",
    ];

    #[tokio::test]
    async fn migrations_create_baseline_schema() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for object in MANAGED_SCHEMA_OBJECTS {
            let count = sqlx::query(
                "SELECT COUNT(*) AS count FROM sqlite_master \
                 WHERE type IN ('table', 'index') AND name = ?",
            )
            .bind(object)
            .fetch_one(&pool)
            .await
            .expect("check schema object")
            .get::<i64, _>("count");

            assert_eq!(count, 1, "expected schema object `{object}` after migration");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent_across_reruns() {
        let pool =
            connect_with_settings("sqlite::memory:?cache=shared", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");
        pool.close().await;
    }
}
