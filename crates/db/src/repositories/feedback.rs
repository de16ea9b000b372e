use chrono::{DateTime, Utc};
use sqlx::Row;

use smartbuy_core::domain::feedback::{Feedback, FeedbackWithUser};
use smartbuy_core::domain::user::UserId;

use super::{FeedbackRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFeedbackRepository {
    pool: DbPool,
}

impl SqlFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FeedbackRepository for SqlFeedbackRepository {
    async fn insert(&self, feedback: &Feedback) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO feedback (id, user_id, message, created_at) VALUES (?, ?, ?, ?)")
            .bind(&feedback.id)
            .bind(&feedback.user_id.0)
            .bind(&feedback.message)
            .bind(feedback.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_with_user(&self) -> Result<Vec<FeedbackWithUser>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT f.id, f.user_id, f.message, f.created_at, u.name AS user_name,
                    u.email AS user_email
             FROM feedback f
             LEFT JOIN users u ON u.id = f.user_id
             ORDER BY f.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String =
                    row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let user_id: String =
                    row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let message: String =
                    row.try_get("message").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let created_at_str: String = row
                    .try_get("created_at")
                    .map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let user_name: Option<String> =
                    row.try_get("user_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let user_email: Option<String> = row
                    .try_get("user_email")
                    .map_err(|e| RepositoryError::Decode(e.to_string()))?;

                let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                Ok(FeedbackWithUser {
                    feedback: Feedback { id, user_id: UserId(user_id), message, created_at },
                    user_name,
                    user_email,
                })
            })
            .collect()
    }
}
