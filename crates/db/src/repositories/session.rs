use chrono::Utc;
use sqlx::Row;

use smartbuy_core::auth::Session;
use smartbuy_core::domain::user::UserId;

use super::{RepositoryError, SessionRepository};
use crate::DbPool;

pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(&session.user_id.0)
            .bind(session.expires_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_user_id(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        let row = sqlx::query("SELECT user_id FROM sessions WHERE token = ? AND expires_at > ?")
            .bind(token)
            .bind(Utc::now().to_rfc3339())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            row.try_get::<String, _>("user_id")
                .map(UserId)
                .map_err(|e| RepositoryError::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use smartbuy_core::domain::user::User;

    use super::*;
    use crate::repositories::{SqlUserRepository, UserRepository};
    use crate::{connect_with_settings, migrations};

    async fn pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        pool
    }

    async fn seeded_user(pool: &DbPool) -> UserId {
        let user = User {
            id: UserId::generate(),
            name: "Asha".to_string(),
            email: "session@example.com".to_string(),
            password_digest: "digest".to_string(),
            salt: "salt".to_string(),
            phone: None,
            address: None,
            photo_url: None,
            is_admin: false,
            search_history: Vec::new(),
            created_at: Utc::now(),
        };
        SqlUserRepository::new(pool.clone()).insert(&user).await.expect("insert user");
        user.id
    }

    #[tokio::test]
    async fn live_token_resolves_to_its_user() {
        let pool = pool().await;
        let user_id = seeded_user(&pool).await;
        let repo = SqlSessionRepository::new(pool);

        let session = Session::issue(user_id.clone(), 3600);
        repo.insert(&session).await.expect("insert");

        let resolved = repo.find_user_id(&session.token).await.expect("lookup");
        assert_eq!(resolved, Some(user_id));
    }

    #[tokio::test]
    async fn expired_token_is_invisible_and_purgeable() {
        let pool = pool().await;
        let user_id = seeded_user(&pool).await;
        let repo = SqlSessionRepository::new(pool);

        let mut session = Session::issue(user_id, 3600);
        session.expires_at = Utc::now() - Duration::seconds(1);
        repo.insert(&session).await.expect("insert");

        assert_eq!(repo.find_user_id(&session.token).await.expect("lookup"), None);
        assert_eq!(repo.delete_expired().await.expect("purge"), 1);
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let pool = pool().await;
        let repo = SqlSessionRepository::new(pool);
        assert_eq!(repo.find_user_id("missing").await.expect("lookup"), None);
    }
}
