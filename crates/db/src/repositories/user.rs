use chrono::{DateTime, Utc};
use sqlx::Row;

use smartbuy_core::domain::user::{SearchHistoryEntry, User, UserId, UserSummary};

use super::{RepositoryError, UserRepository};
use crate::DbPool;

const USER_COLUMNS: &str = "id, name, email, password_digest, salt, phone, address, photo_url, \
                            is_admin, search_history, created_at";

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let email: String = row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let password_digest: String =
        row.try_get("password_digest").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let salt: String = row.try_get("salt").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let phone: Option<String> =
        row.try_get("phone").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let address: Option<String> =
        row.try_get("address").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let photo_url: Option<String> =
        row.try_get("photo_url").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let is_admin: bool =
        row.try_get("is_admin").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let history_json: String =
        row.try_get("search_history").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let search_history: Vec<SearchHistoryEntry> = serde_json::from_str(&history_json)
        .map_err(|e| RepositoryError::Decode(format!("search_history column: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(User {
        id: UserId(id),
        name,
        email,
        password_digest,
        salt,
        phone,
        address,
        photo_url,
        is_admin,
        search_history,
        created_at,
    })
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let history_json = serde_json::to_string(&user.search_history)
            .map_err(|e| RepositoryError::Decode(format!("search_history column: {e}")))?;

        sqlx::query(
            "INSERT INTO users
                (id, name, email, password_digest, salt, phone, address, photo_url,
                 is_admin, search_history, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id.0)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_digest)
        .bind(&user.salt)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.photo_url)
        .bind(user.is_admin)
        .bind(&history_json)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users
             SET name = ?, email = ?, phone = ?, address = ?, photo_url = ?
             WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.photo_url)
        .bind(&user.id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_history(
        &self,
        id: &UserId,
        history: &[SearchHistoryEntry],
    ) -> Result<bool, RepositoryError> {
        let history_json = serde_json::to_string(history)
            .map_err(|e| RepositoryError::Decode(format!("search_history column: {e}")))?;

        let result = sqlx::query("UPDATE users SET search_history = ? WHERE id = ?")
            .bind(&history_json)
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_summaries(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, email, is_admin FROM users ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let id: String =
                    row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let name: String =
                    row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let email: String =
                    row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let is_admin: bool =
                    row.try_get("is_admin").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                Ok(UserSummary { id: UserId(id), name, email, is_admin })
            })
            .collect()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM users WHERE id = ?").bind(&id.0).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
