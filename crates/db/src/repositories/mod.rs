use async_trait::async_trait;
use thiserror::Error;

use smartbuy_core::auth::Session;
use smartbuy_core::domain::feedback::{Feedback, FeedbackWithUser};
use smartbuy_core::domain::product::{Product, ProductId};
use smartbuy_core::domain::user::{SearchHistoryEntry, User, UserId, UserSummary};
use smartbuy_core::recommend::CatalogFilter;

pub mod catalog;
pub mod feedback;
pub mod memory;
pub mod session;
pub mod user;

pub use catalog::SqlProductRepository;
pub use feedback::SqlFeedbackRepository;
pub use memory::{
    InMemoryFeedbackRepository, InMemoryProductRepository, InMemorySessionRepository,
    InMemoryUserRepository,
};
pub use session::SqlSessionRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Admin-facing search parameters, distinct from the engine's
/// [`CatalogFilter`]: here `search` matches name OR features.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductSearch {
    pub category: Option<String>,
    pub company: Option<String>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError>;
    /// Returns false when no product with that id exists.
    async fn update(&self, product: &Product) -> Result<bool, RepositoryError>;
    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError>;
    async fn search(&self, params: &ProductSearch) -> Result<Vec<Product>, RepositoryError>;
    /// The engine's candidate fetch (category-set / fuzzy-text / max-price
    /// scoping). Result order is catalog insertion order.
    async fn find_candidates(&self, filter: &CatalogFilter)
        -> Result<Vec<Product>, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;
    /// Persists profile fields (name/email/phone/address/photo) only.
    async fn update_profile(&self, user: &User) -> Result<bool, RepositoryError>;
    /// Replaces the embedded search history wholesale.
    async fn save_history(
        &self,
        id: &UserId,
        history: &[SearchHistoryEntry],
    ) -> Result<bool, RepositoryError>;
    async fn list_summaries(&self) -> Result<Vec<UserSummary>, RepositoryError>;
    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: &Session) -> Result<(), RepositoryError>;
    /// Resolves a token to its user, ignoring expired sessions.
    async fn find_user_id(&self, token: &str) -> Result<Option<UserId>, RepositoryError>;
    async fn delete_expired(&self) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn insert(&self, feedback: &Feedback) -> Result<(), RepositoryError>;
    async fn list_with_user(&self) -> Result<Vec<FeedbackWithUser>, RepositoryError>;
}
