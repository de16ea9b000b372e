//! In-memory repository fakes for tests that need no real storage.

use chrono::Utc;
use tokio::sync::RwLock;

use smartbuy_core::auth::Session;
use smartbuy_core::domain::feedback::{Feedback, FeedbackWithUser};
use smartbuy_core::domain::product::{Product, ProductId};
use smartbuy_core::domain::user::{SearchHistoryEntry, User, UserId, UserSummary};
use smartbuy_core::errors::ApplicationError;
use smartbuy_core::recommend::CatalogFilter;

use super::{
    FeedbackRepository, ProductRepository, ProductSearch, RepositoryError, SessionRepository,
    UserRepository,
};

/// Insertion-ordered so candidate order matches the SQL repository's
/// rowid ordering.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

fn matches_filter(product: &Product, filter: &CatalogFilter) -> bool {
    if !filter.categories.is_empty() {
        if !filter.categories.contains(&product.category) {
            return false;
        }
    } else if let Some(text) = &filter.text {
        let text = text.to_lowercase();
        if !product.category.to_lowercase().contains(&text)
            && !product.name.to_lowercase().contains(&text)
        {
            return false;
        }
    }
    filter.max_price.map_or(true, |max| product.price <= max)
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| &p.id != id);
        Ok(products.len() < before)
    }

    async fn search(&self, params: &ProductSearch) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| {
                params.category.as_deref().map_or(true, |c| p.category == c)
                    && params.company.as_deref().map_or(true, |c| p.company == c)
                    && params.max_price.map_or(true, |max| p.price <= max)
                    && params.search.as_deref().map_or(true, |needle| {
                        let needle = needle.to_lowercase();
                        p.name.to_lowercase().contains(&needle)
                            || p.features.iter().any(|f| f.to_lowercase().contains(&needle))
                    })
            })
            .cloned()
            .collect())
    }

    async fn find_candidates(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|p| matches_filter(p, filter)).cloned().collect())
    }
}

#[async_trait::async_trait]
impl smartbuy_core::recommend::ProductCatalog for InMemoryProductRepository {
    async fn find_candidates(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<Product>, ApplicationError> {
        ProductRepository::find_candidates(self, filter)
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Decode(format!(
                "unique constraint violated for email `{}`",
                user.email
            )));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                existing.name = user.name.clone();
                existing.email = user.email.clone();
                existing.phone = user.phone.clone();
                existing.address = user.address.clone();
                existing.photo_url = user.photo_url.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save_history(
        &self,
        id: &UserId,
        history: &[SearchHistoryEntry],
    ) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| &u.id == id) {
            Some(existing) => {
                existing.search_history = history.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_summaries(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().map(User::summary).collect())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| &u.id != id);
        Ok(users.len() < before)
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<Vec<Session>>,
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), RepositoryError> {
        self.sessions.write().await.push(session.clone());
        Ok(())
    }

    async fn find_user_id(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        let now = Utc::now();
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .find(|s| s.token == token && !s.is_expired(now))
            .map(|s| s.user_id.clone()))
    }

    async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| !s.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    entries: RwLock<Vec<Feedback>>,
}

#[async_trait::async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn insert(&self, feedback: &Feedback) -> Result<(), RepositoryError> {
        self.entries.write().await.push(feedback.clone());
        Ok(())
    }

    async fn list_with_user(&self) -> Result<Vec<FeedbackWithUser>, RepositoryError> {
        let entries = self.entries.read().await;
        let mut rows: Vec<FeedbackWithUser> = entries
            .iter()
            .map(|feedback| FeedbackWithUser {
                feedback: feedback.clone(),
                user_name: None,
                user_email: None,
            })
            .collect();
        rows.sort_by(|a, b| b.feedback.created_at.cmp(&a.feedback.created_at));
        Ok(rows)
    }
}
