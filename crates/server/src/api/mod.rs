//! JSON API routes.
//!
//! Endpoints (all under `/api`):
//! - `POST /api/recommend`                         — ranked product recommendations
//! - `POST /api/products/add`                      — add a catalog product
//! - `GET  /api/products`                          — list the catalog
//! - `PUT  /api/products/{id}`                     — update a product
//! - `DELETE /api/products/{id}`                   — remove a product
//! - `GET  /api/products/search`                   — filtered admin search
//! - `GET  /api/products/compare`                  — fetch two products side by side
//! - `POST /api/auth/signup`                       — create an account, issue a session
//! - `POST /api/auth/login`                        — verify credentials, issue a session
//! - `PUT  /api/auth/user/update`                  — update the signed-in user's profile
//! - `GET  /api/users`                             — admin user listing
//! - `DELETE /api/users/{id}`                      — delete an account
//! - `POST /api/history/add`                       — record a search
//! - `GET  /api/history/{user_id}`                 — fetch a user's search history
//! - `DELETE /api/history/clear/{user_id}`         — drop the whole history
//! - `DELETE /api/history/{user_id}/delete/{item_id}` — drop one entry
//! - `PATCH /api/history/{user_id}/{item_id}`      — toggle the wishlist flag
//! - `POST /api/feedback`                          — submit feedback
//! - `GET  /api/feedback`                          — admin feedback listing

use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use serde::Serialize;
use smartbuy_core::auth::PasswordHasher;
use smartbuy_core::errors::{ApplicationError, DomainError, InterfaceError};
use smartbuy_core::recommend::RecommendationEngine;
use smartbuy_db::repositories::{
    FeedbackRepository, ProductRepository, SessionRepository, UserRepository,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use uuid::Uuid;

pub mod auth;
pub mod feedback;
pub mod history;
pub mod products;
pub mod recommend;
pub mod users;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub engine: Arc<RecommendationEngine>,
    pub hasher: Arc<PasswordHasher>,
    pub session_ttl_secs: u64,
}

pub fn router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/api/recommend", post(recommend::recommend))
        .route("/api/products/add", post(products::add_product))
        .route("/api/products", get(products::list_products))
        .route("/api/products/search", get(products::search_products))
        .route("/api/products/compare", get(products::compare_products))
        .route("/api/products/{id}", put(products::update_product))
        .route("/api/products/{id}", delete(products::delete_product))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/user/update", put(auth::update_profile))
        .route("/api/users", get(users::list_users))
        .route("/api/users/{id}", delete(users::delete_user))
        .route("/api/history/add", post(history::add_entry))
        .route("/api/history/clear/{user_id}", delete(history::clear_history))
        .route("/api/history/{user_id}", get(history::get_history))
        .route("/api/history/{user_id}/delete/{item_id}", delete(history::delete_entry))
        .route("/api/history/{user_id}/{item_id}", patch(history::set_wishlist_flag))
        .route("/api/feedback", post(feedback::submit_feedback))
        .route("/api/feedback", get(feedback::list_feedback))
        .layer(cors_layer(cors_allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> =
        allowed_origins.iter().filter_map(|origin| origin.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
}

/// JSON error body shared by every handler.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub correlation_id: String,
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(InterfaceError::BadRequest {
            message: message.into(),
            correlation_id: new_correlation_id(),
        })
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(InterfaceError::Unauthorized {
            message: message.into(),
            correlation_id: new_correlation_id(),
        })
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self(InterfaceError::ServiceUnavailable {
            message: message.into(),
            correlation_id: new_correlation_id(),
        })
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        Self(error.into_interface(new_correlation_id()))
    }
}

/// Handlers raise domain conditions (missing record, duplicate email, bad
/// credentials) as [`DomainError`]; the ladder picks the HTTP status.
impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::from(ApplicationError::from(error))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let correlation_id = match &self.0 {
            InterfaceError::BadRequest { correlation_id, .. }
            | InterfaceError::Unauthorized { correlation_id, .. }
            | InterfaceError::NotFound { correlation_id, .. }
            | InterfaceError::Conflict { correlation_id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id, .. }
            | InterfaceError::Internal { correlation_id, .. } => correlation_id.clone(),
        };
        warn!(
            event_name = "api.request.failed",
            correlation_id = %correlation_id,
            error = %self.0,
            "request failed"
        );
        let body = ApiErrorBody { error: self.0.user_message().to_string(), correlation_id };
        (self.status_code(), Json(body)).into_response()
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Maps repository failures onto the generic service-unavailable response.
pub fn storage_error(error: smartbuy_db::repositories::RepositoryError) -> ApiError {
    ApiError::service_unavailable(error.to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use secrecy::SecretString;
    use smartbuy_core::auth::PasswordHasher;
    use smartbuy_core::config::AppConfig;
    use smartbuy_core::recommend::{CategoryRules, RecommendationEngine};
    use smartbuy_db::repositories::{
        InMemoryFeedbackRepository, InMemoryProductRepository, InMemorySessionRepository,
        InMemoryUserRepository, SqlFeedbackRepository, SqlProductRepository,
        SqlSessionRepository, SqlUserRepository,
    };
    use smartbuy_db::{connect_with_settings, run_pending, DbPool};

    use super::AppState;

    /// State over the in-memory fakes, for handler tests that need no SQL
    /// behavior. Tests that exercise pool failures use [`sqlite_state`].
    pub fn memory_state() -> AppState {
        let products = Arc::new(InMemoryProductRepository::default());
        AppState {
            products: products.clone(),
            users: Arc::new(InMemoryUserRepository::default()),
            sessions: Arc::new(InMemorySessionRepository::default()),
            feedback: Arc::new(InMemoryFeedbackRepository::default()),
            engine: Arc::new(RecommendationEngine::new(products, CategoryRules::default())),
            hasher: Arc::new(PasswordHasher::new(&SecretString::from("api-test-secret"))),
            session_ttl_secs: AppConfig::default().auth.session_ttl_secs,
        }
    }

    pub async fn sqlite_state() -> (AppState, DbPool) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");

        let products = Arc::new(SqlProductRepository::new(pool.clone()));
        let hasher =
            Arc::new(PasswordHasher::new(&SecretString::from("api-test-secret")));
        let state = AppState {
            products: products.clone(),
            users: Arc::new(SqlUserRepository::new(pool.clone())),
            sessions: Arc::new(SqlSessionRepository::new(pool.clone())),
            feedback: Arc::new(SqlFeedbackRepository::new(pool.clone())),
            engine: Arc::new(RecommendationEngine::new(products, CategoryRules::default())),
            hasher,
            session_ttl_secs: AppConfig::default().auth.session_ttl_secs,
        };
        (state, pool)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use smartbuy_core::errors::DomainError;

    use super::test_support::sqlite_state;
    use super::{router, ApiError};

    #[test]
    fn domain_conditions_map_to_their_http_status() {
        let not_found = ApiError::from(DomainError::not_found("product", "p-404"));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let conflict = ApiError::from(DomainError::DuplicateEmail("a@example.com".to_string()));
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let unauthorized = ApiError::from(DomainError::InvalidCredentials);
        assert_eq!(unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let (state, pool) = sqlite_state().await;
        let app = router(state, &["http://localhost:5173".to_string()]);

        let response = app
            .oneshot(Request::builder().uri("/api/nope").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        pool.close().await;
    }

    #[tokio::test]
    async fn listing_route_is_wired_through_the_router() {
        let (state, pool) = sqlite_state().await;
        let app = router(state, &[]);

        let response = app
            .oneshot(Request::builder().uri("/api/products").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        pool.close().await;
    }
}
