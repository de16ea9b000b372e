//! Account signup, login, and profile updates. Sessions are opaque
//! server-side tokens with a configured time to live.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use smartbuy_core::auth::{PasswordHasher, Session};
use smartbuy_core::domain::user::{User, UserId, UserProfile};
use smartbuy_core::errors::DomainError;
use tracing::info;

use super::{storage_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = normalize_email(&body.email);
    if body.name.trim().is_empty() || email.is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("name, email and password are required"));
    }

    if state.users.find_by_email(&email).await.map_err(storage_error)?.is_some() {
        return Err(ApiError::from(DomainError::DuplicateEmail(email)));
    }

    let salt = PasswordHasher::generate_salt();
    let user = User {
        id: UserId::generate(),
        name: body.name.trim().to_string(),
        email,
        password_digest: state.hasher.digest(&body.password, &salt),
        salt,
        phone: body.phone,
        address: body.address,
        photo_url: body.photo_url,
        is_admin: false,
        search_history: Vec::new(),
        created_at: Utc::now(),
    };
    state.users.insert(&user).await.map_err(storage_error)?;

    let session = issue_session(&state, user.id.clone()).await?;
    info!(
        event_name = "api.auth.signup",
        user_id = %user.id.0,
        "account created"
    );
    Ok((StatusCode::CREATED, Json(AuthResponse { token: session.token, user: user.profile() })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(&body.email);
    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::from(DomainError::InvalidCredentials))?;

    if !state.hasher.verify(&body.password, &user.salt, &user.password_digest) {
        return Err(ApiError::from(DomainError::InvalidCredentials));
    }

    // Opportunistic cleanup; login is the natural place for it.
    state.sessions.delete_expired().await.map_err(storage_error)?;

    let session = issue_session(&state, user.id.clone()).await?;
    info!(
        event_name = "api.auth.login",
        user_id = %user.id.0,
        "session issued"
    );
    Ok(Json(AuthResponse { token: session.token, user: user.profile() }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProfileUpdateRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user_id = authenticate(&state, &headers).await?;
    let mut user = state
        .users
        .find_by_id(&user_id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::from(DomainError::not_found("user", user_id.0.clone())))?;

    if let Some(name) = body.name.filter(|n| !n.trim().is_empty()) {
        user.name = name.trim().to_string();
    }
    if let Some(phone) = body.phone {
        user.phone = Some(phone);
    }
    if let Some(address) = body.address {
        user.address = Some(address);
    }
    if let Some(photo_url) = body.photo_url {
        user.photo_url = Some(photo_url);
    }

    let updated = state.users.update_profile(&user).await.map_err(storage_error)?;
    if !updated {
        return Err(ApiError::from(DomainError::not_found("user", user.id.0.clone())));
    }
    Ok(Json(user.profile()))
}

async fn issue_session(state: &AppState, user_id: UserId) -> Result<Session, ApiError> {
    let session = Session::issue(user_id, state.session_ttl_secs);
    state.sessions.insert(&session).await.map_err(storage_error)?;
    Ok(session)
}

/// Resolves the bearer token in `Authorization` to a live session's user.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserId, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;

    state
        .sessions
        .find_user_id(token)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::unauthorized("session expired or unknown"))
}
