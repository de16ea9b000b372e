//! Per-user search history: capped, newest first, de-duplicated on the
//! search parameters.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use smartbuy_core::domain::user::{SearchHistoryEntry, User, UserId};
use smartbuy_core::errors::DomainError;
use uuid::Uuid;

use super::{storage_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    pub user_id: String,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub results_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub search_history: Vec<SearchHistoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistUpdateRequest {
    pub is_in_wishlist: bool,
}

async fn load_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    state
        .users
        .find_by_id(&UserId(user_id.to_string()))
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::from(DomainError::not_found("user", user_id)))
}

pub async fn add_entry(
    State(state): State<AppState>,
    Json(body): Json<AddEntryRequest>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let mut user = load_user(&state, &body.user_id).await?;

    let query = body
        .query
        .or_else(|| body.product_type.clone())
        .unwrap_or_default();
    user.push_history(SearchHistoryEntry {
        id: Uuid::new_v4().to_string(),
        query,
        product_type: body.product_type,
        max_price: body.max_price,
        features: body.features,
        results_count: body.results_count,
        timestamp: Utc::now(),
        is_in_wishlist: false,
    });

    state.users.save_history(&user.id, &user.search_history).await.map_err(storage_error)?;
    Ok(Json(HistoryResponse { search_history: user.search_history }))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let user = load_user(&state, &user_id).await?;
    Ok(Json(HistoryResponse { search_history: user.search_history }))
}

pub async fn clear_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user = load_user(&state, &user_id).await?;
    state.users.save_history(&user.id, &[]).await.map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let mut user = load_user(&state, &user_id).await?;

    let before = user.search_history.len();
    user.search_history.retain(|entry| entry.id != item_id);
    if user.search_history.len() == before {
        return Err(ApiError::from(DomainError::not_found("history entry", item_id)));
    }

    state.users.save_history(&user.id, &user.search_history).await.map_err(storage_error)?;
    Ok(Json(HistoryResponse { search_history: user.search_history }))
}

pub async fn set_wishlist_flag(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, String)>,
    Json(body): Json<WishlistUpdateRequest>,
) -> Result<Json<SearchHistoryEntry>, ApiError> {
    let mut user = load_user(&state, &user_id).await?;

    let entry = user
        .search_history
        .iter_mut()
        .find(|entry| entry.id == item_id)
        .ok_or_else(|| ApiError::from(DomainError::not_found("history entry", item_id.clone())))?;
    entry.is_in_wishlist = body.is_in_wishlist;
    let updated = entry.clone();

    state.users.save_history(&user.id, &user.search_history).await.map_err(storage_error)?;
    Ok(Json(updated))
}
