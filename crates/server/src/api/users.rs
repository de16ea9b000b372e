//! Admin user listing and account deletion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use smartbuy_core::domain::user::{UserId, UserSummary};
use smartbuy_core::errors::DomainError;
use tracing::info;

use super::{storage_error, ApiError, AppState};

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let summaries = state.users.list_summaries().await.map_err(storage_error)?;
    Ok(Json(summaries))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.users.delete(&UserId(id.clone())).await.map_err(storage_error)?;
    if !deleted {
        return Err(ApiError::from(DomainError::not_found("user", id)));
    }
    info!(event_name = "api.users.deleted", user_id = %id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}
