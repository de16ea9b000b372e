//! User feedback submission and the admin listing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use smartbuy_core::domain::feedback::{Feedback, FeedbackWithUser};
use smartbuy_core::domain::user::UserId;

use super::{storage_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub message: String,
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let user_id = body
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("userId is required"))?;
    if body.message.trim().is_empty() {
        return Err(ApiError::bad_request("message is required"));
    }

    let feedback = Feedback::new(UserId(user_id), body.message.trim());
    state.feedback.insert(&feedback).await.map_err(storage_error)?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn list_feedback(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackWithUser>>, ApiError> {
    let rows = state.feedback.list_with_user().await.map_err(storage_error)?;
    Ok(Json(rows))
}
