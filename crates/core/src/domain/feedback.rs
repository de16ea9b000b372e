use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub user_id: UserId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn new(user_id: UserId, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Admin listing row: feedback joined with the submitting user's identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackWithUser {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}
