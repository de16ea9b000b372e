use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Newest-first search history is capped per user; older entries fall off.
pub const HISTORY_CAP: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// One remembered recommendation search, embedded in the owning user record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_count: Option<u32>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_in_wishlist: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub salt: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub is_admin: bool,
    pub search_history: Vec<SearchHistoryEntry>,
    pub created_at: DateTime<Utc>,
}

/// Projection used by the admin user listing; never exposes credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Profile view returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub is_admin: bool,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            photo_url: self.photo_url.clone(),
            is_admin: self.is_admin,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
        }
    }

    /// Prepend a history entry. Existing entries describing the same search
    /// (same product type, max price, and feature list) are removed first,
    /// and the list is truncated to [`HISTORY_CAP`].
    pub fn push_history(&mut self, entry: SearchHistoryEntry) {
        self.search_history.retain(|existing| {
            existing.product_type != entry.product_type
                || existing.max_price != entry.max_price
                || existing.features != entry.features
        });
        self.search_history.insert(0, entry);
        self.search_history.truncate(HISTORY_CAP);
    }
}
