pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use auth::{PasswordHasher, Session};
pub use domain::feedback::{Feedback, FeedbackWithUser};
pub use domain::product::{Product, ProductId, ProductView, StoreLink};
pub use domain::user::{SearchHistoryEntry, User, UserId, UserProfile, UserSummary, HISTORY_CAP};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{
    CatalogFilter, CategoryRule, CategoryRules, ProductCatalog, RankedRecommendations,
    RecommendationEngine, SearchRequest,
};
