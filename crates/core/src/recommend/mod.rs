//! Product recommendation engine
//!
//! One pipeline per request: normalize free text, resolve canonical
//! categories, fetch a bounded candidate set from the catalog, score each
//! candidate on feature coverage, then rank and partition into a single
//! best pick plus ranked similar products.

mod engine;
mod normalize;
mod rules;
mod scoring;
mod types;

pub use engine::{ProductCatalog, RecommendationEngine};
pub use normalize::normalize;
pub use rules::{CategoryRule, CategoryRules, VALID_CATEGORIES};
pub use scoring::{
    match_features, score, FeatureMatch, FEATURE_WEIGHT, FULL_MATCH_WEIGHT, PRICE_PENALTY_DIVISOR,
    RATING_WEIGHT,
};
pub use types::{CatalogFilter, FeaturesInput, MaxPriceInput, RankedRecommendations, SearchRequest};
