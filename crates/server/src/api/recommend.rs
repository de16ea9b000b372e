//! The recommendation endpoint: lenient request decoding in front of the
//! core ranking engine.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use smartbuy_core::recommend::{
    FeaturesInput, MaxPriceInput, RankedRecommendations, SearchRequest,
};
use tracing::info;

use super::{new_correlation_id, ApiError, AppState};

/// Wire shape of a recommendation request. `maxPrice` and `features`
/// tolerate the loose encodings clients actually send.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub max_price: Option<MaxPriceInput>,
    #[serde(default)]
    pub features: Option<FeaturesInput>,
}

impl RecommendRequest {
    pub fn into_search_request(self) -> SearchRequest {
        SearchRequest {
            product_type: self.product_type.unwrap_or_default(),
            max_price: self.max_price.and_then(MaxPriceInput::into_constraint),
            features: self.features.map(FeaturesInput::into_tokens).unwrap_or_default(),
        }
    }
}

pub async fn recommend(
    State(state): State<AppState>,
    Json(body): Json<RecommendRequest>,
) -> Result<Json<RankedRecommendations>, ApiError> {
    let request = body.into_search_request();
    let correlation_id = new_correlation_id();

    let ranked = state.engine.recommend(&request).await?;

    info!(
        event_name = "api.recommend.completed",
        correlation_id = %correlation_id,
        product_type = %request.product_type,
        exact_matches = ranked.exact_matches.len(),
        similar_products = ranked.similar_products.len(),
        "recommendation request completed"
    );
    Ok(Json(ranked))
}
