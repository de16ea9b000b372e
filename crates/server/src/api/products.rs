//! Catalog CRUD, admin search, and side-by-side comparison.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use smartbuy_core::domain::product::{Product, ProductId};
use smartbuy_core::errors::DomainError;
use smartbuy_db::repositories::ProductSearch;
use tracing::info;

use super::{storage_error, ApiError, AppState};

/// Wire shape of an inbound product. The id is server-assigned on add.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub company: String,
    pub category: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub buy_from: String,
    #[serde(default)]
    pub link: String,
}

impl ProductInput {
    fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            company: self.company,
            category: self.category,
            features: self.features,
            price: self.price,
            rating: self.rating,
            description: self.description,
            image: self.image,
            buy_from: self.buy_from,
            link: self.link,
            store_links: None,
        }
    }
}

pub async fn add_product(
    State(state): State<AppState>,
    Json(body): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    if body.name.trim().is_empty() || body.category.trim().is_empty() {
        return Err(ApiError::bad_request("product name and category are required"));
    }

    let product = body.into_product(ProductId::generate());
    state.products.insert(&product).await.map_err(storage_error)?;

    info!(
        event_name = "api.products.added",
        product_id = %product.id.0,
        category = %product.category,
        "product added to catalog"
    );
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state.products.list_all().await.map_err(storage_error)?;
    Ok(Json(products))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ProductInput>,
) -> Result<Json<Product>, ApiError> {
    let product = body.into_product(ProductId(id));
    let updated = state.products.update(&product).await.map_err(storage_error)?;
    if !updated {
        return Err(ApiError::from(DomainError::not_found("product", product.id.0.clone())));
    }
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted =
        state.products.delete(&ProductId(id.clone())).await.map_err(storage_error)?;
    if !deleted {
        return Err(ApiError::from(DomainError::not_found("product", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub category: Option<String>,
    pub company: Option<String>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let params = ProductSearch {
        category: query.category.filter(|c| !c.trim().is_empty()),
        company: query.company.filter(|c| !c.trim().is_empty()),
        max_price: query.max_price,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let products = state.products.search(&params).await.map_err(storage_error)?;
    Ok(Json(products))
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub id1: String,
    pub id2: String,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub first: Product,
    pub second: Product,
}

pub async fn compare_products(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<CompareResponse>, ApiError> {
    let first = state
        .products
        .find_by_id(&ProductId(query.id1.clone()))
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::from(DomainError::not_found("product", query.id1.clone())))?;
    let second = state
        .products
        .find_by_id(&ProductId(query.id2.clone()))
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::from(DomainError::not_found("product", query.id2.clone())))?;

    Ok(Json(CompareResponse { first, second }))
}
