//! The recommendation pipeline: resolve categories, fetch candidates,
//! score, rank, partition.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::product::Product;
use crate::errors::ApplicationError;

use super::normalize::normalize;
use super::rules::CategoryRules;
use super::scoring::{match_features, score};
use super::types::{CatalogFilter, RankedRecommendations, SearchRequest};

/// Narrow read-only view of the product catalog. The SQL implementation
/// lives in `smartbuy-db`; tests use in-memory fakes.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_candidates(&self, filter: &CatalogFilter) -> Result<Vec<Product>, ApplicationError>;
}

/// Stateless per-request engine. Holds only immutable configuration and a
/// catalog handle; concurrent requests share it freely.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn ProductCatalog>,
    rules: CategoryRules,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<dyn ProductCatalog>, rules: CategoryRules) -> Self {
        Self { catalog, rules }
    }

    /// Scope the catalog query before fetching: resolved categories win;
    /// otherwise non-blank raw text falls back to fuzzy matching; otherwise
    /// only the price constraint (if any) applies.
    pub fn build_filter(&self, request: &SearchRequest) -> CatalogFilter {
        let mut filter = CatalogFilter { max_price: request.max_price, ..CatalogFilter::default() };

        let categories = self.rules.resolve(&request.product_type);
        if !categories.is_empty() {
            filter.categories = categories;
        } else {
            let text = normalize(&request.product_type);
            if !text.is_empty() {
                filter.text = Some(text);
            }
        }

        filter
    }

    pub async fn recommend(
        &self,
        request: &SearchRequest,
    ) -> Result<RankedRecommendations, ApplicationError> {
        let filter = self.build_filter(request);
        let candidates = self.catalog.find_candidates(&filter).await?;
        if candidates.is_empty() {
            return Ok(RankedRecommendations::default());
        }

        let requested: Vec<String> = request.features.iter().map(|f| normalize(f)).collect();

        let mut scored: Vec<(Product, f64)> = candidates
            .into_iter()
            .map(|product| {
                let feature_match = match_features(&requested, &product.features);
                let value = score(&product, feature_match);
                (product, value)
            })
            .collect();

        // Stable sort: ties keep catalog order, so identical reruns against
        // an unchanged catalog snapshot are reproducible.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut views = scored.into_iter().map(|(product, _)| product.into_view());
        let exact_matches = views.next().into_iter().collect();
        let similar_products = views.collect();

        Ok(RankedRecommendations { exact_matches, similar_products })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;

    use super::*;

    struct FakeCatalog {
        products: Vec<Product>,
    }

    #[async_trait]
    impl ProductCatalog for FakeCatalog {
        async fn find_candidates(
            &self,
            filter: &CatalogFilter,
        ) -> Result<Vec<Product>, ApplicationError> {
            Ok(self
                .products
                .iter()
                .filter(|p| {
                    let category_ok =
                        filter.categories.is_empty() || filter.categories.contains(&p.category);
                    let text_ok = filter.text.as_deref().map_or(true, |text| {
                        p.category.to_lowercase().contains(text)
                            || p.name.to_lowercase().contains(text)
                    });
                    let price_ok = filter.max_price.map_or(true, |max| p.price <= max);
                    category_ok && text_ok && price_ok
                })
                .cloned()
                .collect())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl ProductCatalog for BrokenCatalog {
        async fn find_candidates(
            &self,
            _filter: &CatalogFilter,
        ) -> Result<Vec<Product>, ApplicationError> {
            Err(ApplicationError::Persistence("catalog offline".to_string()))
        }
    }

    fn product(name: &str, category: &str, price: f64, rating: f64, features: &[&str]) -> Product {
        Product {
            id: ProductId(format!("id-{name}")),
            name: name.to_string(),
            company: "co".to_string(),
            category: category.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
            price,
            rating,
            description: String::new(),
            image: String::new(),
            buy_from: "Amazon".to_string(),
            link: format!("https://example.com/{name}"),
            store_links: None,
        }
    }

    fn engine(products: Vec<Product>) -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(FakeCatalog { products }), CategoryRules::default())
    }

    #[test]
    fn filter_uses_resolved_categories_over_fuzzy_text() {
        let e = engine(Vec::new());
        let filter = e.build_filter(&SearchRequest {
            product_type: "phone".to_string(),
            max_price: Some(70000.0),
            features: Vec::new(),
        });

        assert_eq!(filter.categories, vec!["Mobile", "Smartphones"]);
        assert_eq!(filter.text, None);
        assert_eq!(filter.max_price, Some(70000.0));
    }

    #[test]
    fn filter_falls_back_to_fuzzy_text_for_unresolved_input() {
        let e = engine(Vec::new());
        let filter = e.build_filter(&SearchRequest {
            product_type: "  Gaming  Rig ".to_string(),
            max_price: None,
            features: Vec::new(),
        });

        assert!(filter.categories.is_empty());
        assert_eq!(filter.text.as_deref(), Some("gaming rig"));
    }

    #[test]
    fn filter_is_price_only_for_blank_input() {
        let e = engine(Vec::new());
        let filter = e.build_filter(&SearchRequest {
            product_type: "   ".to_string(),
            max_price: Some(1000.0),
            features: Vec::new(),
        });

        assert!(filter.categories.is_empty());
        assert_eq!(filter.text, None);
        assert_eq!(filter.max_price, Some(1000.0));
    }

    #[tokio::test]
    async fn empty_catalog_result_returns_two_empty_buckets() {
        let e = engine(Vec::new());
        let result = e
            .recommend(&SearchRequest { product_type: "laptop".to_string(), ..Default::default() })
            .await
            .expect("engine result");

        assert!(result.exact_matches.is_empty());
        assert!(result.similar_products.is_empty());
    }

    #[tokio::test]
    async fn best_candidate_is_partitioned_from_similar_in_rank_order() {
        let e = engine(vec![
            product("mid", "Laptop", 50000.0, 4.0, &["SSD"]),
            product("best", "Laptop", 40000.0, 4.8, &["SSD", "16GB RAM"]),
            product("worst", "Laptop", 90000.0, 3.0, &[]),
        ]);

        let result = e
            .recommend(&SearchRequest {
                product_type: "laptop".to_string(),
                max_price: None,
                features: vec!["SSD".to_string(), "16GB RAM".to_string()],
            })
            .await
            .expect("engine result");

        assert_eq!(result.exact_matches.len(), 1);
        assert_eq!(result.exact_matches[0].name, "best");
        let similar: Vec<&str> =
            result.similar_products.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(similar, vec!["mid", "worst"]);
    }

    #[tokio::test]
    async fn tied_scores_keep_catalog_order() {
        // Identical price/rating/features score identically; the stable sort
        // must preserve catalog order between them on every rerun.
        let e = engine(vec![
            product("top", "Shoes", 2000.0, 4.9, &[]),
            product("tie-a", "Shoes", 3000.0, 4.0, &[]),
            product("tie-b", "Shoes", 3000.0, 4.0, &[]),
            product("last", "Shoes", 9000.0, 2.0, &[]),
        ]);

        for _ in 0..3 {
            let result = e
                .recommend(&SearchRequest {
                    product_type: "shoes".to_string(),
                    ..Default::default()
                })
                .await
                .expect("engine result");

            assert_eq!(result.exact_matches[0].name, "top");
            let similar: Vec<&str> =
                result.similar_products.iter().map(|v| v.name.as_str()).collect();
            assert_eq!(similar, vec!["tie-a", "tie-b", "last"]);
        }
    }

    #[tokio::test]
    async fn every_returned_item_carries_the_recommendation_flag() {
        let e = engine(vec![
            product("a", "TVs", 30000.0, 4.5, &[]),
            product("b", "TVs", 35000.0, 4.0, &[]),
        ]);

        let result = e
            .recommend(&SearchRequest { product_type: "tv".to_string(), ..Default::default() })
            .await
            .expect("engine result");

        assert!(result.exact_matches.iter().all(|v| v.is_ai_recommended));
        assert!(result.similar_products.iter().all(|v| v.is_ai_recommended));
    }

    #[tokio::test]
    async fn end_to_end_phone_search_ranks_full_feature_match_first() {
        let e = engine(vec![
            product("Pixel 8", "Smartphones", 60000.0, 4.5, &["5G", "AMOLED"]),
            product("Redmi Note", "Mobile", 15000.0, 4.0, &["5G"]),
        ]);

        let result = e
            .recommend(&SearchRequest {
                product_type: "phone".to_string(),
                max_price: Some(70000.0),
                features: vec!["5G".to_string(), "AMOLED".to_string()],
            })
            .await
            .expect("engine result");

        assert_eq!(result.exact_matches.len(), 1);
        assert_eq!(result.exact_matches[0].name, "Pixel 8");
        assert_eq!(result.similar_products.len(), 1);
        assert_eq!(result.similar_products[0].name, "Redmi Note");
    }

    #[tokio::test]
    async fn catalog_failure_propagates_without_partial_results() {
        let e = RecommendationEngine::new(Arc::new(BrokenCatalog), CategoryRules::default());
        let err = e
            .recommend(&SearchRequest { product_type: "tv".to_string(), ..Default::default() })
            .await
            .expect_err("catalog failure should surface");

        assert!(matches!(err, ApplicationError::Persistence(_)));
    }
}
