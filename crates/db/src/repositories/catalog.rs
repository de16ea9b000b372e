use chrono::Utc;
use sqlx::{QueryBuilder, Row};

use smartbuy_core::domain::product::{Product, ProductId};
use smartbuy_core::errors::ApplicationError;
use smartbuy_core::recommend::CatalogFilter;

use super::{ProductRepository, ProductSearch, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, name, company, category, features, price, rating, \
                               description, image, buy_from, link, store_links";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let company: String =
        row.try_get("company").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let features_json: String =
        row.try_get("features").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: f64 = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rating: f64 = row.try_get("rating").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let image: String = row.try_get("image").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let buy_from: String =
        row.try_get("buy_from").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let link: String = row.try_get("link").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let store_links_json: Option<String> =
        row.try_get("store_links").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let features = serde_json::from_str(&features_json)
        .map_err(|e| RepositoryError::Decode(format!("features column: {e}")))?;
    let store_links = store_links_json.as_deref().and_then(|raw| serde_json::from_str(raw).ok());

    Ok(Product {
        id: ProductId(id),
        name,
        company,
        category,
        features,
        price,
        rating,
        description,
        image,
        buy_from,
        link,
        store_links,
    })
}

/// Escape LIKE wildcards so user text matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(&input.to_lowercase()))
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows =
            sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid"))
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        let features_json = serde_json::to_string(&product.features)
            .map_err(|e| RepositoryError::Decode(format!("features column: {e}")))?;
        let store_links_json = product
            .store_links
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Decode(format!("store_links column: {e}")))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO products
                (id, name, company, category, features, price, rating,
                 description, image, buy_from, link, store_links, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(&product.company)
        .bind(&product.category)
        .bind(&features_json)
        .bind(product.price)
        .bind(product.rating)
        .bind(&product.description)
        .bind(&product.image)
        .bind(&product.buy_from)
        .bind(&product.link)
        .bind(&store_links_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, RepositoryError> {
        let features_json = serde_json::to_string(&product.features)
            .map_err(|e| RepositoryError::Decode(format!("features column: {e}")))?;
        let store_links_json = product
            .store_links
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Decode(format!("store_links column: {e}")))?;

        let result = sqlx::query(
            "UPDATE products
             SET name = ?, company = ?, category = ?, features = ?, price = ?, rating = ?,
                 description = ?, image = ?, buy_from = ?, link = ?, store_links = ?,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.company)
        .bind(&product.category)
        .bind(&features_json)
        .bind(product.price)
        .bind(product.rating)
        .bind(&product.description)
        .bind(&product.image)
        .bind(&product.buy_from)
        .bind(&product.link)
        .bind(&store_links_json)
        .bind(Utc::now().to_rfc3339())
        .bind(&product.id.0)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM products WHERE id = ?").bind(&id.0).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, params: &ProductSearch) -> Result<Vec<Product>, RepositoryError> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if let Some(category) = &params.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(company) = &params.company {
            builder.push(" AND company = ").push_bind(company);
        }
        if let Some(max_price) = params.max_price {
            builder.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(search) = &params.search {
            let pattern = contains_pattern(search);
            builder
                .push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(features) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        builder.push(" ORDER BY rowid");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn find_candidates(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));

        if !filter.categories.is_empty() {
            builder.push(" AND category IN (");
            let mut separated = builder.separated(", ");
            for category in &filter.categories {
                separated.push_bind(category);
            }
            builder.push(")");
        } else if let Some(text) = &filter.text {
            let pattern = contains_pattern(text);
            builder
                .push(" AND (LOWER(category) LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR LOWER(name) LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(max_price) = filter.max_price {
            builder.push(" AND price <= ").push_bind(max_price);
        }
        builder.push(" ORDER BY rowid");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect()
    }
}

#[async_trait::async_trait]
impl smartbuy_core::recommend::ProductCatalog for SqlProductRepository {
    async fn find_candidates(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<Product>, ApplicationError> {
        ProductRepository::find_candidates(self, filter)
            .await
            .map_err(|error| ApplicationError::Persistence(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use smartbuy_core::domain::product::StoreLink;

    use super::*;
    use crate::{connect_with_settings, migrations};

    async fn repo() -> SqlProductRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        SqlProductRepository::new(pool)
    }

    fn product(name: &str, category: &str, price: f64, features: &[&str]) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_string(),
            company: "Acme".to_string(),
            category: category.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
            price,
            rating: 4.0,
            description: String::new(),
            image: String::new(),
            buy_from: "Amazon".to_string(),
            link: "https://example.com".to_string(),
            store_links: None,
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trips_json_columns() {
        let repo = repo().await;
        let mut p = product("Pixel 8", "Smartphones", 60000.0, &["5G", "AMOLED"]);
        let mut links = std::collections::BTreeMap::new();
        links.insert(
            "flipkart".to_string(),
            StoreLink { url: "https://example.com/fk".to_string(), price: 58999.0 },
        );
        p.store_links = Some(links);

        repo.insert(&p).await.expect("insert");
        let fetched = repo.find_by_id(&p.id).await.expect("fetch").expect("present");

        assert_eq!(fetched, p);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let repo = repo().await;
        let p = product("Pixel 8", "Smartphones", 60000.0, &[]);

        assert!(!repo.update(&p).await.expect("update missing"));
        assert!(!repo.delete(&p.id).await.expect("delete missing"));

        repo.insert(&p).await.expect("insert");
        let mut changed = p.clone();
        changed.price = 55000.0;
        assert!(repo.update(&changed).await.expect("update"));
        assert!(repo.delete(&p.id).await.expect("delete"));
        assert!(repo.find_by_id(&p.id).await.expect("fetch").is_none());
    }

    #[tokio::test]
    async fn candidates_scoped_by_category_set_and_price() {
        let repo = repo().await;
        repo.insert(&product("Pixel 8", "Smartphones", 60000.0, &[])).await.expect("insert");
        repo.insert(&product("Redmi Note", "Mobile", 15000.0, &[])).await.expect("insert");
        repo.insert(&product("Galaxy Ultra", "Smartphones", 95000.0, &[])).await.expect("insert");
        repo.insert(&product("ThinkPad", "Laptop", 80000.0, &[])).await.expect("insert");

        let found = ProductRepository::find_candidates(
            &repo,
            &CatalogFilter {
                categories: vec!["Mobile".to_string(), "Smartphones".to_string()],
                text: None,
                max_price: Some(70000.0),
            },
        )
        .await
        .expect("query");

        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Pixel 8", "Redmi Note"]);
    }

    #[tokio::test]
    async fn fuzzy_text_matches_category_or_name_case_insensitively() {
        let repo = repo().await;
        repo.insert(&product("Aurora Projector", "Gadgets", 9000.0, &[])).await.expect("insert");
        repo.insert(&product("Desk Lamp", "Lighting", 1500.0, &[])).await.expect("insert");

        let found = ProductRepository::find_candidates(
            &repo,
            &CatalogFilter {
                categories: Vec::new(),
                text: Some("aurora".to_string()),
                max_price: None,
            },
        )
        .await
        .expect("query");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Aurora Projector");
    }

    #[tokio::test]
    async fn fuzzy_text_wildcards_are_literal() {
        let repo = repo().await;
        repo.insert(&product("100% Cotton Shoe", "Shoes", 2000.0, &[])).await.expect("insert");
        repo.insert(&product("Leather Shoe", "Shoes", 3000.0, &[])).await.expect("insert");

        let found = ProductRepository::find_candidates(
            &repo,
            &CatalogFilter {
                categories: Vec::new(),
                text: Some("100%".to_string()),
                max_price: None,
            },
        )
        .await
        .expect("query");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "100% Cotton Shoe");
    }

    #[tokio::test]
    async fn admin_search_matches_features_column() {
        let repo = repo().await;
        repo.insert(&product("Pixel 8", "Smartphones", 60000.0, &["5G", "AMOLED"]))
            .await
            .expect("insert");
        repo.insert(&product("Feature Phone", "Mobile", 2000.0, &[])).await.expect("insert");

        let found = repo
            .search(&ProductSearch { search: Some("amoled".to_string()), ..Default::default() })
            .await
            .expect("query");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Pixel 8");
    }
}
