use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// One purchasable listing of a product at a named store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreLink {
    pub url: String,
    pub price: f64,
}

/// Catalog record. The recommendation engine only ever reads these; the
/// admin CRUD surface is the sole writer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub company: String,
    pub category: String,
    pub features: Vec<String>,
    pub price: f64,
    pub rating: f64,
    pub description: String,
    pub image: String,
    pub buy_from: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_links: Option<BTreeMap<String, StoreLink>>,
}

/// Client-facing reshaping of a catalog record: same attributes, a
/// guaranteed `storeLinks` mapping, and the recommendation flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub company: String,
    pub category: String,
    pub features: Vec<String>,
    pub price: f64,
    pub rating: f64,
    pub description: String,
    pub image: String,
    pub buy_from: String,
    pub link: String,
    pub store_links: BTreeMap<String, StoreLink>,
    #[serde(rename = "isAIRecommended")]
    pub is_ai_recommended: bool,
}

impl Product {
    /// Reshape for the client. Records without a native multi-store mapping
    /// get a single-entry mapping synthesized from `buy_from`/`link`/`price`,
    /// keyed by the lower-cased store name.
    pub fn into_view(self) -> ProductView {
        let store_links = match self.store_links {
            Some(links) if !links.is_empty() => links,
            _ => synthesize_store_links(&self.buy_from, &self.link, self.price),
        };

        ProductView {
            id: self.id,
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
            store_links,
            is_ai_recommended: true,
        }
    }
}

fn synthesize_store_links(buy_from: &str, link: &str, price: f64) -> BTreeMap<String, StoreLink> {
    let mut links = BTreeMap::new();
    if !buy_from.trim().is_empty() && !link.trim().is_empty() {
        links.insert(buy_from.trim().to_lowercase(), StoreLink { url: link.to_string(), price });
    }
    links
}
