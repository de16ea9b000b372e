use serde::{Deserialize, Serialize};

use crate::domain::product::ProductView;

/// One recommendation invocation, already coerced into typed form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchRequest {
    pub product_type: String,
    pub max_price: Option<f64>,
    pub features: Vec<String>,
}

/// `maxPrice` as it arrives on the wire: a number, a numeric string, or
/// garbage. Garbage (and non-positive values) mean "no price constraint"
/// rather than an error.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MaxPriceInput {
    Number(f64),
    Text(String),
}

impl MaxPriceInput {
    pub fn into_constraint(self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => n,
            Self::Text(raw) => raw.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// `features` as it arrives on the wire: either a JSON array or one
/// comma-separated string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FeaturesInput {
    List(Vec<String>),
    Csv(String),
}

impl FeaturesInput {
    pub fn into_tokens(self) -> Vec<String> {
        match self {
            Self::List(items) => {
                items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
            }
            Self::Csv(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Read-only query the engine hands to the catalog.
///
/// Exactly one text constraint applies: a resolved category IN-set, or a
/// case-insensitive substring match (`text`, matched literally) over
/// category OR name, or neither. `max_price` composes with either.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogFilter {
    pub categories: Vec<String>,
    pub text: Option<String>,
    pub max_price: Option<f64>,
}

/// The two-bucket response: at most one best pick, then the rest ranked.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRecommendations {
    pub exact_matches: Vec<ProductView>,
    pub similar_products: Vec<ProductView>,
}
