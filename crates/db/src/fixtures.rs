//! Deterministic demo dataset: a catalog row for every canonical category
//! plus one admin account, with a verification contract used by the seed
//! command.

use chrono::Utc;

use smartbuy_core::auth::PasswordHasher;
use smartbuy_core::domain::product::{Product, ProductId};
use smartbuy_core::domain::user::{User, UserId};
use smartbuy_core::recommend::VALID_CATEGORIES;

use crate::repositories::{
    ProductRepository, RepositoryError, SqlProductRepository, SqlUserRepository, UserRepository,
};
use crate::DbPool;

pub const SEED_ADMIN_EMAIL: &str = "admin@smartbuy.local";
pub const SEED_ADMIN_PASSWORD: &str = "admin123";

struct SeedProduct {
    id: &'static str,
    name: &'static str,
    company: &'static str,
    category: &'static str,
    features: &'static [&'static str],
    price: f64,
    rating: f64,
    buy_from: &'static str,
    link: &'static str,
}

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: "prod-pixel-8",
        name: "Pixel 8",
        company: "Google",
        category: "Smartphones",
        features: &["5G", "AMOLED", "Wireless Charging"],
        price: 60000.0,
        rating: 4.5,
        buy_from: "Amazon",
        link: "https://example.com/pixel-8",
    },
    SeedProduct {
        id: "prod-redmi-note",
        name: "Redmi Note 13",
        company: "Xiaomi",
        category: "Mobile",
        features: &["5G", "Fast Charging"],
        price: 15000.0,
        rating: 4.0,
        buy_from: "Flipkart",
        link: "https://example.com/redmi-note-13",
    },
    SeedProduct {
        id: "prod-airdopes",
        name: "Airdopes 141",
        company: "boAt",
        category: "EarPods",
        features: &["TWS", "Noise Cancellation"],
        price: 1500.0,
        rating: 4.1,
        buy_from: "Amazon",
        link: "https://example.com/airdopes-141",
    },
    SeedProduct {
        id: "prod-thinkpad",
        name: "ThinkPad X1 Carbon",
        company: "Lenovo",
        category: "Laptop",
        features: &["16GB RAM", "SSD", "Backlit Keyboard"],
        price: 120000.0,
        rating: 4.7,
        buy_from: "Lenovo Store",
        link: "https://example.com/thinkpad-x1",
    },
    SeedProduct {
        id: "prod-macbook-air",
        name: "MacBook Air M2",
        company: "Apple",
        category: "Laptop",
        features: &["16GB RAM", "SSD", "Retina Display"],
        price: 110000.0,
        rating: 4.8,
        buy_from: "Apple Store",
        link: "https://example.com/macbook-air-m2",
    },
    SeedProduct {
        id: "prod-bravia",
        name: "Bravia 55 4K",
        company: "Sony",
        category: "TVs",
        features: &["4K", "HDR", "Smart TV"],
        price: 65000.0,
        rating: 4.4,
        buy_from: "Croma",
        link: "https://example.com/bravia-55",
    },
    SeedProduct {
        id: "prod-galaxy-watch",
        name: "Galaxy Watch 6",
        company: "Samsung",
        category: "Watches",
        features: &["AMOLED", "GPS", "Heart Rate"],
        price: 28000.0,
        rating: 4.3,
        buy_from: "Samsung Store",
        link: "https://example.com/galaxy-watch-6",
    },
    SeedProduct {
        id: "prod-window-ac",
        name: "WindFree 1.5T",
        company: "Samsung",
        category: "ACs",
        features: &["Inverter", "5 Star"],
        price: 42000.0,
        rating: 4.2,
        buy_from: "Flipkart",
        link: "https://example.com/windfree-ac",
    },
    SeedProduct {
        id: "prod-pegasus",
        name: "Pegasus 41",
        company: "Nike",
        category: "Shoes",
        features: &["Running", "Breathable Mesh"],
        price: 9000.0,
        rating: 4.6,
        buy_from: "Nike Store",
        link: "https://example.com/pegasus-41",
    },
];

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub products_seeded: usize,
    pub admin_email: String,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

pub struct SeedDataset;

impl SeedDataset {
    /// Idempotent load: rows already present (by fixed id / email) are left
    /// in place.
    pub async fn load(pool: &DbPool, hasher: &PasswordHasher) -> Result<SeedResult, RepositoryError> {
        let products = SqlProductRepository::new(pool.clone());
        let mut seeded = 0;

        for seed in SEED_PRODUCTS {
            let id = ProductId(seed.id.to_string());
            if products.find_by_id(&id).await?.is_some() {
                continue;
            }
            products
                .insert(&Product {
                    id,
                    name: seed.name.to_string(),
                    company: seed.company.to_string(),
                    category: seed.category.to_string(),
                    features: seed.features.iter().map(|f| f.to_string()).collect(),
                    price: seed.price,
                    rating: seed.rating,
                    description: format!("{} by {}", seed.name, seed.company),
                    image: format!("{}.png", seed.id),
                    buy_from: seed.buy_from.to_string(),
                    link: seed.link.to_string(),
                    store_links: None,
                })
                .await?;
            seeded += 1;
        }

        let users = SqlUserRepository::new(pool.clone());
        if users.find_by_email(SEED_ADMIN_EMAIL).await?.is_none() {
            let salt = PasswordHasher::generate_salt();
            let password_digest = hasher.digest(SEED_ADMIN_PASSWORD, &salt);
            users
                .insert(&User {
                    id: UserId("user-admin".to_string()),
                    name: "SmartBuy Admin".to_string(),
                    email: SEED_ADMIN_EMAIL.to_string(),
                    password_digest,
                    salt,
                    phone: None,
                    address: None,
                    photo_url: None,
                    is_admin: true,
                    search_history: Vec::new(),
                    created_at: Utc::now(),
                })
                .await?;
        }

        Ok(SeedResult { products_seeded: seeded, admin_email: SEED_ADMIN_EMAIL.to_string() })
    }

    /// Every canonical category must have at least one catalog row, and the
    /// admin account must exist.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks: Vec<(&'static str, bool)> = Vec::new();

        for category in VALID_CATEGORIES {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM products WHERE category = ?")
                    .bind(category)
                    .fetch_one(pool)
                    .await?;
            checks.push((category, count > 0));
        }

        let (admin_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ? AND is_admin = 1")
                .bind(SEED_ADMIN_EMAIL)
                .fetch_one(pool)
                .await?;
        checks.push(("admin-account", admin_count > 0));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}
