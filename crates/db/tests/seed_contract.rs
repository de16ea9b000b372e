use secrecy::SecretString;

use smartbuy_core::auth::PasswordHasher;
use smartbuy_core::recommend::VALID_CATEGORIES;
use smartbuy_db::fixtures::{SeedDataset, SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD};
use smartbuy_db::repositories::{SqlUserRepository, UserRepository};
use smartbuy_db::{connect_with_settings, run_pending, DbPool};

async fn seeded_pool() -> (DbPool, PasswordHasher) {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    run_pending(&pool).await.expect("migrate");
    let hasher = PasswordHasher::new(&SecretString::from("seed-contract-secret"));
    (pool, hasher)
}

#[tokio::test]
async fn seed_covers_every_canonical_category() {
    let (pool, hasher) = seeded_pool().await;

    let result = SeedDataset::load(&pool, &hasher).await.expect("load");
    assert!(result.products_seeded >= VALID_CATEGORIES.len());

    let verification = SeedDataset::verify(&pool).await.expect("verify");
    assert!(
        verification.all_present,
        "missing fixtures: {:?}",
        verification
            .checks
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn seed_is_idempotent() {
    let (pool, hasher) = seeded_pool().await;

    let first = SeedDataset::load(&pool, &hasher).await.expect("first load");
    let second = SeedDataset::load(&pool, &hasher).await.expect("second load");

    assert!(first.products_seeded > 0);
    assert_eq!(second.products_seeded, 0);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .expect("count users");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn seeded_admin_credentials_verify() {
    let (pool, hasher) = seeded_pool().await;
    SeedDataset::load(&pool, &hasher).await.expect("load");

    let users = SqlUserRepository::new(pool.clone());
    let admin = users
        .find_by_email(SEED_ADMIN_EMAIL)
        .await
        .expect("lookup")
        .expect("admin present");

    assert!(admin.is_admin);
    assert!(hasher.verify(SEED_ADMIN_PASSWORD, &admin.salt, &admin.password_digest));
    assert!(!hasher.verify("wrong-password", &admin.salt, &admin.password_digest));
}
