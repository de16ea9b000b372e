//! SQLite persistence for the SmartBuy catalog, accounts, sessions and
//! feedback, plus in-memory doubles for tests.

pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{SeedDataset, SeedResult, VerificationResult};
pub use migrations::run_pending;
