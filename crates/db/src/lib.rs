//! # SmokeCheck DB
//!
//! Persistence for the booking service: the Postgres schema and
//! repositories, [`PgStore`] which implements the core store traits on top
//! of them, and [`MemoryStore`] for running without a database.

pub mod credentials;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod store;

pub mod mock;

pub use credentials::IdentityConfig;
pub use memory::MemoryStore;
pub use store::PgStore;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
