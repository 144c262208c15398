use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use std::env;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Build the r2d2 connection pool. Pool size can be tuned with the
/// `DATABASE_POOL_MAX` environment variable (r2d2's default of 10 otherwise).
pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let mut builder = Pool::builder();
    if let Some(max_size) = pool_max_from_env() {
        builder = builder.max_size(max_size);
    }
    builder
        .build(manager)
        .expect("Failed to create database connection pool")
}

fn pool_max_from_env() -> Option<u32> {
    let raw = env::var("DATABASE_POOL_MAX").ok()?;
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("Ignoring invalid DATABASE_POOL_MAX='{}'", raw);
            None
        }
    }
}
