//! Shared setup for tests that need a live Postgres.

use platform::repository::PgDatabase;
use sqlx::postgres::PgPoolOptions;

/// Connect to `DATABASE_URL` and bring the schema up to date.
pub async fn create_test_pool() -> PgDatabase {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    PgDatabase::new(pool)
}

/// Names that do not collide with rows left by earlier runs.
pub fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}")
}
