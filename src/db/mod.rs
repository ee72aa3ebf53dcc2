//! Connection pool setup and schema migrations for the learning store.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Open the PostgreSQL pool shared by every request handler.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply the embedded migrations under `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
