use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

/// Builds the connection pool for the primary backend. Cloud-friendly
/// settings: bounded connect time, small pool, and a 30 s statement timeout
/// applied to every connection so no query can hang the request path.
pub async fn create_pg_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET statement_timeout = '30s'").await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    // Verify the connection actually works before the server starts.
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}
