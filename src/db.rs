//! Database module
//!
//! Connectivity and schema checks. The schema itself lives in the raw SQL
//! files under `migrations/`.

use sqlx::PgPool;

/// Tables the order service reads and writes
pub const REQUIRED_TABLES: &[&str] = &["products", "orders", "order_lines"];

/// The schema, applied as one multi-statement script
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_create_orders.sql");

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Apply the schema script. Every statement is idempotent.
pub async fn apply_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    use sqlx::Executor;

    pool.execute(SCHEMA_SQL).await?;
    tracing::info!("Database schema applied");
    Ok(())
}
