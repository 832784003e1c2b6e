//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database is reachable and that the
//! embedded migrations produce the `users` table. They need a running
//! database pointed to by `DATABASE_URL`.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    run_migrations(&pool).await?;

    let row = sqlx::query(
        "SELECT COUNT(*) AS columns FROM information_schema.columns WHERE table_name = 'users'",
    )
    .fetch_one(&pool)
    .await?;

    let columns: i64 = row.get("columns");
    assert_eq!(columns, 7, "users table does not have the expected shape");

    Ok(())
}
