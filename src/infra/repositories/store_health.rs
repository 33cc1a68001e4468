use crate::domain::ports::HealthCheck;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, SqlitePool};

pub struct SqliteHealth {
    pool: SqlitePool,
}

impl SqliteHealth {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for SqliteHealth {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PostgresHealth {
    pool: PgPool,
}

impl PostgresHealth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for PostgresHealth {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_ping_tracks_pool_state() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let health = SqliteHealth::new(pool.clone());
        assert!(health.ping().await.is_ok());

        pool.close().await;
        assert!(health.ping().await.is_err());
    }
}
