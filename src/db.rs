use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::error::CustomError;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new_pool(config: &Config) -> Result<PgPool, CustomError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(config.idle_timeout)
            .connect(&config.database_url)
            .await?;
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "database pool ready"
        );
        Ok(pool)
    }

    pub async fn connect(config: &Config) -> Result<Self, CustomError> {
        Ok(Database {
            pool: Self::new_pool(config).await?,
        })
    }
}
