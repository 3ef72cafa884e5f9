use crate::config::DatabaseConfig;
use crate::error::Error;
use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

pub mod migrations;
pub mod models;
pub mod repositories;

/// Database service for handling connections, migrations and seeding
pub struct DatabaseService {
    pub pool: Arc<PgPool>,
    config: DatabaseConfig,
    initialized: AtomicBool,
}

impl DatabaseService {
    /// Create a new database service
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Initializing Database service");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        info!("Connected to PostgreSQL database");

        Ok(Self {
            pool: Arc::new(pool),
            config: config.clone(),
            initialized: AtomicBool::new(false),
        })
    }

    /// One-time startup routine: migrations plus optional demo seed.
    ///
    /// Guarded so a second call on the same service is a no-op; the schema
    /// statements and the seed's count check make the work itself idempotent
    /// across restarts as well.
    pub async fn initialize(&self) -> Result<()> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        if self.config.auto_migrate {
            info!("Running database migrations");
            migrations::run_migrations(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migrations: {}", e)))?;
            info!("Database migrations completed successfully");
        }

        if self.config.seed_demo_data {
            migrations::seed_if_empty(&self.pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to seed database: {}", e)))?;
        }

        Ok(())
    }

    /// Health check for database
    pub async fn health_check(&self) -> Result<bool> {
        match sqlx::query("SELECT 1").execute(&*self.pool).await {
            Ok(_) => Ok(true),
            Err(e) => {
                error!("Database health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
