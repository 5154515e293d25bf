// SQLite connection pool implementation

use crate::config::DatabaseConfig;
use crate::errors::DatabaseError;
use crate::models::columns;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper
/// Provides a managed, process-wide connection pool over the climate dataset
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `config` - Database configuration with connection URL and pool settings
    ///
    /// # Errors
    /// Returns `DatabaseError::ConnectionFailed` if unable to establish connection
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        info!("Initializing database connection pool");

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?
            .read_only(config.read_only);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to create database pool");
                DatabaseError::ConnectionFailed(e.to_string())
            })?;

        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            read_only = config.read_only,
            "Database connection pool initialized successfully"
        );

        Ok(Self { pool })
    }

    /// Wrap an already configured pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Borrow one connection from the pool.
    ///
    /// The connection goes back to the pool when the returned guard is dropped.
    #[instrument(skip(self))]
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, DatabaseError> {
        self.pool.acquire().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire database connection");
            DatabaseError::ConnectionFailed(e.to_string())
        })
    }

    /// Perform a health check on the database connection
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                DatabaseError::HealthCheckFailed(e.to_string())
            })?;

        tracing::debug!("Database health check passed");
        Ok(())
    }

    /// Check that `station` and `measurement` carry every column the record
    /// types read. Runs once at startup.
    #[instrument(skip(self))]
    pub async fn verify_schema(&self) -> Result<(), DatabaseError> {
        self.verify_table(columns::STATION_TABLE, columns::STATION)
            .await?;
        self.verify_table(columns::MEASUREMENT_TABLE, columns::MEASUREMENT)
            .await?;

        info!("Dataset schema verified");
        Ok(())
    }

    async fn verify_table(&self, table: &str, expected: &[&str]) -> Result<(), DatabaseError> {
        let present: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info(?1)")
                .bind(table)
                .fetch_all(&self.pool)
                .await?;

        if present.is_empty() {
            return Err(DatabaseError::SchemaMismatch {
                table: table.to_string(),
                reason: "table does not exist".to_string(),
            });
        }

        let missing: Vec<&str> = expected
            .iter()
            .copied()
            .filter(|column| !present.iter().any(|p| p.eq_ignore_ascii_case(column)))
            .collect();

        if !missing.is_empty() {
            return Err(DatabaseError::SchemaMismatch {
                table: table.to_string(),
                reason: format!("missing columns: {}", missing.join(", ")),
            });
        }

        tracing::debug!(table, columns = present.len(), "Table schema matches");
        Ok(())
    }

    /// Get the number of idle connections in the pool
    pub fn num_idle(&self) -> usize {
        self.pool.num_idle()
    }

    /// Close the connection pool gracefully
    #[instrument(skip(self))]
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}
