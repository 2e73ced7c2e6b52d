use crate::config::HubConfig;
use crate::entities::{File, HubItem, HubSeller};
use crate::errors::ServiceError;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
};
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl From<&HubConfig> for DbConfig {
    fn from(cfg: &HubConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            ..Default::default()
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt).await?;

    info!("Database connection pool established successfully");
    Ok(db_pool)
}

/// Establishes a connection pool to the database
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };

    establish_connection_with_config(&config).await
}

/// Creates the hub tables (and their indexes) when they do not exist yet
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Creating hub tables");
    let start = std::time::Instant::now();

    let result = async {
        create_table(pool, HubSeller).await?;
        create_table(pool, HubItem).await?;
        create_table(pool, File).await
    }
    .await;

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!("Hub tables ready in {:?}", elapsed),
        Err(e) => error!("Creating hub tables failed after {:?}: {}", elapsed, e),
    }

    result
}

async fn create_table<E>(pool: &DbPool, entity: E) -> Result<(), ServiceError>
where
    E: EntityTrait + Copy,
{
    let backend = pool.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    pool.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        pool.execute(backend.build(&index)).await?;
    }

    Ok(())
}
