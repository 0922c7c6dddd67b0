//! Database connection management
//!
//! Engine selection and per-database connection pools for the catalog readers.

use crate::config::DatabaseConfig;
use crate::error::{CatalogError, ExtractError};
use deadpool_postgres::{Config, ManagerConfig, Object, Pool, PoolConfig, RecyclingMethod, Runtime};
use std::fmt;
use tokio_postgres::NoTls;
use tracing::debug;

/// Database engine of the source server
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Engine {
    #[value(name = "postgres", alias = "1")]
    Postgres,
    #[value(name = "sqlserver", alias = "2")]
    SqlServer,
}

impl Engine {
    /// Reject engines without a catalog reader before anything connects
    pub fn ensure_supported(self) -> Result<Self, ExtractError> {
        match self {
            Engine::Postgres => Ok(self),
            Engine::SqlServer => Err(ExtractError::UnsupportedEngine(self)),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Postgres => write!(f, "postgres"),
            Engine::SqlServer => write!(f, "sqlserver"),
        }
    }
}

/// A live connection to one database together with the pool that owns it.
///
/// Dropping it closes the connection.
pub struct PooledConnection {
    client: Object,
    _pool: Pool,
}

impl PooledConnection {
    pub fn client(&self) -> &Object {
        &self.client
    }
}

/// Open a single-connection pool against `database` using the server settings
pub async fn connect(config: &DatabaseConfig, database: &str) -> Result<PooledConnection, CatalogError> {
    let pool = create_pool(config, database)?;

    let client = pool.get().await.map_err(|source| CatalogError::Connect {
        target: target(config, database),
        source,
    })?;

    debug!(database = %database, tls = config.use_tls, "Connected");

    Ok(PooledConnection {
        client,
        _pool: pool,
    })
}

fn target(config: &DatabaseConfig, database: &str) -> String {
    format!("{}@{}:{}/{}", config.user, config.host, config.port, database)
}

/// Create a connection pool with given configuration
fn create_pool(config: &DatabaseConfig, database: &str) -> Result<Pool, CatalogError> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(database.to_string());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(1));

    if config.use_tls {
        let certs = rustls_native_certs::load_native_certs();
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

        cfg.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| CatalogError::Unavailable {
                target: target(config, database),
                reason: format!("Failed to create TLS pool: {}", e),
            })
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| CatalogError::Unavailable {
                target: target(config, database),
                reason: format!("Failed to create pool: {}", e),
            })
    }
}
