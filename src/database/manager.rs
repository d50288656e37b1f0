use std::time::Duration;

use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Referenced record missing: {0}")]
    MissingReference(String),

    /// A statement failed; carries what was being done and to which record
    #[error("{op} on {entity} failed: {source}")]
    Storage {
        op: &'static str,
        entity: &'static str,
        id: Option<Uuid>,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

/// Tag a failed statement with its operation, table and record id.
///
/// Constraint violations keep their own variants since they map to client errors.
pub trait QueryContext<T> {
    fn context(self, op: &'static str, entity: &'static str, id: Option<Uuid>) -> Result<T, DatabaseError>;
}

impl<T, E> QueryContext<T> for Result<T, E>
where
    E: Into<DatabaseError>,
{
    fn context(self, op: &'static str, entity: &'static str, id: Option<Uuid>) -> Result<T, DatabaseError> {
        self.map_err(|err| match err.into() {
            DatabaseError::Sqlx(source) => DatabaseError::Storage { op, entity, id, source },
            other => other,
        })
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            match db.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return DatabaseError::Conflict(constraint),
                Some(FOREIGN_KEY_VIOLATION) => return DatabaseError::MissingReference(constraint),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds and checks the shared connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create the pool without opening a connection; the first query connects
    pub fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let mut options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !config.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy_with(options);

        info!(
            "Database pool configured (max_connections={}, acquire_timeout={}s)",
            config.max_connections, config.connection_timeout
        );
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await.context("ping", "database", None)?;
        Ok(())
    }

    /// Assemble a connection URL from discrete settings, percent-encoding credentials
    pub fn build_connection_string(
        host: &str,
        port: u16,
        database_name: &str,
        user: &str,
        password: Option<&str>,
    ) -> Result<String, DatabaseError> {
        let mut url = url::Url::parse(&format!("postgres://{}", host))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_port(Some(port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_username(user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_password(password).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }
}
