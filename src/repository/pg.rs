//! Postgres execution backend
//!
//! [`PgStore`] executes [`SelectQuery`] statements on a sqlx `PgPool`.
//! Entities only need `FromRow`; the repository layer owns all SQL
//! construction. Available behind the `database` feature.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::FromRow;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

use super::query::{BindValue, SelectQuery};
use super::store::{QueryStore, RepositoryError, RepositoryErrorKind, RepositoryOperation};

/// A query store backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for write-side implementations.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Connect with retry and backoff per the database configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs));

        let mut attempt = 0;
        loop {
            attempt += 1;
            match options.clone().connect(&config.url).await {
                Ok(pool) => {
                    tracing::info!(
                        url = %sanitize_url(&config.url),
                        attempt,
                        "database pool established"
                    );
                    return Ok(Self { pool });
                }
                Err(err) if attempt <= config.max_retries => {
                    tracing::warn!(
                        url = %sanitize_url(&config.url),
                        attempt,
                        error = %err,
                        "database connection failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(config.retry_delay_secs)).await;
                }
                Err(err) => {
                    return Err(Error::Database(format!(
                        "could not connect after {attempt} attempts: {err}"
                    )));
                }
            }
        }
    }
}

impl<E> QueryStore<E> for PgStore
where
    E: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    async fn fetch(&self, query: &SelectQuery) -> std::result::Result<Vec<E>, RepositoryError> {
        let sql = query.to_sql();
        let mut stmt = sqlx::query_as::<_, E>(&sql);
        for value in query.binds() {
            stmt = match value {
                BindValue::Str(v) => stmt.bind(v.clone()),
                BindValue::Int(v) => stmt.bind(*v),
                BindValue::Bool(v) => stmt.bind(*v),
                BindValue::Uuid(v) => stmt.bind(*v),
                BindValue::Null => stmt.bind(None::<String>),
            };
        }
        stmt.fetch_all(&self.pool)
            .await
            .map_err(|err| translate(RepositoryOperation::Search, &err))
    }

    async fn fetch_count(
        &self,
        query: &SelectQuery,
        count_column: &str,
    ) -> std::result::Result<u64, RepositoryError> {
        let sql = query.to_count_sql(count_column);
        let mut stmt = sqlx::query_scalar::<_, i64>(&sql);
        for value in query.binds() {
            stmt = match value {
                BindValue::Str(v) => stmt.bind(v.clone()),
                BindValue::Int(v) => stmt.bind(*v),
                BindValue::Bool(v) => stmt.bind(*v),
                BindValue::Uuid(v) => stmt.bind(*v),
                BindValue::Null => stmt.bind(None::<String>),
            };
        }
        let count = stmt
            .fetch_one(&self.pool)
            .await
            .map_err(|err| translate(RepositoryOperation::Count, &err))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn translate(operation: RepositoryOperation, err: &sqlx::Error) -> RepositoryError {
    let kind = match err {
        sqlx::Error::RowNotFound => RepositoryErrorKind::NotFound,
        sqlx::Error::Database(db) if db.constraint().is_some() => {
            RepositoryErrorKind::ConstraintViolation
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => RepositoryErrorKind::ConnectionFailed,
        _ => RepositoryErrorKind::DatabaseError,
    };
    RepositoryError::new(operation, kind, err.to_string())
}

/// Strip credentials from a connection URL before logging it.
fn sanitize_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
