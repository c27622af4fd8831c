//! Database handle: a connection pool plus the tracing span statements log under.

use crate::config::DbConfig;
use crate::error::{OrmError, OrmResult};
use crate::pool::create_pool_with_config;
use crate::value::{Value, param_refs};
use deadpool_postgres::{Object, Pool};
use std::fmt;
use std::time::Duration;
use tokio_postgres::Row;
use tracing::Span;

/// A shareable handle to a PostgreSQL database.
///
/// Cloning is cheap; clones share the pool.
///
/// ```ignore
/// let db = pgquery::Db::connect(&pgquery::DbConfig::from_env()?)?;
/// db.ping().await?;
/// ```
#[derive(Clone)]
pub struct Db {
    pool: Pool,
    span: Span,
    config: Option<DbConfig>,
    query_timeout: Option<Duration>,
}

impl Db {
    /// Build a handle from configuration. Connections are opened on first use.
    pub fn connect(config: &DbConfig) -> OrmResult<Self> {
        let pool = create_pool_with_config(config)?;
        let mut db = Self::from_pool(pool);
        db.query_timeout = config.query_timeout;
        db.config = Some(config.clone());
        Ok(db)
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: Pool) -> Self {
        let span = tracing::info_span!("db", max_size = pool.status().max_size);
        Self {
            pool,
            span,
            config: None,
            query_timeout: None,
        }
    }

    /// The span statements and queries are logged under.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The configuration this handle was connected with, if any.
    pub fn config(&self) -> Option<&DbConfig> {
        self.config.as_ref()
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }

    /// Check out a pooled connection.
    pub async fn client(&self) -> OrmResult<Object> {
        Ok(self.pool.get().await?)
    }

    /// Verify the database is reachable, opening a connection if necessary.
    pub async fn ping(&self) -> OrmResult<()> {
        self.query("SELECT 1", &[]).await.map(|_| ())
    }

    /// Close the pool. Checked-out connections are dropped when returned.
    pub fn close(&self) {
        tracing::info!(parent: &self.span, "closing database pool");
        self.pool.close();
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Execute a statement and return the number of affected rows.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        tracing::debug!(
            target: "pgquery.sql",
            parent: &self.span,
            sql,
            param_count = params.len(),
            "execute"
        );
        let client = self.client().await?;
        let refs = param_refs(params);
        self.timed(async {
            client
                .execute(sql, &refs)
                .await
                .map_err(OrmError::from_db_error)
        })
        .await
    }

    /// Run a query and return all rows.
    pub async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        tracing::debug!(
            target: "pgquery.sql",
            parent: &self.span,
            sql,
            param_count = params.len(),
            "query"
        );
        let client = self.client().await?;
        let refs = param_refs(params);
        self.timed(async {
            client
                .query(sql, &refs)
                .await
                .map_err(OrmError::from_db_error)
        })
        .await
    }

    async fn timed<T>(&self, fut: impl Future<Output = OrmResult<T>>) -> OrmResult<T> {
        match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| OrmError::Timeout(limit))?,
            None => fut.await,
        }
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("pool", &self.pool.status())
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_does_not_touch_the_network() {
        let config = DbConfig::new("postgres://user@127.0.0.1:1/nowhere")
            .max_size(2)
            .query_timeout(Duration::from_millis(10));
        let db = Db::connect(&config).unwrap();
        assert_eq!(db.pool().status().max_size, 2);
        assert_eq!(db.query_timeout(), Some(Duration::from_millis(10)));
        assert_eq!(db.config().map(|c| c.max_size), Some(2));
        assert!(!db.is_closed());
        db.close();
        assert!(db.is_closed());
    }

    #[test]
    fn invalid_url_fails_before_pooling() {
        let err = Db::connect(&DbConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, OrmError::Connection(_)));
    }
}
