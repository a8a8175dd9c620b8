use super::{Connect, Db, Pool, PoolConfig, Shared, Timeouts};
use crate::Result;

use relgraph_core::{Driver, Schema};
use std::sync::Arc;

/// Number of rows a top-level query returns when no `limit` is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct Builder {
    page_size: usize,
    pool: PoolConfig,
}

impl Builder {
    pub fn page_size(&mut self, page_size: usize) -> &mut Self {
        self.page_size = page_size;
        self
    }

    /// Upper bound on pooled connections. Drivers may lower it further.
    pub fn max_connections(&mut self, max_connections: usize) -> &mut Self {
        self.pool.max_size = max_connections;
        self
    }

    pub fn timeouts(&mut self, timeouts: Timeouts) -> &mut Self {
        self.pool.timeouts = timeouts;
        self
    }

    pub fn pool(&mut self, config: PoolConfig) -> &mut Self {
        self.pool = config;
        self
    }

    pub async fn connect(&mut self, url: &str) -> Result<Db> {
        self.build(Connect::new(url)?).await
    }

    /// Creates the pool and reads the database schema through it.
    pub async fn build(&mut self, driver: impl Driver) -> Result<Db> {
        let pool = Pool::new(driver, &self.pool)?;

        let introspection = pool.get().await?.introspect().await?;
        let schema = Schema::builder(pool.driver().vendor())
            .introspection(introspection)
            .build()?;

        tracing::debug!(
            url = %pool.driver().url(),
            tables = schema.tables.len(),
            "introspected schema"
        );

        Ok(Db {
            shared: Arc::new(Shared {
                schema: Arc::new(schema),
                pool,
                page_size: self.page_size,
            }),
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            page_size: DEFAULT_PAGE_SIZE,
            pool: PoolConfig::default(),
        }
    }
}
