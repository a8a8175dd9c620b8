//! Pooled connections shared by every request of a [`Db`](super::Db).
//!
//! Each statement checks a connection out for the time it runs. Dropping the
//! [`PoolConnection`] hands it back, on error paths too.

use std::ops::{Deref, DerefMut};

pub use deadpool::managed::Timeouts;
use relgraph_core::{Connection, Driver, Error};

/// Pool size and wait limits.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Upper bound on open connections, lowered to the driver's limit
    pub max_size: usize,

    pub timeouts: Timeouts,
}

impl PoolConfig {
    /// Twice the number of logical cores, no timeouts.
    pub fn new() -> Self {
        Self {
            max_size: deadpool::managed::PoolConfig::default().max_size,
            timeouts: Timeouts::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Connections opened on demand through a [`Driver`].
#[derive(Debug)]
pub struct Pool {
    inner: deadpool::managed::Pool<Manager>,
}

impl Pool {
    /// The pool never grows past the driver's own connection limit.
    pub fn new(driver: impl Driver, config: &PoolConfig) -> crate::Result<Self> {
        let max_size = match driver.max_connections() {
            Some(max_connections) => config.max_size.min(max_connections),
            None => config.max_size,
        };

        let inner = deadpool::managed::Pool::builder(Manager {
            driver: Box::new(driver),
        })
        .runtime(deadpool::Runtime::Tokio1)
        .max_size(max_size.max(1))
        .timeouts(config.timeouts)
        .build()
        .map_err(Error::connection_pool)?;

        Ok(Self { inner })
    }

    /// Checks out an idle connection or opens a new one, waiting while the
    /// pool is exhausted.
    pub async fn get(&self) -> crate::Result<PoolConnection> {
        let connection = self.inner.get().await.map_err(Error::connection_pool)?;
        Ok(PoolConnection { inner: connection })
    }

    pub fn driver(&self) -> &dyn Driver {
        &*self.inner.manager().driver
    }

    /// Current size and number of idle connections.
    pub fn status(&self) -> deadpool::Status {
        self.inner.status()
    }

    /// Drops idle connections and fails every later checkout. Connections
    /// still checked out are closed when they return.
    pub fn close(&self) {
        tracing::debug!(url = %self.driver().url(), "closing pool");
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

#[derive(Debug)]
struct Manager {
    driver: Box<dyn Driver>,
}

impl deadpool::managed::Manager for Manager {
    type Type = Box<dyn Connection>;
    type Error = crate::Error;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        tracing::trace!(url = %self.driver.url(), "opening connection");
        self.driver.connect().await
    }

    // Statements run to completion, so a returned connection is always idle
    async fn recycle(
        &self,
        _connection: &mut Self::Type,
        _metrics: &deadpool::managed::Metrics,
    ) -> deadpool::managed::RecycleResult<Self::Error> {
        Ok(())
    }
}

/// A checked out connection, returned to the pool on drop.
pub struct PoolConnection {
    inner: deadpool::managed::Object<Manager>,
}

impl Deref for PoolConnection {
    type Target = Box<dyn Connection>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
