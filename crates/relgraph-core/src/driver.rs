mod operation;
pub use operation::{Operation, QuerySql};

mod response;
pub use response::{Response, Rows};

use crate::{async_trait, schema::Introspection, schema::Vendor};

use std::{borrow::Cow, fmt::Debug};

/// Factory for database connections.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Returns the URL this driver is configured with.
    fn url(&self) -> Cow<'_, str>;

    /// Database product the driver talks to.
    fn vendor(&self) -> Vendor;

    /// Creates a new connection to the database.
    ///
    /// This method is called by the connection pool whenever it needs a new
    /// connection.
    async fn connect(&self) -> crate::Result<Box<dyn Connection>>;

    /// Upper bound on concurrent connections, `None` to use the pool default.
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Executes a database operation.
    async fn exec(&mut self, op: Operation) -> crate::Result<Response>;

    /// Reads the catalog rows the schema model is built from.
    async fn introspect(&mut self) -> crate::Result<Introspection>;
}
