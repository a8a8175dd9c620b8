mod builder;
mod connect;
mod pool;

pub use builder::Builder;
pub use connect::Connect;
pub use pool::{Pool, PoolConfig, PoolConnection, Timeouts};

use crate::{
    engine::{Mutation, MutationKind, Query, Selection},
    Error, Result,
};

use relgraph_core::{
    driver::{Operation, QuerySql, Response},
    schema::Table,
    stmt::{Statement, Type},
    Driver, Schema,
};
use serde_json::Value as Json;
use std::sync::Arc;

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pub(crate) schema: Arc<Schema>,
    pub(crate) pool: Pool,
    pub(crate) page_size: usize,
}

/// A database handle: the introspected schema and a connection pool.
///
/// Cloning is cheap and every clone shares the same pool.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Connects with the default configuration.
    pub async fn connect(url: &str) -> Result<Db> {
        Db::builder().connect(url).await
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.shared.schema
    }

    pub fn driver(&self) -> &dyn Driver {
        self.shared.pool.driver()
    }

    /// Closes the connection pool shared by every clone of this handle.
    ///
    /// Later queries and mutations fail with a connection pool error.
    pub fn close(&self) {
        self.shared.pool.close();
    }

    /// Default `limit` of top-level queries.
    pub fn page_size(&self) -> usize {
        self.shared.page_size
    }

    /// Runs one statement on a pooled connection.
    ///
    /// `ret` lists the types of the returned columns, `None` when only a row
    /// count is expected.
    pub async fn exec(&self, stmt: Statement, ret: Option<Vec<Type>>) -> Result<Response> {
        let mut connection = self.shared.pool.get().await?;
        connection
            .exec(Operation::QuerySql(QuerySql { stmt, ret }))
            .await
    }

    /// Runs a query on `table`, one JSON object per row.
    ///
    /// The selection's arguments are `filter`, `order`, `skip` and `limit`;
    /// its fields name columns and relations.
    pub async fn query(&self, table: &str, selection: &Selection) -> Result<Vec<Json>> {
        let schema = self.schema();
        let table = lookup(schema, table)?;

        let query = Query::plan(schema, table, selection, None, Some(self.page_size()))?;
        query.execute(self).await
    }

    /// Writes a single row and returns the selected fields of it.
    ///
    /// Returns `null` when an update or delete matched no row.
    pub async fn mutate(
        &self,
        kind: MutationKind,
        table: &str,
        selection: &Selection,
    ) -> Result<Json> {
        let schema = self.schema();
        let table = lookup(schema, table)?;

        let mutation = Mutation::plan(schema, table, kind, selection)?;
        mutation.execute(self).await
    }
}

fn lookup<'a>(schema: &'a Schema, name: &str) -> Result<&'a Table> {
    schema
        .table(name)
        .ok_or_else(|| Error::invalid_request(format!("unknown table `{name}`")))
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("url", &self.driver().url())
            .field("tables", &self.shared.schema.tables.len())
            .field("page_size", &self.shared.page_size)
            .finish()
    }
}
