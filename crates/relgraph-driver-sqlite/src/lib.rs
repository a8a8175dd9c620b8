mod introspect;

mod value;
pub(crate) use value::Value;

use relgraph_core::{
    async_trait,
    driver::{Operation, Response},
    schema::{Introspection, Vendor},
    stmt::{self, ValueRecord},
    Driver, Result,
};
use relgraph_sql as sql;
use rusqlite::Connection as RusqliteConnection;
use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)?;

        if url.scheme() != "sqlite" {
            return Err(relgraph_core::Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn url(&self) -> Cow<'_, str> {
        match self {
            Sqlite::InMemory => Cow::Borrowed("sqlite::memory:"),
            Sqlite::File(path) => Cow::Owned(format!("sqlite:{}", path.display())),
        }
    }

    fn vendor(&self) -> Vendor {
        Vendor::Sqlite
    }

    async fn connect(&self) -> Result<Box<dyn relgraph_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }

    fn max_connections(&self) -> Option<usize> {
        // Every in-memory connection is its own database
        matches!(self, Self::InMemory).then_some(1)
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory()
            .map_err(relgraph_core::Error::driver_operation_failed)?;

        Ok(Self { connection })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            RusqliteConnection::open(path).map_err(relgraph_core::Error::driver_operation_failed)?;
        Ok(Self { connection })
    }

    /// Wraps a connection opened by the caller.
    pub fn from_rusqlite(connection: RusqliteConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl relgraph_core::driver::Connection for Connection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        let Operation::QuerySql(op) = op;

        let mut params: Vec<stmt::Value> = vec![];
        let sql_str = sql::Serializer::sqlite().serialize(&op.stmt, &mut params);

        tracing::debug!(sql = %sql_str, params = params.len(), "executing");

        let mut stmt = self
            .connection
            .prepare_cached(&sql_str)
            .map_err(relgraph_core::Error::driver_operation_failed)?;

        let width = op.stmt.returning_len();

        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();

        let Some(width) = width else {
            let count = stmt
                .execute(rusqlite::params_from_iter(params.iter()))
                .map_err(relgraph_core::Error::driver_operation_failed)?;

            return Ok(Response::count(count as _));
        };

        let ret_tys = op.ret.unwrap_or_default();
        if ret_tys.len() != width {
            relgraph_core::bail!(
                "statement returns {width} columns but {} types were given",
                ret_tys.len()
            );
        }

        let mut rows = stmt
            .query(rusqlite::params_from_iter(params.iter()))
            .map_err(relgraph_core::Error::driver_operation_failed)?;

        let mut ret = vec![];

        loop {
            match rows.next() {
                Ok(Some(row)) => {
                    let mut items = Vec::with_capacity(width);

                    for (index, ty) in ret_tys.iter().enumerate() {
                        items.push(Value::from_sql(row, index, *ty)?.into_inner());
                    }

                    ret.push(ValueRecord::from_vec(items));
                }
                Ok(None) => break,
                Err(err) => {
                    return Err(relgraph_core::Error::driver_operation_failed(err));
                }
            }
        }

        Ok(Response::values(ret))
    }

    async fn introspect(&mut self) -> Result<Introspection> {
        introspect::introspect(&self.connection)
    }
}
