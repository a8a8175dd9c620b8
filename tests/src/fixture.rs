use crate::LoggingDriver;

use relgraph::{Db, Graph};
use relgraph_core::{driver::Operation, stmt::Value};
use relgraph_driver_sqlite::Sqlite;
use relgraph_sql::Serializer;
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tempfile::TempDir;

/// Customers, their orders and order lines.
///
/// Ann has five orders, Bob one, Cid and Dee none. Order 7 has no customer.
pub const SHOP: &str = r#"
CREATE TABLE customer (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT
);

CREATE TABLE "order" (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER REFERENCES customer (id),
    total REAL,
    placed_at DATETIME
);

CREATE TABLE line (
    order_id INTEGER NOT NULL REFERENCES "order" (id),
    no INTEGER NOT NULL,
    qty INTEGER,
    PRIMARY KEY (order_id, no)
);

CREATE TABLE tag (
    label TEXT,
    avatar BLOB
);

INSERT INTO customer (id, name, email) VALUES
    (1, 'ann', 'ann@example.com'),
    (2, 'bob', NULL),
    (3, 'cid', 'cid@example.com'),
    (4, 'dee', NULL);

INSERT INTO "order" (id, customer_id, total) VALUES
    (1, 1, 10.0),
    (2, 1, 20.0),
    (3, 1, 30.0),
    (4, 1, 40.0),
    (5, 1, 50.0),
    (6, 2, 5.0),
    (7, NULL, 99.0);

INSERT INTO line (order_id, no, qty) VALUES
    (1, 1, 2),
    (1, 2, 1),
    (6, 1, 4);

INSERT INTO tag (label) VALUES ('new'), ('sale');
"#;

/// A seeded SQLite file in a temporary directory.
pub struct Fixture {
    path: PathBuf,
    ops_log: Arc<Mutex<Vec<Operation>>>,
    _dir: TempDir,
}

impl Fixture {
    pub fn new(sql: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let connection = rusqlite::Connection::open(&path).unwrap();
        connection.execute_batch(sql).unwrap();

        Fixture {
            path,
            ops_log: Arc::default(),
            _dir: dir,
        }
    }

    pub fn shop() -> Fixture {
        Fixture::new(SHOP)
    }

    pub async fn db(&mut self) -> Db {
        self.db_with(&mut Db::builder()).await
    }

    pub async fn db_with(&mut self, builder: &mut relgraph::db::Builder) -> Db {
        let driver = LoggingDriver::new(Box::new(Sqlite::open(&self.path)));
        self.ops_log = driver.ops_log_handle();
        builder.build(driver).await.unwrap()
    }

    pub async fn graph(&mut self) -> Graph {
        Graph::build(self.db().await).unwrap()
    }

    /// SQL of every statement run so far, in order.
    pub fn statements(&self) -> Vec<String> {
        let serializer = Serializer::sqlite();

        self.ops_log
            .lock()
            .unwrap()
            .iter()
            .map(|op| match op {
                Operation::QuerySql(op) => serializer.serialize(&op.stmt, &mut Vec::<Value>::new()),
            })
            .collect()
    }

    pub fn clear(&self) {
        self.ops_log.lock().unwrap().clear();
    }

    /// Reads a single value directly from the database file.
    pub fn scalar<T: rusqlite::types::FromSql>(&self, sql: &str) -> Option<T> {
        let connection = rusqlite::Connection::open(&self.path).unwrap();
        connection
            .query_row(sql, [], |row| row.get(0))
            .map(Some)
            .or_else(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                err => Err(err),
            })
            .unwrap()
    }
}
