pub mod db;
pub use db::Db;

mod engine;
pub use engine::{MutationKind, Selection};

pub mod graphql;
pub use graphql::Graph;

pub use relgraph_core::{schema, stmt, Error, Result};
