//! Shared setup for the integration tests: SQLite databases seeded in a
//! temporary directory, opened through a driver that records every
//! statement it runs.

mod fixture;
pub use fixture::{Fixture, SHOP};

mod logging_driver;
pub use logging_driver::LoggingDriver;

pub use relgraph::{Db, Graph, MutationKind, Selection};
pub use serde_json::{json, Value as Json};
