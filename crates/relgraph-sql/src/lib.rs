pub mod serializer;
pub use serializer::{Params, Placeholder, Serializer};

pub use relgraph_core::stmt::Statement;
