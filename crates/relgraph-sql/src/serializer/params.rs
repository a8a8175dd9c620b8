use super::{Flavor, Formatter, ToSql};

use relgraph_core::stmt;

/// Collects the values bound to a statement, in the order their
/// placeholders appear in the SQL text.
pub trait Params {
    fn push(&mut self, param: &stmt::Value) -> Placeholder;
}

/// 1-based parameter position
pub struct Placeholder(pub usize);

impl Params for Vec<stmt::Value> {
    fn push(&mut self, value: &stmt::Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let prefix = match f.serializer.flavor {
            Flavor::Postgresql => "$",
            Flavor::Sqlite => "?",
        };

        f.dst.push_str(prefix);
        f.dst.push_str(&self.0.to_string());
    }
}
