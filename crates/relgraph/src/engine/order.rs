use super::{
    naming::{self, FieldRef},
    query::{ColumnRef, Hop, Relations},
};

use relgraph_core::{
    schema::{Schema, Table},
    stmt::{Direction, JoinKind, Path},
    Error, Result,
};
use serde_json::Value as Json;

/// Sort keys parsed from an `order` argument, most significant first.
#[derive(Debug, Default)]
pub(crate) struct Orders {
    pub(crate) entries: Vec<(ColumnRef, Direction)>,
}

impl Orders {
    /// Parses `order`, a list of `T_order` objects or a single one. Forward
    /// relations are left joined into `tree`.
    pub(crate) fn parse<'a>(
        schema: &'a Schema,
        tree: &mut Relations<'a>,
        order: Option<&Json>,
    ) -> Result<Orders> {
        let mut orders = Orders::default();
        let table = *tree.root();

        match order {
            None | Some(Json::Null) => {}
            Some(Json::Array(items)) => {
                for item in items {
                    orders.parse_object(schema, tree, table, &vec![], item)?;
                }
            }
            Some(item) => orders.parse_object(schema, tree, table, &vec![], item)?,
        }

        Ok(orders)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, column: ColumnRef, direction: Direction) {
        self.entries.push((column, direction));
    }

    fn parse_object<'a>(
        &mut self,
        schema: &'a Schema,
        tree: &mut Relations<'a>,
        table: &'a Table,
        path: &Path,
        order: &Json,
    ) -> Result<()> {
        let Json::Object(order) = order else {
            if order.is_null() {
                return Ok(());
            }
            return Err(Error::invalid_request(format!(
                "order on `{}` must be an object",
                table.name
            )));
        };

        for (key, value) in order {
            if value.is_null() {
                continue;
            }

            match naming::resolve(schema, table, key) {
                Some(FieldRef::Column(column, _)) => {
                    let direction = value
                        .as_str()
                        .and_then(Direction::parse)
                        .ok_or_else(|| {
                            Error::invalid_request(format!(
                                "invalid order direction {value} for `{}`",
                                column.name
                            ))
                        })?;

                    self.push(ColumnRef::new(path, &column.name), direction);
                }
                Some(FieldRef::Forward(fk)) => {
                    let hop = Hop::forward(fk, JoinKind::Left);
                    let target = hop.target(schema)?;
                    tree.insert(path, key.clone(), hop, target)?;

                    let mut nested = path.clone();
                    nested.push(key.clone());
                    self.parse_object(schema, tree, target, &nested, value)?;
                }
                _ => {
                    tracing::debug!(table = %table.name, key, "ignoring order field");
                }
            }
        }

        Ok(())
    }
}
