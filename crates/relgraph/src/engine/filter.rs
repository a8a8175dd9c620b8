use super::{
    naming::{self, FieldRef},
    query::{Aliases, ColumnRef, Hop, Relations},
};

use relgraph_core::{
    schema::{Schema, Table},
    stmt::{BinaryOp, Expr, JoinKind, Path, Value},
    Error, Result,
};
use serde_json::Value as Json;

/// Predicates parsed from a `filter` argument.
#[derive(Debug, Default)]
pub(crate) struct Filters {
    pub(crate) predicates: Vec<Predicate>,

    /// Set when a predicate is reached through a to-many relation
    pub(crate) plural: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    /// Column equals one of the values; no values matches `NULL`
    AnyOf { column: ColumnRef, values: Vec<Value> },

    Compare {
        column: ColumnRef,
        op: BinaryOp,
        value: Value,
    },

    /// Key columns equal one of the tuples
    Keys {
        path: Path,
        columns: Vec<String>,
        tuples: Vec<Vec<Value>>,
    },
}

const OPERATORS: &[(&str, BinaryOp)] = &[
    ("eq", BinaryOp::Eq),
    ("ne", BinaryOp::Ne),
    ("gt", BinaryOp::Gt),
    ("ge", BinaryOp::Ge),
    ("lt", BinaryOp::Lt),
    ("le", BinaryOp::Le),
    ("like", BinaryOp::Like),
];

impl Filters {
    /// Parses `filter` against `tree`'s root table, joining the relations it
    /// navigates into `tree`.
    pub(crate) fn parse<'a>(
        schema: &'a Schema,
        tree: &mut Relations<'a>,
        filter: Option<&Json>,
    ) -> Result<Filters> {
        let mut filters = Filters::default();

        if let Some(filter) = filter.filter(|filter| !filter.is_null()) {
            let table = *tree.root();
            filters.parse_object(schema, tree, table, &vec![], filter, false)?;
        }

        Ok(filters)
    }

    pub(crate) fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    fn parse_object<'a>(
        &mut self,
        schema: &'a Schema,
        tree: &mut Relations<'a>,
        table: &'a Table,
        path: &Path,
        filter: &Json,
        plural: bool,
    ) -> Result<()> {
        let Json::Object(filter) = filter else {
            return Err(Error::invalid_request(format!(
                "filter on `{}` must be an object",
                table.name
            )));
        };

        for (key, value) in filter {
            if let Some(FieldRef::Column(column, mapping)) = naming::resolve(schema, table, key) {
                let values = match value {
                    Json::Null => vec![],
                    Json::Array(items) => items
                        .iter()
                        .map(|item| mapping.bind(item))
                        .collect::<Result<Vec<_>>>()?,
                    item => vec![mapping.bind(item)?],
                };

                self.plural |= plural;
                self.predicates.push(Predicate::AnyOf {
                    column: ColumnRef::new(path, &column.name),
                    values,
                });
                continue;
            }

            if let Some(name) = naming::compare_column(key) {
                if let Some(FieldRef::Column(column, mapping)) =
                    naming::resolve(schema, table, name)
                {
                    self.parse_compare(path, &column.name, |json| mapping.bind(json), value, plural)?;
                    continue;
                }
            }

            let hop = match naming::resolve(schema, table, key) {
                Some(FieldRef::Forward(fk)) => Hop::forward(fk, JoinKind::Inner),
                Some(FieldRef::Reverse(fk)) => Hop::reverse(fk, JoinKind::Inner),
                _ => {
                    tracing::debug!(table = %table.name, key, "ignoring unknown filter field");
                    continue;
                }
            };

            if value.is_null() {
                continue;
            }

            let target = hop.target(schema)?;
            let plural = plural || !hop.forward;

            tree.insert(path, key.clone(), hop, target)?;

            let mut nested = path.clone();
            nested.push(key.clone());
            self.parse_object(schema, tree, target, &nested, value, plural)?;
        }

        Ok(())
    }

    fn parse_compare(
        &mut self,
        path: &Path,
        column: &str,
        bind: impl Fn(&Json) -> Result<Value>,
        compare: &Json,
        plural: bool,
    ) -> Result<()> {
        let Json::Object(compare) = compare else {
            if compare.is_null() {
                return Ok(());
            }
            return Err(Error::invalid_request(format!(
                "comparison on `{column}` must be an object"
            )));
        };

        for (key, value) in compare {
            let Some((_, op)) = OPERATORS.iter().find(|(name, _)| name == key) else {
                tracing::debug!(column, key, "ignoring unknown comparison operator");
                continue;
            };

            if value.is_null() {
                continue;
            }

            let value = match op {
                BinaryOp::Like => match value {
                    Json::String(pattern) => Value::String(pattern.clone()),
                    _ => return Err(Error::type_conversion(value, "String")),
                },
                _ => bind(value)?,
            };

            self.plural |= plural;
            self.predicates.push(Predicate::Compare {
                column: ColumnRef::new(path, column),
                op: *op,
                value,
            });
        }

        Ok(())
    }
}

impl Predicate {
    /// Builds the predicate expression, qualifying columns with the alias of
    /// the table at their path.
    pub(crate) fn to_expr(&self, aliases: &Aliases) -> Result<Expr> {
        Ok(match self {
            Predicate::AnyOf { column, values } => {
                Expr::any_of(Expr::column(aliases.get(&column.path)?, &column.name), values.clone())
            }
            Predicate::Compare { column, op, value } => Expr::binary_op(
                Expr::column(aliases.get(&column.path)?, &column.name),
                *op,
                value.clone(),
            ),
            Predicate::Keys {
                path,
                columns,
                tuples,
            } => {
                let alias = aliases.get(path)?;

                if let [column] = &columns[..] {
                    let mut values = tuples
                        .iter()
                        .filter_map(|tuple| tuple.first().cloned())
                        .map(Expr::Value)
                        .collect::<Vec<_>>();

                    if values.len() == 1 {
                        let value = values.pop().unwrap_or(Expr::Value(Value::Null));
                        Expr::eq(Expr::column(alias, column), value)
                    } else {
                        Expr::in_list(Expr::column(alias, column), values)
                    }
                } else {
                    Expr::or(tuples.iter().map(|tuple| {
                        Expr::and(
                            columns
                                .iter()
                                .zip(tuple)
                                .map(|(column, value)| Expr::eq(Expr::column(alias, column), value.clone())),
                        )
                    }))
                }
            }
        })
    }
}
