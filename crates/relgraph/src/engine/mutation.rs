use super::{
    naming::{self, FieldRef},
    KeyFilter, Query, Selection,
};
use crate::Db;

use relgraph_core::{
    schema::{Schema, Table},
    stmt::{Assignment, Delete, Expr, Insert, OnConflict, Statement, Type, Update, Value},
    Error, Result,
};
use serde_json::{Map, Value as Json};

/// The single-row write operations generated for tables with a primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Insert,
    Upsert,
    Update,
    Delete,
}

/// A translated mutation of one row.
#[derive(Debug)]
pub(crate) struct Mutation<'a> {
    schema: &'a Schema,
    table: &'a Table,
    selection: &'a Selection,
    kind: MutationKind,

    /// Primary key of the targeted row, empty for inserts
    keys: Vec<Value>,

    /// Writable columns and their bound values
    values: Vec<(String, Value)>,

    /// Primary key columns first, then the selected columns
    returning: Vec<(String, Type)>,
}

impl MutationKind {
    pub const ALL: [MutationKind; 4] = [
        MutationKind::Insert,
        MutationKind::Upsert,
        MutationKind::Update,
        MutationKind::Delete,
    ];

    /// Name of the generated operation for `table`.
    pub fn field_name(self, table: &Table) -> String {
        match self {
            MutationKind::Insert => naming::insert_field(table),
            MutationKind::Upsert => naming::upsert_field(table),
            MutationKind::Update => naming::update_field(table),
            MutationKind::Delete => naming::delete_field(table),
        }
    }

    fn takes_keys(self) -> bool {
        !matches!(self, MutationKind::Insert)
    }
}

impl<'a> Mutation<'a> {
    pub(crate) fn plan(
        schema: &'a Schema,
        table: &'a Table,
        kind: MutationKind,
        selection: &'a Selection,
    ) -> Result<Mutation<'a>> {
        let pk = table.primary_key_columns();
        if pk.is_empty() {
            return Err(Error::invalid_request(format!(
                "table `{}` has no primary key and cannot be mutated",
                table.name
            )));
        }

        let keys = if kind.takes_keys() {
            pk.iter()
                .map(|column| {
                    let input = selection
                        .arguments
                        .get(column)
                        .filter(|input| !input.is_null())
                        .ok_or_else(|| {
                            Error::invalid_request(format!(
                                "missing primary key argument `{column}` for `{}`",
                                selection.name
                            ))
                        })?;

                    bind(schema, table, column, input)
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            vec![]
        };

        let values = match kind {
            MutationKind::Delete => vec![],
            _ => bind_values(schema, table, kind, selection.arguments.get(naming::VALUES))?,
        };

        let mut returning = Vec::<(String, Type)>::new();
        let columns = pk.iter().map(String::as_str).chain(
            selection
                .selection
                .iter()
                .filter_map(|field| match naming::resolve(schema, table, &field.name) {
                    Some(FieldRef::Column(column, _)) => Some(column.name.as_str()),
                    _ => None,
                }),
        );

        for column in columns {
            if returning.iter().any(|(existing, _)| existing == column) {
                continue;
            }

            let ty = table
                .column(column)
                .and_then(|column| schema.mapping(column))
                .map(|mapping| mapping.ty)
                .ok_or_else(|| {
                    Error::unsupported_type(format!("column `{column}` of `{}`", table.name))
                })?;
            returning.push((column.to_string(), ty));
        }

        Ok(Mutation {
            schema,
            table,
            selection,
            kind,
            keys,
            values,
            returning,
        })
    }

    /// The DML statement, `None` when an update has nothing to write.
    pub(crate) fn statement(&self) -> Option<Statement> {
        let table = self.table.name.clone();
        let pk = self.table.primary_key_columns();
        let returning = self
            .returning
            .iter()
            .map(|(column, _)| column.clone())
            .collect::<Vec<_>>();

        let (columns, values): (Vec<_>, Vec<_>) = self.values.iter().cloned().unzip();

        Some(match self.kind {
            MutationKind::Insert => Insert {
                table,
                columns,
                values,
                on_conflict: None,
                returning,
            }
            .into(),
            MutationKind::Upsert => {
                let update = if columns.is_empty() {
                    pk.iter().take(1).cloned().collect()
                } else {
                    columns.clone()
                };

                Insert {
                    table,
                    columns: pk.iter().cloned().chain(columns).collect(),
                    values: self.keys.iter().cloned().chain(values).collect(),
                    on_conflict: Some(OnConflict {
                        target: pk.to_vec(),
                        update,
                    }),
                    returning,
                }
                .into()
            }
            MutationKind::Update => {
                if columns.is_empty() {
                    return None;
                }

                Update {
                    table,
                    assignments: columns
                        .into_iter()
                        .zip(values)
                        .map(|(column, value)| Assignment { column, value })
                        .collect(),
                    filter: self.key_filter(),
                    returning,
                }
                .into()
            }
            MutationKind::Delete => Delete {
                table,
                filter: self.key_filter(),
                returning,
            }
            .into(),
        })
    }

    /// Runs the mutation and returns the selected fields of the affected
    /// row, `null` when no row matched.
    pub(crate) async fn execute(&self, db: &Db) -> Result<Json> {
        let Some(statement) = self.statement() else {
            tracing::debug!(table = %self.table.name, "update without values, reading row");
            return self.query_by_key(db, self.keys.clone()).await;
        };

        let ret = self.returning.iter().map(|(_, ty)| *ty).collect();
        let records = db.exec(statement, Some(ret)).await?.into_values()?;

        let Some(record) = records.into_iter().next() else {
            return Ok(Json::Null);
        };
        let record = record.into_vec();

        if self.kind != MutationKind::Delete && self.selects_relations() {
            let keys = record
                .iter()
                .take(self.table.primary_key_columns().len())
                .cloned()
                .collect();
            return self.query_by_key(db, keys).await;
        }

        Ok(Json::Object(self.reshape(&record)))
    }

    async fn query_by_key(&self, db: &Db, keys: Vec<Value>) -> Result<Json> {
        let filter = KeyFilter {
            columns: self.table.primary_key_columns().to_vec(),
            tuples: vec![keys],
        };
        let query = Query::plan(self.schema, self.table, self.selection, Some(filter), None)?;

        Ok(query
            .execute(db)
            .await?
            .into_iter()
            .next()
            .unwrap_or(Json::Null))
    }

    fn key_filter(&self) -> Expr {
        Expr::and(
            self.table
                .primary_key_columns()
                .iter()
                .zip(&self.keys)
                .map(|(column, value)| Expr::eq(Expr::bare_column(column), value.clone())),
        )
    }

    fn selects_relations(&self) -> bool {
        self.selection.selection.iter().any(|field| {
            matches!(
                naming::resolve(self.schema, self.table, &field.name),
                Some(FieldRef::Forward(_) | FieldRef::Reverse(_))
            )
        })
    }

    /// Builds the response from a returned row. Relations of a deleted row
    /// are reported empty.
    fn reshape(&self, record: &[Value]) -> Map<String, Json> {
        let mut object = Map::new();

        for field in &self.selection.selection {
            let key = field.response_key();
            if object.contains_key(key) {
                continue;
            }

            let value = match naming::resolve(self.schema, self.table, &field.name) {
                Some(FieldRef::Column(column, _)) => self
                    .returning
                    .iter()
                    .position(|(name, _)| *name == column.name)
                    .and_then(|index| record.get(index))
                    .map_or(Json::Null, Value::to_json),
                Some(FieldRef::Forward(_)) => Json::Null,
                Some(FieldRef::Reverse(_)) => Json::Array(vec![]),
                None => continue,
            };

            object.insert(key.to_string(), value);
        }

        object
    }
}

fn bind(schema: &Schema, table: &Table, column: &str, input: &Json) -> Result<Value> {
    let mapping = table
        .column(column)
        .and_then(|column| schema.mapping(column))
        .ok_or_else(|| Error::unsupported_type(format!("column `{column}` of `{}`", table.name)))?;

    mapping.bind(input)
}

/// Binds the `values` argument to the table's writable columns.
fn bind_values(
    schema: &Schema,
    table: &Table,
    kind: MutationKind,
    input: Option<&Json>,
) -> Result<Vec<(String, Value)>> {
    let input = match input {
        None | Some(Json::Null) => return Ok(vec![]),
        Some(Json::Object(input)) => input,
        Some(other) => {
            return Err(Error::invalid_request(format!(
                "`values` must be an object, got {other}"
            )))
        }
    };

    let mut values = vec![];
    for (key, value) in input {
        let Some(FieldRef::Column(column, mapping)) = naming::resolve(schema, table, key) else {
            tracing::debug!(table = %table.name, key, "ignoring unknown value");
            continue;
        };

        if !mapping.mutable {
            tracing::debug!(table = %table.name, key, "ignoring read-only column");
            continue;
        }

        if kind != MutationKind::Insert && table.is_primary_key(&column.name) {
            tracing::debug!(table = %table.name, key, "primary key columns are not updated");
            continue;
        }

        values.push((column.name.clone(), mapping.bind(value)?));
    }

    Ok(values)
}
