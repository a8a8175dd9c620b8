use super::{
    filter::Predicate,
    naming::{self, FieldRef},
    Filters, Orders, Selection,
};
use crate::Db;

use async_recursion::async_recursion;
use futures::future::try_join_all;
use relgraph_core::{
    err,
    schema::{ForeignKey, Schema, Table},
    stmt::{
        Cte, Direction, Expr, Join, JoinKind, JoinTree, OrderBy, Path, Source, Statement, Type,
        Value, View,
    },
    Error, Result,
};
use serde_json::{Map, Value as Json};
use std::collections::{HashMap, HashSet};

/// Upper bound on key parameters bound by one sub-query statement.
///
/// Keeps well below SQLite's 32766 and PostgreSQL's 65535 variable limits.
pub(crate) const MAX_KEY_PARAMS: usize = 1000;

/// Tables reached from the queried table, keyed by relation path.
pub(crate) type Relations<'a> = JoinTree<&'a Table, Hop<'a>>;

/// One foreign key traversal in a [`Relations`] tree.
#[derive(Debug, Clone)]
pub(crate) struct Hop<'a> {
    pub(crate) fk: &'a ForeignKey,

    /// `true` when navigating from the referencing to the referenced table
    pub(crate) forward: bool,

    pub(crate) kind: JoinKind,
}

/// A column of the table joined at `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnRef {
    pub(crate) path: Path,
    pub(crate) name: String,
}

/// Restricts a query to rows whose `columns` equal one of `tuples`.
#[derive(Debug, Clone)]
pub(crate) struct KeyFilter {
    pub(crate) columns: Vec<String>,
    pub(crate) tuples: Vec<Vec<Value>>,
}

/// Table aliases by relation path.
#[derive(Debug, Default)]
pub(crate) struct Aliases {
    map: HashMap<Path, String>,
}

/// A translated selection, ready to run.
#[derive(Debug)]
pub(crate) struct Query<'a> {
    schema: &'a Schema,

    pub(crate) statement: Statement,

    /// Type of each projected column
    pub(crate) ret: Vec<Type>,

    shape: Vec<Shape>,

    /// Projected foreign key columns rows are grouped by when the query
    /// serves a sub-query
    group: Vec<usize>,

    subqueries: Vec<SubQuery<'a>>,
}

/// Where the projected columns of a row go in the response object.
#[derive(Debug)]
enum Shape {
    Column {
        key: String,
        extract: usize,
    },

    /// Object of a forward relation, `null` when every `present` column is
    Object {
        key: String,
        present: Vec<usize>,
        fields: Vec<Shape>,
    },

    /// Filled in by a sub-query
    List { key: String },
}

/// Rows of a reverse relation, fetched with one statement for all parents.
#[derive(Debug)]
struct SubQuery<'a> {
    fk: &'a ForeignKey,

    /// Referencing table
    table: &'a Table,

    selection: &'a Selection,

    /// Response keys from the row object to the list
    output: Vec<String>,

    /// Projected referenced columns of the parent row
    keys: Vec<usize>,

    key_types: Vec<Type>,
}

#[derive(Debug)]
struct Row {
    values: Vec<Value>,
    object: Map<String, Json>,
}

/// Skip and limit applied to each parent's rows of a sub-query.
#[derive(Debug, Clone, Copy)]
struct Window {
    skip: usize,
    limit: Option<usize>,
}

struct Planner<'a> {
    schema: &'a Schema,
    tree: Relations<'a>,
    extracts: Vec<(ColumnRef, Type)>,
    subqueries: Vec<SubQuery<'a>>,
}

impl<'a> Hop<'a> {
    pub(crate) fn forward(fk: &'a ForeignKey, kind: JoinKind) -> Hop<'a> {
        Hop {
            fk,
            forward: true,
            kind,
        }
    }

    pub(crate) fn reverse(fk: &'a ForeignKey, kind: JoinKind) -> Hop<'a> {
        Hop {
            fk,
            forward: false,
            kind,
        }
    }

    /// The table the hop arrives at.
    pub(crate) fn target(&self, schema: &'a Schema) -> Result<&'a Table> {
        let name = if self.forward {
            &self.fk.to_table
        } else {
            &self.fk.from_table
        };

        schema
            .table(name)
            .ok_or_else(|| Error::invalid_schema(format!("unknown table `{name}`")))
    }

    fn join(&self, parent: &Source, child: &Source) -> Join {
        let on = Expr::and(self.fk.matches.iter().map(|m| {
            let (parent_column, child_column) = if self.forward {
                (&m.from, &m.to)
            } else {
                (&m.to, &m.from)
            };

            Expr::eq(
                Expr::column(&parent.alias, parent_column),
                Expr::column(&child.alias, child_column),
            )
        }));

        Join {
            kind: self.kind,
            on,
        }
    }
}

impl ColumnRef {
    pub(crate) fn new(path: &[String], name: &str) -> ColumnRef {
        ColumnRef {
            path: path.to_vec(),
            name: name.to_string(),
        }
    }
}

impl Aliases {
    pub(crate) fn from_tree<E>(tree: &JoinTree<Source, E>) -> Aliases {
        Aliases {
            map: tree
                .iter()
                .map(|(path, _, source)| (path.to_vec(), source.alias.clone()))
                .collect(),
        }
    }

    pub(crate) fn get(&self, path: &[String]) -> Result<&str> {
        self.map
            .get(path)
            .map(String::as_str)
            .ok_or_else(|| err!("no table joined at {path:?}"))
    }

    fn column(&self, column: &ColumnRef) -> Result<Expr> {
        Ok(Expr::column(self.get(&column.path)?, &column.name))
    }
}

impl<'a> Query<'a> {
    /// Translates `selection` on `table`.
    ///
    /// `keys` restricts the rows and projects the key columns for grouping.
    /// `page_size` is the default limit of a top-level query; sub-queries are
    /// not limited in SQL.
    pub(crate) fn plan(
        schema: &'a Schema,
        table: &'a Table,
        selection: &'a Selection,
        keys: Option<KeyFilter>,
        page_size: Option<usize>,
    ) -> Result<Query<'a>> {
        let arguments = &selection.arguments;

        let mut filter_tree = JoinTree::new(table);
        let mut filters = Filters::parse(schema, &mut filter_tree, arguments.get(naming::FILTER))?;

        let group_columns = keys
            .as_ref()
            .map(|keys| keys.columns.clone())
            .unwrap_or_default();

        if let Some(keys) = keys {
            filters.push(Predicate::Keys {
                path: vec![],
                columns: keys.columns,
                tuples: keys.tuples,
            });
        }

        // Predicates through to-many relations would multiply rows, so they
        // select distinct keys in a CTE the main view joins against.
        let (cte, tree, predicates) = if filters.plural {
            if table.primary_key.is_none() {
                return Err(Error::invalid_request(format!(
                    "filtering `{}` through a to-many relation requires a primary key",
                    table.name
                )));
            }

            let view = filter_view(table, filter_tree, &filters.predicates)?;
            (Some(view), JoinTree::new(table), vec![])
        } else {
            (None, filter_tree, filters.predicates)
        };

        let mut planner = Planner {
            schema,
            tree,
            extracts: vec![],
            subqueries: vec![],
        };

        let mut orders = Orders::parse(schema, &mut planner.tree, arguments.get(naming::ORDER))?;
        if orders.is_empty() {
            let first = table
                .primary_key_columns()
                .first()
                .or_else(|| table.columns.keys().next());

            if let Some(column) = first {
                orders.push(ColumnRef::new(&[], column), Direction::Asc);
            }
        }

        let shape = planner.select(table, &[], &[], &selection.selection)?;

        let group = group_columns
            .iter()
            .map(|column| {
                let ty = planner.column_type(table, column)?;
                Ok(planner.extract(ColumnRef::new(&[], column), ty))
            })
            .collect::<Result<Vec<_>>>()?;

        let (limit, offset) = match page_size {
            Some(page_size) => {
                let limit = count_argument(selection, naming::LIMIT)?.unwrap_or(page_size);
                let skip = count_argument(selection, naming::SKIP)?.unwrap_or(0);
                (
                    Some(Expr::value(sql_count(selection, naming::LIMIT, limit)?)),
                    Some(Expr::value(sql_count(selection, naming::SKIP, skip)?)),
                )
            }
            None => (None, None),
        };

        let Planner {
            tree,
            extracts,
            subqueries,
            ..
        } = planner;

        let sources = tree.map_nodes(|index, table| Source {
            table: table.name.clone(),
            alias: format!("t{index}"),
        });
        let aliases = Aliases::from_tree(&sources);
        let mut from = sources.map_edges(|parent, hop, child| hop.join(parent, child));

        if cte.is_some() {
            let root = aliases.get(&[])?;
            let on = Expr::and(table.primary_key_columns().iter().map(|column| {
                Expr::eq(Expr::column("cte", column), Expr::column(root, column))
            }));

            from = JoinTree::graft(
                Source {
                    table: "filter".to_string(),
                    alias: "cte".to_string(),
                },
                Join {
                    kind: JoinKind::Inner,
                    on,
                },
                from,
            );
        }

        let filter = predicates
            .iter()
            .map(|predicate| predicate.to_expr(&aliases))
            .collect::<Result<Vec<_>>>()?;

        let order_by = orders
            .entries
            .iter()
            .map(|(column, direction)| {
                Ok(OrderBy {
                    expr: aliases.column(column)?,
                    direction: *direction,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let projection = extracts
            .iter()
            .map(|(column, _)| aliases.column(column))
            .collect::<Result<Vec<_>>>()?;

        let view = View {
            with: cte.map(|view| Cte {
                name: "filter".to_string(),
                view: Box::new(view),
            }),
            from,
            filter: (!filter.is_empty()).then(|| Expr::and(filter)),
            order_by,
            projection,
            distinct: false,
            limit,
            offset,
        };

        tracing::trace!(table = %table.name, extracts = extracts.len(), subqueries = subqueries.len(), "planned query");

        Ok(Query {
            schema,
            statement: Statement::Query(view),
            ret: extracts.into_iter().map(|(_, ty)| ty).collect(),
            shape,
            group,
            subqueries,
        })
    }

    /// Runs the query and its sub-queries, returning one object per row.
    pub(crate) async fn execute(&self, db: &Db) -> Result<Vec<Json>> {
        let rows = self.run(db).await?;
        Ok(rows.into_iter().map(|row| Json::Object(row.object)).collect())
    }

    #[async_recursion]
    async fn run(&self, db: &Db) -> Result<Vec<Row>> {
        let records = db
            .exec(self.statement.clone(), Some(self.ret.clone()))
            .await?
            .into_values()?;

        let mut rows = records
            .into_iter()
            .map(|record| {
                let values = record.into_vec();
                let object = reshape(&self.shape, &values);
                Row { values, object }
            })
            .collect::<Vec<_>>();

        let nested = try_join_all(
            self.subqueries
                .iter()
                .map(|subquery| subquery.fetch(self.schema, db, &rows)),
        )
        .await?;

        for (subquery, lists) in self.subqueries.iter().zip(nested) {
            for (row, list) in rows.iter_mut().zip(lists) {
                if let Some(list) = list {
                    attach(&mut row.object, &subquery.output, list);
                }
            }
        }

        Ok(rows)
    }
}

impl<'a> Planner<'a> {
    fn select(
        &mut self,
        table: &'a Table,
        path: &[String],
        output: &[String],
        fields: &'a [Selection],
    ) -> Result<Vec<Shape>> {
        let mut shape = Vec::<Shape>::new();

        for field in fields {
            let key = field.response_key();

            match naming::resolve(self.schema, table, &field.name) {
                Some(FieldRef::Column(column, mapping)) => {
                    if position(&shape, key).is_some() {
                        continue;
                    }

                    let extract = self.extract(ColumnRef::new(path, &column.name), mapping.ty);
                    shape.push(Shape::Column {
                        key: key.to_string(),
                        extract,
                    });
                }
                Some(FieldRef::Forward(fk)) => {
                    let hop = Hop::forward(fk, JoinKind::Left);
                    let target = hop.target(self.schema)?;
                    self.tree.insert(path, field.name.clone(), hop, target)?;

                    let nested_path = extend(path, &field.name);
                    let nested_output = extend(output, key);

                    let present = self.presence(target, fk, &nested_path)?;
                    let fields = self.select(target, &nested_path, &nested_output, &field.selection)?;

                    match position(&shape, key).map(|index| &mut shape[index]) {
                        Some(Shape::Object { fields: existing, .. }) => existing.extend(fields),
                        Some(_) => {}
                        None => shape.push(Shape::Object {
                            key: key.to_string(),
                            present,
                            fields,
                        }),
                    }
                }
                Some(FieldRef::Reverse(fk)) => {
                    if position(&shape, key).is_some() {
                        continue;
                    }

                    let mut keys = vec![];
                    let mut key_types = vec![];
                    for column in fk.to_columns() {
                        let ty = self.column_type(table, column)?;
                        keys.push(self.extract(ColumnRef::new(path, column), ty));
                        key_types.push(ty);
                    }

                    self.subqueries.push(SubQuery {
                        fk,
                        table: Hop::reverse(fk, JoinKind::Inner).target(self.schema)?,
                        selection: field,
                        output: extend(output, key),
                        keys,
                        key_types,
                    });
                    shape.push(Shape::List {
                        key: key.to_string(),
                    });
                }
                None => {
                    if !field.name.starts_with("__") {
                        tracing::debug!(table = %table.name, field = %field.name, "ignoring unknown field");
                    }
                }
            }
        }

        Ok(shape)
    }

    /// Projects the columns that are only `NULL` when a left joined relation
    /// found no row.
    fn presence(&mut self, target: &'a Table, fk: &ForeignKey, path: &[String]) -> Result<Vec<usize>> {
        let columns = match target.primary_key_columns() {
            [] => fk.to_columns().map(str::to_string).collect::<Vec<_>>(),
            columns => columns.to_vec(),
        };

        columns
            .iter()
            .map(|column| {
                let ty = self.column_type(target, column)?;
                Ok(self.extract(ColumnRef::new(path, column), ty))
            })
            .collect()
    }

    fn extract(&mut self, column: ColumnRef, ty: Type) -> usize {
        if let Some(index) = self.extracts.iter().position(|(existing, _)| *existing == column) {
            return index;
        }

        self.extracts.push((column, ty));
        self.extracts.len() - 1
    }

    fn column_type(&self, table: &Table, name: &str) -> Result<Type> {
        let column = table.column(name).ok_or_else(|| {
            Error::invalid_schema(format!("unknown column `{name}` on table `{}`", table.name))
        })?;

        self.schema
            .mapping(column)
            .map(|mapping| mapping.ty)
            .ok_or_else(|| Error::unsupported_type(column.data_type.to_string()))
    }
}

impl<'a> SubQuery<'a> {
    /// Fetches the related rows of every parent row with one statement.
    ///
    /// Returns one list per parent row, `None` for rows whose path to the
    /// list crosses a `null` relation.
    async fn fetch(
        &self,
        schema: &'a Schema,
        db: &Db,
        rows: &[Row],
    ) -> Result<Vec<Option<Vec<Json>>>> {
        let parents = rows
            .iter()
            .map(|row| {
                reachable(&row.object, &self.output).then(|| {
                    self.keys
                        .iter()
                        .map(|&index| row.values.get(index).cloned().unwrap_or_default())
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        let tuples = parents
            .iter()
            .flatten()
            .filter(|tuple| !tuple.iter().any(Value::is_null))
            .filter(|tuple| seen.insert(*tuple))
            .cloned()
            .collect::<Vec<_>>();

        if tuples.is_empty() {
            return Ok(parents
                .iter()
                .map(|parent| parent.as_ref().map(|_| vec![]))
                .collect());
        }

        let columns = self.fk.from_columns().map(str::to_string).collect::<Vec<_>>();
        let batch = (MAX_KEY_PARAMS / columns.len().max(1)).max(1);

        // All children of one parent land in the same batch, so each group
        // keeps the statement's order.
        let mut groups = HashMap::<Vec<Value>, Vec<Json>>::new();
        for chunk in tuples.chunks(batch) {
            let keys = KeyFilter {
                columns: columns.clone(),
                tuples: chunk.to_vec(),
            };
            let query = Query::plan(schema, self.table, self.selection, Some(keys), None)?;

            for child in query.run(db).await? {
                let key = query
                    .group
                    .iter()
                    .zip(&self.key_types)
                    .map(|(&index, ty)| {
                        child.values.get(index).cloned().unwrap_or_default().cast(*ty)
                    })
                    .collect::<Result<Vec<_>>>()?;

                groups.entry(key).or_default().push(Json::Object(child.object));
            }
        }

        let window = Window::parse(self.selection)?;

        Ok(parents
            .into_iter()
            .map(|parent| {
                parent.map(|key| {
                    let list = groups.get(&key).cloned().unwrap_or_default();
                    window.apply(list)
                })
            })
            .collect())
    }
}

impl Window {
    fn parse(selection: &Selection) -> Result<Window> {
        Ok(Window {
            skip: count_argument(selection, naming::SKIP)?.unwrap_or(0),
            limit: count_argument(selection, naming::LIMIT)?,
        })
    }

    fn apply(self, list: Vec<Json>) -> Vec<Json> {
        let rows = list.into_iter().skip(self.skip);
        match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        }
    }
}

/// The CTE selecting the distinct keys of rows matching every predicate.
fn filter_view(table: &Table, tree: Relations<'_>, predicates: &[Predicate]) -> Result<View> {
    let sources = tree.map_nodes(|index, table| Source {
        table: table.name.clone(),
        alias: format!("f{index}"),
    });
    let aliases = Aliases::from_tree(&sources);

    let filter = predicates
        .iter()
        .map(|predicate| predicate.to_expr(&aliases))
        .collect::<Result<Vec<_>>>()?;

    let root = aliases.get(&[])?;
    let projection = table
        .primary_key_columns()
        .iter()
        .map(|column| Expr::column(root, column))
        .collect();

    Ok(View {
        with: None,
        from: sources.map_edges(|parent, hop, child| hop.join(parent, child)),
        filter: (!filter.is_empty()).then(|| Expr::and(filter)),
        order_by: vec![],
        projection,
        distinct: true,
        limit: None,
        offset: None,
    })
}

/// Reads a non-negative integer argument.
fn count_argument(selection: &Selection, name: &str) -> Result<Option<usize>> {
    match selection.arguments.get(name) {
        None | Some(Json::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|value| usize::try_from(value).ok())
            .map(Some)
            .ok_or_else(|| {
                Error::invalid_request(format!(
                    "`{name}` of `{}` must be a non-negative integer, got {value}",
                    selection.name
                ))
            }),
    }
}

/// Binds a count as a SQL integer, rejecting values past `i64::MAX`.
fn sql_count(selection: &Selection, name: &str, count: usize) -> Result<Value> {
    i64::try_from(count).map(Value::I64).map_err(|_| {
        Error::invalid_request(format!(
            "`{name}` of `{}` is too large, got {count}",
            selection.name
        ))
    })
}

fn reshape(shape: &[Shape], values: &[Value]) -> Map<String, Json> {
    let value = |index: usize| values.get(index).cloned().unwrap_or_default();
    let mut object = Map::new();

    for field in shape {
        match field {
            Shape::Column { key, extract } => {
                object.insert(key.clone(), value(*extract).to_json());
            }
            Shape::Object {
                key,
                present,
                fields,
            } => {
                let json = if present.iter().all(|&index| value(index).is_null()) {
                    Json::Null
                } else {
                    Json::Object(reshape(fields, values))
                };
                object.insert(key.clone(), json);
            }
            Shape::List { key } => {
                object.insert(key.clone(), Json::Array(vec![]));
            }
        }
    }

    object
}

/// Whether every object on the way to `output` is present.
fn reachable(object: &Map<String, Json>, output: &[String]) -> bool {
    let Some((_, parents)) = output.split_last() else {
        return false;
    };

    let mut current = object;
    for key in parents {
        match current.get(key) {
            Some(Json::Object(nested)) => current = nested,
            _ => return false,
        }
    }
    true
}

fn attach(object: &mut Map<String, Json>, output: &[String], list: Vec<Json>) {
    let Some((last, parents)) = output.split_last() else {
        return;
    };

    let mut current = object;
    for key in parents {
        match current.get_mut(key) {
            Some(Json::Object(nested)) => current = nested,
            _ => return,
        }
    }

    current.insert(last.clone(), Json::Array(list));
}

fn position(shape: &[Shape], key: &str) -> Option<usize> {
    shape.iter().position(|field| {
        let existing = match field {
            Shape::Column { key, .. } | Shape::Object { key, .. } | Shape::List { key } => key,
        };
        existing == key
    })
}

fn extend(path: &[String], segment: &str) -> Path {
    let mut path = path.to_vec();
    path.push(segment.to_string());
    path
}
