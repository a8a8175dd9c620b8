use super::{resolve, scalar};
use crate::{
    engine::naming::{self, FieldRef},
    MutationKind,
};

use async_graphql::dynamic::{Field, InputObject, InputValue, Object, Type, TypeRef};
use relgraph_core::schema::{Column, ColumnMapping, ForeignKey, Schema, Table};
use std::{collections::HashSet, sync::Arc};

/// Reserved type names tables may not take.
const RESERVED: &[&str] = &[
    "Query",
    "Mutation",
    "Subscription",
    "Int",
    "Float",
    "String",
    "Boolean",
    "ID",
    "Long",
    "UUID",
    "DateTime",
    "JSON",
    naming::ORDER_DIRECTION,
];

/// Names of the tables the graph exposes.
///
/// A table is exposed when its name is a valid GraphQL name that does not
/// collide with a built-in type, and it has at least one comparable column.
pub(super) fn exposed(schema: &Schema) -> HashSet<&str> {
    schema
        .tables
        .values()
        .filter(|table| {
            let valid = naming::is_valid(&table.name) && !RESERVED.contains(&table.name.as_str());
            if !valid {
                tracing::warn!(table = %table.name, "skipping table with unusable name");
                return false;
            }

            let comparable = columns(schema, table).any(|(_, mapping)| scalar::is_comparable(mapping.scalar));
            if !comparable {
                tracing::warn!(table = %table.name, "skipping table without supported columns");
            }
            comparable
        })
        .map(|table| table.name.as_str())
        .collect()
}

/// Columns with a supported type and a valid name.
fn columns<'a>(
    schema: &'a Schema,
    table: &'a Table,
) -> impl Iterator<Item = (&'a Column, &'a ColumnMapping)> + 'a {
    schema
        .mapped_columns(table)
        .filter(|(column, _)| naming::is_valid(&column.name))
}

/// The types and operations generated for one table.
pub(super) struct Generated<'a> {
    schema: &'a Schema,
    table: &'a Table,

    /// Forward relations to exposed tables
    forward: Vec<(&'a Arc<ForeignKey>, &'a Table)>,

    /// Reverse relations from exposed tables
    reverse: Vec<(&'a Arc<ForeignKey>, &'a Table)>,
}

impl<'a> Generated<'a> {
    pub(super) fn new(schema: &'a Schema, table: &'a Table, exposed: &HashSet<&str>) -> Self {
        let usable = |name: &str| {
            naming::is_valid(name) && naming::resolve(schema, table, name).is_some_and(|field| !matches!(field, FieldRef::Column(..)))
        };

        let forward = table
            .outgoing
            .iter()
            .filter(|fk| usable(&fk.name) && exposed.contains(fk.to_table.as_str()))
            .filter_map(|fk| Some((fk, schema.table(&fk.to_table)?)))
            .collect();

        let reverse = table
            .incoming
            .iter()
            .filter(|fk| usable(&fk.reverse_name()) && exposed.contains(fk.from_table.as_str()))
            .filter_map(|fk| Some((fk, schema.table(&fk.from_table)?)))
            .collect();

        Generated {
            schema,
            table,
            forward,
            reverse,
        }
    }

    /// `T(filter, order, skip, limit): [T!]!`
    pub(super) fn query_field(&self) -> Field {
        let table = self.table.name.clone();

        let field = Field::new(
            naming::query_field(self.table),
            TypeRef::named_nn_list_nn(naming::object_type(self.table)),
            move |ctx| resolve::query(ctx, table.clone()),
        );

        query_arguments(field, self.table)
    }

    /// Mutations, only for tables whose primary key is fully exposed.
    pub(super) fn mutation_fields(&self) -> Vec<Field> {
        let pk = self.table.primary_key_columns();
        let keys = pk
            .iter()
            .filter_map(|name| columns(self.schema, self.table).find(|(column, _)| column.name == *name))
            .collect::<Vec<_>>();

        if pk.is_empty() || keys.len() != pk.len() {
            return vec![];
        }

        MutationKind::ALL
            .into_iter()
            .map(|kind| {
                let table = self.table.name.clone();
                let mut field = Field::new(
                    kind.field_name(self.table),
                    TypeRef::named(naming::object_type(self.table)),
                    move |ctx| resolve::mutation(ctx, kind, table.clone()),
                );

                if kind != MutationKind::Insert {
                    for (column, mapping) in &keys {
                        field = field.argument(InputValue::new(
                            &column.name,
                            TypeRef::named_nn(mapping.scalar.name()),
                        ));
                    }
                }

                match kind {
                    MutationKind::Insert if self.has_insert_columns() => field.argument(
                        InputValue::new(naming::VALUES, TypeRef::named_nn(naming::insert_type(self.table))),
                    ),
                    MutationKind::Upsert | MutationKind::Update if self.has_update_columns() => field
                        .argument(InputValue::new(
                            naming::VALUES,
                            TypeRef::named(naming::update_type(self.table)),
                        )),
                    _ => field,
                }
            })
            .collect()
    }

    /// Object, filter, order and mutation input types.
    pub(super) fn types(&self) -> Vec<Type> {
        let mut types = vec![
            self.object().into(),
            self.filter().into(),
            self.order().into(),
        ];

        if self.has_insert_columns() {
            types.push(self.input(naming::insert_type(self.table), false).into());
        }
        if self.has_update_columns() {
            types.push(self.input(naming::update_type(self.table), true).into());
        }

        types
    }

    fn object(&self) -> Object {
        let mut object = Object::new(naming::object_type(self.table));

        for (column, mapping) in columns(self.schema, self.table) {
            object = object.field(Field::new(
                &column.name,
                TypeRef::named(mapping.scalar.name()),
                resolve::column,
            ));
        }

        for (fk, target) in &self.forward {
            object = object.field(Field::new(
                &fk.name,
                TypeRef::named(naming::object_type(target)),
                resolve::nested,
            ));
        }

        for (fk, source) in &self.reverse {
            let field = Field::new(
                fk.reverse_name(),
                TypeRef::named_nn_list_nn(naming::object_type(source)),
                resolve::nested,
            );
            object = object.field(query_arguments(field, source));
        }

        object
    }

    fn filter(&self) -> InputObject {
        let mut filter = InputObject::new(naming::filter_type(self.table));

        for (column, mapping) in self.comparable() {
            filter = filter
                .field(InputValue::new(
                    &column.name,
                    TypeRef::named_list(mapping.scalar.name()),
                ))
                .field(InputValue::new(
                    naming::compare_field(&column.name),
                    TypeRef::named(naming::compare_type(mapping.scalar)),
                ));
        }

        for (fk, target) in &self.forward {
            filter = filter.field(InputValue::new(
                &fk.name,
                TypeRef::named(naming::filter_type(target)),
            ));
        }

        for (fk, source) in &self.reverse {
            filter = filter.field(InputValue::new(
                fk.reverse_name(),
                TypeRef::named(naming::filter_type(source)),
            ));
        }

        filter
    }

    fn order(&self) -> InputObject {
        let mut order = InputObject::new(naming::order_type(self.table));

        for (column, _) in self.comparable() {
            order = order.field(InputValue::new(
                &column.name,
                TypeRef::named(naming::ORDER_DIRECTION),
            ));
        }

        for (fk, target) in &self.forward {
            order = order.field(InputValue::new(
                &fk.name,
                TypeRef::named(naming::order_type(target)),
            ));
        }

        order
    }

    fn input(&self, name: String, skip_keys: bool) -> InputObject {
        self.writable(skip_keys)
            .fold(InputObject::new(name), |input, (column, mapping)| {
                input.field(InputValue::new(
                    &column.name,
                    TypeRef::named(mapping.scalar.name()),
                ))
            })
    }

    fn comparable(&self) -> impl Iterator<Item = (&'a Column, &'a ColumnMapping)> + 'a {
        columns(self.schema, self.table).filter(|(_, mapping)| scalar::is_comparable(mapping.scalar))
    }

    fn writable(&self, skip_keys: bool) -> impl Iterator<Item = (&'a Column, &'a ColumnMapping)> + 'a {
        let table = self.table;
        columns(self.schema, table).filter(move |(column, mapping)| {
            mapping.mutable && !(skip_keys && table.is_primary_key(&column.name))
        })
    }

    fn has_insert_columns(&self) -> bool {
        self.writable(false).next().is_some()
    }

    fn has_update_columns(&self) -> bool {
        self.writable(true).next().is_some()
    }
}

fn query_arguments(field: Field, table: &Table) -> Field {
    field
        .argument(InputValue::new(
            naming::FILTER,
            TypeRef::named(naming::filter_type(table)),
        ))
        .argument(InputValue::new(
            naming::ORDER,
            TypeRef::named_nn_list(naming::order_type(table)),
        ))
        .argument(InputValue::new(naming::SKIP, TypeRef::named(TypeRef::INT)))
        .argument(InputValue::new(naming::LIMIT, TypeRef::named(TypeRef::INT)))
}
