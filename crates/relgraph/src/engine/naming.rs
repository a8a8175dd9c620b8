//! Names of the generated operations, types and relation fields.

use relgraph_core::schema::{Column, ColumnMapping, ForeignKey, Scalar, Schema, Table};

use std::sync::Arc;

pub(crate) const FILTER: &str = "filter";
pub(crate) const ORDER: &str = "order";
pub(crate) const SKIP: &str = "skip";
pub(crate) const LIMIT: &str = "limit";
pub(crate) const VALUES: &str = "values";

pub(crate) const ORDER_DIRECTION: &str = "OrderDirection";

const COMPARE_SUFFIX: &str = "_compare";

/// A field of a table's object type.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldRef<'a> {
    Column(&'a Column, &'a ColumnMapping),

    /// Foreign key navigated from the referencing table, at most one row
    Forward(&'a Arc<ForeignKey>),

    /// Foreign key navigated from the referenced table, any number of rows
    Reverse(&'a Arc<ForeignKey>),
}

/// Resolves a field name of `table`'s object type.
///
/// Columns shadow relations of the same name.
pub(crate) fn resolve<'a>(schema: &'a Schema, table: &'a Table, name: &str) -> Option<FieldRef<'a>> {
    if let Some(column) = table.column(name) {
        if let Some(mapping) = schema.mapping(column) {
            return Some(FieldRef::Column(column, mapping));
        }
    }

    if let Some(fk) = table.outgoing(name) {
        return Some(FieldRef::Forward(fk));
    }

    table.incoming(name).map(FieldRef::Reverse)
}

/// Column targeted by a `<column>_compare` filter key.
pub(crate) fn compare_column(key: &str) -> Option<&str> {
    key.strip_suffix(COMPARE_SUFFIX)
}

pub(crate) fn compare_field(column: &str) -> String {
    format!("{column}{COMPARE_SUFFIX}")
}

/// Input type holding the comparison operators for one scalar.
pub(crate) fn compare_type(scalar: Scalar) -> String {
    format!("{}{COMPARE_SUFFIX}", scalar.name())
}

pub(crate) fn query_field(table: &Table) -> String {
    table.name.clone()
}

pub(crate) fn insert_field(table: &Table) -> String {
    format!("insert_{}", table.name)
}

pub(crate) fn upsert_field(table: &Table) -> String {
    format!("upsert_{}", table.name)
}

pub(crate) fn update_field(table: &Table) -> String {
    format!("update_{}", table.name)
}

pub(crate) fn delete_field(table: &Table) -> String {
    format!("delete_{}", table.name)
}

pub(crate) fn object_type(table: &Table) -> String {
    table.name.clone()
}

pub(crate) fn filter_type(table: &Table) -> String {
    format!("{}_filter", table.name)
}

pub(crate) fn order_type(table: &Table) -> String {
    format!("{}_order", table.name)
}

pub(crate) fn insert_type(table: &Table) -> String {
    format!("{}_insert", table.name)
}

pub(crate) fn update_type(table: &Table) -> String {
    format!("{}_update", table.name)
}

/// Whether `name` can be used as a GraphQL name.
///
/// Names must match `[_A-Za-z][_0-9A-Za-z]*` and must not start with `__`,
/// which is reserved for introspection.
pub(crate) fn is_valid(name: &str) -> bool {
    let mut chars = name.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    (first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !name.starts_with("__")
}
