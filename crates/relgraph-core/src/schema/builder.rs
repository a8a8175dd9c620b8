use super::{
    Column, ColumnRow, DataType, ForeignKey, ForeignKeyRow, Introspection, Match, PrimaryKey,
    PrimaryKeyRow, Schema, Table, TypeMapping, Vendor,
};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// Assembles a [`Schema`] from introspection rows.
#[derive(Debug)]
pub struct Builder {
    vendor: Vendor,
    columns: Vec<ColumnRow>,
    primary_keys: Vec<PrimaryKeyRow>,
    foreign_keys: Vec<ForeignKeyRow>,
}

impl Builder {
    pub fn new(vendor: Vendor) -> Builder {
        Builder {
            vendor,
            columns: vec![],
            primary_keys: vec![],
            foreign_keys: vec![],
        }
    }

    pub fn column(&mut self, row: ColumnRow) -> &mut Self {
        self.columns.push(row);
        self
    }

    pub fn primary_key(&mut self, row: PrimaryKeyRow) -> &mut Self {
        self.primary_keys.push(row);
        self
    }

    pub fn foreign_key(&mut self, row: ForeignKeyRow) -> &mut Self {
        self.foreign_keys.push(row);
        self
    }

    pub fn introspection(&mut self, introspection: Introspection) -> &mut Self {
        self.columns.extend(introspection.columns);
        self.primary_keys.extend(introspection.primary_keys);
        self.foreign_keys.extend(introspection.foreign_keys);
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let mut tables = IndexMap::<String, Table>::new();

        for row in &self.columns {
            let table = tables
                .entry(row.table.clone())
                .or_insert_with(|| Table::new(&row.table));

            if table.columns.contains_key(&row.column) {
                return Err(Error::invalid_schema(format!(
                    "duplicate column `{}` on table `{}`",
                    row.column, row.table
                )));
            }

            table.columns.insert(
                row.column.clone(),
                Column {
                    name: row.column.clone(),
                    data_type: DataType::new(self.vendor, &row.data_type),
                },
            );
        }

        for row in &self.primary_keys {
            let table = lookup_column(&mut tables, &row.table, &row.column)?;

            let pk = table.primary_key.get_or_insert_with(|| PrimaryKey {
                name: row.name.clone(),
                table: row.table.clone(),
                columns: vec![],
            });

            if pk.name != row.name {
                return Err(Error::invalid_schema(format!(
                    "table `{}` reports two primary keys: `{}` and `{}`",
                    row.table, pk.name, row.name
                )));
            }

            pk.columns.push(row.column.clone());
        }

        for fk in self.group_foreign_keys()? {
            // SQLite accepts references to tables that were never created
            let dangling = fk.matches.iter().find_map(|m| {
                check_column(&tables, &fk.from_table, &m.from)
                    .and_then(|()| check_column(&tables, &fk.to_table, &m.to))
                    .err()
            });

            if let Some(err) = dangling {
                tracing::warn!(
                    foreign_key = %fk.name,
                    table = %fk.from_table,
                    %err,
                    "skipping foreign key"
                );
                continue;
            }

            let fk = Arc::new(fk);

            if let Some(from) = tables.get_mut(&fk.from_table) {
                from.outgoing.push(fk.clone());
            }
            if let Some(to) = tables.get_mut(&fk.to_table) {
                to.incoming.push(fk);
            }
        }

        tracing::debug!(
            vendor = ?self.vendor,
            tables = tables.len(),
            foreign_keys = tables.values().map(|table| table.outgoing.len()).sum::<usize>(),
            "built schema"
        );

        Ok(Schema {
            vendor: self.vendor,
            tables,
            mapping: TypeMapping::new(self.vendor),
        })
    }

    /// Folds consecutive rows of one constraint into a foreign key.
    fn group_foreign_keys(&self) -> Result<Vec<ForeignKey>> {
        let mut grouped = IndexMap::<(&str, &str), ForeignKey>::new();

        for row in &self.foreign_keys {
            let fk = grouped
                .entry((row.from_table.as_str(), row.name.as_str()))
                .or_insert_with(|| ForeignKey {
                    name: row.name.clone(),
                    from_table: row.from_table.clone(),
                    to_table: row.to_table.clone(),
                    matches: vec![],
                });

            if fk.to_table != row.to_table {
                return Err(Error::invalid_schema(format!(
                    "foreign key `{}` references both `{}` and `{}`",
                    row.name, fk.to_table, row.to_table
                )));
            }

            fk.matches.push(Match {
                from: row.from_column.clone(),
                to: row.to_column.clone(),
            });
        }

        Ok(grouped.into_values().collect())
    }
}

fn lookup_column<'a>(
    tables: &'a mut IndexMap<String, Table>,
    table: &str,
    column: &str,
) -> Result<&'a mut Table> {
    check_column(tables, table, column)?;
    tables
        .get_mut(table)
        .ok_or_else(|| Error::invalid_schema(format!("unknown table `{table}`")))
}

fn check_column(tables: &IndexMap<String, Table>, table: &str, column: &str) -> Result<()> {
    let Some(found) = tables.get(table) else {
        return Err(Error::invalid_schema(format!("unknown table `{table}`")));
    };

    if !found.columns.contains_key(column) {
        return Err(Error::invalid_schema(format!(
            "unknown column `{column}` on table `{table}`"
        )));
    }

    Ok(())
}
