use relgraph_core::{
    schema::{ColumnRow, ForeignKeyRow, Introspection, PrimaryKeyRow},
    Error, Result,
};
use rusqlite::{types::FromSql, Connection, Row};
use std::collections::{HashMap, HashSet};

const COLUMNS: &str = "\
SELECT m.name, p.name, p.type \
FROM sqlite_master AS m JOIN pragma_table_info(m.name) AS p \
WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%' \
ORDER BY m.name, p.cid";

const PRIMARY_KEYS: &str = "\
SELECT m.name, p.name \
FROM sqlite_master AS m JOIN pragma_table_info(m.name) AS p \
WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%' AND p.pk > 0 \
ORDER BY m.name, p.pk";

const FOREIGN_KEYS: &str = "\
SELECT m.name, f.id, f.\"table\", f.\"from\", f.\"to\" \
FROM sqlite_master AS m JOIN pragma_foreign_key_list(m.name) AS f \
WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%' \
ORDER BY m.name, f.id, f.seq";

/// Reads tables, keys and references from the catalog.
///
/// SQLite does not name constraints, so primary keys are named
/// `<table>_pkey` and foreign keys `<table>_<columns>_fkey`.
pub(crate) fn introspect(connection: &Connection) -> Result<Introspection> {
    let mut introspection = Introspection::default();

    query(connection, COLUMNS, |row| {
        introspection.columns.push(ColumnRow {
            table: get(row, 0)?,
            column: get(row, 1)?,
            data_type: get(row, 2)?,
        });
        Ok(())
    })?;

    let mut primary_keys = HashMap::<String, Vec<String>>::new();
    query(connection, PRIMARY_KEYS, |row| {
        let table: String = get(row, 0)?;
        let column: String = get(row, 1)?;

        primary_keys
            .entry(table.clone())
            .or_default()
            .push(column.clone());

        introspection.primary_keys.push(PrimaryKeyRow {
            name: format!("{table}_pkey"),
            table,
            column,
        });
        Ok(())
    })?;

    // (from table, constraint id) -> rows in match order, `None` for a
    // referenced column that could not be resolved
    let mut references = Vec::<((String, i64), Vec<Option<ForeignKeyRow>>)>::new();
    query(connection, FOREIGN_KEYS, |row| {
        let from_table: String = get(row, 0)?;
        let id: i64 = get(row, 1)?;
        let to_table: String = get(row, 2)?;
        let from_column: String = get(row, 3)?;
        let to_column: Option<String> = get(row, 4)?;

        let key = (from_table.clone(), id);
        if references.last().map(|(last, _)| last) != Some(&key) {
            references.push((key, vec![]));
        }

        let position = references.last().map_or(0, |(_, rows)| rows.len());

        // A reference without columns targets the primary key
        let to_column = to_column.or_else(|| {
            primary_keys
                .get(&to_table)
                .and_then(|columns| columns.get(position))
                .cloned()
        });

        if let Some((_, rows)) = references.last_mut() {
            rows.push(to_column.map(|to_column| ForeignKeyRow {
                name: String::new(),
                from_table,
                from_column,
                to_table,
                to_column,
            }));
        }
        Ok(())
    })?;

    let mut names = HashSet::new();
    for ((from_table, id), rows) in references {
        let Some(mut rows) = rows.into_iter().collect::<Option<Vec<_>>>() else {
            tracing::warn!(
                table = %from_table,
                id,
                "skipping foreign key without resolvable target columns"
            );
            continue;
        };

        let columns = rows
            .iter()
            .map(|row| row.from_column.as_str())
            .collect::<Vec<_>>()
            .join("_");

        // Two constraints over the same columns get the constraint id appended
        let mut name = format!("{from_table}_{columns}_fkey");
        if !names.insert(name.clone()) {
            name = format!("{from_table}_{columns}_{id}_fkey");
            names.insert(name.clone());
        }

        for row in &mut rows {
            row.name = name.clone();
        }
        introspection.foreign_keys.extend(rows);
    }

    tracing::debug!(
        columns = introspection.columns.len(),
        primary_keys = introspection.primary_keys.len(),
        foreign_keys = introspection.foreign_keys.len(),
        "introspected sqlite catalog"
    );

    Ok(introspection)
}

fn query(
    connection: &Connection,
    sql: &str,
    mut f: impl FnMut(&Row<'_>) -> Result<()>,
) -> Result<()> {
    let mut stmt = connection
        .prepare(sql)
        .map_err(Error::driver_operation_failed)?;
    let mut rows = stmt.query([]).map_err(Error::driver_operation_failed)?;

    while let Some(row) = rows.next().map_err(Error::driver_operation_failed)? {
        f(row)?;
    }

    Ok(())
}

fn get<T: FromSql>(row: &Row<'_>, index: usize) -> Result<T> {
    row.get(index).map_err(Error::driver_operation_failed)
}
