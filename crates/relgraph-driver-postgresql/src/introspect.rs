use relgraph_core::{
    schema::{ColumnRow, ForeignKeyRow, Introspection, PrimaryKeyRow},
    Error, Result,
};
use tokio_postgres::{Client, Row};

const COLUMNS: &str = "\
SELECT c.table_name::text, c.column_name::text, c.data_type::text \
FROM information_schema.columns c \
JOIN information_schema.tables t \
  ON t.table_schema = c.table_schema AND t.table_name = c.table_name \
WHERE c.table_schema = current_schema() AND t.table_type = 'BASE TABLE' \
ORDER BY c.table_name, c.ordinal_position";

const PRIMARY_KEYS: &str = "\
SELECT tc.constraint_name::text, tc.table_name::text, k.column_name::text \
FROM information_schema.table_constraints tc \
JOIN information_schema.key_column_usage k \
  ON k.constraint_schema = tc.constraint_schema \
 AND k.constraint_name = tc.constraint_name \
 AND k.table_name = tc.table_name \
WHERE tc.table_schema = current_schema() AND tc.constraint_type = 'PRIMARY KEY' \
ORDER BY tc.table_name, k.ordinal_position";

const FOREIGN_KEYS: &str = "\
SELECT rc.constraint_name::text, kf.table_name::text, kf.column_name::text, \
       kt.table_name::text, kt.column_name::text \
FROM information_schema.referential_constraints rc \
JOIN information_schema.key_column_usage kf \
  ON kf.constraint_schema = rc.constraint_schema \
 AND kf.constraint_name = rc.constraint_name \
JOIN information_schema.key_column_usage kt \
  ON kt.constraint_schema = rc.unique_constraint_schema \
 AND kt.constraint_name = rc.unique_constraint_name \
 AND kt.ordinal_position = kf.position_in_unique_constraint \
WHERE rc.constraint_schema = current_schema() \
ORDER BY kf.table_name, rc.constraint_name, kf.ordinal_position";

/// Reads tables, keys and references of the current schema.
pub(crate) async fn introspect(client: &Client) -> Result<Introspection> {
    let columns = query(client, COLUMNS)
        .await?
        .iter()
        .map(|row| {
            Ok(ColumnRow {
                table: get(row, 0)?,
                column: get(row, 1)?,
                data_type: get(row, 2)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let primary_keys = query(client, PRIMARY_KEYS)
        .await?
        .iter()
        .map(|row| {
            Ok(PrimaryKeyRow {
                name: get(row, 0)?,
                table: get(row, 1)?,
                column: get(row, 2)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let foreign_keys = query(client, FOREIGN_KEYS)
        .await?
        .iter()
        .map(|row| {
            Ok(ForeignKeyRow {
                name: get(row, 0)?,
                from_table: get(row, 1)?,
                from_column: get(row, 2)?,
                to_table: get(row, 3)?,
                to_column: get(row, 4)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        columns = columns.len(),
        primary_keys = primary_keys.len(),
        foreign_keys = foreign_keys.len(),
        "introspected postgresql catalog"
    );

    Ok(Introspection {
        columns,
        primary_keys,
        foreign_keys,
    })
}

async fn query(client: &Client, sql: &str) -> Result<Vec<Row>> {
    client
        .query(sql, &[])
        .await
        .map_err(Error::driver_operation_failed)
}

fn get(row: &Row, index: usize) -> Result<String> {
    row.try_get(index).map_err(Error::driver_operation_failed)
}
