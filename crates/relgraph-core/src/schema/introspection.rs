/// Raw catalog rows reported by a driver.
#[derive(Debug, Clone, Default)]
pub struct Introspection {
    /// Ordered by table, then column position
    pub columns: Vec<ColumnRow>,

    /// Ordered by table, then key position
    pub primary_keys: Vec<PrimaryKeyRow>,

    /// Ordered by constraint, then column position
    pub foreign_keys: Vec<ForeignKeyRow>,
}

#[derive(Debug, Clone)]
pub struct ColumnRow {
    pub table: String,
    pub column: String,
    pub data_type: String,
}

#[derive(Debug, Clone)]
pub struct PrimaryKeyRow {
    pub name: String,
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone)]
pub struct ForeignKeyRow {
    pub name: String,
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl ColumnRow {
    pub fn new(table: &str, column: &str, data_type: &str) -> ColumnRow {
        ColumnRow {
            table: table.to_string(),
            column: column.to_string(),
            data_type: data_type.to_string(),
        }
    }
}

impl PrimaryKeyRow {
    pub fn new(name: &str, table: &str, column: &str) -> PrimaryKeyRow {
        PrimaryKeyRow {
            name: name.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}

impl ForeignKeyRow {
    pub fn new(
        name: &str,
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) -> ForeignKeyRow {
        ForeignKeyRow {
            name: name.to_string(),
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
        }
    }
}
