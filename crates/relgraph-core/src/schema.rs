mod builder;
pub use builder::Builder;

mod column;
pub use column::{Column, DataType};

mod fk;
pub use fk::{ForeignKey, Match};

mod introspection;
pub use introspection::{ColumnRow, ForeignKeyRow, Introspection, PrimaryKeyRow};

mod mapping;
pub use mapping::{ColumnMapping, Scalar, TypeMapping};

mod pk;
pub use pk::PrimaryKey;

mod table;
pub use table::Table;

use indexmap::IndexMap;

/// Database product the schema was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Sqlite,
    Postgresql,
}

/// Immutable model of the introspected tables.
#[derive(Debug)]
pub struct Schema {
    pub vendor: Vendor,

    /// Tables keyed by name, in introspection order
    pub tables: IndexMap<String, Table>,

    /// Column type mapping for `vendor`
    pub mapping: TypeMapping,
}

impl Schema {
    pub fn builder(vendor: Vendor) -> Builder {
        Builder::new(vendor)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Returns the mapping for a column, `None` when its type is unsupported.
    pub fn mapping(&self, column: &Column) -> Option<&ColumnMapping> {
        self.mapping.get(&column.data_type)
    }

    /// Columns of `table` that have a supported type, in declaration order.
    pub fn mapped_columns<'a>(
        &'a self,
        table: &'a Table,
    ) -> impl Iterator<Item = (&'a Column, &'a ColumnMapping)> + 'a {
        table
            .columns
            .values()
            .filter_map(move |column| Some((column, self.mapping(column)?)))
    }
}
