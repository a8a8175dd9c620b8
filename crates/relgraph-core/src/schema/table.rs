use super::{Column, ForeignKey, PrimaryKey};

use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,

    /// Columns keyed by name, in declaration order
    pub columns: IndexMap<String, Column>,

    pub primary_key: Option<PrimaryKey>,

    /// Foreign keys whose referencing columns live on this table
    pub outgoing: Vec<Arc<ForeignKey>>,

    /// Foreign keys referencing this table
    pub incoming: Vec<Arc<ForeignKey>>,
}

impl Table {
    pub(crate) fn new(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            columns: IndexMap::new(),
            primary_key: None,
            outgoing: vec![],
            incoming: vec![],
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Primary key columns, empty when the table has no key.
    pub fn primary_key_columns(&self) -> &[String] {
        self.primary_key
            .as_ref()
            .map(|pk| &pk.columns[..])
            .unwrap_or(&[])
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key_columns().iter().any(|c| c == column)
    }

    /// Finds an outgoing foreign key by name.
    pub fn outgoing(&self, name: &str) -> Option<&Arc<ForeignKey>> {
        self.outgoing.iter().find(|fk| fk.name == name)
    }

    /// Finds an incoming foreign key by its reverse relation name.
    pub fn incoming(&self, reverse_name: &str) -> Option<&Arc<ForeignKey>> {
        let name = reverse_name.strip_suffix("_reverse")?;
        self.incoming.iter().find(|fk| fk.name == name)
    }
}
