/// A foreign key constraint.
///
/// Navigated forward (`from_table` to `to_table`) it reaches at most one row.
/// Navigated in reverse it reaches any number of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub from_table: String,
    pub to_table: String,

    /// Column pairs in constraint order
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Referencing column on `from_table`
    pub from: String,

    /// Referenced column on `to_table`
    pub to: String,
}

impl ForeignKey {
    pub fn from_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.matches.iter().map(|m| m.from.as_str())
    }

    pub fn to_columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.matches.iter().map(|m| m.to.as_str())
    }

    /// Name of the relation when navigated from `to_table` back to `from_table`.
    pub fn reverse_name(&self) -> String {
        format!("{}_reverse", self.name)
    }
}
