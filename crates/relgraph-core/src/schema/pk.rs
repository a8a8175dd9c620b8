#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    pub name: String,
    pub table: String,

    /// Key columns in key order
    pub columns: Vec<String>,
}
