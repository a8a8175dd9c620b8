use crate::stmt;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Execute a SQL statement
    QuerySql(QuerySql),
}

#[derive(Debug, Clone)]
pub struct QuerySql {
    /// The statement to render and execute
    pub stmt: stmt::Statement,

    /// Value type of each returned column, `None` when the statement
    /// returns no rows
    pub ret: Option<Vec<stmt::Type>>,
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::QuerySql(value)
    }
}
