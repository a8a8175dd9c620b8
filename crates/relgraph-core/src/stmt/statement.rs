use super::{Delete, Insert, Update, View};

#[derive(Debug, Clone)]
pub enum Statement {
    Query(View),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// Number of columns each returned row has, `None` when the statement
    /// only reports a row count.
    pub fn returning_len(&self) -> Option<usize> {
        match self {
            Statement::Query(view) => Some(view.projection.len()),
            Statement::Insert(stmt) => non_empty(&stmt.returning),
            Statement::Update(stmt) => non_empty(&stmt.returning),
            Statement::Delete(stmt) => non_empty(&stmt.returning),
        }
    }
}

fn non_empty(returning: &[String]) -> Option<usize> {
    (!returning.is_empty()).then_some(returning.len())
}

impl From<View> for Statement {
    fn from(value: View) -> Self {
        Statement::Query(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
