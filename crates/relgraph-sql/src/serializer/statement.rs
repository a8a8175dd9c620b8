use super::{Comma, Formatter, Ident, Params, ToSql};

use relgraph_core::stmt;

/// ` RETURNING "a", "b"`, or nothing for an empty list.
struct Returning<'a>(&'a [String]);

/// A comma separated list of quoted column names.
struct Columns<'a>(&'a [String]);

impl ToSql for &stmt::Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            stmt::Statement::Query(view) => view.to_sql(f),
            stmt::Statement::Insert(stmt) => stmt.to_sql(f),
            stmt::Statement::Update(stmt) => stmt.to_sql(f),
            stmt::Statement::Delete(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "INSERT INTO " Ident(&self.table));

        if self.columns.is_empty() {
            fmt!(f, " DEFAULT VALUES");
        } else {
            fmt!(f, " (" Columns(&self.columns) ") VALUES (" Comma(&self.values) ")");
        }

        if let Some(on_conflict) = &self.on_conflict {
            fmt!(f, " " on_conflict);
        }

        fmt!(f, Returning(&self.returning));
    }
}

impl ToSql for &stmt::OnConflict {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let assignments = Comma(self.update.iter().map(Excluded));

        fmt!(f, "ON CONFLICT (" Columns(&self.target) ") DO UPDATE SET " assignments);
    }
}

/// `"c" = excluded."c"`
struct Excluded<'a>(&'a String);

impl ToSql for Excluded<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(self.0) " = excluded." Ident(self.0));
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let filter = &self.filter;
        fmt!(
            f, "UPDATE " Ident(&self.table) " SET " Comma(&self.assignments) " WHERE " filter
            Returning(&self.returning)
        );
    }
}

impl ToSql for &stmt::Assignment {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let value = &self.value;
        fmt!(f, Ident(&self.column) " = " value);
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let filter = &self.filter;
        fmt!(f, "DELETE FROM " Ident(&self.table) " WHERE " filter Returning(&self.returning));
    }
}

impl ToSql for Returning<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if !self.0.is_empty() {
            fmt!(f, " RETURNING " Columns(self.0));
        }
    }
}

impl ToSql for Columns<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Comma(self.0.iter().map(Ident)));
    }
}
