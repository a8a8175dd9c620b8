use super::{Comma, Formatter, Ident, Params, ToSql};

use relgraph_core::stmt;

/// The `FROM` clause of a view: the root source followed by its joins in
/// pre-order.
struct From<'a>(&'a stmt::JoinTree<stmt::Source, stmt::Join>);

impl ToSql for &stmt::View {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if let Some(cte) = &self.with {
            fmt!(f, cte " ");
        }

        let distinct = if self.distinct { "DISTINCT " } else { "" };
        fmt!(f, "SELECT " distinct Comma(&self.projection) " FROM " From(&self.from));

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        if let Some(limit) = &self.limit {
            fmt!(f, " LIMIT " limit);
        }

        if let Some(offset) = &self.offset {
            fmt!(f, " OFFSET " offset);
        }
    }
}

impl ToSql for &stmt::Cte {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let view = &*self.view;
        fmt!(f, "WITH " Ident(&self.name) " AS (" view ")");
    }
}

impl ToSql for From<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        for (_, join, source) in self.0.iter() {
            if let Some(join) = join {
                let kind = match join.kind {
                    stmt::JoinKind::Inner => " INNER JOIN ",
                    stmt::JoinKind::Left => " LEFT JOIN ",
                };
                let on = &join.on;
                fmt!(f, kind source " ON " on);
            } else {
                fmt!(f, source);
            }
        }
    }
}

impl ToSql for &stmt::Source {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let alias = &self.alias;
        fmt!(f, Ident(&self.table) " AS " alias);
    }
}

impl ToSql for &stmt::OrderBy {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let direction = match self.direction {
            stmt::Direction::Asc => " ASC",
            stmt::Direction::Desc => " DESC",
        };
        fmt!(f, &self.expr direction);
    }
}
