use super::{Comma, Delimited, Formatter, Ident, Params, ToSql};

use relgraph_core::stmt;

/// Operand of `AND`/`OR`. Nested boolean operators get parentheses.
struct Operand<'a>(&'a stmt::Expr);

impl ToSql for &stmt::Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use stmt::Expr::*;

        match self {
            And(operands) if operands.is_empty() => fmt!(f, "1 = 1"),
            And(operands) => {
                fmt!(f, Delimited(operands.iter().map(Operand), " AND "));
            }
            Or(operands) if operands.is_empty() => fmt!(f, "1 = 0"),
            Or(operands) => {
                fmt!(f, Delimited(operands.iter().map(Operand), " OR "));
            }
            BinaryOp(expr) => {
                fmt!(f, expr.lhs " " expr.op " " expr.rhs);
            }
            Column(expr) => expr.to_sql(f),
            Excluded(column) => {
                fmt!(f, "excluded." Ident(column));
            }
            InList(expr) if expr.list.is_empty() => fmt!(f, "1 = 0"),
            InList(expr) => {
                fmt!(f, expr.expr " IN (" Comma(&expr.list) ")");
            }
            IsNull(expr) => {
                let op = if expr.negate { " IS NOT NULL" } else { " IS NULL" };
                fmt!(f, expr.expr op);
            }
            Value(value) => value.to_sql(f),
        }
    }
}

impl ToSql for &stmt::ExprColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if let Some(table) = &self.table {
            fmt!(f, table ".");
        }

        fmt!(f, Ident(&self.name));
    }
}

impl ToSql for Operand<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.0 {
            stmt::Expr::And(operands) | stmt::Expr::Or(operands) if !operands.is_empty() => {
                fmt!(f, "(" self.0 ")");
            }
            expr => expr.to_sql(f),
        }
    }
}

impl ToSql for &stmt::BinaryOp {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push_str(match self {
            stmt::BinaryOp::Eq => "=",
            stmt::BinaryOp::Ne => "<>",
            stmt::BinaryOp::Gt => ">",
            stmt::BinaryOp::Ge => ">=",
            stmt::BinaryOp::Lt => "<",
            stmt::BinaryOp::Le => "<=",
            stmt::BinaryOp::Like => "LIKE",
        })
    }
}
