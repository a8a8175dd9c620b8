use super::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of expressions. Renders as an always-true predicate when empty.
    And(Vec<Expr>),

    /// OR a set of expressions. Renders as an always-false predicate when empty.
    Or(Vec<Expr>),

    BinaryOp(ExprBinaryOp),

    /// A column reference, optionally qualified by a table alias
    Column(ExprColumn),

    /// The row proposed for insertion in an `ON CONFLICT DO UPDATE` clause
    Excluded(String),

    InList(ExprInList),

    IsNull(ExprIsNull),

    /// A bound parameter
    Value(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprBinaryOp {
    pub lhs: Box<Expr>,
    pub op: BinaryOp,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprColumn {
    /// Alias of the table the column belongs to. `None` in single-table DML.
    pub table: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,
    pub list: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprIsNull {
    pub expr: Box<Expr>,
    pub negate: bool,
}

impl Expr {
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Expr {
        Expr::Column(ExprColumn {
            table: Some(table.into()),
            name: name.into(),
        })
    }

    /// A column of the statement's only table.
    pub fn bare_column(name: impl Into<String>) -> Expr {
        Expr::Column(ExprColumn {
            table: None,
            name: name.into(),
        })
    }

    pub fn value(value: impl Into<Value>) -> Expr {
        Expr::Value(value.into())
    }

    pub fn binary_op(lhs: impl Into<Expr>, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        Expr::BinaryOp(ExprBinaryOp {
            lhs: Box::new(lhs.into()),
            op,
            rhs: Box::new(rhs.into()),
        })
    }

    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        Expr::binary_op(lhs, BinaryOp::Eq, rhs)
    }

    pub fn in_list(expr: impl Into<Expr>, list: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::InList(ExprInList {
            expr: Box::new(expr.into()),
            list: list.into_iter().collect(),
        })
    }

    pub fn is_null(expr: impl Into<Expr>) -> Expr {
        Expr::IsNull(ExprIsNull {
            expr: Box::new(expr.into()),
            negate: false,
        })
    }

    /// Builds the predicate for a value list.
    ///
    /// No values matches `NULL`, a single value is compared with `=` and more
    /// values become an `IN` list. A `NULL` inside a list is matched with
    /// `IS NULL`.
    pub fn any_of(expr: Expr, values: Vec<Value>) -> Expr {
        let (nulls, values): (Vec<_>, Vec<_>) = values.into_iter().partition(Value::is_null);

        let matches = match values.len() {
            0 => return Expr::is_null(expr),
            1 => {
                let value = values.into_iter().next().unwrap_or_default();
                Expr::eq(expr.clone(), value)
            }
            _ => Expr::in_list(expr.clone(), values.into_iter().map(Expr::Value)),
        };

        if nulls.is_empty() {
            matches
        } else {
            Expr::or([matches, Expr::is_null(expr)])
        }
    }

    /// Combines expressions with AND, flattening nested conjunctions.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        let mut operands = vec![];
        for expr in exprs {
            match expr {
                Expr::And(nested) => operands.extend(nested),
                expr => operands.push(expr),
            }
        }

        if operands.len() == 1 {
            operands.pop().unwrap_or(Expr::And(vec![]))
        } else {
            Expr::And(operands)
        }
    }

    /// Combines expressions with OR, flattening nested disjunctions.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        let mut operands = vec![];
        for expr in exprs {
            match expr {
                Expr::Or(nested) => operands.extend(nested),
                expr => operands.push(expr),
            }
        }

        if operands.len() == 1 {
            operands.pop().unwrap_or(Expr::Or(vec![]))
        } else {
            Expr::Or(operands)
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Value(value)
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Self {
        Expr::Column(value)
    }
}
