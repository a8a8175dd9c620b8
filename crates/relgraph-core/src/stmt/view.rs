use super::{Expr, JoinTree};

/// A `SELECT` over a tree of joined tables.
#[derive(Debug, Clone)]
pub struct View {
    /// Common table expression the root of `from` may refer to
    pub with: Option<Cte>,

    /// Tables being joined. The root is the `FROM` source and every other
    /// node is joined in pre-order.
    pub from: JoinTree<Source, Join>,

    pub filter: Option<Expr>,

    pub order_by: Vec<OrderBy>,

    /// Selected expressions, read back positionally
    pub projection: Vec<Expr>,

    pub distinct: bool,

    pub limit: Option<Expr>,

    pub offset: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Cte {
    pub name: String,
    pub view: Box<View>,
}

/// A table (or CTE) with the alias it is referred to by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub table: String,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub on: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl View {
    /// An unfiltered view over a single table.
    pub fn new(table: impl Into<String>, alias: impl Into<String>) -> View {
        View {
            with: None,
            from: JoinTree::new(Source {
                table: table.into(),
                alias: alias.into(),
            }),
            filter: None,
            order_by: vec![],
            projection: vec![],
            distinct: false,
            limit: None,
            offset: None,
        }
    }
}

impl Direction {
    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "ASC" | "asc" => Some(Direction::Asc),
            "DESC" | "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}
