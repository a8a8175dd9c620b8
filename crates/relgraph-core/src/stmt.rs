mod delete;
pub use delete::Delete;

mod expr;
pub use expr::{BinaryOp, Expr, ExprBinaryOp, ExprColumn, ExprInList, ExprIsNull};

mod insert;
pub use insert::{Insert, OnConflict};

mod join_tree;
pub use join_tree::{JoinTree, Path};

mod statement;
pub use statement::Statement;

mod ty;
pub use ty::Type;

mod update;
pub use update::{Assignment, Update};

mod value;
pub use value::Value;

mod value_record;
pub use value_record::ValueRecord;

mod view;
pub use view::{Cte, Direction, Join, JoinKind, OrderBy, Source, View};
