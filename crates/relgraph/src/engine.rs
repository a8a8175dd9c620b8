//! Translation of selections into statements, and of result rows back into
//! nested objects.

mod filter;
use filter::Filters;

mod mutation;
pub(crate) use mutation::Mutation;
pub use mutation::MutationKind;

pub(crate) mod naming;
use naming::FieldRef;

mod order;
use order::Orders;

pub(crate) mod query;
pub(crate) use query::{KeyFilter, Query};

mod selection;
pub use selection::Selection;
