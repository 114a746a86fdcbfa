//! The resolution engine: renaming, unification, arithmetic, the search
//! machine, and the query API.

mod eval;
mod machine;
mod query;
mod rename;
mod unify;

pub use machine::SolveError;
pub use query::{query, Solutions, Value};
pub use unify::unify;
