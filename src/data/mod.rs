//! Core data structures: terms, clauses, the clause database, and binding
//! environments.

pub mod bindings;
pub mod database;
pub mod rule;
pub mod term;

pub use bindings::Bindings;
pub use database::Database;
pub use rule::Rule;
pub use term::{
    collect_variables, Atom, Compound, Part, PartKind, ScopeId, Variable,
    LIST_FUNCTOR,
};
