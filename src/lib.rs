//! Horn-clause logic programming engine.
//!
//! Programs are sets of facts and rules over first-order terms; queries are
//! conjunctions of goals answered by SLD resolution with unification,
//! chronological backtracking, and cut. The search runs as an explicit state
//! machine and hands out solutions one at a time through a pull iterator.
//!
//! ```
//! use hornlog::{parse_program, parse_query, query, Database, Settings};
//!
//! let db = Database::from_rules(parse_program("
//!     parent(tom, bob).
//!     parent(bob, ann).
//!     grandparent(X, Z) :- parent(X, Y), parent(Y, Z).
//! ").unwrap());
//! let goals = parse_query("grandparent(tom, Who).").unwrap();
//! let mut solutions = query(&db, &goals, Settings::default());
//! assert!(solutions.next_solution().unwrap());
//! assert_eq!(solutions.current().unwrap()["Who"].to_string(), "ann");
//! ```

pub mod config;
pub mod data;
pub mod parser;
pub mod solver;

pub use config::{Settings, SolveStats};
pub use data::{
    collect_variables, Atom, Bindings, Compound, Database, Part, PartKind,
    Rule, ScopeId, Variable,
};
pub use parser::{parse_program, parse_query, ParseError, Token, Tokeniser};
pub use solver::{query, unify, SolveError, Solutions, Value};
