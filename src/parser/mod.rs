//! Clause and query parsing.

mod lexer;
mod rules;

pub use lexer::{ParseError, Token, Tokeniser};
pub use rules::{parse_program, parse_query};
