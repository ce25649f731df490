//! Lexer, AST, structural validator, and parser for bare-script (§3, §4).
//!
//! This crate only turns text into a validated [`ast::Script`] / [`ast::Expr`]
//! — it has no notion of values or evaluation. That lives in
//! `barescript-runtime`, which depends on this crate the way `lumen-vm`
//! depends on `lumen-compiler`.

pub mod ast;
mod lexer;
mod lines;
mod parser;
mod tokens;
mod validate;

pub use ast::{BinOp, Expr, Script, Stmt, UnaryOp};
pub use lexer::LexError;
pub use parser::{parse_expression, parse_script, ParseError};
pub use validate::{validate_script, StructuralError};
