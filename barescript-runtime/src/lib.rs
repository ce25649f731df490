//! Standard library, evaluators (sync + async), and host interface for
//! barescript (C4/C5/C6/C7, spec §4.4–§4.7).
//!
//! This crate depends on `barescript-compiler` for the AST and re-exports
//! its parsing entry points alongside its own evaluator entry points, so
//! callers only need one crate for "parse and run a script" (§6 Public
//! API).

pub mod error;
pub mod eval_async;
pub mod eval_sync;
pub mod host;
pub mod stdlib;
pub mod value;

pub use barescript_compiler::{parse_expression, parse_script, Expr, ParseError, Script, StructuralError};
pub use error::RuntimeError;
pub use eval_async::{evaluate_expression_async, execute_script_async};
pub use eval_sync::{evaluate_expression, execute_script, Locals};
pub use host::{FetchOutcome, FetchRequest, HostOptions, HostRef};
pub use value::{new_globals, Globals, UserFunction, Value};
