//! `RuntimeError` (§7): the evaluator's terminal, unwinding error kind.
//!
//! Every variant that spec §8 tests against pins its exact `#[error("...")]`
//! template so the message stays byte-identical across refactors — no
//! variant is built from a dynamic format string for those cases.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Exceeded maximum script statements ({0})")]
    StatementBudgetExceeded(u64),

    #[error("Unknown jump label")]
    UnknownJumpLabel,

    #[error("Include within non-async scope")]
    IncludeInNonAsyncScope,

    #[error("Include \"{0}\" is reserved but unimplemented")]
    IncludeUnimplemented(String),

    #[error("Async function \"{0}\" in non-async scope")]
    AsyncFunctionInNonAsyncScope(String),

    #[error("Undefined function \"{0}\"")]
    UndefinedFunction(String),

    #[error("Maximum call recursion depth exceeded")]
    RecursionLimitExceeded,
}
