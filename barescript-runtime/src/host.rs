//! Host Interface (C7, spec §4.7).
//!
//! A `HostOptions` is the only configuration surface the language itself
//! exposes. It is deliberately tolerant: every hook is optional and the
//! evaluator must run against a fully empty host (spec §4.7).

use crate::value::{new_globals, Globals};
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// The result of one fetch attempt, prior to JSON/text decoding.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: u16,
    pub body: String,
}

/// `fetchFn` (§4.7): takes an already url-rewritten URL and returns the raw
/// response, or an error message on network failure. JSON-vs-text decoding
/// and the `isText` flag are handled by the `fetch` built-in itself, not by
/// this hook, so a host override only ever needs to speak HTTP.
pub type FetchFn = Rc<dyn Fn(FetchRequest) -> LocalBoxFuture<'static, Result<FetchOutcome, String>>>;
pub type LogFn = Rc<dyn Fn(&str)>;
pub type UrlFn = Rc<dyn Fn(&str) -> String>;

#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    pub url: String,
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Clone)]
pub struct HostOptions {
    pub fetch_fn: Option<FetchFn>,
    pub log_fn: Option<LogFn>,
    pub url_fn: Option<UrlFn>,
    pub globals: Globals,
    /// `maxStatements`; `0` disables the check (§3, §4.5).
    pub max_statements: u64,
    pub statement_count: Rc<Cell<u64>>,
}

impl fmt::Debug for HostOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostOptions")
            .field("max_statements", &self.max_statements)
            .field("statement_count", &self.statement_count.get())
            .field("has_fetch_fn", &self.fetch_fn.is_some())
            .field("has_log_fn", &self.log_fn.is_some())
            .field("has_url_fn", &self.url_fn.is_some())
            .finish()
    }
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            fetch_fn: None,
            log_fn: None,
            url_fn: None,
            globals: new_globals(),
            max_statements: 10_000_000,
            statement_count: Rc::new(Cell::new(0)),
        }
    }
}

impl HostOptions {
    pub fn log(&self, text: &str) {
        if let Some(f) = &self.log_fn {
            f(text);
        } else {
            tracing::debug!(target: "barescript::script_log", "{text}");
        }
    }

    pub fn rewrite_url(&self, url: &str) -> String {
        match &self.url_fn {
            Some(f) => f(url),
            None => url.to_string(),
        }
    }
}

/// Shared handle to a [`HostOptions`], threaded through every recursive
/// evaluator call (§3: "Globals is created lazily ... and shared by any
/// user functions defined within that execution").
pub type HostRef = Rc<HostOptions>;
