//! Runtime value model (C1, spec §3/§4.1).
//!
//! `Array`/`Object` are `Rc<RefCell<...>>` and `Function` is `Rc<UserFunction>`
//! so that "by identity" equality (§3) falls out of `Rc::ptr_eq` — the same
//! trick the teacher uses with `Arc`-wrapped `List`/`Map` in
//! `lumen-vm/src/values.rs`, just single-threaded here since the async
//! evaluator is cooperative and never crosses an OS thread (see DESIGN.md).

use barescript_compiler::Stmt;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

pub type Globals = Rc<RefCell<IndexMap<String, Value>>>;
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

pub fn new_globals() -> Globals {
    Rc::new(RefCell::new(IndexMap::new()))
}

/// A user-defined function (`function ... endfunction`, §4.5). Closes over
/// the `Globals` of the execution it was defined in, per spec §3.
pub struct UserFunction {
    pub name: String,
    pub is_async: bool,
    pub params: Vec<String>,
    pub body: Rc<[Stmt]>,
    pub globals: Globals,
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name)
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Datetime(DateTime<Utc>),
    Array(ArrayRef),
    Object(ObjectRef),
    Regex(Rc<regex::Regex>),
    Function(Rc<UserFunction>),
}

impl Value {
    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn array(v: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(v)))
    }

    pub fn object(m: IndexMap<String, Value>) -> Value {
        Value::Object(Rc::new(RefCell::new(m)))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// `typeOf` (§4.1).
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Datetime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Regex(_) => "regex",
            Value::Function(_) => "function",
        }
    }

    /// `truthy` (§4.1).
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Structural/identity equality per §3: Null/Boolean/Number/String
    /// structural, Datetime by instant, everything else by identity.
    pub fn value_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Datetime(a), Value::Datetime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Regex(a), Value::Regex(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `compare` (§3/§4.1): Null sorts last; Datetime by instant; Number and
    /// String by natural order. Mixed non-null types fall back to a stable
    /// (but deliberately unspecified, per §3) rank so sorts stay
    /// deterministic without claiming a total order across types.
    pub fn compare(&self, other: &Value) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Datetime(a), Value::Datetime(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Boolean(_) => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Datetime(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
            Value::Regex(_) => 6,
            Value::Function(_) => 7,
            Value::Null => 8,
        }
    }

    /// Display form used by `stringNew`/string concatenation (§4.4 `new`).
    pub fn stringify(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => barescript_core::numfmt::format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Datetime(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Value::Regex(r) => format!("/{}/", r.as_str()),
            Value::Function(f) => format!("<function {}>", f.name),
            Value::Array(_) | Value::Object(_) => self.to_json().to_string(),
        }
    }

    /// Conversion to `serde_json::Value` for `jsonStringify`/display. Object
    /// keys come out sorted because `serde_json`'s default `Map` backing is a
    /// `BTreeMap` (the `preserve_order` cargo feature is not enabled) —
    /// that's what gives `jsonStringify` its determinism (§8 property 7)
    /// without any extra sorting pass here.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Datetime(dt) => {
                serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(a) => {
                serde_json::Value::Array(a.borrow().iter().map(Value::to_json).collect())
            }
            Value::Object(o) => serde_json::Value::Object(
                o.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Regex(_) | Value::Function(_) => serde_json::Value::Null,
        }
    }

    /// The inverse of [`Value::to_json`], used by `jsonParse`.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::str(s.as_str()),
            serde_json::Value::Array(a) => Value::array(a.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(o) => Value::object(
                o.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// `+` on mixed types (§4.5): string+string concatenates, number+number
/// adds, anything else concatenates the stringified operands *unless* one
/// side is Null and the other is Number, which the source reports as NaN.
pub fn numeric_or_concat_add(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Value::str(format!("{x}{y}")),
        (Value::Number(x), Value::Number(y)) => Value::Number(x + y),
        (Value::Null, Value::Number(_)) | (Value::Number(_), Value::Null) => {
            Value::Number(f64::NAN)
        }
        _ => Value::str(format!("{}{}", a.stringify(), b.stringify())),
    }
}

thread_local! {
    static RECURSION_DEPTH: Cell<u32> = Cell::new(0);
}

/// Ambient recursion guard shared by both evaluators (§9 design note: "AST
/// recursion depth can exceed reasonable stack on hostile input"). Returns a
/// guard that decrements on drop so the limit is exception-safe across
/// `RuntimeError` unwinding.
pub struct RecursionGuard;

impl RecursionGuard {
    pub const LIMIT: u32 = 2048;

    pub fn enter() -> Option<Self> {
        RECURSION_DEPTH.with(|d| {
            if d.get() >= Self::LIMIT {
                None
            } else {
                d.set(d.get() + 1);
                Some(RecursionGuard)
            }
        })
    }
}

impl Drop for RecursionGuard {
    fn drop(&mut self) {
        RECURSION_DEPTH.with(|d| d.set(d.get() - 1));
    }
}
