//! Schema group (§4.4): "delegate to the schema-markdown external
//! collaborator; ... part of the library surface but not part of the core
//! design, and may be stubbed." Out of scope per spec.md §1 (schema
//! validation is an external collaborator) — these are present so the
//! name `schemaValidate(...)` resolves rather than raising
//! `RuntimeError::UndefinedFunction`, matching the real library's surface,
//! but always return `Null` since no schema-markdown collaborator is wired
//! in this crate.

use crate::value::Value;

pub fn parse(_args: &[Value]) -> Value {
    Value::Null
}

pub fn type_model(_args: &[Value]) -> Value {
    Value::Null
}

pub fn validate(_args: &[Value]) -> Value {
    Value::Null
}

pub fn validate_type_model(_args: &[Value]) -> Value {
    Value::Null
}
