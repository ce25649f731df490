//! Miscellaneous group (§4.4). `if` and `fetch` are not here: `if` is
//! special-cased by the evaluator (§4.5) and `fetch` is dispatched
//! separately by the async evaluator (see [`super::ASYNC_ONLY_BUILTINS`]).

use super::arg;
use crate::host::HostRef;
use crate::value::Value;

pub fn debug_log(args: &[Value], host: &HostRef) -> Value {
    host.log(&arg(args, 0).stringify());
    Value::Null
}

pub fn get_global(args: &[Value], host: &HostRef) -> Value {
    match args.first().and_then(Value::as_str) {
        Some(name) => host.globals.borrow().get(name).cloned().unwrap_or(Value::Null),
        None => Value::Null,
    }
}

pub fn set_global(args: &[Value], host: &HostRef) -> Value {
    let Some(name) = args.first().and_then(Value::as_str) else { return Value::Null };
    let value = arg(args, 1);
    host.globals.borrow_mut().insert(name.to_string(), value);
    Value::Null
}

/// Reserved characters `encodeURI` leaves untouched that
/// `encodeURIComponent` does not (both spare `-_.~()'*` plus alphanumerics).
const URI_RESERVED: &str = "!#$&,/:;=?@";

fn percent_encode(s: &str, reserved: &str, extra_close_paren: bool) -> String {
    let mut out = String::new();
    for b in s.bytes() {
        let c = b as char;
        let spared = c.is_ascii_alphanumeric() || "-_.~!*'()".contains(c) || reserved.contains(c);
        if spared && !(c == ')' && extra_close_paren) {
            out.push(c);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// `encodeURI` (§4.4): when `extra` is true also percent-encodes `)`.
pub fn encode_uri(args: &[Value]) -> Value {
    let Some(s) = args.first().and_then(Value::as_str) else { return Value::Null };
    let extra = args.get(1).map(Value::truthy).unwrap_or(true);
    Value::str(percent_encode(s, URI_RESERVED, extra))
}

pub fn encode_uri_component(args: &[Value]) -> Value {
    let Some(s) = args.first().and_then(Value::as_str) else { return Value::Null };
    let extra = args.get(1).map(Value::truthy).unwrap_or(true);
    Value::str(percent_encode(s, "", extra))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uri_component_escapes_close_paren_when_extra() {
        let out = encode_uri_component(&[Value::str("a(b)"), Value::Boolean(true)]);
        assert!(matches!(out, Value::String(s) if &*s == "a(b%29"));
    }

    #[test]
    fn encode_uri_component_leaves_parens_when_not_extra() {
        let out = encode_uri_component(&[Value::str("a(b)"), Value::Boolean(false)]);
        assert!(matches!(out, Value::String(s) if &*s == "a(b)"));
    }
}
