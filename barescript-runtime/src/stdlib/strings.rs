//! String group (§4.4).

use super::arg;
use crate::error::RuntimeError;
use crate::host::HostRef;
use crate::value::Value;

fn as_str(args: &[Value], i: usize) -> Option<String> {
    args.get(i).and_then(Value::as_str).map(str::to_owned)
}

pub fn length(args: &[Value]) -> Value {
    match as_str(args, 0) {
        Some(s) => Value::Number(s.chars().count() as f64),
        None => Value::Null,
    }
}

pub fn lower(args: &[Value]) -> Value {
    match as_str(args, 0) {
        Some(s) => Value::str(s.to_lowercase()),
        None => Value::Null,
    }
}

pub fn upper(args: &[Value]) -> Value {
    match as_str(args, 0) {
        Some(s) => Value::str(s.to_uppercase()),
        None => Value::Null,
    }
}

pub fn trim(args: &[Value]) -> Value {
    match as_str(args, 0) {
        Some(s) => Value::str(s.trim().to_string()),
        None => Value::Null,
    }
}

pub fn starts_with(args: &[Value]) -> Value {
    match (as_str(args, 0), as_str(args, 1)) {
        (Some(s), Some(p)) => Value::Boolean(s.starts_with(&p)),
        _ => Value::Null,
    }
}

pub fn ends_with(args: &[Value]) -> Value {
    match (as_str(args, 0), as_str(args, 1)) {
        (Some(s), Some(p)) => Value::Boolean(s.ends_with(&p)),
        _ => Value::Null,
    }
}

pub fn index_of(args: &[Value]) -> Value {
    match (as_str(args, 0), as_str(args, 1)) {
        (Some(s), Some(needle)) => match s.find(&needle) {
            Some(byte_idx) => Value::Number(s[..byte_idx].chars().count() as f64),
            None => Value::Number(-1.0),
        },
        _ => Value::Null,
    }
}

pub fn last_index_of(args: &[Value]) -> Value {
    match (as_str(args, 0), as_str(args, 1)) {
        (Some(s), Some(needle)) => match s.rfind(&needle) {
            Some(byte_idx) => Value::Number(s[..byte_idx].chars().count() as f64),
            None => Value::Number(-1.0),
        },
        _ => Value::Null,
    }
}

pub fn char_code_at(args: &[Value]) -> Value {
    let (Some(s), Some(i)) = (as_str(args, 0), args.get(1).and_then(Value::as_number)) else {
        return Value::Null;
    };
    match s.chars().nth(i as usize) {
        Some(c) => Value::Number(c as u32 as f64),
        None => Value::Null,
    }
}

pub fn from_char_code(args: &[Value]) -> Value {
    let mut out = String::new();
    for a in args {
        match a.as_number().and_then(|n| char::from_u32(n as u32)) {
            Some(c) => out.push(c),
            None => return Value::Null,
        }
    }
    Value::str(out)
}

pub fn repeat(args: &[Value]) -> Value {
    let (Some(s), Some(n)) = (as_str(args, 0), args.get(1).and_then(Value::as_number)) else {
        return Value::Null;
    };
    if n < 0.0 || !n.is_finite() {
        return Value::Null;
    }
    Value::str(s.repeat(n as usize))
}

pub fn slice(args: &[Value]) -> Value {
    let Some(s) = as_str(args, 0) else { return Value::Null };
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let norm = |n: i64| -> usize {
        let n = if n < 0 { (len + n).max(0) } else { n.min(len) };
        n as usize
    };
    let begin = args.get(1).and_then(Value::as_number).map(|n| n as i64).unwrap_or(0);
    let end = args.get(2).and_then(Value::as_number).map(|n| n as i64).unwrap_or(len);
    let (b, e) = (norm(begin), norm(end));
    if b >= e {
        return Value::str("");
    }
    Value::str(chars[b..e].iter().collect::<String>())
}

pub fn split(args: &[Value]) -> Value {
    let (Some(s), Some(sep)) = (as_str(args, 0), as_str(args, 1)) else {
        return Value::Null;
    };
    let limit = args.get(2).and_then(Value::as_number).map(|n| n as usize);
    let mut parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::str(c.to_string())).collect()
    } else {
        s.split(sep.as_str()).map(Value::str).collect()
    };
    if let Some(limit) = limit {
        parts.truncate(limit);
    }
    Value::array(parts)
}

pub fn new_string(args: &[Value]) -> Value {
    Value::str(arg(args, 0).stringify())
}

/// `stringReplace` (§4.4): `pattern` is a string or [`Value::Regex`];
/// `replacement` is a string or a script function called with the match
/// groups plus the host (§9 design note).
pub fn replace(args: &[Value], host: &HostRef) -> Result<Value, RuntimeError> {
    let Some(s) = as_str(args, 0) else { return Ok(Value::Null) };
    let pattern = arg(args, 0 + 1);
    let replacement = arg(args, 2);

    match &pattern {
        Value::String(pat) => {
            let replaced = match &replacement {
                Value::String(r) => s.replacen(pat.as_ref(), r, 1),
                Value::Function(f) => {
                    if let Some(byte_idx) = s.find(pat.as_ref()) {
                        let matched = &s[byte_idx..byte_idx + pat.len()];
                        let call_args = vec![Value::str(matched)];
                        let replacement_value =
                            crate::eval_sync::call_user_function(f, &call_args, host)?;
                        format!(
                            "{}{}{}",
                            &s[..byte_idx],
                            replacement_value.stringify(),
                            &s[byte_idx + pat.len()..]
                        )
                    } else {
                        s.clone()
                    }
                }
                _ => return Ok(Value::Null),
            };
            Ok(Value::str(replaced))
        }
        Value::Regex(re) => {
            let replaced = match &replacement {
                Value::String(r) => re.replace(&s, r.as_ref()).into_owned(),
                Value::Function(f) => {
                    if let Some(caps) = re.captures(&s) {
                        let whole = caps.get(0).unwrap();
                        let mut call_args: Vec<Value> = caps
                            .iter()
                            .skip(1)
                            .map(|m| m.map(|m| Value::str(m.as_str())).unwrap_or(Value::Null))
                            .collect();
                        call_args.insert(0, Value::str(whole.as_str()));
                        let replacement_value =
                            crate::eval_sync::call_user_function(f, &call_args, host)?;
                        format!(
                            "{}{}{}",
                            &s[..whole.start()],
                            replacement_value.stringify(),
                            &s[whole.end()..]
                        )
                    } else {
                        s.clone()
                    }
                }
                _ => return Ok(Value::Null),
            };
            Ok(Value::str(replaced))
        }
        _ => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_supports_negative_indices() {
        let args = vec![Value::str("hello"), Value::Number(-3.0)];
        assert!(matches!(slice(&args), Value::String(s) if &*s == "llo"));
    }

    #[test]
    fn split_respects_limit() {
        let args = vec![Value::str("a,b,c"), Value::str(","), Value::Number(2.0)];
        let Value::Array(a) = split(&args) else { panic!() };
        assert_eq!(a.borrow().len(), 2);
    }

    #[test]
    fn index_of_counts_chars_not_bytes() {
        let args = vec![Value::str("héllo"), Value::str("llo")];
        assert!(matches!(index_of(&args), Value::Number(n) if n == 2.0));
    }
}
