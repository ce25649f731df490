//! Array group (§4.4).

use super::arg;
use crate::error::RuntimeError;
use crate::host::HostRef;
use crate::value::Value;

pub fn new_array(args: &[Value]) -> Value {
    Value::array(args.to_vec())
}

pub fn new_size(args: &[Value]) -> Value {
    let size = args.first().and_then(Value::as_number).unwrap_or(0.0);
    if size < 0.0 || !size.is_finite() {
        return Value::Null;
    }
    let fill = args.get(1).cloned().unwrap_or(Value::Number(0.0));
    Value::array(vec![fill; size as usize])
}

pub fn length(args: &[Value]) -> Value {
    match args.first().and_then(Value::as_array) {
        Some(a) => Value::Number(a.borrow().len() as f64),
        None => Value::Null,
    }
}

pub fn get(args: &[Value]) -> Value {
    let (Some(a), Some(i)) = (args.first().and_then(Value::as_array), args.get(1).and_then(Value::as_number))
    else {
        return Value::Null;
    };
    if i < 0.0 {
        return Value::Null;
    }
    a.borrow().get(i as usize).cloned().unwrap_or(Value::Null)
}

pub fn set(args: &[Value]) -> Value {
    let (Some(a), Some(i)) = (args.first().and_then(Value::as_array), args.get(1).and_then(Value::as_number))
    else {
        return Value::Null;
    };
    let value = arg(args, 2);
    if i < 0.0 {
        return Value::Null;
    }
    let idx = i as usize;
    let mut a = a.borrow_mut();
    if idx >= a.len() {
        a.resize(idx + 1, Value::Null);
    }
    a[idx] = value;
    Value::Null
}

pub fn push(args: &[Value]) -> Value {
    let Some(a) = args.first().and_then(Value::as_array) else { return Value::Null };
    for v in &args[1.min(args.len())..] {
        a.borrow_mut().push(v.clone());
    }
    Value::Null
}

pub fn pop(args: &[Value]) -> Value {
    let Some(a) = args.first().and_then(Value::as_array) else { return Value::Null };
    a.borrow_mut().pop().unwrap_or(Value::Null)
}

pub fn copy(args: &[Value]) -> Value {
    match args.first().and_then(Value::as_array) {
        Some(a) => Value::array(a.borrow().clone()),
        None => Value::Null,
    }
}

pub fn extend(args: &[Value]) -> Value {
    let (Some(a), Some(b)) = (args.first().and_then(Value::as_array), args.get(1).and_then(Value::as_array))
    else {
        return Value::Null;
    };
    let extra = b.borrow().clone();
    a.borrow_mut().extend(extra);
    Value::Null
}

pub fn index_of(args: &[Value]) -> Value {
    let Some(a) = args.first().and_then(Value::as_array) else { return Value::Null };
    let needle = arg(args, 1);
    match a.borrow().iter().position(|v| v.value_eq(&needle)) {
        Some(i) => Value::Number(i as f64),
        None => Value::Number(-1.0),
    }
}

pub fn last_index_of(args: &[Value]) -> Value {
    let Some(a) = args.first().and_then(Value::as_array) else { return Value::Null };
    let needle = arg(args, 1);
    match a.borrow().iter().rposition(|v| v.value_eq(&needle)) {
        Some(i) => Value::Number(i as f64),
        None => Value::Number(-1.0),
    }
}

pub fn join(args: &[Value]) -> Value {
    let Some(a) = args.first().and_then(Value::as_array) else { return Value::Null };
    let sep = args.get(1).and_then(Value::as_str).unwrap_or("");
    Value::str(
        a.borrow()
            .iter()
            .map(Value::stringify)
            .collect::<Vec<_>>()
            .join(sep),
    )
}

pub fn slice(args: &[Value]) -> Value {
    let Some(a) = args.first().and_then(Value::as_array) else { return Value::Null };
    let a = a.borrow();
    let len = a.len() as i64;
    let norm = |n: i64| -> usize {
        let n = if n < 0 { (len + n).max(0) } else { n.min(len) };
        n as usize
    };
    let begin = args.get(1).and_then(Value::as_number).map(|n| n as i64).unwrap_or(0);
    let end = args.get(2).and_then(Value::as_number).map(|n| n as i64).unwrap_or(len);
    let (b, e) = (norm(begin), norm(end));
    if b >= e {
        return Value::array(Vec::new());
    }
    Value::array(a[b..e].to_vec())
}

/// `arraySort` (§4.4): `cmp`, if present, is a script function returning
/// `<0, 0, >0`; absent, falls back to [`Value::compare`].
pub fn sort(args: &[Value], host: &HostRef) -> Result<Value, RuntimeError> {
    let Some(a) = args.first().and_then(Value::as_array) else { return Ok(Value::Null) };
    let cmp = args.get(1).cloned();
    let mut items = a.borrow().clone();
    match cmp {
        Some(Value::Function(f)) => {
            let mut err = None;
            items.sort_by(|x, y| {
                if err.is_some() {
                    return std::cmp::Ordering::Equal;
                }
                let call_args = vec![x.clone(), y.clone()];
                match crate::eval_sync::call_user_function(&f, &call_args, host) {
                    Ok(v) => v.as_number().unwrap_or(0.0).partial_cmp(&0.0).unwrap_or(std::cmp::Ordering::Equal),
                    Err(e) => {
                        err = Some(e);
                        std::cmp::Ordering::Equal
                    }
                }
            });
            if let Some(e) = err {
                return Err(e);
            }
        }
        _ => items.sort_by(Value::compare),
    }
    *a.borrow_mut() = items;
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_out_of_bounds_is_null() {
        let arr = Value::array(vec![Value::Number(1.0)]);
        assert!(matches!(get(&[arr, Value::Number(5.0)]), Value::Null));
    }

    #[test]
    fn pop_empty_is_null() {
        let arr = Value::array(Vec::new());
        assert!(matches!(pop(&[arr]), Value::Null));
    }

    #[test]
    fn slice_negative_bounds() {
        let arr = Value::array((0..5).map(|n| Value::Number(n as f64)).collect());
        let Value::Array(out) = slice(&[arr, Value::Number(-2.0)]) else { panic!() };
        assert_eq!(out.borrow().len(), 2);
    }
}
