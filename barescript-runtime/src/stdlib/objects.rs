//! Object group (§4.4). Array arguments are rejected (return Null) for
//! object-only functions — objects and arrays are never conflated here.

use super::arg;
use crate::value::Value;

pub fn new_object(args: &[Value]) -> Value {
    if args.len() % 2 != 0 {
        return Value::Null;
    }
    let mut map = indexmap::IndexMap::new();
    for pair in args.chunks(2) {
        let Some(key) = pair[0].as_str() else { return Value::Null };
        map.insert(key.to_string(), pair[1].clone());
    }
    Value::object(map)
}

pub fn keys(args: &[Value]) -> Value {
    match args.first().and_then(Value::as_object) {
        Some(o) => Value::array(o.borrow().keys().map(|k| Value::str(k.as_str())).collect()),
        None => Value::Null,
    }
}

pub fn has(args: &[Value]) -> Value {
    let (Some(o), Some(k)) = (args.first().and_then(Value::as_object), args.get(1).and_then(Value::as_str))
    else {
        return Value::Null;
    };
    Value::Boolean(o.borrow().contains_key(k))
}

pub fn get(args: &[Value]) -> Value {
    let (Some(o), Some(k)) = (args.first().and_then(Value::as_object), args.get(1).and_then(Value::as_str))
    else {
        return Value::Null;
    };
    let default = arg(args, 2);
    o.borrow().get(k).cloned().unwrap_or(default)
}

pub fn set(args: &[Value]) -> Value {
    let (Some(o), Some(k)) = (args.first().and_then(Value::as_object), args.get(1).and_then(Value::as_str))
    else {
        return Value::Null;
    };
    let value = arg(args, 2);
    o.borrow_mut().insert(k.to_string(), value);
    Value::Null
}

pub fn delete(args: &[Value]) -> Value {
    let (Some(o), Some(k)) = (args.first().and_then(Value::as_object), args.get(1).and_then(Value::as_str))
    else {
        return Value::Null;
    };
    o.borrow_mut().shift_remove(k);
    Value::Null
}

pub fn copy(args: &[Value]) -> Value {
    match args.first().and_then(Value::as_object) {
        Some(o) => Value::object(o.borrow().clone()),
        None => Value::Null,
    }
}

pub fn assign(args: &[Value]) -> Value {
    let Some(target) = args.first().and_then(Value::as_object) else { return Value::Null };
    for src in &args[1.min(args.len())..] {
        let Some(src) = src.as_object() else { return Value::Null };
        for (k, v) in src.borrow().iter() {
            target.borrow_mut().insert(k.clone(), v.clone());
        }
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_object_rejects_odd_arg_count() {
        assert!(matches!(new_object(&[Value::str("a")]), Value::Null));
    }

    #[test]
    fn get_falls_back_to_default() {
        let obj = new_object(&[]);
        assert!(matches!(get(&[obj, Value::str("missing"), Value::Number(9.0)]), Value::Number(n) if n == 9.0));
    }

    #[test]
    fn keys_preserve_insertion_order() {
        let obj = new_object(&[Value::str("b"), Value::Number(1.0), Value::str("a"), Value::Number(2.0)]);
        let Value::Array(k) = keys(&[obj]) else { panic!() };
        let k = k.borrow();
        assert_eq!(k[0].as_str(), Some("b"));
        assert_eq!(k[1].as_str(), Some("a"));
    }
}
