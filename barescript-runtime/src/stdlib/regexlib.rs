//! Regex group (§4.4). `Regex` values are opaque, immutable host handles
//! (§3) backed by the `regex` crate.

use crate::value::Value;
use std::rc::Rc;

fn as_regex(args: &[Value], i: usize) -> Option<Rc<regex::Regex>> {
    match args.get(i) {
        Some(Value::Regex(r)) => Some(r.clone()),
        _ => None,
    }
}

pub fn new_regex(args: &[Value]) -> Value {
    let Some(pattern) = args.first().and_then(Value::as_str) else { return Value::Null };
    let flags = args.get(1).and_then(Value::as_str).unwrap_or("");
    let mut builder = regex::RegexBuilder::new(pattern);
    if flags.contains('i') {
        builder.case_insensitive(true);
    }
    if flags.contains('s') {
        builder.dot_matches_new_line(true);
    }
    if flags.contains('m') {
        builder.multi_line(true);
    }
    match builder.build() {
        Ok(re) => Value::Regex(Rc::new(re)),
        Err(_) => Value::Null,
    }
}

pub fn escape(args: &[Value]) -> Value {
    match args.first().and_then(Value::as_str) {
        Some(s) => Value::str(regex::escape(s)),
        None => Value::Null,
    }
}

pub fn test(args: &[Value]) -> Value {
    let (Some(re), Some(s)) = (as_regex(args, 0), args.get(1).and_then(Value::as_str)) else {
        return Value::Null;
    };
    Value::Boolean(re.is_match(s))
}

fn groups_of<'a>(re: &regex::Regex, s: &'a str) -> Option<Vec<Value>> {
    re.captures(s).map(|caps| {
        caps.iter()
            .map(|m| m.map(|m| Value::str(m.as_str())).unwrap_or(Value::Null))
            .collect()
    })
}

pub fn find_match(args: &[Value]) -> Value {
    let (Some(re), Some(s)) = (as_regex(args, 0), args.get(1).and_then(Value::as_str)) else {
        return Value::Null;
    };
    match groups_of(&re, s) {
        Some(groups) => Value::array(groups),
        None => Value::Null,
    }
}

pub fn match_all(args: &[Value]) -> Value {
    let (Some(re), Some(s)) = (as_regex(args, 0), args.get(1).and_then(Value::as_str)) else {
        return Value::Null;
    };
    let matches: Vec<Value> = re
        .captures_iter(s)
        .map(|caps| {
            Value::array(
                caps.iter()
                    .map(|m| m.map(|m| Value::str(m.as_str())).unwrap_or(Value::Null))
                    .collect(),
            )
        })
        .collect();
    Value::array(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_simple_pattern() {
        let re = new_regex(&[Value::str(r"^\d+$")]);
        assert!(matches!(test(&[re.clone(), Value::str("123")]), Value::Boolean(true)));
        assert!(matches!(test(&[re, Value::str("abc")]), Value::Boolean(false)));
    }

    #[test]
    fn match_all_returns_one_array_per_match() {
        let re = new_regex(&[Value::str(r"\d+")]);
        let Value::Array(all) = match_all(&[re, Value::str("a1 b22 c333")]) else { panic!() };
        assert_eq!(all.borrow().len(), 3);
    }

    #[test]
    fn invalid_pattern_is_null() {
        assert!(matches!(new_regex(&[Value::str("(")]), Value::Null));
    }
}
