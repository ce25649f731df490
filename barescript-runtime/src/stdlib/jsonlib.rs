//! JSON group (§4.4). `jsonStringify` relies on `Value::to_json` sorting
//! object keys (§8 property 7); see its doc comment for why.

use crate::host::HostRef;
use crate::value::Value;

pub fn parse(args: &[Value], host: &HostRef) -> Value {
    let Some(s) = args.first().and_then(Value::as_str) else { return Value::Null };
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(json) => Value::from_json(&json),
        Err(e) => {
            host.log(&format!("jsonParse: {e}"));
            Value::Null
        }
    }
}

pub fn stringify(args: &[Value]) -> Value {
    let Some(v) = args.first() else { return Value::Null };
    let json = v.to_json();
    let space = args.get(1).and_then(Value::as_number);
    let text = match space {
        Some(n) if n > 0.0 => {
            let indent = " ".repeat(n as usize);
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            serde::Serialize::serialize(&json, &mut ser).ok();
            String::from_utf8(buf).unwrap_or_default()
        }
        _ => json.to_string(),
    };
    Value::str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn stringify_sorts_keys_regardless_of_insertion_order() {
        let a = Value::object(
            [("b".to_string(), Value::Number(1.0)), ("a".to_string(), Value::Number(2.0))]
                .into_iter()
                .collect(),
        );
        let b = Value::object(
            [("a".to_string(), Value::Number(2.0)), ("b".to_string(), Value::Number(1.0))]
                .into_iter()
                .collect(),
        );
        assert_eq!(stringify(&[a]).stringify(), stringify(&[b.clone()]).stringify());
        let Value::String(s) = stringify(&[b]) else { panic!() };
        assert_eq!(&*s, r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn parse_malformed_input_is_null() {
        let host: HostRef = Rc::new(Default::default());
        assert!(matches!(parse(&[Value::str("{not json")], &host), Value::Null));
    }
}
