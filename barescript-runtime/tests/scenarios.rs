//! End-to-end scenarios S1-S6 (spec §8) plus the sync/async parity property.

use barescript_runtime::host::HostOptions;
use barescript_runtime::value::Value;
use barescript_runtime::{evaluate_expression, execute_script, parse_expression, parse_script};
use std::cell::RefCell;
use std::rc::Rc;

fn run(src: &str) -> Value {
    let script = parse_script(src).unwrap();
    let host = Rc::new(HostOptions::default());
    execute_script(&script, &host).unwrap()
}

fn run_with_max(src: &str, max_statements: u64) -> Result<Value, barescript_runtime::RuntimeError> {
    let script = parse_script(src).unwrap();
    let mut host = HostOptions::default();
    host.max_statements = max_statements;
    execute_script(&script, &Rc::new(host))
}

#[test]
fn s1_fibonacci_via_labels() {
    let src = "n = 10\n\
               i = 0\n\
               a = 0\n\
               b = 1\n\
               fib:\n\
               jumpif (i >= n) fibend\n\
               tmp = b\n\
               b = a + b\n\
               a = tmp\n\
               i = i + 1\n\
               jump fib\n\
               fibend:\n\
               return a\n";
    assert!(matches!(run(src), Value::Number(n) if n == 55.0));
}

#[test]
fn s2_user_function() {
    let src = "function mul(a, b)\nreturn a * b\nendfunction\nreturn mul(6, 7)\n";
    assert!(matches!(run(src), Value::Number(n) if n == 42.0));
}

#[test]
fn s3_precedence() {
    let host = Rc::new(HostOptions::default());
    let e1 = parse_expression("7 + 3 * 5").unwrap();
    assert!(matches!(evaluate_expression(&e1, &host, None, true), Ok(Value::Number(n)) if n == 22.0));

    let e2 = parse_expression("(7 + 3) * 5").unwrap();
    assert!(matches!(evaluate_expression(&e2, &host, None, true), Ok(Value::Number(n)) if n == 50.0));

    let e3 = parse_expression("(1 + (2))").unwrap();
    assert!(matches!(evaluate_expression(&e3, &host, None, true), Ok(Value::Number(n)) if n == 3.0));
}

#[test]
fn s4_short_circuit() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let log2 = log.clone();
    let mut host = HostOptions::default();
    host.log_fn = Some(Rc::new(move |s: &str| log2.borrow_mut().push(s.to_string())));
    let host = Rc::new(host);

    let script = parse_script("debugLog('x') || debugLog('y')\n").unwrap();
    execute_script(&script, &host).unwrap();
    assert_eq!(log.borrow().as_slice(), ["x", "y"]);

    log.borrow_mut().clear();
    let script = parse_script("1 || debugLog('y')\n").unwrap();
    execute_script(&script, &host).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn s5_statement_budget() {
    let src = "a = 1\nb = 2\nc = 3\n";
    let err = run_with_max(src, 2).unwrap_err();
    assert_eq!(err.to_string(), "Exceeded maximum script statements (2)");

    assert!(matches!(run_with_max(src, 3), Ok(Value::Null)));
    assert!(matches!(run_with_max(src, 0), Ok(Value::Null)));
}

#[test]
fn s6_json_determinism() {
    let src_b_first = "return jsonStringify(objectNew(\"b\", 1, \"a\", 2))\n";
    let src_a_first = "return jsonStringify(objectNew(\"a\", 2, \"b\", 1))\n";
    let a = run(src_b_first);
    let b = run(src_a_first);
    assert!(matches!((&a, &b), (Value::String(x), Value::String(y)) if x == y));
    assert!(matches!(&a, Value::String(s) if &**s == r#"{"a":2,"b":1}"#));
}

#[test]
fn lazy_if_evaluates_exactly_one_branch() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let log2 = log.clone();
    let mut host = HostOptions::default();
    host.log_fn = Some(Rc::new(move |s: &str| log2.borrow_mut().push(s.to_string())));
    let host = Rc::new(host);

    let script = parse_script("return if(true, debugLog('then'), debugLog('else'))\n").unwrap();
    execute_script(&script, &host).unwrap();
    assert_eq!(log.borrow().as_slice(), ["then"]);
}

#[test]
fn short_circuit_operators_return_the_surviving_operand() {
    // `||`/`&&` yield the operand value itself, not a coerced boolean
    // (e.g. `'a' || 'b'` -> `'a'`), matching the source's operator semantics.
    assert!(matches!(run("return 'a' || 'b'\n"), Value::String(s) if &*s == "a"));
    assert!(matches!(run("return 0 || 'b'\n"), Value::String(s) if &*s == "b"));
    assert!(matches!(run("return 1 && 'b'\n"), Value::String(s) if &*s == "b"));
    assert!(matches!(run("return 0 && 'b'\n"), Value::Number(n) if n == 0.0));
}

#[test]
fn prefixed_stdlib_names_resolve() {
    assert!(matches!(run("return mathFloor(1.9)\n"), Value::Number(n) if n == 1.0));
    assert!(matches!(run("return stringLength('hello')\n"), Value::Number(n) if n == 5.0));
    assert!(matches!(run("return stringReplace('hello', 'l', 'L')\n"), Value::String(s) if &*s == "heLlo"));
}

#[test]
fn recursive_user_function() {
    let src = "function fact(n)\n\
               return if(n <= 1, 1, n * fact(n - 1))\n\
               endfunction\n\
               return fact(6)\n";
    assert!(matches!(run(src), Value::Number(n) if n == 720.0));
}

#[test]
fn include_is_rejected_in_sync_scope() {
    let script = parse_script("include \"foo.bs\"\n").unwrap();
    let host = Rc::new(HostOptions::default());
    let err = execute_script(&script, &host).unwrap_err();
    assert_eq!(err.to_string(), "Include within non-async scope");
}

#[test]
fn async_function_call_fails_at_call_site_in_sync_scope() {
    let src = "async function slow()\nreturn 1\nendfunction\nreturn slow()\n";
    let script = parse_script(src).unwrap();
    let host = Rc::new(HostOptions::default());
    let err = execute_script(&script, &host).unwrap_err();
    assert_eq!(err.to_string(), "Async function \"slow\" in non-async scope");
}
