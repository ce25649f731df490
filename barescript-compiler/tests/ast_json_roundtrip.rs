//! The AST is the ground truth (§8 property 1): round-tripping a parsed
//! `Script` through JSON must reproduce a structurally identical tree, and
//! the validator must accept externally-supplied AST JSON the same way it
//! accepts a freshly parsed one (§4.2).

use barescript_compiler::{parse_script, validate_script, Script};

fn roundtrip(src: &str) -> Script {
    let script = parse_script(src).unwrap();
    let json = serde_json::to_string(&script).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn fibonacci_script_survives_json_roundtrip() {
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
    let original = parse_script(src).unwrap();
    let restored = roundtrip(src);
    assert_eq!(
        serde_json::to_value(&original).unwrap(),
        serde_json::to_value(&restored).unwrap()
    );
    // A round-tripped AST is still structurally valid (§4.2).
    validate_script(&restored).unwrap();
}

#[test]
fn function_with_params_survives_roundtrip() {
    let src = "function mul(a, b)\nreturn a * b\nendfunction\nreturn mul(6, 7)\n";
    let restored = roundtrip(src);
    validate_script(&restored).unwrap();
}

#[test]
fn externally_supplied_ast_json_is_validated_like_a_parse_result() {
    // A hand-built AST with a duplicate label, fed in as JSON rather than
    // produced by `parse_script`, must be rejected the same way (§4.2).
    let script = parse_script("a:\nreturn 1\n").unwrap();
    let mut value = serde_json::to_value(&script).unwrap();
    // Duplicate the label statement to trigger the structural check.
    let stmts = value["statements"].as_array_mut().unwrap();
    let label = stmts[0].clone();
    stmts.push(label);
    let tampered: Script = serde_json::from_value(value).unwrap();
    assert!(validate_script(&tampered).is_err());
}
