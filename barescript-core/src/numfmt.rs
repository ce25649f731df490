//! Shortest round-trip number formatting shared by the lexer's literal
//! validation and the runtime's `stringify`/`jsonStringify`.

/// Format a double the way script values are displayed: the shortest decimal
/// string that round-trips back to the same `f64`, integral values printed
/// without a trailing `.0`, and the non-finite cases spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return if n.is_sign_negative() { "0" } else { "0" }.to_string();
    }
    // Rust's `Display` impl for `f64` already produces the shortest decimal
    // string that round-trips (no forced `.0`), which is exactly the rule
    // `stringify` wants.
    format!("{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_have_no_decimal_point() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
    }

    #[test]
    fn fractions_round_trip() {
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(3.14), "3.14");
    }

    #[test]
    fn non_finite() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
