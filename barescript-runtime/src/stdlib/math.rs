//! Math group (§4.4). IEEE-754 double semantics throughout; non-numeric
//! arguments return `Null` rather than erroring.

use super::arg_number;
use crate::value::Value;

fn unary(args: &[Value], f: impl Fn(f64) -> f64) -> Value {
    match arg_number(args, 0) {
        Some(n) => Value::Number(f(n)),
        None => Value::Null,
    }
}

pub fn abs(args: &[Value]) -> Value {
    unary(args, f64::abs)
}
pub fn acos(args: &[Value]) -> Value {
    unary(args, f64::acos)
}
pub fn asin(args: &[Value]) -> Value {
    unary(args, f64::asin)
}
pub fn atan(args: &[Value]) -> Value {
    unary(args, f64::atan)
}
pub fn ceil(args: &[Value]) -> Value {
    unary(args, f64::ceil)
}
pub fn cos(args: &[Value]) -> Value {
    unary(args, f64::cos)
}
pub fn floor(args: &[Value]) -> Value {
    unary(args, f64::floor)
}
pub fn ln(args: &[Value]) -> Value {
    unary(args, f64::ln)
}
pub fn sin(args: &[Value]) -> Value {
    unary(args, f64::sin)
}
pub fn sqrt(args: &[Value]) -> Value {
    unary(args, f64::sqrt)
}
pub fn tan(args: &[Value]) -> Value {
    unary(args, f64::tan)
}

pub fn sign(args: &[Value]) -> Value {
    match arg_number(args, 0) {
        Some(n) if n.is_nan() => Value::Number(f64::NAN),
        Some(n) if n > 0.0 => Value::Number(1.0),
        Some(n) if n < 0.0 => Value::Number(-1.0),
        Some(_) => Value::Number(0.0),
        None => Value::Null,
    }
}

pub fn atan2(args: &[Value]) -> Value {
    match (arg_number(args, 0), arg_number(args, 1)) {
        (Some(y), Some(x)) => Value::Number(y.atan2(x)),
        _ => Value::Null,
    }
}

pub fn log(args: &[Value]) -> Value {
    let base = arg_number(args, 1).unwrap_or(10.0);
    match arg_number(args, 0) {
        Some(x) => Value::Number(x.log(base)),
        None => Value::Null,
    }
}

pub fn max(args: &[Value]) -> Value {
    fold_numeric(args, f64::max)
}

pub fn min(args: &[Value]) -> Value {
    fold_numeric(args, f64::min)
}

fn fold_numeric(args: &[Value], f: impl Fn(f64, f64) -> f64) -> Value {
    let mut out: Option<f64> = None;
    for a in args {
        let Value::Number(n) = a else { return Value::Null };
        out = Some(match out {
            Some(acc) => f(acc, *n),
            None => *n,
        });
    }
    out.map(Value::Number).unwrap_or(Value::Null)
}

pub fn round(args: &[Value]) -> Value {
    let digits = arg_number(args, 1).unwrap_or(0.0) as i32;
    match arg_number(args, 0) {
        Some(n) => {
            let scale = 10f64.powi(digits);
            Value::Number((n * scale).round() / scale)
        }
        None => Value::Null,
    }
}

pub fn pi() -> Value {
    Value::Number(std::f64::consts::PI)
}

pub fn random() -> Value {
    Value::Number(rand::random::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_respects_digits() {
        assert!(matches!(round(&[Value::Number(1.2345), Value::Number(2.0)]), Value::Number(n) if (n - 1.23).abs() < 1e-9));
    }

    #[test]
    fn wrong_type_is_null_not_error() {
        assert!(matches!(abs(&[Value::str("x")]), Value::Null));
    }

    #[test]
    fn min_max_fold_over_all_args() {
        let args = vec![Value::Number(3.0), Value::Number(1.0), Value::Number(2.0)];
        assert!(matches!(max(&args), Value::Number(n) if n == 3.0));
        assert!(matches!(min(&args), Value::Number(n) if n == 1.0));
    }
}
