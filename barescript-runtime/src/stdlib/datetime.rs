//! Datetime group (§4.4). No literal syntax exists for `Datetime` (§9 open
//! question, resolved): values only come from `datetimeNew`/`now`/`today`.

use crate::value::Value;
use chrono::{Datelike, TimeZone, Timelike, Utc};

fn as_dt(args: &[Value], i: usize) -> Option<chrono::DateTime<Utc>> {
    match args.get(i) {
        Some(Value::Datetime(dt)) => Some(*dt),
        _ => None,
    }
}

pub fn year(args: &[Value]) -> Value {
    as_dt(args, 0).map(|d| Value::Number(d.year() as f64)).unwrap_or(Value::Null)
}

pub fn month(args: &[Value]) -> Value {
    as_dt(args, 0).map(|d| Value::Number(d.month() as f64)).unwrap_or(Value::Null)
}

pub fn day(args: &[Value]) -> Value {
    as_dt(args, 0).map(|d| Value::Number(d.day() as f64)).unwrap_or(Value::Null)
}

pub fn hour(args: &[Value]) -> Value {
    as_dt(args, 0).map(|d| Value::Number(d.hour() as f64)).unwrap_or(Value::Null)
}

pub fn minute(args: &[Value]) -> Value {
    as_dt(args, 0).map(|d| Value::Number(d.minute() as f64)).unwrap_or(Value::Null)
}

pub fn second(args: &[Value]) -> Value {
    as_dt(args, 0).map(|d| Value::Number(d.second() as f64)).unwrap_or(Value::Null)
}

pub fn new_datetime(args: &[Value]) -> Value {
    let num = |i: usize, default: f64| args.get(i).and_then(Value::as_number).unwrap_or(default);
    let (Some(y), Some(mo), Some(d)) = (
        args.first().and_then(Value::as_number),
        args.get(1).and_then(Value::as_number),
        args.get(2).and_then(Value::as_number),
    ) else {
        return Value::Null;
    };
    let (h, mi, s, ms) = (num(3, 0.0), num(4, 0.0), num(5, 0.0), num(6, 0.0));
    let Some(naive_date) = chrono::NaiveDate::from_ymd_opt(y as i32, mo as u32, d as u32) else {
        return Value::Null;
    };
    let Some(naive_time) =
        chrono::NaiveTime::from_hms_milli_opt(h as u32, mi as u32, s as u32, ms as u32)
    else {
        return Value::Null;
    };
    Value::Datetime(Utc.from_utc_datetime(&naive_date.and_time(naive_time)))
}

pub fn now() -> Value {
    Value::Datetime(Utc::now())
}

pub fn today() -> Value {
    let today = Utc::now().date_naive();
    Value::Datetime(Utc.from_utc_datetime(&today.and_hms_opt(0, 0, 0).unwrap()))
}

pub fn iso_format(args: &[Value]) -> Value {
    let Some(dt) = as_dt(args, 0) else { return Value::Null };
    let date_only = args.get(1).map(Value::truthy).unwrap_or(false);
    if date_only {
        Value::str(dt.format("%Y-%m-%d").to_string())
    } else {
        Value::str(dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_datetime_rejects_invalid_date() {
        assert!(matches!(
            new_datetime(&[Value::Number(2024.0), Value::Number(2.0), Value::Number(30.0)]),
            Value::Null
        ));
    }

    #[test]
    fn iso_format_date_only() {
        let dt = new_datetime(&[Value::Number(2024.0), Value::Number(3.0), Value::Number(5.0)]);
        assert!(matches!(iso_format(&[dt, Value::Boolean(true)]), Value::String(s) if &*s == "2024-03-05"));
    }
}
