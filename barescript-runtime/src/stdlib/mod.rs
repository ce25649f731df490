//! Standard library dispatch (C4, spec §4.4).
//!
//! Every built-in follows the **type-guard-then-compute** contract: a wrong
//! argument type returns `Ok(Value::Null)`, never an `Err` — library soft
//! failure is not an error (§7 taxonomy item 4). `RuntimeError` only comes
//! out of here for genuinely undefined names, which the evaluator turns
//! into `RuntimeError::UndefinedFunction` at the call site, not from within
//! `call`.

mod arrays;
mod datetime;
mod jsonlib;
mod math;
mod misc;
mod numberlib;
mod objects;
mod regexlib;
mod schema;
mod strings;

use crate::error::RuntimeError;
use crate::host::HostRef;
use crate::value::Value;

/// The one built-in that the synchronous evaluator must treat as a no-op
/// rather than dispatching here (§4.4 fetch contract).
pub const ASYNC_ONLY_BUILTINS: &[&str] = &["fetch"];

pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Null)
}

pub(crate) fn arg_number(args: &[Value], i: usize) -> Option<f64> {
    arg(args, i).as_number()
}

/// Call any synchronous built-in by name. `fetch` is intentionally absent:
/// the sync evaluator returns `Null` for it directly, and the async
/// evaluator dispatches it to [`crate::eval_async::call_fetch`] instead.
pub fn call(name: &str, args: &[Value], host: &HostRef) -> Result<Value, RuntimeError> {
    match name {
        // Math
        "mathAbs" => Ok(math::abs(args)),
        "mathAcos" => Ok(math::acos(args)),
        "mathAsin" => Ok(math::asin(args)),
        "mathAtan" => Ok(math::atan(args)),
        "mathAtan2" => Ok(math::atan2(args)),
        "mathCeil" => Ok(math::ceil(args)),
        "mathCos" => Ok(math::cos(args)),
        "mathFloor" => Ok(math::floor(args)),
        "mathLn" => Ok(math::ln(args)),
        "mathLog" => Ok(math::log(args)),
        "mathMax" => Ok(math::max(args)),
        "mathMin" => Ok(math::min(args)),
        "mathRound" => Ok(math::round(args)),
        "mathSign" => Ok(math::sign(args)),
        "mathSin" => Ok(math::sin(args)),
        "mathSqrt" => Ok(math::sqrt(args)),
        "mathTan" => Ok(math::tan(args)),
        "mathPi" => Ok(math::pi()),
        "mathRandom" => Ok(math::random()),

        // String
        "stringCharCodeAt" => Ok(strings::char_code_at(args)),
        "stringEndsWith" => Ok(strings::ends_with(args)),
        "stringFromCharCode" => Ok(strings::from_char_code(args)),
        "stringIndexOf" => Ok(strings::index_of(args)),
        "stringLastIndexOf" => Ok(strings::last_index_of(args)),
        "stringLength" => Ok(strings::length(args)),
        "stringLower" => Ok(strings::lower(args)),
        "stringUpper" => Ok(strings::upper(args)),
        "stringRepeat" => Ok(strings::repeat(args)),
        "stringReplace" => strings::replace(args, host),
        "stringSlice" => Ok(strings::slice(args)),
        "stringSplit" => Ok(strings::split(args)),
        "stringStartsWith" => Ok(strings::starts_with(args)),
        "stringTrim" => Ok(strings::trim(args)),
        "stringNew" => Ok(strings::new_string(args)),

        // Array
        "arrayCopy" => Ok(arrays::copy(args)),
        "arrayExtend" => Ok(arrays::extend(args)),
        "arrayGet" => Ok(arrays::get(args)),
        "arrayIndexOf" => Ok(arrays::index_of(args)),
        "arrayJoin" => Ok(arrays::join(args)),
        "arrayLastIndexOf" => Ok(arrays::last_index_of(args)),
        "arrayLength" => Ok(arrays::length(args)),
        "arrayNew" => Ok(arrays::new_array(args)),
        "arrayNewSize" => Ok(arrays::new_size(args)),
        "arrayPop" => Ok(arrays::pop(args)),
        "arrayPush" => Ok(arrays::push(args)),
        "arraySet" => Ok(arrays::set(args)),
        "arraySlice" => Ok(arrays::slice(args)),
        "arraySort" => arrays::sort(args, host),

        // Object
        "objectAssign" => Ok(objects::assign(args)),
        "objectCopy" => Ok(objects::copy(args)),
        "objectDelete" => Ok(objects::delete(args)),
        "objectGet" => Ok(objects::get(args)),
        "objectHas" => Ok(objects::has(args)),
        "objectKeys" => Ok(objects::keys(args)),
        "objectNew" => Ok(objects::new_object(args)),
        "objectSet" => Ok(objects::set(args)),

        // Datetime
        "datetimeDay" => Ok(datetime::day(args)),
        "datetimeHour" => Ok(datetime::hour(args)),
        "datetimeMinute" => Ok(datetime::minute(args)),
        "datetimeMonth" => Ok(datetime::month(args)),
        "datetimeSecond" => Ok(datetime::second(args)),
        "datetimeYear" => Ok(datetime::year(args)),
        "datetimeNew" => Ok(datetime::new_datetime(args)),
        "datetimeNow" => Ok(datetime::now()),
        "datetimeToday" => Ok(datetime::today()),
        "datetimeISOFormat" => Ok(datetime::iso_format(args)),

        // JSON
        "jsonParse" => Ok(jsonlib::parse(args, host)),
        "jsonStringify" => Ok(jsonlib::stringify(args)),

        // Regex
        "regexEscape" => Ok(regexlib::escape(args)),
        "regexMatch" => Ok(regexlib::find_match(args)),
        "regexMatchAll" => Ok(regexlib::match_all(args)),
        "regexNew" => Ok(regexlib::new_regex(args)),
        "regexTest" => Ok(regexlib::test(args)),

        // Number
        "numberParseFloat" => Ok(numberlib::parse_float(args)),
        "numberParseInt" => Ok(numberlib::parse_int(args)),
        "numberToFixed" => Ok(numberlib::to_fixed(args)),

        // Misc
        "debugLog" => Ok(misc::debug_log(args, host)),
        "encodeURI" => Ok(misc::encode_uri(args)),
        "encodeURIComponent" => Ok(misc::encode_uri_component(args)),
        "getGlobal" => Ok(misc::get_global(args, host)),
        "setGlobal" => Ok(misc::set_global(args, host)),

        // Schema (delegated, out of core scope per spec §4.4)
        "schemaParse" => Ok(schema::parse(args)),
        "schemaTypeModel" => Ok(schema::type_model(args)),
        "schemaValidate" => Ok(schema::validate(args)),
        "schemaValidateTypeModel" => Ok(schema::validate_type_model(args)),

        other => Err(RuntimeError::UndefinedFunction(other.to_string())),
    }
}
