//! Value coercions shared by the validators.
//!
//! Form inputs arrive as strings, so numeric checks accept numeric strings
//! and textual checks accept numbers.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rulegraph_core::{ConstraintDescriptor, Target, ValidatorInput};
use serde_json::{Number, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A number, or a string holding one. `"NaN"` parses to NaN.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse().ok()
            }
        }
        _ => None,
    }
}

/// Decimal text of a number, without a trailing `.0` on whole values.
pub(crate) fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// A string, or the decimal text of a number.
pub(crate) fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(number_text(n))),
        _ => None,
    }
}

/// Number of elements or characters, for strings, arrays and objects.
///
/// Object keys starting with `$` are bookkeeping and do not count.
pub(crate) fn size(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.keys().filter(|k| !k.starts_with('$')).count()),
        Value::Number(n) => Some(number_text(n).chars().count()),
        _ => None,
    }
}

pub(crate) fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok() || is_timestamp(s)
}

pub(crate) fn is_time(s: &str) -> bool {
    TIME_FORMATS.iter().any(|f| NaiveTime::parse_from_str(s, f).is_ok())
}

pub(crate) fn is_timestamp(s: &str) -> bool {
    instant(s).is_some()
}

/// The instant a date or timestamp string denotes. Values without an
/// offset are read as UTC; bare dates as midnight.
pub(crate) fn instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Report an unusable attribute of the constraint under evaluation in the
/// global list. Returns `false` so validators can fail with it directly.
pub(crate) fn reject_attribute(
    input: &mut ValidatorInput<'_, '_>,
    attribute: &str,
    attribute_value: Value,
    description: &str,
) -> bool {
    tracing::debug!(
        constraint = %input.constraint.constraint_name,
        attribute,
        description,
        "invalid constraint attribute"
    );
    let violation = ConstraintDescriptor::invalid_attribute_value(
        &input.constraint.constraint_name,
        attribute,
        attribute_value,
        description,
    );
    let path = input.path.to_string();
    input.reporter.report(Target::Global, violation, input.value, &path);
    false
}

/// A numeric attribute, or `None` after reporting it as unusable.
pub(crate) fn numeric_attribute(input: &mut ValidatorInput<'_, '_>, attribute: &str) -> Option<f64> {
    let raw = input.attribute(attribute).cloned();
    match raw.as_ref().and_then(number) {
        Some(bound) => Some(bound),
        None => {
            reject_attribute(input, attribute, raw.unwrap_or(Value::Null), "expected a number");
            None
        }
    }
}
