//! Bean Validation style constraints.
//!
//! Every check accepts a missing value (except `NotNull` and `Null`, which
//! are about presence) and accepts values of a data type it does not apply
//! to; the structural validators of the property's type report those.
//! Unusable attributes are reported as `InvalidConstraintAttributeValue` in
//! the global list and fail the check.

use std::sync::OnceLock;

use chrono::Utc;
use regex::{Regex, RegexBuilder};
use rulegraph_core::{Catalog, Validator, ValidatorInput};
use serde_json::Value;

use super::coerce::{self, numeric_attribute, reject_attribute};

/// Upper bound used when a size limit is unset.
pub const MAX_INTEGER_VALUE: i64 = i32::MAX as i64;

fn boolean_equals(input: &ValidatorInput<'_, '_>, expected: bool) -> bool {
    match input.value {
        Some(Value::Bool(b)) => *b == expected,
        _ => true,
    }
}

/// The numeric value under test, or `None` when absent or not numeric.
fn numeric_value(input: &ValidatorInput<'_, '_>) -> Option<f64> {
    input.value.and_then(coerce::number)
}

fn max(mut input: ValidatorInput<'_, '_>) -> bool {
    let Some(value) = numeric_value(&input).filter(|v| !v.is_nan()) else {
        return true;
    };
    numeric_attribute(&mut input, "value").is_some_and(|bound| value <= bound)
}

fn min(mut input: ValidatorInput<'_, '_>) -> bool {
    let Some(value) = numeric_value(&input).filter(|v| !v.is_nan()) else {
        return true;
    };
    numeric_attribute(&mut input, "value").is_some_and(|bound| value >= bound)
}

fn inclusive(input: &ValidatorInput<'_, '_>) -> bool {
    input.attribute("inclusive").and_then(Value::as_bool).unwrap_or(true)
}

fn decimal_max(mut input: ValidatorInput<'_, '_>) -> bool {
    let Some(value) = numeric_value(&input) else {
        return true;
    };
    let inclusive = inclusive(&input);
    numeric_attribute(&mut input, "value").is_some_and(|bound| if inclusive { value <= bound } else { value < bound })
}

fn decimal_min(mut input: ValidatorInput<'_, '_>) -> bool {
    let Some(value) = numeric_value(&input) else {
        return true;
    };
    let inclusive = inclusive(&input);
    numeric_attribute(&mut input, "value").is_some_and(|bound| if inclusive { value >= bound } else { value > bound })
}

/// At most `integer` digits before and `fraction` digits after the point.
/// The sign is not a digit.
fn digits(mut input: ValidatorInput<'_, '_>) -> bool {
    let Some(value) = input.value else {
        return true;
    };
    let Some(number) = coerce::number(value) else {
        return true;
    };
    if !number.is_finite() {
        return false;
    }
    let (Some(integer), Some(fraction)) = (
        numeric_attribute(&mut input, "integer"),
        numeric_attribute(&mut input, "fraction"),
    ) else {
        return false;
    };
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        _ => coerce::text(value).map(|t| t.into_owned()).unwrap_or_default(),
    };
    let unsigned = text.trim_start_matches(|c: char| c == '-' || c == '+');
    let (whole, decimals) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    whole.len() as f64 <= integer && decimals.len() as f64 <= fraction
}

fn future(input: ValidatorInput<'_, '_>) -> bool {
    match input.value {
        Some(Value::String(s)) => coerce::instant(s).is_some_and(|at| at > Utc::now()),
        _ => true,
    }
}

fn past(input: ValidatorInput<'_, '_>) -> bool {
    match input.value {
        Some(Value::String(s)) => coerce::instant(s).is_some_and(|at| at < Utc::now()),
        _ => true,
    }
}

fn not_null(input: ValidatorInput<'_, '_>) -> bool {
    !matches!(input.value, None | Some(Value::Null))
}

fn null(input: ValidatorInput<'_, '_>) -> bool {
    matches!(input.value, None | Some(Value::Null))
}

/// `Pattern` flags that map onto the regex engine; the rest are rejected.
fn pattern_flag(flag: &Value) -> Result<char, &'static str> {
    match flag {
        Value::String(s) => match s.as_str() {
            "CASE_INSENSITIVE" => Ok('i'),
            "MULTILINE" => Ok('m'),
            "UNIX_LINES" => Err("Pattern Validator: Unix lines flag not supported"),
            "COMMENTS" => Err("Pattern Validator: Comments flag not supported"),
            "DOTALL" => Err("Pattern Validator: Dot all flag not supported"),
            "UNICODE_CASE" => Err("Pattern Validator: Unicode case flag not supported"),
            "CANON_EQ" => Err("Pattern Validator: CanonEq flag not supported"),
            _ => Err("Pattern Validator: Invalid Flag type"),
        },
        Value::Number(n) => match n.as_u64() {
            Some(1) => Ok('i'),
            Some(3) => Ok('m'),
            Some(0) => Err("Pattern Validator: Unix lines flag not supported"),
            Some(2) => Err("Pattern Validator: Comments flag not supported"),
            Some(4) => Err("Pattern Validator: Dot all flag not supported"),
            Some(5) => Err("Pattern Validator: Unicode case flag not supported"),
            Some(6) => Err("Pattern Validator: CanonEq flag not supported"),
            _ => Err("Pattern Validator: Invalid Flag type"),
        },
        _ => Err("Pattern Validator: Invalid Flag type"),
    }
}

/// Matches when the expression is found anywhere in the text.
fn pattern(mut input: ValidatorInput<'_, '_>) -> bool {
    let Some(text) = input.value.and_then(coerce::text) else {
        return true;
    };
    let text = text.into_owned();

    let flags = match input.attribute("flags") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(flags)) => flags.clone(),
        Some(single) => vec![single.clone()],
    };
    let (mut case_insensitive, mut multi_line) = (false, false);
    for flag in flags {
        match pattern_flag(&flag) {
            Ok('i') => case_insensitive = true,
            Ok(_) => multi_line = true,
            Err(description) => return reject_attribute(&mut input, "flags", flag, description),
        }
    }

    let Some(expression) = input.attribute("regexp").and_then(Value::as_str).map(str::to_string) else {
        let raw = input.attribute("regexp").cloned().unwrap_or(Value::Null);
        return reject_attribute(&mut input, "regexp", raw, "Pattern Validator: missing regular expression");
    };
    let compiled = RegexBuilder::new(&expression)
        .case_insensitive(case_insensitive)
        .multi_line(multi_line)
        .build();
    match compiled {
        Ok(regex) => regex.is_match(&text),
        Err(e) => reject_attribute(&mut input, "regexp", Value::String(expression), &format!("Pattern Validator: {e}")),
    }
}

fn length_between(input: &ValidatorInput<'_, '_>, length: usize) -> bool {
    let bound = |key: &str, default: i64| input.attribute(key).and_then(coerce::number).unwrap_or(default as f64);
    let length = length as f64;
    bound("min", 0) <= length && length <= bound("max", MAX_INTEGER_VALUE)
}

/// Element, key or character count within `[min, max]`.
fn size(input: ValidatorInput<'_, '_>) -> bool {
    match input.value.and_then(coerce::size) {
        Some(length) => length_between(&input, length),
        None => true,
    }
}

/// Character count of text within `[min, max]`.
fn length(input: ValidatorInput<'_, '_>) -> bool {
    match input.value.and_then(coerce::text) {
        Some(text) => {
            let length = text.chars().count();
            length_between(&input, length)
        }
        None => true,
    }
}

fn not_empty(input: ValidatorInput<'_, '_>) -> bool {
    match input.value {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        _ => true,
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            RegexBuilder::new(
                r"^[a-z0-9!#$%&'*+/=?^_`{|}~.-]+@[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)*$",
            )
            .case_insensitive(true)
            .build()
            .ok()
        })
        .as_ref()
}

fn email(input: ValidatorInput<'_, '_>) -> bool {
    match (input.value.and_then(coerce::text), email_regex()) {
        (Some(text), Some(regex)) => regex.is_match(&text),
        _ => true,
    }
}

/// URL with the configured protocol alternatives, host and port.
fn url(mut input: ValidatorInput<'_, '_>) -> bool {
    let Some(text) = input.value.and_then(coerce::text).map(|t| t.into_owned()) else {
        return true;
    };
    let protocol = match input.attribute("protocol").and_then(Value::as_str) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => "ftp|http|https".to_string(),
    };
    let host = match input.attribute("host").and_then(Value::as_str) {
        Some(h) if !h.is_empty() => regex::escape(h),
        _ => r"(\w+?:{0,1}\w*?@)?(\S+?)".to_string(),
    };
    let port = match input.attribute("port").and_then(coerce::number) {
        Some(p) if p >= 0.0 => format!(":{}", p as i64),
        _ => "(:[0-9]+?)?".to_string(),
    };
    let expression = format!(r"^({protocol})://{host}{port}([\w#!:.?+=&%@\-/])*$");
    match RegexBuilder::new(&expression).case_insensitive(true).build() {
        Ok(regex) => regex.is_match(&text),
        Err(e) => reject_attribute(&mut input, "protocol", Value::String(protocol), &format!("URL Validator: {e}")),
    }
}

pub(crate) fn install(catalog: &mut Catalog) {
    catalog.insert_validator("AssertFalse", Validator::new(|input| boolean_equals(&input, false)));
    catalog.insert_validator("AssertTrue", Validator::new(|input| boolean_equals(&input, true)));
    catalog.insert_validator("DecimalMax", Validator::new(decimal_max).with_default("inclusive", true));
    catalog.insert_validator("DecimalMin", Validator::new(decimal_min).with_default("inclusive", true));
    catalog.insert_validator("Digits", Validator::new(digits));
    catalog.insert_validator("Future", Validator::new(future));
    catalog.insert_validator("Past", Validator::new(past));
    catalog.insert_validator("Max", Validator::new(max));
    catalog.insert_validator("Min", Validator::new(min));
    catalog.insert_validator("NotNull", Validator::new(not_null).html_required());
    catalog.insert_validator("Null", Validator::new(null));
    catalog.insert_validator("Pattern", Validator::new(pattern).with_default("flags", Value::Array(Vec::new())));
    catalog.insert_validator(
        "Size",
        Validator::new(size)
            .with_default("min", 0)
            .with_default("max", MAX_INTEGER_VALUE),
    );
    catalog.insert_validator(
        "Length",
        Validator::new(length)
            .with_default("min", 0)
            .with_default("max", MAX_INTEGER_VALUE),
    );
    catalog.insert_validator("NotEmpty", Validator::new(not_empty));
    catalog.insert_validator("Email", Validator::new(email));
    catalog.insert_validator(
        "URL",
        Validator::new(url)
            .with_default("protocol", "ftp|http|https")
            .with_default("host", "")
            .with_default("port", -1),
    );
}
