//! Structural validators: is the value of the expected JSON shape?
//!
//! These back the constraints of the built-in types. A missing value is
//! always accepted; presence is the business of `NotNull` and `NotBlank`.

use rulegraph_core::{Catalog, Validator, ValidatorInput, OBJECT_CONSTRAINT};
use serde_json::Value;

use super::coerce;
use crate::types::INVALID_NUMBER_OF_GENERIC_ARGUMENTS;

/// Accept missing values; otherwise defer to `check`.
fn present(input: &ValidatorInput<'_, '_>, check: impl FnOnce(&Value) -> bool) -> bool {
    match input.value {
        None | Some(Value::Null) => true,
        Some(value) => check(value),
    }
}

fn object(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, |v| v.is_object() || v.is_array())
}

fn string(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, Value::is_string)
}

fn boolean(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, Value::is_boolean)
}

fn integer_number(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, |v| match v {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
        Value::String(_) => coerce::number(v).is_some_and(|f| f.is_finite() && f.fract() == 0.0),
        _ => false,
    })
}

fn float_number(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, |v| coerce::number(v).is_some_and(|f| !f.is_nan()))
}

fn date(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, |v| v.as_str().is_some_and(coerce::is_date))
}

fn time(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, |v| v.as_str().is_some_and(coerce::is_time))
}

fn timestamp(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, |v| v.as_str().is_some_and(coerce::is_timestamp))
}

fn list(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, Value::is_array)
}

fn map(input: ValidatorInput<'_, '_>) -> bool {
    present(&input, Value::is_object)
}

/// Required, and not only whitespace when textual.
fn not_blank(input: ValidatorInput<'_, '_>) -> bool {
    match input.value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

pub(crate) fn install(catalog: &mut Catalog) {
    catalog.insert_validator(OBJECT_CONSTRAINT, Validator::new(object));
    catalog.insert_validator("String", Validator::new(string));
    catalog.insert_validator("Boolean", Validator::new(boolean));
    catalog.insert_validator("IntegerNumber", Validator::new(integer_number));
    catalog.insert_validator("FloatNumber", Validator::new(float_number));
    catalog.insert_validator("Date", Validator::new(date));
    catalog.insert_validator("Time", Validator::new(time));
    catalog.insert_validator("Timestamp", Validator::new(timestamp));
    catalog.insert_validator("List", Validator::new(list));
    catalog.insert_validator("Map", Validator::new(map));
    catalog.insert_validator("NotBlank", Validator::new(not_blank).html_required());
    catalog.insert_validator(INVALID_NUMBER_OF_GENERIC_ARGUMENTS, Validator::new(|_| false).global());
}
