//! # English Messages
//!
//! [`EnglishMessageFormatter`] turns `{ConstraintName}` templates into
//! English sentences using the constraint's attributes. The qualified form
//! `{javax.validation.constraints.Max.message}` is accepted as an alias of
//! `{Max}`. Templates it does not know are returned unchanged, so custom
//! messages pass straight through.

use rulegraph_core::{Attributes, MessageFormatter};
use serde_json::Value;

use crate::validators::standard::MAX_INTEGER_VALUE;

/// Formats violations as English sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessageFormatter;

impl MessageFormatter for EnglishMessageFormatter {
    fn format(&self, template: &str, attributes: Option<&Attributes>, invalid_value: Option<&Value>) -> String {
        let attributes = Attrs(attributes);
        if let Some(message) = sentence(template, &attributes, invalid_value) {
            return message;
        }
        match qualified_name(template) {
            Some(name) => sentence(&format!("{{{name}}}"), &attributes, invalid_value)
                .unwrap_or_else(|| template.to_string()),
            None => template.to_string(),
        }
    }
}

/// `Max` out of `{javax.validation.constraints.Max.message}`.
fn qualified_name(template: &str) -> Option<&str> {
    let inner = template.strip_prefix('{')?.strip_suffix('}')?.strip_suffix(".message")?;
    let (_, name) = inner.rsplit_once('.')?;
    (!name.is_empty()).then_some(name)
}

struct Attrs<'a>(Option<&'a Attributes>);

impl Attrs<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.and_then(|attributes| attributes.get(key))
    }

    /// Display form of an attribute; empty when unset.
    fn text(&self, key: &str) -> String {
        self.get(key).map(localized).unwrap_or_default()
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// A value the way an English locale prints it: `2,147,483,647`, `0.5`.
fn localized(value: &Value) -> String {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => group_thousands(&i.to_string()),
            (None, Some(f)) => {
                let rounded = format!("{f:.3}");
                let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
                match trimmed.split_once('.') {
                    Some((whole, fraction)) => format!("{}.{fraction}", group_thousands(whole)),
                    None => group_thousands(trimmed),
                }
            }
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(localized).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

fn plural(count: f64, singular: &str, plural: &str) -> String {
    if count == 1.0 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

/// Length of the offending value, for choosing between the lower and upper
/// bound message.
fn measured(invalid_value: Option<&Value>) -> Option<f64> {
    match invalid_value? {
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn below_min(attributes: &Attrs<'_>, invalid_value: Option<&Value>, measure: impl Fn(Option<&Value>) -> Option<f64>) -> bool {
    let min = attributes.number("min").unwrap_or(0.0);
    measure(invalid_value).is_some_and(|length| length < min)
}

fn or_default(attributes: &Attrs<'_>, key: &str, default: i64) -> String {
    match attributes.get(key) {
        Some(value) if !value.is_null() => localized(value),
        _ => group_thousands(&default.to_string()),
    }
}

fn sentence(template: &str, attributes: &Attrs<'_>, invalid_value: Option<&Value>) -> Option<String> {
    let message = match template {
        // Structural
        "{Object}" => "This must be an object".to_string(),
        "{IntegerNumber}" => "This must be an integer number".to_string(),
        "{FloatNumber}" => "This must be a number".to_string(),
        "{String}" => "This must be a character string".to_string(),
        "{Boolean}" => "This must be true or false".to_string(),
        "{Date}" => "This must be a date".to_string(),
        "{Time}" => "This must be a time".to_string(),
        "{Timestamp}" => "This must be a date with time".to_string(),
        "{List}" => "This is not a list".to_string(),
        "{Map}" => "This is not a dictionary with key and value".to_string(),
        "{InvalidNumberGenenricArguments}" => "Wrong number of generic arguments".to_string(),
        "{TypeNotFound}" => format!(
            "Not found the definition of the class of type \"{}\"",
            attributes.get("typeName").map(type_name_text).unwrap_or_default()
        ),
        "{PropertyNotFound}" => format!(
            "Not found the property definition of \"{}\"",
            attributes.text("propertyName")
        ),
        "{ValidatorNotFound}" => format!(
            "Not found validator of type \"{}\"",
            attributes.text("constraintName")
        ),
        "{InvalidConstraintAttributeValue}" => format!(
            "Invalid constraint value in the property \"{}\": {}",
            attributes.text("attributeName"),
            attributes.text("description")
        ),
        // Standard
        "{AssertFalse}" => "This must be false".to_string(),
        "{AssertTrue}" => "This must be true".to_string(),
        "{DecimalMax}" => {
            let inclusive = attributes.get("inclusive").and_then(Value::as_bool).unwrap_or(true);
            if inclusive {
                format!("This must be less than or equal to {}", attributes.text("value"))
            } else {
                format!("This must be a number less than {}", attributes.text("value"))
            }
        }
        "{DecimalMin}" => {
            let inclusive = attributes.get("inclusive").and_then(Value::as_bool).unwrap_or(true);
            if inclusive {
                format!("This must be a number greater than or equal to {}", attributes.text("value"))
            } else {
                format!("This must be a number greater than {}", attributes.text("value"))
            }
        }
        "{Digits}" => {
            let integer = attributes.number("integer").unwrap_or(0.0);
            let fraction = attributes.number("fraction").unwrap_or(0.0);
            let before = format!(
                "This must be a number of {} {} before",
                attributes.text("integer"),
                plural(integer, "place", "places")
            );
            if fraction > 0.0 {
                format!(
                    "{before} and {} {} after the decimal point",
                    attributes.text("fraction"),
                    plural(fraction, "place", "places")
                )
            } else {
                format!("{before} the decimal point")
            }
        }
        "{Future}" => "This must be a date in the future".to_string(),
        "{Past}" => "This must be a date in the past".to_string(),
        "{Max}" => format!("This must be less than or equal to {}", attributes.text("value")),
        "{Min}" => format!("This must be a number greater than or equal to {}", attributes.text("value")),
        "{NotNull}" | "{NotBlank}" => "This is required".to_string(),
        "{Null}" => "This must not have value".to_string(),
        "{NotEmpty}" => "This can not be empty".to_string(),
        "{Pattern}" => format!(
            "This must match the regular expression \"{}\"",
            attributes.text("regexp")
        ),
        "{Size}" => {
            if below_min(attributes, invalid_value, measured) {
                format!(
                    "This must be a number greater than or equal to {}",
                    or_default(attributes, "min", 0)
                )
            } else {
                format!(
                    "This must be less than or equal to {}",
                    or_default(attributes, "max", MAX_INTEGER_VALUE)
                )
            }
        }
        "{Length}" => {
            if below_min(attributes, invalid_value, measured) {
                let min = attributes.number("min").unwrap_or(0.0);
                format!(
                    "The length must be greater than or equal to {} {}",
                    or_default(attributes, "min", 0),
                    plural(min, "character", "characters")
                )
            } else {
                let max = attributes.number("max").unwrap_or(MAX_INTEGER_VALUE as f64);
                format!(
                    "The length must be less than or equal to {} {}",
                    or_default(attributes, "max", MAX_INTEGER_VALUE),
                    plural(max, "character", "characters")
                )
            }
        }
        "{Email}" => "This must be a valid email address".to_string(),
        "{URL}" => "This must be a valid URL".to_string(),
        _ => return None,
    };
    Some(message)
}

/// `Map<String, Integer>` out of the wire form of a type name.
fn type_name_text(value: &Value) -> String {
    match serde_json::from_value::<rulegraph_core::TypeName>(value.clone()) {
        Ok(name) => name.to_string(),
        Err(_) => localized(value),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn grouping_only_inserts_separators(n in any::<i64>()) {
            let grouped = group_thousands(&n.to_string());
            prop_assert_eq!(grouped.replace(',', ""), n.to_string());
            for chunk in grouped.trim_start_matches('-').split(',').skip(1) {
                prop_assert_eq!(chunk.len(), 3);
            }
        }

        #[test]
        fn unknown_templates_are_untouched(template in "[a-z ]{0,24}") {
            prop_assert_eq!(EnglishMessageFormatter.format(&template, None, None), template);
        }
    }
}
