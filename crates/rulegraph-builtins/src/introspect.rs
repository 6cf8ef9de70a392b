//! # Introspection Utilities
//!
//! Callers of the visitor engine that read the rules instead of checking a
//! value:
//!
//! - [`html_input_type`] and [`html_validation_rules`] walk a property's
//!   rules without a value and derive hints for a form field.
//! - [`fill_object_properties`] and [`set_object_type`] walk a value and
//!   edit it: the first adds `null` for declared properties the value lacks,
//!   the second tags every object with its resolved type name.
//!
//! The editing utilities record their edits as JSON pointers while the walk
//! holds a shared borrow of the value, then apply them once the walk is
//! done.

use rulegraph_core::{Catalog, HookVisitor, PropertyKey, PropertyRef, TypeRef, Violation, DEFAULT_GROUP};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validators::coerce;
use crate::validators::standard::MAX_INTEGER_VALUE;

/// The outcome of an introspection, with the structural violations
/// (unknown types, properties or validators) met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Introspection<T> {
    pub value: T,
    pub violations: Vec<Violation>,
}

/// Kind of form input a property needs.
///
/// `float`, `datetime`, `textarea` and `money` are not standard HTML input
/// types. The last four kinds are derived from the custom constraints
/// `Multiline`, `Password`, `PhoneNumber` and `Money`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Checkbox,
    Number,
    Float,
    Date,
    Time,
    Datetime,
    Email,
    Url,
    Textarea,
    Password,
    Tel,
    Money,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Number => "number",
            Self::Float => "float",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::Email => "email",
            Self::Url => "url",
            Self::Textarea => "textarea",
            Self::Password => "password",
            Self::Tel => "tel",
            Self::Money => "money",
        }
    }

    fn for_constraint(constraint_name: &str) -> Option<Self> {
        Some(match constraint_name {
            "String" => Self::Text,
            "Boolean" => Self::Checkbox,
            "IntegerNumber" => Self::Number,
            "FloatNumber" => Self::Float,
            "Date" => Self::Date,
            "Time" => Self::Time,
            "Timestamp" => Self::Datetime,
            "Email" => Self::Email,
            "URL" => Self::Url,
            "Multiline" => Self::Textarea,
            "Password" => Self::Password,
            "PhoneNumber" => Self::Tel,
            "Money" => Self::Money,
            _ => return None,
        })
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form validation attributes derivable from the rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlValidationRules {
    /// Null, missing and empty values are not accepted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Maximum number of characters of the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl HtmlValidationRules {
    /// Keep the tighter of the current and the candidate length.
    fn limit(&mut self, max_length: u64) {
        if self.max_length.map_or(true, |current| current > max_length) {
            self.max_length = Some(max_length);
        }
    }
}

/// Derive the input type of a property from the constraints reachable from
/// it, basic types included. `String` yields `text` only when nothing more
/// specific was found; later constraints override earlier ones.
///
/// The value is `None` when the property cannot be resolved or no
/// constraint suggests an input type.
pub fn html_input_type<'a, S: AsRef<str>>(
    catalog: &Catalog,
    property: impl Into<PropertyRef<'a>>,
    name: impl Into<PropertyKey>,
    groups: &[S],
) -> Introspection<Option<InputType>> {
    let key = name.into();
    let mut violations = Vec::new();
    let Some(descriptor) = catalog.lookup_property(property.into(), &key, None, "", &mut violations) else {
        return Introspection { value: None, violations };
    };

    let mut input_type = None;
    let visitor = HookVisitor::new()
        .on_start_constraint(|node, _| {
            match InputType::for_constraint(&node.descriptor.constraint_name) {
                Some(InputType::Text) if input_type.is_some() => {}
                Some(found) => input_type = Some(found),
                None => {}
            }
            true
        })
        .ignore_value()
        .descend_basic_types();
    violations.extend(catalog.visit_property(&*descriptor, key, None, groups, visitor));
    Introspection { value: input_type, violations }
}

/// Derive `required` and `maxLength` for a property's input.
///
/// `required` holds when any reachable validator is HTML-required. Each of
/// `Size`, `Length`, `Digits`, `Min`, `Max`, `DecimalMin` and `DecimalMax`
/// proposes a maximum length and the smallest proposal wins. Constraints
/// without a registered validator are skipped.
pub fn html_validation_rules<'a, S: AsRef<str>>(
    catalog: &Catalog,
    property: impl Into<PropertyRef<'a>>,
    name: impl Into<PropertyKey>,
    groups: &[S],
) -> Introspection<Option<HtmlValidationRules>> {
    let key = name.into();
    let mut violations = Vec::new();
    let Some(descriptor) = catalog.lookup_property(property.into(), &key, None, "", &mut violations) else {
        return Introspection { value: None, violations };
    };

    let mut rules = HtmlValidationRules::default();
    let visitor = HookVisitor::new()
        .on_start_validator(|node, _| {
            let Some(validator) = node.validator else {
                return true;
            };
            if validator.is_html_required() {
                rules.required = true;
            }
            let attribute = |key: &str| node.attributes.get(key).and_then(coerce::number).filter(|n| !n.is_nan());
            match node.name {
                "Size" | "Length" => {
                    let min = attribute("min").unwrap_or(0.0);
                    let max = attribute("max").filter(|n| *n != 0.0).unwrap_or(MAX_INTEGER_VALUE as f64);
                    rules.limit(min.max(max).max(0.0) as u64);
                }
                "Digits" => {
                    let integer = attribute("integer").unwrap_or(0.0).max(0.0) as u64;
                    let fraction = attribute("fraction").unwrap_or(0.0).max(0.0) as u64;
                    // Room for the sign, and for the decimal point when there is a fraction.
                    let mut max_length = integer + 1;
                    if fraction > 0 {
                        max_length += 1 + fraction;
                    }
                    rules.limit(max_length);
                }
                "Min" | "Max" | "DecimalMin" | "DecimalMax" => {
                    let bound = attribute("value").unwrap_or(0.0);
                    rules.limit(bound.to_string().chars().count() as u64);
                }
                _ => {}
            }
            true
        })
        .ignore_value()
        .descend_basic_types();
    violations.extend(catalog.visit_property(&*descriptor, key, None, groups, visitor));
    Introspection { value: Some(rules), violations }
}

/// Insert `null` for every declared property missing from an object, and,
/// when `recursively`, from the nested objects the walk reaches.
///
/// Values that are neither objects nor arrays are left alone.
pub fn fill_object_properties<'a>(
    catalog: &Catalog,
    ty: impl Into<TypeRef<'a>>,
    value: &mut Value,
    recursively: bool,
    even_not_cascade: bool,
) -> Vec<Violation> {
    let ty = ty.into();
    if !matches!(value, Value::Object(_) | Value::Array(_)) {
        let mut violations = Vec::new();
        catalog.lookup_type(ty, Some(&*value), "", &mut violations);
        return violations;
    }

    let mut missing: Vec<(String, String)> = Vec::new();
    let mut visitor = HookVisitor::new().on_start_property(|node, _| {
        if let (Some(Value::Object(container)), PropertyKey::Name(name)) = (node.container, node.name) {
            if !container.contains_key(name) {
                missing.push((node.path.json_pointer(), name.clone()));
            }
        }
        true
    });
    if recursively {
        visitor = visitor.recursively(even_not_cascade);
    }
    let violations = catalog.visit_object(ty, Some(&*value), &[DEFAULT_GROUP], visitor);

    for (pointer, name) in missing {
        if let Some(Value::Object(container)) = value.pointer_mut(&pointer) {
            container.entry(name).or_insert(Value::Null);
        }
    }
    tracing::trace!(violations = violations.len(), "object properties filled");
    violations
}

/// Write the resolved type name under `type_property` into every object the
/// walk reaches. Generic names are written in their array form.
///
/// Values that are neither objects nor arrays are left alone, and the walk
/// does not go below them.
pub fn set_object_type<'a>(
    catalog: &Catalog,
    ty: impl Into<TypeRef<'a>>,
    value: &mut Value,
    type_property: &str,
    recursively: bool,
    even_not_cascade: bool,
) -> Vec<Violation> {
    let ty = ty.into();
    if !matches!(value, Value::Object(_) | Value::Array(_)) {
        let mut violations = Vec::new();
        catalog.lookup_type(ty, Some(&*value), "", &mut violations);
        return violations;
    }

    let mut tagged: Vec<(String, Value)> = Vec::new();
    let mut visitor = HookVisitor::new().on_start_type(|node, _| match node.value {
        Some(Value::Object(_)) => {
            tagged.push((node.path.json_pointer(), node.descriptor.type_name.to_value()));
            true
        }
        Some(Value::Array(_)) => true,
        _ => false,
    });
    if recursively {
        visitor = visitor.recursively(even_not_cascade);
    }
    let violations = catalog.visit_object(ty, Some(&*value), &[DEFAULT_GROUP], visitor);

    for (pointer, type_name) in tagged {
        if let Some(Value::Object(object)) = value.pointer_mut(&pointer) {
            object.insert(type_property.to_string(), type_name);
        }
    }
    violations
}
