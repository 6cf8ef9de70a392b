//! Shared fixture: a small catalog with people, addresses and lists.

#![allow(dead_code)]

use rulegraph_core::{Catalog, ConstraintDescriptor, PropertyDescriptor, TypeDescriptor, TypeName, Validator};
use serde_json::Value;

fn number_at_most(input_value: Option<&Value>, bound: Option<&Value>) -> bool {
    match (input_value.and_then(Value::as_f64), bound.and_then(Value::as_f64)) {
        (Some(value), Some(max)) => value <= max,
        _ => true,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

/// Element descriptor of `List<T>`: `T`, or `Object` without arguments.
pub fn list_factory(name: &TypeName) -> TypeDescriptor {
    let element = name
        .arguments()
        .first()
        .cloned()
        .unwrap_or_else(|| TypeName::simple("Object"));
    TypeDescriptor::collection(name.clone(), Some(PropertyDescriptor::new(element)))
}

pub fn validators(catalog: &mut Catalog) {
    catalog.insert_validator(
        "Object",
        Validator::new(|input| !matches!(input.value, Some(v) if !v.is_object() && !v.is_array())),
    );
    catalog.insert_validator(
        "String",
        Validator::new(|input| !matches!(input.value, Some(v) if !v.is_string() && !v.is_null())),
    );
    catalog.insert_validator(
        "IntegerNumber",
        Validator::new(|input| !matches!(input.value, Some(v) if !v.is_i64() && !v.is_u64() && !v.is_null())),
    );
    catalog.insert_validator(
        "NotNull",
        Validator::new(|input| !matches!(input.value, None | Some(Value::Null))).html_required(),
    );
    catalog.insert_validator("Max", Validator::new(|input| number_at_most(input.value, input.attribute("value"))));
    catalog.insert_validator(
        "Size",
        Validator::new(|input| {
            let Some(length) = input.value.and_then(length_of) else {
                return true;
            };
            let min = input.attribute("min").and_then(Value::as_u64).unwrap_or(0) as usize;
            let max = input.attribute("max").and_then(Value::as_u64).unwrap_or(u64::MAX) as usize;
            (min..=max).contains(&length)
        })
        .with_default("min", 0)
        .with_default("max", 2147483647),
    );
}

/// Catalog with `String`, `Integer`, `List<T>`, `Address` and `Person`.
pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    validators(&mut catalog);
    catalog.insert_type(TypeDescriptor::basic("String").with_constraint(ConstraintDescriptor::new("String")));
    catalog.insert_type(TypeDescriptor::basic("Integer").with_constraint(ConstraintDescriptor::new("IntegerNumber")));
    catalog.insert_factory("List", list_factory);
    catalog.insert_type(
        TypeDescriptor::new("Address").with_property(
            "city",
            PropertyDescriptor::new("String").with_constraint(ConstraintDescriptor::new("NotNull")),
        ),
    );
    catalog.insert_type(
        TypeDescriptor::new("Person")
            .with_property(
                "name",
                PropertyDescriptor::new("String").with_constraint(ConstraintDescriptor::new("NotNull")),
            )
            .with_property(
                "age",
                PropertyDescriptor::new("Integer")
                    .with_constraint(ConstraintDescriptor::new("Max").with_attribute("value", 99)),
            )
            .with_property("address", PropertyDescriptor::new("Address").cascaded())
            .with_property(
                "tags",
                PropertyDescriptor::new(TypeName::generic("List", vec![TypeName::simple("String")]))
                    .cascaded()
                    .with_constraint(ConstraintDescriptor::new("Size").with_attribute("max", 2)),
            ),
    );
    catalog
}

pub fn person() -> TypeName {
    TypeName::simple("Person")
}

/// `(constraint name, property path)` of each violation, in order.
pub fn summary(violations: &[rulegraph_core::Violation]) -> Vec<(String, String)> {
    violations
        .iter()
        .map(|v| (v.constraint_name().to_string(), v.property_path.clone()))
        .collect()
}

pub fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(name, path)| (name.to_string(), path.to_string()))
        .collect()
}
