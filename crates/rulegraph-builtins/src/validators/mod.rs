//! # Built-in Validators
//!
//! - [`structural`]: JSON shape checks behind the built-in types
//!   (`Object`, `String`, `IntegerNumber`, `List`, ...).
//! - [`standard`]: Bean Validation style constraints (`Max`, `Size`,
//!   `Pattern`, `NotNull`, ...).
//!
//! Shared coercions live in `coerce`.

pub(crate) mod coerce;
pub mod standard;
pub mod structural;

use rulegraph_core::Catalog;

/// Register every built-in validator, replacing same-named ones.
pub fn install_validators(catalog: &mut Catalog) {
    structural::install(catalog);
    standard::install(catalog);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulegraph_core::validate::validate_constraint;
    use rulegraph_core::{default_groups, Attributes, ConstraintDescriptor, PropertyPath, Violation, ViolationSinks};
    use serde_json::{json, Value};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        install_validators(&mut catalog);
        catalog
    }

    /// Validate one value; returns validity and the violations recorded.
    fn run(name: &str, attributes: Value, value: Option<Value>) -> (bool, Vec<Violation>) {
        let catalog = catalog();
        let mut constraint = ConstraintDescriptor::new(name);
        if let Value::Object(map) = attributes {
            constraint = constraint.with_attributes(map);
        }
        let mut sinks = ViolationSinks::shared();
        let valid = validate_constraint(
            &catalog,
            &constraint,
            value.as_ref(),
            &PropertyPath::root(),
            default_groups(),
            &mut sinks,
        );
        (valid, sinks.into_violations())
    }

    fn valid(name: &str, attributes: Value, value: Value) -> bool {
        run(name, attributes, Some(value)).0
    }

    #[test]
    fn test_absent_values_pass_except_presence_checks() {
        for name in ["Max", "Min", "Size", "Pattern", "Digits", "Email", "String", "Object", "AssertTrue"] {
            assert!(run(name, json!({ "value": 1, "regexp": "x", "integer": 1, "fraction": 0 }), None).0, "{name}");
        }
        assert!(!run("NotNull", json!({}), None).0);
        assert!(!run("NotBlank", json!({}), Some(Value::Null)).0);
        assert!(run("Null", json!({}), None).0);
        assert!(!run("Null", json!({}), Some(json!(0))).0);
    }

    #[test]
    fn test_structural_shapes() {
        assert!(valid("Object", json!({}), json!({ "a": 1 })));
        assert!(valid("Object", json!({}), json!([1])));
        assert!(!valid("Object", json!({}), json!("x")));
        assert!(valid("IntegerNumber", json!({}), json!(12)));
        assert!(valid("IntegerNumber", json!({}), json!("12")));
        assert!(!valid("IntegerNumber", json!({}), json!(1.5)));
        assert!(valid("FloatNumber", json!({}), json!("1.5")));
        assert!(!valid("Boolean", json!({}), json!("true")));
        assert!(valid("Date", json!({}), json!("2020-05-17")));
        assert!(!valid("Time", json!({}), json!("noon")));
        assert!(!valid("List", json!({}), json!({})));
        assert!(!valid("Map", json!({}), json!([])));
        assert!(!valid("NotBlank", json!({}), json!("   ")));
    }

    #[test]
    fn test_generic_arity_is_global_and_fails() {
        let catalog = catalog();
        let mut sinks = ViolationSinks::split();
        let valid = validate_constraint(
            &catalog,
            &ConstraintDescriptor::new("InvalidNumberGenenricArguments"),
            None,
            &PropertyPath::root(),
            default_groups(),
            &mut sinks,
        );
        assert!(!valid);
        assert!(sinks.violations().is_empty());
        assert_eq!(sinks.global_violations().len(), 1);
    }

    #[test]
    fn test_numeric_bounds_coerce_strings() {
        assert!(valid("Max", json!({ "value": 99 }), json!(99)));
        assert!(!valid("Max", json!({ "value": 99 }), json!("100")));
        assert!(valid("Max", json!({ "value": 99 }), json!("abc")));
        assert!(!valid("Min", json!({ "value": "0" }), json!(-1)));
        assert!(valid("DecimalMax", json!({ "value": "10.5" }), json!(10.5)));
        assert!(!valid("DecimalMax", json!({ "value": "10.5", "inclusive": false }), json!(10.5)));
        assert!(!valid("DecimalMin", json!({ "value": 1 }), json!("NaN")));
    }

    #[test]
    fn test_missing_bound_is_reported_globally() {
        let (valid, violations) = run("Max", json!({}), Some(json!(3)));
        assert!(!valid);
        let names: Vec<&str> = violations.iter().map(Violation::constraint_name).collect();
        assert_eq!(names, ["InvalidConstraintAttributeValue", "Max"]);
        assert_eq!(
            violations[0].constraint_descriptor.attribute("attributeName"),
            Some(&json!("value"))
        );
    }

    #[test]
    fn test_digits_ignores_sign() {
        let attributes = json!({ "integer": 3, "fraction": 2 });
        assert!(valid("Digits", attributes.clone(), json!(-123.45)));
        assert!(!valid("Digits", attributes.clone(), json!(1234)));
        assert!(!valid("Digits", attributes.clone(), json!("1.234")));
        assert!(!valid("Digits", attributes, json!("NaN")));
    }

    #[test]
    fn test_size_and_length() {
        assert!(valid("Size", json!({ "min": 1, "max": 3 }), json!([1, 2])));
        assert!(!valid("Size", json!({ "min": 1 }), json!("")));
        assert!(!valid("Size", json!({ "max": 1 }), json!({ "a": 1, "b": 2 })));
        assert!(valid("Size", json!({}), json!(true)));
        assert!(valid("Length", json!({ "max": 3 }), json!(123)));
        assert!(!valid("Length", json!({ "max": 3 }), json!("abcd")));
        assert!(valid("Length", json!({ "max": 0 }), json!([1, 2, 3])));
        assert!(!valid("NotEmpty", json!({}), json!([])));
    }

    #[test]
    fn test_size_reports_defaults() {
        let (_, violations) = run("Size", json!({ "min": 5 }), Some(json!("abc")));
        let attributes: &Attributes = violations[0].constraint_descriptor.attributes.as_ref().unwrap();
        assert_eq!(attributes["min"], json!(5));
        assert_eq!(attributes["max"], json!(2147483647));
    }

    #[test]
    fn test_pattern_searches_with_flags() {
        assert!(valid("Pattern", json!({ "regexp": "b+" }), json!("abbc")));
        assert!(!valid("Pattern", json!({ "regexp": "^b+$" }), json!("abbc")));
        assert!(valid("Pattern", json!({ "regexp": "^ABC$", "flags": ["CASE_INSENSITIVE"] }), json!("abc")));
        assert!(valid("Pattern", json!({ "regexp": "^\\d+$" }), json!(42)));
        assert!(valid("Pattern", json!({ "regexp": "x" }), json!(true)));
    }

    #[test]
    fn test_pattern_rejects_unsupported_flags() {
        let (valid, violations) = run("Pattern", json!({ "regexp": "a", "flags": ["DOTALL"] }), Some(json!("a")));
        assert!(!valid);
        assert_eq!(violations[0].constraint_name(), "InvalidConstraintAttributeValue");
        assert_eq!(
            violations[0].constraint_descriptor.attribute("description"),
            Some(&json!("Pattern Validator: Dot all flag not supported"))
        );

        let (valid, violations) = run("Pattern", json!({ "regexp": "(" }), Some(json!("a")));
        assert!(!valid);
        assert_eq!(violations[0].constraint_descriptor.attribute("attributeName"), Some(&json!("regexp")));
    }

    #[test]
    fn test_temporal_direction() {
        assert!(valid("Past", json!({}), json!("2000-01-01")));
        assert!(!valid("Future", json!({}), json!("2000-01-01T00:00:00Z")));
        assert!(valid("Future", json!({}), json!("2999-12-31")));
        assert!(!valid("Past", json!({}), json!("not a date")));
        assert!(valid("Past", json!({}), json!(12)));
    }

    #[test]
    fn test_email_and_url() {
        assert!(valid("Email", json!({}), json!("ada@example.org")));
        assert!(!valid("Email", json!({}), json!("ada@")));
        assert!(valid("URL", json!({}), json!("https://example.org/a?b=c")));
        assert!(!valid("URL", json!({}), json!("mailto:ada@example.org")));
        assert!(!valid("URL", json!({ "protocol": "https" }), json!("http://example.org")));
        assert!(valid("URL", json!({ "port": 8080 }), json!("http://example.org:8080/x")));
    }

    #[test]
    fn test_assertions_ignore_non_booleans() {
        assert!(valid("AssertTrue", json!({}), json!(true)));
        assert!(!valid("AssertTrue", json!({}), json!(false)));
        assert!(valid("AssertFalse", json!({}), json!("yes")));
    }
}
