//! End-to-end checks over the built-in catalog with rules loaded from a
//! YAML catalog document.

use rulegraph_builtins::{html_input_type, html_validation_rules, EnglishMessageFormatter, HtmlValidationRules, InputType};
use rulegraph_core::{Catalog, CatalogDocument, TypeName, Violation, DEFAULT_GROUP};
use serde_json::json;

const DEFAULT: &[&str] = &[DEFAULT_GROUP];

const PERSON: &str = r#"
types:
  - typeName: Person
    properties:
      name:
        propertyTypeName: String
        constraints:
          - constraintName: NotEmptyName
            hasNoValidator: true
            reportAsSingle: true
            composingConstraints:
              - constraintName: Size
                attributes: { min: 1 }
              - constraintName: NotNull
      age:
        propertyTypeName: int
        constraints:
          - constraintName: Max
            attributes: { value: 99 }
          - constraintName: Min
            attributes: { value: 0 }
  - typeName: Score
    properties:
      points:
        propertyTypeName: Integer
        constraints:
          - constraintName: Max
            attributes: { value: 99 }
"#;

fn catalog() -> Catalog {
    let mut catalog = rulegraph_builtins::catalog();
    catalog.load_document(CatalogDocument::from_yaml_str(PERSON).unwrap());
    catalog
}

fn person() -> TypeName {
    TypeName::simple("Person")
}

fn summary(violations: &[Violation]) -> Vec<(&str, &str)> {
    violations
        .iter()
        .map(|v| (v.constraint_name(), v.property_path.as_str()))
        .collect()
}

#[test]
fn test_valid_person() {
    let catalog = catalog();
    let violations = catalog.validate_object(&person(), &json!({ "name": "John Smith", "age": 24 }), DEFAULT);
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn test_age_over_max() {
    let catalog = catalog();
    let violations = catalog.validate_object(&person(), &json!({ "name": "John Smith", "age": 999 }), DEFAULT);
    assert_eq!(summary(&violations), [("Max", ".age")]);
    assert_eq!(violations[0].message, r#"{"template":"{Max}","attributes":{"value":99},"invalidValue":999}"#);
}

#[test]
fn test_age_over_max_as_standalone_value() {
    let catalog = catalog();
    let violations = catalog.validate_value_of_property(&person(), "age", Some(&json!(999)), DEFAULT);
    assert_eq!(summary(&violations), [("Max", ".age")]);
    assert_eq!(violations[0].message, r#"{"template":"{Max}","attributes":{"value":99},"invalidValue":999}"#);

    let violations = catalog.validate_value_of_property(&person(), "age", Some(&json!(-1)), DEFAULT);
    assert_eq!(summary(&violations), [("Min", ".age")]);
}

#[test]
fn test_not_empty_name_reports_once() {
    let catalog = catalog();
    let empty = catalog.validate_object(&person(), &json!({ "name": "", "age": 1 }), DEFAULT);
    assert_eq!(summary(&empty), [("NotEmptyName", ".name")]);

    let missing = catalog.validate_object(&person(), &json!({ "age": 1 }), DEFAULT);
    assert_eq!(summary(&missing), [("NotEmptyName", ".name")]);
}

#[test]
fn test_primitive_age_is_structural() {
    let catalog = catalog();
    let violations = catalog.validate_object(&person(), &json!({ "name": "Ann", "age": "old" }), DEFAULT);
    assert_eq!(summary(&violations), [("IntegerNumber", ".age")]);

    // A numeric string passes as a number.
    let violations = catalog.validate_object(&person(), &json!({ "name": "Ann", "age": "120" }), DEFAULT);
    assert_eq!(summary(&violations), [("Max", ".age")]);

    let violations = catalog.validate_object(&person(), &json!({ "name": "Ann" }), DEFAULT);
    assert_eq!(summary(&violations), [("NotBlank", ".age")]);
}

#[test]
fn test_english_messages() {
    let mut catalog = catalog();
    catalog.set_message_formatter(EnglishMessageFormatter);
    let violations = catalog.validate_object(&person(), &json!({ "name": "", "age": 999 }), DEFAULT);
    let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages, ["{NotEmptyName}", "This must be less than or equal to 99"]);
}

#[test]
fn test_generic_collections() {
    let catalog = catalog();
    let list: TypeName = "List<int>".parse().unwrap();
    let violations = catalog.validate_object(&list, &json!(["1", "x", 3]), DEFAULT);
    assert_eq!(summary(&violations), [("IntegerNumber", ".1")]);

    let people: TypeName = "Map<String, Person>".parse().unwrap();
    let violations = catalog.validate_object(&people, &json!({ "ann": { "name": "Ann", "age": 200 } }), DEFAULT);
    // Map values are not declared as cascading, so only basic element types are checked.
    assert!(violations.is_empty());

    let violations = catalog.validate_object(&list, &json!({ "a": 1 }), DEFAULT);
    assert_eq!(summary(&violations), [("List", "")]);
}

#[test]
fn test_generic_arity_mismatch() {
    let catalog = catalog();
    let short: TypeName = "Map<String>".parse().unwrap();
    let violations = catalog.validate_object(&short, &json!({ "a": 1 }), DEFAULT);
    assert_eq!(summary(&violations), [("InvalidNumberGenenricArguments", "")]);
    let attributes = violations[0].constraint_descriptor.attributes.as_ref().unwrap();
    assert_eq!(attributes["expected"], json!(2));
    assert_eq!(attributes["found"], json!(1));
}

#[test]
fn test_container_value_property() {
    let catalog = catalog();
    let boxed: TypeName = "Container<Integer>".parse().unwrap();
    assert!(catalog.validate_object(&boxed, &json!({ "value": 3 }), DEFAULT).is_empty());
    let violations = catalog.validate_object(&boxed, &json!({ "value": "three" }), DEFAULT);
    assert_eq!(summary(&violations), [("IntegerNumber", ".value")]);
}

#[test]
fn test_html_hints() {
    let catalog = catalog();
    let ty = person();
    assert_eq!(html_input_type(&catalog, &ty, "age", DEFAULT).value, Some(InputType::Number));
    assert_eq!(html_input_type(&catalog, &ty, "name", DEFAULT).value, Some(InputType::Text));

    // `Min(0)` renders as "0" and the shortest bound wins.
    let age = html_validation_rules(&catalog, &ty, "age", DEFAULT);
    assert!(age.violations.is_empty());
    assert_eq!(age.value, Some(HtmlValidationRules { required: true, max_length: Some(1) }));

    let points = html_validation_rules(&catalog, &TypeName::simple("Score"), "points", DEFAULT);
    assert!(points.violations.is_empty());
    assert_eq!(points.value, Some(HtmlValidationRules { required: false, max_length: Some(2) }));

    let name = html_validation_rules(&catalog, &ty, "name", DEFAULT);
    assert_eq!(
        name.value,
        Some(HtmlValidationRules {
            required: true,
            max_length: Some(2_147_483_647)
        })
    );
}
