//! # Describe Subcommand
//!
//! `rulegraph describe --catalog rules.yaml --type Person --property age`
//!
//! Prints the HTML input type and validation rules derived from a
//! property's rules. Exits with 1 when the type or property is unknown.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rulegraph_builtins::{html_input_type, html_validation_rules, HtmlValidationRules, InputType};
use rulegraph_core::{Catalog, TypeName, Violation};
use serde::Serialize;

use crate::{display_path, effective_groups, encode, load_catalog, parse_type_name, OutputFormat};

/// Arguments for the describe subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Catalog document (.json, .yaml, .yml) layered over the built-ins. Repeatable.
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalogs: Vec<PathBuf>,

    /// Type declaring the property.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Property to describe.
    #[arg(long, value_name = "NAME")]
    pub property: String,

    /// Validation group. Repeatable; `Default` when omitted.
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Form hints for one property.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescription {
    pub type_name: String,
    pub property: String,
    pub input_type: Option<InputType>,
    pub validation_rules: Option<HtmlValidationRules>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

/// Derive the hints of `property` on `type_name`.
pub fn describe_property(catalog: &Catalog, type_name: &TypeName, property: &str, groups: &[String]) -> PropertyDescription {
    let input = html_input_type(catalog, type_name, property, groups);
    let rules = html_validation_rules(catalog, type_name, property, groups);
    // Both walks see the same structural problems; keep one copy.
    let mut violations = input.violations;
    for violation in rules.violations {
        if !violations.contains(&violation) {
            violations.push(violation);
        }
    }
    PropertyDescription {
        type_name: type_name.to_string(),
        property: property.to_string(),
        input_type: input.value,
        validation_rules: rules.value,
        violations,
    }
}

pub fn render_text(description: &PropertyDescription) -> String {
    let mut out = format!("{}.{}\n", description.type_name, description.property);
    let input_type = description.input_type.map_or("-", |t| t.as_str());
    out.push_str(&format!("  input type: {input_type}\n"));
    if let Some(rules) = &description.validation_rules {
        out.push_str(&format!("  required:   {}\n", rules.required));
        match rules.max_length {
            Some(max_length) => out.push_str(&format!("  max length: {max_length}\n")),
            None => out.push_str("  max length: -\n"),
        }
    }
    for violation in &description.violations {
        out.push_str(&format!(
            "  ! {}: {}: {}\n",
            display_path(&violation.property_path),
            violation.constraint_name(),
            violation.message
        ));
    }
    out
}

/// Execute the describe subcommand.
pub fn run_describe(args: &DescribeArgs) -> Result<u8> {
    let catalog = load_catalog(&args.catalogs)?;
    let type_name = parse_type_name(&args.type_name)?;
    let groups = effective_groups(&args.groups);

    let description = describe_property(&catalog, &type_name, &args.property, &groups);
    match args.format {
        OutputFormat::Text => print!("{}", render_text(&description)),
        format => println!("{}", encode(&description, format)?),
    }

    if description.validation_rules.is_some() {
        Ok(0)
    } else {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulegraph_core::CatalogDocument;

    fn catalog() -> Catalog {
        let mut catalog = load_catalog(&[]).unwrap();
        catalog.load_document(
            CatalogDocument::from_json_str(
                r#"[{
                    "typeName": "Account",
                    "properties": {
                        "email": {
                            "propertyTypeName": "String",
                            "constraints": [
                                { "constraintName": "NotNull" },
                                { "constraintName": "Email" },
                                { "constraintName": "Size", "attributes": { "max": 64 } }
                            ]
                        },
                        "limit": {
                            "propertyTypeName": "BigDecimal",
                            "constraints": [{ "constraintName": "DecimalMax", "attributes": { "value": "5000.5" } }]
                        }
                    }
                }]"#,
            )
            .unwrap(),
        );
        catalog
    }

    fn account() -> TypeName {
        TypeName::simple("Account")
    }

    #[test]
    fn test_describe_email() {
        let description = describe_property(&catalog(), &account(), "email", &effective_groups(&[]));
        assert_eq!(description.input_type, Some(InputType::Email));
        assert_eq!(
            description.validation_rules,
            Some(HtmlValidationRules {
                required: true,
                max_length: Some(64)
            })
        );
        assert_eq!(
            render_text(&description),
            "Account.email\n  input type: email\n  required:   true\n  max length: 64\n"
        );
    }

    #[test]
    fn test_describe_decimal_bound() {
        let description = describe_property(&catalog(), &account(), "limit", &effective_groups(&[]));
        assert_eq!(description.input_type, Some(InputType::Float));
        assert_eq!(description.validation_rules.unwrap().max_length, Some(6));
    }

    #[test]
    fn test_unknown_property_reported_once() {
        let description = describe_property(&catalog(), &account(), "phone", &effective_groups(&[]));
        assert_eq!(description.input_type, None);
        assert!(description.validation_rules.is_none());
        assert_eq!(description.violations.len(), 1);
        assert_eq!(description.violations[0].constraint_name(), "PropertyNotFound");
        assert!(render_text(&description).contains("  input type: -\n"));
    }

    #[test]
    fn test_description_serializes() {
        let description = describe_property(&catalog(), &account(), "email", &effective_groups(&[]));
        let value = serde_json::to_value(&description).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "typeName": "Account",
                "property": "email",
                "inputType": "email",
                "validationRules": { "required": true, "maxLength": 64 }
            })
        );
    }
}
