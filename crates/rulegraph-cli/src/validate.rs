//! # Validate Subcommand
//!
//! `rulegraph validate --catalog rules.yaml --type Person people/*.json`
//!
//! Validates each document against one type and prints its violations.
//! Exits with 1 when any document has violations.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rulegraph_core::document::load_value;
use rulegraph_core::{Catalog, TypeName, Violation};
use serde::Serialize;

use crate::{display_path, effective_groups, encode, label, load_catalog, parse_type_name, OutputFormat};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Catalog document (.json, .yaml, .yml) layered over the built-ins. Repeatable.
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalogs: Vec<PathBuf>,

    /// Type the documents must conform to, e.g. `Person` or `List<Person>`.
    #[arg(long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Validation group. Repeatable; `Default` when omitted.
    #[arg(long = "group", value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// JSON or YAML documents to validate.
    #[arg(required = true, value_name = "DOCUMENT")]
    pub documents: Vec<PathBuf>,
}

/// Violations found in one document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReport {
    pub document: String,
    pub violations: Vec<Violation>,
}

impl DocumentReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validate every document against `type_name`. Stops at the first document
/// that cannot be read.
pub fn validate_documents(
    catalog: &Catalog,
    type_name: &TypeName,
    groups: &[String],
    documents: &[PathBuf],
) -> Result<Vec<DocumentReport>> {
    documents
        .iter()
        .map(|path| {
            let value = load_value(path).with_context(|| format!("failed to read document {}", path.display()))?;
            let violations = catalog.validate_object(type_name, &value, groups);
            tracing::info!(document = %path.display(), violations = violations.len(), "document validated");
            Ok(DocumentReport {
                document: label(path),
                violations,
            })
        })
        .collect()
}

/// Human-readable report: one status line per document, one line per
/// violation, and a closing summary.
pub fn render_text(reports: &[DocumentReport]) -> String {
    let mut out = String::new();
    for report in reports {
        if report.is_valid() {
            out.push_str(&format!("OK: {}\n", report.document));
            continue;
        }
        let count = report.violations.len();
        let noun = if count == 1 { "violation" } else { "violations" };
        out.push_str(&format!("FAIL: {} ({count} {noun})\n", report.document));
        for violation in &report.violations {
            out.push_str(&format!(
                "  {}: {}: {}\n",
                display_path(&violation.property_path),
                violation.constraint_name(),
                violation.message
            ));
        }
    }
    let valid = reports.iter().filter(|r| r.is_valid()).count();
    out.push_str(&format!("{valid} of {} documents valid\n", reports.len()));
    out
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let catalog = load_catalog(&args.catalogs)?;
    let type_name = parse_type_name(&args.type_name)?;
    let groups = effective_groups(&args.groups);

    let reports = validate_documents(&catalog, &type_name, &groups, &args.documents)?;
    match args.format {
        OutputFormat::Text => print!("{}", render_text(&reports)),
        format => println!("{}", encode(&reports, format)?),
    }

    if reports.iter().all(DocumentReport::is_valid) {
        Ok(0)
    } else {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const RULES: &str = r#"
types:
  - typeName: Person
    properties:
      name:
        propertyTypeName: String
        constraints:
          - constraintName: NotNull
      age:
        propertyTypeName: int
        constraints:
          - constraintName: Max
            attributes: { value: 99 }
          - constraintName: Min
            attributes: { value: 18, groups: [Adult] }
"#;

    struct Fixture {
        dir: tempfile::TempDir,
        catalog: Catalog,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let rules = dir.path().join("rules.yaml");
            fs::write(&rules, RULES).unwrap();
            let catalog = load_catalog(&[rules]).unwrap();
            Self { dir, catalog }
        }

        fn document(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        }
    }

    fn person() -> TypeName {
        TypeName::simple("Person")
    }

    #[test]
    fn test_validate_json_and_yaml_documents() {
        let fixture = Fixture::new();
        let documents = [
            fixture.document("ok.json", r#"{ "name": "Ann", "age": 30 }"#),
            fixture.document("bad.yaml", "age: 150\n"),
        ];
        let reports = validate_documents(&fixture.catalog, &person(), &effective_groups(&[]), &documents).unwrap();
        assert!(reports[0].is_valid());
        let found: Vec<(&str, &str)> = reports[1]
            .violations
            .iter()
            .map(|v| (v.constraint_name(), v.property_path.as_str()))
            .collect();
        assert_eq!(found, [("NotNull", ".name"), ("Max", ".age")]);
    }

    #[test]
    fn test_groups_select_constraints() {
        let fixture = Fixture::new();
        let documents = [fixture.document("minor.json", r#"{ "name": "Tim", "age": 12 }"#)];
        let default = validate_documents(&fixture.catalog, &person(), &effective_groups(&[]), &documents).unwrap();
        assert!(default[0].is_valid());
        let adult = validate_documents(&fixture.catalog, &person(), &["Adult".to_string()], &documents).unwrap();
        assert_eq!(adult[0].violations[0].constraint_name(), "Min");
    }

    #[test]
    fn test_unreadable_document_is_an_error() {
        let fixture = Fixture::new();
        let missing = fixture.dir.path().join("missing.json");
        let err = validate_documents(&fixture.catalog, &person(), &effective_groups(&[]), &[missing]).unwrap_err();
        assert!(format!("{err:#}").contains("missing.json"));
    }

    #[test]
    fn test_render_text() {
        let fixture = Fixture::new();
        let documents = [
            fixture.document("a.json", r#"{ "name": "Ann", "age": 40 }"#),
            fixture.document("b.json", r#"{ "age": 100 }"#),
        ];
        let reports = validate_documents(&fixture.catalog, &person(), &effective_groups(&[]), &documents).unwrap();
        let text = render_text(&reports);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("OK: ") && lines[0].ends_with("a.json"));
        assert!(lines[1].starts_with("FAIL: ") && lines[1].ends_with("b.json (2 violations)"));
        assert_eq!(lines[2], "  .name: NotNull: This is required");
        assert_eq!(lines[3], "  .age: Max: This must be less than or equal to 99");
        assert_eq!(lines[4], "1 of 2 documents valid");
    }

    #[test]
    fn test_reports_encode_as_json() {
        let report = DocumentReport {
            document: "x.json".into(),
            violations: Vec::new(),
        };
        let json = encode(&[report], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, serde_json::json!([{ "document": "x.json", "violations": [] }]));
    }
}
