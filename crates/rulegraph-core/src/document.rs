//! # Catalog Documents
//!
//! Rule catalogs ship as JSON (`.json`) or YAML (`.yaml`, `.yml`)
//! documents. A document is either a bare list of type descriptors or an
//! object with `types` and `groupsInheritance`:
//!
//! ```yaml
//! types:
//!   - typeName: Person
//!     properties:
//!       age:
//!         propertyTypeName: int
//!         constraints:
//!           - constraintName: Max
//!             attributes: { value: 99 }
//! groupsInheritance:
//!   Strict: [Default]
//! ```
//!
//! The same extension rules apply to data documents read with
//! [`load_value`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::Catalog;
use crate::descriptor::TypeDescriptor;
use crate::error::CatalogError;

/// Label used in errors for documents parsed from memory.
const INLINE: &str = "<inline>";

/// A parsed catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "DocumentRepr")]
pub struct CatalogDocument {
    /// Type descriptors, registered in order.
    pub types: Vec<TypeDescriptor>,
    /// Group name to parent group names.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub groups_inheritance: BTreeMap<String, Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentRepr {
    Types(Vec<TypeDescriptor>),
    Full {
        #[serde(default)]
        types: Vec<TypeDescriptor>,
        #[serde(default, rename = "groupsInheritance")]
        groups_inheritance: BTreeMap<String, Vec<String>>,
    },
}

impl From<DocumentRepr> for CatalogDocument {
    fn from(repr: DocumentRepr) -> Self {
        match repr {
            DocumentRepr::Types(types) => Self {
                types,
                groups_inheritance: BTreeMap::new(),
            },
            DocumentRepr::Full {
                types,
                groups_inheritance,
            } => Self {
                types,
                groups_inheritance,
            },
        }
    }
}

/// Document formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Result<Format, CatalogError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("yaml" | "yml") => Ok(Format::Yaml),
        _ => Err(CatalogError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl CatalogDocument {
    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        parse_json(input, INLINE)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, CatalogError> {
        parse_yaml(input, INLINE)
    }

    /// Read a document, choosing the format from the extension.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let format = format_of(path)?;
        let content = read(path)?;
        let label = path.display().to_string();
        match format {
            Format::Json => parse_json(&content, &label),
            Format::Yaml => parse_yaml(&content, &label),
        }
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(input: &str, path: &str) -> Result<T, CatalogError> {
    serde_json::from_str(input).map_err(|source| CatalogError::Json {
        path: path.to_string(),
        source,
    })
}

fn parse_yaml<T: for<'de> Deserialize<'de>>(input: &str, path: &str) -> Result<T, CatalogError> {
    serde_yaml::from_str(input).map_err(|source| CatalogError::Yaml {
        path: path.to_string(),
        source,
    })
}

impl Catalog {
    /// Register a document's types and merge its group inheritance.
    ///
    /// A cycle in the resulting inheritance map is logged; group resolution
    /// over such a map does not terminate.
    pub fn load_document(&mut self, document: CatalogDocument) {
        let count = document.types.len();
        self.register_types(document.types);
        for (group, parents) in document.groups_inheritance {
            self.insert_group_inheritance(group, parents);
        }
        if let Some(cycle) = self.find_inheritance_cycle() {
            tracing::warn!(cycle = %cycle.join(" -> "), "group inheritance contains a cycle");
        }
        tracing::debug!(types = count, "catalog document loaded");
    }

    /// Read and register a catalog document file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), CatalogError> {
        let document = CatalogDocument::load(path)?;
        self.load_document(document);
        Ok(())
    }
}

/// Read a JSON or YAML data document as a JSON value.
pub fn load_value(path: &Path) -> Result<Value, CatalogError> {
    let format = format_of(path)?;
    let content = read(path)?;
    let label = path.display().to_string();
    match format {
        Format::Json => parse_json(&content, &label),
        Format::Yaml => {
            let yaml: serde_yaml::Value = parse_yaml(&content, &label)?;
            yaml_to_json_value(&yaml).map_err(|reason| CatalogError::UnrepresentableYaml {
                path: label,
                reason,
            })
        }
    }
}

/// Convert a YAML value tree into the equivalent JSON value tree.
///
/// Tags are dropped; scalar map keys are stringified.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
