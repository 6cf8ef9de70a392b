//! # Descriptors: Rules Expressed as Data
//!
//! A rule set is a graph of three descriptor kinds:
//!
//! - [`TypeDescriptor`]: a type's own constraints, its named properties,
//!   and the basic-type / collection flags that steer traversal.
//! - [`PropertyDescriptor`]: the referenced type of one property, the
//!   constraints attached to the property, and the cascade rules.
//! - [`ConstraintDescriptor`]: one rule instance: the constraint name that
//!   selects a validator, free-form attributes, and optional composing rules.
//!
//! Every descriptor deserializes from the camelCase JSON/YAML shape produced
//! by bean-introspection tooling, so catalogs can be shipped as documents.
//!
//! ## Type names
//!
//! [`TypeName`] is either `Simple("String")` or
//! `Generic("Map", [String, List<Integer>])`. Resolution only ever looks at
//! the base name; generic arguments are handed to the type's factory. On the
//! wire a generic name is a nested array: `["Map", "String", ["List", "Integer"]]`.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CatalogError;
use crate::path::PropertyKey;

/// Free-form constraint attributes, in declaration order.
pub type Attributes = serde_json::Map<String, Value>;

/// Group conversion rules applied when cascading into a property: `from -> to`.
pub type GroupConversions = IndexMap<String, String>;

/// Name of the implicit structural constraint evaluated on every non-basic value.
pub const OBJECT_CONSTRAINT: &str = "Object";
/// Constraint name of the violation reported for an unknown type.
pub const TYPE_NOT_FOUND: &str = "TypeNotFound";
/// Constraint name of the violation reported for an unknown property.
pub const PROPERTY_NOT_FOUND: &str = "PropertyNotFound";
/// Constraint name of the violation reported for a constraint with no registered validator.
pub const VALIDATOR_NOT_FOUND: &str = "ValidatorNotFound";
/// Constraint name of the violation reported for an unusable constraint attribute.
pub const INVALID_CONSTRAINT_ATTRIBUTE_VALUE: &str = "InvalidConstraintAttributeValue";

fn is_false(flag: &bool) -> bool {
    !*flag
}

// ---------------------------------------------------------------------------
// TypeName
// ---------------------------------------------------------------------------

/// A possibly generic type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TypeNameRepr", into = "TypeNameRepr")]
pub enum TypeName {
    /// A plain name such as `String`.
    Simple(String),
    /// A base name with ordered generic arguments, such as `List<Integer>`.
    Generic(String, Vec<TypeName>),
}

impl TypeName {
    /// A plain type name.
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple(name.into())
    }

    /// A generic type name with the given arguments.
    pub fn generic(name: impl Into<String>, arguments: Vec<TypeName>) -> Self {
        Self::Generic(name.into(), arguments)
    }

    /// The leading name, without generic arguments. This is the catalog key.
    pub fn base_name(&self) -> &str {
        match self {
            Self::Simple(name) | Self::Generic(name, _) => name,
        }
    }

    /// Generic arguments; empty for a simple name.
    pub fn arguments(&self) -> &[TypeName] {
        match self {
            Self::Simple(_) => &[],
            Self::Generic(_, arguments) => arguments,
        }
    }

    /// Whether the name was written in generic form (even with zero arguments).
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic(..))
    }

    /// The wire form: a string, or a nested array for generic names.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Simple(name) => Value::String(name.clone()),
            Self::Generic(name, arguments) => {
                let mut items = Vec::with_capacity(arguments.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(arguments.iter().map(Self::to_value));
                Value::Array(items)
            }
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(name) => f.write_str(name),
            Self::Generic(name, arguments) => {
                write!(f, "{name}<")?;
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                f.write_str(">")
            }
        }
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::Simple(name.to_string())
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self::Simple(name)
    }
}

impl FromStr for TypeName {
    type Err = CatalogError;

    /// Parses the display form, e.g. `Map<String, List<Integer>>`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeNameParser { input, pos: 0 };
        let name = parser.parse_name()?;
        parser.skip_whitespace();
        if parser.pos != input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(name)
    }
}

struct TypeNameParser<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeNameParser<'_> {
    fn error(&self, reason: &str) -> CatalogError {
        CatalogError::InvalidTypeName {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn parse_name(&mut self) -> Result<TypeName, CatalogError> {
        self.skip_whitespace();
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|c: char| c == '<' || c == '>' || c == ',' || c.is_whitespace())
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        let base = rest[..len].to_string();
        self.pos += len;
        self.skip_whitespace();

        if self.peek() != Some('<') {
            return Ok(TypeName::Simple(base));
        }
        self.pos += 1;
        self.skip_whitespace();

        let mut arguments = Vec::new();
        if self.peek() == Some('>') {
            self.pos += 1;
            return Ok(TypeName::Generic(base, arguments));
        }
        loop {
            arguments.push(self.parse_name()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('>') => {
                    self.pos += 1;
                    return Ok(TypeName::Generic(base, arguments));
                }
                _ => return Err(self.error("expected ',' or '>'")),
            }
        }
    }
}

/// Wire representation of [`TypeName`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TypeNameRepr {
    Simple(String),
    Generic(Vec<TypeNameRepr>),
}

impl TryFrom<TypeNameRepr> for TypeName {
    type Error = CatalogError;

    fn try_from(repr: TypeNameRepr) -> Result<Self, Self::Error> {
        match repr {
            TypeNameRepr::Simple(name) => Ok(Self::Simple(name)),
            TypeNameRepr::Generic(items) => {
                let mut items = items.into_iter();
                let base = match items.next() {
                    Some(TypeNameRepr::Simple(base)) => base,
                    Some(TypeNameRepr::Generic(_)) => {
                        return Err(CatalogError::InvalidTypeName {
                            input: "[[...], ...]".to_string(),
                            reason: "the first element of a generic type name must be a string"
                                .to_string(),
                        })
                    }
                    None => {
                        return Err(CatalogError::InvalidTypeName {
                            input: "[]".to_string(),
                            reason: "a generic type name needs at least its base name".to_string(),
                        })
                    }
                };
                let arguments = items.map(Self::try_from).collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Generic(base, arguments))
            }
        }
    }
}

impl From<TypeName> for TypeNameRepr {
    fn from(name: TypeName) -> Self {
        match name {
            TypeName::Simple(name) => Self::Simple(name),
            TypeName::Generic(base, arguments) => {
                let mut items = Vec::with_capacity(arguments.len() + 1);
                items.push(Self::Simple(base));
                items.extend(arguments.into_iter().map(Self::from));
                Self::Generic(items)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ConstraintDescriptor
// ---------------------------------------------------------------------------

/// One validation rule instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintDescriptor {
    /// Selects the validator in the catalog.
    pub constraint_name: String,
    /// Attribute values, including the reserved `groups` and `message`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    /// Sub-rules evaluated before this rule, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composing_constraints: Vec<ConstraintDescriptor>,
    /// Collapse composing failures into the single violation of this rule.
    #[serde(default, skip_serializing_if = "is_false")]
    pub report_as_single: bool,
    /// The rule is known to have no validator; do not report its absence.
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_no_validator: bool,
    /// Validator defaults have already been merged into `attributes`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub default_values_loaded: bool,
}

impl ConstraintDescriptor {
    /// A constraint with no attributes.
    pub fn new(constraint_name: impl Into<String>) -> Self {
        Self {
            constraint_name: constraint_name.into(),
            attributes: None,
            composing_constraints: Vec::new(),
            report_as_single: false,
            has_no_validator: false,
            default_values_loaded: false,
        }
    }

    /// Set one attribute, creating the attribute map if needed.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the attribute map.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Restrict the constraint to the given groups.
    pub fn in_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups: Vec<Value> = groups.into_iter().map(|g| Value::String(g.into())).collect();
        self.with_attribute("groups", Value::Array(groups))
    }

    /// Set an explicit message template.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        self.with_attribute("message", Value::String(message.into()))
    }

    /// Append composing constraints.
    pub fn composed_of(mut self, composing: impl IntoIterator<Item = ConstraintDescriptor>) -> Self {
        self.composing_constraints.extend(composing);
        self
    }

    /// Report composing failures as this constraint's single violation.
    pub fn reported_as_single(mut self) -> Self {
        self.report_as_single = true;
        self
    }

    /// Mark the constraint as intentionally validator-less.
    pub fn without_validator(mut self) -> Self {
        self.has_no_validator = true;
        self
    }

    /// Look up one attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.as_ref().and_then(|attributes| attributes.get(key))
    }

    /// The implicit "is this an object" gate.
    pub fn object() -> Self {
        Self::new(OBJECT_CONSTRAINT)
    }

    /// Structural violation for an unresolvable type.
    pub fn type_not_found(type_name: &TypeName) -> Self {
        Self::new(TYPE_NOT_FOUND).with_attribute("typeName", type_name.to_value())
    }

    /// Structural violation for an unknown property of a type.
    pub fn property_not_found(type_name: &TypeName, property: &PropertyKey) -> Self {
        Self::new(PROPERTY_NOT_FOUND)
            .with_attribute("typeName", type_name.to_value())
            .with_attribute("propertyName", property.to_value())
    }

    /// Structural violation for a constraint with no registered validator.
    pub fn validator_not_found(constraint_name: &str) -> Self {
        Self::new(VALIDATOR_NOT_FOUND).with_attribute("constraintName", constraint_name)
    }

    /// Violation for a constraint attribute the validator cannot use.
    pub fn invalid_attribute_value(
        constraint_name: &str,
        attribute_name: &str,
        attribute_value: Value,
        description: &str,
    ) -> Self {
        Self::new(INVALID_CONSTRAINT_ATTRIBUTE_VALUE)
            .with_attribute("constraintName", constraint_name)
            .with_attribute("attributeName", attribute_name)
            .with_attribute("attributeValue", attribute_value)
            .with_attribute("description", description)
    }
}

// ---------------------------------------------------------------------------
// PropertyDescriptor
// ---------------------------------------------------------------------------

/// The rules of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    /// The referenced type.
    #[serde(rename = "propertyTypeName", alias = "porpertyTypeName")]
    pub property_type: TypeName,
    /// Constraints attached to the property itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDescriptor>,
    /// Validate the referenced type's own rules against the property value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub cascade: bool,
    /// Group renames applied when cascading.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub group_conversions: GroupConversions,
}

impl PropertyDescriptor {
    /// A property of the given type with no rules of its own.
    pub fn new(property_type: impl Into<TypeName>) -> Self {
        Self {
            property_type: property_type.into(),
            constraints: Vec::new(),
            cascade: false,
            group_conversions: GroupConversions::new(),
        }
    }

    /// Append a constraint.
    pub fn with_constraint(mut self, constraint: ConstraintDescriptor) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Enable cascading into the referenced type.
    pub fn cascaded(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Add a group conversion rule.
    pub fn converting_group(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.group_conversions.insert(from.into(), to.into());
        self
    }
}

// ---------------------------------------------------------------------------
// TypeDescriptor
// ---------------------------------------------------------------------------

/// A type's shape and rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    /// Declared name; also the registration key (base name only).
    pub type_name: TypeName,
    /// Constraints on the type as a whole.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDescriptor>,
    /// Declared properties, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyDescriptor>,
    /// Indivisible value type: own rules always run under `Default` and report globally.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_basic_type: bool,
    /// List or map whose elements share `value_descriptor`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_collection: bool,
    /// Rules applied to every element of a collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_descriptor: Option<Box<PropertyDescriptor>>,
}

impl TypeDescriptor {
    /// An object type with no rules yet.
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            constraints: Vec::new(),
            properties: IndexMap::new(),
            is_basic_type: false,
            is_collection: false,
            value_descriptor: None,
        }
    }

    /// A basic (indivisible) type.
    pub fn basic(type_name: impl Into<TypeName>) -> Self {
        Self {
            is_basic_type: true,
            ..Self::new(type_name)
        }
    }

    /// A collection type; `value_descriptor` applies to every element.
    pub fn collection(type_name: impl Into<TypeName>, value_descriptor: Option<PropertyDescriptor>) -> Self {
        Self {
            is_collection: true,
            value_descriptor: value_descriptor.map(Box::new),
            ..Self::new(type_name)
        }
    }

    /// Append a type-level constraint.
    pub fn with_constraint(mut self, constraint: ConstraintDescriptor) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Declare a property.
    pub fn with_property(mut self, name: impl Into<String>, property: PropertyDescriptor) -> Self {
        self.properties.insert(name.into(), property);
        self
    }
}
