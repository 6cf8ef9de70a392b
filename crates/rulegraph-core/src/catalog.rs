//! # Rule Catalog
//!
//! The [`Catalog`] is the explicit rule context every engine call runs
//! against. It owns:
//!
//! - **Type entries**, keyed by base type name. An entry is either a static
//!   [`TypeDescriptor`] or a factory that builds the descriptor for a
//!   concrete generic instantiation such as `List<Integer>`.
//! - **Validators**, keyed by constraint name.
//! - **Group inheritance**, group name to parent group names.
//! - **The message formatter** used for every violation it produces.
//!
//! Catalogs are plain values: tests build private instances, and
//! [`Catalog::shared`] offers one process-wide instance behind a
//! `parking_lot::RwLock` for callers that want ambient global rules.
//!
//! ## Resolution failures
//!
//! [`Catalog::resolve_type`] and [`Catalog::resolve_property`] never fail
//! hard. An unknown name appends a `TypeNotFound` or `PropertyNotFound`
//! violation to the caller's global list and returns `None`; the traversal
//! simply stops exploring that branch.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::descriptor::{ConstraintDescriptor, PropertyDescriptor, TypeDescriptor, TypeName};
use crate::groups::{self, GroupInheritance};
use crate::path::PropertyKey;
use crate::validator::{load_default_constraint_values, Validator};
use crate::violation::{JsonMessageFormatter, MessageFormatter, Violation};

/// Builds the descriptor of one generic instantiation. Called on every
/// resolution with the full type name.
pub type TypeFactory = dyn Fn(&TypeName) -> TypeDescriptor + Send + Sync;

/// A registered type.
#[derive(Clone)]
pub enum TypeEntry {
    /// A fixed descriptor.
    Static(Arc<TypeDescriptor>),
    /// A descriptor factory for generic types.
    Factory(Arc<TypeFactory>),
}

impl TypeEntry {
    /// The descriptor for `name`: the static one, or a freshly built one.
    pub fn instantiate(&self, name: &TypeName) -> Arc<TypeDescriptor> {
        match self {
            Self::Static(descriptor) => Arc::clone(descriptor),
            Self::Factory(factory) => Arc::new(factory(name)),
        }
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(descriptor) => f.debug_tuple("Static").field(&descriptor.type_name).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Types, validators, group inheritance and the message formatter.
#[derive(Clone)]
pub struct Catalog {
    types: HashMap<String, TypeEntry>,
    validators: HashMap<String, Validator>,
    groups_inheritance: GroupInheritance,
    formatter: Arc<dyn MessageFormatter>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.types.keys().collect();
        types.sort();
        let mut validators: Vec<&String> = self.validators.keys().collect();
        validators.sort();
        f.debug_struct("Catalog")
            .field("types", &types)
            .field("validators", &validators)
            .field("groups_inheritance", &self.groups_inheritance)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// An empty catalog with the JSON message formatter.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
            validators: HashMap::new(),
            groups_inheritance: GroupInheritance::new(),
            formatter: Arc::new(JsonMessageFormatter),
        }
    }

    /// The process-wide catalog. Starts empty.
    pub fn shared() -> &'static RwLock<Catalog> {
        static SHARED: OnceLock<RwLock<Catalog>> = OnceLock::new();
        SHARED.get_or_init(|| RwLock::new(Catalog::new()))
    }

    // -- Types ---------------------------------------------------------------

    /// Register a static descriptor under its base type name, replacing any
    /// previous entry.
    pub fn insert_type(&mut self, descriptor: TypeDescriptor) -> Option<TypeEntry> {
        let name = descriptor.type_name.base_name().to_string();
        self.types.insert(name, TypeEntry::Static(Arc::new(descriptor)))
    }

    /// Register a factory for a generic base type name.
    pub fn insert_factory<F>(&mut self, name: impl Into<String>, factory: F) -> Option<TypeEntry>
    where
        F: Fn(&TypeName) -> TypeDescriptor + Send + Sync + 'static,
    {
        self.types.insert(name.into(), TypeEntry::Factory(Arc::new(factory)))
    }

    /// Bulk registration; the last descriptor for a given name wins.
    pub fn register_types(&mut self, types: impl IntoIterator<Item = TypeDescriptor>) {
        for descriptor in types {
            self.insert_type(descriptor);
        }
    }

    /// Remove a type entry.
    pub fn remove_type(&mut self, name: &str) -> Option<TypeEntry> {
        self.types.remove(name)
    }

    /// The raw entry registered under a base name.
    pub fn type_entry(&self, name: &str) -> Option<&TypeEntry> {
        self.types.get(name)
    }

    /// Registered base type names, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// The descriptor for `name`, without reporting anything when absent.
    pub fn type_descriptor(&self, name: &TypeName) -> Option<Arc<TypeDescriptor>> {
        self.types
            .get(name.base_name())
            .map(|entry| entry.instantiate(name))
    }

    /// Resolve a type name, reporting `TypeNotFound` into `global_violations`
    /// when no entry exists for its base name.
    pub fn resolve_type(
        &self,
        name: &TypeName,
        value: Option<&Value>,
        path: &str,
        global_violations: &mut Vec<Violation>,
    ) -> Option<Arc<TypeDescriptor>> {
        let descriptor = self.type_descriptor(name);
        if descriptor.is_none() {
            tracing::debug!(type_name = %name, path, "type not found");
            self.add_violation(
                ConstraintDescriptor::type_not_found(name),
                value,
                path,
                global_violations,
            );
        }
        descriptor
    }

    /// The descriptor of property `key` of `ty`.
    ///
    /// A collection answers with its element descriptor for every key.
    /// Otherwise the declared property is returned, or `PropertyNotFound` is
    /// reported against the container.
    pub fn resolve_property<'t>(
        &self,
        ty: &'t TypeDescriptor,
        container: Option<&Value>,
        key: &PropertyKey,
        path: &str,
        global_violations: &mut Vec<Violation>,
    ) -> Option<&'t PropertyDescriptor> {
        if ty.is_collection {
            if let Some(element) = ty.value_descriptor.as_deref() {
                return Some(element);
            }
        }
        let property = ty.properties.get(key.to_string().as_str());
        if property.is_none() {
            tracing::debug!(type_name = %ty.type_name, property = %key, path, "property not found");
            self.add_violation(
                ConstraintDescriptor::property_not_found(&ty.type_name, key),
                container,
                path,
                global_violations,
            );
        }
        property
    }

    /// Pre-merge validator defaults into every constraint of every static
    /// descriptor, so later evaluations borrow the attributes as declared.
    pub fn warm_defaults(&mut self) {
        let validators = &self.validators;
        for entry in self.types.values_mut() {
            if let TypeEntry::Static(descriptor) = entry {
                warm_type(Arc::make_mut(descriptor), validators);
            }
        }
    }

    // -- Validators ------------------------------------------------------------

    /// Register the validator behind a constraint name.
    pub fn insert_validator(&mut self, constraint_name: impl Into<String>, validator: Validator) -> Option<Validator> {
        self.validators.insert(constraint_name.into(), validator)
    }

    /// Remove a validator.
    pub fn remove_validator(&mut self, constraint_name: &str) -> Option<Validator> {
        self.validators.remove(constraint_name)
    }

    /// The validator behind a constraint name.
    pub fn validator(&self, constraint_name: &str) -> Option<&Validator> {
        self.validators.get(constraint_name)
    }

    // -- Groups ----------------------------------------------------------------

    /// Declare the parents of a group.
    pub fn insert_group_inheritance<I, S>(&mut self, group: impl Into<String>, parents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups_inheritance
            .insert(group.into(), parents.into_iter().map(Into::into).collect());
    }

    /// Replace the whole group inheritance map.
    pub fn set_groups_inheritance(&mut self, inheritance: GroupInheritance) {
        self.groups_inheritance = inheritance;
    }

    pub fn groups_inheritance(&self) -> &GroupInheritance {
        &self.groups_inheritance
    }

    /// Whether any requested group is allowed by `declared` under this
    /// catalog's inheritance rules.
    pub fn group_allowed<S: AsRef<str>>(&self, requested: &[S], declared: Option<&[&str]>) -> bool {
        groups::group_allowed(&self.groups_inheritance, requested, declared)
    }

    /// A cycle in the group inheritance map, if any.
    pub fn find_inheritance_cycle(&self) -> Option<Vec<String>> {
        groups::find_inheritance_cycle(&self.groups_inheritance)
    }

    // -- Messages ----------------------------------------------------------------

    /// Swap the message formatter.
    pub fn set_message_formatter(&mut self, formatter: impl MessageFormatter + 'static) {
        self.formatter = Arc::new(formatter);
    }

    pub fn formatter(&self) -> &dyn MessageFormatter {
        self.formatter.as_ref()
    }

    /// Build a violation with this catalog's formatter and append it.
    pub fn add_violation(
        &self,
        constraint: ConstraintDescriptor,
        invalid_value: Option<&Value>,
        path: &str,
        violations: &mut Vec<Violation>,
    ) {
        violations.push(Violation::new(constraint, invalid_value, path, self.formatter()));
    }
}

fn warm_type(descriptor: &mut TypeDescriptor, validators: &HashMap<String, Validator>) {
    warm_constraints(&mut descriptor.constraints, validators);
    for property in descriptor.properties.values_mut() {
        warm_constraints(&mut property.constraints, validators);
    }
    if let Some(element) = descriptor.value_descriptor.as_deref_mut() {
        warm_constraints(&mut element.constraints, validators);
    }
}

fn warm_constraints(constraints: &mut [ConstraintDescriptor], validators: &HashMap<String, Validator>) {
    for constraint in constraints {
        if let Some(validator) = validators.get(&constraint.constraint_name) {
            load_default_constraint_values(constraint, validator);
        }
        warm_constraints(&mut constraint.composing_constraints, validators);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TYPE_NOT_FOUND;
    use serde_json::json;

    fn list_factory(name: &TypeName) -> TypeDescriptor {
        let element = name
            .arguments()
            .first()
            .cloned()
            .unwrap_or_else(|| TypeName::simple("Object"));
        TypeDescriptor::collection(name.clone(), Some(PropertyDescriptor::new(element)))
    }

    #[test]
    fn test_registration_keys_by_base_name_last_wins() {
        let mut catalog = Catalog::new();
        catalog.register_types([
            TypeDescriptor::new("Person"),
            TypeDescriptor::new("Person").with_property("name", PropertyDescriptor::new("String")),
        ]);
        let person = catalog.type_descriptor(&TypeName::simple("Person")).unwrap();
        assert!(person.properties.contains_key("name"));
        assert_eq!(catalog.type_names().count(), 1);
    }

    #[test]
    fn test_factory_receives_full_generic_name() {
        let mut catalog = Catalog::new();
        catalog.insert_factory("List", list_factory);
        let name: TypeName = "List<Integer>".parse().unwrap();
        let list = catalog.type_descriptor(&name).unwrap();
        assert!(list.is_collection);
        assert_eq!(
            list.value_descriptor.as_ref().unwrap().property_type,
            TypeName::simple("Integer")
        );
    }

    #[test]
    fn test_unknown_type_reports_globally() {
        let catalog = Catalog::new();
        let mut global = Vec::new();
        let resolved = catalog.resolve_type(&TypeName::simple("Ghost"), Some(&json!(1)), ".x", &mut global);
        assert!(resolved.is_none());
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].constraint_name(), TYPE_NOT_FOUND);
        assert_eq!(global[0].property_path, ".x");
        assert_eq!(global[0].invalid_value, Some(json!(1)));
    }

    #[test]
    fn test_collection_answers_every_key_with_element_descriptor() {
        let catalog = Catalog::new();
        let list = list_factory(&"List<String>".parse().unwrap());
        let mut global = Vec::new();
        for key in [PropertyKey::Index(7), PropertyKey::from("anything")] {
            let property = catalog.resolve_property(&list, None, &key, "", &mut global);
            assert_eq!(property.unwrap().property_type, TypeName::simple("String"));
        }
        assert!(global.is_empty());
    }

    #[test]
    fn test_unknown_property_reports_against_container() {
        let catalog = Catalog::new();
        let person = TypeDescriptor::new("Person");
        let container = json!({ "nick": "J" });
        let mut global = Vec::new();
        let property = catalog.resolve_property(&person, Some(&container), &"nick".into(), ".owner", &mut global);
        assert!(property.is_none());
        assert_eq!(global[0].constraint_name(), "PropertyNotFound");
        assert_eq!(global[0].constraint_descriptor.attribute("propertyName"), Some(&json!("nick")));
        assert_eq!(global[0].invalid_value, Some(container));
    }

    #[test]
    fn test_warm_defaults_merges_into_static_descriptors() {
        let mut catalog = Catalog::new();
        catalog.insert_validator("Size", Validator::noop().with_default("min", 0));
        catalog.insert_type(TypeDescriptor::new("Box").with_property(
            "items",
            PropertyDescriptor::new("String").with_constraint(
                ConstraintDescriptor::new("Wrapper").composed_of([ConstraintDescriptor::new("Size")]),
            ),
        ));
        catalog.warm_defaults();

        let boxed = catalog.type_descriptor(&TypeName::simple("Box")).unwrap();
        let wrapper = &boxed.properties["items"].constraints[0];
        assert!(!wrapper.default_values_loaded);
        let size = &wrapper.composing_constraints[0];
        assert!(size.default_values_loaded);
        assert_eq!(size.attribute("min"), Some(&json!(0)));
    }

    #[test]
    fn test_custom_formatter_applies_to_structural_violations() {
        let mut catalog = Catalog::new();
        catalog.set_message_formatter(|template: &str, _: Option<&crate::Attributes>, _: Option<&Value>| {
            format!("!{template}")
        });
        let mut global = Vec::new();
        catalog.resolve_type(&TypeName::simple("Ghost"), None, "", &mut global);
        assert_eq!(global[0].message, "!{TypeNotFound}");
    }

    #[test]
    fn test_inheritance_cycle_detection() {
        let mut catalog = Catalog::new();
        catalog.insert_group_inheritance("A", ["B"]);
        assert!(catalog.find_inheritance_cycle().is_none());
        catalog.insert_group_inheritance("B", ["A"]);
        assert!(catalog.find_inheritance_cycle().is_some());
    }
}
