//! # Entry Points
//!
//! Name-or-descriptor entry points on [`Catalog`]. Each starts at the empty
//! root path and collects local and global violations into one list, so a
//! top-level `age` property reports at `.age`.
//!
//! Callers name the starting point with a [`TypeRef`] (a type name or an
//! explicit descriptor) or a [`PropertyRef`] (an explicit property
//! descriptor, or a property looked up on a type).

use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::catalog::Catalog;
use crate::descriptor::{PropertyDescriptor, TypeDescriptor, TypeName};
use crate::path::{PropertyKey, PropertyPath};
use crate::traverse::owned_groups;
use crate::violation::{Violation, ViolationSinks};
use crate::{validate, visit};

/// The starting type of a traversal.
#[derive(Debug, Clone, Copy)]
pub enum TypeRef<'a> {
    /// Resolve through the catalog.
    Name(&'a TypeName),
    /// Use this descriptor directly.
    Descriptor(&'a TypeDescriptor),
}

impl<'a> From<&'a TypeName> for TypeRef<'a> {
    fn from(name: &'a TypeName) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a TypeDescriptor> for TypeRef<'a> {
    fn from(descriptor: &'a TypeDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

/// The starting property of a traversal.
#[derive(Debug, Clone, Copy)]
pub enum PropertyRef<'a> {
    /// Use this descriptor directly.
    Descriptor(&'a PropertyDescriptor),
    /// Look the property up on this type.
    OfType(&'a TypeDescriptor),
    /// Resolve the type through the catalog, then look the property up.
    OfTypeName(&'a TypeName),
}

impl<'a> From<&'a PropertyDescriptor> for PropertyRef<'a> {
    fn from(descriptor: &'a PropertyDescriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl<'a> From<&'a TypeDescriptor> for PropertyRef<'a> {
    fn from(ty: &'a TypeDescriptor) -> Self {
        Self::OfType(ty)
    }
}

impl<'a> From<&'a TypeName> for PropertyRef<'a> {
    fn from(name: &'a TypeName) -> Self {
        Self::OfTypeName(name)
    }
}

/// A looked-up type descriptor: borrowed from the caller or shared from the catalog.
#[derive(Debug, Clone)]
pub enum TypeHandle<'a> {
    Borrowed(&'a TypeDescriptor),
    Shared(Arc<TypeDescriptor>),
}

impl Deref for TypeHandle<'_> {
    type Target = TypeDescriptor;

    fn deref(&self) -> &TypeDescriptor {
        match self {
            Self::Borrowed(descriptor) => descriptor,
            Self::Shared(descriptor) => descriptor,
        }
    }
}

impl Catalog {
    /// The descriptor a [`TypeRef`] denotes, reporting `TypeNotFound` into
    /// `global_violations` for unknown names.
    pub fn lookup_type<'a>(
        &self,
        ty: TypeRef<'a>,
        value: Option<&Value>,
        path: &str,
        global_violations: &mut Vec<Violation>,
    ) -> Option<TypeHandle<'a>> {
        match ty {
            TypeRef::Descriptor(descriptor) => Some(TypeHandle::Borrowed(descriptor)),
            TypeRef::Name(name) => self
                .resolve_type(name, value, path, global_violations)
                .map(TypeHandle::Shared),
        }
    }

    /// The descriptor a [`PropertyRef`] denotes, reporting `TypeNotFound` or
    /// `PropertyNotFound` into `global_violations`.
    pub fn lookup_property<'a>(
        &self,
        property: PropertyRef<'a>,
        key: &PropertyKey,
        container: Option<&Value>,
        path: &str,
        global_violations: &mut Vec<Violation>,
    ) -> Option<Cow<'a, PropertyDescriptor>> {
        match property {
            PropertyRef::Descriptor(descriptor) => Some(Cow::Borrowed(descriptor)),
            PropertyRef::OfType(ty) => self
                .resolve_property(ty, container, key, path, global_violations)
                .map(Cow::Borrowed),
            PropertyRef::OfTypeName(name) => {
                let ty = self.resolve_type(name, container, path, global_violations)?;
                self.resolve_property(&ty, container, key, path, global_violations)
                    .cloned()
                    .map(Cow::Owned)
            }
        }
    }

    /// Validate a value against a type.
    pub fn validate_object<'a, S: AsRef<str>>(
        &self,
        ty: impl Into<TypeRef<'a>>,
        value: &Value,
        groups: &[S],
    ) -> Vec<Violation> {
        let ty = ty.into();
        tracing::trace!(?ty, "validate_object");
        let mut violations = Vec::new();
        let Some(descriptor) = self.lookup_type(ty, Some(value), "", &mut violations) else {
            return violations;
        };
        let mut sinks = ViolationSinks::shared();
        validate::validate_type(
            self,
            &descriptor,
            Some(value),
            &PropertyPath::root(),
            &owned_groups(groups),
            &mut sinks,
        );
        violations.extend(sinks.into_violations());
        violations
    }

    /// Validate one property of an object or array container.
    ///
    /// Containers that are not objects or arrays produce only lookup
    /// violations.
    pub fn validate_property<'a, S: AsRef<str>>(
        &self,
        property: impl Into<PropertyRef<'a>>,
        key: impl Into<PropertyKey>,
        container: &Value,
        groups: &[S],
    ) -> Vec<Violation> {
        let property = property.into();
        let key = key.into();
        tracing::trace!(?property, %key, "validate_property");
        let mut violations = Vec::new();
        let Some(descriptor) = self.lookup_property(property, &key, Some(container), "", &mut violations) else {
            return violations;
        };
        if !matches!(container, Value::Object(_) | Value::Array(_)) {
            return violations;
        }
        let mut sinks = ViolationSinks::shared();
        validate::validate_property(
            self,
            &descriptor,
            &key,
            Some(container),
            &PropertyPath::root(),
            &owned_groups(groups),
            &mut sinks,
        );
        violations.extend(sinks.into_violations());
        violations
    }

    /// Validate a standalone value as if it were property `key` of an object.
    pub fn validate_value_of_property<'a, S: AsRef<str>>(
        &self,
        property: impl Into<PropertyRef<'a>>,
        key: impl Into<PropertyKey>,
        value: Option<&Value>,
        groups: &[S],
    ) -> Vec<Violation> {
        let key = key.into();
        let mut wrapper = Map::new();
        if let Some(value) = value {
            wrapper.insert(key.to_string(), value.clone());
        }
        let container = Value::Object(wrapper);
        self.validate_property(property, key, &container, groups)
    }

    /// Visit a value (or, with `ignore_value`, only the rules) of a type.
    pub fn visit_object<'a, S: AsRef<str>, V: visit::Visitor>(
        &self,
        ty: impl Into<TypeRef<'a>>,
        value: Option<&Value>,
        groups: &[S],
        visitor: V,
    ) -> Vec<Violation> {
        let ty = ty.into();
        tracing::trace!(?ty, "visit_object");
        let mut violations = Vec::new();
        let Some(descriptor) = self.lookup_type(ty, value, "", &mut violations) else {
            return violations;
        };
        let mut sinks = ViolationSinks::shared();
        visit::visit_type(
            self,
            &descriptor,
            value,
            &PropertyPath::root(),
            &owned_groups(groups),
            &mut sinks,
            visitor,
        );
        violations.extend(sinks.into_violations());
        violations
    }

    /// Visit one property of a container, which may be absent.
    pub fn visit_property<'a, S: AsRef<str>, V: visit::Visitor>(
        &self,
        property: impl Into<PropertyRef<'a>>,
        key: impl Into<PropertyKey>,
        container: Option<&Value>,
        groups: &[S],
        visitor: V,
    ) -> Vec<Violation> {
        let property = property.into();
        let key = key.into();
        tracing::trace!(?property, %key, "visit_property");
        let mut violations = Vec::new();
        let Some(descriptor) = self.lookup_property(property, &key, container, "", &mut violations) else {
            return violations;
        };
        let mut sinks = ViolationSinks::shared();
        visit::visit_property(
            self,
            &descriptor,
            &key,
            container,
            &PropertyPath::root(),
            &owned_groups(groups),
            &mut sinks,
            visitor,
        );
        violations.extend(sinks.into_violations());
        violations
    }
}
