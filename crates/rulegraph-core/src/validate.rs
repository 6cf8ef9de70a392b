//! # Validation Engine
//!
//! The three validation operations over explicit descriptors. Each walks
//! the catalog's rules against a concrete value and appends violations to
//! the given [`ViolationSinks`]:
//!
//! - [`validate_type`] evaluates a type's own constraints, the implicit
//!   `Object` check for non-basic types, every declared property and, for
//!   collections, every element. Basic types always run under `Default`
//!   and report globally.
//! - [`validate_property`] reads the property from its container, cascades
//!   into the property's type when that type is basic or the property
//!   cascades, then evaluates the property's own constraints.
//! - [`validate_constraint`] gates on groups, evaluates composing
//!   constraints first, then the constraint's validator, and reports one
//!   violation for the constraint when anything failed.
//!
//! Most callers want the name-based entry points on
//! [`Catalog`](crate::Catalog) instead, such as `validate_object`.

use serde_json::Value;

use crate::catalog::Catalog;
use crate::descriptor::{ConstraintDescriptor, PropertyDescriptor, TypeDescriptor};
use crate::path::{PropertyKey, PropertyPath};
use crate::traverse::{Validation, Walker};
use crate::violation::ViolationSinks;

/// Validate `value` against a type descriptor.
pub fn validate_type(
    catalog: &Catalog,
    ty: &TypeDescriptor,
    value: Option<&Value>,
    path: &PropertyPath,
    groups: &[String],
    sinks: &mut ViolationSinks,
) {
    let (buffers, route) = sinks.parts();
    Walker::new(catalog, Validation, buffers).walk_type(ty, value, path, groups, route);
}

/// Validate property `key` of `container`; `path` is the container's path.
pub fn validate_property(
    catalog: &Catalog,
    property: &PropertyDescriptor,
    key: &PropertyKey,
    container: Option<&Value>,
    path: &PropertyPath,
    groups: &[String],
    sinks: &mut ViolationSinks,
) {
    let (buffers, route) = sinks.parts();
    Walker::new(catalog, Validation, buffers).walk_property(property, key, container, path, groups, route);
}

/// Validate `value` against one constraint. Returns whether it passed;
/// inactive constraints pass.
pub fn validate_constraint(
    catalog: &Catalog,
    constraint: &ConstraintDescriptor,
    value: Option<&Value>,
    path: &PropertyPath,
    groups: &[String],
    sinks: &mut ViolationSinks,
) -> bool {
    let (buffers, route) = sinks.parts();
    Walker::new(catalog, Validation, buffers).walk_constraint(constraint, value, path, groups, route)
}
