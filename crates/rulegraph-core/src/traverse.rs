//! # Unified Traversal
//!
//! Validation and visiting walk the descriptor graph with the same
//! three-level recursion: type, then properties and collection elements,
//! then constraints and their composing constraints. The [`Walker`] owns
//! that recursion once. A [`Strategy`] decides the points where the two
//! engines differ:
//!
//! | Decision | Validation | Visiting |
//! |---|---|---|
//! | evaluate constraints | always | only when constraint or validator hooks listen |
//! | stop at a missing value | always | unless `ignore_value` |
//! | group gating | always | unless `ignore_groups` |
//! | cascade into a property's type | basic type or `cascade` | `recursively && (even_not_cascade \|\| cascade)` |
//! | leaf check | run the validator | `start_validator` / `end_validator` hooks |
//!
//! ## Violation routing
//!
//! Every call carries a [`Route`] naming the buffers that act as the local
//! and global lists. Basic types and global validators point local at
//! global. A composed constraint reported as a single violation pushes a
//! scratch buffer for its children and drops it afterwards; scratch
//! buffers nest strictly, so they always sit at the end of the buffer stack.

use serde_json::Value;

use crate::catalog::Catalog;
use crate::descriptor::{Attributes, ConstraintDescriptor, PropertyDescriptor, TypeDescriptor};
use crate::groups::{convert_groups, declared_groups, default_groups, group_allowed};
use crate::path::{PropertyKey, PropertyPath};
use crate::validator::{effective_attributes, empty_attributes, reported_constraint, Validator, ValidatorInput};
use crate::value::{element_keys, is_absent, property_of};
use crate::violation::{Reporter, Route, Target, Violation};

/// A type descriptor about to be walked.
#[derive(Debug, Clone, Copy)]
pub struct TypeNode<'a> {
    pub descriptor: &'a TypeDescriptor,
    pub value: Option<&'a Value>,
    pub path: &'a PropertyPath,
    /// Groups in effect; always `["Default"]` for basic types.
    pub groups: &'a [String],
}

/// A property about to be walked.
#[derive(Debug, Clone, Copy)]
pub struct PropertyNode<'a> {
    pub descriptor: &'a PropertyDescriptor,
    /// Property name or element index.
    pub name: &'a PropertyKey,
    /// The object or collection holding the property.
    pub container: Option<&'a Value>,
    /// Path of the container.
    pub path: &'a PropertyPath,
    pub groups: &'a [String],
}

impl<'a> PropertyNode<'a> {
    /// The property value read from the container.
    pub fn value(&self) -> Option<&'a Value> {
        property_of(self.container, self.name)
    }
}

/// A constraint about to be evaluated.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintNode<'a> {
    pub descriptor: &'a ConstraintDescriptor,
    pub value: Option<&'a Value>,
    pub path: &'a PropertyPath,
    pub groups: &'a [String],
}

/// The leaf check of an active constraint.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorNode<'a> {
    /// Constraint name the validator was looked up by.
    pub name: &'a str,
    /// `None` when no validator is registered for the name.
    pub validator: Option<&'a Validator>,
    pub constraint: &'a ConstraintDescriptor,
    pub value: Option<&'a Value>,
    /// Effective attributes, defaults included.
    pub attributes: &'a Attributes,
    pub path: &'a PropertyPath,
    pub groups: &'a [String],
}

/// Result of a strategy's leaf check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Valid,
    Invalid,
    /// The strategy does not compute validity.
    Unchecked,
}

/// The decisions that distinguish validating from visiting.
pub(crate) trait Strategy {
    fn evaluates_constraints(&self) -> bool;

    fn ignores_value(&self) -> bool {
        false
    }

    fn ignores_groups(&self) -> bool {
        false
    }

    fn cascades(&self, ty: &TypeDescriptor, property: &PropertyDescriptor) -> bool;

    fn start_type(&mut self, _node: &TypeNode<'_>, _reporter: &mut Reporter<'_>) -> bool {
        true
    }

    fn end_type(&mut self, _node: &TypeNode<'_>, _reporter: &mut Reporter<'_>) {}

    fn start_property(&mut self, _node: &PropertyNode<'_>, _reporter: &mut Reporter<'_>) -> bool {
        true
    }

    fn end_property(&mut self, _node: &PropertyNode<'_>, _reporter: &mut Reporter<'_>) {}

    fn start_constraint(&mut self, _node: &ConstraintNode<'_>, _reporter: &mut Reporter<'_>) -> bool {
        true
    }

    fn end_constraint(&mut self, _node: &ConstraintNode<'_>, _reporter: &mut Reporter<'_>) {}

    fn check(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) -> Verdict;
}

/// Drives one traversal over a catalog.
pub(crate) struct Walker<'c, 'b, S> {
    catalog: &'c Catalog,
    strategy: S,
    buffers: &'b mut Vec<Vec<Violation>>,
}

impl<'c, 'b, S: Strategy> Walker<'c, 'b, S> {
    pub(crate) fn new(catalog: &'c Catalog, strategy: S, buffers: &'b mut Vec<Vec<Violation>>) -> Self {
        Self {
            catalog,
            strategy,
            buffers,
        }
    }

    pub(crate) fn walk_type(
        &mut self,
        ty: &TypeDescriptor,
        value: Option<&Value>,
        path: &PropertyPath,
        groups: &[String],
        route: Route,
    ) {
        let (groups, route) = if ty.is_basic_type {
            (default_groups(), route.to_global())
        } else {
            (groups, route)
        };
        let node = TypeNode {
            descriptor: ty,
            value,
            path,
            groups,
        };

        let mut reporter = Reporter::new(self.buffers, route, self.catalog.formatter());
        if !self.strategy.start_type(&node, &mut reporter) {
            return;
        }

        let evaluates = self.strategy.evaluates_constraints();
        if evaluates {
            for constraint in &ty.constraints {
                self.walk_constraint(constraint, value, path, groups, route);
            }
        }

        if !self.strategy.ignores_value() && is_absent(value) {
            self.end_type(&node, route);
            return;
        }

        if !ty.is_basic_type && evaluates {
            let object = ConstraintDescriptor::object();
            self.walk_constraint(&object, value, path, default_groups(), route);
        }

        for (name, property) in &ty.properties {
            let key = PropertyKey::Name(name.clone());
            self.walk_property(property, &key, value, path, groups, route);
        }

        if ty.is_collection {
            if let Some(element) = ty.value_descriptor.as_deref() {
                for key in element_keys(value) {
                    self.walk_property(element, &key, value, path, groups, route);
                }
            }
        }

        self.end_type(&node, route);
    }

    pub(crate) fn walk_property(
        &mut self,
        property: &PropertyDescriptor,
        key: &PropertyKey,
        container: Option<&Value>,
        path: &PropertyPath,
        groups: &[String],
        route: Route,
    ) {
        let node = PropertyNode {
            descriptor: property,
            name: key,
            container,
            path,
            groups,
        };
        let mut reporter = Reporter::new(self.buffers, route, self.catalog.formatter());
        if !self.strategy.start_property(&node, &mut reporter) {
            return;
        }

        let value = property_of(container, key);
        let property_path = path.child(key.clone());
        let rendered = property_path.to_string();

        let Some(ty) = self.catalog.resolve_type(
            &property.property_type,
            value,
            &rendered,
            &mut self.buffers[route.global],
        ) else {
            self.end_property(&node, route);
            return;
        };

        if self.strategy.cascades(&ty, property) {
            let cascade_groups = convert_groups(groups, &property.group_conversions);
            self.walk_type(&ty, value, &property_path, &cascade_groups, route);
        }

        if self.strategy.evaluates_constraints() {
            for constraint in &property.constraints {
                self.walk_constraint(constraint, value, &property_path, groups, route);
            }
        }

        self.end_property(&node, route);
    }

    pub(crate) fn walk_constraint(
        &mut self,
        constraint: &ConstraintDescriptor,
        value: Option<&Value>,
        path: &PropertyPath,
        groups: &[String],
        route: Route,
    ) -> bool {
        let node = ConstraintNode {
            descriptor: constraint,
            value,
            path,
            groups,
        };
        let mut reporter = Reporter::new(self.buffers, route, self.catalog.formatter());
        if !self.strategy.start_constraint(&node, &mut reporter) {
            return true;
        }

        let name = constraint.constraint_name.as_str();
        let validator = self.catalog.validator(name);
        let route = match validator {
            Some(validator) if validator.is_global() => route.to_global(),
            _ => route,
        };
        if validator.is_none() && !constraint.has_no_validator {
            tracing::debug!(constraint = name, path = %path, "validator not found");
            self.catalog.add_violation(
                ConstraintDescriptor::validator_not_found(name),
                value,
                &path.to_string(),
                &mut self.buffers[route.global],
            );
        }

        let attributes = effective_attributes(constraint, validator);
        let effective: &Attributes = attributes.as_deref().unwrap_or(empty_attributes());

        let active = self.strategy.ignores_groups()
            || group_allowed(
                self.catalog.groups_inheritance(),
                groups,
                declared_groups(effective).as_deref(),
            );
        if !active {
            self.end_constraint(&node, route);
            return true;
        }

        let mut composing_valid = true;
        if !constraint.composing_constraints.is_empty() {
            let inner = if constraint.report_as_single {
                self.buffers.push(Vec::new());
                route.with_local(self.buffers.len() - 1)
            } else {
                route
            };
            for composing in &constraint.composing_constraints {
                composing_valid = self.walk_constraint(composing, value, path, groups, inner) && composing_valid;
            }
            if constraint.report_as_single {
                self.buffers.pop();
            }
        }

        let leaf = ValidatorNode {
            name,
            validator,
            constraint,
            value,
            attributes: effective,
            path,
            groups,
        };
        let mut reporter = Reporter::new(self.buffers, route, self.catalog.formatter());
        let valid = match self.strategy.check(&leaf, &mut reporter) {
            Verdict::Valid => composing_valid,
            Verdict::Invalid => false,
            Verdict::Unchecked => true,
        };

        if !valid {
            let reported = reported_constraint(constraint, attributes.as_deref(), validator.is_some());
            reporter.report(Target::Local, reported, value, &path.to_string());
        }

        self.end_constraint(&node, route);
        valid
    }

    fn end_type(&mut self, node: &TypeNode<'_>, route: Route) {
        let mut reporter = Reporter::new(self.buffers, route, self.catalog.formatter());
        self.strategy.end_type(node, &mut reporter);
    }

    fn end_property(&mut self, node: &PropertyNode<'_>, route: Route) {
        let mut reporter = Reporter::new(self.buffers, route, self.catalog.formatter());
        self.strategy.end_property(node, &mut reporter);
    }

    fn end_constraint(&mut self, node: &ConstraintNode<'_>, route: Route) {
        let mut reporter = Reporter::new(self.buffers, route, self.catalog.formatter());
        self.strategy.end_constraint(node, &mut reporter);
    }
}

/// Strategy of the validation engine: every constraint is evaluated and
/// every failing validator produces a violation.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Validation;

impl Strategy for Validation {
    fn evaluates_constraints(&self) -> bool {
        true
    }

    fn cascades(&self, ty: &TypeDescriptor, property: &PropertyDescriptor) -> bool {
        ty.is_basic_type || property.cascade
    }

    fn check(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) -> Verdict {
        let Some(validator) = node.validator else {
            return Verdict::Valid;
        };
        let input = ValidatorInput {
            value: node.value,
            attributes: node.attributes,
            constraint: node.constraint,
            path: node.path,
            reporter,
        };
        if validator.check(input) {
            Verdict::Valid
        } else {
            Verdict::Invalid
        }
    }
}

/// Groups as owned strings, for entry points taking `&[impl AsRef<str>]`.
pub(crate) fn owned_groups<S: AsRef<str>>(groups: &[S]) -> Vec<String> {
    groups.iter().map(|group| group.as_ref().to_string()).collect()
}
