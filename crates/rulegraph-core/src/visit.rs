//! # Visitor Engine
//!
//! The visitor engine walks the same graph as validation but hands every
//! node to a [`Visitor`] instead of computing validity. Each start hook may
//! return `false` to skip the node: the matching end hook and everything
//! beneath it are then skipped too. Visitors never run validators; the
//! validator hooks only observe which validator *would* run, with which
//! effective attributes.
//!
//! Traversal is shaped by [`VisitOptions`]:
//!
//! - `recursively` enables cascading into property types at all, and
//!   `recursively_even_not_cascade` ignores the properties' `cascade` flags.
//! - `descend_basic_types` descends into basic property types as the
//!   validation engine does, so their structural constraints are visible.
//! - `ignore_value` keeps walking below missing values.
//! - `ignore_groups` visits every constraint regardless of its groups.
//! - `inspect_constraints` must be set for constraint and validator hooks to
//!   fire. Without it, constraints, including the implicit `Object` check,
//!   are skipped entirely.
//!
//! [`HookVisitor`] builds a visitor from closures and sets
//! `inspect_constraints` automatically when a constraint or validator hook is
//! registered.

use serde_json::Value;

use crate::catalog::Catalog;
use crate::descriptor::{ConstraintDescriptor, PropertyDescriptor, TypeDescriptor};
use crate::path::{PropertyKey, PropertyPath};
use crate::traverse::{
    ConstraintNode, PropertyNode, Strategy, TypeNode, ValidatorNode, Verdict, Walker,
};
use crate::violation::{Reporter, ViolationSinks};

/// Traversal switches of a visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitOptions {
    /// Cascade into property types.
    pub recursively: bool,
    /// With `recursively`, cascade regardless of the property's `cascade` flag.
    pub recursively_even_not_cascade: bool,
    /// Walk below missing values.
    pub ignore_value: bool,
    /// Visit constraints outside the requested groups.
    pub ignore_groups: bool,
    /// Walk constraints and fire constraint and validator hooks.
    pub inspect_constraints: bool,
    /// Descend into basic property types even without `recursively`.
    pub descend_basic_types: bool,
}

/// Hooks driven by the visitor engine. Every hook is optional.
#[allow(unused_variables)]
pub trait Visitor {
    /// Traversal switches; read once per visit.
    fn options(&self) -> VisitOptions {
        VisitOptions::default()
    }

    fn start_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        true
    }

    fn end_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) {}

    fn start_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        true
    }

    fn end_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) {}

    fn start_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        true
    }

    fn end_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) {}

    fn start_validator(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        true
    }

    fn end_validator(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) {}
}

impl<V: Visitor + ?Sized> Visitor for &mut V {
    fn options(&self) -> VisitOptions {
        (**self).options()
    }

    fn start_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        (**self).start_type(node, reporter)
    }

    fn end_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) {
        (**self).end_type(node, reporter)
    }

    fn start_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        (**self).start_property(node, reporter)
    }

    fn end_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) {
        (**self).end_property(node, reporter)
    }

    fn start_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        (**self).start_constraint(node, reporter)
    }

    fn end_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) {
        (**self).end_constraint(node, reporter)
    }

    fn start_validator(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        (**self).start_validator(node, reporter)
    }

    fn end_validator(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) {
        (**self).end_validator(node, reporter)
    }
}

// ---------------------------------------------------------------------------
// Closure-based visitor
// ---------------------------------------------------------------------------

/// A [`Visitor`] assembled from closures.
///
/// ```ignore
/// let mut names = Vec::new();
/// let mut visitor = HookVisitor::new()
///     .on_start_constraint(|node, _| {
///         names.push(node.descriptor.constraint_name.clone());
///         true
///     })
///     .ignore_value();
/// ```
#[derive(Default)]
pub struct HookVisitor<'h> {
    options: VisitOptions,
    start_type: Option<Box<dyn FnMut(&TypeNode<'_>, &mut Reporter<'_>) -> bool + 'h>>,
    end_type: Option<Box<dyn FnMut(&TypeNode<'_>, &mut Reporter<'_>) + 'h>>,
    start_property: Option<Box<dyn FnMut(&PropertyNode<'_>, &mut Reporter<'_>) -> bool + 'h>>,
    end_property: Option<Box<dyn FnMut(&PropertyNode<'_>, &mut Reporter<'_>) + 'h>>,
    start_constraint: Option<Box<dyn FnMut(&ConstraintNode<'_>, &mut Reporter<'_>) -> bool + 'h>>,
    end_constraint: Option<Box<dyn FnMut(&ConstraintNode<'_>, &mut Reporter<'_>) + 'h>>,
    start_validator: Option<Box<dyn FnMut(&ValidatorNode<'_>, &mut Reporter<'_>) -> bool + 'h>>,
    end_validator: Option<Box<dyn FnMut(&ValidatorNode<'_>, &mut Reporter<'_>) + 'h>>,
}

impl<'h> HookVisitor<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start_type<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&TypeNode<'_>, &mut Reporter<'_>) -> bool + 'h,
    {
        self.start_type = Some(Box::new(hook));
        self
    }

    pub fn on_end_type<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&TypeNode<'_>, &mut Reporter<'_>) + 'h,
    {
        self.end_type = Some(Box::new(hook));
        self
    }

    pub fn on_start_property<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&PropertyNode<'_>, &mut Reporter<'_>) -> bool + 'h,
    {
        self.start_property = Some(Box::new(hook));
        self
    }

    pub fn on_end_property<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&PropertyNode<'_>, &mut Reporter<'_>) + 'h,
    {
        self.end_property = Some(Box::new(hook));
        self
    }

    pub fn on_start_constraint<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ConstraintNode<'_>, &mut Reporter<'_>) -> bool + 'h,
    {
        self.start_constraint = Some(Box::new(hook));
        self.options.inspect_constraints = true;
        self
    }

    pub fn on_end_constraint<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ConstraintNode<'_>, &mut Reporter<'_>) + 'h,
    {
        self.end_constraint = Some(Box::new(hook));
        self.options.inspect_constraints = true;
        self
    }

    pub fn on_start_validator<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ValidatorNode<'_>, &mut Reporter<'_>) -> bool + 'h,
    {
        self.start_validator = Some(Box::new(hook));
        self.options.inspect_constraints = true;
        self
    }

    pub fn on_end_validator<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&ValidatorNode<'_>, &mut Reporter<'_>) + 'h,
    {
        self.end_validator = Some(Box::new(hook));
        self.options.inspect_constraints = true;
        self
    }

    /// Cascade into property types; `even_not_cascade` ignores `cascade` flags.
    pub fn recursively(mut self, even_not_cascade: bool) -> Self {
        self.options.recursively = true;
        self.options.recursively_even_not_cascade = even_not_cascade;
        self
    }

    pub fn ignore_value(mut self) -> Self {
        self.options.ignore_value = true;
        self
    }

    pub fn ignore_groups(mut self) -> Self {
        self.options.ignore_groups = true;
        self
    }

    pub fn descend_basic_types(mut self) -> Self {
        self.options.descend_basic_types = true;
        self
    }

    /// Replace all switches at once. Constraint inspection stays on once a
    /// constraint or validator hook is registered.
    pub fn with_options(mut self, options: VisitOptions) -> Self {
        self.options = VisitOptions {
            inspect_constraints: self.options.inspect_constraints || options.inspect_constraints,
            ..options
        };
        self
    }
}

impl Visitor for HookVisitor<'_> {
    fn options(&self) -> VisitOptions {
        self.options
    }

    fn start_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        self.start_type.as_mut().map_or(true, |hook| hook(node, reporter))
    }

    fn end_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) {
        if let Some(hook) = self.end_type.as_mut() {
            hook(node, reporter);
        }
    }

    fn start_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        self.start_property.as_mut().map_or(true, |hook| hook(node, reporter))
    }

    fn end_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) {
        if let Some(hook) = self.end_property.as_mut() {
            hook(node, reporter);
        }
    }

    fn start_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        self.start_constraint.as_mut().map_or(true, |hook| hook(node, reporter))
    }

    fn end_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) {
        if let Some(hook) = self.end_constraint.as_mut() {
            hook(node, reporter);
        }
    }

    fn start_validator(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        self.start_validator.as_mut().map_or(true, |hook| hook(node, reporter))
    }

    fn end_validator(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) {
        if let Some(hook) = self.end_validator.as_mut() {
            hook(node, reporter);
        }
    }
}

impl std::fmt::Debug for HookVisitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookVisitor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

struct Visiting<V> {
    visitor: V,
    options: VisitOptions,
}

impl<V: Visitor> Visiting<V> {
    fn new(visitor: V) -> Self {
        let options = visitor.options();
        Self { visitor, options }
    }
}

impl<V: Visitor> Strategy for Visiting<V> {
    fn evaluates_constraints(&self) -> bool {
        self.options.inspect_constraints
    }

    fn ignores_value(&self) -> bool {
        self.options.ignore_value
    }

    fn ignores_groups(&self) -> bool {
        self.options.ignore_groups
    }

    fn cascades(&self, ty: &TypeDescriptor, property: &PropertyDescriptor) -> bool {
        (self.options.descend_basic_types && ty.is_basic_type)
            || (self.options.recursively
                && (self.options.recursively_even_not_cascade || property.cascade))
    }

    fn start_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        self.visitor.start_type(node, reporter)
    }

    fn end_type(&mut self, node: &TypeNode<'_>, reporter: &mut Reporter<'_>) {
        self.visitor.end_type(node, reporter);
    }

    fn start_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        self.visitor.start_property(node, reporter)
    }

    fn end_property(&mut self, node: &PropertyNode<'_>, reporter: &mut Reporter<'_>) {
        self.visitor.end_property(node, reporter);
    }

    fn start_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) -> bool {
        self.visitor.start_constraint(node, reporter)
    }

    fn end_constraint(&mut self, node: &ConstraintNode<'_>, reporter: &mut Reporter<'_>) {
        self.visitor.end_constraint(node, reporter);
    }

    fn check(&mut self, node: &ValidatorNode<'_>, reporter: &mut Reporter<'_>) -> Verdict {
        if self.visitor.start_validator(node, reporter) {
            self.visitor.end_validator(node, reporter);
        }
        Verdict::Unchecked
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Visit a type descriptor and, per the visitor's options, what lies below it.
pub fn visit_type<V: Visitor>(
    catalog: &Catalog,
    ty: &TypeDescriptor,
    value: Option<&Value>,
    path: &PropertyPath,
    groups: &[String],
    sinks: &mut ViolationSinks,
    visitor: V,
) {
    let (buffers, route) = sinks.parts();
    Walker::new(catalog, Visiting::new(visitor), buffers).walk_type(ty, value, path, groups, route);
}

/// Visit one property of `container`; `path` is the container's path.
#[allow(clippy::too_many_arguments)]
pub fn visit_property<V: Visitor>(
    catalog: &Catalog,
    property: &PropertyDescriptor,
    key: &PropertyKey,
    container: Option<&Value>,
    path: &PropertyPath,
    groups: &[String],
    sinks: &mut ViolationSinks,
    visitor: V,
) {
    let (buffers, route) = sinks.parts();
    Walker::new(catalog, Visiting::new(visitor), buffers)
        .walk_property(property, key, container, path, groups, route);
}

/// Visit one constraint and its composing constraints.
///
/// Constraint and validator hooks fire here regardless of
/// `inspect_constraints`; that switch only governs whether types and
/// properties walk into their constraint lists.
pub fn visit_constraint<V: Visitor>(
    catalog: &Catalog,
    constraint: &ConstraintDescriptor,
    value: Option<&Value>,
    path: &PropertyPath,
    groups: &[String],
    sinks: &mut ViolationSinks,
    visitor: V,
) {
    let (buffers, route) = sinks.parts();
    Walker::new(catalog, Visiting::new(visitor), buffers)
        .walk_constraint(constraint, value, path, groups, route);
}
