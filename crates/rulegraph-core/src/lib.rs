//! # rulegraph-core: Descriptor-Driven Validation
//!
//! Validates in-memory JSON value graphs against rules expressed as data.
//! A [`Catalog`] holds type descriptors (or factories for generic types),
//! constraint validators, group inheritance and a message formatter. Two
//! engines walk a value against those rules:
//!
//! - the **validation engine** ([`validate`], [`Catalog::validate_object`]
//!   and friends) produces a flat, ordered list of [`Violation`]s;
//! - the **visitor engine** ([`visit`], [`Catalog::visit_object`]) drives a
//!   [`Visitor`]'s hooks over the same graph, with or without a value, to
//!   introspect the rules.
//!
//! Both engines share one traversal, so their recursion, group gating,
//! cascade and collection iteration cannot drift apart. The decisions where
//! they differ on purpose are isolated in the traversal strategy.
//!
//! ## Failure model
//!
//! Nothing in the engines returns `Result`. Unknown types, unknown
//! properties and missing validators are reported as violations in the
//! global list, and traversal continues with the next sibling. Only the
//! surfaces around the engine that read documents or parse names return
//! [`CatalogError`].
//!
//! ## Crate Policy
//!
//! - Descriptors are never mutated during traversal; validator defaults are
//!   merged into a borrowed-or-owned view per evaluation.
//! - Violation order is significant and reproducible: composing failures
//!   precede their parent, properties follow declaration order, and array
//!   elements follow index order.

pub mod api;
pub mod catalog;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod groups;
pub mod path;
mod traverse;
pub mod validate;
pub mod validator;
pub mod value;
pub mod violation;
pub mod visit;

pub use api::{PropertyRef, TypeHandle, TypeRef};
pub use catalog::{Catalog, TypeEntry, TypeFactory};
pub use descriptor::{
    Attributes, ConstraintDescriptor, GroupConversions, PropertyDescriptor, TypeDescriptor, TypeName,
    INVALID_CONSTRAINT_ATTRIBUTE_VALUE, OBJECT_CONSTRAINT, PROPERTY_NOT_FOUND, TYPE_NOT_FOUND,
    VALIDATOR_NOT_FOUND,
};
pub use document::CatalogDocument;
pub use error::CatalogError;
pub use groups::{default_groups, GroupInheritance, DEFAULT_GROUP};
pub use path::{PropertyKey, PropertyPath};
pub use traverse::{ConstraintNode, PropertyNode, TypeNode, ValidatorNode};
pub use validator::{load_default_constraint_values, Validator, ValidatorInput};
pub use violation::{JsonMessageFormatter, MessageFormatter, Reporter, Target, Violation, ViolationSinks};
pub use visit::{HookVisitor, VisitOptions, Visitor};
