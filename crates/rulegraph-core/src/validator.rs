//! # Constraint Validators
//!
//! A [`Validator`] is the pluggable predicate behind a constraint name. It
//! receives the value, the constraint's effective attributes, the
//! constraint itself, the path, and a [`Reporter`] for any extra violations
//! it wants to record. Returning `false` marks the value invalid; the engine
//! then reports the constraint's own violation.
//!
//! Metadata:
//!
//! - `global`: the validator's failures always land in the global list.
//! - `html_required`: introspection treats the constraint as "required".
//! - `default_values`: attribute defaults merged into constraints that
//!   leave those attributes unset.
//!
//! ## Default values
//!
//! Traversal never mutates descriptors. [`effective_attributes`] computes
//! the merged view on the fly, borrowing the declared attributes whenever
//! nothing is missing. [`load_default_constraint_values`] performs the same
//! merge in place for callers that want to pre-warm owned descriptors.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::descriptor::{Attributes, ConstraintDescriptor};
use crate::path::PropertyPath;
use crate::violation::Reporter;

/// Everything a validator sees for one evaluation.
pub struct ValidatorInput<'a, 'r> {
    /// The value under test; `None` when missing.
    pub value: Option<&'a Value>,
    /// Effective attributes (declared values plus defaults).
    pub attributes: &'a Attributes,
    /// The constraint being evaluated.
    pub constraint: &'a ConstraintDescriptor,
    /// Location of the value.
    pub path: &'a PropertyPath,
    /// Sink for extra violations.
    pub reporter: &'a mut Reporter<'r>,
}

impl ValidatorInput<'_, '_> {
    /// Look up one effective attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

type CheckFn = dyn Fn(ValidatorInput<'_, '_>) -> bool + Send + Sync;

/// A constraint implementation plus its metadata.
#[derive(Clone)]
pub struct Validator {
    check: Arc<CheckFn>,
    global: bool,
    html_required: bool,
    default_values: Option<Attributes>,
}

impl Validator {
    /// Wrap a check function.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(ValidatorInput<'_, '_>) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            global: false,
            html_required: false,
            default_values: None,
        }
    }

    /// A validator that accepts every value. Used for constraints without a
    /// registered implementation.
    pub fn noop() -> Self {
        Self::new(|_| true)
    }

    /// Route this validator's failures to the global list.
    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Mark the constraint as an HTML `required` rule.
    pub fn html_required(mut self) -> Self {
        self.html_required = true;
        self
    }

    /// Declare one attribute default.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_values
            .get_or_insert_with(Attributes::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace all attribute defaults.
    pub fn with_defaults(mut self, defaults: Attributes) -> Self {
        self.default_values = Some(defaults);
        self
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn is_html_required(&self) -> bool {
        self.html_required
    }

    pub fn default_values(&self) -> Option<&Attributes> {
        self.default_values.as_ref()
    }

    /// Run the check.
    pub fn check(&self, input: ValidatorInput<'_, '_>) -> bool {
        (self.check)(input)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("global", &self.global)
            .field("html_required", &self.html_required)
            .field("default_values", &self.default_values)
            .finish_non_exhaustive()
    }
}

/// The shared empty attribute map.
pub fn empty_attributes() -> &'static Attributes {
    static EMPTY: OnceLock<Attributes> = OnceLock::new();
    EMPTY.get_or_init(Attributes::new)
}

/// The attributes of `constraint` as they look once the validator's
/// defaults are loaded. `None` means the constraint has no attributes at all.
pub fn effective_attributes<'c>(
    constraint: &'c ConstraintDescriptor,
    validator: Option<&Validator>,
) -> Option<Cow<'c, Attributes>> {
    let declared = constraint.attributes.as_ref();
    let defaults = match validator.and_then(Validator::default_values) {
        Some(defaults) if !constraint.default_values_loaded => defaults,
        _ => return declared.map(Cow::Borrowed),
    };

    match declared {
        Some(attributes) if defaults.keys().all(|key| attributes.contains_key(key)) => {
            Some(Cow::Borrowed(attributes))
        }
        _ => {
            let mut merged = declared.cloned().unwrap_or_default();
            merge_absent(&mut merged, defaults);
            Some(Cow::Owned(merged))
        }
    }
}

/// Merge the validator's defaults into `constraint.attributes` in place.
///
/// Only absent keys are filled. The `default_values_loaded` flag is set
/// whether or not the validator declares defaults, so repeated calls are
/// no-ops.
pub fn load_default_constraint_values(constraint: &mut ConstraintDescriptor, validator: &Validator) {
    if constraint.default_values_loaded {
        return;
    }
    if let Some(defaults) = validator.default_values() {
        let attributes = constraint.attributes.get_or_insert_with(Attributes::new);
        merge_absent(attributes, defaults);
    }
    constraint.default_values_loaded = true;
}

/// The constraint as recorded in a violation: attributes replaced by their
/// effective view and the defaults flag set when a validator was found.
pub(crate) fn reported_constraint(
    constraint: &ConstraintDescriptor,
    attributes: Option<&Attributes>,
    validator_found: bool,
) -> ConstraintDescriptor {
    let mut reported = constraint.clone();
    if validator_found {
        reported.attributes = attributes.cloned();
        reported.default_values_loaded = true;
    }
    reported
}

fn merge_absent(attributes: &mut Attributes, defaults: &Attributes) {
    for (key, value) in defaults {
        if !attributes.contains_key(key) {
            attributes.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn size_validator() -> Validator {
        Validator::noop().with_default("min", 0).with_default("max", 2147483647)
    }

    #[test]
    fn test_effective_attributes_borrow_when_complete() {
        let constraint = ConstraintDescriptor::new("Size")
            .with_attribute("min", 1)
            .with_attribute("max", 5);
        let attributes = effective_attributes(&constraint, Some(&size_validator())).unwrap();
        assert!(matches!(attributes, Cow::Borrowed(_)));
    }

    #[test]
    fn test_effective_attributes_fill_only_absent_keys() {
        let constraint = ConstraintDescriptor::new("Size").with_attribute("min", 3);
        let attributes = effective_attributes(&constraint, Some(&size_validator())).unwrap();
        assert_eq!(attributes.get("min"), Some(&json!(3)));
        assert_eq!(attributes.get("max"), Some(&json!(2147483647)));
        // The descriptor itself is untouched.
        assert!(constraint.attribute("max").is_none());
    }

    #[test]
    fn test_effective_attributes_without_defaults() {
        let constraint = ConstraintDescriptor::new("NotNull");
        assert!(effective_attributes(&constraint, Some(&Validator::noop())).is_none());
        assert!(effective_attributes(&constraint, None).is_none());
    }

    #[test]
    fn test_load_defaults_is_idempotent() {
        let validator = size_validator();
        let mut constraint = ConstraintDescriptor::new("Size").with_attribute("max", 10);
        load_default_constraint_values(&mut constraint, &validator);
        let first = constraint.clone();
        load_default_constraint_values(&mut constraint, &validator);
        assert_eq!(constraint, first);
        assert_eq!(constraint.attribute("max"), Some(&json!(10)));
        assert_eq!(constraint.attribute("min"), Some(&json!(0)));
        assert!(constraint.default_values_loaded);
    }

    #[test]
    fn test_load_defaults_sets_flag_without_defaults() {
        let mut constraint = ConstraintDescriptor::new("NotNull");
        load_default_constraint_values(&mut constraint, &Validator::noop());
        assert!(constraint.default_values_loaded);
        assert!(constraint.attributes.is_none());
    }

    #[test]
    fn test_loaded_flag_short_circuits_merge() {
        let mut constraint = ConstraintDescriptor::new("Size");
        constraint.default_values_loaded = true;
        assert!(effective_attributes(&constraint, Some(&size_validator())).is_none());
    }
}
