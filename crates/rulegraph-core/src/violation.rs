//! # Violations and Reporting
//!
//! A [`Violation`] records one failed rule: the constraint (with its
//! effective attributes), the offending value, the message template, the
//! formatted message, and the property path.
//!
//! ## Sinks
//!
//! Every traversal writes into two logical lists: the *local* list, which
//! collects ordinary constraint failures, and the *global* list, which
//! collects structural failures and the output of basic types and global
//! validators. Top-level entry points use one list for both; the low-level
//! operations accept [`ViolationSinks::split`] when the caller wants them
//! apart.
//!
//! Composed constraints reported as a single violation redirect their
//! children's local output into a scratch list that is discarded once the
//! children have run. The [`Reporter`] handed to validators and visitor
//! hooks always points at the lists in effect for the node being visited.
//!
//! ## Message formatting
//!
//! The template is the constraint's `message` attribute, or
//! `{ConstraintName}` when none is set. The catalog's [`MessageFormatter`]
//! turns it into the message; [`JsonMessageFormatter`] is the default and
//! renders `{"template":..,"attributes":..,"invalidValue":..}`.

use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{Attributes, ConstraintDescriptor};

/// One reported failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// The violated constraint, with default attribute values merged in.
    pub constraint_descriptor: ConstraintDescriptor,
    /// The value that failed; `None` when the value was missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_value: Option<Value>,
    /// The unformatted message template.
    pub message_template: String,
    /// The formatted message.
    pub message: String,
    /// Path of the value relative to the validated root.
    pub property_path: String,
}

impl Violation {
    /// Build a violation, resolving the template and formatting the message.
    pub fn new(
        constraint: ConstraintDescriptor,
        invalid_value: Option<&Value>,
        property_path: impl Into<String>,
        formatter: &dyn MessageFormatter,
    ) -> Self {
        let message_template = message_template(&constraint);
        let message = formatter.format(&message_template, constraint.attributes.as_ref(), invalid_value);
        Self {
            constraint_descriptor: constraint,
            invalid_value: invalid_value.cloned(),
            message_template,
            message,
            property_path: property_path.into(),
        }
    }

    /// Name of the violated constraint.
    pub fn constraint_name(&self) -> &str {
        &self.constraint_descriptor.constraint_name
    }
}

/// The explicit `message` attribute, or `{ConstraintName}`.
pub fn message_template(constraint: &ConstraintDescriptor) -> String {
    match constraint.attribute("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        _ => format!("{{{}}}", constraint.constraint_name),
    }
}

// ---------------------------------------------------------------------------
// Message formatting
// ---------------------------------------------------------------------------

/// Turns a template into a human-readable message.
pub trait MessageFormatter: Send + Sync {
    /// Format `template` using the constraint attributes and the offending value.
    fn format(&self, template: &str, attributes: Option<&Attributes>, invalid_value: Option<&Value>) -> String;
}

impl<F> MessageFormatter for F
where
    F: Fn(&str, Option<&Attributes>, Option<&Value>) -> String + Send + Sync,
{
    fn format(&self, template: &str, attributes: Option<&Attributes>, invalid_value: Option<&Value>) -> String {
        self(template, attributes, invalid_value)
    }
}

/// Default formatter: the inputs serialized as a compact JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMessageFormatter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FormattedInputs<'a> {
    template: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invalid_value: Option<&'a Value>,
}

impl MessageFormatter for JsonMessageFormatter {
    fn format(&self, template: &str, attributes: Option<&Attributes>, invalid_value: Option<&Value>) -> String {
        let inputs = FormattedInputs {
            template,
            attributes,
            invalid_value,
        };
        serde_json::to_string(&inputs).unwrap_or_else(|_| template.to_string())
    }
}

// ---------------------------------------------------------------------------
// Sinks and routing
// ---------------------------------------------------------------------------

/// Which logical list a violation goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The list in effect for the current node.
    Local,
    /// The global list.
    Global,
}

/// Indices of the local and global buffers for the node being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Route {
    pub(crate) local: usize,
    pub(crate) global: usize,
}

impl Route {
    /// Route local output into the global list.
    pub(crate) fn to_global(self) -> Self {
        Self {
            local: self.global,
            global: self.global,
        }
    }

    pub(crate) fn with_local(self, local: usize) -> Self {
        Self {
            local,
            global: self.global,
        }
    }
}

/// Owner of the violation lists a traversal writes into.
#[derive(Debug, Clone)]
pub struct ViolationSinks {
    buffers: Vec<Vec<Violation>>,
    route: Route,
}

impl ViolationSinks {
    /// One list for both local and global violations.
    pub fn shared() -> Self {
        Self {
            buffers: vec![Vec::new()],
            route: Route { local: 0, global: 0 },
        }
    }

    /// Separate local and global lists.
    pub fn split() -> Self {
        Self {
            buffers: vec![Vec::new(), Vec::new()],
            route: Route { local: 0, global: 1 },
        }
    }

    /// The local list (the only list when shared).
    pub fn violations(&self) -> &[Violation] {
        &self.buffers[self.route.local]
    }

    /// The global list (the only list when shared).
    pub fn global_violations(&self) -> &[Violation] {
        &self.buffers[self.route.global]
    }

    /// Whether local and global violations share one list.
    pub fn is_shared(&self) -> bool {
        self.route.local == self.route.global
    }

    /// Every violation: the shared list, or local followed by global.
    pub fn into_violations(self) -> Vec<Violation> {
        let (mut local, global) = self.into_split();
        local.extend(global);
        local
    }

    /// `(local, global)`. A shared sink returns everything as local.
    pub fn into_split(mut self) -> (Vec<Violation>, Vec<Violation>) {
        self.buffers.truncate(2);
        let global = if self.is_shared() {
            Vec::new()
        } else {
            self.buffers.pop().unwrap_or_default()
        };
        let local = self.buffers.pop().unwrap_or_default();
        (local, global)
    }

    pub(crate) fn parts(&mut self) -> (&mut Vec<Vec<Violation>>, Route) {
        (&mut self.buffers, self.route)
    }
}

impl Default for ViolationSinks {
    fn default() -> Self {
        Self::shared()
    }
}

/// Write access to the violation lists in effect for one node.
///
/// Validators use it to push extra violations beyond their boolean result;
/// visitor hooks use it to inspect or extend the lists.
pub struct Reporter<'a> {
    buffers: &'a mut Vec<Vec<Violation>>,
    route: Route,
    formatter: &'a dyn MessageFormatter,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(
        buffers: &'a mut Vec<Vec<Violation>>,
        route: Route,
        formatter: &'a dyn MessageFormatter,
    ) -> Self {
        Self {
            buffers,
            route,
            formatter,
        }
    }

    /// Build a violation for `constraint` and append it to `target`.
    pub fn report(
        &mut self,
        target: Target,
        constraint: ConstraintDescriptor,
        invalid_value: Option<&Value>,
        path: &str,
    ) {
        let violation = Violation::new(constraint, invalid_value, path, self.formatter);
        self.sink_mut(target).push(violation);
    }

    /// Append an already built violation.
    pub fn push(&mut self, target: Target, violation: Violation) {
        self.sink_mut(target).push(violation);
    }

    /// The local list in effect for this node.
    pub fn violations(&self) -> &[Violation] {
        &self.buffers[self.route.local]
    }

    /// The global list.
    pub fn global_violations(&self) -> &[Violation] {
        &self.buffers[self.route.global]
    }

    /// Whether local output currently lands in the global list.
    pub fn routes_to_global(&self) -> bool {
        self.route.local == self.route.global
    }

    /// The formatter used for new violations.
    pub fn formatter(&self) -> &dyn MessageFormatter {
        self.formatter
    }

    pub(crate) fn sink_mut(&mut self, target: Target) -> &mut Vec<Violation> {
        let index = match target {
            Target::Local => self.route.local,
            Target::Global => self.route.global,
        };
        &mut self.buffers[index]
    }
}

impl std::fmt::Debug for Reporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("local", &self.violations().len())
            .field("global", &self.global_violations().len())
            .finish_non_exhaustive()
    }
}
