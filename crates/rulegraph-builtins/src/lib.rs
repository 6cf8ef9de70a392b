//! # rulegraph-builtins: The Standard Rule Catalog
//!
//! Everything a [`Catalog`] needs before user rules are added:
//!
//! - [`types`]: basic value types (`String`, `int`, `BigDecimal`, ...) and
//!   the generic factories (`List<T>`, `Map<K, V>`, `Container<T>`).
//! - [`validators`]: the structural checks behind basic types and the
//!   standard bean-validation style constraints (`NotNull`, `Max`, `Size`,
//!   `Pattern`, ...).
//! - [`messages`]: an English [`MessageFormatter`](rulegraph_core::MessageFormatter).
//! - [`introspect`]: visitor-driven utilities that derive form hints from
//!   the rules or edit a value to match them.
//!
//! ```ignore
//! let catalog = rulegraph_builtins::catalog();
//! let violations = catalog.validate_object(&TypeName::simple("int"), &json!("x"), &["Default"]);
//! ```

pub mod introspect;
pub mod messages;
pub mod types;
pub mod validators;

pub use introspect::{
    fill_object_properties, html_input_type, html_validation_rules, set_object_type, HtmlValidationRules,
    InputType, Introspection,
};
pub use messages::EnglishMessageFormatter;
pub use types::install_types;
pub use validators::install_validators;

use rulegraph_core::Catalog;

/// Register the built-in types and validators into `catalog`. Existing
/// entries with the same names are replaced.
pub fn install(catalog: &mut Catalog) {
    install_types(catalog);
    install_validators(catalog);
}

/// A fresh catalog holding only the built-ins, with JSON messages.
pub fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    install(&mut catalog);
    catalog
}
