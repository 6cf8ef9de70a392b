//! # Error Types
//!
//! Traversal never fails: structural problems found while walking a value
//! (unknown types, unknown properties, missing validators) are reported as
//! ordinary [`Violation`](crate::Violation) records. The errors defined here
//! cover the surfaces around the engine that can genuinely fail, such as
//! reading a catalog document or parsing a type name.

use thiserror::Error;

/// Error raised while building a [`Catalog`](crate::Catalog) from external input.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A catalog document could not be read.
    #[error("cannot read catalog document '{path}': {source}")]
    Io {
        /// Path of the document.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },

    /// A JSON catalog document is malformed.
    #[error("invalid JSON in catalog document '{path}': {source}")]
    Json {
        /// Path of the document, or `<inline>` for in-memory input.
        path: String,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A YAML catalog document is malformed.
    #[error("invalid YAML in catalog document '{path}': {source}")]
    Yaml {
        /// Path of the document, or `<inline>` for in-memory input.
        path: String,
        /// Underlying parse failure.
        #[source]
        source: serde_yaml::Error,
    },

    /// A YAML document uses features JSON cannot represent.
    #[error("YAML document '{path}' has no JSON equivalent: {reason}")]
    UnrepresentableYaml {
        /// Path of the document.
        path: String,
        /// The offending construct.
        reason: String,
    },

    /// The file extension does not name a supported document format.
    #[error("unsupported catalog format for '{path}' (expected .json, .yaml or .yml)")]
    UnsupportedFormat {
        /// Path of the document.
        path: String,
    },

    /// A type name could not be parsed.
    #[error("invalid type name '{input}': {reason}")]
    InvalidTypeName {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}
