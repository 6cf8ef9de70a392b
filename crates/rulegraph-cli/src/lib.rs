//! # rulegraph-cli: Rule Catalog Command-Line Interface
//!
//! Runs the validation and visitor engines over files on disk.
//!
//! ## Subcommands
//!
//! - `validate`: validate JSON/YAML documents against a type of a catalog
//! - `describe`: print the HTML input type and validation rules derived
//!   for one property
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in the subcommand modules; handlers return the
//!   process exit code and leave printing of errors to `main`.
//! - Every catalog starts from the built-ins; catalog documents given on the
//!   command line are layered on top, in order.

pub mod describe;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use rulegraph_builtins::EnglishMessageFormatter;
use rulegraph_core::{Catalog, TypeName};
use serde::Serialize;

/// Output encoding shared by the subcommands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON document.
    Json,
    /// One YAML document.
    Yaml,
}

/// The built-in catalog with English messages, extended by each document.
pub fn load_catalog(paths: &[PathBuf]) -> Result<Catalog> {
    let mut catalog = rulegraph_builtins::catalog();
    catalog.set_message_formatter(EnglishMessageFormatter);
    for path in paths {
        catalog
            .load_file(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?;
        tracing::debug!(catalog = %path.display(), "catalog loaded");
    }
    Ok(catalog)
}

/// Parse a type name given on the command line, e.g. `List<Person>`.
pub fn parse_type_name(input: &str) -> Result<TypeName> {
    input
        .parse::<TypeName>()
        .with_context(|| format!("invalid type name '{input}'"))
}

/// Encode a report as JSON or YAML.
pub fn encode<T: Serialize>(report: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(report).context("failed to encode report as YAML"),
        OutputFormat::Json | OutputFormat::Text => {
            serde_json::to_string_pretty(report).context("failed to encode report as JSON")
        }
    }
}

/// Display form of a violation path; the root is shown as `<root>`.
pub fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Groups to validate under: the given ones, or `Default`.
pub fn effective_groups(groups: &[String]) -> Vec<String> {
    if groups.is_empty() {
        vec![rulegraph_core::DEFAULT_GROUP.to_string()]
    } else {
        groups.to_vec()
    }
}

pub(crate) fn label(path: &Path) -> String {
    path.display().to_string()
}
