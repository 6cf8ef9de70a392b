//! # Property Paths
//!
//! A [`PropertyPath`] locates a value relative to the root passed to an
//! entry point. It renders the way violations report it: the root label
//! followed by `.segment` for every step, so the `age` property of a
//! top-level object is `.age` and the third element of its `tags` list is
//! `.tags.2`.
//!
//! Paths also render as RFC 6901 JSON pointers, which the mutating
//! introspection utilities use to apply edits after a walk completes.

use std::fmt;

use serde_json::Value;

/// One step of a property path: a named property or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// An object property or map key.
    Name(String),
    /// An array index.
    Index(usize),
}

impl PropertyKey {
    /// The key as it appears in violation attributes.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Name(name) => Value::String(name.clone()),
            Self::Index(index) => Value::from(*index),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Location of a value below the entry-point root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    root: String,
    segments: Vec<PropertyKey>,
}

impl PropertyPath {
    /// The empty root path used by every top-level entry point.
    pub fn root() -> Self {
        Self::default()
    }

    /// A root path with a label prepended to every rendered path.
    pub fn labelled(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            segments: Vec::new(),
        }
    }

    /// The path one step below this one.
    pub fn child(&self, key: PropertyKey) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(key);
        Self {
            root: self.root.clone(),
            segments,
        }
    }

    /// The steps below the root.
    pub fn segments(&self) -> &[PropertyKey] {
        &self.segments
    }

    /// Whether this is the root itself.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// RFC 6901 pointer to the value, relative to the root value.
    pub fn json_pointer(&self) -> String {
        let mut pointer = String::new();
        for segment in &self.segments {
            pointer.push('/');
            match segment {
                PropertyKey::Name(name) => {
                    pointer.push_str(&name.replace('~', "~0").replace('/', "~1"));
                }
                PropertyKey::Index(index) => pointer.push_str(&index.to_string()),
            }
        }
        pointer
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_renders_empty() {
        assert_eq!(PropertyPath::root().to_string(), "");
        assert!(PropertyPath::root().is_root());
    }

    #[test]
    fn test_child_paths_render_dot_separated() {
        let path = PropertyPath::root()
            .child("tags".into())
            .child(2.into())
            .child("label".into());
        assert_eq!(path.to_string(), ".tags.2.label");
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn test_labelled_root_prefixes_every_path() {
        let path = PropertyPath::labelled("person").child("age".into());
        assert_eq!(path.to_string(), "person.age");
    }

    #[test]
    fn test_json_pointer_escapes_reserved_characters() {
        let path = PropertyPath::root()
            .child("a/b".into())
            .child("m~n".into())
            .child(0.into());
        assert_eq!(path.json_pointer(), "/a~1b/m~0n/0");
        assert_eq!(PropertyPath::root().json_pointer(), "");
    }
}
