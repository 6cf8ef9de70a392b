//! # Validation Groups
//!
//! A constraint declares the groups it belongs to in its `groups` attribute
//! (`["Default"]` when unset). It is active when one of the requested
//! groups, or a group they inherit from, is among the declared ones.
//!
//! Inheritance expansion is a plain recursive walk of the inheritance map
//! with no cycle guard: a self-referential chain recurses without bound.
//! [`find_inheritance_cycle`] lets catalog loaders detect such chains up
//! front.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use serde_json::Value;

use crate::descriptor::{Attributes, GroupConversions};

/// Name of the group every constraint belongs to unless told otherwise.
pub const DEFAULT_GROUP: &str = "Default";

/// Group inheritance: group name to the names of the groups it extends.
pub type GroupInheritance = HashMap<String, Vec<String>>;

/// The `["Default"]` group list.
pub fn default_groups() -> &'static [String] {
    static DEFAULT: OnceLock<Vec<String>> = OnceLock::new();
    DEFAULT.get_or_init(|| vec![DEFAULT_GROUP.to_string()])
}

/// Whether any candidate, directly or through inheritance, is allowed.
///
/// `allowed` defaults to `["Default"]` when `None`.
pub fn group_allowed<S: AsRef<str>>(
    inheritance: &GroupInheritance,
    candidates: &[S],
    allowed: Option<&[&str]>,
) -> bool {
    let allowed = allowed.unwrap_or(&[DEFAULT_GROUP]);
    if candidates
        .iter()
        .any(|candidate| allowed.contains(&candidate.as_ref()))
    {
        return true;
    }
    candidates.iter().any(|candidate| {
        inheritance
            .get(candidate.as_ref())
            .is_some_and(|parents| group_allowed(inheritance, parents.as_slice(), Some(allowed)))
    })
}

/// Rename groups per the conversion rules of a cascaded property.
///
/// Groups without a rule, or whose rule maps to an empty name, pass through.
pub fn convert_groups<'g>(groups: &'g [String], conversions: &GroupConversions) -> Cow<'g, [String]> {
    if conversions.is_empty() {
        return Cow::Borrowed(groups);
    }
    Cow::Owned(
        groups
            .iter()
            .map(|group| match conversions.get(group) {
                Some(mapped) if !mapped.is_empty() => mapped.clone(),
                _ => group.clone(),
            })
            .collect(),
    )
}

/// The groups a constraint declares, or `None` to fall back to `Default`.
///
/// A bare string counts as a single group.
pub fn declared_groups(attributes: &Attributes) -> Option<Vec<&str>> {
    match attributes.get("groups")? {
        Value::Array(groups) => Some(groups.iter().filter_map(Value::as_str).collect()),
        Value::String(group) => Some(vec![group.as_str()]),
        _ => None,
    }
}

/// The first cycle in the inheritance map, as the chain of group names that
/// closes it (`[A, B, A]`), or `None` when the map is acyclic.
pub fn find_inheritance_cycle(inheritance: &GroupInheritance) -> Option<Vec<String>> {
    let mut finished = HashSet::new();
    let mut roots: Vec<&String> = inheritance.keys().collect();
    roots.sort();
    for root in roots {
        let mut stack = Vec::new();
        if let Some(cycle) = cycle_from(inheritance, root, &mut stack, &mut finished) {
            return Some(cycle);
        }
    }
    None
}

fn cycle_from<'a>(
    inheritance: &'a GroupInheritance,
    group: &'a String,
    stack: &mut Vec<&'a String>,
    finished: &mut HashSet<&'a String>,
) -> Option<Vec<String>> {
    if let Some(start) = stack.iter().position(|entry| *entry == group) {
        let mut cycle: Vec<String> = stack[start..].iter().map(|g| g.to_string()).collect();
        cycle.push(group.clone());
        return Some(cycle);
    }
    if finished.contains(group) {
        return None;
    }
    stack.push(group);
    for parent in inheritance.get(group).into_iter().flatten() {
        if let Some(cycle) = cycle_from(inheritance, parent, stack, finished) {
            return Some(cycle);
        }
    }
    stack.pop();
    finished.insert(group);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inheritance(pairs: &[(&str, &str)]) -> GroupInheritance {
        let mut map = GroupInheritance::new();
        for (group, parent) in pairs {
            map.entry(group.to_string()).or_default().push(parent.to_string());
        }
        map
    }

    #[test]
    fn test_direct_membership() {
        let map = GroupInheritance::new();
        assert!(group_allowed(&map, &["Default"], None));
        assert!(!group_allowed(&map, &["Admin"], None));
        assert!(group_allowed(&map, &["Admin"], Some(&["Admin", "Other"][..])));
    }

    #[test]
    fn test_inherited_membership() {
        let map = inheritance(&[("Strict", "Basic"), ("Basic", "Default")]);
        assert!(group_allowed(&map, &["Strict"], None));
        assert!(group_allowed(&map, &["Strict"], Some(&["Basic"][..])));
        assert!(!group_allowed(&map, &["Basic"], Some(&["Strict"][..])));
    }

    #[test]
    fn test_convert_groups_renames_mapped_groups_only() {
        let groups = vec!["Default".to_string(), "Admin".to_string()];
        let mut conversions = GroupConversions::new();
        conversions.insert("Default".into(), "Nested".into());
        conversions.insert("Admin".into(), String::new());
        assert_eq!(&*convert_groups(&groups, &conversions), ["Nested", "Admin"]);
        assert!(matches!(
            convert_groups(&groups, &GroupConversions::new()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_declared_groups_shapes() {
        let mut attributes = Attributes::new();
        assert_eq!(declared_groups(&attributes), None);
        attributes.insert("groups".into(), json!(["A", "B"]));
        assert_eq!(declared_groups(&attributes), Some(vec!["A", "B"]));
        attributes.insert("groups".into(), json!("A"));
        assert_eq!(declared_groups(&attributes), Some(vec!["A"]));
    }

    #[test]
    fn test_find_inheritance_cycle() {
        let acyclic = inheritance(&[("A", "B"), ("B", "Default")]);
        assert_eq!(find_inheritance_cycle(&acyclic), None);

        let cyclic = inheritance(&[("A", "B"), ("B", "C"), ("C", "A")]);
        assert_eq!(
            find_inheritance_cycle(&cyclic),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string(), "A".to_string()])
        );

        let self_loop = inheritance(&[("Loop", "Loop")]);
        assert_eq!(
            find_inheritance_cycle(&self_loop),
            Some(vec!["Loop".to_string(), "Loop".to_string()])
        );
    }
}
