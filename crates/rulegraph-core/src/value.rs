//! Value access helpers shared by both traversal strategies.
//!
//! `None` stands for a missing value and `Some(Value::Null)` for an explicit
//! null. The engine treats both as "no value".

use serde_json::Value;

use crate::path::PropertyKey;

/// True for a missing value or an explicit null.
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Read one property of a container.
///
/// Objects are read by key and arrays by index. A numeric name reads an
/// array element and an index reads the object key of the same spelling.
/// Any other container yields `None`.
pub fn property_of<'v>(container: Option<&'v Value>, key: &PropertyKey) -> Option<&'v Value> {
    match (container?, key) {
        (Value::Object(map), PropertyKey::Name(name)) => map.get(name),
        (Value::Object(map), PropertyKey::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), PropertyKey::Index(index)) => items.get(*index),
        (Value::Array(items), PropertyKey::Name(name)) => {
            name.parse::<usize>().ok().and_then(|index| items.get(index))
        }
        _ => None,
    }
}

/// Keys visited when iterating a collection value: indices for arrays and
/// keys in insertion order for objects. Scalars have no elements.
pub fn element_keys(value: Option<&Value>) -> Vec<PropertyKey> {
    match value {
        Some(Value::Array(items)) => (0..items.len()).map(PropertyKey::Index).collect(),
        Some(Value::Object(map)) => map.keys().cloned().map(PropertyKey::Name).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_covers_missing_and_null() {
        assert!(is_absent(None));
        assert!(is_absent(Some(&Value::Null)));
        assert!(!is_absent(Some(&json!(0))));
        assert!(!is_absent(Some(&json!(""))));
    }

    #[test]
    fn test_property_of_reads_objects_and_arrays() {
        let object = json!({ "a": 1, "0": "zero" });
        let array = json!(["x", "y"]);
        assert_eq!(property_of(Some(&object), &"a".into()), Some(&json!(1)));
        assert_eq!(property_of(Some(&object), &PropertyKey::Index(0)), Some(&json!("zero")));
        assert_eq!(property_of(Some(&array), &PropertyKey::Index(1)), Some(&json!("y")));
        assert_eq!(property_of(Some(&array), &"0".into()), Some(&json!("x")));
        assert_eq!(property_of(Some(&array), &"first".into()), None);
        assert_eq!(property_of(Some(&json!(3)), &"a".into()), None);
        assert_eq!(property_of(None, &"a".into()), None);
    }

    #[test]
    fn test_element_keys_follow_insertion_order() {
        let map = json!({ "z": 1, "a": 2 });
        assert_eq!(element_keys(Some(&map)), vec![PropertyKey::from("z"), PropertyKey::from("a")]);
        assert_eq!(
            element_keys(Some(&json!([true, false]))),
            vec![PropertyKey::Index(0), PropertyKey::Index(1)]
        );
        assert!(element_keys(Some(&json!("abc"))).is_empty());
        assert!(element_keys(None).is_empty());
    }
}
