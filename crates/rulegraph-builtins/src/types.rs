//! # Built-in Types
//!
//! Basic value types and the generic collection factories every catalog
//! starts from.
//!
//! Basic types carry only structural constraints (`String`,
//! `IntegerNumber`, ...) plus the numeric range of the corresponding Java
//! primitive. The primitive spellings (`int`, `long`, ...) also carry
//! `NotBlank`, since a primitive can never be missing.
//!
//! Generic factories build one descriptor per instantiation:
//!
//! | Base names | Shape | Element type |
//! |---|---|---|
//! | `Array`, `List`, `ArrayList`, `Set` | collection, `List` constraint | first argument |
//! | `Map`, `HashMap`, `HashSet` | collection, `Map` constraint | second argument |
//! | `Container` | object with one `value` property | first argument |
//!
//! A wrong number of generic arguments adds an
//! `InvalidNumberGenenricArguments` constraint, whose validator always
//! fails globally, so the mistake surfaces as a violation instead of a
//! silent mismatch.

use rulegraph_core::{Catalog, ConstraintDescriptor, PropertyDescriptor, TypeDescriptor, TypeName};

/// Constraint added to generic instantiations with the wrong arity.
pub const INVALID_NUMBER_OF_GENERIC_ARGUMENTS: &str = "InvalidNumberGenenricArguments";

/// Base names of list-like factories.
pub const LIST_TYPES: &[&str] = &["Array", "List", "ArrayList", "Set"];

/// Base names of map-like factories.
pub const MAP_TYPES: &[&str] = &["Map", "HashMap", "HashSet"];

/// Integer types: primitive name, boxed name, minimum, maximum.
const INTEGER_TYPES: &[(&str, &str, i64, i64)] = &[
    ("byte", "Byte", i8::MIN as i64, i8::MAX as i64),
    ("short", "Short", i16::MIN as i64, i16::MAX as i64),
    ("int", "Integer", i32::MIN as i64, i32::MAX as i64),
    ("long", "Long", i64::MIN, i64::MAX),
];

fn constraint(name: &str) -> ConstraintDescriptor {
    ConstraintDescriptor::new(name)
}

fn ranged_integer(name: &str, min: i64, max: i64, primitive: bool) -> TypeDescriptor {
    let mut ty = TypeDescriptor::basic(name)
        .with_constraint(constraint("IntegerNumber"))
        .with_constraint(constraint("Min").with_attribute("value", min))
        .with_constraint(constraint("Max").with_attribute("value", max));
    if primitive {
        ty = ty.with_constraint(constraint("NotBlank"));
    }
    ty
}

fn single(name: &str, constraint_name: Option<&str>) -> TypeDescriptor {
    let ty = TypeDescriptor::basic(name);
    match constraint_name {
        Some(constraint_name) => ty.with_constraint(constraint(constraint_name)),
        None => ty,
    }
}

/// Every built-in basic type descriptor.
pub fn basic_types() -> Vec<TypeDescriptor> {
    let mut types = vec![
        single("Object", None),
        single("Void", Some("Null")),
        single("String", Some("String")),
        single("boolean", Some("Boolean")),
        single("Boolean", Some("Boolean")),
    ];
    for &(primitive, boxed, min, max) in INTEGER_TYPES {
        types.push(ranged_integer(primitive, min, max, true));
        types.push(ranged_integer(boxed, min, max, false));
    }
    for (primitive, boxed) in [("float", "Float"), ("double", "Double")] {
        types.push(single(primitive, Some("FloatNumber")).with_constraint(constraint("NotBlank")));
        types.push(single(boxed, Some("FloatNumber")));
    }
    types.extend([
        single("BigDecimal", Some("FloatNumber")),
        single("BigInteger", Some("IntegerNumber")),
        single("Date", Some("Date")),
        single("SqlDate", Some("Date")),
        single("SqlTime", Some("Time")),
        single("SqlTimestamp", Some("Timestamp")),
    ]);
    types
}

fn arity_mismatch(base: &str, expected: usize, found: usize) -> ConstraintDescriptor {
    constraint(INVALID_NUMBER_OF_GENERIC_ARGUMENTS)
        .with_attribute("typeName", base)
        .with_attribute("expected", expected)
        .with_attribute("found", found)
}

/// `List<T>`-like instantiation. Extra arguments are dropped; a missing
/// argument leaves the collection without an element descriptor.
pub fn list_type(name: &TypeName) -> TypeDescriptor {
    let base = name.base_name();
    let arguments = name.arguments();
    let mut ty = match arguments.first() {
        Some(element) => TypeDescriptor::collection(
            TypeName::generic(base, vec![element.clone()]),
            Some(PropertyDescriptor::new(element.clone())),
        ),
        None => TypeDescriptor::collection(TypeName::simple(base), None),
    }
    .with_constraint(constraint("List"));
    if arguments.len() != 1 {
        ty = ty.with_constraint(arity_mismatch(base, 1, arguments.len()));
    }
    ty
}

/// `Map<K, V>`-like instantiation; elements are validated against `V`.
pub fn map_type(name: &TypeName) -> TypeDescriptor {
    let base = name.base_name();
    let arguments = name.arguments();
    let mut ty = match arguments {
        [key, value, ..] => TypeDescriptor::collection(
            TypeName::generic(base, vec![key.clone(), value.clone()]),
            Some(PropertyDescriptor::new(value.clone())),
        ),
        [] => TypeDescriptor::collection(TypeName::simple(base), None),
        short => TypeDescriptor::collection(TypeName::generic(base, short.to_vec()), None),
    }
    .with_constraint(constraint("Map"));
    if arguments.len() != 2 {
        ty = ty.with_constraint(arity_mismatch(base, 2, arguments.len()));
    }
    ty
}

/// `Container<T>`: an object whose `value` property has type `T`.
pub fn container_type(name: &TypeName) -> TypeDescriptor {
    let base = name.base_name();
    let arguments = name.arguments();
    match arguments {
        [element] => TypeDescriptor::new(TypeName::generic(base, vec![element.clone()]))
            .with_property("value", PropertyDescriptor::new(element.clone())),
        _ => {
            let type_name = match arguments.first() {
                Some(element) => TypeName::generic(base, vec![element.clone()]),
                None => TypeName::simple(base),
            };
            TypeDescriptor::new(type_name)
                .with_property("value", PropertyDescriptor::new("Object"))
                .with_constraint(arity_mismatch(base, 1, arguments.len()))
        }
    }
}

/// Register basic types and generic factories.
pub fn install_types(catalog: &mut Catalog) {
    catalog.register_types(basic_types());
    for &base in LIST_TYPES {
        catalog.insert_factory(base, list_type);
    }
    for &base in MAP_TYPES {
        catalog.insert_factory(base, map_type);
    }
    catalog.insert_factory("Container", container_type);
}
