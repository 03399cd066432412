//! Tests for for-in enumeration
//!
//! Keys are always strings, whatever the enumerated object is.

use super::{call_builtin, create_test_runtime};
use scriptcore::{JsValue, PropertyDescriptor};

fn keys(interp: &scriptcore::Interpreter, value: &JsValue) -> Vec<JsValue> {
    interp.for_in(value).map(JsValue::String).collect()
}

fn assert_all_strings(keys: &[JsValue]) {
    for key in keys {
        assert_eq!(key.type_of(), "string", "key {:?} is not a string", key);
    }
}

#[test]
fn test_arguments_keys_are_strings() {
    let interp = create_test_runtime();
    let args = JsValue::Object(interp.create_arguments(vec![JsValue::from(1)]));
    let found = keys(&interp, &args);
    assert_eq!(found, vec![JsValue::from("0")]);
    assert_all_strings(&found);
}

#[test]
fn test_array_keys_are_strings() {
    let interp = create_test_runtime();
    let arr = JsValue::Object(interp.create_array(vec![JsValue::from(1)]));
    let found = keys(&interp, &arr);
    assert_eq!(found, vec![JsValue::from("0")]);
    assert_all_strings(&found);
}

#[test]
fn test_string_keys_are_strings() {
    let interp = create_test_runtime();
    let found = keys(&interp, &JsValue::from("h"));
    assert_eq!(found, vec![JsValue::from("0")]);
    assert_all_strings(&found);

    assert_eq!(
        keys(&interp, &JsValue::from("abc")),
        vec![JsValue::from("0"), JsValue::from("1"), JsValue::from("2")]
    );
}

#[test]
fn test_array_length_is_not_enumerated() {
    let mut interp = create_test_runtime();
    let arr = JsValue::Object(interp.create_array(vec![JsValue::from("a"), JsValue::from("b")]));
    interp.set(&arr, "extra", JsValue::from(true)).unwrap();
    assert_eq!(
        keys(&interp, &arr),
        vec![JsValue::from("0"), JsValue::from("1"), JsValue::from("extra")]
    );
}

#[test]
fn test_primitives_without_keys() {
    let interp = create_test_runtime();
    for value in [
        JsValue::Null,
        JsValue::Undefined,
        JsValue::from(42),
        JsValue::from(false),
        JsValue::from(""),
    ] {
        assert!(keys(&interp, &value).is_empty(), "{:?} has keys", value);
    }
}

#[test]
fn test_inherited_keys_follow_own_keys() {
    let mut interp = create_test_runtime();
    let proto = interp.create_object_from(vec![("inherited", JsValue::from(1))]);
    let created = call_builtin(
        &mut interp,
        "Object",
        "create",
        &[JsValue::Object(proto.clone())],
    )
    .unwrap();
    interp.set(&created, "own", JsValue::from(2)).unwrap();
    interp.set(&created, "7", JsValue::from(3)).unwrap();

    assert_eq!(
        keys(&interp, &created),
        vec![
            JsValue::from("7"),
            JsValue::from("own"),
            JsValue::from("inherited")
        ]
    );

    // Builtin methods on Object.prototype are not enumerable
    let plain = JsValue::Object(interp.create_object());
    assert!(keys(&interp, &plain).is_empty());
}

#[test]
fn test_shadowing_and_non_enumerable_keys() {
    let mut interp = create_test_runtime();
    let proto = interp.create_object_from(vec![("a", JsValue::from(1)), ("b", JsValue::from(2))]);
    let obj = interp.create_object_with_prototype(Some(proto));
    interp
        .define_property(&obj, "a", &PropertyDescriptor::new().value(9).enumerable(false))
        .unwrap();
    interp
        .set(&JsValue::Object(obj.clone()), "b", JsValue::from(3))
        .unwrap();

    assert_eq!(keys(&interp, &JsValue::Object(obj)), vec![JsValue::from("b")]);
}

#[test]
fn test_delete_during_enumeration() {
    let mut interp = create_test_runtime();
    let obj = JsValue::Object(interp.create_object_from(vec![
        ("x", JsValue::from(1)),
        ("y", JsValue::from(2)),
        ("z", JsValue::from(3)),
    ]));

    let mut seen = Vec::new();
    let mut iter = interp.for_in(&obj);
    while let Some(key) = iter.next() {
        if key == "x" {
            interp.delete(&obj, "y").unwrap();
        }
        seen.push(key.to_string());
    }
    assert_eq!(seen, vec!["x", "z"]);

    iter.restart();
    assert_eq!(iter.count(), 2);
}

#[test]
fn test_enumeration_of_sealed_and_frozen_objects() {
    let mut interp = create_test_runtime();
    let obj = JsValue::Object(interp.create_object_from(vec![("num", JsValue::from(1))]));
    call_builtin(&mut interp, "Object", "freeze", &[obj.clone()]).unwrap();
    assert_eq!(keys(&interp, &obj), vec![JsValue::from("num")]);
}

#[test]
fn test_object_keys_matches_for_in_own_keys() {
    let mut interp = create_test_runtime();
    let obj = JsValue::Object(interp.create_object_from(vec![
        ("b", JsValue::from(1)),
        ("2", JsValue::from(2)),
        ("a", JsValue::from(3)),
        ("1", JsValue::from(4)),
    ]));
    let listed = call_builtin(&mut interp, "Object", "keys", &[obj.clone()]).unwrap();
    let length = interp.get(&listed, "length").unwrap().to_number() as u32;
    let from_keys: Vec<JsValue> = (0..length)
        .map(|i| interp.get(&listed, i).unwrap())
        .collect();
    assert_eq!(from_keys, keys(&interp, &obj));
    assert_eq!(
        from_keys,
        vec![
            JsValue::from("1"),
            JsValue::from("2"),
            JsValue::from("b"),
            JsValue::from("a")
        ]
    );
}
