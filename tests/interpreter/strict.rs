//! Tests for silent versus strict handling of rejected writes and deletes

use super::{call_builtin, create_strict_runtime, create_test_runtime, is_instance};
use scriptcore::{Interpreter, JsError, JsValue, PropertyDescriptor, WriteMode};

fn frozen_object(interp: &mut Interpreter) -> JsValue {
    let obj = JsValue::Object(interp.create_object_from(vec![("num", JsValue::from(1))]));
    call_builtin(interp, "Object", "freeze", &[obj.clone()]).unwrap();
    obj
}

#[test]
fn test_frozen_write() {
    let mut interp = create_test_runtime();
    let obj = frozen_object(&mut interp);
    assert!(!interp.set(&obj, "num", JsValue::from(2)).unwrap());

    let mut interp = create_strict_runtime();
    let obj = frozen_object(&mut interp);
    let err = interp.set(&obj, "num", JsValue::from(2)).unwrap_err();
    assert!(matches!(err, JsError::FrozenWrite { .. }));
    assert_eq!(interp.get(&obj, "num").unwrap(), JsValue::from(1));

    let e = interp.catch(Err::<(), _>(err)).unwrap_err();
    assert!(is_instance(&mut interp, &e, "TypeError"));
}

#[test]
fn test_sealed_delete() {
    let mut interp = create_strict_runtime();
    let obj = JsValue::Object(interp.create_object_from(vec![("num", JsValue::from(1))]));
    call_builtin(&mut interp, "Object", "seal", &[obj.clone()]).unwrap();

    let err = interp.delete(&obj, "num").unwrap_err();
    assert!(matches!(err, JsError::NotConfigurable { .. }));
    assert_eq!(interp.get(&obj, "num").unwrap(), JsValue::from(1));

    // Deleting an absent key succeeds in both modes
    assert!(interp.delete(&obj, "missing").unwrap());
}

#[test]
fn test_non_extensible_add() {
    let mut interp = create_strict_runtime();
    let obj = JsValue::Object(interp.create_object());
    call_builtin(&mut interp, "Object", "preventExtensions", &[obj.clone()]).unwrap();

    let err = interp.set(&obj, "fresh", JsValue::from(1)).unwrap_err();
    assert!(matches!(err, JsError::NotExtensible { .. }));
    let e = interp.catch(Err::<(), _>(err)).unwrap_err();
    assert!(is_instance(&mut interp, &e, "TypeError"));
}

#[test]
fn test_inherited_read_only_property() {
    let mut interp = create_test_runtime();
    let proto = frozen_object(&mut interp);
    let child = call_builtin(&mut interp, "Object", "create", &[proto]).unwrap();

    assert!(!interp.set(&child, "num", JsValue::from(5)).unwrap());
    assert_eq!(interp.get(&child, "num").unwrap(), JsValue::from(1));
    assert!(interp.set(&child, "other", JsValue::from(5)).unwrap());

    interp.set_strict(true);
    let err = interp.set(&child, "num", JsValue::from(5)).unwrap_err();
    assert!(matches!(err, JsError::FrozenWrite { .. }));
}

#[test]
fn test_switching_modes_at_runtime() {
    let mut interp = create_test_runtime();
    assert!(!interp.is_strict());
    assert_eq!(interp.write_mode(), WriteMode::Silent);
    let obj = frozen_object(&mut interp);

    assert!(!interp.set(&obj, "num", JsValue::from(2)).unwrap());
    interp.set_strict(true);
    assert!(interp.is_strict());
    assert!(interp.set(&obj, "num", JsValue::from(2)).is_err());
    interp.set_strict(false);
    assert!(!interp.delete(&obj, "num").unwrap());
}

#[test]
fn test_define_property_throws_in_both_modes() {
    for strict in [false, true] {
        let mut interp = create_test_runtime();
        interp.set_strict(strict);
        let obj = frozen_object(&mut interp);
        let desc = JsValue::Object(interp.create_object_from(vec![("value", JsValue::from(2))]));

        let result = call_builtin(
            &mut interp,
            "Object",
            "defineProperty",
            &[obj.clone(), JsValue::from("num"), desc],
        );
        let e = interp.catch(result).unwrap_err();
        assert!(is_instance(&mut interp, &e, "TypeError"), "strict: {}", strict);

        let target = obj.as_object().unwrap().clone();
        let err = interp
            .define_property(&target, "added", &PropertyDescriptor::new().value(1))
            .unwrap_err();
        assert!(matches!(err, JsError::NotExtensible { .. }));
    }
}

#[test]
fn test_assignment_to_primitives() {
    let mut interp = create_test_runtime();
    assert!(!interp.set(&JsValue::from("abc"), "x", JsValue::from(1)).unwrap());
    assert!(!interp.set(&JsValue::from(1), "x", JsValue::from(1)).unwrap());
    assert!(!interp.delete(&JsValue::from("abc"), 0u32).unwrap());
    assert!(!interp.delete(&JsValue::from("abc"), "length").unwrap());

    let mut interp = create_strict_runtime();
    assert!(interp.set(&JsValue::from("abc"), "x", JsValue::from(1)).is_err());
    assert!(interp.delete(&JsValue::from("abc"), 1u32).is_err());

    // null and undefined throw regardless of mode
    let mut interp = create_test_runtime();
    assert!(interp.set(&JsValue::Null, "x", JsValue::from(1)).is_err());
    assert!(interp.delete(&JsValue::Undefined, "x").is_err());
}

#[test]
fn test_invalid_array_length_throws_in_both_modes() {
    let mut interp = create_test_runtime();
    let arr = JsValue::Object(interp.create_array(vec![JsValue::from(1)]));
    for bad in [JsValue::from(-1), JsValue::from(1.5), JsValue::Number(f64::NAN)] {
        let err = interp.set(&arr, "length", bad).unwrap_err();
        assert!(matches!(err, JsError::RangeError { .. }));
    }
    assert_eq!(interp.get(&arr, "length").unwrap(), JsValue::from(1));
}
