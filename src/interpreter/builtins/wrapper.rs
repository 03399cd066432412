//! String, Number and Boolean wrapper objects

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::{arg, install_constructor};
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, Property, PropertyKey,
};

pub fn init_wrappers(interp: &mut Interpreter) {
    let string_proto = interp.string_prototype.cheap_clone();
    interp.register_method(&string_proto, "toString", string_value_of, 0);
    interp.register_method(&string_proto, "valueOf", string_value_of, 0);
    install_constructor(interp, "String", string_constructor, 1, &string_proto);

    let number_proto = interp.number_prototype.cheap_clone();
    interp.register_method(&number_proto, "valueOf", number_value_of, 0);
    install_constructor(interp, "Number", number_constructor, 1, &number_proto);

    let boolean_proto = interp.boolean_prototype.cheap_clone();
    interp.register_method(&boolean_proto, "valueOf", boolean_value_of, 0);
    install_constructor(interp, "Boolean", boolean_constructor, 1, &boolean_proto);
}

/// Box a primitive in its wrapper object.
///
/// String wrappers get one read-only, enumerable, non-configurable property
/// per UTF-16 code unit and a read-only `length`.
pub fn box_primitive(interp: &Interpreter, value: &JsValue) -> JsObjectRef {
    match value {
        JsValue::Object(obj) => obj.cheap_clone(),
        JsValue::String(s) => box_string(interp, s),
        JsValue::Number(n) => JsObjectRef::new(JsObject::with_exotic(
            ExoticObject::Number(*n),
            Some(interp.number_prototype.cheap_clone()),
        )),
        JsValue::Boolean(b) => JsObjectRef::new(JsObject::with_exotic(
            ExoticObject::Boolean(*b),
            Some(interp.boolean_prototype.cheap_clone()),
        )),
        JsValue::Undefined | JsValue::Null => interp.create_object(),
    }
}

fn box_string(interp: &Interpreter, s: &JsString) -> JsObjectRef {
    let mut object = JsObject::with_exotic(
        ExoticObject::String(s.cheap_clone()),
        Some(interp.string_prototype.cheap_clone()),
    );
    let units: Vec<u16> = s.as_str().encode_utf16().collect();
    for (i, unit) in units.iter().enumerate() {
        let ch = String::from_utf16_lossy(std::slice::from_ref(unit));
        object.properties.insert(
            PropertyKey::from(i as u32),
            Property::with_attributes(JsValue::from(ch), false, true, false),
        );
    }
    object.properties.insert(
        PropertyKey::from("length"),
        Property::with_attributes(JsValue::Number(units.len() as f64), false, false, false),
    );
    JsObjectRef::new(object)
}

/// `this` is the fresh object `new C()` allocated for `proto`
fn is_construct_call(this: &JsValue, proto: &JsObjectRef) -> bool {
    this.as_object().is_some_and(|obj| {
        let object = obj.lock();
        matches!(object.exotic, ExoticObject::Ordinary)
            && object
                .prototype
                .as_ref()
                .is_some_and(|p| JsObjectRef::ptr_eq(p, proto))
    })
}

pub fn string_constructor(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = match args.first() {
        Some(v) => JsValue::String(v.to_js_string()),
        None => JsValue::from(""),
    };
    if is_construct_call(&this, &interp.string_prototype) {
        return Ok(JsValue::Object(box_primitive(interp, &value)));
    }
    Ok(value)
}

pub fn number_constructor(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = match args.first() {
        Some(v) => JsValue::Number(v.to_number()),
        None => JsValue::Number(0.0),
    };
    if is_construct_call(&this, &interp.number_prototype) {
        return Ok(JsValue::Object(box_primitive(interp, &value)));
    }
    Ok(value)
}

pub fn boolean_constructor(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = JsValue::Boolean(arg(args, 0).to_boolean());
    if is_construct_call(&this, &interp.boolean_prototype) {
        return Ok(JsValue::Object(box_primitive(interp, &value)));
    }
    Ok(value)
}

/// Primitive held by `this`, if it is that primitive or its wrapper
fn this_primitive(this: &JsValue) -> Option<JsValue> {
    match this {
        JsValue::Object(obj) => obj.lock().primitive_value(),
        JsValue::Undefined | JsValue::Null => None,
        primitive => Some(primitive.clone()),
    }
}

pub fn string_value_of(
    _interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    match this_primitive(&this) {
        Some(value @ JsValue::String(_)) => Ok(value),
        _ => Err(JsError::type_error("String.prototype.valueOf requires a string")),
    }
}

pub fn number_value_of(
    _interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    match this_primitive(&this) {
        Some(value @ JsValue::Number(_)) => Ok(value),
        _ => Err(JsError::type_error("Number.prototype.valueOf requires a number")),
    }
}

pub fn boolean_value_of(
    _interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    match this_primitive(&this) {
        Some(value @ JsValue::Boolean(_)) => Ok(value),
        _ => Err(JsError::type_error("Boolean.prototype.valueOf requires a boolean")),
    }
}
