//! Array and arguments objects

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::{arg, install_constructor};
use crate::object::{self, WriteMode, to_array_length};
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsValue, Property, PropertyKey,
};

pub fn init_array(interp: &mut Interpreter) {
    let proto = interp.array_prototype.cheap_clone();
    interp.register_method(&proto, "push", array_push, 1);

    let constructor = install_constructor(interp, "Array", array_constructor, 1, &proto);
    interp.register_method(&constructor, "isArray", array_is_array, 1);
}

fn indexed_object(
    exotic: ExoticObject,
    prototype: JsObjectRef,
    elements: Vec<JsValue>,
    length: Property,
) -> JsObjectRef {
    let mut object = JsObject::with_exotic(exotic, Some(prototype));
    for (i, value) in elements.into_iter().enumerate() {
        object
            .properties
            .insert(PropertyKey::from(i as u32), Property::data(value));
    }
    object.properties.insert(PropertyKey::from("length"), length);
    JsObjectRef::new(object)
}

/// Array with the given elements; `length` is writable but neither
/// enumerable nor configurable
pub fn create_array(interp: &Interpreter, elements: Vec<JsValue>) -> JsObjectRef {
    let len = JsValue::Number(elements.len() as f64);
    indexed_object(
        ExoticObject::Array,
        interp.array_prototype.cheap_clone(),
        elements,
        Property::with_attributes(len, true, false, false),
    )
}

/// Unmapped arguments object; `length` is an ordinary hidden data property
pub fn create_arguments(interp: &Interpreter, args: Vec<JsValue>) -> JsObjectRef {
    let len = JsValue::Number(args.len() as f64);
    indexed_object(
        ExoticObject::Arguments,
        interp.object_prototype.cheap_clone(),
        args,
        Property::hidden(len),
    )
}

pub fn array_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    // new Array(n) creates an empty array of length n
    if let [len @ JsValue::Number(_)] = args {
        let len = to_array_length(len)?;
        let arr = create_array(interp, Vec::new());
        object::set(
            &arr,
            PropertyKey::from("length"),
            JsValue::Number(len as f64),
            interp.write_mode(),
        )?;
        return Ok(JsValue::Object(arr));
    }
    Ok(JsValue::Object(create_array(interp, args.to_vec())))
}

pub fn array_is_array(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let is_array = match arg(args, 0) {
        JsValue::Object(obj) => object::is_array(&obj),
        _ => false,
    };
    Ok(JsValue::Boolean(is_array))
}

/// Array.prototype.push: appends at `length` through ordinary [[Set]]
pub fn array_push(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = interp.to_object(&this)?;
    let length_key = PropertyKey::from("length");
    let mut len = object::get(&obj, &length_key).to_number() as u32;

    // push always throws on failure, whatever the write mode
    for value in args {
        object::set(&obj, PropertyKey::from(len), value.clone(), WriteMode::Strict)?;
        len = len.saturating_add(1);
    }
    object::set(&obj, length_key, JsValue::Number(len as f64), WriteMode::Strict)?;
    Ok(JsValue::Number(len as f64))
}
