//! Built-in objects and functions visible to scripts

pub mod array;
pub mod error;
pub mod java;
pub mod object;
pub mod wrapper;

use crate::interpreter::Interpreter;
use crate::value::JsValue;

/// Install every builtin into the interpreter's global object
pub fn init(interp: &mut Interpreter) {
    object::init_object(interp);
    array::init_array(interp);
    wrapper::init_wrappers(interp);
    error::init_error(interp);
    java::init_java(interp);
}

/// Argument at `index`, `undefined` when missing
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or(JsValue::Undefined)
}

/// Create a global constructor linked to its prototype object
pub(crate) fn install_constructor(
    interp: &mut Interpreter,
    name: &str,
    func: crate::value::NativeFn,
    arity: usize,
    prototype: &crate::value::JsObjectRef,
) -> crate::value::JsObjectRef {
    use crate::value::{Property, PropertyKey};

    let ctor = interp.create_function(name, func, arity);
    ctor.lock().properties.insert(
        PropertyKey::from("prototype"),
        Property::with_attributes(JsValue::Object(prototype.clone()), false, false, false),
    );
    prototype.lock().properties.insert(
        PropertyKey::from("constructor"),
        Property::hidden(JsValue::Object(ctor.clone())),
    );
    interp.global.lock().properties.insert(
        PropertyKey::from(name),
        Property::hidden(JsValue::Object(ctor.clone())),
    );
    ctor
}
