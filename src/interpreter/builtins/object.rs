//! Object built-in methods

use crate::error::JsError;
use crate::integrity;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::{arg, install_constructor};
use crate::object;
use crate::value::{
    CheapClone, ExoticObject, JsObjectRef, JsValue, PropertyDescriptor, PropertyKey,
};

/// Install the Object constructor, its statics and Object.prototype methods
pub fn init_object(interp: &mut Interpreter) {
    let proto = interp.object_prototype.cheap_clone();
    interp.register_method(&proto, "hasOwnProperty", object_has_own_property, 1);
    interp.register_method(&proto, "toString", object_to_string, 0);
    interp.register_method(&proto, "valueOf", object_value_of, 0);

    let constructor = install_constructor(interp, "Object", object_constructor, 1, &proto);

    // Property enumeration
    interp.register_method(&constructor, "keys", object_keys, 1);
    interp.register_method(
        &constructor,
        "getOwnPropertyNames",
        object_get_own_property_names,
        1,
    );

    // Property descriptors
    interp.register_method(
        &constructor,
        "getOwnPropertyDescriptor",
        object_get_own_property_descriptor,
        2,
    );
    interp.register_method(&constructor, "defineProperty", object_define_property, 3);

    // Prototype chain
    interp.register_method(&constructor, "create", object_create, 2);
    interp.register_method(&constructor, "getPrototypeOf", object_get_prototype_of, 1);
    interp.register_method(&constructor, "setPrototypeOf", object_set_prototype_of, 2);

    // Freezing/sealing/extensibility
    interp.register_method(&constructor, "freeze", object_freeze, 1);
    interp.register_method(&constructor, "isFrozen", object_is_frozen, 1);
    interp.register_method(&constructor, "seal", object_seal, 1);
    interp.register_method(&constructor, "isSealed", object_is_sealed, 1);
    interp.register_method(
        &constructor,
        "preventExtensions",
        object_prevent_extensions,
        1,
    );
    interp.register_method(&constructor, "isExtensible", object_is_extensible, 1);
}

pub fn object_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = arg(args, 0);
    if value.is_null_or_undefined() {
        return Ok(JsValue::Object(interp.create_object()));
    }
    Ok(JsValue::Object(interp.to_object(&value)?))
}

fn keys_to_array(interp: &Interpreter, keys: Vec<PropertyKey>) -> JsValue {
    let elements = keys
        .iter()
        .map(|key| JsValue::String(key.to_js_string()))
        .collect();
    JsValue::Object(interp.create_array(elements))
}

pub fn object_keys(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    // Primitives get boxed, null/undefined throw
    let obj = interp.to_object(&arg(args, 0))?;
    Ok(keys_to_array(interp, object::own_enumerable_keys(&obj)))
}

pub fn object_get_own_property_names(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = interp.to_object(&arg(args, 0))?;
    Ok(keys_to_array(interp, object::own_keys(&obj)))
}

pub fn object_get_own_property_descriptor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = interp.to_object(&arg(args, 0))?;
    let key = PropertyKey::from_value(&arg(args, 1));
    let Some(prop) = object::get_own_property(&obj, &key) else {
        return Ok(JsValue::Undefined);
    };
    let desc = interp.create_object_from(vec![
        ("value", prop.value),
        ("writable", JsValue::Boolean(prop.writable)),
        ("enumerable", JsValue::Boolean(prop.enumerable)),
        ("configurable", JsValue::Boolean(prop.configurable)),
    ]);
    Ok(JsValue::Object(desc))
}

/// Read a script descriptor object; absent fields stay `None`
pub fn to_property_descriptor(value: &JsValue) -> Result<PropertyDescriptor, JsError> {
    let Some(obj) = value.as_object() else {
        return Err(JsError::type_error(format!(
            "Property description must be an object: {}",
            value.to_js_string()
        )));
    };

    let field = |name: &str| {
        let key = PropertyKey::from(name);
        object::has_property(obj, &key).then(|| object::get(obj, &key))
    };
    Ok(PropertyDescriptor {
        value: field("value"),
        writable: field("writable").map(|v| v.to_boolean()),
        enumerable: field("enumerable").map(|v| v.to_boolean()),
        configurable: field("configurable").map(|v| v.to_boolean()),
    })
}

pub fn object_define_property(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let target = arg(args, 0);
    let Some(obj) = target.as_object() else {
        return Err(JsError::type_error("Object.defineProperty called on non-object"));
    };
    let key = PropertyKey::from_value(&arg(args, 1));
    let desc = to_property_descriptor(&arg(args, 2))?;
    interp.define_property(obj, key, &desc)?;
    Ok(target)
}

fn prototype_argument(value: &JsValue) -> Result<Option<JsObjectRef>, JsError> {
    match value {
        JsValue::Object(obj) => Ok(Some(obj.cheap_clone())),
        JsValue::Null => Ok(None),
        other => Err(JsError::type_error(format!(
            "Object prototype may only be an Object or null: {}",
            other.to_js_string()
        ))),
    }
}

pub fn object_create(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let proto = prototype_argument(&arg(args, 0))?;
    let obj = interp.create_object_with_prototype(proto);

    let props = arg(args, 1);
    if !props.is_null_or_undefined() {
        let props = interp.to_object(&props)?;
        for key in object::own_enumerable_keys(&props) {
            let desc = to_property_descriptor(&object::get(&props, &key))?;
            object::define_own_property(&obj, key, &desc)?;
        }
    }
    Ok(JsValue::Object(obj))
}

pub fn object_get_prototype_of(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = interp.to_object(&arg(args, 0))?;
    Ok(obj.prototype().map(JsValue::Object).unwrap_or(JsValue::Null))
}

pub fn object_set_prototype_of(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let target = arg(args, 0);
    if target.is_null_or_undefined() {
        return Err(JsError::type_error("Object.setPrototypeOf called on null or undefined"));
    }
    let proto = prototype_argument(&arg(args, 1))?;
    if let Some(obj) = target.as_object() {
        object::set_prototype(obj, proto)?;
    }
    Ok(target)
}

pub fn object_freeze(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = arg(args, 0);
    if let JsValue::Object(obj_ref) = &obj {
        integrity::freeze(obj_ref);
    }
    Ok(obj)
}

pub fn object_is_frozen(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let is_frozen = match arg(args, 0) {
        JsValue::Object(obj_ref) => integrity::is_frozen(&obj_ref),
        _ => true, // Non-objects are considered frozen
    };
    Ok(JsValue::Boolean(is_frozen))
}

pub fn object_seal(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = arg(args, 0);
    if let JsValue::Object(obj_ref) = &obj {
        integrity::seal(obj_ref);
    }
    Ok(obj)
}

pub fn object_is_sealed(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let is_sealed = match arg(args, 0) {
        JsValue::Object(obj_ref) => integrity::is_sealed(&obj_ref),
        _ => true, // Non-objects are considered sealed
    };
    Ok(JsValue::Boolean(is_sealed))
}

pub fn object_prevent_extensions(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = arg(args, 0);
    if let JsValue::Object(obj_ref) = &obj {
        integrity::prevent_extensions(obj_ref);
    }
    Ok(obj)
}

pub fn object_is_extensible(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let is_extensible = match arg(args, 0) {
        JsValue::Object(obj_ref) => integrity::is_extensible(&obj_ref),
        _ => false,
    };
    Ok(JsValue::Boolean(is_extensible))
}

// Object.prototype methods

pub fn object_has_own_property(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let obj = interp.to_object(&this)?;
    let key = PropertyKey::from_value(&arg(args, 0));
    Ok(JsValue::Boolean(object::has_own_property(&obj, &key)))
}

pub fn object_to_string(
    _interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let tag = match &this {
        JsValue::Undefined => "Undefined",
        JsValue::Null => "Null",
        JsValue::Boolean(_) => "Boolean",
        JsValue::Number(_) => "Number",
        JsValue::String(_) => "String",
        JsValue::Object(obj) => match &obj.lock().exotic {
            ExoticObject::Array => "Array",
            ExoticObject::Arguments => "Arguments",
            ExoticObject::Function(_) | ExoticObject::HostType(_) => "Function",
            ExoticObject::Error => "Error",
            ExoticObject::Boolean(_) => "Boolean",
            ExoticObject::Number(_) => "Number",
            ExoticObject::String(_) => "String",
            ExoticObject::Ordinary
            | ExoticObject::HostInstance(_)
            | ExoticObject::HostPackage(_) => "Object",
        },
    };
    Ok(JsValue::from(format!("[object {}]", tag)))
}

pub fn object_value_of(
    interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Object(interp.to_object(&this)?))
}
