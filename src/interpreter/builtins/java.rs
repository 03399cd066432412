//! Host interop builtins: `Java`, `Packages`, package root aliases,
//! `importPackage` and `importClass`

use crate::bridge::{Decision, DenyReason, ForeignBridge, ForeignTypeHandle, validate_type_name};
use crate::error::JsError;
use crate::integrity;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, Property, PropertyKey,
};

pub fn init_java(interp: &mut Interpreter) {
    let java = interp.create_object();
    interp.register_method(&java, "type", java_type, 1);
    interp.register_method(&java, "isType", java_is_type, 1);
    interp.register_method(&java, "typeName", java_type_name, 1);

    let global = interp.global.cheap_clone();
    let packages = interp.create_package("");
    {
        let mut g = global.lock();
        g.properties
            .insert(PropertyKey::from("Java"), Property::hidden(JsValue::Object(java)));
        g.properties.insert(
            PropertyKey::from("Packages"),
            Property::hidden(JsValue::Object(packages)),
        );
    }
    for root in interp.config().package_roots.clone() {
        let package = interp.create_package(&root);
        global
            .lock()
            .properties
            .insert(PropertyKey::from(root), Property::hidden(JsValue::Object(package)));
    }

    interp.register_method(&global, "importPackage", import_package, 1);
    interp.register_method(&global, "importClass", import_class, 1);
}

/// Read `member` from the package object for `path`.
///
/// A resolvable type yields its type object; an unknown name yields a deeper
/// package object, since packages cannot be told apart from missing types.
/// Policy denials propagate. Under plain default-deny a name the registry
/// does not know stays usable as a package prefix, while a registered type
/// is still reported as denied.
pub fn package_member(
    interp: &mut Interpreter,
    path: &JsString,
    key: &PropertyKey,
) -> Result<JsValue, JsError> {
    let PropertyKey::String(member) = key else {
        return Ok(JsValue::Undefined);
    };
    if validate_type_name(member.as_str()).is_err() || member.as_str().contains('.') {
        return Ok(JsValue::Undefined);
    }
    let qualified = if path.is_empty() {
        member.to_string()
    } else {
        format!("{}.{}", path, member)
    };

    if interp.policy().check(&qualified) == Decision::Denied(DenyReason::Default) {
        if interp.bridge().is_registered(&qualified) {
            log::warn!("access to host type {} denied by default", qualified);
            return Err(JsError::access_denied(qualified));
        }
        log::trace!("{} denied by default, treating as package", qualified);
        return Ok(JsValue::Object(interp.create_package(&qualified)));
    }

    match interp.resolve_type(&qualified) {
        Ok(type_object) => Ok(JsValue::Object(type_object)),
        Err(err) if err.is_not_found() => {
            Ok(JsValue::Object(interp.create_package(&qualified)))
        }
        Err(err) => Err(err),
    }
}

/// Build the frozen script object standing for a resolved host type
pub fn create_type_object(interp: &Interpreter, handle: &ForeignTypeHandle) -> JsObjectRef {
    let obj = JsObjectRef::new(JsObject::with_exotic(
        ExoticObject::HostType(handle.clone()),
        Some(interp.function_prototype.cheap_clone()),
    ));
    for method in &handle.class().statics {
        interp.register_method(&obj, method.name.as_str(), method.func, method.arity);
    }
    integrity::freeze(&obj);
    obj
}

/// `new T(...)` for a host type
pub fn construct_host(
    interp: &mut Interpreter,
    handle: &ForeignTypeHandle,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let Some(constructor) = handle.class().constructor else {
        return Err(JsError::type_error(format!(
            "{} has no public constructor",
            handle.name()
        )));
    };
    let instance = JsObjectRef::new(JsObject::with_exotic(
        ExoticObject::HostInstance(handle.clone()),
        Some(interp.object_prototype.cheap_clone()),
    ));
    constructor(interp, JsValue::Object(instance.cheap_clone()), args)?;
    Ok(JsValue::Object(instance))
}

fn host_type_of(value: &JsValue) -> Option<ForeignTypeHandle> {
    value
        .as_object()
        .and_then(|obj| obj.lock().host_type().cloned())
}

/// Java.type(name)
pub fn java_type(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let name = arg(args, 0);
    let Some(name) = name.as_str() else {
        return Err(JsError::type_error(format!(
            "Java.type expects a type name string, got {}",
            name.to_js_string()
        )));
    };
    Ok(JsValue::Object(interp.resolve_type(name)?))
}

/// Java.isType(value)
pub fn java_is_type(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(ForeignBridge::is_type(&arg(args, 0))))
}

/// Java.typeName(type)
pub fn java_type_name(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(match host_type_of(&arg(args, 0)) {
        Some(handle) => JsValue::String(handle.name().cheap_clone()),
        None => JsValue::Undefined,
    })
}

/// importPackage(pkg, ...): accepts package objects or dotted strings
pub fn import_package(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    for value in args {
        let path = match value {
            JsValue::String(s) => Some(s.cheap_clone()),
            JsValue::Object(obj) => match &obj.lock().exotic {
                ExoticObject::HostPackage(path) => Some(path.cheap_clone()),
                _ => None,
            },
            _ => None,
        };
        let Some(path) = path else {
            return Err(JsError::type_error(format!(
                "importPackage expects a package, got {}",
                value.to_js_string()
            )));
        };
        interp.import_package(path.as_str())?;
    }
    Ok(JsValue::Undefined)
}

/// importClass(type, ...)
pub fn import_class(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    for value in args {
        interp.import_class(value)?;
    }
    Ok(JsValue::Undefined)
}
