//! Error constructors and conversion of engine errors to script values

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::{arg, install_constructor};
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsValue, NativeFn, Property, PropertyKey,
};

/// Script-visible error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    TypeError,
    RangeError,
    ReferenceError,
    /// Host type access denied by the security policy
    SecurityError,
    /// Host type not present in the registry
    ClassNotFoundError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SecurityError,
        ErrorKind::ClassNotFoundError,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SecurityError => "SecurityError",
            ErrorKind::ClassNotFoundError => "ClassNotFoundError",
        }
    }

    fn constructor(self) -> NativeFn {
        match self {
            ErrorKind::Error => error_constructor,
            ErrorKind::TypeError => type_error_constructor,
            ErrorKind::RangeError => range_error_constructor,
            ErrorKind::ReferenceError => reference_error_constructor,
            ErrorKind::SecurityError => security_error_constructor,
            ErrorKind::ClassNotFoundError => class_not_found_error_constructor,
        }
    }
}

/// Error.prototype and one derived prototype per error kind
#[derive(Debug, Clone)]
pub struct ErrorPrototypes {
    error: JsObjectRef,
    type_error: JsObjectRef,
    range_error: JsObjectRef,
    reference_error: JsObjectRef,
    security_error: JsObjectRef,
    class_not_found_error: JsObjectRef,
}

impl ErrorPrototypes {
    pub fn new(object_prototype: &JsObjectRef) -> Self {
        let error = JsObjectRef::new(JsObject::with_prototype(object_prototype.cheap_clone()));
        let derived = || JsObjectRef::new(JsObject::with_prototype(error.cheap_clone()));
        Self {
            type_error: derived(),
            range_error: derived(),
            reference_error: derived(),
            security_error: derived(),
            class_not_found_error: derived(),
            error,
        }
    }

    pub fn get(&self, kind: ErrorKind) -> &JsObjectRef {
        match kind {
            ErrorKind::Error => &self.error,
            ErrorKind::TypeError => &self.type_error,
            ErrorKind::RangeError => &self.range_error,
            ErrorKind::ReferenceError => &self.reference_error,
            ErrorKind::SecurityError => &self.security_error,
            ErrorKind::ClassNotFoundError => &self.class_not_found_error,
        }
    }
}

/// Initialize Error and all derived error constructors and add them to globals
pub fn init_error(interp: &mut Interpreter) {
    let name_key = PropertyKey::from("name");
    let message_key = PropertyKey::from("message");

    for kind in ErrorKind::ALL {
        let proto = interp.errors.get(kind).cheap_clone();
        {
            let mut p = proto.lock();
            p.properties
                .insert(name_key.clone(), Property::hidden(JsValue::from(kind.name())));
            p.properties
                .insert(message_key.clone(), Property::hidden(JsValue::from("")));
        }
        install_constructor(interp, kind.name(), kind.constructor(), 1, &proto);
    }

    let error_proto = interp.errors.get(ErrorKind::Error).cheap_clone();
    interp.register_method(&error_proto, "toString", error_to_string, 0);
}

/// Create an error instance; `message` is omitted when empty.
///
/// `name` is also stored as a hidden own property so the error displays
/// without consulting its prototype.
pub fn create_error(interp: &Interpreter, kind: ErrorKind, message: &str) -> JsObjectRef {
    let mut object = JsObject::with_exotic(
        ExoticObject::Error,
        Some(interp.errors.get(kind).cheap_clone()),
    );
    object.properties.insert(
        PropertyKey::from("name"),
        Property::hidden(JsValue::from(kind.name())),
    );
    if !message.is_empty() {
        object.properties.insert(
            PropertyKey::from("message"),
            Property::hidden(JsValue::from(message)),
        );
    }
    JsObjectRef::new(object)
}

/// Convert an engine error to the value a script `catch` clause receives
pub fn error_to_value(interp: &Interpreter, err: &JsError) -> JsValue {
    let kind = match err {
        JsError::ThrownValue { value } => return value.clone(),
        JsError::TypeError { .. }
        | JsError::NotExtensible { .. }
        | JsError::NotConfigurable { .. }
        | JsError::FrozenWrite { .. } => ErrorKind::TypeError,
        JsError::RangeError { .. } => ErrorKind::RangeError,
        JsError::ReferenceError { .. } => ErrorKind::ReferenceError,
        JsError::AccessDenied { .. } => ErrorKind::SecurityError,
        JsError::NotFound { .. } => ErrorKind::ClassNotFoundError,
        JsError::Config(_) | JsError::Internal(_) => ErrorKind::Error,
    };

    let error = create_error(interp, kind, &err.message());
    if let Some(type_name) = err.type_name() {
        error.lock().properties.insert(
            PropertyKey::from("typeName"),
            Property::hidden(JsValue::from(type_name)),
        );
    }
    JsValue::Object(error)
}

fn construct_error(interp: &Interpreter, kind: ErrorKind, args: &[JsValue]) -> JsValue {
    let message = match arg(args, 0) {
        JsValue::Undefined => String::new(),
        value => value.to_js_string().to_string(),
    };
    JsValue::Object(create_error(interp, kind, &message))
}

pub fn error_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(construct_error(interp, ErrorKind::Error, args))
}

pub fn type_error_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(construct_error(interp, ErrorKind::TypeError, args))
}

pub fn range_error_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(construct_error(interp, ErrorKind::RangeError, args))
}

pub fn reference_error_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(construct_error(interp, ErrorKind::ReferenceError, args))
}

pub fn security_error_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(construct_error(interp, ErrorKind::SecurityError, args))
}

pub fn class_not_found_error_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(construct_error(interp, ErrorKind::ClassNotFoundError, args))
}

/// Error.prototype.toString: `name: message`, or just `name`
pub fn error_to_string(
    _interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let Some(obj) = this.as_object() else {
        return Err(JsError::type_error("Error.prototype.toString called on non-object"));
    };
    let name = match crate::object::get(obj, &PropertyKey::from("name")) {
        JsValue::Undefined => "Error".to_string(),
        value => value.to_js_string().to_string(),
    };
    let message = match crate::object::get(obj, &PropertyKey::from("message")) {
        JsValue::Undefined => String::new(),
        value => value.to_js_string().to_string(),
    };
    Ok(JsValue::from(if message.is_empty() {
        name
    } else {
        format!("{}: {}", name, message)
    }))
}
