//! Embeddable script engine core: object model with seal/freeze
//! semantics, for-in enumeration and a policy-gated host type bridge
//!
//! # Example
//!
//! ```
//! use scriptcore::{Interpreter, JsValue};
//!
//! let mut interp = Interpreter::new();
//! let obj = interp.create_object_from(vec![("num", JsValue::Number(2.718))]);
//! let object_ctor = interp.get_global("Object").unwrap();
//! interp
//!     .call_method(&object_ctor, "freeze", &[JsValue::Object(obj.clone())])
//!     .unwrap();
//!
//! let target = JsValue::Object(obj);
//! assert_eq!(interp.set(&target, "num", JsValue::Number(1.0)).unwrap(), false);
//! assert_eq!(interp.get(&target, "num").unwrap(), JsValue::Number(2.718));
//!
//! let denied = interp.resolve_type("sun.misc.Unsafe").unwrap_err();
//! assert!(denied.is_access_denied());
//! ```

pub mod bridge;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod integrity;
pub mod interpreter;
pub mod object;
pub mod property;
pub mod value;

pub use bridge::{
    ForeignBridge, ForeignTypeHandle, HostClass, PolicyConfig, PolicyRule, SecurityPolicy,
    StaticTypeRegistry, TypeRegistry,
};
pub use config::RuntimeConfig;
pub use enumerate::ForInIterator;
pub use error::JsError;
pub use interpreter::builtins::error::ErrorKind;
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use object::WriteMode;
pub use value::{
    CheapClone, IntegrityLevel, JsObjectRef, JsString, JsValue, PropertyDescriptor, PropertyKey,
};
