//! Interpreter realm: global object, intrinsics, bridge and the script-visible
//! operations
//!
//! Each method here corresponds to one script construct (`o.k = v`,
//! `delete o.k`, `for (k in x)`, `new C()`, free identifier lookup, ...).
//! Typed failures surface as `JsError`; `catch` turns them into the value a
//! script `catch (e)` clause would see.

pub mod builtins;

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::bridge::{
    ForeignBridge, ForeignTypeHandle, SecurityPolicy, StaticTypeRegistry, TypeRegistry,
};
use crate::config::RuntimeConfig;
use crate::enumerate::ForInIterator;
use crate::error::JsError;
use crate::object::{self, WriteMode};
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsString, JsValue, NativeFn, NativeFunction,
    Property, PropertyDescriptor, PropertyKey,
};

use builtins::error::{ErrorKind, ErrorPrototypes};

/// Builder for [`Interpreter`]
#[derive(Default)]
pub struct InterpreterBuilder {
    config: RuntimeConfig,
    policy: Option<SecurityPolicy>,
    registry: Option<Arc<dyn TypeRegistry>>,
}

impl InterpreterBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Share an existing policy instead of building one from the config
    pub fn policy(mut self, policy: SecurityPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Interpreter {
        let policy = self
            .policy
            .unwrap_or_else(|| SecurityPolicy::from_config(self.config.policy.clone()));
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(StaticTypeRegistry::new()));
        Interpreter::with_bridge(self.config, Arc::new(ForeignBridge::new(policy, registry)))
    }
}

/// The interpreter state
pub struct Interpreter {
    /// Global object
    pub global: JsObjectRef,
    /// Object.prototype for all objects
    pub object_prototype: JsObjectRef,
    /// Function.prototype for native functions
    pub function_prototype: JsObjectRef,
    /// Array.prototype for all array instances
    pub array_prototype: JsObjectRef,
    /// String.prototype for string wrappers
    pub string_prototype: JsObjectRef,
    /// Number.prototype for number wrappers
    pub number_prototype: JsObjectRef,
    /// Boolean.prototype for boolean wrappers
    pub boolean_prototype: JsObjectRef,
    /// Error.prototype and the derived error prototypes
    pub errors: ErrorPrototypes,
    config: RuntimeConfig,
    bridge: Arc<ForeignBridge>,
    /// Package prefixes from `importPackage`, in import order
    imports: Vec<JsString>,
    /// One type object per resolved host type
    type_objects: FxHashMap<JsString, JsObjectRef>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::default()
    }

    fn with_bridge(config: RuntimeConfig, bridge: Arc<ForeignBridge>) -> Self {
        let object_prototype = JsObjectRef::new(JsObject::new());
        let derived = || JsObjectRef::new(JsObject::with_prototype(object_prototype.clone()));

        let mut interp = Self {
            global: derived(),
            function_prototype: derived(),
            array_prototype: derived(),
            string_prototype: derived(),
            number_prototype: derived(),
            boolean_prototype: derived(),
            errors: ErrorPrototypes::new(&object_prototype),
            object_prototype,
            config,
            bridge,
            imports: Vec::new(),
            type_objects: FxHashMap::default(),
        };
        builtins::init(&mut interp);
        interp
    }

    // ═══════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn is_strict(&self) -> bool {
        self.config.strict
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.config.strict = strict;
    }

    pub fn write_mode(&self) -> WriteMode {
        self.config.write_mode()
    }

    pub fn bridge(&self) -> &ForeignBridge {
        &self.bridge
    }

    pub fn policy(&self) -> &SecurityPolicy {
        self.bridge.policy()
    }

    // ═══════════════════════════════════════════════════════════════
    // Object creation
    // ═══════════════════════════════════════════════════════════════

    /// Create a plain object with Object.prototype
    pub fn create_object(&self) -> JsObjectRef {
        JsObjectRef::new(JsObject::with_prototype(self.object_prototype.cheap_clone()))
    }

    pub fn create_object_with_prototype(&self, prototype: Option<JsObjectRef>) -> JsObjectRef {
        JsObjectRef::new(JsObject::with_exotic(ExoticObject::Ordinary, prototype))
    }

    /// Object literal: properties are created in the given order
    pub fn create_object_from(&self, entries: Vec<(&str, JsValue)>) -> JsObjectRef {
        let obj = self.create_object();
        {
            let mut object = obj.lock();
            for (key, value) in entries {
                object
                    .properties
                    .insert(PropertyKey::from(key), Property::data(value));
            }
        }
        obj
    }

    /// Array literal
    pub fn create_array(&self, elements: Vec<JsValue>) -> JsObjectRef {
        builtins::array::create_array(self, elements)
    }

    /// Arguments object for a call with these arguments
    pub fn create_arguments(&self, args: Vec<JsValue>) -> JsObjectRef {
        builtins::array::create_arguments(self, args)
    }

    /// Native function object with Function.prototype
    pub fn create_function(&self, name: &str, func: NativeFn, arity: usize) -> JsObjectRef {
        let mut object = JsObject::with_exotic(
            ExoticObject::Function(NativeFunction {
                name: JsString::from(name),
                func,
                arity,
            }),
            Some(self.function_prototype.cheap_clone()),
        );
        object.properties.insert(
            PropertyKey::from("name"),
            Property::with_attributes(JsValue::from(name), false, false, true),
        );
        object.properties.insert(
            PropertyKey::from("length"),
            Property::with_attributes(JsValue::Number(arity as f64), false, false, true),
        );
        JsObjectRef::new(object)
    }

    /// Install a native method as a non-enumerable property
    pub fn register_method(&self, obj: &JsObjectRef, name: &str, func: NativeFn, arity: usize) {
        let f = self.create_function(name, func, arity);
        obj.lock()
            .properties
            .insert(PropertyKey::from(name), Property::hidden(JsValue::Object(f)));
    }

    /// Package object for a host namespace path (`""` for `Packages` itself)
    pub fn create_package(&self, path: &str) -> JsObjectRef {
        JsObjectRef::new(JsObject::with_exotic(
            ExoticObject::HostPackage(JsString::from(path)),
            Some(self.object_prototype.cheap_clone()),
        ))
    }

    /// ToObject: box primitives, reject null and undefined
    pub fn to_object(&self, value: &JsValue) -> Result<JsObjectRef, JsError> {
        match value {
            JsValue::Object(obj) => Ok(obj.cheap_clone()),
            JsValue::Undefined | JsValue::Null => Err(JsError::type_error(format!(
                "Cannot convert {} to object",
                value.to_js_string()
            ))),
            primitive => Ok(builtins::wrapper::box_primitive(self, primitive)),
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Property access
    // ═══════════════════════════════════════════════════════════════

    /// `target[key]`
    pub fn get(
        &mut self,
        target: &JsValue,
        key: impl Into<PropertyKey>,
    ) -> Result<JsValue, JsError> {
        let key = key.into();
        match target {
            JsValue::Undefined | JsValue::Null => Err(JsError::type_error(format!(
                "Cannot read property \"{}\" from {}",
                key,
                target.to_js_string()
            ))),
            JsValue::Object(obj) => {
                let package = match &obj.lock().exotic {
                    ExoticObject::HostPackage(path) => Some(path.cheap_clone()),
                    _ => None,
                };
                match package {
                    Some(path) => builtins::java::package_member(self, &path, &key),
                    None => Ok(object::get(obj, &key)),
                }
            }
            primitive => {
                let obj = self.to_object(primitive)?;
                Ok(object::get(&obj, &key))
            }
        }
    }

    /// `target[key] = value`; `Ok(false)` when silently rejected
    pub fn set(
        &mut self,
        target: &JsValue,
        key: impl Into<PropertyKey>,
        value: JsValue,
    ) -> Result<bool, JsError> {
        let key = key.into();
        match target {
            JsValue::Object(obj) => {
                // Package members always resolve through the bridge
                let is_package = matches!(obj.lock().exotic, ExoticObject::HostPackage(_));
                if is_package {
                    return self.write_mode().reject(JsError::frozen_write(&key));
                }
                object::set(obj, key, value, self.write_mode())
            }
            JsValue::Undefined | JsValue::Null => Err(JsError::type_error(format!(
                "Cannot set property \"{}\" of {}",
                key,
                target.to_js_string()
            ))),
            // Assignments to primitives never stick
            _ => self.write_mode().reject(JsError::frozen_write(&key)),
        }
    }

    /// `delete target[key]`
    pub fn delete(
        &mut self,
        target: &JsValue,
        key: impl Into<PropertyKey>,
    ) -> Result<bool, JsError> {
        let key = key.into();
        match target {
            JsValue::Undefined | JsValue::Null => Err(JsError::type_error(format!(
                "Cannot delete property \"{}\" of {}",
                key,
                target.to_js_string()
            ))),
            other => {
                let obj = self.to_object(other)?;
                object::delete(&obj, &key, self.write_mode())
            }
        }
    }

    /// `Object.defineProperty` semantics: failures always raise
    pub fn define_property(
        &mut self,
        obj: &JsObjectRef,
        key: impl Into<PropertyKey>,
        desc: &PropertyDescriptor,
    ) -> Result<(), JsError> {
        object::define_own_property(obj, key.into(), desc)
    }

    /// `for (k in target)`
    pub fn for_in(&self, target: &JsValue) -> ForInIterator {
        match target {
            JsValue::Undefined | JsValue::Null => ForInIterator::empty(),
            JsValue::Object(obj) => ForInIterator::new(obj),
            primitive => ForInIterator::new(&builtins::wrapper::box_primitive(self, primitive)),
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Calls
    // ═══════════════════════════════════════════════════════════════

    /// `callee.call(this, ...args)`
    pub fn call(
        &mut self,
        callee: &JsValue,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let func = callee.as_object().and_then(|obj| match &obj.lock().exotic {
            ExoticObject::Function(f) => Some(f.func),
            _ => None,
        });
        match func {
            Some(func) => func(self, this, args),
            None => Err(JsError::type_error(format!(
                "{} is not a function",
                callee.to_js_string()
            ))),
        }
    }

    /// `target.name(...args)`
    pub fn call_method(
        &mut self,
        target: &JsValue,
        name: &str,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let method = self.get(target, name)?;
        if !method.is_callable() {
            return Err(JsError::type_error(format!(
                "{}.{} is not a function",
                target.to_js_string(),
                name
            )));
        }
        self.call(&method, target.clone(), args)
    }

    /// `new callee(...args)`
    pub fn construct(&mut self, callee: &JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
        let Some(ctor) = callee.as_object() else {
            return Err(JsError::type_error(format!(
                "{} is not a constructor",
                callee.to_js_string()
            )));
        };

        let handle = ctor.lock().host_type().cloned();
        if let Some(handle) = handle {
            return builtins::java::construct_host(self, &handle, args);
        }
        if !callee.is_callable() {
            return Err(JsError::type_error(format!(
                "{} is not a constructor",
                callee.to_js_string()
            )));
        }

        let proto = match object::get(ctor, &PropertyKey::from("prototype")) {
            JsValue::Object(proto) => proto,
            _ => self.object_prototype.cheap_clone(),
        };
        let this = JsValue::Object(self.create_object_with_prototype(Some(proto)));
        let result = self.call(callee, this.clone(), args)?;
        Ok(if result.is_object() { result } else { this })
    }

    /// `value instanceof ctor`
    pub fn instance_of(&mut self, value: &JsValue, ctor: &JsValue) -> Result<bool, JsError> {
        let Some(ctor_obj) = ctor.as_object() else {
            return Err(JsError::type_error(
                "Right-hand side of 'instanceof' is not callable",
            ));
        };

        let handle = ctor_obj.lock().host_type().cloned();
        if let Some(handle) = handle {
            return Ok(value.as_object().is_some_and(|obj| {
                matches!(&obj.lock().exotic, ExoticObject::HostInstance(h) if *h == handle)
            }));
        }
        if !ctor.is_callable() {
            return Err(JsError::type_error(
                "Right-hand side of 'instanceof' is not callable",
            ));
        }

        let Some(obj) = value.as_object() else {
            return Ok(false);
        };
        let JsValue::Object(proto) = object::get(ctor_obj, &PropertyKey::from("prototype")) else {
            return Err(JsError::type_error(
                "Function has non-object prototype in instanceof check",
            ));
        };
        let mut current = obj.prototype();
        while let Some(p) = current {
            if JsObjectRef::ptr_eq(&p, &proto) {
                return Ok(true);
            }
            current = p.prototype();
        }
        Ok(false)
    }

    // ═══════════════════════════════════════════════════════════════
    // Globals and host types
    // ═══════════════════════════════════════════════════════════════

    /// Assign a global binding; rejections follow the write mode
    pub fn set_global(&mut self, name: &str, value: JsValue) -> Result<bool, JsError> {
        object::set(&self.global, PropertyKey::from(name), value, self.write_mode())
    }

    /// Free identifier lookup: globals first, then imported packages in order
    pub fn get_global(&mut self, name: &str) -> Result<JsValue, JsError> {
        let key = PropertyKey::from(name);
        if let Some(prop) = object::find_property(&self.global, &key) {
            return Ok(prop.value);
        }

        for prefix in self.imports.clone() {
            let qualified = format!("{}.{}", prefix, name);
            log::trace!("resolving {} through imported package {}", name, prefix);
            match self.resolve_type(&qualified) {
                Ok(type_object) => return Ok(JsValue::Object(type_object)),
                Err(err) if err.is_not_found() => continue,
                Err(JsError::TypeError { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(JsError::reference_error(name))
    }

    /// `importPackage(name)`: add a prefix for free identifier lookup
    pub fn import_package(&mut self, name: &str) -> Result<(), JsError> {
        crate::bridge::validate_type_name(name)?;
        if !self.imports.iter().any(|p| p.as_str() == name) {
            log::debug!("importing package {}", name);
            self.imports.push(JsString::from(name));
        }
        Ok(())
    }

    /// `importClass(type)`: bind the type's simple name as a global
    pub fn import_class(&mut self, type_value: &JsValue) -> Result<(), JsError> {
        let handle = type_value
            .as_object()
            .and_then(|obj| obj.lock().host_type().cloned())
            .ok_or_else(|| {
                JsError::type_error(format!(
                    "{} is not a host type",
                    type_value.to_js_string()
                ))
            })?;
        let short_name = handle.short_name().to_string();
        self.set_global(&short_name, type_value.clone())?;
        Ok(())
    }

    pub fn imported_packages(&self) -> &[JsString] {
        &self.imports
    }

    /// Resolve a host type through the bridge and return its type object
    pub fn resolve_type(&mut self, name: &str) -> Result<JsObjectRef, JsError> {
        let handle = self.bridge.resolve_type(name)?;
        Ok(self.type_object(&handle))
    }

    /// The unique type object for a resolved handle
    pub fn type_object(&mut self, handle: &ForeignTypeHandle) -> JsObjectRef {
        if let Some(obj) = self.type_objects.get(handle.name()) {
            return obj.cheap_clone();
        }
        let obj = builtins::java::create_type_object(self, handle);
        self.type_objects
            .insert(handle.name().cheap_clone(), obj.cheap_clone());
        obj
    }

    // ═══════════════════════════════════════════════════════════════
    // Exceptions
    // ═══════════════════════════════════════════════════════════════

    /// Create an error object of the given kind
    pub fn create_error(&self, kind: ErrorKind, message: &str) -> JsObjectRef {
        builtins::error::create_error(self, kind, message)
    }

    /// The value a script `catch (e)` receives for this error
    pub fn error_to_value(&self, err: &JsError) -> JsValue {
        builtins::error::error_to_value(self, err)
    }

    /// `try { ... } catch (e)`: convert a failure into the caught value
    pub fn catch<T>(&self, result: Result<T, JsError>) -> Result<T, JsValue> {
        result.map_err(|err| self.error_to_value(&err))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("config", &self.config)
            .field("imports", &self.imports)
            .field("bridge", &self.bridge)
            .finish()
    }
}
