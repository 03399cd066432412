//! Property operations with extensibility checks.
//!
//! Every mutating entry point takes the target object's lock once and
//! validates the request against the object's integrity level and the current
//! descriptor before touching the store, so a concurrent observer sees each
//! mutation either fully applied or not at all.

use crate::error::JsError;
use crate::value::{
    CheapClone, ExoticObject, JsObject, JsObjectRef, JsValue, MAX_ARRAY_INDEX, Property,
    PropertyDescriptor, PropertyKey,
};

/// How rejected writes and deletes are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Non-strict semantics: the operation evaluates to `false`
    #[default]
    Silent,
    /// Strict semantics: the rejection is raised as an error
    Strict,
}

impl WriteMode {
    /// Settle the outcome of a mutation according to this mode
    pub fn settle(self, result: Result<(), JsError>) -> Result<bool, JsError> {
        match result {
            Ok(()) => Ok(true),
            Err(err) if err.is_write_rejection() => self.reject(err),
            Err(err) => Err(err),
        }
    }

    pub fn reject(self, err: JsError) -> Result<bool, JsError> {
        match self {
            WriteMode::Silent => {
                log::debug!("ignoring rejected mutation: {}", err);
                Ok(false)
            }
            WriteMode::Strict => Err(err),
        }
    }
}

fn length_key() -> PropertyKey {
    PropertyKey::from("length")
}

/// Own property snapshot
pub fn get_own_property(obj: &JsObjectRef, key: &PropertyKey) -> Option<Property> {
    obj.lock().get_own_property(key).cloned()
}

/// Find a property on the object or its prototype chain
pub fn find_property(obj: &JsObjectRef, key: &PropertyKey) -> Option<Property> {
    let mut current = Some(obj.cheap_clone());
    while let Some(target) = current {
        let next = {
            let object = target.lock();
            if let Some(prop) = object.get_own_property(key) {
                return Some(prop.clone());
            }
            object.prototype.clone()
        };
        current = next;
    }
    None
}

/// [[Get]] for data properties
pub fn get(obj: &JsObjectRef, key: &PropertyKey) -> JsValue {
    find_property(obj, key)
        .map(|prop| prop.value)
        .unwrap_or_default()
}

pub fn has_property(obj: &JsObjectRef, key: &PropertyKey) -> bool {
    find_property(obj, key).is_some()
}

pub fn has_own_property(obj: &JsObjectRef, key: &PropertyKey) -> bool {
    obj.lock().has_own_property(key)
}

/// All own keys, including non-enumerable ones
pub fn own_keys(obj: &JsObjectRef) -> Vec<PropertyKey> {
    obj.lock().own_keys()
}

/// Own enumerable keys in reporting order (`Object.keys`)
pub fn own_enumerable_keys(obj: &JsObjectRef) -> Vec<PropertyKey> {
    let object = obj.lock();
    object
        .own_keys()
        .into_iter()
        .filter(|key| {
            object
                .get_own_property(key)
                .is_some_and(|prop| prop.enumerable)
        })
        .collect()
}

/// [[DefineOwnProperty]]: add or reconfigure a property.
///
/// Always reports failures as errors; `Object.defineProperty` throws in every mode.
pub fn define_own_property(
    obj: &JsObjectRef,
    key: PropertyKey,
    desc: &PropertyDescriptor,
) -> Result<(), JsError> {
    let length = desc
        .value
        .as_ref()
        .and_then(|value| requested_length(&key, value));
    let mut object = obj.lock();
    define_on(&mut object, key, desc, length)
}

/// Define on an already-locked object
fn define_on(
    object: &mut JsObject,
    key: PropertyKey,
    desc: &PropertyDescriptor,
    length: Option<Result<u32, JsError>>,
) -> Result<(), JsError> {
    if object.is_array() && key.eq_str("length") {
        return define_array_length(object, desc, length);
    }

    let Some(current) = object.properties.get(&key) else {
        if !object.is_extensible() {
            return Err(JsError::not_extensible(&key));
        }
        if let Some(index) = key.index() {
            grow_array_length(object, index)?;
        }
        object.properties.insert(key, desc.to_property());
        return Ok(());
    };

    validate_redefinition(current, &key, desc)?;
    if let Some(prop) = object.properties.get_mut(&key) {
        desc.apply_to(prop);
    }
    Ok(())
}

/// Reject changes a non-configurable property does not allow
fn validate_redefinition(
    current: &Property,
    key: &PropertyKey,
    desc: &PropertyDescriptor,
) -> Result<(), JsError> {
    if current.configurable {
        return Ok(());
    }
    if desc.configurable == Some(true) {
        return Err(JsError::not_configurable(key));
    }
    if desc.enumerable.is_some_and(|e| e != current.enumerable) {
        return Err(JsError::not_configurable(key));
    }
    if !current.writable {
        if desc.writable == Some(true) {
            return Err(JsError::not_configurable(key));
        }
        if let Some(value) = &desc.value {
            if !value.same_value(&current.value) {
                return Err(JsError::not_configurable(key));
            }
        }
    }
    Ok(())
}

/// [[Set]] for data properties.
///
/// Returns `Ok(false)` for a silently rejected write in [`WriteMode::Silent`].
pub fn set(
    obj: &JsObjectRef,
    key: PropertyKey,
    value: JsValue,
    mode: WriteMode,
) -> Result<bool, JsError> {
    let length = requested_length(&key, &value);
    {
        let mut object = obj.lock();
        if object.has_own_property(&key) {
            return mode.settle(write_own(&mut object, key, value, length));
        }
    }

    // An inherited read-only property blocks creating an own one
    let mut current = obj.prototype();
    while let Some(proto) = current {
        let next = {
            let object = proto.lock();
            match object.get_own_property(&key) {
                Some(prop) if !prop.writable => {
                    return mode.reject(JsError::frozen_write(&key));
                }
                Some(_) => None,
                None => object.prototype.clone(),
            }
        };
        current = next;
    }

    let mut object = obj.lock();
    mode.settle(write_own(&mut object, key, value, length))
}

/// Convert a value written to `length` before the target is locked.
///
/// The conversion may lock `value` itself, which can be the target.
fn requested_length(key: &PropertyKey, value: &JsValue) -> Option<Result<u32, JsError>> {
    key.eq_str("length").then(|| to_array_length(value))
}

/// Write a value to an own slot, creating it when absent
fn write_own(
    object: &mut JsObject,
    key: PropertyKey,
    value: JsValue,
    length: Option<Result<u32, JsError>>,
) -> Result<(), JsError> {
    match object.properties.get(&key).map(|prop| prop.writable) {
        Some(false) => Err(JsError::frozen_write(&key)),
        Some(true) => {
            if object.is_array() && key.eq_str("length") {
                return set_array_length(object, length);
            }
            if let Some(prop) = object.properties.get_mut(&key) {
                prop.value = value;
            }
            Ok(())
        }
        None => {
            if !object.is_extensible() {
                return Err(JsError::not_extensible(&key));
            }
            if let Some(index) = key.index() {
                grow_array_length(object, index)?;
            }
            object.properties.insert(key, Property::data(value));
            Ok(())
        }
    }
}

/// [[Delete]]: absent keys succeed, non-configurable keys are rejected
pub fn delete(obj: &JsObjectRef, key: &PropertyKey, mode: WriteMode) -> Result<bool, JsError> {
    let result = {
        let mut object = obj.lock();
        match object.get_own_property(key).map(|prop| prop.configurable) {
            None => Ok(()),
            Some(false) => Err(JsError::not_configurable(key)),
            Some(true) => {
                object.properties.remove(key);
                Ok(())
            }
        }
    };
    mode.settle(result)
}

/// Serializes prototype mutation so the cycle check and the store are atomic
/// with respect to every other `set_prototype` call.
static PROTOTYPE_MUTATION: parking_lot::Mutex<()> = parking_lot::const_mutex(());

/// [[SetPrototypeOf]]: keeps the chain acyclic and respects extensibility
pub fn set_prototype(obj: &JsObjectRef, proto: Option<JsObjectRef>) -> Result<(), JsError> {
    let _chain = PROTOTYPE_MUTATION.lock();
    let current = obj.prototype();
    let unchanged = match (&current, &proto) {
        (None, None) => true,
        (Some(a), Some(b)) => JsObjectRef::ptr_eq(a, b),
        _ => false,
    };
    if unchanged {
        return Ok(());
    }

    let mut cursor = proto.clone();
    while let Some(p) = cursor {
        if JsObjectRef::ptr_eq(&p, obj) {
            return Err(JsError::type_error("Cyclic __proto__ value"));
        }
        cursor = p.prototype();
    }

    let mut object = obj.lock();
    if !object.is_extensible() {
        return Err(JsError::type_error(format!(
            "#<Object> is not extensible (object #{})",
            obj.id()
        )));
    }
    object.prototype = proto;
    Ok(())
}

/// Validate a value as an array length (ToUint32 must round-trip)
pub fn to_array_length(value: &JsValue) -> Result<u32, JsError> {
    let n = value.to_number();
    let len = n as u32;
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && len as f64 == n {
        Ok(len)
    } else {
        Err(JsError::range_error("Invalid array length"))
    }
}

fn current_length(object: &JsObject) -> (u32, bool) {
    match object.properties.get(&length_key()) {
        Some(prop) => (prop.value.to_number() as u32, prop.writable),
        None => (0, true),
    }
}

/// Extend `length` when an index at or past the end of an array is created
fn grow_array_length(object: &mut JsObject, index: u32) -> Result<(), JsError> {
    if !object.is_array() {
        return Ok(());
    }
    let (len, writable) = current_length(object);
    if index < len {
        return Ok(());
    }
    if !writable {
        return Err(JsError::frozen_write(&length_key()));
    }
    let new_len = index.saturating_add(1).min(MAX_ARRAY_INDEX + 1);
    if let Some(prop) = object.properties.get_mut(&length_key()) {
        prop.value = JsValue::Number(new_len as f64);
    }
    Ok(())
}

/// Assign `length` on an array, truncating trailing elements
fn set_array_length(
    object: &mut JsObject,
    length: Option<Result<u32, JsError>>,
) -> Result<(), JsError> {
    let new_len = length.ok_or_else(|| JsError::internal_error("length not converted"))??;
    truncate_array(object, new_len, None)
}

fn define_array_length(
    object: &mut JsObject,
    desc: &PropertyDescriptor,
    length: Option<Result<u32, JsError>>,
) -> Result<(), JsError> {
    let key = length_key();
    let Some(current) = object.properties.get(&key) else {
        return Err(JsError::internal_error("array without length"));
    };

    let Some(new_len) = length else {
        validate_redefinition(current, &key, desc)?;
        if let Some(prop) = object.properties.get_mut(&key) {
            desc.apply_to(prop);
        }
        return Ok(());
    };

    let new_len = new_len?;
    let attrs = PropertyDescriptor {
        value: None,
        ..desc.clone()
    };
    validate_redefinition(current, &key, &attrs)?;
    if !current.writable && new_len != current.value.to_number() as u32 {
        return Err(JsError::not_configurable(&key));
    }
    truncate_array(object, new_len, desc.writable)
}

/// Delete elements at or past `new_len` from the top down, stopping at the
/// first non-configurable one, then store the resulting length.
fn truncate_array(
    object: &mut JsObject,
    new_len: u32,
    writable: Option<bool>,
) -> Result<(), JsError> {
    let key = length_key();
    let (old_len, length_writable) = current_length(object);
    if new_len != old_len && !length_writable {
        return Err(JsError::frozen_write(&key));
    }

    let mut final_len = new_len;
    let mut blocked = None;
    if new_len < old_len {
        for index in object.properties.indices_from(new_len) {
            let element = PropertyKey::Index(index);
            let configurable = object
                .properties
                .get(&element)
                .is_some_and(|prop| prop.configurable);
            if !configurable {
                final_len = index + 1;
                blocked = Some(element);
                break;
            }
            object.properties.remove(&element);
        }
    }

    if let Some(prop) = object.properties.get_mut(&key) {
        prop.value = JsValue::Number(final_len as f64);
        if writable == Some(false) {
            prop.writable = false;
        }
    }

    match blocked {
        Some(element) => Err(JsError::not_configurable(&element)),
        None => Ok(()),
    }
}

/// True when the object is an array exotic object
pub fn is_array(obj: &JsObjectRef) -> bool {
    matches!(obj.lock().exotic, ExoticObject::Array)
}
