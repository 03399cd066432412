//! Object integrity levels: preventExtensions, seal and freeze.
//!
//! Levels only move forward (`Extensible -> NonExtensible -> Sealed ->
//! Frozen`). Requesting a level at or below the current one leaves the object
//! untouched. The sealed/frozen queries inspect the attributes themselves, so
//! an object that reaches the same state through `preventExtensions` plus
//! `defineProperty` reports the same answer.

use crate::value::{IntegrityLevel, JsObject, JsObjectRef};

/// Raise the object's integrity level, updating attributes under one lock
pub fn set_integrity_level(obj: &JsObjectRef, level: IntegrityLevel) {
    let mut object = obj.lock();
    if object.integrity >= level {
        return;
    }

    let seal = level >= IntegrityLevel::Sealed;
    let freeze = level == IntegrityLevel::Frozen;
    if seal {
        for prop in object.properties.values_mut() {
            prop.configurable = false;
            if freeze {
                prop.writable = false;
            }
        }
    }

    log::debug!(
        "object #{}: {:?} -> {:?} ({} properties)",
        obj.id(),
        object.integrity,
        level,
        object.properties.len()
    );
    object.integrity = level;
}

pub fn prevent_extensions(obj: &JsObjectRef) {
    set_integrity_level(obj, IntegrityLevel::NonExtensible);
}

/// Make every own property non-configurable and forbid new ones
pub fn seal(obj: &JsObjectRef) {
    set_integrity_level(obj, IntegrityLevel::Sealed);
}

/// Seal, and make every own data property read-only
pub fn freeze(obj: &JsObjectRef) {
    set_integrity_level(obj, IntegrityLevel::Frozen);
}

pub fn is_extensible(obj: &JsObjectRef) -> bool {
    obj.lock().is_extensible()
}

/// Whether the object currently satisfies `level`
pub fn test_integrity_level(obj: &JsObjectRef, level: IntegrityLevel) -> bool {
    level <= observed_level(&obj.lock())
}

pub fn is_sealed(obj: &JsObjectRef) -> bool {
    test_integrity_level(obj, IntegrityLevel::Sealed)
}

pub fn is_frozen(obj: &JsObjectRef) -> bool {
    test_integrity_level(obj, IntegrityLevel::Frozen)
}

/// Effective level derived from the extensible flag and the attributes
pub fn integrity_level(obj: &JsObjectRef) -> IntegrityLevel {
    observed_level(&obj.lock())
}

fn observed_level(object: &JsObject) -> IntegrityLevel {
    if object.is_extensible() {
        return IntegrityLevel::Extensible;
    }
    if object.integrity == IntegrityLevel::Frozen {
        return IntegrityLevel::Frozen;
    }

    let mut sealed = true;
    let mut frozen = true;
    for prop in object.properties.values() {
        if prop.configurable {
            sealed = false;
            frozen = false;
            break;
        }
        if prop.writable {
            frozen = false;
        }
    }

    if frozen {
        IntegrityLevel::Frozen
    } else if sealed {
        IntegrityLevel::Sealed
    } else {
        IntegrityLevel::NonExtensible
    }
}
