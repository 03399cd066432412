//! for-in key enumeration
//!
//! Keys are produced lazily, one object of the prototype chain at a time, and
//! are always strings. Each key is re-checked against its owner when it is
//! reached, so properties deleted mid-iteration are skipped.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use rustc_hash::FxHashSet;

use crate::value::{JsObjectRef, JsString, PropertyKey};

/// Restartable iterator over the enumerable string keys of an object and its
/// prototype chain
#[derive(Debug, Clone, Default)]
pub struct ForInIterator {
    root: Option<JsObjectRef>,
    /// Object whose keys are queued in `pending`
    current: Option<JsObjectRef>,
    /// Next prototype-chain link to load
    next_object: Option<JsObjectRef>,
    pending: VecDeque<PropertyKey>,
    /// Keys already reported or shadowed
    visited: FxHashSet<PropertyKey>,
}

impl ForInIterator {
    pub fn new(obj: &JsObjectRef) -> Self {
        Self {
            root: Some(obj.clone()),
            next_object: Some(obj.clone()),
            ..Self::default()
        }
    }

    /// Iterator over nothing (`for (k in null)`)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rewind to the first key of the root object
    pub fn restart(&mut self) {
        self.current = None;
        self.next_object = self.root.clone();
        self.pending.clear();
        self.visited.clear();
    }

    /// Queue the keys of the next object in the chain
    fn load_next(&mut self) -> bool {
        let Some(obj) = self.next_object.take() else {
            self.current = None;
            return false;
        };
        let (keys, proto) = {
            let object = obj.lock();
            (object.own_keys(), object.prototype.clone())
        };
        log::trace!("for-in: {} keys on object #{}", keys.len(), obj.id());
        self.pending.extend(keys);
        self.next_object = proto;
        self.current = Some(obj);
        true
    }
}

impl Iterator for ForInIterator {
    type Item = JsString;

    fn next(&mut self) -> Option<JsString> {
        loop {
            let Some(key) = self.pending.pop_front() else {
                if !self.load_next() {
                    return None;
                }
                continue;
            };

            let Some(owner) = &self.current else {
                continue;
            };
            let enumerable = match owner.lock().get_own_property(&key) {
                Some(prop) => prop.enumerable,
                None => continue,
            };
            if !self.visited.insert(key.clone()) {
                continue;
            }
            if enumerable {
                return Some(key.to_js_string());
            }
        }
    }
}

impl FusedIterator for ForInIterator {}

/// Enumerate the for-in keys of an object
pub fn enumerate(obj: &JsObjectRef) -> ForInIterator {
    ForInIterator::new(obj)
}
