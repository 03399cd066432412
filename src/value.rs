//! JavaScript value representation
//!
//! The core JsValue type and the object model behind it: property keys,
//! descriptors, integrity levels and the lock-guarded object handle.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::bridge::ForeignTypeHandle;
use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::property::PropertyStore;

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// This makes it explicit at call sites when a clone only bumps a reference
/// count, as opposed to copying data.
pub trait CheapClone: Clone {
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Arc<T> {}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(JsObjectRef),
}

impl JsValue {
    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, JsValue::String(_))
    }

    pub fn as_object(&self) -> Option<&JsObjectRef> {
        match self {
            JsValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Check if this value is callable (a function)
    pub fn is_callable(&self) -> bool {
        match self {
            JsValue::Object(obj) => obj.lock().is_callable(),
            _ => false,
        }
    }

    /// Get the typeof result for this value
    pub fn type_of(&self) -> &'static str {
        match self {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(obj) => {
                if obj.lock().is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Object(_) => true,
        }
    }

    /// Convert to number (ToNumber). Wrapper objects are unboxed.
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => string_to_number(s.as_str()),
            JsValue::Object(obj) => {
                let primitive = obj.lock().primitive_value();
                match primitive {
                    Some(value) => value.to_number(),
                    None => f64::NAN,
                }
            }
        }
    }

    /// Convert to string (ToString)
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Object(obj) => obj.lock().display_string(),
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            // NaN !== NaN falls out of f64 comparison
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => JsObjectRef::ptr_eq(a, b),
            _ => false,
        }
    }

    /// SameValue: like `===` but NaN equals NaN and +0 differs from -0
    pub fn same_value(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Number(a), JsValue::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                a == b && a.is_sign_negative() == b.is_sign_negative()
            }
            _ => self.strict_equals(other),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Number to string conversion used for keys and display
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{}{}", sign, format_finite(n.abs()))
    }
}

/// Decimal form of a positive finite number, switching to exponent notation
/// at or past 1e21 and below 1e-6
fn format_finite(n: f64) -> String {
    // `{:e}` yields the shortest digits that round-trip
    let scientific = format!("{:e}", n);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return n.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return n.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent + 1;

    if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", lead, exp_sign, exponent.abs())
        } else {
            format!("{}.{}e{}{}", lead, rest, exp_sign, exponent.abs())
        }
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            JsValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            // try_lock: Debug may run while the caller holds this object's lock
            JsValue::Object(obj) => match obj.try_lock() {
                Some(object) => write!(f, "{}", object.display_string()),
                None => write!(f, "[object #{}]", obj.id()),
            },
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

impl From<JsObjectRef> for JsValue {
    fn from(obj: JsObjectRef) -> Self {
        JsValue::Object(obj)
    }
}

/// Reference-counted immutable string
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Arc<str>);

impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest valid array index (2^32 - 2)
pub const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

/// Property key: a canonical array index or any other string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    String(JsString),
}

impl PropertyKey {
    pub fn from_value(value: &JsValue) -> Self {
        match value {
            JsValue::Number(n) => {
                if n.fract() == 0.0 && *n >= 0.0 && *n <= MAX_ARRAY_INDEX as f64 {
                    PropertyKey::Index(*n as u32)
                } else {
                    PropertyKey::String(value.to_js_string())
                }
            }
            JsValue::String(s) => PropertyKey::from(s.cheap_clone()),
            _ => PropertyKey::from(value.to_js_string()),
        }
    }

    /// The numeric index, if this is a canonical integer key
    pub fn index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::String(_) => None,
        }
    }

    /// The key as a string; index keys become their canonical decimal form
    pub fn to_js_string(&self) -> JsString {
        match self {
            PropertyKey::String(s) => s.cheap_clone(),
            PropertyKey::Index(i) => JsString::from(i.to_string()),
        }
    }

    /// Check if this key equals a string literal (avoids allocation)
    #[inline]
    pub fn eq_str(&self, s: &str) -> bool {
        match self {
            PropertyKey::String(js_str) => js_str.as_str() == s,
            PropertyKey::Index(_) => false,
        }
    }
}

/// Parse a canonical array index: no sign, no leading zeros, at most 2^32 - 2
fn canonical_index(s: &str) -> Option<u32> {
    let first = s.bytes().next()?;
    if !first.is_ascii_digit() || (first == b'0' && s.len() > 1) {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let idx = s.parse::<u32>().ok()?;
    (idx <= MAX_ARRAY_INDEX).then_some(idx)
}

impl From<&str> for PropertyKey {
    #[inline]
    fn from(s: &str) -> Self {
        match canonical_index(s) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(JsString::from(s)),
        }
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::from(s.as_str())
    }
}

impl From<JsString> for PropertyKey {
    #[inline]
    fn from(s: JsString) -> Self {
        match canonical_index(s.as_str()) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(s),
        }
    }
}

impl From<u32> for PropertyKey {
    fn from(idx: u32) -> Self {
        if idx <= MAX_ARRAY_INDEX {
            PropertyKey::Index(idx)
        } else {
            PropertyKey::String(JsString::from(idx.to_string()))
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Complete data property descriptor as stored on an object
#[derive(Debug, Clone)]
pub struct Property {
    pub value: JsValue,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    /// Ordinary assignment-created property: writable, enumerable, configurable
    pub fn data(value: JsValue) -> Self {
        Self::with_attributes(value, true, true, true)
    }

    /// Builtin method slot: writable and configurable but not enumerable
    pub fn hidden(value: JsValue) -> Self {
        Self::with_attributes(value, true, false, true)
    }

    pub fn with_attributes(
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            value,
            writable,
            enumerable,
            configurable,
        }
    }
}

/// Partial descriptor used by define operations; missing fields are left alone
/// on existing properties and default to `false`/`undefined` on new ones.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fully specified descriptor mirroring an existing property
    pub fn from_property(prop: &Property) -> Self {
        Self {
            value: Some(prop.value.clone()),
            writable: Some(prop.writable),
            enumerable: Some(prop.enumerable),
            configurable: Some(prop.configurable),
        }
    }

    pub fn value(mut self, value: impl Into<JsValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// Materialize as a new property
    pub fn to_property(&self) -> Property {
        Property {
            value: self.value.clone().unwrap_or_default(),
            writable: self.writable.unwrap_or(false),
            enumerable: self.enumerable.unwrap_or(false),
            configurable: self.configurable.unwrap_or(false),
        }
    }

    /// Overwrite the attributes present in this descriptor
    pub fn apply_to(&self, prop: &mut Property) {
        if let Some(value) = &self.value {
            prop.value = value.clone();
        }
        if let Some(writable) = self.writable {
            prop.writable = writable;
        }
        if let Some(enumerable) = self.enumerable {
            prop.enumerable = enumerable;
        }
        if let Some(configurable) = self.configurable {
            prop.configurable = configurable;
        }
    }
}

/// Object mutation restriction level. Transitions only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntegrityLevel {
    #[default]
    Extensible,
    NonExtensible,
    Sealed,
    Frozen,
}

/// Native function signature
pub type NativeFn = fn(&mut Interpreter, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// Native function wrapper
#[derive(Clone)]
pub struct NativeFunction {
    pub name: JsString,
    pub func: NativeFn,
    pub arity: usize,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Exotic object behavior
#[derive(Debug, Default)]
pub enum ExoticObject {
    /// Ordinary object
    #[default]
    Ordinary,
    /// Array exotic object; `length` lives in the property store
    Array,
    /// Unmapped arguments object
    Arguments,
    /// Boxed boolean
    Boolean(bool),
    /// Boxed number
    Number(f64),
    /// Boxed string; index properties are materialized on creation
    String(JsString),
    /// Error instance
    Error,
    /// Native function
    Function(NativeFunction),
    /// Resolved host type (the value `Java.type` returns)
    HostType(ForeignTypeHandle),
    /// Instance constructed from a host type
    HostInstance(ForeignTypeHandle),
    /// Host namespace path; members resolve through the bridge
    HostPackage(JsString),
}

/// A JavaScript object
#[derive(Debug, Default)]
pub struct JsObject {
    /// Prototype link (shared, never owning the chain)
    pub prototype: Option<JsObjectRef>,
    /// Current integrity level
    pub integrity: IntegrityLevel,
    /// Own properties
    pub properties: PropertyStore,
    /// Exotic object behavior
    pub exotic: ExoticObject,
}

impl JsObject {
    /// Create a new ordinary object without prototype
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ordinary object with a prototype
    pub fn with_prototype(prototype: JsObjectRef) -> Self {
        Self {
            prototype: Some(prototype),
            ..Self::default()
        }
    }

    pub fn with_exotic(exotic: ExoticObject, prototype: Option<JsObjectRef>) -> Self {
        Self {
            prototype,
            exotic,
            ..Self::default()
        }
    }

    pub fn is_extensible(&self) -> bool {
        self.integrity == IntegrityLevel::Extensible
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.exotic, ExoticObject::Array)
    }

    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.properties.contains_key(key)
    }

    /// Own keys: indices ascending, then strings in insertion order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.properties.keys()
    }

    /// Current `length` of an array or arguments object
    pub fn length(&self) -> Option<u32> {
        match self.exotic {
            ExoticObject::Array | ExoticObject::Arguments | ExoticObject::String(_) => self
                .properties
                .get(&PropertyKey::from("length"))
                .map(|prop| prop.value.to_number() as u32),
            _ => None,
        }
    }

    /// The boxed primitive of a wrapper object (unboxing)
    pub fn primitive_value(&self) -> Option<JsValue> {
        match &self.exotic {
            ExoticObject::Boolean(b) => Some(JsValue::Boolean(*b)),
            ExoticObject::Number(n) => Some(JsValue::Number(*n)),
            ExoticObject::String(s) => Some(JsValue::String(s.cheap_clone())),
            _ => None,
        }
    }

    pub fn host_type(&self) -> Option<&ForeignTypeHandle> {
        match &self.exotic {
            ExoticObject::HostType(handle) => Some(handle),
            _ => None,
        }
    }

    fn display_string(&self) -> JsString {
        match &self.exotic {
            ExoticObject::Boolean(b) => JsString::from(b.to_string()),
            ExoticObject::Number(n) => JsString::from(number_to_string(*n)),
            ExoticObject::String(s) => s.cheap_clone(),
            ExoticObject::Function(func) => {
                JsString::from(format!("function {}() {{ [native code] }}", func.name))
            }
            ExoticObject::HostType(handle) => {
                JsString::from(format!("[JavaClass {}]", handle.name()))
            }
            ExoticObject::HostPackage(path) => JsString::from(format!("[JavaPackage {}]", path)),
            ExoticObject::Error => {
                let name = self.own_string("name").unwrap_or_else(|| "Error".to_string());
                match self.own_string("message") {
                    Some(message) if !message.is_empty() => {
                        JsString::from(format!("{}: {}", name, message))
                    }
                    _ => JsString::from(name),
                }
            }
            ExoticObject::Array | ExoticObject::Arguments => {
                let len = self.length().unwrap_or(0);
                let parts: Vec<String> = (0..len)
                    .map(|i| match self.properties.get(&PropertyKey::Index(i)) {
                        Some(prop) if !prop.value.is_null_or_undefined() => match &prop.value {
                            JsValue::Object(_) => "[object]".to_string(),
                            other => other.to_js_string().to_string(),
                        },
                        _ => String::new(),
                    })
                    .collect();
                JsString::from(parts.join(","))
            }
            ExoticObject::HostInstance(handle) => {
                JsString::from(format!("[object {}]", handle.short_name()))
            }
            ExoticObject::Ordinary => JsString::from("[object Object]"),
        }
    }

    fn own_string(&self, name: &str) -> Option<String> {
        self.properties
            .get(&PropertyKey::from(name))
            .and_then(|prop| prop.value.as_str().map(str::to_string))
    }
}

static NEXT_OBJECT_ID: AtomicUsize = AtomicUsize::new(1);

struct ObjectCell {
    id: usize,
    data: Mutex<JsObject>,
}

/// Shared reference to a heap object.
///
/// Every object carries its own lock; an operation that mutates an object
/// holds the lock for its whole effect. Never lock two objects at once:
/// prototype walks release the child before locking the parent.
#[derive(Clone)]
pub struct JsObjectRef(Arc<ObjectCell>);

impl CheapClone for JsObjectRef {}

impl JsObjectRef {
    pub fn new(object: JsObject) -> Self {
        JsObjectRef(Arc::new(ObjectCell {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            data: Mutex::new(object),
        }))
    }

    /// Lock the object for reading or mutation
    pub fn lock(&self) -> MutexGuard<'_, JsObject> {
        self.0.data.lock()
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, JsObject>> {
        self.0.data.try_lock()
    }

    /// Unique object id
    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn ptr_eq(a: &JsObjectRef, b: &JsObjectRef) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Snapshot of the prototype link (lock released on return)
    pub fn prototype(&self) -> Option<JsObjectRef> {
        self.lock().prototype.clone()
    }
}

impl PartialEq for JsObjectRef {
    fn eq(&self, other: &Self) -> bool {
        JsObjectRef::ptr_eq(self, other)
    }
}

impl Eq for JsObjectRef {}

impl std::hash::Hash for JsObjectRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for JsObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsObjectRef(#{})", self.0.id)
    }
}
