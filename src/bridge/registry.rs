//! Host type registry

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::value::{JsString, NativeFn};

/// Lookup service for host types, supplied by the embedding
pub trait TypeRegistry: Send + Sync {
    /// Find a host class by fully qualified name
    fn lookup(&self, name: &str) -> Option<Arc<HostClass>>;
}

/// Static method exposed on a host type object
#[derive(Clone)]
pub struct HostMethod {
    pub name: JsString,
    pub func: NativeFn,
    pub arity: usize,
}

impl std::fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HostMethod({})", self.name)
    }
}

/// Description of a host class
#[derive(Debug, Clone)]
pub struct HostClass {
    pub name: JsString,
    /// Runs with the new instance as `this`
    pub constructor: Option<NativeFn>,
    pub statics: Vec<HostMethod>,
}

impl HostClass {
    pub fn new(name: impl Into<JsString>) -> Self {
        Self {
            name: name.into(),
            constructor: None,
            statics: Vec::new(),
        }
    }

    pub fn with_constructor(mut self, constructor: NativeFn) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn with_static(mut self, name: &str, func: NativeFn, arity: usize) -> Self {
        self.statics.push(HostMethod {
            name: JsString::from(name),
            func,
            arity,
        });
        self
    }

    /// Simple name (`HashMap` for `java.util.HashMap`)
    pub fn short_name(&self) -> &str {
        let name = self.name.as_str();
        name.rsplit_once('.').map_or(name, |(_, short)| short)
    }

    /// Enclosing package (`java.util` for `java.util.HashMap`)
    pub fn package_name(&self) -> &str {
        self.name
            .as_str()
            .rsplit_once('.')
            .map_or("", |(package, _)| package)
    }
}

/// In-memory registry populated by the embedding
#[derive(Debug, Default)]
pub struct StaticTypeRegistry {
    classes: FxHashMap<JsString, Arc<HostClass>>,
}

impl StaticTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: HostClass) {
        self.classes.insert(class.name.clone(), Arc::new(class));
    }

    /// Builder-style `register`
    pub fn with(mut self, class: HostClass) -> Self {
        self.register(class);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeRegistry for StaticTypeRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<HostClass>> {
        self.classes.get(name).cloned()
    }
}
