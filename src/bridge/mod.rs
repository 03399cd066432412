//! Foreign bridge: resolves host type names under a security policy.
//!
//! Resolution order is fixed: validate the name, ask the policy, then consult
//! the handle cache and finally the registry. A denied name never reaches the
//! registry.

mod handle;
pub mod policy;
pub mod registry;

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::JsError;
use crate::value::{JsString, JsValue};

pub use handle::ForeignTypeHandle;
pub use policy::{
    Access, Decision, DenyReason, PolicyConfig, PolicyRule, SecurityPolicy, is_sensitive,
};
pub use registry::{HostClass, HostMethod, StaticTypeRegistry, TypeRegistry};

/// Check that a name is a dot-separated list of identifier segments
pub fn validate_type_name(name: &str) -> Result<(), JsError> {
    if name.is_empty() {
        return Err(JsError::type_error("empty host type name"));
    }
    let valid = name.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    });
    if valid {
        Ok(())
    } else {
        Err(JsError::type_error(format!(
            "invalid host type name: {:?}",
            name
        )))
    }
}

/// Policy-checked access to host types
pub struct ForeignBridge {
    policy: SecurityPolicy,
    registry: Arc<dyn TypeRegistry>,
    cache: Mutex<FxHashMap<JsString, ForeignTypeHandle>>,
}

impl ForeignBridge {
    pub fn new(policy: SecurityPolicy, registry: Arc<dyn TypeRegistry>) -> Self {
        Self {
            policy,
            registry,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Resolve a fully qualified host type name
    pub fn resolve_type(&self, name: &str) -> Result<ForeignTypeHandle, JsError> {
        validate_type_name(name)?;

        // Checked on every call, cached or not
        match self.policy.check(name) {
            Decision::Allowed => {
                if is_sensitive(name) {
                    log::warn!(
                        "resolving sensitive host type {} with sensitive protection disabled",
                        name
                    );
                }
            }
            Decision::Denied(reason) => {
                log::warn!("access to host type {} denied ({:?})", name, reason);
                return Err(JsError::access_denied(name));
            }
        }

        if let Some(handle) = self.cache.lock().get(name) {
            log::trace!("host type cache hit: {}", name);
            return Ok(handle.clone());
        }

        let class = self
            .registry
            .lookup(name)
            .ok_or_else(|| JsError::not_found(name))?;
        let handle = ForeignTypeHandle::new(class);
        self.cache
            .lock()
            .insert(handle.name().clone(), handle.clone());
        log::debug!("resolved host type {}", name);
        Ok(handle)
    }

    /// True when the registry knows `name`, without consulting the policy
    pub fn is_registered(&self, name: &str) -> bool {
        self.cache.lock().contains_key(name) || self.registry.lookup(name).is_some()
    }

    /// Number of cached handles
    pub fn cached_types(&self) -> usize {
        self.cache.lock().len()
    }

    /// True for type objects produced by this kind of bridge
    pub fn is_type(value: &JsValue) -> bool {
        value
            .as_object()
            .is_some_and(|obj| obj.lock().host_type().is_some())
    }
}

impl std::fmt::Debug for ForeignBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignBridge")
            .field("policy", &self.policy)
            .field("cached_types", &self.cached_types())
            .finish()
    }
}
