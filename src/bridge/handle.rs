//! Resolved host type handles

use std::sync::Arc;

use crate::bridge::registry::HostClass;
use crate::value::JsString;

/// Opaque reference to a resolved host type.
///
/// Only the bridge creates handles, and only after a successful policy check,
/// so holding one proves the type was permitted when it was resolved.
#[derive(Debug, Clone)]
pub struct ForeignTypeHandle {
    class: Arc<HostClass>,
}

impl ForeignTypeHandle {
    pub(crate) fn new(class: Arc<HostClass>) -> Self {
        Self { class }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &JsString {
        &self.class.name
    }

    pub fn short_name(&self) -> &str {
        self.class.short_name()
    }

    pub fn class(&self) -> &HostClass {
        &self.class
    }
}

impl PartialEq for ForeignTypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.class.name == other.class.name
    }
}

impl Eq for ForeignTypeHandle {}
