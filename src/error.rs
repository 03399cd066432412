//! Error types for the script engine core

use thiserror::Error;

use crate::value::{JsValue, PropertyKey};

/// Main error type for the engine core
///
/// Property-mutation rejections (`NotExtensible`, `NotConfigurable`,
/// `FrozenWrite`) are only surfaced when the host runs in strict write mode;
/// bridge failures (`AccessDenied`, `NotFound`) are always surfaced.
#[derive(Debug, Error)]
pub enum JsError {
    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("ReferenceError: {name} is not defined")]
    ReferenceError { name: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    #[error("TypeError: Cannot add property {key}, object is not extensible")]
    NotExtensible { key: String },

    #[error("TypeError: Cannot redefine property: {key}")]
    NotConfigurable { key: String },

    #[error("TypeError: Cannot assign to read only property '{key}'")]
    FrozenWrite { key: String },

    #[error("SecurityError: access to host type {name} is denied")]
    AccessDenied { name: String },

    #[error("ClassNotFoundError: {name}")]
    NotFound { name: String },

    #[error("ConfigError: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A script-level value was thrown
    #[error("Uncaught {}", .value.to_js_string())]
    ThrownValue { value: JsValue },
}

impl JsError {
    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn reference_error(name: impl Into<String>) -> Self {
        JsError::ReferenceError { name: name.into() }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    pub fn not_extensible(key: &PropertyKey) -> Self {
        JsError::NotExtensible {
            key: key.to_string(),
        }
    }

    pub fn not_configurable(key: &PropertyKey) -> Self {
        JsError::NotConfigurable {
            key: key.to_string(),
        }
    }

    pub fn frozen_write(key: &PropertyKey) -> Self {
        JsError::FrozenWrite {
            key: key.to_string(),
        }
    }

    pub fn access_denied(name: impl Into<String>) -> Self {
        JsError::AccessDenied { name: name.into() }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        JsError::NotFound { name: name.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        JsError::Config(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// Wrap a script value as a thrown exception
    pub fn thrown(value: JsValue) -> Self {
        JsError::ThrownValue { value }
    }

    /// True for failures that non-strict code ignores silently
    pub fn is_write_rejection(&self) -> bool {
        matches!(
            self,
            JsError::NotExtensible { .. }
                | JsError::NotConfigurable { .. }
                | JsError::FrozenWrite { .. }
        )
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, JsError::AccessDenied { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, JsError::NotFound { .. })
    }

    /// The host type name carried by bridge failures
    pub fn type_name(&self) -> Option<&str> {
        match self {
            JsError::AccessDenied { name } | JsError::NotFound { name } => Some(name),
            _ => None,
        }
    }

    /// The error message without its kind prefix, as exposed on script error objects
    pub fn message(&self) -> String {
        match self {
            JsError::TypeError { message } | JsError::RangeError { message } => message.clone(),
            JsError::ReferenceError { name } => format!("{} is not defined", name),
            JsError::NotExtensible { key } => {
                format!("Cannot add property {}, object is not extensible", key)
            }
            JsError::NotConfigurable { key } => format!("Cannot redefine property: {}", key),
            JsError::FrozenWrite { key } => {
                format!("Cannot assign to read only property '{}'", key)
            }
            JsError::AccessDenied { name } => format!("access to host type {} is denied", name),
            JsError::NotFound { name } => name.clone(),
            JsError::Config(message) | JsError::Internal(message) => message.clone(),
            JsError::ThrownValue { value } => value.to_js_string().to_string(),
        }
    }
}
