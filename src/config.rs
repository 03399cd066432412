//! Runtime configuration

use serde::{Deserialize, Serialize};

use crate::bridge::PolicyConfig;
use crate::error::JsError;
use crate::object::WriteMode;

/// Top-level package names installed as global package objects by default
pub const DEFAULT_PACKAGE_ROOTS: &[&str] = &["java", "javax", "javafx", "com", "edu", "net", "org"];

/// Interpreter settings, loadable from JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Raise rejected writes and deletes instead of returning `false`
    pub strict: bool,
    /// Global aliases for host package roots (`java`, `javax`, ...)
    pub package_roots: Vec<String>,
    /// Policy used when no shared `SecurityPolicy` is injected
    pub policy: PolicyConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            strict: false,
            package_roots: DEFAULT_PACKAGE_ROOTS.iter().map(|s| s.to_string()).collect(),
            policy: PolicyConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(json: &str) -> Result<Self, JsError> {
        serde_json::from_str(json)
            .map_err(|e| JsError::config_error(format!("invalid runtime config: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, JsError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| JsError::config_error(format!("cannot serialize config: {}", e)))
    }

    pub fn write_mode(&self) -> WriteMode {
        if self.strict {
            WriteMode::Strict
        } else {
            WriteMode::Silent
        }
    }
}
