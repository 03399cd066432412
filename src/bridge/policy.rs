//! Security policy for host type resolution
//!
//! Rules match a qualified type name exactly (`java.util.HashMap`) or by
//! prefix (`java.util.*`, `*`). The most specific matching rule decides;
//! at equal specificity a deny rule wins. Names with no matching rule fall
//! back to the default access.
//!
//! A small set of sensitive host facilities is denied unconditionally while
//! sensitive-name protection is on.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::JsError;

/// Exact names that are always sensitive
pub const SENSITIVE_TYPES: &[&str] = &["sun.misc.Unsafe", "jdk.internal.misc.Unsafe"];

/// Package prefixes whose members are all sensitive
pub const SENSITIVE_PACKAGES: &[&str] = &["jdk.internal", "sun.reflect", "jdk.nashorn.internal"];

/// Whether a qualified name refers to a sensitive host facility
pub fn is_sensitive(name: &str) -> bool {
    SENSITIVE_TYPES.contains(&name)
        || SENSITIVE_PACKAGES.iter().any(|pkg| {
            name.strip_prefix(pkg)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Allow,
    Deny,
}

/// A single allow/deny rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Exact name, `prefix.*`, or `*`
    pub pattern: String,
    pub access: Access,
}

impl PolicyRule {
    pub fn allow(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            access: Access::Allow,
        }
    }

    pub fn deny(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            access: Access::Deny,
        }
    }

    /// Match specificity: exact matches outrank every prefix match, longer
    /// prefixes outrank shorter ones. `None` when the rule does not apply.
    fn specificity(&self, name: &str) -> Option<usize> {
        if self.pattern == "*" {
            return Some(0);
        }
        if let Some(prefix) = self.pattern.strip_suffix(".*") {
            let rest = name.strip_prefix(prefix)?;
            return rest.starts_with('.').then_some(prefix.len());
        }
        (self.pattern == name).then_some(usize::MAX)
    }

    pub fn is_exact(&self, name: &str) -> bool {
        self.pattern == name
    }
}

/// Serializable policy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub default_access: Access,
    pub rules: Vec<PolicyRule>,
    pub sensitive_protection: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_access: Access::Allow,
            rules: Vec::new(),
            sensitive_protection: true,
        }
    }
}

impl PolicyConfig {
    /// Decide access for a qualified name
    pub fn check(&self, name: &str) -> Decision {
        let sensitive = is_sensitive(name);
        if sensitive && self.sensitive_protection {
            return Decision::Denied(DenyReason::Sensitive);
        }

        let mut best: Option<(usize, &PolicyRule)> = None;
        for rule in &self.rules {
            let Some(score) = rule.specificity(name) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((best_score, best_rule)) => {
                    score > best_score
                        || (score == best_score
                            && rule.access == Access::Deny
                            && best_rule.access == Access::Allow)
                }
            };
            if better {
                best = Some((score, rule));
            }
        }

        if sensitive {
            // Protection is off: only an exact allow rule opens a sensitive name
            return match best {
                Some((_, rule)) if rule.is_exact(name) && rule.access == Access::Allow => {
                    Decision::Allowed
                }
                Some((_, rule)) if rule.access == Access::Deny => {
                    Decision::Denied(DenyReason::Rule(rule.pattern.clone()))
                }
                _ => Decision::Denied(DenyReason::Sensitive),
            };
        }

        match best {
            Some((_, rule)) => match rule.access {
                Access::Allow => Decision::Allowed,
                Access::Deny => Decision::Denied(DenyReason::Rule(rule.pattern.clone())),
            },
            None => match self.default_access {
                Access::Allow => Decision::Allowed,
                Access::Deny => Decision::Denied(DenyReason::Default),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Name is a protected host facility
    Sensitive,
    /// Denied by the rule with this pattern
    Rule(String),
    /// No rule matched and the default is deny
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Shared, thread-safe rule set.
///
/// Clones share the same rules: an `update` through any clone is visible to
/// every bridge holding another clone.
#[derive(Debug, Clone, Default)]
pub struct SecurityPolicy {
    inner: Arc<RwLock<PolicyConfig>>,
}

impl SecurityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: PolicyConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, JsError> {
        let config: PolicyConfig = serde_json::from_str(json)
            .map_err(|e| JsError::config_error(format!("invalid policy: {}", e)))?;
        Ok(Self::from_config(config))
    }

    /// Policy that denies everything without an allow rule
    pub fn deny_all() -> Self {
        Self::from_config(PolicyConfig {
            default_access: Access::Deny,
            ..PolicyConfig::default()
        })
    }

    pub fn check(&self, name: &str) -> Decision {
        self.inner.read().check(name)
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.check(name).is_allowed()
    }

    /// Apply a batch of changes atomically
    pub fn update(&self, f: impl FnOnce(&mut PolicyConfig)) {
        let mut config = self.inner.write();
        f(&mut config);
        log::info!(
            "security policy updated: {} rules, default {:?}, sensitive protection {}",
            config.rules.len(),
            config.default_access,
            config.sensitive_protection
        );
    }

    pub fn add_rule(&self, rule: PolicyRule) {
        self.update(|config| config.rules.push(rule));
    }

    pub fn set_default_access(&self, access: Access) {
        self.update(|config| config.default_access = access);
    }

    pub fn set_sensitive_protection(&self, enabled: bool) {
        self.update(|config| config.sensitive_protection = enabled);
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> PolicyConfig {
        self.inner.read().clone()
    }
}
