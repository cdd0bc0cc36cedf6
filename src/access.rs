//! Role allow-lists for portal routes.
//!
//! Each dashboard and its API live under a path prefix; a [`RouteAccess`]
//! maps those prefixes to the roles allowed through. It runs after the
//! credential gate and before any handler.

use std::fmt;

use crate::actor::Actor;
use crate::role::Role;

/// A path prefix and the roles allowed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    prefix: String,
    roles: Vec<Role>,
}

impl RouteRule {
    /// Normalized prefix (no trailing slash).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Roles allowed under the prefix.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// An actor's role is not on the allow-list for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Role not allowed under the matched prefix
    Forbidden {
        /// Requested path
        path: String,
        /// Acting role
        role: Role,
    },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Forbidden { path, role } => {
                write!(f, "role {} may not access '{}'", role, path)
            }
        }
    }
}

impl std::error::Error for AccessError {}

/// Prefix-based role allow-lists.
///
/// The longest matching prefix decides. Paths without a rule are open to
/// any authenticated actor. `Developer` passes every rule.
///
/// # Examples
///
/// ```
/// use wecare_core::{Actor, RouteAccess, Role};
///
/// let access = RouteAccess::new()
///     .allow("/api/admin", [Role::Admin])
///     .allow("/api/driver", [Role::Driver, Role::Admin]);
///
/// let driver = Actor::new("d1", Role::Driver);
/// assert!(access.check("/api/driver/rides", &driver).is_ok());
/// assert!(access.check("/api/admin/users", &driver).is_err());
/// assert!(access.check("/api/profile", &driver).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteAccess {
    rules: Vec<RouteRule>,
}

impl RouteAccess {
    /// Creates an empty allow-list; every path is open.
    pub fn new() -> Self {
        Self::default()
    }

    /// The portal's dashboards and their APIs.
    pub fn wecare_defaults() -> Self {
        Self::new()
            .allow("/admin", [Role::Admin])
            .allow("/api/admin", [Role::Admin])
            .allow("/driver", [Role::Driver, Role::Admin])
            .allow("/api/driver", [Role::Driver, Role::Admin])
            .allow("/community", [Role::Community, Role::Admin])
            .allow("/api/community", [Role::Community, Role::Admin])
            .allow("/officer", [Role::HealthOfficer, Role::Admin])
            .allow("/api/officer", [Role::HealthOfficer, Role::Admin])
            .allow("/executive", [Role::Executive, Role::Admin])
            .allow("/api/executive", [Role::Executive, Role::Admin])
    }

    /// Allows `roles` under `prefix`.
    ///
    /// Repeating a prefix merges the role lists instead of adding a second
    /// rule.
    pub fn allow(mut self, prefix: &str, roles: impl IntoIterator<Item = Role>) -> Self {
        let prefix = normalize(prefix);
        let index = match self.rules.iter().position(|r| r.prefix == prefix) {
            Some(index) => index,
            None => {
                self.rules.push(RouteRule {
                    prefix,
                    roles: Vec::new(),
                });
                self.rules.len() - 1
            }
        };

        let rule = &mut self.rules[index];
        for role in roles {
            if !rule.roles.contains(&role) {
                rule.roles.push(role);
            }
        }
        self
    }

    /// The rule that governs `path`, if any.
    pub fn rule_for(&self, path: &str) -> Option<&RouteRule> {
        let path = normalize(path);
        self.rules
            .iter()
            .filter(|rule| rule.matches(&path))
            .max_by_key(|rule| rule.prefix.len())
    }

    /// Checks whether `actor` may reach `path`.
    ///
    /// # Errors
    ///
    /// [`AccessError::Forbidden`] when a rule governs the path and the
    /// actor's role is not on it.
    pub fn check(&self, path: &str, actor: &Actor) -> Result<(), AccessError> {
        if actor.role == Role::Developer {
            return Ok(());
        }
        match self.rule_for(path) {
            Some(rule) if !rule.roles.contains(&actor.role) => Err(AccessError::Forbidden {
                path: path.to_string(),
                role: actor.role,
            }),
            _ => Ok(()),
        }
    }
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
