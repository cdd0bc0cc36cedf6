//! Portal roles.
//!
//! Role strings arrive in mixed casing (`community`, `COMMUNITY`,
//! `Health Officer`, `OFFICER`). They are normalized into [`Role`] exactly
//! once, when a credential is verified.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of roles a WeCare account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Community member requesting transport for a patient
    Community,
    /// Driver fulfilling rides
    Driver,
    /// Health officer overseeing requests
    HealthOfficer,
    /// Executive with reporting access
    Executive,
    /// Administrator
    Admin,
    /// Developer account; treated as an administrator everywhere
    Developer,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 6] = [
        Role::Community,
        Role::Driver,
        Role::HealthOfficer,
        Role::Executive,
        Role::Admin,
        Role::Developer,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Community => "COMMUNITY",
            Role::Driver => "DRIVER",
            Role::HealthOfficer => "HEALTH_OFFICER",
            Role::Executive => "EXECUTIVE",
            Role::Admin => "ADMIN",
            Role::Developer => "DEVELOPER",
        }
    }

    /// Returns true for roles that bypass ownership checks.
    pub fn is_administrative(&self) -> bool {
        matches!(self, Role::Admin | Role::Developer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string that did not name any known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match normalized.as_str() {
            "COMMUNITY" => Ok(Role::Community),
            "DRIVER" => Ok(Role::Driver),
            "HEALTH_OFFICER" | "OFFICER" => Ok(Role::HealthOfficer),
            "EXECUTIVE" => Ok(Role::Executive),
            "ADMIN" => Ok(Role::Admin),
            "DEVELOPER" => Ok(Role::Developer),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
