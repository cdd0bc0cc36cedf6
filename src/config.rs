//! Gate configuration.
//!
//! Configuration is plain data handed to the gate and verifier at
//! construction. Nothing is read from ambient global state after startup.

use std::fmt;

/// Environment variable naming the credential cookie.
pub const ENV_COOKIE_NAME: &str = "WECARE_AUTH_COOKIE";
/// Environment variable holding clock leeway, in seconds.
pub const ENV_LEEWAY_SECS: &str = "WECARE_JWT_LEEWAY_SECS";
/// Environment variable holding credential lifetime, in seconds.
pub const ENV_TTL_SECS: &str = "WECARE_JWT_TTL_SECS";
/// Environment variable holding the HS256 signing key.
pub const ENV_SECRET: &str = "WECARE_JWT_SECRET";

const DEFAULT_COOKIE_NAME: &str = "token";
const DEFAULT_LEEWAY_SECS: u64 = 0;
const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Settings shared by the credential gate and the HS256 verifier.
///
/// # Examples
///
/// ```
/// use wecare_core::GateConfig;
///
/// let config = GateConfig::default()
///     .with_cookie_name("wecare_session")
///     .with_leeway_secs(30);
///
/// assert_eq!(config.cookie_name(), "wecare_session");
/// assert_eq!(config.leeway_secs(), 30);
/// assert_eq!(config.token_ttl_secs(), 86_400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    cookie_name: String,
    leeway_secs: u64,
    token_ttl_secs: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
            token_ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl GateConfig {
    /// Sets the cookie consulted when no usable `Authorization` header is present.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Sets how many seconds past `exp` a credential is still accepted.
    pub fn with_leeway_secs(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Sets the lifetime of newly issued credentials.
    pub fn with_token_ttl_secs(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }

    /// Cookie name carrying the credential.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Clock leeway in seconds.
    pub fn leeway_secs(&self) -> u64 {
        self.leeway_secs
    }

    /// Lifetime of issued credentials in seconds.
    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_secs
    }

    /// Reads configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is present but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_COOKIE_NAME) {
            let name = name.trim();
            if name.is_empty() || name.contains([';', '=', ' ']) {
                return Err(ConfigError::invalid(ENV_COOKIE_NAME, "not a valid cookie name"));
            }
            config.cookie_name = name.to_string();
        }
        if let Some(raw) = lookup(ENV_LEEWAY_SECS) {
            config.leeway_secs = parse_secs(ENV_LEEWAY_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TTL_SECS) {
            let ttl = parse_secs(ENV_TTL_SECS, &raw)?;
            if ttl == 0 {
                return Err(ConfigError::invalid(ENV_TTL_SECS, "must be positive"));
            }
            config.token_ttl_secs = ttl;
        }

        Ok(config)
    }
}

fn parse_secs(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(key, "expected a whole number of seconds"))
}

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was absent
    Missing {
        /// Variable name
        key: &'static str,
    },
    /// A value was present but invalid
    Invalid {
        /// Variable name
        key: &'static str,
        /// What was wrong with it
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &'static str, reason: &'static str) -> Self {
        ConfigError::Invalid { key, reason }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { key } => write!(f, "{} is not set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}
