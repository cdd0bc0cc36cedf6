use std::fmt;

use crate::access::AccessError;
use crate::config::ConfigError;
use crate::credential::VerifyError;
use crate::ride::{RideError, TransitionError};

/// Why a presented credential was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRejection {
    /// Signature, format or expiry check failed
    Verification(VerifyError),
    /// Claims named a role outside the closed set
    UnknownRole(String),
    /// Claims carried an empty subject
    EmptySubject,
}

impl fmt::Display for CredentialRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialRejection::Verification(err) => write!(f, "{}", err),
            CredentialRejection::UnknownRole(role) => write!(f, "unknown role '{}'", role),
            CredentialRejection::EmptySubject => write!(f, "empty subject"),
        }
    }
}

/// Outcome of a failed credential check.
///
/// `MissingCredential` and `InvalidCredential` both reach the client as 401;
/// they stay distinct for logs and audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable token in header or cookie
    MissingCredential,
    /// A token was presented and rejected
    InvalidCredential(CredentialRejection),
    /// The verifier itself is misconfigured
    Fault(VerifyError),
}

impl AuthError {
    /// True unless the gate itself is broken.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Fault(_))
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "missing credential"),
            AuthError::InvalidCredential(reason) => write!(f, "invalid credential: {}", reason),
            AuthError::Fault(err) => write!(f, "credential verifier fault: {}", err),
        }
    }
}

impl std::error::Error for AuthError {}

/// Any error this crate returns, with its HTTP mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Credential check failed
    Auth(AuthError),
    /// Route allow-list refused the actor
    Access(AccessError),
    /// Ride operation failed
    Ride(RideError),
    /// Configuration could not be loaded
    Config(ConfigError),
}

impl Error {
    /// HTTP status the boundary should answer with.
    ///
    /// ```
    /// use wecare_core::{AuthError, Error};
    ///
    /// assert_eq!(Error::from(AuthError::MissingCredential).status_code(), 401);
    /// ```
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Auth(AuthError::MissingCredential | AuthError::InvalidCredential(_)) => 401,
            Error::Auth(AuthError::Fault(_)) => 500,
            Error::Access(AccessError::Forbidden { .. }) => 403,
            Error::Ride(RideError::Transition(err)) => match err {
                TransitionError::Forbidden(_) => 403,
                TransitionError::InvalidTransition { .. } => 422,
                TransitionError::AlreadyTaken { .. } => 409,
                TransitionError::VersionExhausted { .. } => 500,
            },
            Error::Ride(RideError::NotFound { .. }) => 404,
            Error::Ride(RideError::Duplicate { .. }) => 409,
            Error::Ride(RideError::Store(_)) => 500,
            Error::Config(_) => 500,
        }
    }

    /// True for expected, client-caused outcomes; false for server faults.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Auth(err) => write!(f, "{}", err),
            Error::Access(err) => write!(f, "{}", err),
            Error::Ride(err) => write!(f, "{}", err),
            Error::Config(err) => write!(f, "configuration error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Auth(err) => Some(err),
            Error::Access(err) => Some(err),
            Error::Ride(err) => Some(err),
            Error::Config(err) => Some(err),
        }
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Error::Access(err)
    }
}

impl From<RideError> for Error {
    fn from(err: RideError) -> Self {
        Error::Ride(err)
    }
}

impl From<TransitionError> for Error {
    fn from(err: TransitionError) -> Self {
        Error::Ride(RideError::Transition(err))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}
