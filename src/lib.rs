//! Credential gate and ride lifecycle for the WeCare care-coordination portal.
//!
//! This crate holds the two pieces of server logic every portal request
//! passes through:
//! - **Credential gate**: a bearer token from the `Authorization` header or a
//!   cookie becomes an authenticated [`Actor`], or a typed [`AuthError`]
//! - **Route allow-lists**: role-to-path-prefix rules checked after the gate
//! - **Ride lifecycle**: a closed state machine over [`RideStatus`] with a
//!   per-edge role guard and compare-and-swap persistence
//!
//! # Core Types
//!
//! - [`AuthGate`]: verifies credentials and produces an [`Actor`]
//! - [`Hs256Verifier`]: HMAC-SHA256 JWT verifier, key injected at construction
//! - [`RouteAccess`]: longest-prefix role allow-list
//! - [`decide_transition`]: pure lifecycle decision
//! - [`RideService`]: fetch, decide, compare-and-swap, audit
//! - [`Secret<T>`]: wrapper that redacts tokens and keys in logs/output
//!
//! # Examples
//!
//! ```
//! use wecare_core::web::RequestAdapter;
//! use wecare_core::{
//!     AuthGate, GateConfig, Hs256Verifier, InMemoryRideStore, RideService, RideStatus, Role,
//!     Secret,
//! };
//!
//! let config = GateConfig::default();
//! let key = Secret::new(b"portal-signing-key".to_vec());
//! let issuer = Hs256Verifier::new(Secret::new(b"portal-signing-key".to_vec()), &config);
//! let gate = AuthGate::new(Hs256Verifier::new(key, &config), config);
//! let rides = RideService::new(InMemoryRideStore::new());
//!
//! // A community member requests a ride.
//! let mut request = RequestAdapter::new("req-1");
//! let token = issuer.issue("c1", Role::Community).unwrap();
//! request.add_cookie("token", token.expose_secret().clone());
//! let member = gate.authenticate(&request).unwrap();
//! rides.create("req-1", &member, "r1").unwrap();
//!
//! // A driver accepts it.
//! let mut request = RequestAdapter::new("req-2");
//! let token = issuer.issue("d1", Role::Driver).unwrap();
//! request.add_header("Authorization", format!("Bearer {}", token.expose_secret()));
//! let driver = gate.authenticate(&request).unwrap();
//! let ride = rides.transition("req-2", &driver, "r1", RideStatus::Accepted).unwrap();
//!
//! assert_eq!(ride.driver_id.as_deref(), Some("d1"));
//! assert_eq!(ride.version, 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod actor;
pub mod audit;
mod config;
mod credential;
mod error;
mod gate;
mod logging;
mod ride;
mod role;
mod secret;
pub mod web;

pub use access::{AccessError, RouteAccess, RouteRule};
pub use actor::Actor;
pub use config::{ConfigError, GateConfig};
pub use credential::{Claims, CredentialVerifier, Hs256Verifier, VerifyError};
pub use error::{AuthError, CredentialRejection, Error};
pub use gate::AuthGate;
pub use logging::RequestLog;
pub use ride::{
    allowed_roles, decide_transition, ForbiddenReason, InMemoryRideStore, Ride, RideError,
    RideService, RideStatus, RideStore, StoreError, TransitionError,
};
pub use role::{Role, UnknownRole};
pub use secret::Secret;
