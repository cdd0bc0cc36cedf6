//! Ride lifecycle.
//!
//! [`decide_transition`] is the single authority on whether a ride may change
//! status. It is pure: it takes a snapshot and returns the next snapshot.
//! Persisting that snapshot is the job of a [`RideStore`], which must apply it
//! with compare-and-swap; [`RideService`] wires the two together.
//!
//! ```text
//! PENDING ──accept──▶ ACCEPTED ──start──▶ IN_PROGRESS ──complete──▶ COMPLETED
//!    │                   │
//!    └──cancel──▶ CANCELLED ◀──cancel──┘
//! ```

mod lifecycle;
mod service;
mod snapshot;
mod status;
mod store;

pub use lifecycle::{allowed_roles, decide_transition, ForbiddenReason, TransitionError};
pub use service::{RideError, RideService};
pub use snapshot::Ride;
pub use status::RideStatus;
pub use store::{InMemoryRideStore, RideStore, StoreError};
