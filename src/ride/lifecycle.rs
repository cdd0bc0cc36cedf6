use std::fmt;

use crate::actor::Actor;
use crate::role::Role;

use super::{Ride, RideStatus};

/// One legal edge of the ride state machine and the roles allowed to take it.
struct Edge {
    from: RideStatus,
    to: RideStatus,
    roles: &'static [Role],
}

// Developer is folded into Admin before lookup.
const EDGES: [Edge; 5] = [
    Edge {
        from: RideStatus::Pending,
        to: RideStatus::Accepted,
        roles: &[Role::Driver],
    },
    Edge {
        from: RideStatus::Pending,
        to: RideStatus::Cancelled,
        roles: &[Role::Community, Role::Admin],
    },
    Edge {
        from: RideStatus::Accepted,
        to: RideStatus::InProgress,
        roles: &[Role::Driver],
    },
    Edge {
        from: RideStatus::Accepted,
        to: RideStatus::Cancelled,
        roles: &[Role::Driver, Role::Admin],
    },
    Edge {
        from: RideStatus::InProgress,
        to: RideStatus::Completed,
        roles: &[Role::Driver],
    },
];

/// Roles allowed to move a ride from `from` to `to`, or `None` when the
/// edge does not exist.
///
/// ```
/// use wecare_core::{allowed_roles, Role, RideStatus};
///
/// assert_eq!(
///     allowed_roles(RideStatus::Pending, RideStatus::Accepted),
///     Some(&[Role::Driver][..])
/// );
/// assert_eq!(allowed_roles(RideStatus::Completed, RideStatus::Cancelled), None);
/// ```
pub fn allowed_roles(from: RideStatus, to: RideStatus) -> Option<&'static [Role]> {
    EDGES
        .iter()
        .find(|edge| edge.from == from && edge.to == to)
        .map(|edge| edge.roles)
}

/// Why an actor was refused although the ride itself may be in a legal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// A driver acted on a ride assigned to someone else, or on an
    /// unassigned ride for anything other than accepting it
    NotAssignedDriver,
    /// A driver tried to accept a pending ride that already names a driver
    AlreadyAssigned,
    /// A community member acted on a ride they did not request
    NotRequester,
    /// The edge exists but the actor's role may not take it
    RoleNotPermitted {
        /// Acting role
        role: Role,
        /// Current status
        from: RideStatus,
        /// Requested status
        to: RideStatus,
    },
    /// The actor's role may not request rides
    CannotCreate {
        /// Acting role
        role: Role,
    },
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenReason::NotAssignedDriver => write!(f, "actor is not the assigned driver"),
            ForbiddenReason::AlreadyAssigned => write!(f, "ride already has a driver"),
            ForbiddenReason::NotRequester => write!(f, "actor did not request this ride"),
            ForbiddenReason::RoleNotPermitted { role, from, to } => {
                write!(f, "role {} may not move a ride from {} to {}", role, from, to)
            }
            ForbiddenReason::CannotCreate { role } => {
                write!(f, "role {} may not request rides", role)
            }
        }
    }
}

/// A refused ride transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Actor lacks the role or ownership for the change
    Forbidden(ForbiddenReason),
    /// `to` is not reachable from `from` for any actor
    InvalidTransition {
        /// Current status
        from: RideStatus,
        /// Requested status
        to: RideStatus,
    },
    /// The snapshot the decision was made on is stale
    AlreadyTaken {
        /// Ride that changed underneath the caller
        ride_id: String,
    },
    /// The snapshot's version counter cannot be advanced
    VersionExhausted {
        /// Ride whose version is at its maximum
        ride_id: String,
    },
}

impl TransitionError {
    /// True when the server, not the caller, is at fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, TransitionError::VersionExhausted { .. })
    }
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::Forbidden(reason) => write!(f, "forbidden: {}", reason),
            TransitionError::InvalidTransition { from, to } => {
                write!(f, "invalid transition {} -> {}", from, to)
            }
            TransitionError::AlreadyTaken { ride_id } => {
                write!(f, "ride '{}' was modified concurrently; re-fetch and retry", ride_id)
            }
            TransitionError::VersionExhausted { ride_id } => {
                write!(f, "ride '{}' version counter is exhausted", ride_id)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Decides whether `actor` may move `ride` to `target` and returns the next
/// snapshot.
///
/// Ownership is checked first, then the state machine, then the role allowed
/// on the edge. The input snapshot is not modified.
///
/// # Errors
///
/// - [`TransitionError::Forbidden`] for a driver acting on someone else's
///   ride, a community member acting on a ride they did not request, or a
///   role not allowed on the edge.
/// - [`TransitionError::InvalidTransition`] when `(status, target)` is not an
///   edge, including re-applying a transition that already happened.
/// - [`TransitionError::VersionExhausted`] when `ride.version` is `u64::MAX`.
///
/// # Examples
///
/// ```
/// use wecare_core::{decide_transition, Actor, Ride, RideStatus, Role};
///
/// let ride = Ride::pending("r1", "c1");
/// let driver = Actor::new("d1", Role::Driver);
///
/// let accepted = decide_transition(&ride, &driver, RideStatus::Accepted).unwrap();
/// assert_eq!(accepted.status, RideStatus::Accepted);
/// assert_eq!(accepted.driver_id.as_deref(), Some("d1"));
/// assert_eq!(accepted.version, 1);
/// ```
pub fn decide_transition(
    ride: &Ride,
    actor: &Actor,
    target: RideStatus,
) -> Result<Ride, TransitionError> {
    check_ownership(ride, actor, target)?;

    let from = ride.status;
    if from.is_terminal() {
        return Err(TransitionError::InvalidTransition { from, to: target });
    }
    let roles = allowed_roles(from, target)
        .ok_or(TransitionError::InvalidTransition { from, to: target })?;

    let effective_role = if actor.role.is_administrative() {
        Role::Admin
    } else {
        actor.role
    };
    if !roles.contains(&effective_role) {
        return Err(TransitionError::Forbidden(ForbiddenReason::RoleNotPermitted {
            role: actor.role,
            from,
            to: target,
        }));
    }

    let version = ride
        .version
        .checked_add(1)
        .ok_or_else(|| TransitionError::VersionExhausted {
            ride_id: ride.id.clone(),
        })?;

    let driver_id = match target {
        RideStatus::Accepted => Some(actor.subject_id.clone()),
        RideStatus::Cancelled => None,
        _ => ride.driver_id.clone(),
    };

    Ok(Ride {
        id: ride.id.clone(),
        status: target,
        driver_id,
        requester_id: ride.requester_id.clone(),
        version,
    })
}

fn check_ownership(
    ride: &Ride,
    actor: &Actor,
    target: RideStatus,
) -> Result<(), TransitionError> {
    if actor.role.is_administrative() {
        return Ok(());
    }
    match actor.role {
        Role::Driver => {
            let accepts_pending =
                ride.status == RideStatus::Pending && target == RideStatus::Accepted;
            if accepts_pending && ride.driver_id.is_some() {
                return Err(TransitionError::Forbidden(ForbiddenReason::AlreadyAssigned));
            }
            let owns = match &ride.driver_id {
                None => target == RideStatus::Accepted,
                Some(_) => ride.is_driven_by(&actor.subject_id),
            };
            if !owns {
                return Err(TransitionError::Forbidden(ForbiddenReason::NotAssignedDriver));
            }
        }
        Role::Community => {
            if !actor.is(&ride.requester_id) {
                return Err(TransitionError::Forbidden(ForbiddenReason::NotRequester));
            }
        }
        _ => {}
    }
    Ok(())
}
