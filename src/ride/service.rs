use std::fmt;
use std::sync::Arc;

use crate::actor::Actor;
use crate::audit::{AuditEvent, AuditEventKind, AuditOutcome, AuditTrail};
use crate::logging::RequestLog;
use crate::role::Role;

use super::{
    decide_transition, ForbiddenReason, Ride, RideStatus, RideStore, StoreError, TransitionError,
};

/// Failure of a ride operation run through [`RideService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideError {
    /// The lifecycle refused the change, or the compare-and-swap lost a race
    Transition(TransitionError),
    /// No such ride
    NotFound {
        /// Requested ride id
        ride_id: String,
    },
    /// A ride with this id already exists
    Duplicate {
        /// Requested ride id
        ride_id: String,
    },
    /// Store fault
    Store(StoreError),
}

impl RideError {
    /// True for errors caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        match self {
            RideError::Transition(err) => !err.is_fault(),
            RideError::Store(_) => false,
            RideError::NotFound { .. } | RideError::Duplicate { .. } => true,
        }
    }
}

impl fmt::Display for RideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RideError::Transition(err) => write!(f, "{}", err),
            RideError::NotFound { ride_id } => write!(f, "ride '{}' not found", ride_id),
            RideError::Duplicate { ride_id } => write!(f, "ride '{}' already exists", ride_id),
            RideError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RideError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RideError::Transition(err) => Some(err),
            RideError::Store(err) => Some(err),
            RideError::NotFound { .. } | RideError::Duplicate { .. } => None,
        }
    }
}

impl From<TransitionError> for RideError {
    fn from(err: TransitionError) -> Self {
        RideError::Transition(err)
    }
}

impl From<StoreError> for RideError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(ride_id) => RideError::NotFound { ride_id },
            StoreError::Duplicate(ride_id) => RideError::Duplicate { ride_id },
            StoreError::Conflict(ride_id) => {
                RideError::Transition(TransitionError::AlreadyTaken { ride_id })
            }
            other @ (StoreError::Unavailable(_) | StoreError::IdMismatch { .. }) => {
                RideError::Store(other)
            }
        }
    }
}

/// Runs ride operations against a store: fetch, decide, compare-and-swap.
///
/// A lost compare-and-swap is reported as
/// [`TransitionError::AlreadyTaken`] and never retried here; the caller
/// re-fetches and decides again.
///
/// # Examples
///
/// ```
/// use wecare_core::{Actor, InMemoryRideStore, RideService, RideStatus, Role};
///
/// let service = RideService::new(InMemoryRideStore::new());
/// let requester = Actor::new("c1", Role::Community);
/// let driver = Actor::new("d1", Role::Driver);
///
/// service.create("req-1", &requester, "r1").unwrap();
/// let ride = service.transition("req-2", &driver, "r1", RideStatus::Accepted).unwrap();
///
/// assert_eq!(ride.driver_id.as_deref(), Some("d1"));
/// ```
pub struct RideService<S> {
    store: S,
    audit: Option<Arc<AuditTrail>>,
}

impl<S: RideStore> RideService<S> {
    /// Creates a service over `store`.
    pub fn new(store: S) -> Self {
        Self { store, audit: None }
    }

    /// Records every decision to `trail`.
    pub fn with_audit(mut self, trail: Arc<AuditTrail>) -> Self {
        self.audit = Some(trail);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Requests a new ride on behalf of `actor`.
    ///
    /// Community members request for themselves; admins and developers may
    /// also open rides (recorded with themselves as requester).
    ///
    /// # Errors
    ///
    /// - [`ForbiddenReason::CannotCreate`] for drivers, officers, executives.
    /// - [`RideError::Duplicate`] when `ride_id` exists.
    pub fn create(
        &self,
        request_id: &str,
        actor: &Actor,
        ride_id: impl Into<String>,
    ) -> Result<Ride, RideError> {
        let ride = Ride::pending(ride_id, actor.subject_id.clone());
        let log = RequestLog::new(request_id);

        let result = match actor.role {
            Role::Community | Role::Admin | Role::Developer => self
                .store
                .insert(ride.clone())
                .map(|()| ride.clone())
                .map_err(RideError::from),
            role => Err(RideError::Transition(TransitionError::Forbidden(
                ForbiddenReason::CannotCreate { role },
            ))),
        };

        match &result {
            Ok(_) => log.info(format_args!("ride {} requested by {}", ride.id, actor.subject_id)),
            Err(err) => log.warn(format_args!("ride {} not created: {}", ride.id, err)),
        }
        self.record(
            request_id,
            actor,
            AuditEventKind::RideCreated,
            &ride.id,
            "CREATE".to_string(),
            &result,
            None,
        );
        result
    }

    /// Fetches `ride_id`, decides the transition to `target`, and writes it
    /// back with compare-and-swap.
    ///
    /// # Errors
    ///
    /// - [`RideError::NotFound`] for an unknown ride.
    /// - [`RideError::Transition`] with `Forbidden` or `InvalidTransition`
    ///   from [`decide_transition`], or `AlreadyTaken` when the ride changed
    ///   between the read and the write.
    /// - [`RideError::Store`] for store faults.
    pub fn transition(
        &self,
        request_id: &str,
        actor: &Actor,
        ride_id: &str,
        target: RideStatus,
    ) -> Result<Ride, RideError> {
        let snapshot = match self.store.fetch(ride_id) {
            Ok(ride) => ride,
            Err(err) => {
                let err = RideError::from(err);
                let result = Err(err.clone());
                self.record(
                    request_id,
                    actor,
                    AuditEventKind::RideTransition,
                    ride_id,
                    format!("?->{}", target),
                    &result,
                    None,
                );
                return Err(err);
            }
        };

        let action = format!("{}->{}", snapshot.status, target);
        let result = self.apply(&snapshot, actor, target);

        match &result {
            Ok(next) => tracing::info!(
                request_id = %request_id,
                ride_id = %ride_id,
                subject_id = %actor.subject_id,
                role = %actor.role,
                from = %snapshot.status,
                to = %next.status,
                "ride transition applied"
            ),
            Err(err) if err.is_client_error() => tracing::warn!(
                request_id = %request_id,
                ride_id = %ride_id,
                subject_id = %actor.subject_id,
                role = %actor.role,
                from = %snapshot.status,
                to = %target,
                error = %err,
                "ride transition refused"
            ),
            Err(err) => tracing::error!(
                request_id = %request_id,
                ride_id = %ride_id,
                error = %err,
                "ride operation fault"
            ),
        }

        // The snapshot drops the driver on cancel; the audit event keeps it.
        let released = match &result {
            Ok(next) if next.driver_id.is_none() => snapshot.driver_id.as_deref(),
            _ => None,
        };
        self.record(
            request_id,
            actor,
            AuditEventKind::RideTransition,
            ride_id,
            action,
            &result,
            released,
        );
        result
    }

    fn apply(&self, snapshot: &Ride, actor: &Actor, target: RideStatus) -> Result<Ride, RideError> {
        let next = decide_transition(snapshot, actor, target)?;
        self.store.compare_and_swap(snapshot, next.clone())?;
        Ok(next)
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        request_id: &str,
        actor: &Actor,
        kind: AuditEventKind,
        ride_id: &str,
        action: String,
        result: &Result<Ride, RideError>,
        released_driver: Option<&str>,
    ) {
        let Some(trail) = &self.audit else {
            return;
        };

        let outcome = match result {
            Ok(_) => AuditOutcome::Success,
            Err(RideError::Transition(TransitionError::AlreadyTaken { .. })) => {
                AuditOutcome::Conflict
            }
            Err(err) if !err.is_client_error() => AuditOutcome::Error,
            Err(_) => AuditOutcome::Denied,
        };

        let mut event = AuditEvent::new(request_id, Some(actor.subject_id.as_str()), kind, outcome)
            .with_action(action)
            .with_resource_id(ride_id);
        match (result, released_driver) {
            (Err(err), _) => event = event.with_reason(err.to_string()),
            (Ok(_), Some(driver)) => {
                event = event.with_reason(format!("released driver {}", driver))
            }
            (Ok(_), None) => {}
        }
        trail.record(event);
    }
}
