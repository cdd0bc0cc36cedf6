use wecare_core::web::RequestAdapter;
use wecare_core::{
    decide_transition, Actor, AuthError, AuthGate, Error, ForbiddenReason, GateConfig,
    Hs256Verifier, Ride, RideStatus, Role, Secret, TransitionError,
};

fn ride(status: RideStatus, driver: Option<&str>) -> Ride {
    Ride {
        id: "r1".to_string(),
        status,
        driver_id: driver.map(str::to_string),
        requester_id: "c1".to_string(),
        version: 0,
    }
}

#[test]
fn driver_accepts_pending_ride() {
    let d1 = Actor::new("d1", Role::Driver);

    let pending = ride(RideStatus::Pending, None);
    let next = decide_transition(&pending, &d1, RideStatus::Accepted).unwrap();

    assert_eq!(next.id, "r1");
    assert_eq!(next.status, RideStatus::Accepted);
    assert_eq!(next.driver_id.as_deref(), Some("d1"));
}

#[test]
fn second_driver_is_forbidden_after_accept() {
    let d1 = Actor::new("d1", Role::Driver);
    let d2 = Actor::new("d2", Role::Driver);
    let pending = ride(RideStatus::Pending, None);
    let accepted = decide_transition(&pending, &d1, RideStatus::Accepted).unwrap();

    let err = decide_transition(&accepted, &d2, RideStatus::Accepted).unwrap_err();

    assert_eq!(err, TransitionError::Forbidden(ForbiddenReason::NotAssignedDriver));
    assert_eq!(Error::from(err).status_code(), 403);
}

#[test]
fn assigned_driver_completes_ride() {
    let d1 = Actor::new("d1", Role::Driver);

    let in_progress = ride(RideStatus::InProgress, Some("d1"));
    let next = decide_transition(&in_progress, &d1, RideStatus::Completed).unwrap();

    assert_eq!(next.status, RideStatus::Completed);
    assert_eq!(next.driver_id.as_deref(), Some("d1"));
}

#[test]
fn completing_twice_is_invalid() {
    let d1 = Actor::new("d1", Role::Driver);

    let completed = ride(RideStatus::Completed, Some("d1"));
    let err = decide_transition(&completed, &d1, RideStatus::Completed).unwrap_err();

    assert_eq!(
        err,
        TransitionError::InvalidTransition {
            from: RideStatus::Completed,
            to: RideStatus::Completed,
        }
    );
}

#[test]
fn other_driver_cannot_complete() {
    let d2 = Actor::new("d2", Role::Driver);

    let in_progress = ride(RideStatus::InProgress, Some("d1"));
    let err = decide_transition(&in_progress, &d2, RideStatus::Completed).unwrap_err();

    assert!(matches!(err, TransitionError::Forbidden(_)));
}

#[test]
fn admin_cancels_open_rides_only() {
    let admin = Actor::new("a1", Role::Admin);

    for (status, driver) in [(RideStatus::Pending, None), (RideStatus::Accepted, Some("d1"))] {
        let next = decide_transition(&ride(status, driver), &admin, RideStatus::Cancelled).unwrap();
        assert_eq!(next.status, RideStatus::Cancelled);
        assert!(next.is_consistent());
    }

    let completed = ride(RideStatus::Completed, Some("d1"));
    let err = decide_transition(&completed, &admin, RideStatus::Cancelled).unwrap_err();
    assert!(matches!(err, TransitionError::InvalidTransition { .. }));
}

#[test]
fn lowercase_bearer_is_missing_credential() {
    let config = GateConfig::default();
    let gate = AuthGate::new(
        Hs256Verifier::new(Secret::new(b"integration-key".to_vec()), &config),
        config,
    );
    let mut request = RequestAdapter::new("req-lower");
    request.add_header("Authorization", "bearer abc");

    assert_eq!(gate.authenticate(&request), Err(AuthError::MissingCredential));
}

#[test]
fn secret_is_fully_redacted() {
    let token = Secret::new("eyJhbGciOiJIUzI1NiJ9.e30.sig".to_string());

    let debug_out = format!("{:?}", token);
    assert_eq!(debug_out, "[REDACTED]");
    assert!(!debug_out.contains("eyJ"));
    assert!(!debug_out.contains("String"));

    assert_eq!(format!("{}", token), "[REDACTED]");
}
