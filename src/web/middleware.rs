//! Middleware entry point combining the credential gate and route allow-lists.
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework request (implements ExtractCredential) or a RequestAdapter
//!   ↓
//! authenticate_request()  ── AuthGate ── RouteAccess
//!   ↓
//! AuthenticatedRequest { request_id, actor }  or  Error (401 / 403 / 500)
//!   ↓
//! Handler calls RideService with the actor
//! ```

use crate::access::RouteAccess;
use crate::actor::Actor;
use crate::audit::{AuditEvent, AuditEventKind, AuditOutcome};
use crate::credential::CredentialVerifier;
use crate::error::Error;
use crate::gate::AuthGate;

use super::ExtractCredential;

/// A request that passed the credential gate and the route allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedRequest {
    /// Correlation id
    pub request_id: String,
    /// Authenticated actor
    pub actor: Actor,
}

/// Authenticates `request` and checks its path against `access`.
///
/// Accepts [`RequestAdapter`](super::RequestAdapter) or any framework type
/// that implements [`ExtractCredential`].
///
/// # Errors
///
/// - [`Error::Auth`] from the gate (401, or 500 for verifier faults).
/// - [`Error::Access`] when the role is not allowed on the path (403).
///
/// # Examples
///
/// ```
/// use wecare_core::web::{authenticate_request, RequestAdapter};
/// use wecare_core::{AuthGate, GateConfig, Hs256Verifier, Role, RouteAccess, Secret};
///
/// let config = GateConfig::default();
/// let verifier = Hs256Verifier::new(Secret::new(b"k3y".to_vec()), &config);
/// let token = verifier.issue("c1", Role::Community).unwrap();
/// let gate = AuthGate::new(verifier, config);
/// let access = RouteAccess::wecare_defaults();
///
/// let mut adapter = RequestAdapter::new("req-1");
/// adapter.set_path("/admin/users");
/// adapter.add_cookie("token", token.expose_secret().clone());
///
/// let err = authenticate_request(&gate, &access, &adapter).unwrap_err();
/// assert_eq!(err.status_code(), 403);
/// ```
pub fn authenticate_request<V, R>(
    gate: &AuthGate<V>,
    access: &RouteAccess,
    request: &R,
) -> Result<AuthenticatedRequest, Error>
where
    V: CredentialVerifier,
    R: ExtractCredential + ?Sized,
{
    let actor = gate.authenticate(request)?;
    let request_id = request.request_id();
    let path = request.path();

    let decision = access.check(path, &actor);

    if let Some(trail) = gate.audit_trail() {
        let outcome = match decision {
            Ok(()) => AuditOutcome::Success,
            Err(_) => AuditOutcome::Denied,
        };
        let mut event = AuditEvent::new(
            request_id,
            Some(actor.subject_id.as_str()),
            AuditEventKind::RouteAccess,
            outcome,
        )
        .with_resource_id(path);
        if let Err(err) = &decision {
            event = event.with_reason(err.to_string());
        }
        trail.record(event);
    }

    if let Err(err) = decision {
        tracing::warn!(
            request_id = %request_id,
            subject_id = %actor.subject_id,
            role = %actor.role,
            path = %path,
            "route access denied"
        );
        return Err(err.into());
    }

    Ok(AuthenticatedRequest {
        request_id: request_id.to_string(),
        actor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditTrail;
    use crate::error::AuthError;
    use crate::web::RequestAdapter;
    use crate::{GateConfig, Hs256Verifier, Role, Secret};
    use std::sync::Arc;

    fn setup() -> (AuthGate<Hs256Verifier>, Hs256Verifier, Arc<AuditTrail>) {
        let config = GateConfig::default();
        let trail = Arc::new(AuditTrail::new());
        let verifier = Hs256Verifier::new(Secret::new(b"mw-key".to_vec()), &config);
        let gate = AuthGate::new(verifier, config.clone()).with_audit(Arc::clone(&trail));
        let issuer = Hs256Verifier::new(Secret::new(b"mw-key".to_vec()), &config);
        (gate, issuer, trail)
    }

    fn request(path: &str, token: Option<&Secret<String>>) -> RequestAdapter {
        let mut adapter = RequestAdapter::new("req-mw");
        adapter.set_path(path);
        if let Some(token) = token {
            adapter.add_header("Authorization", format!("Bearer {}", token.expose_secret()));
        }
        adapter
    }

    #[test]
    fn allowed_role_passes() {
        let (gate, issuer, trail) = setup();
        let token = issuer.issue("d1", Role::Driver).unwrap();

        let access = RouteAccess::wecare_defaults();
        let authed =
            authenticate_request(&gate, &access, &request("/driver/rides", Some(&token))).unwrap();

        assert_eq!(authed.request_id, "req-mw");
        assert_eq!(authed.actor, Actor::new("d1", Role::Driver));
        let kinds: Vec<_> = trail.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![AuditEventKind::Authentication, AuditEventKind::RouteAccess]);
    }

    #[test]
    fn missing_credential_stops_before_route_check() {
        let (gate, _, trail) = setup();

        let access = RouteAccess::wecare_defaults();
        let err = authenticate_request(&gate, &access, &request("/driver", None)).unwrap_err();

        assert_eq!(err, Error::Auth(AuthError::MissingCredential));
        assert_eq!(err.status_code(), 401);
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn wrong_role_is_forbidden() {
        let (gate, issuer, trail) = setup();
        let token = issuer.issue("x1", Role::Executive).unwrap();

        let access = RouteAccess::wecare_defaults();
        let err = authenticate_request(&gate, &access, &request("/api/admin/users", Some(&token)))
            .unwrap_err();

        assert_eq!(err.status_code(), 403);
        let last = trail.events().pop().unwrap();
        assert_eq!(last.kind(), AuditEventKind::RouteAccess);
        assert_eq!(last.outcome(), AuditOutcome::Denied);
        assert_eq!(last.resource_id(), Some("/api/admin/users"));
    }

    struct FrameworkRequest {
        uri: &'static str,
        bearer: String,
    }

    impl ExtractCredential for FrameworkRequest {
        fn request_id(&self) -> &str {
            "req-framework"
        }

        fn path(&self) -> &str {
            self.uri
        }

        fn header(&self, name: &str) -> Option<&str> {
            name.eq_ignore_ascii_case("authorization")
                .then_some(self.bearer.as_str())
        }

        fn cookie(&self, _name: &str) -> Option<&str> {
            None
        }
    }

    #[test]
    fn framework_request_gets_route_check() {
        let (gate, issuer, trail) = setup();
        let token = issuer.issue("c1", Role::Community).unwrap();
        let access = RouteAccess::wecare_defaults();

        let allowed = FrameworkRequest {
            uri: "/community/rides",
            bearer: format!("Bearer {}", token.expose_secret()),
        };
        let authed = authenticate_request(&gate, &access, &allowed).unwrap();
        assert_eq!(authed.request_id, "req-framework");

        let denied = FrameworkRequest {
            uri: "/driver/rides",
            bearer: format!("Bearer {}", token.expose_secret()),
        };
        let err = authenticate_request(&gate, &access, &denied).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(
            trail.events().pop().unwrap().resource_id(),
            Some("/driver/rides")
        );
    }
}
