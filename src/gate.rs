use std::sync::Arc;

use crate::{
    actor::Actor,
    audit::{AuditEvent, AuditEventKind, AuditOutcome, AuditTrail},
    config::GateConfig,
    credential::CredentialVerifier,
    error::{AuthError, CredentialRejection},
    logging::RequestLog,
    role::Role,
    secret::Secret,
    web::{extract_credential, ExtractCredential},
};

/// The credential gate.
///
/// `AuthGate` turns a request's credential material into an [`Actor`], or a
/// typed [`AuthError`]. The verifier and its key are injected here; nothing
/// is looked up globally.
///
/// # Examples
///
/// ```
/// use wecare_core::web::RequestAdapter;
/// use wecare_core::{AuthError, AuthGate, GateConfig, Hs256Verifier, Role, Secret};
///
/// let config = GateConfig::default();
/// let verifier = Hs256Verifier::new(Secret::new(b"portal-signing-key".to_vec()), &config);
/// let token = verifier.issue("d1", Role::Driver).unwrap();
/// let gate = AuthGate::new(verifier, config);
///
/// let mut request = RequestAdapter::new("req-1");
/// request.add_header("Authorization", format!("Bearer {}", token.expose_secret()));
/// let actor = gate.authenticate(&request).unwrap();
/// assert_eq!(actor.subject_id, "d1");
/// assert_eq!(actor.role, Role::Driver);
///
/// let anonymous = RequestAdapter::new("req-2");
/// assert_eq!(gate.authenticate(&anonymous), Err(AuthError::MissingCredential));
/// ```
pub struct AuthGate<V> {
    verifier: V,
    config: GateConfig,
    audit: Option<Arc<AuditTrail>>,
}

impl<V: CredentialVerifier> AuthGate<V> {
    /// Creates a gate around `verifier`.
    pub fn new(verifier: V, config: GateConfig) -> Self {
        Self {
            verifier,
            config,
            audit: None,
        }
    }

    /// Records one `Authentication` event per call to `trail`.
    pub fn with_audit(mut self, trail: Arc<AuditTrail>) -> Self {
        self.audit = Some(trail);
        self
    }

    /// The gate's configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub(crate) fn audit_trail(&self) -> Option<&Arc<AuditTrail>> {
        self.audit.as_ref()
    }

    /// Authenticates a request.
    ///
    /// The `Authorization: Bearer` header is consulted first, then the
    /// configured cookie.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredential`] when no usable token is present.
    /// - [`AuthError::InvalidCredential`] when a token is present but fails.
    /// - [`AuthError::Fault`] when the verifier cannot run.
    pub fn authenticate<R>(&self, request: &R) -> Result<Actor, AuthError>
    where
        R: ExtractCredential + ?Sized,
    {
        let log = RequestLog::new(request.request_id());

        let result = match extract_credential(request, self.config.cookie_name()) {
            Some(token) => self.authenticate_token(&token),
            None => Err(AuthError::MissingCredential),
        };

        match &result {
            Ok(actor) => log.debug(format_args!(
                "authenticated {} as {}",
                actor.subject_id, actor.role
            )),
            Err(AuthError::MissingCredential) => log.debug(format_args!("no credential presented")),
            Err(err @ AuthError::InvalidCredential(_)) => log.warn(format_args!("{}", err)),
            Err(err @ AuthError::Fault(_)) => log.error(format_args!("{}", err)),
        }

        if let Some(trail) = &self.audit {
            trail.record(authentication_event(request.request_id(), &result));
        }

        result
    }

    /// Verifies an already-extracted token and normalizes its role.
    ///
    /// # Errors
    ///
    /// Same as [`authenticate`](Self::authenticate), minus the missing case
    /// for non-blank tokens.
    pub fn authenticate_token(&self, token: &Secret<String>) -> Result<Actor, AuthError> {
        if token.is_blank() {
            return Err(AuthError::MissingCredential);
        }

        let claims = self.verifier.verify(token).map_err(|err| {
            if err.is_fault() {
                AuthError::Fault(err)
            } else {
                AuthError::InvalidCredential(CredentialRejection::Verification(err))
            }
        })?;

        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidCredential(CredentialRejection::EmptySubject));
        }
        let role: Role = claims
            .role
            .parse()
            .map_err(|_| {
                AuthError::InvalidCredential(CredentialRejection::UnknownRole(claims.role.clone()))
            })?;

        Ok(Actor::new(claims.sub, role))
    }
}

fn authentication_event(request_id: &str, result: &Result<Actor, AuthError>) -> AuditEvent {
    match result {
        Ok(actor) => AuditEvent::new(
            request_id,
            Some(actor.subject_id.as_str()),
            AuditEventKind::Authentication,
            AuditOutcome::Success,
        )
        .with_action(actor.role.as_str()),
        Err(err) => {
            let outcome = if err.is_client_error() {
                AuditOutcome::Denied
            } else {
                AuditOutcome::Error
            };
            AuditEvent::new(request_id, None::<String>, AuditEventKind::Authentication, outcome)
                .with_reason(err.to_string())
        }
    }
}
