//! Audit event schema.

use std::fmt;

/// What kind of decision an audit event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventKind {
    /// Credential check at the gate
    Authentication,
    /// Role allow-list check for a route
    RouteAccess,
    /// A new ride was created
    RideCreated,
    /// A ride status change was requested
    RideTransition,
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEventKind::Authentication => write!(f, "authentication"),
            AuditEventKind::RouteAccess => write!(f, "route_access"),
            AuditEventKind::RideCreated => write!(f, "ride_created"),
            AuditEventKind::RideTransition => write!(f, "ride_transition"),
        }
    }
}

/// Outcome of an audited decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// Allowed and applied
    Success,
    /// Rejected as a client error (missing/invalid credential, forbidden, illegal transition)
    Denied,
    /// Lost an optimistic-concurrency race
    Conflict,
    /// Server-side fault
    Error,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Success => write!(f, "success"),
            AuditOutcome::Denied => write!(f, "denied"),
            AuditOutcome::Conflict => write!(f, "conflict"),
            AuditOutcome::Error => write!(f, "error"),
        }
    }
}

/// A structured audit event holding only safe metadata.
///
/// # Example
///
/// ```
/// use wecare_core::audit::{AuditEvent, AuditEventKind, AuditOutcome};
///
/// let event = AuditEvent::new(
///     "req-42",
///     Some("driver-1"),
///     AuditEventKind::RideTransition,
///     AuditOutcome::Success,
/// )
/// .with_action("PENDING->ACCEPTED")
/// .with_resource_id("ride-9");
///
/// assert_eq!(event.subject(), Some("driver-1"));
/// assert_eq!(event.resource_id(), Some("ride-9"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    request_id: String,
    /// None when no credential was accepted
    subject: Option<String>,
    kind: AuditEventKind,
    outcome: AuditOutcome,
    action: Option<String>,
    /// Ride id or route path; never request bodies
    resource_id: Option<String>,
    reason: Option<String>,
}

impl AuditEvent {
    /// Creates an event with the required fields.
    pub fn new(
        request_id: impl Into<String>,
        subject: Option<impl Into<String>>,
        kind: AuditEventKind,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            subject: subject.map(Into::into),
            kind,
            outcome,
            action: None,
            resource_id: None,
            reason: None,
        }
    }

    /// Sets the action, e.g. `PENDING->ACCEPTED`.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the resource identifier.
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Sets a human-readable reason for a denial or fault.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Request correlation id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Acting subject, if authenticated.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Event kind.
    pub fn kind(&self) -> AuditEventKind {
        self.kind
    }

    /// Decision outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Action, if set.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Resource identifier, if set.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Reason, if set.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[kind={}, outcome={}, request_id={}, subject={}",
            self.kind,
            self.outcome,
            self.request_id,
            self.subject.as_deref().unwrap_or("<none>")
        )?;

        if let Some(action) = &self.action {
            write!(f, ", action={}", action)?;
        }
        if let Some(resource_id) = &self.resource_id {
            write!(f, ", resource_id={}", resource_id)?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ", reason={}", reason)?;
        }

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_outcome_display() {
        assert_eq!(AuditEventKind::Authentication.to_string(), "authentication");
        assert_eq!(AuditEventKind::RideTransition.to_string(), "ride_transition");
        assert_eq!(AuditOutcome::Conflict.to_string(), "conflict");
        assert_eq!(AuditOutcome::Denied.to_string(), "denied");
    }

    #[test]
    fn builder_sets_optional_fields() {
        let event = AuditEvent::new(
            "req-1",
            Some("admin-1"),
            AuditEventKind::RideTransition,
            AuditOutcome::Denied,
        )
        .with_action("COMPLETED->CANCELLED")
        .with_resource_id("ride-1")
        .with_reason("invalid transition");

        assert_eq!(event.action(), Some("COMPLETED->CANCELLED"));
        assert_eq!(event.resource_id(), Some("ride-1"));
        assert_eq!(event.reason(), Some("invalid transition"));
    }

    #[test]
    fn display_marks_missing_subject() {
        let event = AuditEvent::new(
            "req-anon",
            None::<String>,
            AuditEventKind::Authentication,
            AuditOutcome::Denied,
        )
        .with_reason("missing credential");

        let display = event.to_string();
        assert!(display.contains("subject=<none>"));
        assert!(display.contains("reason=missing credential"));
        assert!(display.ends_with(']'));
    }
}
