//! In-memory audit trail.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::AuditEvent;

/// Records audit events in memory and mirrors them to `tracing`.
///
/// Shared between the gate and the ride service behind an `Arc`; recording
/// takes `&self`.
///
/// # Example
///
/// ```
/// use wecare_core::audit::{AuditTrail, AuditEvent, AuditEventKind, AuditOutcome};
///
/// let trail = AuditTrail::new();
/// trail.record(AuditEvent::new(
///     "req-1",
///     Some("community-3"),
///     AuditEventKind::RideCreated,
///     AuditOutcome::Success,
/// ));
///
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<AuditEvent>>,
}

impl AuditTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `event` as a structured `tracing` record and stores it.
    pub fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "wecare_audit",
            request_id = %event.request_id(),
            subject = ?event.subject(),
            kind = %event.kind(),
            outcome = %event.outcome(),
            action = ?event.action(),
            resource_id = ?event.resource_id(),
            reason = ?event.reason(),
            "audit event"
        );
        self.lock().push(event);
    }

    /// Returns a copy of every recorded event, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.lock().clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section is a single Vec call; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditEventKind, AuditOutcome};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_empty() {
        let trail = AuditTrail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
    }

    #[test]
    fn records_in_order() {
        let trail = AuditTrail::new();
        trail.record(AuditEvent::new(
            "req-1",
            Some("d1"),
            AuditEventKind::Authentication,
            AuditOutcome::Success,
        ));
        trail.record(AuditEvent::new(
            "req-2",
            Some("d1"),
            AuditEventKind::RideTransition,
            AuditOutcome::Conflict,
        ));

        let events = trail.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].request_id(), "req-1");
        assert_eq!(events[1].outcome(), AuditOutcome::Conflict);
    }

    #[test]
    fn shared_across_threads() {
        let trail = Arc::new(AuditTrail::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let trail = Arc::clone(&trail);
                thread::spawn(move || {
                    trail.record(AuditEvent::new(
                        format!("req-{}", i),
                        None::<String>,
                        AuditEventKind::RouteAccess,
                        AuditOutcome::Success,
                    ));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(trail.len(), 4);
    }
}
