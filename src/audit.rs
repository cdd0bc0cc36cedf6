//! Audit trail for authentication and ride decisions.
//!
//! Every credential check, route check, and ride transition can be recorded
//! as an [`AuditEvent`]. Events carry identifiers and outcomes only; token
//! material never reaches them.

mod event;
mod trail;

pub use event::{AuditEvent, AuditEventKind, AuditOutcome};
pub use trail::AuditTrail;
