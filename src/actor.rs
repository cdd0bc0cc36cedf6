use crate::role::Role;

/// The authenticated identity attempting an operation.
///
/// Produced by [`AuthGate`](crate::AuthGate) after a credential verifies;
/// consumed by route checks and ride transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Subject identifier of the acting user
    pub subject_id: String,
    /// Normalized role
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    pub fn new(subject_id: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id: subject_id.into(),
            role,
        }
    }

    /// Returns true when this actor's subject id equals `other`.
    pub fn is(&self, other: &str) -> bool {
        self.subject_id == other
    }
}
