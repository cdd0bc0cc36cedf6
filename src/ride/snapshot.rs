use serde::{Deserialize, Serialize};

use super::RideStatus;

/// A point-in-time read of a ride's persisted fields.
///
/// Snapshots are compared whole (including `version`) when a transition is
/// written back, so a stale snapshot can never overwrite a newer ride.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ride {
    /// Ride identifier
    pub id: String,
    /// Current status
    pub status: RideStatus,
    /// Subject id of the assigned driver
    pub driver_id: Option<String>,
    /// Subject id of the community member who requested the ride
    pub requester_id: String,
    /// Incremented on every applied transition
    pub version: u64,
}

impl Ride {
    /// A freshly requested ride: pending, unassigned, version 0.
    ///
    /// ```
    /// use wecare_core::{Ride, RideStatus};
    ///
    /// let ride = Ride::pending("r1", "c1");
    /// assert_eq!(ride.status, RideStatus::Pending);
    /// assert!(ride.driver_id.is_none());
    /// assert!(ride.is_consistent());
    /// ```
    pub fn pending(id: impl Into<String>, requester_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: RideStatus::Pending,
            driver_id: None,
            requester_id: requester_id.into(),
            version: 0,
        }
    }

    /// True when the driver assignment agrees with the status.
    pub fn is_consistent(&self) -> bool {
        self.driver_id.is_some() == self.status.requires_driver()
    }

    /// True when `subject_id` is the assigned driver.
    pub fn is_driven_by(&self, subject_id: &str) -> bool {
        self.driver_id.as_deref() == Some(subject_id)
    }
}
