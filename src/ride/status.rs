use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    /// Requested, no driver yet
    Pending,
    /// A driver has taken the ride
    Accepted,
    /// Driver has picked up the patient
    InProgress,
    /// Delivered (terminal)
    Completed,
    /// Called off (terminal)
    Cancelled,
}

impl RideStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [RideStatus; 5] = [
        RideStatus::Pending,
        RideStatus::Accepted,
        RideStatus::InProgress,
        RideStatus::Completed,
        RideStatus::Cancelled,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Pending => "PENDING",
            RideStatus::Accepted => "ACCEPTED",
            RideStatus::InProgress => "IN_PROGRESS",
            RideStatus::Completed => "COMPLETED",
            RideStatus::Cancelled => "CANCELLED",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// Statuses in which a ride must have an assigned driver.
    pub fn requires_driver(&self) -> bool {
        matches!(
            self,
            RideStatus::Accepted | RideStatus::InProgress | RideStatus::Completed
        )
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
