use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Ride;

/// Failure reported by a ride store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No ride with this id
    NotFound(String),
    /// A ride with this id already exists
    Duplicate(String),
    /// The stored ride no longer matches the expected snapshot
    Conflict(String),
    /// Backend failure
    Unavailable(String),
    /// A replacement snapshot named a different ride than the one it replaces
    IdMismatch {
        /// Id of the expected snapshot
        expected: String,
        /// Id carried by the replacement
        replacement: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "ride '{}' not found", id),
            StoreError::Duplicate(id) => write!(f, "ride '{}' already exists", id),
            StoreError::Conflict(id) => write!(f, "ride '{}' changed since it was read", id),
            StoreError::Unavailable(msg) => write!(f, "ride store unavailable: {}", msg),
            StoreError::IdMismatch {
                expected,
                replacement,
            } => write!(
                f,
                "replacement for ride '{}' names ride '{}'",
                expected, replacement
            ),
        }
    }
}

impl std::error::Error for StoreError {}

/// Keyed store of ride snapshots.
///
/// Implementations must make [`compare_and_swap`](Self::compare_and_swap)
/// atomic: the write happens only if the stored ride still equals
/// `expected`. A database adapter expresses this as
/// `UPDATE ... WHERE id = $1 AND version = $2`.
pub trait RideStore: Send + Sync {
    /// Reads the current snapshot of a ride.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the id is unknown.
    fn fetch(&self, ride_id: &str) -> Result<Ride, StoreError>;

    /// Stores a new ride.
    ///
    /// # Errors
    ///
    /// [`StoreError::Duplicate`] when the id is taken.
    fn insert(&self, ride: Ride) -> Result<(), StoreError>;

    /// Replaces `expected` with `next` if and only if the stored ride still
    /// equals `expected`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] when the stored ride has moved on.
    fn compare_and_swap(&self, expected: &Ride, next: Ride) -> Result<(), StoreError>;
}

/// In-memory [`RideStore`].
///
/// # Examples
///
/// ```
/// use wecare_core::{InMemoryRideStore, Ride, RideStatus, RideStore, StoreError};
///
/// let store = InMemoryRideStore::new();
/// let ride = Ride::pending("r1", "c1");
/// store.insert(ride.clone()).unwrap();
///
/// let mut accepted = ride.clone();
/// accepted.status = RideStatus::Accepted;
/// accepted.driver_id = Some("d1".to_string());
/// accepted.version = 1;
///
/// store.compare_and_swap(&ride, accepted.clone()).unwrap();
/// // The same stale snapshot cannot be applied twice.
/// assert_eq!(
///     store.compare_and_swap(&ride, accepted),
///     Err(StoreError::Conflict("r1".to_string()))
/// );
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRideStore {
    rides: Mutex<HashMap<String, Ride>>,
}

impl InMemoryRideStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rides.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no ride is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Ride>> {
        self.rides.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RideStore for InMemoryRideStore {
    fn fetch(&self, ride_id: &str) -> Result<Ride, StoreError> {
        self.lock()
            .get(ride_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(ride_id.to_string()))
    }

    fn insert(&self, ride: Ride) -> Result<(), StoreError> {
        let mut rides = self.lock();
        if rides.contains_key(&ride.id) {
            return Err(StoreError::Duplicate(ride.id));
        }
        rides.insert(ride.id.clone(), ride);
        Ok(())
    }

    fn compare_and_swap(&self, expected: &Ride, next: Ride) -> Result<(), StoreError> {
        if next.id != expected.id {
            return Err(StoreError::IdMismatch {
                expected: expected.id.clone(),
                replacement: next.id,
            });
        }

        let mut rides = self.lock();
        let current = rides
            .get_mut(&expected.id)
            .ok_or_else(|| StoreError::NotFound(expected.id.clone()))?;
        if *current != *expected {
            return Err(StoreError::Conflict(expected.id.clone()));
        }
        *current = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ride::RideStatus;

    fn accepted_by(ride: &Ride, driver: &str) -> Ride {
        Ride {
            status: RideStatus::Accepted,
            driver_id: Some(driver.to_string()),
            version: ride.version + 1,
            ..ride.clone()
        }
    }

    #[test]
    fn insert_then_fetch() {
        let store = InMemoryRideStore::new();
        store.insert(Ride::pending("r1", "c1")).unwrap();

        assert_eq!(store.fetch("r1").unwrap(), Ride::pending("r1", "c1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn duplicate_insert_rejected() {
        let store = InMemoryRideStore::new();
        store.insert(Ride::pending("r1", "c1")).unwrap();
        assert_eq!(
            store.insert(Ride::pending("r1", "c2")),
            Err(StoreError::Duplicate("r1".to_string()))
        );
    }

    #[test]
    fn fetch_unknown_is_not_found() {
        let store = InMemoryRideStore::new();
        assert_eq!(store.fetch("nope"), Err(StoreError::NotFound("nope".to_string())));
    }

    #[test]
    fn stale_swap_never_overwrites_driver() {
        let store = InMemoryRideStore::new();
        let snapshot = Ride::pending("r1", "c1");
        store.insert(snapshot.clone()).unwrap();

        store.compare_and_swap(&snapshot, accepted_by(&snapshot, "d1")).unwrap();
        assert_eq!(
            store.compare_and_swap(&snapshot, accepted_by(&snapshot, "d2")),
            Err(StoreError::Conflict("r1".to_string()))
        );
        assert_eq!(store.fetch("r1").unwrap().driver_id.as_deref(), Some("d1"));
    }

    #[test]
    fn swap_with_mismatched_id_rejected() {
        let store = InMemoryRideStore::new();
        let snapshot = Ride::pending("r1", "c1");
        store.insert(snapshot.clone()).unwrap();

        let mut other = accepted_by(&snapshot, "d1");
        other.id = "r2".to_string();
        assert_eq!(
            store.compare_and_swap(&snapshot, other),
            Err(StoreError::IdMismatch {
                expected: "r1".to_string(),
                replacement: "r2".to_string(),
            })
        );
        assert_eq!(store.fetch("r1").unwrap(), snapshot);
    }
}
