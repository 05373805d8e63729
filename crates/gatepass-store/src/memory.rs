//! In-memory implementation of `LifecycleStore`.
//!
//! The outer `RwLock` guards only the guest index; each guest's state sits
//! behind its own `Mutex`. Reads and writes for different guests therefore
//! never wait on each other once the entry exists, while the per-entry lock
//! makes the version compare-and-set for one guest atomic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, trace};

use gatepass_contracts::{error::StoreError, lifecycle::LifecycleState, visit::GuestId};
use gatepass_core::traits::LifecycleStore;

type Entry = Arc<Mutex<LifecycleState>>;

fn poisoned(what: &str) -> StoreError {
    StoreError::Backend {
        reason: format!("{what} lock poisoned"),
    }
}

/// Lifecycle state held in process memory.
///
/// Suitable for a single gate controller and for tests; state does not
/// survive a restart.
///
/// # Thread safety
///
/// `Send + Sync`. Concurrent `put` calls against the same version of one
/// guest's state have exactly one winner; the rest get
/// `StoreError::Conflict` and must re-read.
#[derive(Default)]
pub struct InMemoryLifecycleStore {
    entries: RwLock<HashMap<GuestId, Entry>>,
}

impl InMemoryLifecycleStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of guests with stored state.
    ///
    /// Fails with `StoreError::Backend` if the index lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("store index"))?;
        Ok(entries.len())
    }

    /// True when no guest has stored state.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn entry(&self, guest_id: &GuestId) -> Result<Option<Entry>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("store index"))?;
        Ok(entries.get(guest_id).cloned())
    }

    fn insert(&self, guest_id: &GuestId, mut state: LifecycleState) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned("store index"))?;

        if let Some(existing) = entries.get(guest_id) {
            let actual = existing.lock().map_err(|_| poisoned("guest entry"))?.version;
            return Err(StoreError::Conflict {
                guest_id: *guest_id,
                expected: None,
                actual: Some(actual),
            });
        }

        state.version = 1;
        entries.insert(*guest_id, Arc::new(Mutex::new(state)));
        debug!(guest_id = %guest_id, "lifecycle state inserted");
        Ok(1)
    }
}

impl LifecycleStore for InMemoryLifecycleStore {
    fn get(&self, guest_id: &GuestId) -> Result<Option<LifecycleState>, StoreError> {
        match self.entry(guest_id)? {
            Some(entry) => {
                let state = entry.lock().map_err(|_| poisoned("guest entry"))?;
                Ok(Some(state.clone()))
            }
            None => Ok(None),
        }
    }

    fn put(
        &self,
        guest_id: &GuestId,
        mut state: LifecycleState,
        expected_version: Option<u64>,
    ) -> Result<u64, StoreError> {
        let Some(expected) = expected_version else {
            return self.insert(guest_id, state);
        };

        let Some(entry) = self.entry(guest_id)? else {
            return Err(StoreError::Conflict {
                guest_id: *guest_id,
                expected: expected_version,
                actual: None,
            });
        };

        let mut current = entry.lock().map_err(|_| poisoned("guest entry"))?;
        if current.version != expected {
            trace!(
                guest_id = %guest_id,
                expected,
                actual = current.version,
                "version check failed"
            );
            return Err(StoreError::Conflict {
                guest_id: *guest_id,
                expected: expected_version,
                actual: Some(current.version),
            });
        }

        state.version = expected + 1;
        *current = state;
        Ok(current.version)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, TimeZone, Utc};

    use gatepass_contracts::{
        error::StoreError,
        lifecycle::{LifecycleState, LifecycleStatus},
        visit::{ApartmentId, ApprovalType, GuestId, GuestType, ValidityBound, VisitRecord},
    };
    use gatepass_core::traits::LifecycleStore;

    use super::InMemoryLifecycleStore;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn state() -> LifecycleState {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        LifecycleState::initial(VisitRecord {
            guest_id: GuestId::new(),
            apartment_id: ApartmentId::new("C4"),
            guest_type: GuestType::OneTime,
            approval_type: ApprovalType::NeedsApproval,
            valid_from: ValidityBound::on(day),
            valid_to: ValidityBound::on(day),
            issued_at: Utc.with_ymd_and_hms(2024, 2, 28, 9, 0, 0).unwrap(),
            nonce: [7u8; 16],
        })
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_missing_guest_reads_as_none() {
        let store = InMemoryLifecycleStore::new();

        assert_eq!(store.get(&GuestId::new()).unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_versions_start_at_one_and_increment() {
        let store = InMemoryLifecycleStore::new();
        let s = state();
        let id = *s.guest_id();

        assert_eq!(store.put(&id, s.clone(), None).unwrap(), 1);

        let mut next = store.get(&id).unwrap().unwrap();
        assert_eq!(next.version, 1);
        next.status = LifecycleStatus::Approved;
        // The caller's version field is ignored.
        next.version = 99;
        assert_eq!(store.put(&id, next, Some(1)).unwrap(), 2);

        let stored = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.status, LifecycleStatus::Approved);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_create_only_put_refuses_existing_state() {
        let store = InMemoryLifecycleStore::new();
        let s = state();
        let id = *s.guest_id();
        store.put(&id, s.clone(), None).unwrap();

        match store.put(&id, s, None) {
            Err(StoreError::Conflict { expected, actual, .. }) => {
                assert_eq!(expected, None);
                assert_eq!(actual, Some(1));
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_version_is_a_conflict() {
        let store = InMemoryLifecycleStore::new();
        let s = state();
        let id = *s.guest_id();
        store.put(&id, s.clone(), None).unwrap();
        store.put(&id, s.clone(), Some(1)).unwrap();

        match store.put(&id, s, Some(1)) {
            Err(StoreError::Conflict { expected, actual, .. }) => {
                assert_eq!(expected, Some(1));
                assert_eq!(actual, Some(2));
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_update_of_missing_guest_is_a_conflict() {
        let store = InMemoryLifecycleStore::new();
        let s = state();

        assert!(matches!(
            store.put(&GuestId::new(), s, Some(1)),
            Err(StoreError::Conflict { actual: None, .. })
        ));
    }

    #[test]
    fn test_poisoned_index_is_a_backend_error() {
        let store = InMemoryLifecycleStore::new();
        let s = state();
        let id = *s.guest_id();

        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = store.entries.write().unwrap();
                    panic!("writer died holding the index lock");
                })
                .join();
        });

        assert!(matches!(store.len(), Err(StoreError::Backend { .. })));
        assert!(matches!(store.get(&id), Err(StoreError::Backend { .. })));
        assert!(matches!(store.put(&id, s, None), Err(StoreError::Backend { .. })));
    }

    /// Many threads racing on one version: exactly one write wins.
    #[test]
    fn test_concurrent_writers_on_one_version_have_one_winner() {
        let store = InMemoryLifecycleStore::new();
        let s = state();
        let id = *s.guest_id();
        store.put(&id, s.clone(), None).unwrap();

        let winners = AtomicUsize::new(0);
        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    if store.put(&id, s.clone(), Some(1)).is_ok() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(&id).unwrap().unwrap().version, 2);
    }

    /// Read-modify-write loops from many threads lose no updates.
    #[test]
    fn test_retrying_writers_serialize_cleanly() {
        let store = InMemoryLifecycleStore::new();
        let s = state();
        let id = *s.guest_id();
        store.put(&id, s, None).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        loop {
                            let current = store.get(&id).unwrap().unwrap();
                            let version = current.version;
                            if store.put(&id, current, Some(version)).is_ok() {
                                break;
                            }
                        }
                    }
                });
            }
        });

        assert_eq!(store.get(&id).unwrap().unwrap().version, 1 + 8 * 25);
    }
}
