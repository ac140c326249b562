//! In-process serialization of mutations touching one vehicle.
//!
//! The read-compute-write of the odometer (refueling create/update/delete,
//! vehicle update/delete) must not interleave for the same vehicle. An
//! entry lives in the map only while some operation holds or waits for it.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type LockMap = Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>;

#[derive(Debug, Default)]
pub(super) struct VehicleLocks {
    inner: Arc<LockMap>,
}

/// Exclusive access to one vehicle until dropped.
#[derive(Debug)]
pub(super) struct VehicleGuard {
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<AsyncMutex<()>>,
    vehicle_id: Uuid,
    map: Arc<LockMap>,
}

impl VehicleLocks {
    /// Wait until no other operation holds `vehicle_id`.
    pub(super) async fn acquire(&self, vehicle_id: Uuid) -> VehicleGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(vehicle_id).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;
        VehicleGuard {
            guard: Some(guard),
            lock,
            vehicle_id,
            map: Arc::clone(&self.inner),
        }
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for VehicleGuard {
    fn drop(&mut self) {
        // Release first: the owned guard keeps its own reference to the lock.
        drop(self.guard.take());
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        // Clones are only taken under the map lock, so the count is stable
        // here: the map entry plus `self.lock` means nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            map.remove(&self.vehicle_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_vehicle_is_exclusive() {
        let locks = Arc::new(VehicleLocks::default());
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn different_vehicles_do_not_block() {
        let locks = VehicleLocks::default();
        let _first = locks.acquire(Uuid::new_v4()).await;
        let _second = locks.acquire(Uuid::new_v4()).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn entry_outlives_holder_while_someone_waits() {
        let locks = Arc::new(VehicleLocks::default());
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        assert_eq!(locks.len(), 1);
        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn released_entries_are_removed() {
        let locks = VehicleLocks::default();
        for _ in 0..100 {
            let _guard = locks.acquire(Uuid::new_v4()).await;
        }
        assert_eq!(locks.len(), 0);
    }
}
