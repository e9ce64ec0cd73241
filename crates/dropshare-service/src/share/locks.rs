//! Per-share reader/writer locks.
//!
//! Inspect and download hold a read lock for as long as they touch a share;
//! a download keeps its read lock inside the returned byte stream. Reap takes
//! the write lock, so payload bytes are never deleted under a running
//! transfer. An upload draft holds the write lock of its reserved id until it
//! is created or discarded.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use dropshare_core::ShareId;

/// Registry of per-share locks, created on demand.
#[derive(Debug, Default)]
pub struct ShareLocks {
    inner: DashMap<ShareId, Arc<RwLock<()>>>,
}

impl ShareLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, id: &ShareId) -> Arc<RwLock<()>> {
        self.inner
            .entry(id.clone())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Wait for shared access to a share.
    pub async fn read(&self, id: &ShareId) -> OwnedRwLockReadGuard<()> {
        self.lock_for(id).read_owned().await
    }

    /// Wait for exclusive access to a share.
    pub async fn write(&self, id: &ShareId) -> OwnedRwLockWriteGuard<()> {
        self.lock_for(id).write_owned().await
    }

    /// Take exclusive access only if nobody holds the lock right now.
    pub fn try_write(&self, id: &ShareId) -> Option<OwnedRwLockWriteGuard<()>> {
        self.lock_for(id).try_write_owned().ok()
    }

    /// Drop the registry entry if no guard or waiter references it.
    pub fn forget(&self, id: &ShareId) {
        self.inner
            .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of shares with a registered lock.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no locks are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_excluded_while_reading() {
        let locks = ShareLocks::new();
        let id = ShareId::generate();

        let read = locks.read(&id).await;
        assert!(locks.try_write(&id).is_none());
        drop(read);
        assert!(locks.try_write(&id).is_some());
    }

    #[tokio::test]
    async fn test_forget_keeps_held_locks() {
        let locks = ShareLocks::new();
        let id = ShareId::generate();

        let guard = locks.read(&id).await;
        locks.forget(&id);
        assert_eq!(locks.len(), 1);

        drop(guard);
        locks.forget(&id);
        assert!(locks.is_empty());
    }
}
