//! The authoritative set of open connections.
//!
//! Membership lives in a [`BTreeMap`] behind a [`tokio::sync::Mutex`].
//! The lock is held only to insert, remove, or copy references; callers
//! that need to send iterate a [`Registry::snapshot`] after the lock is
//! released, so a slow client never stalls registration or removal of
//! others.

use std::collections::BTreeMap;
use std::sync::Arc;

use murmur_types::ConnectionId;
use tokio::sync::Mutex;

/// Proof of registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationHandle {
    id: ConnectionId,
}

impl RegistrationHandle {
    /// The identifier assigned at registration.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Concurrency-safe set of connections keyed by [`ConnectionId`].
#[derive(Debug)]
pub struct Registry<C> {
    members: Mutex<BTreeMap<ConnectionId, Arc<C>>>,
}

impl<C> Registry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            members: Mutex::new(BTreeMap::new()),
        }
    }

    /// Add a connection under a freshly assigned id.
    ///
    /// The connection is a broadcast target as soon as this returns.
    pub async fn register(&self, conn: Arc<C>) -> RegistrationHandle {
        let id = ConnectionId::new();
        let mut members = self.members.lock().await;
        // v7 ids are unique; a collision would replace a live member.
        debug_assert!(!members.contains_key(&id));
        members.insert(id, conn);
        RegistrationHandle { id }
    }

    /// Remove a connection.
    ///
    /// Idempotent: returns `false` when the handle was already removed.
    pub async fn unregister(&self, handle: RegistrationHandle) -> bool {
        self.members.lock().await.remove(&handle.id).is_some()
    }

    /// Point-in-time copy of the current members, ordered by id (which is
    /// registration order).
    pub async fn snapshot(&self) -> Vec<(RegistrationHandle, Arc<C>)> {
        self.members
            .lock()
            .await
            .iter()
            .map(|(id, conn)| (RegistrationHandle { id: *id }, Arc::clone(conn)))
            .collect()
    }

    /// Whether the handle is still registered.
    pub async fn contains(&self, handle: RegistrationHandle) -> bool {
        self.members.lock().await.contains_key(&handle.id)
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[tokio::test]
    async fn register_then_snapshot() {
        let registry = Registry::new();
        let a = registry.register(Arc::new("a")).await;
        let b = registry.register(Arc::new("b")).await;
        assert_ne!(a.id(), b.id());

        let snapshot = registry.snapshot().await;
        let handles: Vec<_> = snapshot.iter().map(|(h, _)| *h).collect();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(handles, expected);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let registry = Registry::new();
        let a = registry.register(Arc::new(())).await;
        assert!(registry.unregister(a).await);
        assert!(!registry.unregister(a).await);
        assert!(!registry.contains(a).await);
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_changes() {
        let registry = Registry::new();
        let a = registry.register(Arc::new(1)).await;
        let snapshot = registry.snapshot().await;

        registry.unregister(a).await;
        registry.register(Arc::new(2)).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, a);
        assert_eq!(*snapshot[0].1, 1);
    }

    #[tokio::test]
    async fn concurrent_register_and_unregister_leave_no_ghosts() {
        let registry = Arc::new(Registry::new());
        let mut tasks = Vec::new();
        for i in 0..64_u32 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let handle = registry.register(Arc::new(i)).await;
                tokio::task::yield_now().await;
                if i % 2 == 0 {
                    assert!(registry.unregister(handle).await);
                    None
                } else {
                    Some(handle)
                }
            }));
        }

        let mut kept = BTreeSet::new();
        for task in tasks {
            if let Some(handle) = task.await.unwrap() {
                kept.insert(handle);
            }
        }

        let snapshot: BTreeSet<_> = registry
            .snapshot()
            .await
            .into_iter()
            .map(|(h, _)| h)
            .collect();
        assert_eq!(snapshot, kept);
        assert_eq!(registry.len().await, 32);
    }
}
