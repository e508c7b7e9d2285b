//! Distributed lock contract used to coordinate producer creation.
//!
//! The lock is best-effort: it narrows the window in which several proxy
//! instances sharing upstream resources build a producer for the same key
//! at the same time. It does not deduplicate producers across processes;
//! the pool itself is per-process and [`crate::registry::ProducerRegistry`]
//! carries its own in-process guard regardless of this lock.

use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mutual-exclusion primitive keyed by string.
///
/// `try_acquire` returning `Ok(false)` means the lock is currently held by
/// another owner; that is contention, not failure. `Err` means the lock
/// service itself is unreachable or misbehaving.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    async fn try_acquire(&self, key: &str, owner: &str) -> Result<bool>;

    /// Release a lock previously acquired with `owner`. Releasing a key
    /// held by a different owner must be a no-op.
    async fn release(&self, key: &str, owner: &str) -> Result<()>;
}

/// Process-local lock implementation.
///
/// Suitable for single-instance deployments and tests. Deployments running
/// several proxy instances should back this trait with a shared service
/// (the acquire/release shape matches a Redis `SET NX` + owner-checked
/// delete).
#[derive(Debug, Default)]
pub struct InProcessLock {
    held: Mutex<HashMap<String, String>>,
}

impl InProcessLock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DistributedLock for InProcessLock {
    async fn try_acquire(&self, key: &str, owner: &str) -> Result<bool> {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        if held.contains_key(key) {
            return Ok(false);
        }
        held.insert(key.to_string(), owner.to_string());
        Ok(true)
    }

    async fn release(&self, key: &str, owner: &str) -> Result<()> {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        if held.get(key).map(String::as_str) == Some(owner) {
            held.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let lock = InProcessLock::new();

        assert!(lock.try_acquire("orders#0", "owner-a").await.unwrap());
        assert!(!lock.try_acquire("orders#0", "owner-b").await.unwrap());

        lock.release("orders#0", "owner-a").await.unwrap();
        assert!(lock.try_acquire("orders#0", "owner-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_release_by_wrong_owner_keeps_lock() {
        let lock = InProcessLock::new();

        assert!(lock.try_acquire("orders#0", "owner-a").await.unwrap());
        lock.release("orders#0", "owner-b").await.unwrap();

        // Still held by owner-a.
        assert!(!lock.try_acquire("orders#0", "owner-c").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let lock = InProcessLock::new();

        assert!(lock.try_acquire("orders#0", "owner-a").await.unwrap());
        assert!(lock.try_acquire("orders#1", "owner-a").await.unwrap());
    }
}
