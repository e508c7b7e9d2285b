//! Concurrency-safe pool of one producer per (topic, partition).

use crate::lock::DistributedLock;
use crate::message::ProducerKey;
use crate::producer::{ProducerFactory, ProducerHandle};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Caches live producer handles keyed by [`ProducerKey`], creating them
/// lazily on first use.
///
/// Two guards protect creation: the registry's own mutex is the
/// authoritative in-process guard (no key ever maps to two live handles
/// within the process), and the distributed lock narrows the window in
/// which several proxy instances build a producer for the same key at
/// once. Neither substitutes for the other.
pub struct ProducerRegistry {
    producers: Mutex<HashMap<String, ProducerHandle>>,
    factory: Arc<dyn ProducerFactory>,
    lock: Arc<dyn DistributedLock>,
}

impl ProducerRegistry {
    pub fn new(factory: Arc<dyn ProducerFactory>, lock: Arc<dyn DistributedLock>) -> Self {
        Self {
            producers: Mutex::new(HashMap::new()),
            factory,
            lock,
        }
    }

    /// Return the pooled producer for `key`, building it if this is the
    /// first use.
    ///
    /// The fast path is a single map lookup; no lock service interaction
    /// and no factory call happen for a key that is already populated.
    pub async fn get_or_create(&self, key: &ProducerKey) -> Result<ProducerHandle> {
        let cache_key = key.to_string();

        {
            let producers = self.producers.lock().await;
            if let Some(producer) = producers.get(&cache_key) {
                return Ok(producer.clone());
            }
        }

        let owner = Uuid::new_v4().to_string();
        let acquired = match self.lock.try_acquire(&cache_key, &owner).await {
            Ok(acquired) => {
                if !acquired {
                    // Contended: another instance is creating the same
                    // producer. Proceed under the in-process guard alone.
                    debug!(key = %cache_key, "distributed lock contended, continuing");
                }
                acquired
            }
            Err(e) => return Err(Error::LockAcquisition(e.to_string())),
        };

        let result = self.create_locked(&cache_key).await;

        if acquired {
            if let Err(e) = self.lock.release(&cache_key, &owner).await {
                warn!(key = %cache_key, error = %e, "failed to release distributed lock");
            }
        }

        result
    }

    async fn create_locked(&self, cache_key: &str) -> Result<ProducerHandle> {
        let mut producers = self.producers.lock().await;

        // Another caller may have populated the key while the distributed
        // lock was being acquired.
        if let Some(producer) = producers.get(cache_key) {
            return Ok(producer.clone());
        }

        info!(key = %cache_key, "building producer");
        let producer = self.factory.create().await?;
        producers.insert(cache_key.to_string(), producer.clone());
        Ok(producer)
    }
}
