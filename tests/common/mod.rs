use async_trait::async_trait;
use bytes::Bytes;
use kafka_push_proxy::config::{KafkaConfig, RetryConfig};
use kafka_push_proxy::lock::{DistributedLock, InProcessLock};
use kafka_push_proxy::message::OutboundRecord;
use kafka_push_proxy::producer::{Delivery, ProducerFactory, ProducerHandle, RecordSender};
use kafka_push_proxy::{Error, ProducerRegistry, Publisher, Result};
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use std::env;
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Get test configuration from environment variables
#[allow(dead_code)]
pub fn get_test_kafka_config() -> KafkaConfig {
    KafkaConfig {
        brokers: env::var("TEST_KAFKA_BROKERS")
            .unwrap_or_else(|_| "localhost:9092".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect(),
        acks: "all".to_string(),
        broker_version: "2.3.0".to_string(),
        send_timeout_ms: 5_000,
    }
}

/// In-memory stand-in for one broker connection.
///
/// Scripted failures: the first `fail_first` sends fail, and any record
/// whose payload equals `poison` fails every time. Successful sends are
/// acknowledged with monotonically increasing offsets.
pub struct ScriptedSender {
    pub attempts: AtomicU32,
    fail_first: u32,
    poison: Option<Bytes>,
    next_offset: AtomicI64,
    pub records: Mutex<Vec<OutboundRecord>>,
}

impl ScriptedSender {
    pub fn reliable() -> Arc<Self> {
        Arc::new(Self::new(0, None))
    }

    #[allow(dead_code)]
    pub fn failing_first(fail_first: u32) -> Arc<Self> {
        Arc::new(Self::new(fail_first, None))
    }

    #[allow(dead_code)]
    pub fn poisoned(poison: impl Into<Bytes>) -> Arc<Self> {
        Arc::new(Self::new(0, Some(poison.into())))
    }

    fn new(fail_first: u32, poison: Option<Bytes>) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_first,
            poison,
            next_offset: AtomicI64::new(0),
            records: Mutex::new(Vec::new()),
        }
    }

    fn transient_error() -> Error {
        Error::Kafka(KafkaError::MessageProduction(
            RDKafkaErrorCode::MessageTimedOut,
        ))
    }
}

#[async_trait]
impl RecordSender for ScriptedSender {
    async fn send(&self, record: &OutboundRecord) -> Result<Delivery> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.records.lock().unwrap().push(record.clone());

        if let Some(poison) = &self.poison {
            if record.payload == *poison {
                return Err(Self::transient_error());
            }
        }
        if attempt <= self.fail_first {
            return Err(Self::transient_error());
        }

        Ok(Delivery {
            partition: record.partition.max(0),
            offset: self.next_offset.fetch_add(1, Ordering::SeqCst),
        })
    }
}

/// Factory handing out one shared scripted sender for every key.
pub struct ScriptedFactory {
    sender: Arc<ScriptedSender>,
    pub creations: AtomicUsize,
}

impl ScriptedFactory {
    pub fn new(sender: Arc<ScriptedSender>) -> Arc<Self> {
        Arc::new(Self {
            sender,
            creations: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProducerFactory for ScriptedFactory {
    async fn create(&self) -> Result<ProducerHandle> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        Ok(self.sender.clone())
    }
}

/// Lock wrapper counting acquisitions, for asserting that the fast path
/// and validation failures never touch the lock service.
pub struct CountingLock {
    inner: InProcessLock,
    pub acquires: AtomicUsize,
}

impl CountingLock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: InProcessLock::new(),
            acquires: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl DistributedLock for CountingLock {
    async fn try_acquire(&self, key: &str, owner: &str) -> Result<bool> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.inner.try_acquire(key, owner).await
    }

    async fn release(&self, key: &str, owner: &str) -> Result<()> {
        self.inner.release(key, owner).await
    }
}

pub fn test_retry_config(repush_times: u32) -> RetryConfig {
    RetryConfig {
        repush_times,
        base_delay_ms: 1,
        max_delay_ms: 5,
        ..RetryConfig::default()
    }
}

/// Wire a publisher over the scripted sender with millisecond backoff.
pub fn test_publisher(
    sender: Arc<ScriptedSender>,
    repush_times: u32,
) -> (Publisher, Arc<ScriptedFactory>, Arc<CountingLock>) {
    let factory = ScriptedFactory::new(sender);
    let lock = CountingLock::new();
    let registry = Arc::new(ProducerRegistry::new(factory.clone(), lock.clone()));
    (
        Publisher::new(registry, test_retry_config(repush_times)),
        factory,
        lock,
    )
}
