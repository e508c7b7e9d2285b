//! Ports between the publish pipeline and the concrete broker client.
//!
//! The registry and publisher only ever see these traits; the rdkafka
//! implementations live in [`crate::kafka`].

use crate::message::OutboundRecord;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Broker acknowledgment for one accepted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// A live producer connection for one (topic, partition).
///
/// Implementations must be safe for concurrent submission from multiple
/// tasks; the registry hands the same instance to every caller of its key.
#[async_trait]
pub trait RecordSender: Send + Sync {
    /// Submit one record and wait for the broker's success or failure
    /// signal for it.
    async fn send(&self, record: &OutboundRecord) -> Result<Delivery>;
}

/// Shared handle to a pooled producer.
pub type ProducerHandle = Arc<dyn RecordSender>;

/// Builds a new underlying producer bound to the configured broker
/// address list and protocol version.
#[async_trait]
pub trait ProducerFactory: Send + Sync {
    async fn create(&self) -> Result<ProducerHandle>;
}
