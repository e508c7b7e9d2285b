//! Value types for outbound messages and their broker acknowledgments.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record header carrying the consumer-side retry budget.
///
/// Consumers read this to bound how many times they reprocess a record
/// before giving up. The producer-side budget is never transmitted.
pub const RECONSUME_TIMES_HEADER: &str = "ReconsumeTimes";

/// Partition sentinel meaning "let the broker's partitioner choose".
pub const PARTITION_UNASSIGNED: i32 = -1;

/// An outbound message handed to [`Publisher::push_message`].
///
/// [`Publisher::push_message`]: crate::Publisher::push_message
#[derive(Debug, Clone)]
pub struct Message {
    pub topic: String,
    /// Target partition; negative means broker-assigned.
    pub partition: i32,
    /// Record key; a unique key is generated when absent.
    pub key: Option<String>,
    pub body: Bytes,
    /// Per-message override of the consumer-side retry budget.
    pub reconsume_times: Option<u32>,
    /// Per-message override of the producer-side retry budget.
    pub repush_times: Option<u32>,
}

impl Message {
    pub fn new(topic: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            partition: PARTITION_UNASSIGNED,
            key: None,
            body: body.into(),
            reconsume_times: None,
            repush_times: None,
        }
    }

    pub fn with_partition(mut self, partition: i32) -> Self {
        self.partition = partition;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_reconsume_times(mut self, times: u32) -> Self {
        self.reconsume_times = Some(times);
        self
    }

    pub fn with_repush_times(mut self, times: u32) -> Self {
        self.repush_times = Some(times);
        self
    }

    pub fn producer_key(&self) -> ProducerKey {
        ProducerKey::new(&self.topic, self.partition)
    }
}

/// The result of a successfully published message.
///
/// Immutable once returned; `key` is always non-empty and `partition` and
/// `offset` are the values acknowledged by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHandle {
    pub topic: String,
    #[serde(skip)]
    pub body: Bytes,
    pub key: String,
    pub partition: i32,
    pub offset: i64,
}

/// Identity of one pooled producer: a (topic, partition) pair.
///
/// Two messages with an equal key share the same producer handle within
/// the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProducerKey {
    pub topic: String,
    pub partition: i32,
}

impl ProducerKey {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for ProducerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.topic, self.partition)
    }
}

/// The wire-level record submitted to the broker for one send attempt.
#[derive(Debug, Clone)]
pub struct OutboundRecord {
    pub topic: String,
    pub partition: i32,
    pub key: String,
    pub payload: Bytes,
    /// Record headers as (name, value) pairs.
    pub headers: Vec<(String, String)>,
}

impl OutboundRecord {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
