//! Batch publish entry point and the per-message send/retry loop.

use crate::backoff::Backoff;
use crate::config::RetryConfig;
use crate::message::{Message, MessageHandle, OutboundRecord, RECONSUME_TIMES_HEADER};
use crate::producer::{Delivery, ProducerHandle};
use crate::registry::ProducerRegistry;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Publishes message batches through pooled producers with bounded retry.
///
/// # Contract
///
/// `push_message` is all-or-nothing from the caller's perspective: if any
/// message in the batch exhausts its retry budget, the call returns an
/// error and no handles are returned, even for earlier messages the broker
/// already accepted durably. Callers needing per-message outcomes should
/// push one-message batches.
///
/// Delivery is at-least-once: an acknowledgment that times out after the
/// broker durably wrote the record leads to a resend under a fresh
/// generated key, i.e. a possible duplicate entry in the log.
pub struct Publisher {
    registry: Arc<ProducerRegistry>,
    retry: RetryConfig,
    backoff: Backoff,
}

impl Publisher {
    pub fn new(registry: Arc<ProducerRegistry>, retry: RetryConfig) -> Self {
        let backoff = Backoff::from_retry_config(&retry);
        Self {
            registry,
            retry,
            backoff,
        }
    }

    /// Publish `messages` in order, returning one handle per message.
    ///
    /// Each message resolves its retry budgets (message override, else the
    /// configured default), gets a generated key if it carries none, and
    /// runs its send loop to completion before the next message starts.
    pub async fn push_message(&self, messages: &[Message]) -> Result<Vec<MessageHandle>> {
        if messages.is_empty() {
            return Err(Error::Validation(
                "message batch must not be empty".to_string(),
            ));
        }
        for message in messages {
            if message.topic.is_empty() {
                return Err(Error::Validation("message topic is required".to_string()));
            }
        }

        let mut handles = Vec::with_capacity(messages.len());
        for message in messages {
            let reconsume_times = message
                .reconsume_times
                .unwrap_or(self.retry.reconsume_times);
            let repush_times = message.repush_times.unwrap_or(self.retry.repush_times);

            let key = message
                .key
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            let record = OutboundRecord {
                topic: message.topic.clone(),
                partition: message.partition,
                key,
                payload: message.body.clone(),
                headers: vec![(
                    RECONSUME_TIMES_HEADER.to_string(),
                    reconsume_times.to_string(),
                )],
            };

            let producer = self.registry.get_or_create(&message.producer_key()).await?;
            let delivery = self.send_with_retry(&producer, &record, repush_times).await?;

            handles.push(MessageHandle {
                topic: record.topic,
                body: message.body.clone(),
                key: record.key,
                partition: delivery.partition,
                offset: delivery.offset,
            });
        }

        Ok(handles)
    }

    /// Drive one record through the producer until it is acknowledged or
    /// the budget of `repush_times` resubmissions is spent.
    async fn send_with_retry(
        &self,
        producer: &ProducerHandle,
        record: &OutboundRecord,
        repush_times: u32,
    ) -> Result<Delivery> {
        let mut attempt: u32 = 0;
        loop {
            match producer.send(record).await {
                Ok(delivery) => {
                    info!(
                        topic = %record.topic,
                        key = %record.key,
                        partition = delivery.partition,
                        offset = delivery.offset,
                        attempt = attempt + 1,
                        "record delivered"
                    );
                    return Ok(delivery);
                }
                Err(e) => {
                    if attempt >= repush_times {
                        error!(
                            topic = %record.topic,
                            key = %record.key,
                            attempts = attempt + 1,
                            error = %e,
                            "retry budget exhausted, giving up"
                        );
                        return Err(Error::Publish {
                            attempts: attempt + 1,
                            source: Box::new(e),
                        });
                    }
                    attempt += 1;
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        topic = %record.topic,
                        key = %record.key,
                        attempt,
                        max_attempts = repush_times + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "send failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
