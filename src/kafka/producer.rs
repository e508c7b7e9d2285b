use crate::config::KafkaConfig;
use crate::message::OutboundRecord;
use crate::producer::{Delivery, ProducerFactory, ProducerHandle, RecordSender};
use crate::{Error, Result};
use async_trait::async_trait;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;

pub struct KafkaProducer {
    producer: FutureProducer,
    send_timeout: Duration,
}

impl KafkaProducer {
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("acks", &config.acks)
            .set("broker.version.fallback", &config.broker_version)
            .set("message.timeout.ms", config.send_timeout_ms.to_string())
            .create()
            .map_err(|e| Error::ProducerCreation(e.to_string()))?;

        Ok(Self {
            producer,
            send_timeout: Duration::from_millis(config.send_timeout_ms),
        })
    }
}

#[async_trait]
impl RecordSender for KafkaProducer {
    async fn send(&self, record: &OutboundRecord) -> Result<Delivery> {
        let mut headers = OwnedHeaders::new();
        for (name, value) in &record.headers {
            headers = headers.insert(Header {
                key: name,
                value: Some(value.as_bytes()),
            });
        }

        let mut outbound = FutureRecord::to(&record.topic)
            .key(record.key.as_str())
            .payload(record.payload.as_ref())
            .headers(headers);
        // Negative partition means broker-assigned; leaving it unset lets
        // the configured partitioner choose.
        if record.partition >= 0 {
            outbound = outbound.partition(record.partition);
        }

        // An acknowledgment that does not arrive within the timeout is a
        // transient failure; the caller's retry budget decides what to do.
        let (partition, offset) = self
            .producer
            .send(outbound, Timeout::After(self.send_timeout))
            .await
            .map_err(|(e, _)| Error::Kafka(e))?;

        Ok(Delivery { partition, offset })
    }
}

pub struct KafkaProducerFactory {
    config: KafkaConfig,
}

impl KafkaProducerFactory {
    pub fn new(config: KafkaConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProducerFactory for KafkaProducerFactory {
    async fn create(&self) -> Result<ProducerHandle> {
        Ok(Arc::new(KafkaProducer::new(&self.config)?))
    }
}
