use crate::backoff::BackoffStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    #[serde(default = "default_acks")]
    pub acks: String,
    #[serde(default = "default_broker_version")]
    pub broker_version: String,
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Consumer-side retry budget stamped into each record header unless
    /// the message carries its own value.
    #[serde(default = "default_reconsume_times")]
    pub reconsume_times: u32,
    /// Producer-side retry budget: how many times a failed send is
    /// resubmitted before the whole call fails.
    #[serde(default = "default_repush_times")]
    pub repush_times: u32,
    #[serde(default)]
    pub backoff: BackoffStrategy,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            reconsume_times: default_reconsume_times(),
            repush_times: default_repush_times(),
            backoff: BackoffStrategy::default(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("KAFKA_PUSH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn broker_list(&self) -> String {
        self.kafka.brokers.join(",")
    }
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_broker_version() -> String {
    "2.3.0".to_string()
}

fn default_send_timeout_ms() -> u64 {
    30_000
}

fn default_reconsume_times() -> u32 {
    3
}

fn default_repush_times() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    5_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}
