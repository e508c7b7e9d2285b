//! Error types and result handling for kafka-push-proxy.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! # Example
//!
//! ```rust
//! use kafka_push_proxy::{Error, Result};
//!
//! fn check_batch(messages: &[&str]) -> Result<()> {
//!     if messages.is_empty() {
//!         return Err(Error::Validation("message batch is empty".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! match check_batch(&[]) {
//!     Ok(()) => println!("Accepted"),
//!     Err(Error::Validation(msg)) => eprintln!("Rejected: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for kafka-push-proxy operations.
///
/// This enum represents all possible errors that can occur while
/// publishing, from configuration issues to an exhausted retry budget.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, typically from an invalid file or environment.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The caller handed over a batch or message that cannot be published.
    ///
    /// Returned before any lock is taken or any network interaction occurs.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The distributed lock service failed while coordinating producer
    /// creation.
    ///
    /// Contention (the lock being held by another owner) is not an error;
    /// this variant covers an unreachable or misbehaving lock service.
    #[error("Distributed lock error: {0}")]
    LockAcquisition(String),

    /// A new producer could not be constructed (bad broker list, version
    /// mismatch, connection refused).
    #[error("Producer creation error: {0}")]
    ProducerCreation(String),

    /// Kafka client or producer error for a single send attempt.
    ///
    /// Inside the send loop these are transient and consume retry budget;
    /// the final one is wrapped in [`Error::Publish`].
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The retry budget for a message was exhausted.
    ///
    /// Wraps the failure observed on the last attempt. Terminal for the
    /// whole `push_message` call.
    #[error("Publish failed after {attempts} attempts: {source}")]
    Publish {
        /// Total number of send attempts made, including the first one
        attempts: u32,
        /// The failure observed on the last attempt
        #[source]
        source: Box<Error>,
    },
}

/// A convenient Result type alias for kafka-push-proxy operations.
///
/// This is equivalent to `std::result::Result<T, kafka_push_proxy::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
