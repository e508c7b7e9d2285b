pub mod backoff;
pub mod config;
pub mod error;
pub mod lock;
pub mod message;
pub mod producer;
pub mod publisher;
pub mod registry;

pub mod kafka;

pub use config::Config;
pub use error::{Error, Result};
pub use message::{Message, MessageHandle};
pub use publisher::Publisher;
pub use registry::ProducerRegistry;
