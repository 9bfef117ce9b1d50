//! Log-structured message bus abstraction used between the trade producer and the Bar Builder.
//!
//! This crate does not implement a broker - it defines the [`Producer`], [`Consumer`] and
//! [`OffsetStore`] traits the rest of Tickstream programs against, plus an [`memory::InMemoryBus`]
//! reference implementation used in tests and single-process deployments. A production
//! deployment provides its own implementation of these traits backed by a real broker client.

pub mod consumer;
pub mod error;
pub mod memory;
pub mod offset;
pub mod producer;
pub mod topic;

pub use consumer::Consumer;
pub use error::BusError;
pub use memory::{InMemoryBus, InMemoryConsumer, InMemoryOffsetStore, InMemoryProducer};
pub use offset::{ConsumerGroup, OffsetStore};
pub use producer::Producer;
pub use topic::{Record, Topic};
