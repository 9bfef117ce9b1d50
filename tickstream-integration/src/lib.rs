#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Tickstream-Integration
//! Low-level framework for composing the transport layer of the Tickstream ingestion pipeline.
//!
//! Used by `tickstream-data` to build robust exchange data collection integrations. It is:
//! * **Low-Level**: Translates raw WebSocket/HTTP data into any desired data model using
//!   arbitrary data transformations.
//! * **Flexible**: Compatible with any protocol (WebSocket, HTTP) and any user defined
//!   transformation.
//!
//! ## Core abstractions
//! - [`protocol::websocket`] providing a `StreamParser` over a tungstenite WebSocket.
//! - [`backoff::Backoff`] providing exponential backoff with full jitter for reconnect and
//!   retry loops.

use crate::error::SocketError;
use serde::{Deserialize, Serialize};

/// All [`Error`](std::error::Error)s generated in Tickstream-Integration.
pub mod error;

/// Contains `StreamParser` implementations for transforming communication protocol specific
/// messages into a generic output data structure.
pub mod protocol;

/// Utilities to assist deserialisation.
pub mod de;

/// Defines a [`SubscriptionId`](subscription::SubscriptionId) new type representing a unique
/// identifier for a data stream (market data) that has been subscribed to.
pub mod subscription;

/// Defines a trait [`Tx`](channel::Tx) abstraction over different channel kinds, as well as
/// other channel utilities.
///
/// eg/ `UnboundedTx`, `ChannelTxDroppable`, etc.
pub mod channel;

/// Exponential backoff with full jitter, used by reconnecting adapters and retrying REST calls.
pub mod backoff;

/// [`stream::ExchangeStream`], a protocol agnostic `Stream` that parses and transforms raw
/// protocol messages into a normalized output type.
pub mod stream;

/// [`reconnect::ReconnectingStream`] utilities for building an auto-reconnecting adapter
/// `Stream` on top of [`backoff::Backoff`].
pub mod reconnect;

/// [`Validator`]s are capable of determining if their internal state is satisfactory to fulfill
/// some use case defined by the implementor.
pub trait Validator {
    /// Check if `Self` is valid for some use case.
    fn validate(self) -> Result<Self, SocketError>
    where
        Self: Sized;
}

/// [`Transformer`]s are capable of transforming any `Input` into an iterator of
/// `Result<Self::Output, Self::Error>`s.
pub trait Transformer {
    type Error;
    type Input;
    type Output;
    type OutputIter: IntoIterator<Item = Result<Self::Output, Self::Error>>;

    fn transform(&mut self, input: Self::Input) -> Self::OutputIter;
}

/// Trait that communicates if something is terminal (eg/ requires shutdown or restart).
pub trait Terminal {
    fn is_terminal(&self) -> bool;
}

/// Indicates an `Iterator` or `Stream` has ended.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize,
)]
pub struct FeedEnded;
