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

//! # Tickstream-Data
//! Exchange adapters that turn raw Coinbase and Kraken public trade feeds into a normalised
//! stream of [`Trade`](tickstream_instrument::trade::Trade)s for the Tickstream ingestion
//! pipeline. It is:
//! * **Normalised**: every exchange [`Connector`](exchange::Connector) produces the same
//!   canonical [`Trade`](tickstream_instrument::trade::Trade) output.
//! * **Real-time and historical**: [`live`] initialises an auto-reconnecting WebSocket stream,
//!   [`historical`] backfills via the exchange's paginated REST trade history endpoint.
//! * **Fan-out aware**: [`fanout`] decides when a product warrants a dedicated adapter
//!   connection rather than sharing one with other low-volume subscriptions.

/// All [`Error`](std::error::Error)s generated in Tickstream-Data.
pub mod error;

/// [`exchange::Connector`] implementations for each supported exchange (Coinbase, Kraken).
pub mod exchange;

/// Fan-out policy deciding which products receive a dedicated adapter connection.
pub mod fanout;

/// REST historical trade backfill adapter, with on-disk response caching.
pub mod historical;

/// Live, auto-reconnecting WebSocket adapter [`Stream`](futures::Stream) construction.
pub mod live;

/// Maps exchange specific symbols onto canonical [`ProductId`](tickstream_instrument::ProductId)s.
pub mod normalizer;

/// [`subscriber::subscribe`], [`subscriber::mapper::SubscriptionMapper`] and
/// [`subscriber::validator::SubscriptionValidator`] defining how a [`exchange::Connector`]
/// actions and confirms WebSocket subscriptions.
pub mod subscriber;

/// Canonical [`subscription::Subscription`] and the [`subscription::Map`] built from actioning
/// one.
pub mod subscription;

/// [`transformer::ExchangeTransformer`] implementations that translate exchange specific
/// payloads into normalised [`Trade`](tickstream_instrument::trade::Trade)s.
pub mod transformer;

/// Defines a generic identification type for the implementor.
///
/// eg/ a raw exchange payload identifies the [`SubscriptionId`](tickstream_integration::subscription::SubscriptionId)
/// it belongs to, so it can be resolved to the canonical [`ProductId`](tickstream_instrument::ProductId)
/// that subscribed to it.
pub trait Identifier<T> {
    fn id(&self) -> T;
}

/// Lets a [`transformer::ExchangeTransformer`] recognise a non-trade keepalive message so it can
/// be counted separately rather than silently dropped as unidentifiable.
///
/// Defaults to `false` - most raw payload types carry no such variant.
pub trait HeartbeatMarker {
    fn is_heartbeat(&self) -> bool {
        false
    }
}
