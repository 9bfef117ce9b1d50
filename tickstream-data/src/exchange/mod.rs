use self::subscription::ExchangeSub;
use crate::{Identifier, subscription::Map};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tickstream_instrument::exchange::ExchangeId;
use tickstream_integration::{
    Validator, error::SocketError, protocol::websocket::WsMessage, subscription::SubscriptionId,
};
use std::{fmt::Debug, time::Duration};
use url::Url;

/// [`Connector`] and adapter wiring for Coinbase.
pub mod coinbase;

/// [`Connector`] and adapter wiring for Kraken.
pub mod kraken;

/// Defines the generic [`ExchangeSub`] containing a market and channel combination used by an
/// exchange [`Connector`] to build subscription payloads.
pub mod subscription;

/// Default [`Duration`] the subscription validator will wait to receive all success responses
/// to actioned subscription requests.
pub const DEFAULT_SUBSCRIPTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Primary exchange abstraction. Defines how to translate canonical subscriptions into exchange
/// specific requests, and how to parse the exchange's raw websocket payload into the `Input`
/// type consumed by the stateless transformer.
///
/// ### Notes
/// This must be implemented for a new exchange integration.
pub trait Connector
where
    Self: Clone + Default + Debug + for<'de> Deserialize<'de> + Serialize + Sized,
{
    /// Unique identifier for the exchange server being connected with.
    const ID: ExchangeId;

    /// Type that defines how to translate a [`Subscription`](crate::subscription::Subscription)
    /// into an exchange specific channel to be subscribed to.
    type Channel: AsRef<str>;

    /// Type that defines how to translate a [`Subscription`](crate::subscription::Subscription)
    /// into an exchange specific market that can be subscribed to.
    type Market: AsRef<str>;

    /// Raw websocket payload type deserialized from this exchange's trade feed.
    type Input: Identifier<Option<SubscriptionId>> + for<'de> Deserialize<'de> + Send + 'static;

    /// Deserialisable type expected in response to an actioned subscription request. Implements
    /// [`Validator`] to determine if the exchange confirmed or rejected the subscription.
    type SubResponse: Validator + Debug + DeserializeOwned;

    /// Base [`Url`] of the exchange server being connected with.
    fn url() -> Result<Url, SocketError>;

    /// Custom application-level websocket ping schedule for this exchange. Defaults to `None`,
    /// meaning protocol-level pings are relied on exclusively.
    fn ping_interval() -> Option<PingInterval> {
        None
    }

    /// Translate a collection of [`ExchangeSub`]s into the [`WsMessage`] subscription payloads
    /// sent to the exchange server.
    fn requests(exchange_subs: Vec<ExchangeSub<Self::Channel, Self::Market>>) -> Vec<WsMessage>;

    /// Number of subscription responses expected from the exchange server, used to validate
    /// every actioned subscription was accepted.
    fn expected_responses(map: &Map) -> usize {
        map.0.len()
    }

    /// Number of raw control messages to read and discard per subscribed product, after
    /// subscription validation succeeds and before the adapter is considered streaming.
    ///
    /// Defaults to `0`. Kraken overrides this: its server interleaves two leading control
    /// messages per pair ahead of live trade data.
    fn control_messages_to_skip(_map: &Map) -> usize {
        0
    }

    /// Expected [`Duration`] to wait to receive all success responses to actioned subscription
    /// requests.
    fn subscription_timeout() -> Duration {
        DEFAULT_SUBSCRIPTION_TIMEOUT
    }
}

/// Defines the frequency and construction function for custom application-level websocket
/// pings - used by exchanges that require additional pings beyond the protocol level.
#[derive(Debug)]
pub struct PingInterval {
    pub interval: tokio::time::Interval,
    pub ping: fn() -> WsMessage,
}
