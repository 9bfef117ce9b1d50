use self::{
    channel::KrakenChannel, market::KrakenMarket, subscription::KrakenSubResponse,
    trade::KrakenTrades,
};
use crate::{exchange::{Connector, subscription::ExchangeSub}, subscription::Map};
use derive_more::Display;
use serde_json::json;
use tickstream_instrument::{Side, exchange::ExchangeId};
use tickstream_integration::{error::SocketError, protocol::websocket::WsMessage};
use tickstream_macro::{DeExchange, SerExchange};
use url::Url;

/// Type that defines how to translate a canonical [`Subscription`](crate::subscription::Subscription)
/// into a [`Kraken`] specific channel used for generating [`Connector::requests`].
pub mod channel;

/// [`HistoricalConnector`](crate::historical::HistoricalConnector) impl backfilling trades from
/// [`Kraken`]'s REST `Trades` endpoint.
pub mod historical;

/// Type that defines how to translate a canonical [`Subscription`](crate::subscription::Subscription)
/// into a [`Kraken`] specific market used for generating [`Connector::requests`].
pub mod market;

/// [`KrakenMessage`](message::KrakenMessage) type for [`Kraken`].
pub mod message;

/// Subscription response type and response [`Validator`](tickstream_integration::Validator) for
/// [`Kraken`].
pub mod subscription;

/// Public trade types for [`Kraken`].
pub mod trade;

/// [`Kraken`] server base url.
///
/// See docs: <https://docs.kraken.com/websockets/#overview>
pub const BASE_URL_KRAKEN: &str = "wss://ws.kraken.com/";

/// [`Kraken`] exchange.
///
/// See docs: <https://docs.kraken.com/websockets/#overview>
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, DeExchange, SerExchange,
)]
pub struct Kraken;

impl Connector for Kraken {
    const ID: ExchangeId = ExchangeId::Kraken;
    type Channel = KrakenChannel;
    type Market = KrakenMarket;
    type Input = KrakenTrades;
    type SubResponse = KrakenSubResponse;

    fn url() -> Result<Url, SocketError> {
        Url::parse(BASE_URL_KRAKEN).map_err(SocketError::UrlParse)
    }

    fn requests(exchange_subs: Vec<ExchangeSub<Self::Channel, Self::Market>>) -> Vec<WsMessage> {
        exchange_subs
            .into_iter()
            .map(|ExchangeSub { channel, market }| {
                WsMessage::text(
                    json!({
                        "event": "subscribe",
                        "pair": [market.as_ref()],
                        "subscription": {
                            "name": channel.as_ref()
                        }
                    })
                    .to_string(),
                )
            })
            .collect()
    }

    /// Kraken interleaves two leading control messages per subscribed pair ahead of live trade
    /// data (an initial snapshot-style payload and a heartbeat), neither shaped like
    /// [`KrakenSubResponse`]. Skip exactly `2 * products` of them before streaming.
    fn control_messages_to_skip(map: &Map) -> usize {
        2 * map.0.len()
    }
}

/// Map a [`Kraken`] raw trade side tag (`"b"`/`"s"`, occasionally the spelled out
/// `"buy"`/`"sell"`) onto the canonical [`Side`]. Anything else is a protocol violation.
pub fn de_kraken_side(raw: &str) -> Result<Side, String> {
    match raw {
        "b" | "buy" => Ok(Side::Buy),
        "s" | "sell" => Ok(Side::Sell),
        other => Err(format!("unrecognised Kraken trade side: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_kraken_side() {
        assert_eq!(de_kraken_side("b").unwrap(), Side::Buy);
        assert_eq!(de_kraken_side("s").unwrap(), Side::Sell);
        assert!(de_kraken_side("x").is_err());
    }
}
