use self::{
    channel::CoinbaseChannel, market::CoinbaseMarket, subscription::CoinbaseSubResponse,
    trade::CoinbaseMessage,
};
use crate::exchange::{Connector, subscription::ExchangeSub};
use derive_more::Display;
use serde_json::json;
use tickstream_instrument::exchange::ExchangeId;
use tickstream_integration::{error::SocketError, protocol::websocket::WsMessage};
use tickstream_macro::{DeExchange, SerExchange};
use url::Url;

/// Type that defines how to translate a canonical [`Subscription`](crate::subscription::Subscription)
/// into a [`Coinbase`] specific channel used for generating [`Connector::requests`].
pub mod channel;

/// Type that defines how to translate a canonical [`Subscription`](crate::subscription::Subscription)
/// into a [`Coinbase`] specific market used for generating [`Connector::requests`].
pub mod market;

/// Subscription response type and response
/// [`Validator`](tickstream_integration::Validator) for [`Coinbase`].
pub mod subscription;

/// Public trade types for [`Coinbase`].
pub mod trade;

/// [`Coinbase`] server base url.
///
/// See docs: <https://docs.cloud.coinbase.com/exchange/docs/websocket-overview>
pub const BASE_URL_COINBASE: &str = "wss://ws-feed.exchange.coinbase.com";

/// [`Coinbase`] exchange.
///
/// See docs: <https://docs.cloud.coinbase.com/exchange/docs/websocket-overview>
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Display, DeExchange, SerExchange,
)]
pub struct Coinbase;

impl Connector for Coinbase {
    const ID: ExchangeId = ExchangeId::Coinbase;
    type Channel = CoinbaseChannel;
    type Market = CoinbaseMarket;
    type Input = CoinbaseMessage;
    type SubResponse = CoinbaseSubResponse;

    fn url() -> Result<Url, SocketError> {
        Url::parse(BASE_URL_COINBASE).map_err(SocketError::UrlParse)
    }

    fn requests(exchange_subs: Vec<ExchangeSub<Self::Channel, Self::Market>>) -> Vec<WsMessage> {
        exchange_subs
            .into_iter()
            .map(|ExchangeSub { channel, market }| {
                WsMessage::text(
                    json!({
                        "type": "subscribe",
                        "product_ids": [market.as_ref()],
                        "channels": [channel.as_ref()],
                    })
                    .to_string(),
                )
            })
            .collect()
    }
}
