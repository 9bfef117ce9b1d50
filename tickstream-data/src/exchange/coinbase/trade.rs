use super::CoinbaseChannel;
use crate::{HeartbeatMarker, Identifier, error::DataError, exchange::subscription::ExchangeSub};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tickstream_instrument::{ProductId, Side, exchange::ExchangeId, trade::Trade};
use tickstream_integration::subscription::SubscriptionId;

/// [`Coinbase`](super::Coinbase) message variants that can be received over the WebSocket once
/// subscribed to the `matches` channel.
///
/// ### Raw Payload Examples
/// #### Match
/// See docs: <https://docs.cloud.coinbase.com/exchange/docs/websocket-channels#match>
/// ```json
/// {"type": "match", "trade_id": 10, ...}
/// ```
///
/// #### Heartbeat
/// Coinbase sends a heartbeat on channels with no recent trade activity to keep the connection
/// alive; it carries no tradeable data.
/// ```json
/// {"type": "heartbeat", "sequence": 90, "last_trade_id": 20, "product_id": "BTC-USD", "time": "2014-11-07T08:19:28.464459Z"}
/// ```
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoinbaseMessage {
    Match(CoinbaseTrade),
    Heartbeat(CoinbaseHeartbeat),
}

impl Identifier<Option<SubscriptionId>> for CoinbaseMessage {
    fn id(&self) -> Option<SubscriptionId> {
        match self {
            Self::Match(trade) => trade.id(),
            Self::Heartbeat(_) => None,
        }
    }
}

impl HeartbeatMarker for CoinbaseMessage {
    fn is_heartbeat(&self) -> bool {
        matches!(self, Self::Heartbeat(_))
    }
}

impl From<(ExchangeId, ProductId, CoinbaseMessage)> for Vec<Result<Trade, DataError>> {
    fn from((exchange, product_id, message): (ExchangeId, ProductId, CoinbaseMessage)) -> Self {
        match message {
            CoinbaseMessage::Match(trade) => Vec::from((exchange, product_id, trade)),
            CoinbaseMessage::Heartbeat(_) => vec![],
        }
    }
}

/// Coinbase heartbeat keepalive message, sent periodically on channels with no recent activity.
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct CoinbaseHeartbeat {
    pub sequence: Option<u64>,
    pub last_trade_id: Option<u64>,
    pub product_id: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

/// Coinbase real-time trade WebSocket message.
///
/// ### Raw Payload Examples
/// See docs: <https://docs.cloud.coinbase.com/exchange/docs/websocket-channels#match>
/// ```json
/// {
///     "type": "match",
///     "trade_id": 10,
///     "sequence": 50,
///     "maker_order_id": "ac928c66-ca53-498f-9c13-a110027a60e8",
///     "taker_order_id": "132fb6ae-456b-4654-b4e0-d681ac05cea1",
///     "time": "2014-11-07T08:19:27.028459Z",
///     "product_id": "BTC-USD",
///     "size": "5.23512",
///     "price":
///     "400.23",
///     "side": "sell"
/// }
/// ```
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize, Serialize)]
pub struct CoinbaseTrade {
    #[serde(alias = "product_id", deserialize_with = "de_trade_subscription_id")]
    pub subscription_id: SubscriptionId,
    #[serde(alias = "trade_id")]
    pub id: u64,
    pub time: DateTime<Utc>,
    #[serde(alias = "size", deserialize_with = "tickstream_integration::de::de_str")]
    pub amount: f64,
    #[serde(deserialize_with = "tickstream_integration::de::de_str")]
    pub price: f64,
    pub side: Side,
}

impl Identifier<Option<SubscriptionId>> for CoinbaseTrade {
    fn id(&self) -> Option<SubscriptionId> {
        Some(self.subscription_id.clone())
    }
}

impl From<(ExchangeId, ProductId, CoinbaseTrade)> for Vec<Result<Trade, DataError>> {
    fn from((exchange, product_id, trade): (ExchangeId, ProductId, CoinbaseTrade)) -> Self {
        vec![
            Trade::new(product_id, trade.side, trade.price, trade.amount, trade.time, exchange)
                .map_err(|error| DataError::Protocol(error.to_string())),
        ]
    }
}

/// Deserialize a [`CoinbaseTrade`] "product_id" (eg/ "BTC-USD") as the associated
/// [`SubscriptionId`] (eg/ `SubscriptionId("matches|BTC-USD")`).
pub fn de_trade_subscription_id<'de, D>(deserializer: D) -> Result<SubscriptionId, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    <&str as Deserialize>::deserialize(deserializer)
        .map(|product_id| ExchangeSub::from((CoinbaseChannel::TRADES, product_id)).id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_de_coinbase_trade() {
        let input = r#"
        {
            "type": "match","trade_id": 10,"sequence": 50,
            "maker_order_id": "ac928c66-ca53-498f-9c13-a110027a60e8",
            "taker_order_id": "132fb6ae-456b-4654-b4e0-d681ac05cea1",
            "time": "2014-11-07T08:19:27.028459Z",
            "product_id": "BTC-USD", "size": "5.23512", "price": "400.23", "side": "sell"
        }"#;

        let actual = serde_json::from_str::<CoinbaseTrade>(input).unwrap();

        assert_eq!(actual.subscription_id, SubscriptionId::from("matches|BTC-USD"));
        assert_eq!(actual.id, 10);
        assert_eq!(actual.price, 400.23);
        assert_eq!(actual.amount, 5.23512);
        assert_eq!(actual.side, Side::Sell);
        assert_eq!(
            actual.time,
            chrono::NaiveDateTime::from_str("2014-11-07T08:19:27.028459")
                .unwrap()
                .and_utc()
        );
    }

    #[test]
    fn test_de_coinbase_trade_rejects_unknown_type() {
        let input = r#"{"type": "unknown", "sequence": 50,"product_id": "BTC-USD"}"#;
        assert!(serde_json::from_str::<CoinbaseTrade>(input).is_err());
    }

    #[test]
    fn test_de_coinbase_message_match() {
        let input = r#"
        {
            "type": "match","trade_id": 10,"sequence": 50,
            "maker_order_id": "ac928c66-ca53-498f-9c13-a110027a60e8",
            "taker_order_id": "132fb6ae-456b-4654-b4e0-d681ac05cea1",
            "time": "2014-11-07T08:19:27.028459Z",
            "product_id": "BTC-USD", "size": "5.23512", "price": "400.23", "side": "sell"
        }"#;

        let actual = serde_json::from_str::<CoinbaseMessage>(input).unwrap();
        assert!(matches!(actual, CoinbaseMessage::Match(_)));
        assert!(!actual.is_heartbeat());
    }

    #[test]
    fn test_de_coinbase_message_heartbeat() {
        let input = r#"
        {"type": "heartbeat", "sequence": 90, "last_trade_id": 20,
         "product_id": "BTC-USD", "time": "2014-11-07T08:19:28.464459Z"}"#;

        let actual = serde_json::from_str::<CoinbaseMessage>(input).unwrap();
        assert!(actual.is_heartbeat());
        assert_eq!(actual.id(), None);
        assert_eq!(Vec::from((ExchangeId::Coinbase, ProductId::new("BTC-USD"), actual)), Vec::new());
    }
}
