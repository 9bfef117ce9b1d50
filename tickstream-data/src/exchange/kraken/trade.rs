use super::message::KrakenMessage;
use crate::Identifier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tickstream_instrument::Side;
use tickstream_integration::{
    de::{datetime_utc_from_epoch_duration, extract_next},
    subscription::SubscriptionId,
};

/// Terse type alias for a [`Kraken`](super::Kraken) real-time trades WebSocket message.
pub type KrakenTrades = KrakenMessage<KrakenTradesInner>;

/// Collection of [`KrakenTrade`] items with an associated [`SubscriptionId`] (eg/ "trade|XBT/USD").
///
/// See [`KrakenMessage`] for full raw payload examples.
///
/// See docs: <https://docs.kraken.com/websockets/#message-trade>
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct KrakenTradesInner {
    pub subscription_id: SubscriptionId,
    pub trades: Vec<KrakenTrade>,
}

/// [`Kraken`](super::Kraken) trade.
///
/// See [`KrakenMessage`] for full raw payload examples.
///
/// See docs: <https://docs.kraken.com/websockets/#message-trade>
#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct KrakenTrade {
    pub price: f64,
    #[serde(rename = "quantity")]
    pub amount: f64,
    pub time: DateTime<Utc>,
    pub side: Side,
}

impl Identifier<Option<SubscriptionId>> for KrakenTradesInner {
    fn id(&self) -> Option<SubscriptionId> {
        Some(self.subscription_id.clone())
    }
}

impl From<(tickstream_instrument::exchange::ExchangeId, tickstream_instrument::ProductId, KrakenTrades)>
    for Vec<Result<tickstream_instrument::trade::Trade, crate::error::DataError>>
{
    fn from(
        (exchange, product_id, trades): (
            tickstream_instrument::exchange::ExchangeId,
            tickstream_instrument::ProductId,
            KrakenTrades,
        ),
    ) -> Self {
        match trades {
            KrakenTrades::Data(inner) => inner
                .trades
                .into_iter()
                .map(|trade| {
                    tickstream_instrument::trade::Trade::new(
                        product_id.clone(),
                        trade.side,
                        trade.price,
                        trade.amount,
                        trade.time,
                        exchange,
                    )
                    .map_err(|error| crate::error::DataError::Protocol(error.to_string()))
                })
                .collect(),
            KrakenTrades::Event(_) => Vec::new(),
        }
    }
}

impl<'de> serde::de::Deserialize<'de> for KrakenTradesInner {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SeqVisitor;

        impl<'de> serde::de::Visitor<'de> for SeqVisitor {
            type Value = KrakenTradesInner;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("KrakenTradesInner struct from the Kraken WebSocket API")
            }

            fn visit_seq<SeqAccessor>(
                self,
                mut seq: SeqAccessor,
            ) -> Result<Self::Value, SeqAccessor::Error>
            where
                SeqAccessor: serde::de::SeqAccess<'de>,
            {
                // KrakenTrades Sequence Format:
                // [channelID, [[price, volume, time, side, orderType, misc]], channelName, pair]
                // <https://docs.kraken.com/websockets/#message-trade>
                let _: serde::de::IgnoredAny = extract_next(&mut seq, "channelID")?;
                let trades = extract_next(&mut seq, "Vec<KrakenTrade>")?;
                let _: serde::de::IgnoredAny = extract_next(&mut seq, "channelName")?;
                let subscription_id = extract_next::<SeqAccessor, String>(&mut seq, "pair")
                    .map(|pair| SubscriptionId::from(format!("trade|{pair}")))?;

                while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}

                Ok(KrakenTradesInner {
                    subscription_id,
                    trades,
                })
            }
        }

        deserializer.deserialize_seq(SeqVisitor)
    }
}

impl<'de> serde::de::Deserialize<'de> for KrakenTrade {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SeqVisitor;

        impl<'de> serde::de::Visitor<'de> for SeqVisitor {
            type Value = KrakenTrade;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("KrakenTrade struct from the Kraken WebSocket API")
            }

            fn visit_seq<SeqAccessor>(
                self,
                mut seq: SeqAccessor,
            ) -> Result<Self::Value, SeqAccessor::Error>
            where
                SeqAccessor: serde::de::SeqAccess<'de>,
            {
                // KrakenTrade Sequence Format:
                // [price, volume, time, side, orderType, misc]
                // <https://docs.kraken.com/websockets/#message-trade>
                let price = extract_next::<SeqAccessor, String>(&mut seq, "price")?
                    .parse()
                    .map_err(serde::de::Error::custom)?;

                let amount = extract_next::<SeqAccessor, String>(&mut seq, "quantity")?
                    .parse()
                    .map_err(serde::de::Error::custom)?;

                let time = extract_next::<SeqAccessor, String>(&mut seq, "time")?
                    .parse()
                    .map(|time| {
                        datetime_utc_from_epoch_duration(std::time::Duration::from_secs_f64(time))
                    })
                    .map_err(serde::de::Error::custom)?;

                let side = extract_next::<SeqAccessor, String>(&mut seq, "side")
                    .and_then(|raw| super::de_kraken_side(&raw).map_err(serde::de::Error::custom))?;

                while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}

                Ok(KrakenTrade {
                    price,
                    amount,
                    time,
                    side,
                })
            }
        }

        deserializer.deserialize_seq(SeqVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_kraken_message_trades() {
        let input = r#"
        [
            0,
            [
                ["5541.20000", "0.15850568", "1534614057.321597", "s", "l", ""],
                ["6060.00000", "0.02455000", "1534614057.324998", "b", "l", ""]
            ],
          "trade",
          "XBT/USD"
        ]
        "#;

        let actual = serde_json::from_str::<KrakenTrades>(input).unwrap();

        assert_eq!(
            actual,
            KrakenTrades::Data(KrakenTradesInner {
                subscription_id: SubscriptionId::from("trade|XBT/USD"),
                trades: vec![
                    KrakenTrade {
                        price: 5541.2,
                        amount: 0.15850568,
                        time: datetime_utc_from_epoch_duration(std::time::Duration::from_secs_f64(
                            1534614057.321597
                        )),
                        side: Side::Sell,
                    },
                    KrakenTrade {
                        price: 6060.0,
                        amount: 0.02455000,
                        time: datetime_utc_from_epoch_duration(std::time::Duration::from_secs_f64(
                            1534614057.324998
                        )),
                        side: Side::Buy,
                    },
                ],
            })
        );
    }
}
