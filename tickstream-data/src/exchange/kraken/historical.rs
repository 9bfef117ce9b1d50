use super::Kraken;
use crate::{error::DataError, exchange::Connector, historical::HistoricalConnector};
use chrono::Utc;
use serde::Deserialize;
use tickstream_instrument::{ProductId, Side, trade::Trade};
use url::Url;

/// [`Kraken`] public trade history REST endpoint base url.
///
/// See docs: <https://docs.kraken.com/rest/#tag/Spot-Market-Data/operation/getRecentTrades>
pub const BASE_URL_KRAKEN_HISTORICAL: &str = "https://api.kraken.com/0/public/Trades";

/// One [`Kraken`] historical trade, as returned by the `Trades` REST endpoint's raw array
/// format: `[price, volume, time, side, orderType, misc, trade_id]`.
#[derive(Clone, PartialEq, Debug)]
pub struct KrakenHistoricalTrade {
    pub price: f64,
    pub amount: f64,
    pub time: DateTimeUtc,
    pub side: Side,
    pub trade_id: i128,
}

type DateTimeUtc = chrono::DateTime<Utc>;

impl<'de> serde::de::Deserialize<'de> for KrakenHistoricalTrade {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SeqVisitor;

        impl<'de> serde::de::Visitor<'de> for SeqVisitor {
            type Value = KrakenHistoricalTrade;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("KrakenHistoricalTrade array from the Kraken Trades REST endpoint")
            }

            fn visit_seq<SeqAccessor>(
                self,
                mut seq: SeqAccessor,
            ) -> Result<Self::Value, SeqAccessor::Error>
            where
                SeqAccessor: serde::de::SeqAccess<'de>,
            {
                use tickstream_integration::de::extract_next;

                let price = extract_next::<SeqAccessor, String>(&mut seq, "price")?
                    .parse()
                    .map_err(serde::de::Error::custom)?;
                let amount = extract_next::<SeqAccessor, String>(&mut seq, "volume")?
                    .parse()
                    .map_err(serde::de::Error::custom)?;
                let time = extract_next::<SeqAccessor, String>(&mut seq, "time")?
                    .parse()
                    .map(|secs| tickstream_integration::de::datetime_utc_from_epoch_duration(
                        std::time::Duration::from_secs_f64(secs),
                    ))
                    .map_err(serde::de::Error::custom)?;
                let side = extract_next::<SeqAccessor, String>(&mut seq, "side")
                    .and_then(|raw| super::de_kraken_side(&raw).map_err(serde::de::Error::custom))?;
                let _order_type: serde::de::IgnoredAny = extract_next(&mut seq, "orderType")?;
                let _misc: serde::de::IgnoredAny = extract_next(&mut seq, "misc")?;
                let trade_id: i128 = extract_next(&mut seq, "trade_id")?;

                while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}

                Ok(KrakenHistoricalTrade {
                    price,
                    amount,
                    time,
                    side,
                    trade_id,
                })
            }
        }

        deserializer.deserialize_seq(SeqVisitor)
    }
}

#[derive(Deserialize)]
struct TradesResponse {
    error: Vec<String>,
    result: serde_json::Map<String, serde_json::Value>,
}

impl HistoricalConnector for Kraken {
    type RawTrade = KrakenHistoricalTrade;

    fn historical_url(product_id: &ProductId, since: i128) -> Result<Url, DataError> {
        let pair = super::market::KrakenMarket(product_id.as_str().replace('-', "/")).0;
        Url::parse_with_params(
            BASE_URL_KRAKEN_HISTORICAL,
            &[("pair", pair), ("since", since.to_string())],
        )
        .map_err(|error| DataError::Protocol(error.to_string()))
    }

    fn parse_page(
        body: &[u8],
    ) -> Result<crate::historical::HistoricalPage<Self::RawTrade>, DataError> {
        let response: TradesResponse = serde_json::from_slice(body)?;

        if !response.error.is_empty() {
            return Err(DataError::Protocol(response.error.join("; ")));
        }

        let last = response
            .result
            .get("last")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| DataError::Protocol("Kraken Trades response missing last cursor".to_string()))?
            .parse::<i128>()
            .map_err(|error| DataError::Protocol(error.to_string()))?;

        let trades = response
            .result
            .into_iter()
            .find(|(key, _)| key != "last")
            .map(|(_, value)| serde_json::from_value::<Vec<KrakenHistoricalTrade>>(value))
            .ok_or_else(|| DataError::Protocol("Kraken Trades response missing pair array".to_string()))?
            .map_err(DataError::from)?;

        Ok(crate::historical::HistoricalPage {
            trades,
            next_cursor: last,
        })
    }

    fn historical_trade(product_id: &ProductId, raw: &Self::RawTrade) -> Result<Trade, DataError> {
        Trade::new(
            product_id.clone(),
            raw.side,
            raw.price,
            raw.amount,
            raw.time,
            Kraken::ID,
        )
        .map_err(|error| DataError::Protocol(error.to_string()))
    }

    fn historical_trade_cursor(raw: &Self::RawTrade) -> i128 {
        raw.trade_id
    }

    fn historical_trade_timestamp_ms(raw: &Self::RawTrade) -> i64 {
        raw.time.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_kraken_historical_trade() {
        let input = r#"["30306.10000","0.00067000","1688000000.000000","b","m","",12345678]"#;
        let actual = serde_json::from_str::<KrakenHistoricalTrade>(input).unwrap();

        assert_eq!(actual.price, 30306.1);
        assert_eq!(actual.amount, 0.00067);
        assert_eq!(actual.side, Side::Buy);
        assert_eq!(actual.trade_id, 12345678);
    }

    #[test]
    fn test_historical_url() {
        let url = Kraken::historical_url(&ProductId::new("BTC-USD"), 123).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.kraken.com/0/public/Trades?pair=BTC%2FUSD&since=123"
        );
    }

    #[test]
    fn test_parse_page() {
        let body = r#"
        {
            "error": [],
            "result": {
                "XBT/USD": [
                    ["30306.10000","0.00067000","1688000000.000000","b","m","",1],
                    ["30307.10000","0.00167000","1688000001.000000","s","m","",2]
                ],
                "last": "1688000001000000000"
            }
        }
        "#;

        let page = Kraken::parse_page(body.as_bytes()).unwrap();
        assert_eq!(page.trades.len(), 2);
        assert_eq!(page.next_cursor, 1688000001000000000);
    }
}
