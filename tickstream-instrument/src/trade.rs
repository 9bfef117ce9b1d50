use crate::{ProductId, Side, exchange::ExchangeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical, normalized trade record - the output of every Exchange Adapter and the value
/// schema of the `trades` bus topic.
///
/// Immutable once produced. `side` is closed over [`Side`]'s two-element set; `price` and
/// `volume` are strictly positive; `timestamp` is monotonically non-decreasing per
/// `(exchange, product_id)` stream within a single adapter session (out-of-order arrivals across
/// sessions are permitted and tolerated by the bar builder).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Trade {
    pub product_id: ProductId,
    pub side: Side,
    pub price: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
    pub exchange: ExchangeId,
}

/// Error constructing a [`Trade`] whose `price` or `volume` fails the positivity invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("invalid trade field: {_0}")]
pub struct InvalidTrade(pub &'static str);

impl std::error::Error for InvalidTrade {}

impl Trade {
    /// Construct a [`Trade`], enforcing the `price > 0` and `volume > 0` invariants.
    pub fn new(
        product_id: ProductId,
        side: Side,
        price: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
        exchange: ExchangeId,
    ) -> Result<Self, InvalidTrade> {
        if !(price > 0.0) {
            return Err(InvalidTrade("price must be positive"));
        }
        if !(volume > 0.0) {
            return Err(InvalidTrade("volume must be positive"));
        }

        Ok(Self {
            product_id,
            side,
            price,
            volume,
            timestamp,
            exchange,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_trade_rejects_non_positive_price() {
        let err = Trade::new(
            ProductId::new("BTC-USD"),
            Side::Buy,
            0.0,
            1.0,
            ts(),
            ExchangeId::Coinbase,
        )
        .unwrap_err();
        assert_eq!(err, InvalidTrade("price must be positive"));
    }

    #[test]
    fn test_trade_rejects_non_positive_volume() {
        let err = Trade::new(
            ProductId::new("BTC-USD"),
            Side::Sell,
            100.0,
            -1.0,
            ts(),
            ExchangeId::Coinbase,
        )
        .unwrap_err();
        assert_eq!(err, InvalidTrade("volume must be positive"));
    }

    #[test]
    fn test_trade_accepts_valid_fields() {
        assert!(
            Trade::new(
                ProductId::new("ETH-USD"),
                Side::Buy,
                2000.5,
                0.5,
                ts(),
                ExchangeId::Kraken
            )
            .is_ok()
        );
    }
}
