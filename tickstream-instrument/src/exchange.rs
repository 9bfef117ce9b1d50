use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Unique identifier for a supported exchange.
///
/// ### Notes
/// Only the exchanges with a concrete `Connector` implementation in `tickstream-data` are
/// represented here - extending coverage to a new exchange starts by adding a variant.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename = "exchange", rename_all = "snake_case")]
pub enum ExchangeId {
    Coinbase,
    Kraken,
}

impl ExchangeId {
    /// Return the &str representation of this [`ExchangeId`].
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Coinbase => "coinbase",
            ExchangeId::Kraken => "kraken",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_de_exchange_id() {
        assert_eq!(
            serde_json::from_str::<ExchangeId>(r#""coinbase""#).unwrap(),
            ExchangeId::Coinbase
        );
        assert_eq!(
            serde_json::from_str::<ExchangeId>(r#""kraken""#).unwrap(),
            ExchangeId::Kraken
        );
    }
}
