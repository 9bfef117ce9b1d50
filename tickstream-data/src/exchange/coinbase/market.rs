use super::Coinbase;
use crate::{Identifier, subscription::Subscription};
use serde::{Deserialize, Serialize};

/// Type that defines how to translate a canonical [`Subscription`] into a [`Coinbase`] market
/// that can be subscribed to.
///
/// See docs: <https://docs.cloud.coinbase.com/exchange/docs/websocket-overview#subscribe>
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub struct CoinbaseMarket(pub String);

impl Identifier<CoinbaseMarket> for Subscription<Coinbase> {
    fn id(&self) -> CoinbaseMarket {
        CoinbaseMarket(self.exchange_symbol.to_uppercase())
    }
}

impl AsRef<str> for CoinbaseMarket {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
