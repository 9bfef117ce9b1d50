use super::Kraken;
use crate::{Identifier, subscription::Subscription};
use serde::{Deserialize, Serialize};

/// Type that defines how to translate a canonical [`Subscription`] into a [`Kraken`] market that
/// can be subscribed to.
///
/// See docs: <https://docs.kraken.com/websockets/#message-subscribe>
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub struct KrakenMarket(pub String);

impl Identifier<KrakenMarket> for Subscription<Kraken> {
    fn id(&self) -> KrakenMarket {
        KrakenMarket(self.exchange_symbol.to_uppercase())
    }
}

impl AsRef<str> for KrakenMarket {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
