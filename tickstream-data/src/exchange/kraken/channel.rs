use super::Kraken;
use crate::{Identifier, subscription::Subscription};
use serde::Serialize;

/// Type that defines how to translate a canonical [`Subscription`] into a [`Kraken`] channel to
/// be subscribed to.
///
/// See docs: <https://docs.kraken.com/websockets/#message-subscribe>
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct KrakenChannel(pub &'static str);

impl KrakenChannel {
    /// [`Kraken`] real-time trades channel name.
    pub const TRADES: Self = Self("trade");
}

impl Identifier<KrakenChannel> for Subscription<Kraken> {
    fn id(&self) -> KrakenChannel {
        KrakenChannel::TRADES
    }
}

impl AsRef<str> for KrakenChannel {
    fn as_ref(&self) -> &str {
        self.0
    }
}
