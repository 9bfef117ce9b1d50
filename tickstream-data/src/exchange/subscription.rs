use crate::{Identifier, subscription::Subscription};
use tickstream_integration::subscription::SubscriptionId;

/// Defines an exchange specific market and channel combination used by an exchange
/// [`Connector`](super::Connector) to build the subscription payloads sent to the exchange
/// server.
///
/// ### Examples
/// #### Coinbase PublicTrades
/// ```json
/// ExchangeSub { channel: CoinbaseChannel("matches"), market: CoinbaseMarket("BTC-USD") }
/// ```
/// #### Kraken PublicTrades
/// ```json
/// ExchangeSub { channel: KrakenChannel("trade"), market: KrakenMarket("BTC/USD") }
/// ```
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ExchangeSub<Channel, Market> {
    pub channel: Channel,
    pub market: Market,
}

impl<Channel, Market> Identifier<SubscriptionId> for ExchangeSub<Channel, Market>
where
    Channel: AsRef<str>,
    Market: AsRef<str>,
{
    fn id(&self) -> SubscriptionId {
        SubscriptionId::from(format!(
            "{}|{}",
            self.channel.as_ref(),
            self.market.as_ref()
        ))
    }
}

impl<Channel, Market> ExchangeSub<Channel, Market>
where
    Channel: AsRef<str>,
    Market: AsRef<str>,
{
    /// Construct a new exchange specific [`Self`] from the given canonical [`Subscription`].
    pub fn new<Exchange>(sub: &Subscription<Exchange>) -> Self
    where
        Subscription<Exchange>: Identifier<Channel> + Identifier<Market>,
    {
        Self {
            channel: sub.id(),
            market: sub.id(),
        }
    }
}

impl<Channel, Market> From<(Channel, Market)> for ExchangeSub<Channel, Market>
where
    Channel: AsRef<str>,
    Market: AsRef<str>,
{
    fn from((channel, market): (Channel, Market)) -> Self {
        Self { channel, market }
    }
}
