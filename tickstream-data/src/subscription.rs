use crate::error::DataError;
use fnv::FnvHashMap;
use tickstream_instrument::ProductId;
use tickstream_integration::subscription::SubscriptionId;

/// A request to stream public trades for a single canonical product from a single exchange.
///
/// `exchange_symbol` is the already-normalized-to-exchange-spelling market string (eg/
/// Coinbase's `"BTC-USD"`, Kraken's `"BTC/USD"`) - the inverse of the Symbol Normalizer, which
/// maps the other direction on the way out.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Subscription<Exchange> {
    pub exchange: Exchange,
    pub product_id: ProductId,
    pub exchange_symbol: String,
}

impl<Exchange> Subscription<Exchange> {
    pub fn new(exchange: Exchange, product_id: ProductId, exchange_symbol: String) -> Self {
        Self {
            exchange,
            product_id,
            exchange_symbol,
        }
    }
}

/// Map from the [`SubscriptionId`] an exchange tags a message with, back to the canonical
/// [`ProductId`] it belongs to.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Map(pub FnvHashMap<SubscriptionId, ProductId>);

impl Map {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(FnvHashMap::with_capacity_and_hasher(
            capacity,
            Default::default(),
        ))
    }

    /// Find the [`ProductId`] associated with the given [`SubscriptionId`], or a
    /// [`DataError::Unidentifiable`] if no [`Subscription`] matches.
    pub fn find(&self, id: &SubscriptionId) -> Result<&ProductId, DataError> {
        self.0
            .get(id)
            .ok_or_else(|| DataError::Unidentifiable(id.clone()))
    }
}
