use crate::{error::BusError, topic::Topic};

/// Publishes keyed, JSON-valued records to a bus topic.
///
/// `key` determines partition assignment - callers key by canonical `product_id` so that every
/// record for a product lands on the same partition, which is the ordering guarantee the Bar
/// Builder relies on.
pub trait Producer {
    async fn send<V>(&self, topic: &Topic, key: String, value: &V) -> Result<(), BusError>
    where
        V: serde::Serialize + Send + Sync;
}
