use crate::{error::BusError, offset::ConsumerGroup, topic::Record};

/// Consumes records from a bus topic within a [`ConsumerGroup`], committing offsets once the
/// caller has finished processing a batch.
///
/// `auto_offset_reset = earliest` on cold start: a group with no committed offset starts from
/// the first record still retained on the topic.
pub trait Consumer {
    type Value: serde::de::DeserializeOwned + Send;

    /// Poll for the next batch of records since the last commit. May return an empty batch; the
    /// caller must tolerate this without treating it as end-of-stream.
    async fn poll(&mut self) -> Result<Vec<Record<Self::Value>>, BusError>;

    /// Durably advance this consumer's committed offset past every record in `records`.
    ///
    /// Must be called only once the corresponding output has itself been durably produced -
    /// this is what makes bar emission atomic with respect to the consumer offset commit.
    async fn commit(&mut self, records: &[Record<Self::Value>]) -> Result<(), BusError>;

    fn group(&self) -> &ConsumerGroup;
}
