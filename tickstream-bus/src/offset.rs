use crate::{error::BusError, topic::Topic};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Identity of a consumer group reading a topic.
///
/// `create_new_consumer_group` (per `kafka.create_new_consumer_group`) suffixes a fresh UUID
/// onto the configured group id, resetting consumption to `auto_offset_reset = earliest` -
/// used to re-run historical backfills from scratch.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Constructor, Deserialize, Serialize)]
pub struct ConsumerGroup(pub String);

impl ConsumerGroup {
    /// Derive a fresh [`ConsumerGroup`] from `base`, suffixed with a random UUID, so that
    /// consumption starts again from the earliest offset.
    pub fn fresh(base: impl Into<String>) -> Self {
        Self(format!("{}-{}", base.into(), uuid::Uuid::new_v4()))
    }
}

/// Persists the last committed offset per `(consumer group, topic, partition)`.
///
/// Offsets are committed after processing each message (at-least-once delivery); on cold start
/// a missing offset means `auto_offset_reset = earliest`.
pub trait OffsetStore {
    fn commit(
        &self,
        group: &ConsumerGroup,
        topic: &Topic,
        partition: u32,
        offset: u64,
    ) -> Result<(), BusError>;

    fn committed(
        &self,
        group: &ConsumerGroup,
        topic: &Topic,
        partition: u32,
    ) -> Result<Option<u64>, BusError>;
}
