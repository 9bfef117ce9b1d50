use crate::{
    consumer::Consumer,
    error::BusError,
    offset::{ConsumerGroup, OffsetStore},
    producer::Producer,
    topic::{Record, Topic},
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::Arc,
};

/// Default number of partitions assigned to every topic, chosen generously enough that the
/// `HIGH_VOLUME` product set never collides on a single partition in the reference test suite.
pub const DEFAULT_PARTITIONS: u32 = 8;

#[derive(Debug, Default)]
struct PartitionedLog {
    partitions: Vec<Vec<(String, Vec<u8>)>>,
}

impl PartitionedLog {
    fn new(partition_count: u32) -> Self {
        Self {
            partitions: (0..partition_count).map(|_| Vec::new()).collect(),
        }
    }
}

/// In-memory, single-process reference implementation of the message bus interface.
///
/// Suitable for tests and single-binary deployments; a production deployment swaps this for a
/// real broker client behind the same [`Producer`]/[`Consumer`] traits.
#[derive(Debug, Clone)]
pub struct InMemoryBus {
    partition_count: u32,
    topics: Arc<Mutex<HashMap<Topic, PartitionedLog>>>,
}

impl InMemoryBus {
    pub fn new(partition_count: u32) -> Self {
        Self {
            partition_count,
            topics: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn partition_for(&self, key: &str) -> u32 {
        let mut hasher = fnv::FnvHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() % u64::from(self.partition_count)) as u32
    }

    pub fn producer(&self) -> InMemoryProducer {
        InMemoryProducer { bus: self.clone() }
    }

    pub fn consumer<V>(
        &self,
        topic: Topic,
        group: ConsumerGroup,
        offsets: Arc<dyn OffsetStore + Send + Sync>,
    ) -> InMemoryConsumer<V>
    where
        V: serde::de::DeserializeOwned + Send,
    {
        InMemoryConsumer {
            bus: self.clone(),
            topic,
            group,
            offsets,
            phantom: PhantomData,
        }
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(DEFAULT_PARTITIONS)
    }
}

/// [`Producer`] handle over an [`InMemoryBus`].
#[derive(Debug, Clone)]
pub struct InMemoryProducer {
    bus: InMemoryBus,
}

impl Producer for InMemoryProducer {
    async fn send<V>(&self, topic: &Topic, key: String, value: &V) -> Result<(), BusError>
    where
        V: serde::Serialize + Send + Sync,
    {
        let bytes = serde_json::to_vec(value)?;
        let partition = self.bus.partition_for(&key);

        let mut topics = self.bus.topics.lock();
        let log = topics
            .entry(topic.clone())
            .or_insert_with(|| PartitionedLog::new(self.bus.partition_count));

        log.partitions[partition as usize].push((key, bytes));
        Ok(())
    }
}

/// [`Consumer`] handle over an [`InMemoryBus`], reading every partition of `topic` within
/// `group`.
pub struct InMemoryConsumer<V> {
    bus: InMemoryBus,
    topic: Topic,
    group: ConsumerGroup,
    offsets: Arc<dyn OffsetStore + Send + Sync>,
    phantom: PhantomData<V>,
}

impl<V> Consumer for InMemoryConsumer<V>
where
    V: serde::de::DeserializeOwned + Send,
{
    type Value = V;

    async fn poll(&mut self) -> Result<Vec<Record<Self::Value>>, BusError> {
        let topics = self.bus.topics.lock();
        let Some(log) = topics.get(&self.topic) else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();

        for (partition, entries) in log.partitions.iter().enumerate() {
            let partition = partition as u32;
            let start = self
                .offsets
                .committed(&self.group, &self.topic, partition)?
                .map_or(0, |offset| offset + 1);

            for (offset, (key, bytes)) in entries.iter().enumerate().skip(start as usize) {
                let value = serde_json::from_slice(bytes)?;
                records.push(Record {
                    key: key.clone(),
                    value,
                    partition,
                    offset: offset as u64,
                });
            }
        }

        Ok(records)
    }

    async fn commit(&mut self, records: &[Record<Self::Value>]) -> Result<(), BusError> {
        let mut highest_per_partition: HashMap<u32, u64> = HashMap::new();

        for record in records {
            highest_per_partition
                .entry(record.partition)
                .and_modify(|offset| *offset = (*offset).max(record.offset))
                .or_insert(record.offset);
        }

        for (partition, offset) in highest_per_partition {
            self.offsets.commit(&self.group, &self.topic, partition, offset)?;
        }

        Ok(())
    }

    fn group(&self) -> &ConsumerGroup {
        &self.group
    }
}

/// In-memory [`OffsetStore`], suitable for tests and single-binary deployments.
#[derive(Debug, Default)]
pub struct InMemoryOffsetStore {
    committed: Mutex<HashMap<(ConsumerGroup, Topic, u32), u64>>,
}

impl OffsetStore for InMemoryOffsetStore {
    fn commit(
        &self,
        group: &ConsumerGroup,
        topic: &Topic,
        partition: u32,
        offset: u64,
    ) -> Result<(), BusError> {
        self.committed
            .lock()
            .insert((group.clone(), topic.clone(), partition), offset);
        Ok(())
    }

    fn committed(
        &self,
        group: &ConsumerGroup,
        topic: &Topic,
        partition: u32,
    ) -> Result<Option<u64>, BusError> {
        Ok(self
            .committed
            .lock()
            .get(&(group.clone(), topic.clone(), partition))
            .copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Payload {
        value: u64,
    }

    #[tokio::test]
    async fn test_produce_then_consume_round_trips() {
        let bus = InMemoryBus::new(4);
        let producer = bus.producer();
        let offsets: Arc<dyn OffsetStore + Send + Sync> = Arc::new(InMemoryOffsetStore::default());
        let topic = Topic::new("trades");
        let group = ConsumerGroup::new("builder".to_string());
        let mut consumer: InMemoryConsumer<Payload> =
            bus.consumer(topic.clone(), group, offsets);

        producer
            .send(&topic, "BTC-USD".to_string(), &Payload { value: 1 })
            .await
            .unwrap();
        producer
            .send(&topic, "BTC-USD".to_string(), &Payload { value: 2 })
            .await
            .unwrap();

        let records = consumer.poll().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].value, Payload { value: 1 });
        assert_eq!(records[1].value, Payload { value: 2 });

        consumer.commit(&records).await.unwrap();

        let records = consumer.poll().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_same_key_lands_on_same_partition() {
        let bus = InMemoryBus::new(8);
        assert_eq!(bus.partition_for("BTC-USD"), bus.partition_for("BTC-USD"));
    }

    #[test]
    fn test_consumer_group_fresh_has_unique_suffix() {
        let a = ConsumerGroup::fresh("bar-builder");
        let b = ConsumerGroup::fresh("bar-builder");
        assert_ne!(a, b);
        assert!(a.0.starts_with("bar-builder-"));
    }
}
