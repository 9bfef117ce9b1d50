use crate::{
    aggregation::Aggregation,
    error::EngineError,
    feature::FeatureRegistry,
    snowflake::SnowflakeGenerator,
    state::BarState,
    tick_imbalance, time, volume,
};
use chrono::Duration;
use indexmap::IndexMap;
use tickstream_bus::{Consumer, Producer, Topic};
use tickstream_instrument::{ProductId, Trade};
use tracing::{debug, info, instrument};

/// Keyed streaming operator that turns a `trades` topic into a `bars` topic.
///
/// One `BarEngine` instance is a single logical worker over its assigned partitions: state is
/// strictly partition-local (an [`IndexMap`] keyed by `product_id`), so running several engines
/// concurrently - one per `(consumer group, partition)` pair - never needs cross-worker
/// coordination. Emission is made atomic with the consumer offset commit by only committing a
/// polled batch's offsets once every bar it produced has itself been durably sent.
pub struct BarEngine<C, P> {
    consumer: C,
    producer: P,
    bars_topic: Topic,
    products: IndexMap<ProductId, Aggregation>,
    states: IndexMap<ProductId, BarState>,
    snowflake: SnowflakeGenerator,
    features: FeatureRegistry,
}

impl<C, P> BarEngine<C, P>
where
    C: Consumer<Value = Trade>,
    P: Producer,
{
    pub fn new(
        consumer: C,
        producer: P,
        bars_topic: Topic,
        products: IndexMap<ProductId, Aggregation>,
        machine_id: i64,
    ) -> Self {
        Self {
            consumer,
            producer,
            bars_topic,
            products,
            states: IndexMap::new(),
            snowflake: SnowflakeGenerator::new(machine_id),
            features: FeatureRegistry::standard(),
        }
    }

    /// Poll once, process every returned record, produce any resulting bars, and commit offsets.
    /// Returns the number of trades processed - `0` means the topic had nothing new.
    #[instrument(skip_all)]
    pub async fn run_once(&mut self) -> Result<usize, EngineError> {
        let records = self.consumer.poll().await?;
        if records.is_empty() {
            return Ok(0);
        }

        for record in &records {
            let trade = &record.value;
            let bars = self.process_trade(trade)?;

            for bar in bars {
                metrics::counter!(
                    tickstream_metrics::metrics::METRIC_BARS_EMITTED_TOTAL.name(),
                    tickstream_metrics::metrics::LABEL_PRODUCT_ID => bar.product_id.as_str().to_string(),
                    tickstream_metrics::metrics::LABEL_BAR_TYPE => bar.bar_type.as_str(),
                )
                .increment(1);

                debug!(product_id = %bar.product_id, bar_type = %bar.bar_type, "emitting bar");
                self.producer
                    .send(&self.bars_topic, bar.product_id.as_str().to_string(), &bar)
                    .await?;
            }
        }

        self.consumer.commit(&records).await?;
        Ok(records.len())
    }

    fn process_trade(&mut self, trade: &Trade) -> Result<Vec<crate::bar::Bar>, EngineError> {
        let aggregation = *self
            .products
            .get(&trade.product_id)
            .ok_or_else(|| EngineError::UnconfiguredProduct(trade.product_id.as_str().to_string()))?;

        let state = self.states.entry(trade.product_id.clone()).or_default();

        let bars = match aggregation {
            Aggregation::Volume { interval } => {
                volume::process(state, trade, interval, &self.snowflake, &self.features)?
            }
            Aggregation::TickImbalance { interval } => {
                tick_imbalance::process(state, trade, interval, &self.features)?
                    .into_iter()
                    .collect()
            }
            Aggregation::Time { interval } => {
                time::process(state, trade, Duration::seconds(interval), &self.features)?
                    .into_iter()
                    .collect()
            }
        };

        Ok(bars)
    }

    /// Run until `shutdown` resolves, draining in-flight work before returning - the graceful
    /// shutdown behavior the runtime contract requires.
    pub async fn run(&mut self, mut shutdown: tokio::sync::oneshot::Receiver<()>) -> Result<(), EngineError> {
        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("shutdown requested, draining in-flight batch before exit");
                    break;
                }
                result = self.run_once() => {
                    if result? == 0 {
                        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use tickstream_bus::{InMemoryBus, InMemoryOffsetStore};
    use tickstream_instrument::{ExchangeId, Side};

    fn trade(product_id: &str, side: Side, price: f64, volume: f64, seconds: i64) -> Trade {
        Trade::new(
            ProductId::new(product_id),
            side,
            price,
            volume,
            Utc.timestamp_opt(seconds, 0).unwrap(),
            ExchangeId::Coinbase,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_engine_emits_volume_bar_and_commits_offset() {
        let bus = InMemoryBus::new(4);
        let trades_topic = Topic::new("trades");
        let bars_topic = Topic::new("bars");

        let producer_into_trades = bus.producer();
        producer_into_trades
            .send(&trades_topic, "BTC-USD".to_string(), &trade("BTC-USD", Side::Buy, 100.0, 10.0, 0))
            .await
            .unwrap();

        let offsets: Arc<dyn tickstream_bus::OffsetStore + Send + Sync> =
            Arc::new(InMemoryOffsetStore::default());
        let consumer = bus.consumer::<Trade>(
            trades_topic,
            tickstream_bus::ConsumerGroup::new("bar-builder".to_string()),
            offsets,
        );

        let mut products = IndexMap::new();
        products.insert(ProductId::new("BTC-USD"), Aggregation::Volume { interval: 10.0 });

        let mut engine = BarEngine::new(consumer, bus.producer(), bars_topic, products, 1);
        let processed = engine.run_once().await.unwrap();
        assert_eq!(processed, 1);

        // Re-polling without new trades must not reprocess the committed trade.
        let processed_again = engine.run_once().await.unwrap();
        assert_eq!(processed_again, 0);
    }

    #[tokio::test]
    async fn test_engine_rejects_trade_for_unconfigured_product() {
        let bus = InMemoryBus::new(4);
        let trades_topic = Topic::new("trades");
        let bars_topic = Topic::new("bars");

        bus.producer()
            .send(&trades_topic, "ETH-USD".to_string(), &trade("ETH-USD", Side::Buy, 100.0, 1.0, 0))
            .await
            .unwrap();

        let offsets: Arc<dyn tickstream_bus::OffsetStore + Send + Sync> =
            Arc::new(InMemoryOffsetStore::default());
        let consumer = bus.consumer::<Trade>(
            trades_topic,
            tickstream_bus::ConsumerGroup::new("bar-builder".to_string()),
            offsets,
        );

        let mut engine = BarEngine::new(consumer, bus.producer(), bars_topic, IndexMap::new(), 1);
        let error = engine.run_once().await.unwrap_err();
        assert!(matches!(error, EngineError::UnconfiguredProduct(_)));
    }
}
