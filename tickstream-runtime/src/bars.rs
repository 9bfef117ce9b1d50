use crate::{config::Settings, error::RuntimeError};
use indexmap::IndexMap;
use std::sync::Arc;
use tickstream_bars::BarEngine;
use tickstream_bus::{Consumer, ConsumerGroup, OffsetStore, Producer, Topic};
use tickstream_instrument::{trade::Trade, ProductId};
use tracing::info;

/// Default Snowflake `machine_id` for a single-process deployment. A multi-instance deployment
/// must assign a distinct id per instance to preserve the allocator's global uniqueness.
const DEFAULT_MACHINE_ID: i64 = 0;

/// Run the Bar Builder to completion (or until `shutdown` fires): consume the `trades` topic,
/// build bars per the configured per-product aggregation policy, and produce them to the `bars`
/// topic.
pub async fn run<C, P>(
    settings: &Settings,
    consumer: C,
    producer: P,
    shutdown: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), RuntimeError>
where
    C: Consumer<Value = Trade>,
    P: Producer,
{
    let products = product_aggregations(settings);
    info!(count = products.len(), "bar builder starting with configured products");

    let bars_topic = Topic::new(settings.kafka.output_topic.clone());
    let mut engine = BarEngine::new(consumer, producer, bars_topic, products, DEFAULT_MACHINE_ID);

    engine.run(shutdown).await?;
    Ok(())
}

fn product_aggregations(settings: &Settings) -> IndexMap<ProductId, tickstream_bars::Aggregation> {
    settings
        .products
        .iter()
        .map(|product| {
            (
                tickstream_data::normalizer::normalize(&product.coin, "USD"),
                product.aggregation,
            )
        })
        .collect()
}

/// Build the [`ConsumerGroup`] the Bar Builder reads with, deriving a fresh UUID-suffixed group
/// when `kafka.create_new_consumer_group` resets consumption to the earliest offset.
pub fn consumer_group(settings: &Settings) -> ConsumerGroup {
    if settings.kafka.create_new_consumer_group {
        ConsumerGroup::fresh(settings.kafka.consumer_group.clone())
    } else {
        ConsumerGroup::new(settings.kafka.consumer_group.clone())
    }
}

pub fn offset_store() -> Arc<dyn OffsetStore + Send + Sync> {
    Arc::new(tickstream_bus::InMemoryOffsetStore::default())
}
