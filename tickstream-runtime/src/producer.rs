use crate::{
    config::{ExchangeName, LiveOrHistorical, Settings},
    error::RuntimeError,
};
use futures::{Stream, StreamExt};
use tickstream_bus::{Producer, Topic};
use tickstream_data::{
    exchange::{coinbase::Coinbase, kraken::Kraken, Connector},
    fanout, historical,
    live::{self, LiveStreamEvent},
    normalizer,
    subscription::Subscription,
    Identifier,
};
use tickstream_instrument::{exchange::ExchangeId, trade::Trade, ProductId};
use tickstream_integration::{backoff::Backoff, reconnect::Event};
use tracing::{error, info, warn};

/// Instantiate every configured exchange's adapters (splitting `HIGH_VOLUME` products into
/// dedicated connections per the fan-out policy), run them concurrently, and write every
/// normalized trade to the `trades` topic keyed by canonical `product_id`.
pub async fn run<P>(settings: &Settings, producer: P) -> Result<(), RuntimeError>
where
    P: Producer + Clone + Send + Sync + 'static,
{
    let topic = Topic::new(settings.kafka.input_topic.clone());
    let mut tasks = Vec::new();

    for exchange in &settings.exchanges {
        match (exchange.name, settings.live_or_historical) {
            (ExchangeName::Coinbase, LiveOrHistorical::Historical) => {
                warn!(
                    "coinbase has no historical REST adapter in this build - its trade history \
                     endpoint uses an incompatible pagination model to the generic since-cursor \
                     backfill engine; skipping"
                );
            }
            (ExchangeName::Coinbase, LiveOrHistorical::Live) => {
                tasks.extend(spawn_live::<Coinbase>(settings, producer.clone(), topic.clone(), coinbase_symbol));
            }
            (ExchangeName::Kraken, LiveOrHistorical::Live) => {
                tasks.extend(spawn_live::<Kraken>(settings, producer.clone(), topic.clone(), kraken_symbol));
            }
            (ExchangeName::Kraken, LiveOrHistorical::Historical) => {
                tasks.push(tokio::spawn(run_kraken_backfill(settings.clone(), producer.clone(), topic.clone())));
            }
        }
    }

    for task in tasks {
        let _ = task.await;
    }

    Ok(())
}

fn coinbase_symbol(coin: &str) -> String {
    format!("{coin}-USD")
}

fn kraken_symbol(coin: &str) -> String {
    format!("{coin}/USD")
}

fn spawn_live<Exchange>(
    settings: &Settings,
    producer: impl Producer + Clone + Send + Sync + 'static,
    topic: Topic,
    exchange_symbol: fn(&str) -> String,
) -> Vec<tokio::task::JoinHandle<()>>
where
    Exchange: Connector + Default + Send + Sync + 'static,
    Exchange::Input: Send,
    Subscription<Exchange>: Identifier<Exchange::Channel> + Identifier<Exchange::Market> + Clone + Send + Sync + 'static,
    Vec<Result<Trade, tickstream_data::error::DataError>>: From<(ExchangeId, ProductId, Exchange::Input)>,
{
    let coins: Vec<String> = settings.products.iter().map(|product| product.coin.clone()).collect();
    let (dedicated, shared) = fanout::partition(coins);

    dedicated
        .into_iter()
        .chain(std::iter::once(shared).filter(|group| !group.is_empty()))
        .map(|group| {
            let subscriptions: Vec<Subscription<Exchange>> = group
                .iter()
                .map(|coin| {
                    Subscription::new(Exchange::default(), normalizer::normalize(coin, "USD"), exchange_symbol(coin))
                })
                .collect();

            let producer = producer.clone();
            let topic = topic.clone();

            tokio::spawn(async move {
                match live::init_live_stream::<Exchange>(Backoff::default_policy(), subscriptions).await {
                    Ok(stream) => forward_trades(stream, producer, topic).await,
                    Err(error) => error!(%error, "failed to initialise live adapter stream"),
                }
            })
        })
        .collect()
}

async fn forward_trades<S, P>(stream: S, producer: P, topic: Topic)
where
    S: Stream<Item = LiveStreamEvent> + Send,
    P: Producer,
{
    tokio::pin!(stream);

    while let Some(event) = stream.next().await {
        match event {
            Event::Item(Ok(trade)) => {
                if let Err(error) = producer
                    .send(&topic, trade.product_id.as_str().to_string(), &trade)
                    .await
                {
                    error!(%error, "fatal: failed to publish trade to the trades topic");
                    break;
                }
            }
            Event::Item(Err(error)) => {
                warn!(%error, "dropped malformed trade record");
            }
            Event::Reconnecting(exchange) => {
                info!(%exchange, "live adapter stream reconnecting");
            }
        }
    }
}

async fn run_kraken_backfill<P>(settings: Settings, producer: P, topic: Topic)
where
    P: Producer,
{
    for product in &settings.products {
        let product_id = normalizer::normalize(&product.coin, "USD");

        let trades = match historical::backfill::<Kraken>(
            &product_id,
            settings.last_n_days,
            &settings.cache_dir_historical_data,
        )
        .await
        {
            Ok(trades) => trades,
            Err(error) => {
                error!(%error, %product_id, "historical backfill failed");
                continue;
            }
        };

        info!(%product_id, count = trades.len(), "backfilled historical trades");

        for trade in trades {
            if let Err(error) = producer.send(&topic, trade.product_id.as_str().to_string(), &trade).await {
                error!(%error, "fatal: failed to publish historical trade to the trades topic");
                return;
            }
        }
    }
}

