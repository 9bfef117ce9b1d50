use super::ExchangeTransformer;
use crate::{HeartbeatMarker, Identifier, error::DataError, exchange::Connector, subscription::Map};
use tickstream_instrument::trade::Trade;
use tickstream_integration::{Transformer, protocol::websocket::WsMessage, subscription::SubscriptionId};
use std::{marker::PhantomData, time::Instant};
use tickstream_metrics::metrics::{
    LABEL_EXCHANGE, METRIC_HEARTBEAT_RESPONSES, METRIC_REQUEST_COUNT, METRIC_REQUEST_PROCESSING_SECONDS,
};
use tokio::sync::mpsc;

/// Standard generic stateless [`ExchangeTransformer`] that translates an exchange's raw trade
/// payload into normalized [`Trade`]s, using the instrument map built during subscription.
///
/// Holds (but never uses) `_ws_sink_tx` purely to keep the adapter's `WsSink` half alive for as
/// long as this `Transformer` (and thus its `ExchangeStream`) lives.
#[derive(Clone, Debug)]
pub struct StatelessTransformer<Exchange, Input> {
    instrument_map: Map,
    _ws_sink_tx: mpsc::UnboundedSender<WsMessage>,
    phantom: PhantomData<(Exchange, Input)>,
}

impl<Exchange, Input> ExchangeTransformer for StatelessTransformer<Exchange, Input>
where
    Exchange: Connector + Send,
    Input: Identifier<Option<SubscriptionId>> + HeartbeatMarker + for<'de> serde::Deserialize<'de>,
    Vec<Result<Trade, DataError>>: From<(tickstream_instrument::exchange::ExchangeId, tickstream_instrument::ProductId, Input)>,
{
    fn init(instrument_map: Map, ws_sink_tx: mpsc::UnboundedSender<WsMessage>) -> Self {
        Self {
            instrument_map,
            _ws_sink_tx: ws_sink_tx,
            phantom: PhantomData,
        }
    }
}

impl<Exchange, Input> Transformer for StatelessTransformer<Exchange, Input>
where
    Exchange: Connector,
    Input: Identifier<Option<SubscriptionId>> + HeartbeatMarker + for<'de> serde::Deserialize<'de>,
    Vec<Result<Trade, DataError>>: From<(tickstream_instrument::exchange::ExchangeId, tickstream_instrument::ProductId, Input)>,
{
    type Error = DataError;
    type Input = Input;
    type Output = Trade;
    type OutputIter = Vec<Result<Self::Output, Self::Error>>;

    fn transform(&mut self, input: Self::Input) -> Self::OutputIter {
        let started_at = Instant::now();
        let is_heartbeat = input.is_heartbeat();

        let output = match input.id() {
            Some(subscription_id) => match self.instrument_map.find(&subscription_id) {
                Ok(product_id) => Vec::from((Exchange::ID, product_id.clone(), input)),
                Err(unidentifiable) => vec![Err(unidentifiable)],
            },
            None => vec![],
        };

        self.record_request(started_at, is_heartbeat);
        output
    }
}

impl<Exchange, Input> StatelessTransformer<Exchange, Input>
where
    Exchange: Connector,
{
    /// Record one adapter receive-loop iteration against the exchange's labelled
    /// `request_count`/`request_processing_seconds` metrics, plus `heartbeat_responses` when the
    /// message carried no tradeable data.
    fn record_request(&self, started_at: Instant, is_heartbeat: bool) {
        let exchange = Exchange::ID.as_str();

        metrics::counter!(METRIC_REQUEST_COUNT.name(), LABEL_EXCHANGE => exchange).increment(1);
        metrics::histogram!(METRIC_REQUEST_PROCESSING_SECONDS.name(), LABEL_EXCHANGE => exchange)
            .record(started_at.elapsed().as_secs_f64());

        if is_heartbeat {
            metrics::counter!(METRIC_HEARTBEAT_RESPONSES.name(), LABEL_EXCHANGE => exchange).increment(1);
        }
    }
}
