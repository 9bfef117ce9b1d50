use crate::{
    Identifier,
    error::DataError,
    exchange::{Connector, PingInterval},
    subscriber::{self, Subscribed},
    subscription::Subscription,
    transformer::{ExchangeTransformer, stateless::StatelessTransformer},
};
use tickstream_instrument::{ProductId, exchange::ExchangeId, trade::Trade};
use tickstream_integration::{
    backoff::Backoff,
    error::SocketError,
    protocol::websocket::{WebSocketSerdeParser, WsMessage, WsSink, WsStream, is_websocket_disconnected},
    reconnect::{self, Event, ReconnectingStream},
    stream::ExchangeStream,
};
use futures::{SinkExt, Stream, StreamExt};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// `Stream::Item` yielded by a live [`init_live_stream`] adapter - either a [`Trade`] `Result`,
/// or a notification that the exchange connection is (re)connecting.
pub type LiveStreamEvent = Event<ExchangeId, Result<Trade, DataError>>;

/// The concrete [`ExchangeStream`] produced by a single (re)connection attempt of
/// [`init_live_stream`].
type LiveExchangeStream<Exchange> = ExchangeStream<
    WebSocketSerdeParser,
    WsStream,
    StatelessTransformer<Exchange, <Exchange as Connector>::Input>,
>;

/// Initialise a live, auto-reconnecting WebSocket adapter `Stream` of [`Trade`]s for the given
/// `Exchange` and canonical [`Subscription`]s.
///
/// Reconnection uses the provided [`Backoff`] policy; the outer `Stream` ends once the policy is
/// exhausted following repeated failed reconnection attempts.
pub async fn init_live_stream<Exchange>(
    backoff: Backoff,
    subscriptions: Vec<Subscription<Exchange>>,
) -> Result<impl Stream<Item = LiveStreamEvent>, DataError>
where
    Exchange: Connector + Send + Sync + 'static,
    Exchange::Input: Send,
    Subscription<Exchange>:
        Identifier<Exchange::Channel> + Identifier<Exchange::Market> + Clone + Send + Sync + 'static,
    Vec<Result<Trade, DataError>>: From<(ExchangeId, ProductId, Exchange::Input)>,
{
    let exchange = Exchange::ID;

    if subscriptions.is_empty() {
        return Err(DataError::SubscriptionsEmpty);
    }

    info!(%exchange, ?subscriptions, ?backoff, "initialising live adapter Stream with auto reconnect");

    let attempts = reconnect::init_reconnecting_stream(move || {
        let subscriptions = subscriptions.clone();
        async move { init_websocket_stream::<Exchange>(&subscriptions).await }
    })
    .await?;

    Ok(attempts
        .with_reconnect_backoff(backoff, exchange)
        .with_termination_on_error(|error: &DataError| error.is_terminal(), exchange)
        .with_reconnection_events(exchange))
}

async fn init_websocket_stream<Exchange>(
    subscriptions: &[Subscription<Exchange>],
) -> Result<LiveExchangeStream<Exchange>, SocketError>
where
    Exchange: Connector + Send + Sync,
    Subscription<Exchange>: Identifier<Exchange::Channel> + Identifier<Exchange::Market>,
{
    let Subscribed { websocket, map } = subscriber::subscribe(subscriptions).await?;

    let (ws_sink, ws_stream) = websocket.split();

    let (ws_sink_tx, ws_sink_rx) = mpsc::unbounded_channel();
    tokio::spawn(distribute_messages_to_exchange(
        Exchange::ID,
        ws_sink,
        ws_sink_rx,
    ));

    if let Some(ping_interval) = Exchange::ping_interval() {
        tokio::spawn(schedule_pings_to_exchange(
            Exchange::ID,
            ws_sink_tx.clone(),
            ping_interval,
        ));
    }

    let transformer = StatelessTransformer::init(map, ws_sink_tx);

    Ok(ExchangeStream::new(ws_stream, transformer, VecDeque::new()))
}

/// Transmit [`WsMessage`]s (eg/ application-level pings) to the exchange via the `WsSink` half
/// of a split WebSocket connection.
async fn distribute_messages_to_exchange(
    exchange: ExchangeId,
    mut ws_sink: WsSink,
    mut ws_sink_rx: mpsc::UnboundedReceiver<WsMessage>,
) {
    while let Some(message) = ws_sink_rx.recv().await {
        if let Err(error) = ws_sink.send(message).await {
            if is_websocket_disconnected(&error) {
                break;
            }

            error!(
                %exchange,
                %error,
                "failed to send message to the exchange via WsSink"
            );
        }
    }
}

/// Schedule the sending of custom application-level ping [`WsMessage`]s to the exchange using
/// the provided [`PingInterval`].
///
/// This is additional to the protocol-level pings already handled by `tokio_tungstenite`.
async fn schedule_pings_to_exchange(
    exchange: ExchangeId,
    ws_sink_tx: mpsc::UnboundedSender<WsMessage>,
    PingInterval { mut interval, ping }: PingInterval,
) {
    loop {
        interval.tick().await;

        if ws_sink_tx.send(ping()).is_err() {
            break;
        }

        debug!(%exchange, "sent custom application-level ping to exchange");
    }
}
